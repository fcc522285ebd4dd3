mod common;

use common::{create_test_db, figure_input, seed_figure, seed_period, seed_student};
use sejarah_backend_rust::db::operations::{
    add_diary_entry, add_figure_multimedia, add_timeline_event, create_historical_figure,
    get_hero_diary_progress, list_diary_entries, list_featured_figures, list_figure_multimedia,
    list_figures_by_period, list_hero_diary_progress, list_timeline_events,
    start_hero_diary_progress, update_hero_diary_progress,
};
use sejarah_backend_rust::db::Database;
use sejarah_backend_rust::models::{
    Decimal, DiaryEntryCreate, FigureMultimediaCreate, HeroDiaryProgressUpdate, MediaType,
    TimelineEventCreate, ValidationError,
};
use sejarah_backend_rust::DbError;

fn entry_input(title: &str, display_order: i64) -> DiaryEntryCreate {
    DiaryEntryCreate {
        title: title.to_string(),
        entry_text: format!("{title} text"),
        entry_date: None,
        historical_context: "context".to_string(),
        emotional_tone: None,
        display_order,
        is_fictional: true,
        sources: Some(Vec::new()),
    }
}

fn event_input(title: &str, importance_level: i64) -> TimelineEventCreate {
    TimelineEventCreate {
        title: title.to_string(),
        description: "event".to_string(),
        event_date: None,
        event_year: Some(1336),
        importance_level,
        location: None,
        display_order: 0,
    }
}

async fn figure_with_entries(db: &Database, entries: i64) -> i64 {
    let figure = seed_figure(db, "Gajah Mada").await;
    for order in 0..entries {
        add_diary_entry(db, figure.id, &entry_input(&format!("entry {order}"), order))
            .await
            .expect("add entry");
    }
    figure.id
}

#[tokio::test]
async fn test_completion_percentage_round_trips_at_two_places() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "ana").await;
    let figure_id = figure_with_entries(db, 3).await;

    let progress = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();
    assert_eq!(progress.total_entries, 3);
    assert_eq!(progress.completion_percentage.to_string(), "0.00");

    let updated = update_hero_diary_progress(
        db,
        progress.id,
        &HeroDiaryProgressUpdate {
            entries_read: Some(2),
            ..HeroDiaryProgressUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.completion_percentage, Decimal::new(6667, 2));

    let stored = get_hero_diary_progress(db, student.id, figure_id)
        .await
        .unwrap()
        .expect("progress row");
    assert_eq!(stored.completion_percentage, updated.completion_percentage);
    assert_eq!(stored.completion_percentage.to_string(), "66.67");
    assert_eq!(stored.completion_percentage.scale(), 2);
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_completion_caps_at_one_hundred() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "budi").await;
    let figure_id = figure_with_entries(db, 2).await;
    let progress = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();

    let updated = update_hero_diary_progress(
        db,
        progress.id,
        &HeroDiaryProgressUpdate {
            entries_read: Some(5),
            notes: Some("semua sudah dibaca".to_string()),
            favorite_entries: Some(vec![1, 2]),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.completion_percentage.to_string(), "100.00");
    assert_eq!(updated.notes.as_deref(), Some("semua sudah dibaca"));
    assert_eq!(updated.favorite_entries, vec![1, 2]);
}

#[tokio::test]
async fn test_start_progress_returns_existing_row() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "citra").await;
    let figure_id = figure_with_entries(db, 1).await;

    let first = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();
    let second = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(list_hero_diary_progress(db, student.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_figure_without_entries_keeps_zero_percentage() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "dewi").await;
    let figure_id = figure_with_entries(db, 0).await;
    let progress = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();

    let updated = update_hero_diary_progress(
        db,
        progress.id,
        &HeroDiaryProgressUpdate {
            entries_read: Some(1),
            ..HeroDiaryProgressUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.completion_percentage, Decimal::ZERO);
    assert_eq!(updated.entries_read, 1);

    let err = update_hero_diary_progress(db, 4040, &HeroDiaryProgressUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "hero diary progress", .. }));
}

#[tokio::test]
async fn test_importance_level_bounds_enforced() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let figure = seed_figure(db, "Hayam Wuruk").await;
    for level in [0, 6] {
        let err = add_timeline_event(db, figure.id, &event_input("out of range", level))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::OutOfRange { field: "importance_level", .. })
        ));
    }

    add_timeline_event(db, figure.id, &event_input("low", 1)).await.unwrap();
    add_timeline_event(db, figure.id, &event_input("high", 5)).await.unwrap();
    assert_eq!(list_timeline_events(db, figure.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_figure_children_listed_in_display_order() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let figure = seed_figure(db, "Kartini").await;
    add_diary_entry(db, figure.id, &entry_input("second", 2)).await.unwrap();
    add_diary_entry(db, figure.id, &entry_input("first", 1)).await.unwrap();

    let titles: Vec<String> = list_diary_entries(db, figure.id)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);

    let media = add_figure_multimedia(
        db,
        figure.id,
        &FigureMultimediaCreate {
            media_type: MediaType::Image,
            media_url: "/media/kartini.jpg".to_string(),
            title: "Potret".to_string(),
            description: None,
            source_attribution: Some("Arsip Nasional".to_string()),
            display_order: 0,
            is_primary: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(list_figure_multimedia(db, figure.id).await.unwrap(), vec![media]);
}

#[tokio::test]
async fn test_featured_and_period_figure_listings() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let period = seed_period(db, "Pergerakan Nasional").await;
    let mut featured = figure_input("Soekarno");
    featured.is_featured = true;
    featured.historical_period_id = Some(period.id);
    let featured = create_historical_figure(db, &featured).await.unwrap();
    seed_figure(db, "Tokoh Lain").await;

    assert_eq!(list_featured_figures(db).await.unwrap(), vec![featured.clone()]);
    assert_eq!(list_figures_by_period(db, period.id).await.unwrap(), vec![featured]);
}

#[tokio::test]
async fn test_concurrent_start_shares_one_row() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let figure_id = figure_with_entries(db, 2).await;
    for round in 0..20 {
        let student = seed_student(db, &format!("murid{round}")).await;
        let (first, second) = tokio::join!(
            start_hero_diary_progress(db, student.id, figure_id),
            start_hero_diary_progress(db, student.id, figure_id),
        );
        let first = first.unwrap_or_else(|err| panic!("round {round}: {err:?}"));
        let second = second.unwrap_or_else(|err| panic!("round {round}: {err:?}"));

        assert_eq!(first, second);
        assert_eq!(first.total_entries, 2);
        assert_eq!(list_hero_diary_progress(db, student.id).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_duplicate_progress_row_rejected_by_unique_index() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "eka").await;
    let figure_id = figure_with_entries(db, 1).await;
    let progress = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();

    let err = sqlx::query(
        r#"
        INSERT INTO hero_diary_progress (student_id, historical_figure_id, last_accessed)
        VALUES (?, ?, '2024-01-01T00:00:00+00:00')
        "#,
    )
    .bind(progress.student_id)
    .bind(progress.historical_figure_id)
    .execute(db.pool())
    .await
    .map_err(DbError::from)
    .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_update_rejects_negative_entries_read() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "fajar").await;
    let figure_id = figure_with_entries(db, 4).await;
    let progress = start_hero_diary_progress(db, student.id, figure_id).await.unwrap();

    let err = update_hero_diary_progress(
        db,
        progress.id,
        &HeroDiaryProgressUpdate {
            entries_read: Some(-1),
            ..HeroDiaryProgressUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::Negative { field: "entries_read", .. })
    ));

    let stored = get_hero_diary_progress(db, student.id, figure_id)
        .await
        .unwrap()
        .expect("progress");
    assert_eq!(stored, progress);
}
