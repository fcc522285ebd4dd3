mod common;

use serde_json::json;

use common::{create_test_db, seed_student};
use sejarah_backend_rust::db::operations::{
    award_badge, create_badge, get_badge, list_active_badges, list_student_badges,
};
use sejarah_backend_rust::models::{BadgeCreate, BadgeType, JsonObject};
use sejarah_backend_rust::DbError;

fn badge_input(name: &str, badge_type: BadgeType, is_active: bool) -> BadgeCreate {
    BadgeCreate {
        name: name.to_string(),
        description: format!("{name} badge"),
        badge_type,
        icon_url: format!("/badges/{name}.png"),
        criteria: JsonObject::new(),
        points_reward: 5,
        is_active,
    }
}

#[tokio::test]
async fn test_award_badge_records_progress_data() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "ana").await;
    let streak = create_badge(db, &badge_input("Rajin", BadgeType::Streak, true))
        .await
        .unwrap();
    assert_eq!(get_badge(db, streak.id).await.unwrap(), Some(streak.clone()));

    let mut progress = JsonObject::new();
    progress.insert("days".to_string(), json!(7));
    let awarded = award_badge(db, student.id, streak.id, Some(progress.clone()))
        .await
        .unwrap();
    assert_eq!(awarded.progress_data, Some(progress));

    let scholar = create_badge(db, &badge_input("Cendekia", BadgeType::Scholar, true))
        .await
        .unwrap();
    let without_progress = award_badge(db, student.id, scholar.id, None).await.unwrap();
    assert_eq!(without_progress.progress_data, Some(JsonObject::new()));

    let earned = list_student_badges(db, student.id).await.unwrap();
    assert_eq!(earned, vec![awarded, without_progress]);
}

#[tokio::test]
async fn test_inactive_badges_hidden_and_names_unique() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    create_badge(db, &badge_input("Penjelajah", BadgeType::Explorer, true)).await.unwrap();
    create_badge(db, &badge_input("Lama", BadgeType::PerfectScore, false)).await.unwrap();

    let active = list_active_badges(db).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].badge_type, BadgeType::Explorer);

    let err = create_badge(db, &badge_input("Penjelajah", BadgeType::Explorer, true))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UniqueViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_award_unknown_badge_violates_foreign_key() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let student = seed_student(db, "budi").await;
    let err = award_badge(db, student.id, 42, None).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation(_)), "got {err:?}");
}
