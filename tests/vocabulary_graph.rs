mod common;

use common::{create_test_db, seed_period};
use sejarah_backend_rust::db::operations::{
    add_vocabulary_visual, connect_terms, create_vocabulary_term, find_vocabulary_terms,
    get_vocabulary_term, list_incoming_connections, list_outgoing_connections,
    list_vocabulary_terms_by_period, list_vocabulary_visuals,
};
use sejarah_backend_rust::db::Database;
use sejarah_backend_rust::models::{
    MediaType, QuestionDifficulty, StudentGrade, TermConnectionCreate, ValidationError,
    VocabularyTerm, VocabularyTermCreate, VocabularyVisualCreate,
};
use sejarah_backend_rust::DbError;

async fn term(db: &Database, term: &str, period_id: Option<i64>) -> VocabularyTerm {
    create_vocabulary_term(
        db,
        &VocabularyTermCreate {
            historical_period_id: period_id,
            term: term.to_string(),
            definition: format!("definition of {term}"),
            pronunciation: None,
            audio_url: None,
            etymology: None,
            usage_example: None,
            difficulty_level: QuestionDifficulty::Easy,
            grade_level: StudentGrade::Grade4,
        },
    )
    .await
    .expect("create term")
}

fn edge(source: i64, target: i64, strength: i64) -> TermConnectionCreate {
    TermConnectionCreate {
        source_term_id: source,
        target_term_id: target,
        relationship_type: "related_to".to_string(),
        description: None,
        strength,
    }
}

#[tokio::test]
async fn test_connections_are_directed_edges() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let candi = term(db, "Candi", None).await;
    let stupa = term(db, "Stupa", None).await;
    let relief = term(db, "Relief", None).await;

    connect_terms(db, &edge(candi.id, stupa.id, 3)).await.unwrap();
    connect_terms(db, &edge(candi.id, relief.id, 5)).await.unwrap();
    connect_terms(db, &edge(relief.id, stupa.id, 1)).await.unwrap();

    let outgoing = list_outgoing_connections(db, candi.id).await.unwrap();
    let targets: Vec<i64> = outgoing.iter().map(|c| c.target_term_id).collect();
    assert_eq!(targets, vec![relief.id, stupa.id]);

    let incoming = list_incoming_connections(db, stupa.id).await.unwrap();
    let sources: Vec<i64> = incoming.iter().map(|c| c.source_term_id).collect();
    assert_eq!(sources, vec![candi.id, relief.id]);

    assert!(list_outgoing_connections(db, stupa.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_strength_outside_range_is_rejected() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let a = term(db, "Prasasti", None).await;
    let b = term(db, "Aksara", None).await;

    for strength in [0, 6, -1] {
        let err = connect_terms(db, &edge(a.id, b.id, strength)).await.unwrap_err();
        assert!(
            matches!(
                err,
                DbError::Validation(ValidationError::OutOfRange { field: "strength", .. })
            ),
            "strength {strength}: got {err:?}"
        );
    }

    for strength in [1, 5] {
        let stored = connect_terms(db, &edge(a.id, b.id, strength)).await.unwrap();
        assert_eq!(stored.strength, strength);
    }
}

#[tokio::test]
async fn test_self_connection_is_accepted() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let raja = term(db, "Raja", None).await;
    let connection = connect_terms(db, &edge(raja.id, raja.id, 2)).await.unwrap();
    assert_eq!(connection.source_term_id, connection.target_term_id);
}

#[tokio::test]
async fn test_connection_to_missing_term_violates_foreign_key() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let raja = term(db, "Raja", None).await;
    let err = connect_terms(db, &edge(raja.id, 777, 2)).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_find_terms_ignores_case() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let created = term(db, "Kerajaan", None).await;
    term(db, "Kerajaan Hindu", None).await;

    let found = find_vocabulary_terms(db, "kerajaan").await.unwrap();
    assert_eq!(found, vec![created.clone()]);

    let loaded = get_vocabulary_term(db, created.id).await.unwrap();
    assert_eq!(loaded, Some(created));
    assert!(find_vocabulary_terms(db, "kerajaan hindu buddha").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_terms_grouped_by_period() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let period = seed_period(db, "Sriwijaya").await;
    term(db, "Maritim", Some(period.id)).await;
    term(db, "Bandar", Some(period.id)).await;
    term(db, "Lepas", None).await;

    let names: Vec<String> = list_vocabulary_terms_by_period(db, period.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.term)
        .collect();
    assert_eq!(names, vec!["Bandar", "Maritim"]);
}

#[tokio::test]
async fn test_visuals_in_display_order() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let keris = term(db, "Keris", None).await;
    for (order, media_type) in [(2, MediaType::Video), (1, MediaType::Image), (3, MediaType::Model3d)] {
        add_vocabulary_visual(
            db,
            keris.id,
            &VocabularyVisualCreate {
                media_type,
                media_url: format!("/media/keris-{order}"),
                caption: None,
                alt_text: "keris".to_string(),
                display_order: order,
            },
        )
        .await
        .unwrap();
    }

    let kinds: Vec<MediaType> = list_vocabulary_visuals(db, keris.id)
        .await
        .unwrap()
        .into_iter()
        .map(|visual| visual.media_type)
        .collect();
    assert_eq!(kinds, vec![MediaType::Image, MediaType::Video, MediaType::Model3d]);
}
