mod common;

use serde_json::json;

use common::{create_test_db, seed_teacher};
use sejarah_backend_rust::db::operations::{
    add_activity_sheet, add_teaching_material, create_lesson_plan, get_lesson_plan,
    list_activity_sheets, list_lesson_plans_by_teacher, list_teaching_materials,
    set_lesson_plan_validated, set_teaching_material_validated,
};
use sejarah_backend_rust::models::{
    ActivitySheetCreate, JsonObject, LessonPlanCreate, MediaType, StudentGrade,
    TeachingMaterialCreate, ValidationError,
};
use sejarah_backend_rust::DbError;

fn plan_input(title: &str) -> LessonPlanCreate {
    let mut alignment = JsonObject::new();
    alignment.insert("kurikulum".to_string(), json!("Merdeka"));
    alignment.insert("kompetensi".to_string(), json!(["3.1", "4.1"]));

    LessonPlanCreate {
        title: title.to_string(),
        description: "Mengenal kerajaan Hindu-Buddha".to_string(),
        grade_level: StudentGrade::Grade5,
        subject: "IPS".to_string(),
        duration_minutes: 70,
        learning_objectives: vec!["Menyebutkan kerajaan".to_string()],
        curriculum_alignment: alignment,
        gamification_elements: JsonObject::new(),
    }
}

fn material_input(title: &str, display_order: i64) -> TeachingMaterialCreate {
    TeachingMaterialCreate {
        title: title.to_string(),
        material_type: MediaType::Document,
        file_path: format!("/materials/{title}.pdf"),
        description: None,
        display_order,
    }
}

#[tokio::test]
async fn test_lesson_plan_round_trip_with_json_attributes() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let teacher = seed_teacher(db, "guru").await;
    let plan = create_lesson_plan(db, teacher.id, &plan_input("Kerajaan Kutai"))
        .await
        .unwrap();
    assert!(!plan.is_validated);

    let stored = get_lesson_plan(db, plan.id).await.unwrap().expect("plan");
    assert_eq!(stored, plan);
    assert_eq!(stored.curriculum_alignment["kompetensi"], json!(["3.1", "4.1"]));

    let validated = set_lesson_plan_validated(db, plan.id, true).await.unwrap();
    assert!(validated.is_validated);
    assert!(validated.updated_at >= plan.updated_at);

    let plans = list_lesson_plans_by_teacher(db, teacher.id).await.unwrap();
    assert_eq!(plans.len(), 1);
}

#[tokio::test]
async fn test_plan_requires_positive_duration() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let teacher = seed_teacher(db, "guru").await;
    let mut input = plan_input("Tanpa durasi");
    input.duration_minutes = 0;
    let err = create_lesson_plan(db, teacher.id, &input).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Validation(ValidationError::NotPositive { field: "duration_minutes", .. })
    ));
}

#[tokio::test]
async fn test_plan_for_missing_teacher_violates_foreign_key() {
    let test_db = create_test_db().await;

    let err = create_lesson_plan(&test_db.db, 321, &plan_input("Yatim"))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_materials_and_sheets_belong_to_plan() {
    let test_db = create_test_db().await;
    let db = &test_db.db;

    let teacher = seed_teacher(db, "guru").await;
    let plan = create_lesson_plan(db, teacher.id, &plan_input("Tarumanegara"))
        .await
        .unwrap();

    add_teaching_material(db, plan.id, &material_input("peta", 2)).await.unwrap();
    let slides = add_teaching_material(db, plan.id, &material_input("slide", 1))
        .await
        .unwrap();
    set_teaching_material_validated(db, slides.id, true).await.unwrap();

    let materials = list_teaching_materials(db, plan.id).await.unwrap();
    let titles: Vec<&str> = materials.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["slide", "peta"]);
    assert!(materials[0].is_validated);
    assert!(!materials[1].is_validated);

    let mut criteria = JsonObject::new();
    criteria.insert("rubrik".to_string(), json!({ "baik": 3, "cukup": 2 }));
    let sheet = add_activity_sheet(
        db,
        plan.id,
        &ActivitySheetCreate {
            title: "Lembar Kerja 1".to_string(),
            instructions: "Tandai lokasi kerajaan pada peta".to_string(),
            activity_type: "individual".to_string(),
            estimated_time_minutes: 15,
            materials_needed: vec!["peta buta".to_string(), "pensil warna".to_string()],
            assessment_criteria: criteria,
            file_path: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(list_activity_sheets(db, plan.id).await.unwrap(), vec![sheet]);

    let err = set_teaching_material_validated(db, 999, true).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "teaching material", .. }));
}
