pub const INIT_SCHEMA_SQL: &str = include_str!("../../sql/001_init_schema.sql");
pub const HERO_DIARY_PROGRESS_UNIQUE_SQL: &str =
    include_str!("../../sql/002_hero_diary_progress_unique.sql");

/// Every table created by the schema, parents before children.
pub const TABLES: &[&str] = &[
    "users",
    "student_profiles",
    "teacher_profiles",
    "lesson_plans",
    "teaching_materials",
    "activity_sheets",
    "historical_periods",
    "quiz_levels",
    "quiz_questions",
    "quiz_attempts",
    "student_answers",
    "badges",
    "student_badges",
    "vocabulary_terms",
    "vocabulary_visuals",
    "term_connections",
    "historical_figures",
    "diary_entries",
    "timeline_events",
    "figure_multimedia",
    "hero_diary_progress",
    "ar_triggers",
    "ar_models",
    "ar_experiences",
    "ar_sessions",
];

/// Splits a script on `;` outside of quoted text. `--` comment lines are
/// dropped and empty statements skipped.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for line in sql.lines() {
        if !in_single_quote && !in_double_quote && line.trim_start().starts_with("--") {
            continue;
        }

        for ch in line.chars() {
            match ch {
                '\'' if !in_double_quote => {
                    in_single_quote = !in_single_quote;
                }
                '"' if !in_single_quote => {
                    in_double_quote = !in_double_quote;
                }
                ';' if !in_single_quote && !in_double_quote => {
                    push_statement(&mut statements, &current);
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        current.push('\n');
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let stmt = raw.trim();
    if !stmt.is_empty() {
        statements.push(stmt.to_string());
    }
}
