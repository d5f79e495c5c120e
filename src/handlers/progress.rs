// src/handlers/progress.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    mastery::{self, ProgressSummary, TopicRow},
    utils::jwt::Claims,
};

/// Runs the bank-attempt aggregation for one user.
///
/// Both queries filter on `source = 'bank'`: manual-quiz attempts are kept
/// for history but must never move the accuracy figures. Shared by the
/// student progress/learning-path endpoints and the mentor roster.
pub async fn progress_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<ProgressSummary, AppError> {
    #[derive(sqlx::FromRow)]
    struct OverallRow {
        total: i64,
        correct: i64,
    }

    let overall: OverallRow = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(is_correct), 0) AS correct
        FROM quiz_attempts
        WHERE user_id = ? AND source = 'bank'
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let topics: Vec<TopicRow> = sqlx::query_as(
        r#"
        SELECT q.topic,
               COALESCE(SUM(qa.is_correct), 0) AS correct,
               COUNT(*) AS total
        FROM quiz_attempts qa
        JOIN questions q ON q.id = qa.question_id
        WHERE qa.user_id = ? AND qa.source = 'bank'
        GROUP BY q.topic
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(mastery::summarize(overall.correct, overall.total, topics))
}

/// Progress dashboard for the current student.
pub async fn get_progress(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let prog = progress_for_user(&pool, user_id).await?;

    let topic_stats: serde_json::Map<String, serde_json::Value> = prog
        .topic_stats
        .iter()
        .map(|t| {
            (
                t.name.clone(),
                json!({
                    "name": t.name,
                    "accuracy": t.accuracy,
                    "correct": t.correct,
                    "total": t.total,
                }),
            )
        })
        .collect();

    Ok(Json(json!({
        "overall_accuracy": prog.overall_accuracy,
        "total_attempts": prog.total_attempts,
        // Placeholder heuristic: two minutes per attempt.
        "time_spent_minutes": prog.total_attempts * 2,
        "strengths": prog.strengths(),
        "weaknesses": prog.weaknesses,
        "topic_stats": topic_stats,
    })))
}

/// Recommended learning path for the current student, one entry per topic
/// in grouping order (or the single "no data yet" sentinel).
pub async fn get_learning_path(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    let prog = progress_for_user(&pool, user_id).await?;

    Ok(Json(mastery::learning_path(&prog.topic_stats)))
}

/// Roster of all students with their aggregate progress, for the mentor
/// dashboard.
pub async fn list_students(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    #[derive(sqlx::FromRow)]
    struct StudentRow {
        id: i64,
        name: String,
    }

    let students: Vec<StudentRow> =
        sqlx::query_as("SELECT id, name FROM users WHERE role = 'student' ORDER BY id")
            .fetch_all(&pool)
            .await?;

    let mut result = Vec::with_capacity(students.len());
    for s in students {
        let prog = progress_for_user(&pool, s.id).await?;
        result.push(json!({
            "id": s.id,
            "name": s.name,
            "overall_accuracy": prog.overall_accuracy,
            "total_attempts": prog.total_attempts,
            "weaknesses": prog.weaknesses,
        }));
    }

    Ok(Json(result))
}
