// src/handlers/lesson.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::lesson::{CreateLessonRequest, Lesson, LessonWithMentor},
    utils::jwt::Claims,
};

/// Lists all lessons for students, newest first, with the author's name.
pub async fn list_for_students(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let lessons: Vec<LessonWithMentor> = sqlx::query_as(
        r#"
        SELECT l.id, l.title, l.description, l.video_url, l.topic, l.created_at,
               COALESCE(u.name, 'Mentor') AS mentor_name
        FROM lessons l
        LEFT JOIN users u ON u.id = l.created_by
        ORDER BY l.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(lessons))
}

/// Publishes a new lesson owned by the current mentor.
pub async fn create_lesson(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mentor_id = claims.sub.parse::<i64>().unwrap_or(0);

    let result = sqlx::query(
        r#"
        INSERT INTO lessons (title, description, video_url, topic, created_by, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.video_url)
    .bind(&payload.topic)
    .bind(mentor_id)
    .bind(Utc::now())
    .execute(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Lists the current mentor's own lessons, newest first.
pub async fn list_for_mentor(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let mentor_id = claims.sub.parse::<i64>().unwrap_or(0);

    let lessons: Vec<Lesson> = sqlx::query_as(
        r#"
        SELECT id, title, description, video_url, topic, created_at
        FROM lessons
        WHERE created_by = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(mentor_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(lessons))
}
