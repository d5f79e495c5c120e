// src/handlers/message.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::message::{AnswerMessageRequest, MentorMessageView, SendMessageRequest},
    utils::jwt::Claims,
};

/// Sends a student question to the mentor inbox.
///
/// Single-mentor routing: every question lands with the lowest-id mentor.
pub async fn send_to_mentor(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student_id = claims.sub.parse::<i64>().unwrap_or(0);

    let mentor_id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE role = 'mentor' ORDER BY id LIMIT 1")
            .fetch_optional(&pool)
            .await?;
    let mentor_id =
        mentor_id.ok_or_else(|| AppError::BadRequest("No mentor registered yet.".to_string()))?;

    let result = sqlx::query(
        r#"
        INSERT INTO mentor_messages (student_id, mentor_id, question_text, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(student_id)
    .bind(mentor_id)
    .bind(&payload.question_text)
    .bind(Utc::now())
    .execute(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Lists all student questions, newest first.
/// Mentor only.
pub async fn list_messages(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let messages: Vec<MentorMessageView> = sqlx::query_as(
        r#"
        SELECT m.id, u.name AS student_name,
               m.question_text, m.answer_text, m.created_at, m.answered_at
        FROM mentor_messages m
        JOIN users u ON u.id = m.student_id
        ORDER BY m.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(messages))
}

/// Answers one student question.
/// Mentor only.
pub async fn answer_message(
    State(pool): State<SqlitePool>,
    Json(payload): Json<AnswerMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        "UPDATE mentor_messages SET answer_text = ?, answered_at = ? WHERE id = ?",
    )
    .bind(&payload.answer_text)
    .bind(Utc::now())
    .bind(payload.message_id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Message not found".to_string()));
    }

    Ok(Json(json!({"status": "answered"})))
}
