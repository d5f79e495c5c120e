// src/models/message.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Mentor inbox row, joined with the asking student's name.
#[derive(Debug, Serialize, FromRow)]
pub struct MentorMessageView {
    pub id: i64,
    pub student_name: String,
    pub question_text: String,
    pub answer_text: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub answered_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for a student asking their mentor a question.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "A question is required."))]
    pub question_text: String,
}

/// DTO for a mentor answering a message.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerMessageRequest {
    pub message_id: i64,
    #[validate(length(min = 1, max = 5000, message = "An answer is required."))]
    pub answer_text: String,
}
