// src/models/mentor_quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'mentor_quizzes' table: a fixed, mentor-authored question
/// set. Excluded from the random bank and from analytics.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MentorQuiz {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Student-facing quiz listing row, joined with the author and a question
/// count. Quizzes without questions are filtered out by the query.
#[derive(Debug, Serialize, FromRow)]
pub struct ManualQuizSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub mentor_name: String,
    pub question_count: i64,
}

/// DTO for creating a mentor quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMentorQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// DTO for appending one question to a mentor quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct AddQuizQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(length(min = 1, max = 500))]
    pub option_a: String,
    #[validate(length(min = 1, max = 500))]
    pub option_b: String,
    #[validate(length(min = 1, max = 500))]
    pub option_c: String,
    #[validate(length(min = 1, max = 500))]
    pub option_d: String,
    /// Normalized to a lowercase a-d tag before storage.
    #[validate(length(min = 1, max = 10))]
    pub correct_option: String,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
}
