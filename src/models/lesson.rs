// src/models/lesson.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'lessons' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub topic: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Student-facing lesson row including the author's name.
#[derive(Debug, Serialize, FromRow)]
pub struct LessonWithMentor {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub topic: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub mentor_name: String,
}

/// DTO for a mentor publishing a lesson.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 500))]
    pub video_url: Option<String>,
    #[validate(length(max = 100))]
    pub topic: Option<String>,
}
