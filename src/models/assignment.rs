// src/models/assignment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'assignments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Free-form date string supplied by the mentor.
    pub due_date: Option<String>,
}

/// One student's submission state for one assignment.
/// All fields are null until the student submits.
#[derive(Debug, Serialize, FromRow)]
pub struct SubmissionState {
    pub content: Option<String>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub feedback: Option<String>,
    pub rating: Option<i64>,
}

/// Mentor view of a submission, joined with the student's name.
#[derive(Debug, Serialize, FromRow)]
pub struct SubmissionView {
    pub student_id: i64,
    pub student_name: String,
    pub content: Option<String>,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub feedback: Option<String>,
    pub rating: Option<i64>,
}

/// DTO for a mentor creating an assignment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssignmentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// DTO for a student submitting (or re-submitting) an assignment.
#[derive(Debug, Deserialize)]
pub struct SubmitAssignmentRequest {
    pub assignment_id: i64,
    #[serde(default)]
    pub content: String,
}

/// DTO for mentor feedback on a submission, addressed by the
/// (assignment, student) pair rather than a synthetic composite id.
#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub assignment_id: i64,
    pub student_id: i64,
    pub feedback: Option<String>,
    pub rating: Option<i64>,
}
