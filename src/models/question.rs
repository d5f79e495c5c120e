// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// A question as delivered to the quiz player. Serves both the shared bank
/// and mentor-quiz questions, which carry the same answer shape.
///
/// Note: the payload includes `correct_option`, so the client holds the
/// answer key before grading. In a production app we should split
/// "present question" from "grade submission"; kept as-is for compatibility
/// with the existing frontend contract.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Canonical lowercase tag: 'a' | 'b' | 'c' | 'd'.
    pub correct_option: String,
}

/// DTO for composing a quiz.
///
/// `mode` defaults to "smart" (random bank sample). "manual" together with a
/// `quiz_id` fetches that mentor quiz verbatim.
#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub mode: Option<String>,
    pub quiz_id: Option<i64>,
}

/// DTO for grading one answered question.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub question_id: i64,
    pub selected_option: String,
    /// "manual" records the attempt with source 'manual' and grades against
    /// the mentor-quiz table; anything else is a bank attempt.
    pub mode: Option<String>,
}
