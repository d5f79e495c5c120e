// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    ai::GeminiClient,
    config::SMART_QUIZ_SIZE,
    error::AppError,
    models::{
        mentor_quiz::{AddQuizQuestionRequest, CreateMentorQuizRequest, ManualQuizSummary, MentorQuiz},
        question::{GenerateQuizRequest, QuizQuestion, SubmitQuizRequest},
    },
    utils::jwt::Claims,
};

/// Helper struct for fetching the answer key of one question.
#[derive(sqlx::FromRow)]
struct AnswerKey {
    question: String,
    correct_option: String,
}

/// Composes a quiz for the current student.
///
/// * `smart` (default): uniform random sample of 5 bank questions, drawn
///   without replacement. Selection ignores the student's weaknesses.
/// * `manual`: the full ordered question set of one mentor quiz; an unknown
///   quiz id yields an empty list, which callers treat as "no questions".
pub async fn generate_quiz(
    State(pool): State<SqlitePool>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mode = req.mode.as_deref().unwrap_or("smart");

    let questions: Vec<QuizQuestion> = match (mode, req.quiz_id) {
        ("manual", Some(quiz_id)) => {
            sqlx::query_as(
                r#"
                SELECT id, question, option_a, option_b, option_c, option_d, correct_option
                FROM mentor_quiz_questions
                WHERE quiz_id = ?
                ORDER BY id
                "#,
            )
            .bind(quiz_id)
            .fetch_all(&pool)
            .await
        }
        _ => {
            sqlx::query_as(
                r#"
                SELECT id, question, option_a, option_b, option_c, option_d, correct_option
                FROM questions
                ORDER BY RANDOM()
                LIMIT ?
                "#,
            )
            .bind(SMART_QUIZ_SIZE)
            .fetch_all(&pool)
            .await
        }
    }
    .map_err(|e| {
        tracing::error!("Failed to compose quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Grades one submitted answer.
///
/// * Looks up the question in the table selected by mode; absent id is a 404
///   and nothing is recorded.
/// * Records exactly one immutable attempt row BEFORE the AI call; the
///   grading result never depends on AI availability.
/// * Asks the AI service for a short explanation, degrading to a fixed
///   fallback string on any failure.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    State(ai): State<GeminiClient>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.sub.parse::<i64>().unwrap_or(0);
    let source = if req.mode.as_deref() == Some("manual") {
        "manual"
    } else {
        "bank"
    };

    let key: Option<AnswerKey> = if source == "manual" {
        sqlx::query_as("SELECT question, correct_option FROM mentor_quiz_questions WHERE id = ?")
            .bind(req.question_id)
            .fetch_optional(&pool)
            .await?
    } else {
        sqlx::query_as("SELECT question, correct_option FROM questions WHERE id = ?")
            .bind(req.question_id)
            .fetch_optional(&pool)
            .await?
    };

    let key = key.ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    // Exact match on the canonical lowercase tag.
    let is_correct = req.selected_option == key.correct_option;

    sqlx::query(
        r#"
        INSERT INTO quiz_attempts (user_id, question_id, is_correct, source, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(req.question_id)
    .bind(is_correct)
    .bind(source)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record quiz attempt: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let prompt = format!(
        "Question: {}\n\
         Student's chosen option: {}\n\
         Correct option: {}\n\n\
         Explain in 2-3 simple sentences why the student's answer is correct or incorrect,\n\
         and give one small hint + one short recommended topic title.",
        key.question, req.selected_option, key.correct_option
    );
    let explanation = ai.generate(&prompt).await;

    Ok(Json(json!({
        "is_correct": is_correct,
        "correct_option": key.correct_option,
        "explanation": explanation,
        "recommendation": "Focus on the concept mentioned in the explanation.",
    })))
}

/// Lists mentor quizzes available to students.
/// Only quizzes with at least one question appear.
pub async fn list_manual_quizzes(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes: Vec<ManualQuizSummary> = sqlx::query_as(
        r#"
        SELECT mq.id, mq.title, mq.description, mq.created_at,
               u.name AS mentor_name,
               COUNT(mqq.id) AS question_count
        FROM mentor_quizzes mq
        JOIN users u ON u.id = mq.created_by
        JOIN mentor_quiz_questions mqq ON mqq.quiz_id = mq.id
        GROUP BY mq.id
        ORDER BY mq.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Creates an empty mentor quiz owned by the current mentor.
pub async fn create_mentor_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateMentorQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mentor_id = claims.sub.parse::<i64>().unwrap_or(0);

    let result = sqlx::query(
        "INSERT INTO mentor_quizzes (title, description, created_by, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(mentor_id)
    .bind(Utc::now())
    .execute(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Lists the current mentor's own quizzes, newest first.
pub async fn list_mentor_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let mentor_id = claims.sub.parse::<i64>().unwrap_or(0);

    let quizzes: Vec<MentorQuiz> = sqlx::query_as(
        r#"
        SELECT id, title, description, created_at
        FROM mentor_quizzes
        WHERE created_by = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(mentor_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(quizzes))
}

/// Appends one question to a mentor quiz.
pub async fn add_quiz_question(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<AddQuizQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let correct_option = payload.correct_option.trim().to_lowercase();
    if !matches!(correct_option.as_str(), "a" | "b" | "c" | "d") {
        return Err(AppError::BadRequest(
            "correct_option must be one of a, b, c, d".to_string(),
        ));
    }

    let quiz: Option<i64> = sqlx::query_scalar("SELECT id FROM mentor_quizzes WHERE id = ?")
        .bind(quiz_id)
        .fetch_optional(&pool)
        .await?;
    quiz.ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let result = sqlx::query(
        r#"
        INSERT INTO mentor_quiz_questions
            (quiz_id, question, option_a, option_b, option_c, option_d,
             correct_option, topic, difficulty)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(quiz_id)
    .bind(&payload.question)
    .bind(&payload.option_a)
    .bind(&payload.option_b)
    .bind(&payload.option_c)
    .bind(&payload.option_d)
    .bind(&correct_option)
    .bind(&payload.topic)
    .bind(payload.difficulty.as_deref().unwrap_or("manual"))
    .execute(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Lists the questions of one mentor quiz in their fixed order.
pub async fn list_quiz_questions(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let questions: Vec<QuizQuestion> = sqlx::query_as(
        r#"
        SELECT id, question, option_a, option_b, option_c, option_d, correct_option
        FROM mentor_quiz_questions
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}
