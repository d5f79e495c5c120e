// src/handlers/assignment.rs

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
    error::AppError,
    models::assignment::{
        Assignment, CreateAssignmentRequest, FeedbackRequest, SubmissionState,
        SubmitAssignmentRequest, SubmissionView,
    },
    utils::jwt::Claims,
};

/// Creates a new assignment.
/// Mentor only.
pub async fn create_assignment(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result =
        sqlx::query("INSERT INTO assignments (title, description, due_date) VALUES (?, ?, ?)")
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(&payload.due_date)
            .execute(&pool)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": result.last_insert_rowid()})),
    ))
}

/// Lists all assignments.
/// Mentor only.
pub async fn list_for_mentor(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let assignments: Vec<Assignment> =
        sqlx::query_as("SELECT id, title, description, due_date FROM assignments ORDER BY id")
            .fetch_all(&pool)
            .await?;

    Ok(Json(assignments))
}

/// Lists all assignments with the current student's submission state.
/// Not-yet-submitted assignments carry an all-null submission object.
pub async fn list_for_student(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.sub.parse::<i64>().unwrap_or(0);

    let assignments: Vec<Assignment> =
        sqlx::query_as("SELECT id, title, description, due_date FROM assignments ORDER BY id")
            .fetch_all(&pool)
            .await?;

    let mut res = Vec::with_capacity(assignments.len());
    for a in assignments {
        let submission: Option<SubmissionState> = sqlx::query_as(
            r#"
            SELECT content, submitted_at, feedback, rating
            FROM assignment_submissions
            WHERE assignment_id = ? AND student_id = ?
            "#,
        )
        .bind(a.id)
        .bind(student_id)
        .fetch_optional(&pool)
        .await?;

        let submission = match submission {
            Some(s) => json!(s),
            None => json!({
                "content": null,
                "submitted_at": null,
                "feedback": null,
                "rating": null,
            }),
        };

        res.push(json!({
            "id": a.id,
            "title": a.title,
            "description": a.description,
            "due_date": a.due_date,
            "submission": submission,
        }));
    }

    Ok(Json(res))
}

/// Submits (or re-submits) an assignment for the current student.
///
/// The UNIQUE (assignment_id, student_id) key plus ON CONFLICT keeps exactly
/// one current submission per pair; a re-submit is an atomic update, so two
/// concurrent submits cannot create a duplicate row.
pub async fn submit_assignment(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.sub.parse::<i64>().unwrap_or(0);

    let assignment: Option<i64> = sqlx::query_scalar("SELECT id FROM assignments WHERE id = ?")
        .bind(req.assignment_id)
        .fetch_optional(&pool)
        .await?;
    assignment.ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO assignment_submissions (assignment_id, student_id, content, submitted_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (assignment_id, student_id)
        DO UPDATE SET content = excluded.content, submitted_at = excluded.submitted_at
        "#,
    )
    .bind(req.assignment_id)
    .bind(student_id)
    .bind(&req.content)
    .bind(Utc::now())
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert assignment submission: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({"status": "ok"})))
}

/// Lists all submissions of one assignment with student names.
/// Mentor only.
pub async fn list_submissions(
    State(pool): State<SqlitePool>,
    Path(assignment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let submissions: Vec<SubmissionView> = sqlx::query_as(
        r#"
        SELECT s.student_id, u.name AS student_name,
               s.content, s.submitted_at, s.feedback, s.rating
        FROM assignment_submissions s
        JOIN users u ON u.id = s.student_id
        WHERE s.assignment_id = ?
        ORDER BY s.submitted_at DESC
        "#,
    )
    .bind(assignment_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(submissions))
}

/// Attaches feedback and a rating to one student's submission.
/// Mentor only.
pub async fn give_feedback(
    State(pool): State<SqlitePool>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE assignment_submissions
        SET feedback = ?, rating = ?
        WHERE assignment_id = ? AND student_id = ?
        "#,
    )
    .bind(&req.feedback)
    .bind(req.rating)
    .bind(req.assignment_id)
    .bind(req.student_id)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Submission not found".to_string()));
    }

    Ok(Json(json!({"status": "updated"})))
}
