// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, RegisterRequest, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new student account.
pub async fn register_student(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    register(&pool, "student", payload).await
}

/// Registers a new mentor account.
pub async fn register_mentor(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    register(&pool, "mentor", payload).await
}

/// Shared registration path. Hashes the password with Argon2 before storing.
/// Returns 201 Created with the new account (no credential material).
async fn register(
    pool: &SqlitePool,
    role: &str,
    payload: RegisterRequest,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (name, email, password, role, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(role)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AppError::Conflict(format!("A {} with this email already exists", role))
        } else {
            tracing::error!("Failed to register {}: {:?}", role, e);
            AppError::from(e)
        }
    })?;

    let id = result.last_insert_rowid();

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "name": payload.name,
            "email": payload.email,
            "role": role,
        })),
    ))
}

/// Authenticates a student and returns a JWT token.
pub async fn login_student(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    login(&pool, &config, "student", payload).await
}

/// Authenticates a mentor and returns a JWT token.
pub async fn login_mentor(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    login(&pool, &config, "mentor", payload).await
}

/// Shared login path. The role is part of the lookup, so a student cannot
/// log in through the mentor endpoint with the same email.
async fn login(
    pool: &SqlitePool,
    config: &Config,
    role: &str,
    payload: LoginRequest,
) -> Result<Json<serde_json::Value>, AppError> {
    let user: Option<User> = sqlx::query_as(
        r#"
        SELECT id, name, email, password, role, created_at
        FROM users
        WHERE email = ? AND role = ?
        "#,
    )
    .bind(&payload.email)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = user.ok_or(AppError::AuthError(
        "Invalid credentials or account not registered".to_string(),
    ))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": user.role,
        "name": user.name,
    })))
}
