// src/routes.rs

use axum::{
    Json, Router,
    http::{HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::COURSE_NAME,
    handlers::{ai_mentor, assignment, auth, lesson, message, progress, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, mentor_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Public auth routes, student routes, and mentor routes are separate
///   sub-routers; role gating happens here at the boundary, so handlers only
///   ever see plain user ids from `Claims`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: [HeaderValue; 2] = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register/student", post(auth::register_student))
        .route("/register/mentor", post(auth::register_mentor))
        .route("/login/student", post(auth::login_student))
        .route("/login/mentor", post(auth::login_mentor));

    let student_routes = Router::new()
        .route("/progress", get(progress::get_progress))
        .route("/learning-path", get(progress::get_learning_path))
        .route("/manual-quizzes", get(quiz::list_manual_quizzes))
        .route("/quiz/generate", post(quiz::generate_quiz))
        .route("/quiz/submit", post(quiz::submit_quiz))
        .route("/assignments", get(assignment::list_for_student))
        .route("/assignments/submit", post(assignment::submit_assignment))
        .route("/lessons", get(lesson::list_for_students))
        .route("/mentor/message", post(message::send_to_mentor))
        .route("/ai-mentor", post(ai_mentor::ask))
        // Double middleware protection: Auth first, then role check
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let mentor_routes = Router::new()
        .route(
            "/assignments",
            get(assignment::list_for_mentor).post(assignment::create_assignment),
        )
        .route(
            "/assignments/{id}/submissions",
            get(assignment::list_submissions),
        )
        .route("/submissions/feedback", post(assignment::give_feedback))
        .route("/students", get(progress::list_students))
        .route(
            "/lessons",
            get(lesson::list_for_mentor).post(lesson::create_lesson),
        )
        .route(
            "/quizzes",
            get(quiz::list_mentor_quizzes).post(quiz::create_mentor_quiz),
        )
        .route(
            "/quizzes/{id}/questions",
            get(quiz::list_quiz_questions).post(quiz::add_quiz_question),
        )
        .route(
            "/messages",
            get(message::list_messages).post(message::answer_message),
        )
        .layer(middleware::from_fn(mentor_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/student", student_routes)
        .nest("/api/mentor", mentor_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "course": COURSE_NAME}))
}
