// tests/api_tests.rs

use smartpath_backend::{
    ai::{FALLBACK_REPLY, MISSING_KEY_REPLY},
    config::Config,
    routes,
    state::AppState,
};
use smartpath_backend::ai::GeminiClient;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Each test gets a private in-memory database; the pool is returned for
/// direct seeding and row-count assertions.
async fn spawn_app() -> (String, SqlitePool) {
    spawn_app_with_ai(None, "http://127.0.0.1:1/unused").await
}

/// Variant with control over the AI credential and endpoint, used to drive
/// the degradation paths (missing key vs. unreachable service).
async fn spawn_app_with_ai(api_key: Option<&str>, api_url: &str) -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        gemini_api_key: api_key.map(str::to_string),
        gemini_api_url: api_url.to_string(),
    };

    let ai = GeminiClient::new(config.gemini_api_url.clone(), config.gemini_api_key.clone());
    let state = AppState {
        pool: pool.clone(),
        config,
        ai,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Registers an account with a unique email and logs it in.
/// Returns (user id, bearer token).
async fn register(
    client: &reqwest::Client,
    address: &str,
    role: &str,
    name: &str,
) -> (i64, String) {
    let email = format!(
        "{}_{}@example.com",
        name,
        &uuid::Uuid::new_v4().to_string()[..8]
    );

    let resp = client
        .post(format!("{address}/api/auth/register/{role}"))
        .json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(resp.status().as_u16(), 201);
    let body: serde_json::Value = resp.json().await.unwrap();
    let id = body["id"].as_i64().expect("id missing from register response");

    let login: serde_json::Value = client
        .post(format!("{address}/api/auth/login/{role}"))
        .json(&serde_json::json!({"email": email, "password": "password123"}))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");
    let token = login["token"].as_str().expect("Token not found").to_string();

    (id, token)
}

async fn seed_question(pool: &SqlitePool, topic: &str, correct_option: &str) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO questions
            (topic, difficulty, question, option_a, option_b, option_c, option_d, correct_option)
        VALUES (?, 'easy', 'What does the interpreter print?', 'A', 'B', 'C', 'D', ?)
        "#,
    )
    .bind(topic)
    .bind(correct_option)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

async fn attempt_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM quiz_attempts")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{address}/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["course"], "SMARTPATH");
}

#[tokio::test]
async fn register_works() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{address}/api/auth/register/student"))
        .json(&serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["role"], "student");
    assert!(body["id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn register_rejects_blank_fields() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{address}/api/auth/register/student"))
        .json(&serde_json::json!({
            "name": "",
            "email": "blank@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let payload = serde_json::json!({
        "name": "Grace",
        "email": "grace@example.com",
        "password": "password123"
    });

    let first = client
        .post(format!("{address}/api/auth/register/student"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{address}/api/auth/register/student"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);

    // No partial write: still exactly one account for the email.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind("grace@example.com")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{address}/api/auth/register/student"))
        .json(&serde_json::json!({
            "name": "Edsger",
            "email": "edsger@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{address}/api/auth/login/student"))
        .json(&serde_json::json!({
            "email": "edsger@example.com",
            "password": "not-the-password"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn student_routes_require_token() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{address}/api/student/progress"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn mentor_routes_reject_students() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_id, token) = register(&client, &address, "student", "intruder").await;

    let response = client
        .get(format!("{address}/api/mentor/assignments"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn smart_quiz_draws_five_distinct_questions() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    for i in 0..9 {
        seed_question(&pool, &format!("Topic {}", i), "a").await;
    }

    let (_id, token) = register(&client, &address, "student", "quizzer").await;

    let response = client
        .post(format!("{address}/api/student/quiz/generate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let questions: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(questions.len(), 5);

    let mut ids: Vec<i64> = questions.iter().map(|q| q["id"].as_i64().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5, "a draw must not repeat questions");

    // Current payload contract: the answer key ships with the question.
    assert!(questions.iter().all(|q| q["correct_option"].is_string()));
}

#[tokio::test]
async fn smart_quiz_with_small_bank_returns_all_of_it() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    for i in 0..3 {
        seed_question(&pool, &format!("Topic {}", i), "a").await;
    }

    let (_id, token) = register(&client, &address, "student", "quizzer").await;

    let questions: Vec<serde_json::Value> = client
        .post(format!("{address}/api/student/quiz/generate"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"mode": "smart"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(questions.len(), 3);
}

#[tokio::test]
async fn manual_quiz_flow() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_mentor_id, mentor_token) = register(&client, &address, "mentor", "mentor").await;
    let (_student_id, student_token) = register(&client, &address, "student", "student").await;

    // Mentor authors a quiz with two questions.
    let quiz: serde_json::Value = client
        .post(format!("{address}/api/mentor/quizzes"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({"title": "Recursion drills", "description": "Two warmups"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();

    for (question, correct) in [("Base case of factorial?", "a"), ("Depth of fib(3)?", "B")] {
        let resp = client
            .post(format!("{address}/api/mentor/quizzes/{quiz_id}/questions"))
            .bearer_auth(&mentor_token)
            .json(&serde_json::json!({
                "question": question,
                "option_a": "0",
                "option_b": "1",
                "option_c": "2",
                "option_d": "3",
                "correct_option": correct,
                "topic": "Recursion"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
    }

    // Student sees the quiz in the manual listing, with a question count.
    let listing: Vec<serde_json::Value> = client
        .get(format!("{address}/api/student/manual-quizzes"))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["question_count"], 2);
    assert_eq!(listing[0]["mentor_name"], "mentor");

    // Manual mode returns the full ordered set; the uppercase correct tag
    // was normalized at creation time.
    let questions: Vec<serde_json::Value> = client
        .post(format!("{address}/api/student/quiz/generate"))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({"mode": "manual", "quiz_id": quiz_id}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(questions.len(), 2);
    assert!(questions[0]["id"].as_i64().unwrap() < questions[1]["id"].as_i64().unwrap());
    assert_eq!(questions[1]["correct_option"], "b");

    // Unknown quiz id means "no questions", not an error.
    let empty: Vec<serde_json::Value> = client
        .post(format!("{address}/api/student/quiz/generate"))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({"mode": "manual", "quiz_id": 9999}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn grading_records_attempt_even_when_ai_is_unreachable() {
    // A key is configured but the endpoint refuses connections, so the AI
    // call itself fails after the attempt row is written.
    let (address, pool) = spawn_app_with_ai(Some("test-key"), "http://127.0.0.1:1").await;
    let client = reqwest::Client::new();

    let question_id = seed_question(&pool, "Loops", "a").await;
    let (_id, token) = register(&client, &address, "student", "grader").await;

    let result: serde_json::Value = client
        .post(format!("{address}/api/student/quiz/submit"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"question_id": question_id, "selected_option": "a"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["is_correct"], true);
    assert_eq!(result["correct_option"], "a");
    assert_eq!(result["explanation"], FALLBACK_REPLY);
    assert!(!result["explanation"].as_str().unwrap().is_empty());
    assert!(result["recommendation"].is_string());

    assert_eq!(attempt_count(&pool).await, 1);
}

#[tokio::test]
async fn grading_without_api_key_still_returns_fallback() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let question_id = seed_question(&pool, "Loops", "a").await;
    let (_id, token) = register(&client, &address, "student", "grader").await;

    let result: serde_json::Value = client
        .post(format!("{address}/api/student/quiz/submit"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"question_id": question_id, "selected_option": "b"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(result["is_correct"], false);
    assert_eq!(result["correct_option"], "a");
    assert_eq!(result["explanation"], MISSING_KEY_REPLY);

    assert_eq!(attempt_count(&pool).await, 1);
}

#[tokio::test]
async fn grading_unknown_question_records_nothing() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_id, token) = register(&client, &address, "student", "grader").await;

    let response = client
        .post(format!("{address}/api/student/quiz/submit"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"question_id": 424242, "selected_option": "a"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(attempt_count(&pool).await, 0);
}

#[tokio::test]
async fn manual_mode_attempts_are_tagged_manual() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_mentor_id, mentor_token) = register(&client, &address, "mentor", "mentor").await;
    let (_student_id, student_token) = register(&client, &address, "student", "student").await;

    let quiz: serde_json::Value = client
        .post(format!("{address}/api/mentor/quizzes"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({"title": "Side quiz"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();

    let question: serde_json::Value = client
        .post(format!("{address}/api/mentor/quizzes/{quiz_id}/questions"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({
            "question": "Pick a",
            "option_a": "a", "option_b": "b", "option_c": "c", "option_d": "d",
            "correct_option": "a"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = question["id"].as_i64().unwrap();

    let resp = client
        .post(format!("{address}/api/student/quiz/submit"))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "question_id": question_id,
            "selected_option": "a",
            "mode": "manual"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let source: String = sqlx::query_scalar("SELECT source FROM quiz_attempts LIMIT 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(source, "manual");

    // The manual attempt is history, not analytics.
    let progress: serde_json::Value = client
        .get(format!("{address}/api/student/progress"))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["total_attempts"], 0);
}

#[tokio::test]
async fn assignment_resubmission_keeps_a_single_row() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_mentor_id, mentor_token) = register(&client, &address, "mentor", "mentor").await;
    let (student_id, student_token) = register(&client, &address, "student", "student").await;

    let assignment: serde_json::Value = client
        .post(format!("{address}/api/mentor/assignments"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({
            "title": "Loop exercises",
            "description": "Three while loops",
            "due_date": "2026-09-01"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let assignment_id = assignment["id"].as_i64().unwrap();

    for content in ["first draft", "final version"] {
        let resp = client
            .post(format!("{address}/api/student/assignments/submit"))
            .bearer_auth(&student_token)
            .json(&serde_json::json!({"assignment_id": assignment_id, "content": content}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    let (rows, content): (i64, String) = {
        let rows: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignment_submissions WHERE assignment_id = ? AND student_id = ?",
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        let content: String = sqlx::query_scalar(
            "SELECT content FROM assignment_submissions WHERE assignment_id = ? AND student_id = ?",
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        (rows, content)
    };
    assert_eq!(rows, 1, "re-submitting must update, not insert");
    assert_eq!(content, "final version");

    // Mentor reviews and rates the submission.
    let resp = client
        .post(format!("{address}/api/mentor/submissions/feedback"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({
            "assignment_id": assignment_id,
            "student_id": student_id,
            "feedback": "Tidy. Watch the off-by-one in problem 2.",
            "rating": 4
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let submissions: Vec<serde_json::Value> = client
        .get(format!("{address}/api/mentor/assignments/{assignment_id}/submissions"))
        .bearer_auth(&mentor_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["student_name"], "student");

    // The student sees the feedback on their assignment list.
    let assignments: Vec<serde_json::Value> = client
        .get(format!("{address}/api/student/assignments"))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0]["submission"]["rating"], 4);
    assert_eq!(
        assignments[0]["submission"]["feedback"],
        "Tidy. Watch the off-by-one in problem 2."
    );
}

#[tokio::test]
async fn feedback_for_missing_submission_is_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_mentor_id, mentor_token) = register(&client, &address, "mentor", "mentor").await;

    let response = client
        .post(format!("{address}/api/mentor/submissions/feedback"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({
            "assignment_id": 1,
            "student_id": 1,
            "feedback": "ghost",
            "rating": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn message_flow_routes_to_the_single_mentor() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_student_id, student_token) = register(&client, &address, "student", "asker").await;

    // No mentor registered yet: the send is rejected outright.
    let response = client
        .post(format!("{address}/api/student/mentor/message"))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({"question_text": "Is anyone there?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let (_mentor_id, mentor_token) = register(&client, &address, "mentor", "mentor").await;

    let response = client
        .post(format!("{address}/api/student/mentor/message"))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({"question_text": "Why does my loop never end?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let inbox: Vec<serde_json::Value> = client
        .get(format!("{address}/api/mentor/messages"))
        .bearer_auth(&mentor_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["student_name"], "asker");
    assert!(inbox[0]["answer_text"].is_null());
    let message_id = inbox[0]["id"].as_i64().unwrap();

    let response = client
        .post(format!("{address}/api/mentor/messages"))
        .bearer_auth(&mentor_token)
        .json(&serde_json::json!({
            "message_id": message_id,
            "answer_text": "Check the loop condition against your counter."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let inbox: Vec<serde_json::Value> = client
        .get(format!("{address}/api/mentor/messages"))
        .bearer_auth(&mentor_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        inbox[0]["answer_text"],
        "Check the loop condition against your counter."
    );
    assert!(inbox[0]["answered_at"].is_string());
}

#[tokio::test]
async fn ai_mentor_empty_message_short_circuits() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_id, token) = register(&client, &address, "student", "chatter").await;

    let reply: serde_json::Value = client
        .post(format!("{address}/api/student/ai-mentor"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"message": "   "}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply["reply"], "Type a question so I can actually help you.");
}

#[tokio::test]
async fn ai_mentor_degrades_to_fallback_without_key() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_id, token) = register(&client, &address, "student", "chatter").await;

    let reply: serde_json::Value = client
        .post(format!("{address}/api/student/ai-mentor"))
        .bearer_auth(&token)
        .json(&serde_json::json!({"message": "What is a list comprehension?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply["reply"], MISSING_KEY_REPLY);
    assert!(!reply["reply"].as_str().unwrap().is_empty());
}
