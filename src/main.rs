// src/main.rs

use dotenvy::dotenv;
use smartpath_backend::ai::GeminiClient;
use smartpath_backend::config::Config;
use smartpath_backend::routes;
use smartpath_backend::state::AppState;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    // Seed starter content so a fresh install is usable immediately
    if let Err(e) = seed_question_bank(&pool).await {
        tracing::error!("Failed to seed question bank: {:?}", e);
    }
    if let Err(e) = seed_assignments(&pool).await {
        tracing::error!("Failed to seed assignments: {:?}", e);
    }

    let ai = GeminiClient::new(config.gemini_api_url.clone(), config.gemini_api_key.clone());
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; AI feedback will use fallback replies");
    }

    // Create AppState
    let state = AppState {
        pool: pool.clone(),
        config: config.clone(),
        ai,
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("SmartPath listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// Seeds the shared question bank on first boot.
async fn seed_question_bank(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("Seeding starter question bank");

    // (topic, difficulty, question, option_a..d, correct_option)
    const BANK: &[(&str, &str, &str, &str, &str, &str, &str, &str)] = &[
        (
            "Variables",
            "easy",
            "What is the correct way to declare a variable in Python?",
            "int x = 5",
            "x := 5",
            "x = 5",
            "declare x = 5",
            "c",
        ),
        (
            "Variables",
            "easy",
            "Which of these is a valid variable name in Python?",
            "2value",
            "value_2",
            "value-2",
            "value 2",
            "b",
        ),
        (
            "Loops",
            "easy",
            "Which loop is commonly used to iterate over a sequence in Python?",
            "for",
            "while",
            "repeat",
            "loop",
            "a",
        ),
        (
            "Loops",
            "medium",
            "What does range(5) generate?",
            "0 to 4",
            "1 to 5",
            "0 to 5",
            "1 to 4",
            "a",
        ),
        (
            "Functions",
            "medium",
            "Which keyword is used to define a function in Python?",
            "func",
            "function",
            "def",
            "lambda",
            "c",
        ),
        (
            "Functions",
            "medium",
            "What is the correct way to call a function named foo with no arguments?",
            "call foo()",
            "foo",
            "foo()",
            "foo[]",
            "c",
        ),
        (
            "Conditions",
            "easy",
            "Which keyword is used for conditional branching in Python?",
            "if",
            "when",
            "case",
            "switch",
            "a",
        ),
        (
            "Lists",
            "medium",
            "How do you append an element to a list in Python?",
            "list.add(x)",
            "list.append(x)",
            "add(list, x)",
            "push(list, x)",
            "b",
        ),
        (
            "OOP",
            "medium",
            "What does OOP stand for?",
            "Object-Oriented Programming",
            "Open Operational Process",
            "Object Original Protocol",
            "Optional Object Processing",
            "a",
        ),
    ];

    for &(topic, difficulty, question, a, b, c, d, correct) in BANK {
        sqlx::query(
            r#"
            INSERT INTO questions
                (topic, difficulty, question, option_a, option_b, option_c, option_d, correct_option)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(topic)
        .bind(difficulty)
        .bind(question)
        .bind(a)
        .bind(b)
        .bind(c)
        .bind(d)
        .bind(correct)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Seeds the starter assignments on first boot.
async fn seed_assignments(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assignments")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("Seeding starter assignments");

    const ASSIGNMENTS: &[(&str, &str, &str)] = &[
        (
            "M1: Variables Practice",
            "Write 5 Python programs using variables and print their values.",
            "2025-12-31",
        ),
        (
            "M2: Loops Practice",
            "Solve 3 problems using for and while loops.",
            "2025-12-31",
        ),
        (
            "M3: Functions Mini-Project",
            "Create a small menu-driven program using functions.",
            "2025-12-31",
        ),
    ];

    for &(title, description, due_date) in ASSIGNMENTS {
        sqlx::query("INSERT INTO assignments (title, description, due_date) VALUES (?, ?, ?)")
            .bind(title)
            .bind(description)
            .bind(due_date)
            .execute(pool)
            .await?;
    }

    Ok(())
}
