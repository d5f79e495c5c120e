// src/handlers/ai_mentor.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::{ai::GeminiClient, error::AppError};

/// DTO for one AI mentor question.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub message: String,
}

/// Stateless single-turn AI mentor chat.
///
/// Empty input never reaches the AI service; nothing is recorded either way.
pub async fn ask(
    State(ai): State<GeminiClient>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Ok(Json(json!({
            "reply": "Type a question so I can actually help you.",
        })));
    }

    let prompt = format!(
        "You are a clear, concise AI mentor for a college-level CS student\n\
         studying an Introduction to Python course.\n\
         Explain in 3-5 short sentences, straight to the point. Avoid fluff.\n\n\
         Student's doubt: {}",
        message
    );
    let reply = ai.generate(&prompt).await;

    Ok(Json(json!({"reply": reply})))
}
