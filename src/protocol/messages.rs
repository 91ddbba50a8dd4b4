//! Request and response bodies for the quiz backend.
//!
//! All bodies are JSON with camelCase field names.

use serde::{Deserialize, Serialize};

/// Body of `POST /answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: String,
    pub selected_option: String,
    pub username: String,
    pub user_id: String,
}

/// Response of `POST /answer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub correct: bool,
}

/// Error body returned by the account endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMessage {
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Successful sign-in body. Either id field may be present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub user_id: Option<String>,
    pub id: Option<String>,
}

pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// Pick the message to show for a failed account request.
///
/// Prefers `message`, then `error`, then a generic fallback.
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .and_then(|msg| msg.message.or(msg.error))
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// User id from a sign-in body, if the server sent one.
pub fn extract_user_id(body: &str) -> Option<String> {
    let response: SignInResponse = serde_json::from_str(body).ok()?;
    response
        .user_id
        .or(response.id)
        .filter(|id| !id.trim().is_empty())
}
