use serde::{Deserialize, Serialize};

/// A single multiple-choice question as served by `GET /questions`.
///
/// `correct_answer` is only present in local question files. The session
/// never looks at it; correctness is judged by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

impl Question {
    /// Copy of the question with the answer stripped, as a client should see it.
    pub fn without_answer(&self) -> Self {
        Self {
            correct_answer: None,
            ..self.clone()
        }
    }
}
