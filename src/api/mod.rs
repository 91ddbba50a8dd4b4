//! Access to the quiz backend.
//!
//! [`QuizApi`] is the seam between the session and the network: [`HttpApi`]
//! talks to the REST backend, [`LocalApi`] serves a question file offline.
//! [`Backend`] wraps either one with the leaderboard cache.

mod backend;
mod http;
mod local;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Identity, LeaderboardEntry, Question};
use crate::protocol::{AnswerResponse, RegistrationForm, SignInForm, ValidationError};

pub use backend::{Backend, LeaderboardCache};
pub use http::HttpApi;
pub use local::LocalApi;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("You must be signed in to do that")]
    Unauthenticated,

    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("failed to fetch {what}: {reason}")]
    Fetch { what: &'static str, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Short text suitable for an inline error line.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Please sign in to play the quiz.".to_string(),
            ApiError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Server { message, .. } => message.clone(),
            ApiError::Fetch { what, .. } => format!("Failed to fetch {what}"),
            ApiError::Validation(e) => e.message.to_string(),
        }
    }
}

/// Operations the quiz backend offers.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// All questions in presentation order.
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// Judge one answer. Fails with [`ApiError::Unauthenticated`] before any
    /// I/O when no identity is given.
    async fn submit_answer(
        &self,
        identity: Option<&Identity>,
        question_id: &str,
        selected_option: &str,
    ) -> Result<AnswerResponse, ApiError>;

    /// Ranked entries, best first.
    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError>;

    async fn register(&self, form: &RegistrationForm) -> Result<(), ApiError>;

    async fn sign_in(&self, form: &SignInForm) -> Result<Identity, ApiError>;
}
