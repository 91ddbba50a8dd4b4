//! # orbit-quiz
//!
//! A timed multiple-choice quiz played in the terminal against a REST
//! backend, or offline from a local question file.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clap::Parser;
//! use orbit_quiz::{Config, Quiz, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = Config::parse();
//!     let quiz = Quiz::from_config(&config)?;
//!
//!     // Take over the terminal until the player quits
//!     quiz.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
mod data;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod quiz;
pub mod terminal;

use std::io;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

pub use api::{ApiError, Backend, HttpApi, LocalApi, QuizApi};
pub use config::Config;
pub use data::{load_questions_from_json, LoadError};
pub use models::{Identity, LeaderboardEntry, Question};
pub use quiz::{
    Clock, FileStore, KeyValueStore, MemoryStore, QuizSession, StoreError, SystemClock,
    TimerPersistence,
};

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),

    #[error("state storage error: {0}")]
    Store(#[from] StoreError),

    #[error("backend error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A quiz ready to be run in the terminal.
pub struct Quiz {
    session: QuizSession,
    backend: Backend,
    identity: Option<Identity>,
    source: String,
}

impl Quiz {
    /// Assemble a quiz from its parts. Useful with a custom [`QuizApi`].
    pub fn new(
        api: Arc<dyn QuizApi>,
        store: Arc<dyn KeyValueStore>,
        identity: Option<Identity>,
        source: impl Into<String>,
    ) -> Self {
        let timer = TimerPersistence::new(store, Arc::new(SystemClock));
        Self {
            session: QuizSession::new(timer),
            backend: Backend::new(api),
            identity,
            source: source.into(),
        }
    }

    /// Play offline from a JSON question file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use orbit_quiz::{MemoryStore, Quiz};
    ///
    /// let quiz = Quiz::from_json("questions.json", Arc::new(MemoryStore::new()))
    ///     .expect("Failed to load quiz");
    /// ```
    pub fn from_json<P: AsRef<Path>>(
        path: P,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, QuizError> {
        let path = path.as_ref();
        let api = LocalApi::from_json(path)?;
        Ok(Self::new(
            Arc::new(api),
            store,
            None,
            format!("offline: {}", path.display()),
        ))
    }

    /// Build everything the command line asks for.
    pub fn from_config(config: &Config) -> Result<Self, QuizError> {
        let store: Arc<dyn KeyValueStore> = if config.no_persist {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open(&config.state_dir)?)
        };

        let mut quiz = match &config.questions {
            Some(path) => Self::from_json(path, store)?,
            None => {
                let api = HttpApi::new(&config.api_url, config.auth_url(), config.timeout())?;
                Self::new(Arc::new(api), store, None, config.api_url.clone())
            }
        };

        if let Some(user) = &config.user {
            quiz.identity = Some(Identity::new(user.clone()));
        }

        info!(
            "Quiz ready: source={}, signed_in={}",
            quiz.source,
            quiz.identity.is_some()
        );
        Ok(quiz)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal and return when the player quits.
    pub async fn run(self) -> Result<(), QuizError> {
        client::run(self.session, self.backend, self.identity, self.source).await
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_from_config_uses_user_flag() {
        let config =
            Config::try_parse_from(["orbit-quiz", "--user", "vega", "--no-persist"]).unwrap();
        let quiz = Quiz::from_config(&config).unwrap();
        assert_eq!(quiz.identity().map(|i| i.user_id.as_str()), Some("vega"));
        assert_eq!(quiz.source(), "http://localhost:3000");
    }

    #[test]
    fn test_from_config_missing_question_file() {
        let config = Config::try_parse_from([
            "orbit-quiz",
            "--questions",
            "/nonexistent/questions.json",
            "--no-persist",
        ])
        .unwrap();
        assert!(matches!(
            Quiz::from_config(&config),
            Err(QuizError::Load(_))
        ));
    }
}
