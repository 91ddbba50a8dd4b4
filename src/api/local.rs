//! Offline backend serving a local question file.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::data::{load_questions_from_json, LoadError};
use crate::models::{Identity, LeaderboardEntry, Question};
use crate::protocol::{AnswerResponse, RegistrationForm, SignInForm};

use super::{ApiError, QuizApi};

#[derive(Default)]
struct Scoreboard {
    /// Question ids each user has answered correctly.
    solved: HashMap<String, HashSet<String>>,
    /// Email to user id, so signing in twice yields the same player.
    accounts: HashMap<String, String>,
}

/// Judges answers against the file's `correctAnswer` fields and keeps
/// scores in memory.
pub struct LocalApi {
    questions: Vec<Question>,
    scoreboard: Mutex<Scoreboard>,
}

impl LocalApi {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            scoreboard: Mutex::new(Scoreboard::default()),
        }
    }

    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let questions = load_questions_from_json(path)?;
        info!("Loaded {} local questions", questions.len());
        Ok(Self::new(questions))
    }

    fn scoreboard(&self) -> std::sync::MutexGuard<'_, Scoreboard> {
        self.scoreboard.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn user_id_for(&self, email: &str) -> String {
        let mut board = self.scoreboard();
        board
            .accounts
            .entry(email.to_lowercase())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }
}

#[async_trait]
impl QuizApi for LocalApi {
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        Ok(self.questions.iter().map(Question::without_answer).collect())
    }

    async fn submit_answer(
        &self,
        identity: Option<&Identity>,
        question_id: &str,
        selected_option: &str,
    ) -> Result<AnswerResponse, ApiError> {
        let identity = identity.ok_or(ApiError::Unauthenticated)?;

        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| ApiError::Server {
                status: 404,
                message: format!("Unknown question {question_id}"),
            })?;

        let correct = question.correct_answer.as_deref() == Some(selected_option);
        debug!(
            "Local answer from {} for {}: correct={}",
            identity.user_id, question_id, correct
        );

        let mut board = self.scoreboard();
        let solved = board.solved.entry(identity.user_id.clone()).or_default();
        if correct {
            solved.insert(question_id.to_string());
        }

        Ok(AnswerResponse { correct })
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let board = self.scoreboard();
        let mut entries: Vec<LeaderboardEntry> = board
            .solved
            .iter()
            .map(|(user, solved)| LeaderboardEntry {
                username: user.clone(),
                score: solved.len() as i64,
            })
            .collect();

        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.username.cmp(&b.username)));
        Ok(entries)
    }

    async fn register(&self, form: &RegistrationForm) -> Result<(), ApiError> {
        form.validate()?;
        let user_id = self.user_id_for(&form.email);
        info!("Registered local account {} as {}", form.email, user_id);
        Ok(())
    }

    async fn sign_in(&self, form: &SignInForm) -> Result<Identity, ApiError> {
        form.validate()?;
        let user_id = self.user_id_for(&form.email);
        Ok(Identity::new(user_id).with_email(form.email.clone()))
    }
}
