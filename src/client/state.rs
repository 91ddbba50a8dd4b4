//! Client state management.

use tracing::warn;

use crate::api::ApiError;
use crate::models::{Identity, LeaderboardEntry, Question};
use crate::protocol::{EditableForm, RegistrationForm, SignInForm};
use crate::quiz::{QuizSession, SessionHost};

pub const NO_QUESTIONS_MESSAGE: &str = "No questions available.";

/// Longest value accepted in a single form field.
const FIELD_MAX_LENGTH: usize = 64;

/// A one-line message under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }
}

/// Editing state shared by the account forms.
#[derive(Debug, Clone, Default)]
pub struct FormState<F> {
    pub form: F,
    pub focus: usize,
    pub notice: Option<Notice>,
    /// A request for this form is in flight.
    pub pending: bool,
}

impl<F: EditableForm + Default> FormState<F> {
    pub fn push(&mut self, c: char) {
        self.notice = None;
        if let Some(field) = self.form.field_mut(self.focus) {
            if field.chars().count() < FIELD_MAX_LENGTH {
                field.push(c);
            }
        }
    }

    pub fn pop(&mut self) {
        self.notice = None;
        if let Some(field) = self.form.field_mut(self.focus) {
            field.pop();
        }
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.form.len();
    }

    pub fn previous_field(&mut self) {
        let len = self.form.len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn clear(&mut self) {
        self.form = F::default();
        self.focus = 0;
    }
}

/// Current screen of the client.
#[derive(Debug, Clone)]
pub enum ClientState {
    /// Landing screen.
    Welcome,

    /// Signing in.
    SignIn(FormState<SignInForm>),

    /// Registering a new account.
    Register(FormState<RegistrationForm>),

    /// Playing. The session itself lives on `ClientApp`.
    Quiz,

    /// Ranked scores.
    Leaderboard,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::Welcome
    }
}

/// Loading state of the question list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionsView {
    NotLoaded,
    Loading,
    Loaded,
    Failed(String),
}

/// Loading state of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardView {
    NotLoaded,
    Loading,
    Loaded(Vec<LeaderboardEntry>),
    Failed(String),
}

/// Client application state.
pub struct ClientApp {
    /// Current screen.
    pub state: ClientState,
    /// The quiz in progress.
    pub session: QuizSession,
    /// Signed-in player, if any.
    pub identity: Option<Identity>,
    pub questions: QuestionsView,
    pub leaderboard: LeaderboardView,
    /// Where questions come from, for display.
    pub source: String,
    /// Whether the client should quit.
    pub should_quit: bool,
}

impl ClientApp {
    pub fn new(session: QuizSession, identity: Option<Identity>, source: String) -> Self {
        Self {
            state: ClientState::Welcome,
            session,
            identity,
            questions: QuestionsView::NotLoaded,
            leaderboard: LeaderboardView::NotLoaded,
            source,
            should_quit: false,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn enter_welcome(&mut self) {
        self.state = ClientState::Welcome;
    }

    pub fn enter_sign_in(&mut self) {
        self.state = ClientState::SignIn(FormState::default());
    }

    pub fn enter_register(&mut self) {
        self.state = ClientState::Register(FormState::default());
    }

    pub fn enter_quiz(&mut self) {
        self.state = ClientState::Quiz;
    }

    pub fn enter_leaderboard(&mut self) {
        self.state = ClientState::Leaderboard;
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        self.state = ClientState::Welcome;
    }

    /// Questions should be fetched: signed in, nothing queued, nothing
    /// loading.
    pub fn needs_questions(&self) -> bool {
        self.is_signed_in()
            && self.session.head().is_none()
            && self.session.phase() == crate::quiz::Phase::Idle
            && matches!(
                self.questions,
                QuestionsView::NotLoaded | QuestionsView::Failed(_)
            )
    }
}

impl ClientApp {
    /// Apply the result of a questions fetch. An empty list counts as a
    /// failure so the player can retry.
    pub fn questions_loaded(&mut self, result: Result<Vec<Question>, ApiError>) {
        match result {
            Ok(questions) => {
                self.session.seed(questions);
                self.questions = if self.session.head().is_some() {
                    QuestionsView::Loaded
                } else {
                    warn!("Backend returned no questions");
                    QuestionsView::Failed(NO_QUESTIONS_MESSAGE.to_string())
                };
            }
            Err(e) => {
                warn!("Failed to load questions: {}", e);
                self.questions = QuestionsView::Failed(e.user_message());
            }
        }
    }
}

impl SessionHost for ClientApp {
    fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }
}
