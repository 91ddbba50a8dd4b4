//! The quiz session state machine.
//!
//! One question (the queue head) is live at a time. It gets a 20 second
//! countdown that is recomputed from the persisted start time on every tick.
//! A correct answer locks the question but does not advance the queue; the
//! head is only removed when the countdown runs out, after which a result
//! modal is shown for 10 seconds before the next question (or the
//! leaderboard).

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiError, Backend};
use crate::models::{Identity, Question};

use super::queue::QuestionQueue;
use super::timer::{TimerPersistence, QUESTION_SECONDS};

/// How long the result modal stays up.
pub const MODAL_SECONDS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No question to show.
    Idle,
    /// Countdown running, waiting for an answer (or a retry).
    Answering,
    /// An answer is in flight.
    Submitting,
    /// Answered correctly; the countdown still runs to completion.
    LockedCorrect,
    /// Countdown over, result modal showing.
    ResultModal,
    /// Every question is done. Only `reset_questions` leaves this state.
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    QuizComplete,
    Correct,
    TimeUp,
}

/// The transitional view shown between questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultModal {
    pub kind: ModalKind,
    /// Closing this modal finishes the quiz.
    pub completes: bool,
    closes_at_ms: u64,
}

impl ResultModal {
    pub fn title(&self) -> &'static str {
        if self.completes {
            "Quiz Complete!"
        } else {
            "Time's up!"
        }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            ModalKind::QuizComplete => "You've answered all questions.",
            ModalKind::Correct => "Correct! Moving to the next question...",
            ModalKind::TimeUp => {
                "The timer has expired or answer was incorrect. Moving to the next question..."
            }
        }
    }

    pub fn footer(&self) -> &'static str {
        if self.completes {
            "Redirecting to leaderboard in 10 seconds..."
        } else {
            "This modal will close in 10 seconds."
        }
    }

    /// Whole seconds until the modal closes, rounded up.
    pub fn seconds_left(&self, now_ms: u64) -> u64 {
        self.closes_at_ms.saturating_sub(now_ms).div_ceil(1000)
    }
}

/// Something the driver should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ModalOpened,
    NextQuestion,
    QuizComplete,
}

/// An accepted submission. Handed back to `complete_submit` with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub question_id: String,
    pub selected_option: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("no question is active")]
    NoQuestion,
    #[error("select an option first")]
    NothingSelected,
    #[error("an answer is already being submitted")]
    InFlight,
    #[error("already answered correctly")]
    AlreadyCorrect,
    #[error("the result is showing")]
    ModalShowing,
}

pub struct QuizSession {
    queue: QuestionQueue,
    timer: TimerPersistence,
    phase: Phase,
    cursor: usize,
    selected_option: Option<String>,
    is_submitted: bool,
    is_correct: bool,
    time_left: u64,
    modal: Option<ResultModal>,
    error: Option<String>,
}

impl QuizSession {
    pub fn new(timer: TimerPersistence) -> Self {
        Self {
            queue: QuestionQueue::new(),
            timer,
            phase: Phase::Idle,
            cursor: 0,
            selected_option: None,
            is_submitted: false,
            is_correct: false,
            time_left: QUESTION_SECONDS,
            modal: None,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn head(&self) -> Option<&Question> {
        self.queue.head()
    }

    pub fn remaining_questions(&self) -> usize {
        self.queue.len()
    }

    /// Seconds left on the countdown as of the last tick.
    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn modal(&self) -> Option<&ResultModal> {
        self.modal.as_ref()
    }

    pub fn modal_seconds_left(&self) -> u64 {
        self.modal
            .as_ref()
            .map(|modal| modal.seconds_left(self.timer.now_ms()))
            .unwrap_or(0)
    }

    /// Inline error from the last failed submission.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fill the queue from a fetch. Ignored while questions are pending or
    /// after the quiz is complete.
    pub fn seed(&mut self, questions: Vec<Question>) -> bool {
        if self.phase == Phase::Complete {
            debug!("Ignoring seed: quiz already complete");
            return false;
        }

        let count = questions.len();
        if !self.queue.set_all(questions) {
            debug!("Ignoring seed: queue already holds {} questions", self.queue.len());
            return false;
        }

        info!("Seeded {} questions", count);
        if self.phase == Phase::Idle {
            self.activate_head();
        }
        true
    }

    /// Empty the queue and go back to `Idle`.
    pub fn reset_questions(&mut self) {
        info!("Resetting questions");
        self.queue.reset();
        self.timer.clear();
        self.reset_submission();
        self.modal = None;
        self.phase = Phase::Idle;
        self.time_left = QUESTION_SECONDS;
    }

    fn can_select(&self) -> bool {
        self.phase == Phase::Answering
    }

    /// Select an option of the head question by its text.
    pub fn select_option(&mut self, option: &str) -> bool {
        if !self.can_select() {
            return false;
        }

        let Some(index) = self
            .queue
            .head()
            .and_then(|q| q.options.iter().position(|o| o == option))
        else {
            return false;
        };

        self.cursor = index;
        self.selected_option = Some(option.to_string());
        true
    }

    /// Select the option under the cursor.
    pub fn select_at_cursor(&mut self) -> bool {
        let option = self
            .queue
            .head()
            .and_then(|q| q.options.get(self.cursor))
            .cloned();
        match option {
            Some(option) => self.select_option(&option),
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        let count = self.option_count();
        if self.can_select() && count > 0 {
            self.cursor = (self.cursor + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.option_count();
        if self.can_select() && count > 0 {
            self.cursor = (self.cursor + count - 1) % count;
        }
    }

    fn option_count(&self) -> usize {
        self.queue.head().map(|q| q.options.len()).unwrap_or(0)
    }

    /// Accept a submission for the head question, or say why not.
    ///
    /// While a submission is in flight every further call is rejected, so a
    /// question never has two requests outstanding.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitRejected> {
        match self.phase {
            Phase::Answering => {}
            Phase::Submitting => return Err(SubmitRejected::InFlight),
            Phase::LockedCorrect => return Err(SubmitRejected::AlreadyCorrect),
            Phase::ResultModal => return Err(SubmitRejected::ModalShowing),
            Phase::Idle | Phase::Complete => return Err(SubmitRejected::NoQuestion),
        }

        let question_id = self
            .queue
            .head()
            .map(|q| q.id.clone())
            .ok_or(SubmitRejected::NoQuestion)?;
        let selected_option = self
            .selected_option
            .clone()
            .ok_or(SubmitRejected::NothingSelected)?;

        self.is_submitted = true;
        self.error = None;
        self.phase = Phase::Submitting;
        debug!("Submitting {:?} for question {}", selected_option, question_id);

        Ok(SubmitTicket {
            question_id,
            selected_option,
        })
    }

    /// Apply the outcome of a submission started with `begin_submit`.
    ///
    /// If the countdown ran out while the answer was in flight, the modal
    /// opens now that the result is known.
    pub fn complete_submit(
        &mut self,
        ticket: &SubmitTicket,
        result: Result<bool, ApiError>,
    ) -> Option<SessionEvent> {
        let current = self.queue.head().map(|q| q.id.as_str());
        if self.phase != Phase::Submitting || current != Some(ticket.question_id.as_str()) {
            debug!("Dropping stale result for question {}", ticket.question_id);
            return None;
        }

        match result {
            Ok(true) => {
                info!("Question {} answered correctly", ticket.question_id);
                self.is_correct = true;
                self.phase = Phase::LockedCorrect;
            }
            Ok(false) => {
                debug!("Question {} answered incorrectly", ticket.question_id);
                self.is_submitted = false;
                self.selected_option = None;
                self.phase = Phase::Answering;
            }
            Err(e) => {
                warn!("Submission for {} failed: {}", ticket.question_id, e);
                self.error = Some(e.user_message());
                self.is_submitted = false;
                self.selected_option = None;
                self.phase = Phase::Answering;
            }
        }

        self.refresh_time_left();
        if self.time_left == 0 {
            Some(self.open_modal())
        } else {
            None
        }
    }

    /// Advance the clock-driven parts of the session.
    pub fn tick(&mut self) -> Option<SessionEvent> {
        match self.phase {
            Phase::Answering | Phase::LockedCorrect => {
                self.refresh_time_left();
                if self.time_left == 0 {
                    Some(self.open_modal())
                } else {
                    None
                }
            }
            Phase::Submitting => {
                self.refresh_time_left();
                None
            }
            Phase::ResultModal => {
                let closes_at = self.modal.as_ref().map(|m| m.closes_at_ms).unwrap_or(0);
                if self.timer.now_ms() >= closes_at {
                    self.close_modal()
                } else {
                    None
                }
            }
            Phase::Idle | Phase::Complete => None,
        }
    }

    fn refresh_time_left(&mut self) {
        self.time_left = self.timer.read();
    }

    /// Show the head question, resuming a persisted countdown if one exists.
    fn activate_head(&mut self) {
        if self.queue.head().is_none() {
            self.phase = Phase::Idle;
            return;
        }

        if self.timer.record().is_none() {
            self.timer.start(QUESTION_SECONDS);
        }
        self.reset_submission();
        self.time_left = self.timer.read();
        self.phase = Phase::Answering;

        if let Some(question) = self.queue.head() {
            debug!("Question {} live with {}s left", question.id, self.time_left);
        }
    }

    fn open_modal(&mut self) -> SessionEvent {
        self.timer.clear();
        self.time_left = 0;

        let len_before = self.queue.len();
        if self.is_correct {
            // The only place the queue advances.
            self.queue.remove_head();
        }

        let completes = self.queue.is_empty() || (self.is_correct && len_before == 1);
        let kind = if completes {
            ModalKind::QuizComplete
        } else if self.is_correct {
            ModalKind::Correct
        } else {
            ModalKind::TimeUp
        };

        info!("Countdown over: {:?}, {} questions left", kind, self.queue.len());
        self.modal = Some(ResultModal {
            kind,
            completes,
            closes_at_ms: self.timer.now_ms() + MODAL_SECONDS * 1000,
        });
        self.phase = Phase::ResultModal;
        SessionEvent::ModalOpened
    }

    fn close_modal(&mut self) -> Option<SessionEvent> {
        let completes = self.modal.take().is_some_and(|m| m.completes);
        self.reset_submission();
        self.timer.clear();

        if completes {
            info!("Quiz complete");
            self.phase = Phase::Complete;
            return Some(SessionEvent::QuizComplete);
        }

        self.activate_head();
        if self.phase == Phase::Answering {
            Some(SessionEvent::NextQuestion)
        } else {
            None
        }
    }

    fn reset_submission(&mut self) {
        self.cursor = 0;
        self.selected_option = None;
        self.is_submitted = false;
        self.is_correct = false;
        self.error = None;
    }
}

/// Lets the submission task reach a session that lives inside a larger
/// shared state.
pub trait SessionHost: Send {
    fn session_mut(&mut self) -> &mut QuizSession;
}

impl SessionHost for QuizSession {
    fn session_mut(&mut self) -> &mut QuizSession {
        self
    }
}

/// Submit the current selection and apply the result.
///
/// The lock is released while the request is in flight; the session's
/// `Submitting` phase keeps other callers out in the meantime.
pub async fn submit_answer<H: SessionHost>(
    host: &Mutex<H>,
    backend: &Backend,
    identity: Option<&Identity>,
) -> Result<Option<SessionEvent>, SubmitRejected> {
    let ticket = host.lock().await.session_mut().begin_submit()?;

    let result = backend
        .submit_answer(identity, &ticket.question_id, &ticket.selected_option)
        .await;

    let mut host = host.lock().await;
    Ok(host.session_mut().complete_submit(&ticket, result))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::quiz::clock::ManualClock;
    use crate::quiz::store::{KeyValueStore, MemoryStore};
    use crate::quiz::timer::{TimerRecord, TIMER_KEY};

    const T0: u64 = 1_700_000_000_000;

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            question: format!("Question {id}"),
            options: vec!["Mars".to_string(), "Venus".to_string(), "Earth".to_string()],
            correct_answer: None,
        }
    }

    fn session_with(store: Arc<MemoryStore>) -> (QuizSession, ManualClock) {
        let clock = ManualClock::new(T0);
        let timer = TimerPersistence::new(store, Arc::new(clock.clone()));
        (QuizSession::new(timer), clock)
    }

    fn session() -> (QuizSession, ManualClock, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let (session, clock) = session_with(store.clone());
        (session, clock, store)
    }

    #[test]
    fn test_seed_activates_head_and_starts_timer() {
        let (mut session, _, store) = session();
        assert_eq!(session.phase(), Phase::Idle);

        assert!(session.seed(vec![question("1"), question("2")]));
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.head().map(|q| q.id.as_str()), Some("1"));
        assert_eq!(session.time_left(), 20);
        assert!(store.get(TIMER_KEY).unwrap().is_some());
    }

    #[test]
    fn test_seed_plays_each_id_once() {
        let (mut session, _, _) = session();
        assert!(session.seed(vec![question("1"), question("1")]));
        assert_eq!(session.remaining_questions(), 1);
    }

    #[test]
    fn test_reseed_keeps_first_list() {
        let (mut session, _, _) = session();
        session.seed(vec![question("1")]);
        assert!(!session.seed(vec![question("9"), question("8")]));
        assert_eq!(session.remaining_questions(), 1);
        assert_eq!(session.head().map(|q| q.id.as_str()), Some("1"));
    }

    #[test]
    fn test_resume_from_persisted_countdown() {
        let store = Arc::new(MemoryStore::new());
        let record = TimerRecord {
            start_time: T0 - 5_000,
            duration: 20,
        };
        store
            .set(TIMER_KEY, &serde_json::to_string(&record).unwrap())
            .unwrap();

        let (mut session, _) = session_with(store);
        session.seed(vec![question("1")]);
        assert_eq!(session.time_left(), 15);
    }

    #[test]
    fn test_submit_requires_selection() {
        let (mut session, _, _) = session();
        assert_eq!(session.begin_submit(), Err(SubmitRejected::NoQuestion));

        session.seed(vec![question("1")]);
        assert_eq!(session.begin_submit(), Err(SubmitRejected::NothingSelected));
        assert_eq!(session.phase(), Phase::Answering);
    }

    #[test]
    fn test_duplicate_submit_is_rejected() {
        let (mut session, _, _) = session();
        session.seed(vec![question("1")]);
        session.select_option("Mars");

        let ticket = session.begin_submit().unwrap();
        assert_eq!(ticket.selected_option, "Mars");
        assert!(session.is_submitted());
        assert_eq!(session.begin_submit(), Err(SubmitRejected::InFlight));
        assert_eq!(session.begin_submit(), Err(SubmitRejected::InFlight));
    }

    #[test]
    fn test_correct_answer_defers_advancement() {
        let (mut session, clock, _) = session();
        session.seed(vec![question("1"), question("2")]);
        session.select_option("Mars");
        let ticket = session.begin_submit().unwrap();

        clock.advance_secs(3);
        assert_eq!(session.complete_submit(&ticket, Ok(true)), None);
        assert_eq!(session.phase(), Phase::LockedCorrect);
        assert_eq!(session.remaining_questions(), 2);
        assert_eq!(session.begin_submit(), Err(SubmitRejected::AlreadyCorrect));
        assert!(!session.select_option("Venus"));

        clock.advance_secs(16);
        assert_eq!(session.tick(), None);
        assert_eq!(session.remaining_questions(), 2);

        clock.advance_secs(1);
        assert_eq!(session.tick(), Some(SessionEvent::ModalOpened));
        assert_eq!(session.remaining_questions(), 1);
        let modal = session.modal().unwrap();
        assert_eq!(modal.kind, ModalKind::Correct);
        assert_eq!(modal.title(), "Time's up!");

        // Further ticks while the modal is up do not advance again.
        clock.advance_secs(5);
        assert_eq!(session.tick(), None);
        assert_eq!(session.remaining_questions(), 1);
    }

    #[test]
    fn test_incorrect_answer_allows_retry() {
        let (mut session, clock, _) = session();
        session.seed(vec![question("1")]);
        session.select_option("Venus");
        let ticket = session.begin_submit().unwrap();

        clock.advance_secs(4);
        session.complete_submit(&ticket, Ok(false));
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.selected_option(), None);
        assert!(!session.is_submitted());
        assert_eq!(session.time_left(), 16);

        clock.advance_secs(2);
        session.tick();
        assert_eq!(session.time_left(), 14);

        assert!(session.select_option("Mars"));
        assert!(session.begin_submit().is_ok());
    }

    #[test]
    fn test_failed_submission_rolls_back() {
        let (mut session, _, _) = session();
        session.seed(vec![question("1")]);
        session.select_option("Mars");
        let ticket = session.begin_submit().unwrap();

        session.complete_submit(&ticket, Err(ApiError::Network("connection reset".to_string())));
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.error(), Some("Network error. Please try again."));
        assert_eq!(session.selected_option(), None);

        session.select_option("Mars");
        session.begin_submit().unwrap();
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_timeout_without_answer_keeps_head() {
        let (mut session, clock, store) = session();
        session.seed(vec![question("1"), question("2")]);

        clock.advance_secs(20);
        assert_eq!(session.tick(), Some(SessionEvent::ModalOpened));
        assert_eq!(session.phase(), Phase::ResultModal);
        assert_eq!(session.modal().unwrap().kind, ModalKind::TimeUp);
        assert_eq!(session.remaining_questions(), 2);
        assert!(store.get(TIMER_KEY).unwrap().is_none());
        assert_eq!(session.modal_seconds_left(), 10);

        clock.advance_secs(10);
        assert_eq!(session.tick(), Some(SessionEvent::NextQuestion));
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.head().map(|q| q.id.as_str()), Some("1"));
        assert_eq!(session.time_left(), 20);
    }

    #[test]
    fn test_expiry_during_submission_waits_for_result() {
        let (mut session, clock, _) = session();
        session.seed(vec![question("1"), question("2")]);
        session.select_option("Mars");
        let ticket = session.begin_submit().unwrap();

        clock.advance_secs(21);
        assert_eq!(session.tick(), None);
        assert_eq!(session.phase(), Phase::Submitting);

        assert_eq!(
            session.complete_submit(&ticket, Ok(true)),
            Some(SessionEvent::ModalOpened)
        );
        assert_eq!(session.modal().unwrap().kind, ModalKind::Correct);
        assert_eq!(session.remaining_questions(), 1);
    }

    #[test]
    fn test_last_question_correct_completes() {
        let (mut session, clock, _) = session();
        session.seed(vec![question("1")]);
        session.select_option("Mars");
        let ticket = session.begin_submit().unwrap();
        session.complete_submit(&ticket, Ok(true));

        clock.advance_secs(20);
        session.tick();
        let modal = session.modal().unwrap();
        assert_eq!(modal.title(), "Quiz Complete!");
        assert_eq!(modal.footer(), "Redirecting to leaderboard in 10 seconds...");

        clock.advance_secs(10);
        assert_eq!(session.tick(), Some(SessionEvent::QuizComplete));
        assert_eq!(session.phase(), Phase::Complete);

        // Terminal until reset.
        assert!(!session.seed(vec![question("2")]));
        clock.advance_secs(30);
        assert_eq!(session.tick(), None);

        session.reset_questions();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.seed(vec![question("2")]));
        assert_eq!(session.phase(), Phase::Answering);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let (mut session, _, _) = session();
        session.seed(vec![question("1")]);
        session.select_option("Mars");
        let ticket = session.begin_submit().unwrap();

        session.reset_questions();
        session.seed(vec![question("2")]);
        assert_eq!(session.complete_submit(&ticket, Ok(true)), None);
        assert_eq!(session.phase(), Phase::Answering);
        assert!(!session.is_correct());
    }

    #[test]
    fn test_cursor_wraps_and_selects() {
        let (mut session, _, _) = session();
        session.seed(vec![question("1")]);

        session.select_previous();
        assert_eq!(session.cursor(), 2);
        session.select_next();
        assert_eq!(session.cursor(), 0);
        session.select_next();
        assert!(session.select_at_cursor());
        assert_eq!(session.selected_option(), Some("Venus"));
        assert!(!session.select_option("Pluto"));
    }

    #[test]
    fn test_modal_seconds_round_up() {
        let (mut session, clock, _) = session();
        session.seed(vec![question("1"), question("2")]);
        clock.advance_secs(20);
        session.tick();
        clock.advance_ms(2_500);
        assert_eq!(session.modal_seconds_left(), 8);
    }
}
