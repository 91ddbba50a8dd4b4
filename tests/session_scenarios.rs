use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use orbit_quiz::api::{ApiError, Backend, LocalApi, QuizApi};
use orbit_quiz::models::{Identity, LeaderboardEntry, Question};
use orbit_quiz::protocol::{AnswerResponse, RegistrationForm, SignInForm};
use orbit_quiz::quiz::{
    self, FileStore, KeyValueStore, ManualClock, MemoryStore, Phase, QuizSession, SessionEvent,
    SubmitRejected, TimerPersistence, TimerRecord, TIMER_KEY,
};

const T0: u64 = 1_700_000_000_000;

fn question(id: &str, answer: &str) -> Question {
    Question {
        id: id.to_string(),
        question: format!("Which body is {id}?"),
        options: vec![
            "Mars".to_string(),
            "Venus".to_string(),
            "Jupiter".to_string(),
        ],
        correct_answer: Some(answer.to_string()),
    }
}

fn two_questions() -> Vec<Question> {
    vec![question("q1", "Mars"), question("q2", "Venus")]
}

fn session(store: Arc<dyn KeyValueStore>, clock: &ManualClock) -> QuizSession {
    QuizSession::new(TimerPersistence::new(store, Arc::new(clock.clone())))
}

/// Session seeded from an offline backend, the way the client seeds it.
async fn seeded(questions: Vec<Question>) -> (Mutex<QuizSession>, Backend, ManualClock) {
    let clock = ManualClock::new(T0);
    let backend = Backend::new(Arc::new(LocalApi::new(questions)));
    let mut session = session(Arc::new(MemoryStore::new()), &clock);
    assert!(session.seed(backend.questions().await.unwrap()));
    (Mutex::new(session), backend, clock)
}

fn player() -> Identity {
    Identity::new("vega")
}

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("orbit-quiz-it-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn test_single_correct_answer_completes_quiz() {
    let (session, backend, clock) = seeded(vec![question("q1", "Mars")]).await;
    let identity = player();

    session.lock().await.select_option("Mars");
    let event = quiz::submit_answer(&session, &backend, Some(&identity))
        .await
        .unwrap();
    assert_eq!(event, None);

    let mut session = session.into_inner();
    assert_eq!(session.phase(), Phase::LockedCorrect);
    assert_eq!(session.remaining_questions(), 1);

    clock.advance_secs(20);
    assert_eq!(session.tick(), Some(SessionEvent::ModalOpened));
    let modal = session.modal().unwrap();
    assert_eq!(modal.title(), "Quiz Complete!");
    assert_eq!(modal.footer(), "Redirecting to leaderboard in 10 seconds...");

    clock.advance_secs(9);
    assert_eq!(session.tick(), None);
    clock.advance_secs(1);
    assert_eq!(session.tick(), Some(SessionEvent::QuizComplete));
    assert_eq!(session.phase(), Phase::Complete);

    let board = backend.leaderboard().await.unwrap();
    assert_eq!(
        board,
        vec![LeaderboardEntry {
            username: "vega".to_string(),
            score: 1
        }]
    );
}

#[tokio::test]
async fn test_unanswered_question_times_out_and_repeats() {
    let (session, _, clock) = seeded(two_questions()).await;
    let mut session = session.into_inner();

    clock.advance_secs(20);
    assert_eq!(session.tick(), Some(SessionEvent::ModalOpened));
    let modal = session.modal().unwrap();
    assert_eq!(modal.title(), "Time's up!");
    assert_eq!(modal.footer(), "This modal will close in 10 seconds.");
    assert_eq!(session.remaining_questions(), 2);

    clock.advance_secs(10);
    assert_eq!(session.tick(), Some(SessionEvent::NextQuestion));
    assert_eq!(session.phase(), Phase::Answering);
    assert_eq!(session.head().map(|q| q.id.as_str()), Some("q1"));
    assert_eq!(session.time_left(), 20);
}

#[tokio::test]
async fn test_incorrect_answer_allows_retry_within_countdown() {
    let (session, backend, clock) = seeded(two_questions()).await;
    let identity = player();

    clock.advance_secs(3);
    session.lock().await.select_option("Jupiter");
    let event = quiz::submit_answer(&session, &backend, Some(&identity))
        .await
        .unwrap();
    assert_eq!(event, None);

    {
        let session = session.lock().await;
        assert_eq!(session.phase(), Phase::Answering);
        assert_eq!(session.selected_option(), None);
        assert!(!session.is_submitted());
        assert_eq!(session.time_left(), 17);
    }

    clock.advance_secs(4);
    session.lock().await.tick();
    assert_eq!(session.lock().await.time_left(), 13);

    session.lock().await.select_option("Mars");
    quiz::submit_answer(&session, &backend, Some(&identity))
        .await
        .unwrap();
    assert_eq!(session.lock().await.phase(), Phase::LockedCorrect);
}

#[tokio::test]
async fn test_head_only_advances_when_countdown_ends() {
    let (session, backend, clock) = seeded(two_questions()).await;
    let identity = player();

    clock.advance_secs(5);
    session.lock().await.select_option("Mars");
    quiz::submit_answer(&session, &backend, Some(&identity))
        .await
        .unwrap();

    let mut session = session.into_inner();
    for _ in 0..14 {
        clock.advance_secs(1);
        assert_eq!(session.tick(), None);
        assert_eq!(session.remaining_questions(), 2);
        assert_eq!(session.head().map(|q| q.id.as_str()), Some("q1"));
    }

    clock.advance_secs(1);
    assert_eq!(session.tick(), Some(SessionEvent::ModalOpened));
    assert_eq!(session.remaining_questions(), 1);
    assert_eq!(
        session.modal().unwrap().message(),
        "Correct! Moving to the next question..."
    );

    // Further ticks while the modal shows never advance again.
    clock.advance_secs(5);
    assert_eq!(session.tick(), None);
    assert_eq!(session.remaining_questions(), 1);

    clock.advance_secs(5);
    assert_eq!(session.tick(), Some(SessionEvent::NextQuestion));
    assert_eq!(session.head().map(|q| q.id.as_str()), Some("q2"));
    assert_eq!(session.remaining_questions(), 1);
    assert!(!session.is_correct());
}

#[tokio::test]
async fn test_reload_resumes_countdown() {
    let dir = temp_dir();
    let clock = ManualClock::new(T0);
    let questions = vec![question("q1", "Mars")];

    {
        let store = Arc::new(FileStore::open(&dir).unwrap());
        let mut first = session(store, &clock);
        first.seed(questions.clone());
        assert_eq!(first.time_left(), 20);
    }

    clock.advance_secs(5);
    let store = Arc::new(FileStore::open(&dir).unwrap());
    let mut reloaded = session(store, &clock);
    reloaded.seed(questions);
    assert_eq!(reloaded.phase(), Phase::Answering);
    assert_eq!(reloaded.time_left(), 15);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_stale_record_clamps_to_zero() {
    let store = Arc::new(MemoryStore::new());
    let record = TimerRecord {
        start_time: T0,
        duration: 20,
    };
    store
        .set(TIMER_KEY, &serde_json::to_string(&record).unwrap())
        .unwrap();

    let clock = ManualClock::new(T0 + 25_000);
    let timer = TimerPersistence::new(store, Arc::new(clock));
    assert_eq!(timer.read(), 0);
    assert_eq!(record.remaining_at(T0 + 25_000), 0);
}

#[test]
fn test_reseed_retains_first_list() {
    let clock = ManualClock::new(T0);
    let mut session = session(Arc::new(MemoryStore::new()), &clock);

    assert!(session.seed(two_questions()));
    assert!(!session.seed(vec![question("q9", "Jupiter")]));
    assert_eq!(session.remaining_questions(), 2);
    assert_eq!(session.head().map(|q| q.id.as_str()), Some("q1"));

    session.reset_questions();
    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.seed(vec![question("q9", "Jupiter")]));
    assert_eq!(session.head().map(|q| q.id.as_str()), Some("q9"));
}

/// Holds every answer until released and counts the calls it receives.
struct GatedApi {
    calls: AtomicUsize,
    release: Notify,
}

#[async_trait]
impl QuizApi for GatedApi {
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        Ok(vec![question("q1", "Mars").without_answer()])
    }

    async fn submit_answer(
        &self,
        _identity: Option<&Identity>,
        _question_id: &str,
        _selected_option: &str,
    ) -> Result<AnswerResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(AnswerResponse { correct: true })
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn register(&self, _form: &RegistrationForm) -> Result<(), ApiError> {
        Ok(())
    }

    async fn sign_in(&self, form: &SignInForm) -> Result<Identity, ApiError> {
        Ok(Identity::new(form.email.clone()))
    }
}

#[tokio::test]
async fn test_resubmitting_while_in_flight_sends_one_request() {
    let api = Arc::new(GatedApi {
        calls: AtomicUsize::new(0),
        release: Notify::new(),
    });
    let backend = Backend::new(api.clone());
    let clock = ManualClock::new(T0);

    let mut session = session(Arc::new(MemoryStore::new()), &clock);
    session.seed(backend.questions().await.unwrap());
    session.select_option("Mars");
    let session = Arc::new(Mutex::new(session));

    let first = {
        let session = Arc::clone(&session);
        let backend = backend.clone();
        tokio::spawn(async move {
            quiz::submit_answer(session.as_ref(), &backend, Some(&player())).await
        })
    };

    while api.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    for _ in 0..5 {
        let again = quiz::submit_answer(session.as_ref(), &backend, Some(&player())).await;
        assert_eq!(again, Err(SubmitRejected::InFlight));
    }
    assert_eq!(session.lock().await.phase(), Phase::Submitting);

    api.release.notify_one();
    assert_eq!(first.await.unwrap(), Ok(None));
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);

    let again = quiz::submit_answer(session.as_ref(), &backend, Some(&player())).await;
    assert_eq!(again, Err(SubmitRejected::AlreadyCorrect));
    assert_eq!(api.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_without_identity_reports_sign_in() {
    let (session, backend, _) = seeded(vec![question("q1", "Mars")]).await;

    session.lock().await.select_option("Mars");
    quiz::submit_answer(&session, &backend, None).await.unwrap();

    let session = session.lock().await;
    assert_eq!(session.phase(), Phase::Answering);
    assert_eq!(session.error(), Some("Please sign in to play the quiz."));
}
