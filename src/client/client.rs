//! Terminal client: wires the session, the backend and the TUI together.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::models::Identity;
use crate::quiz::{self, Phase, QuizSession, SessionEvent};
use crate::terminal;
use crate::QuizError;

use super::state::{ClientApp, ClientState, LeaderboardView, Notice, QuestionsView};
use super::ui;

/// Shared client app state.
type SharedApp = Arc<Mutex<ClientApp>>;

/// How often the countdown is recomputed from the wall clock.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How long the TUI waits for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Owns the background work of one client run. Dropping the task set
/// aborts everything still running.
#[derive(Clone)]
struct Driver {
    app: SharedApp,
    backend: Backend,
    tasks: Arc<std::sync::Mutex<JoinSet<()>>>,
}

impl Driver {
    fn new(app: SharedApp, backend: Backend) -> Self {
        Self {
            app,
            backend,
            tasks: Arc::new(std::sync::Mutex::new(JoinSet::new())),
        }
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.spawn(task);
    }

    /// Drop bookkeeping for tasks that already finished.
    fn reap(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                if e.is_panic() {
                    warn!("Background task panicked: {}", e);
                }
            }
        }
    }

    fn shutdown(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        debug!("Aborting {} background tasks", tasks.len());
        tasks.abort_all();
    }

    fn start_ticker(&self) {
        let driver = self.clone();
        self.spawn(async move {
            let mut interval = tokio::time::interval(TICK_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let mut app = driver.app.lock().await;
                if let Some(event) = app.session.tick() {
                    driver.handle_event(&mut app, event);
                }
            }
        });
    }

    fn handle_event(&self, app: &mut ClientApp, event: SessionEvent) {
        debug!("Session event: {:?}", event);
        match event {
            SessionEvent::ModalOpened => self.refresh_leaderboard(app),
            SessionEvent::NextQuestion => {}
            SessionEvent::QuizComplete => {
                app.enter_leaderboard();
                self.refresh_leaderboard(app);
            }
        }
    }

    fn load_questions(&self, app: &mut ClientApp) {
        if !app.needs_questions() {
            return;
        }
        app.questions = QuestionsView::Loading;

        let driver = self.clone();
        self.spawn(async move {
            let result = driver.backend.questions().await;
            driver.app.lock().await.questions_loaded(result);
        });
    }

    fn refresh_leaderboard(&self, app: &mut ClientApp) {
        app.leaderboard = LeaderboardView::Loading;

        let driver = self.clone();
        self.spawn(async move {
            let result = driver.backend.leaderboard().await;
            let mut app = driver.app.lock().await;
            app.leaderboard = match result {
                Ok(entries) => LeaderboardView::Loaded(entries),
                Err(e) => {
                    warn!("Failed to load leaderboard: {}", e);
                    LeaderboardView::Failed(e.user_message())
                }
            };
        });
    }

    fn submit(&self, identity: Option<Identity>) {
        let driver = self.clone();
        self.spawn(async move {
            let outcome =
                quiz::submit_answer(driver.app.as_ref(), &driver.backend, identity.as_ref()).await;
            match outcome {
                Ok(Some(event)) => {
                    let mut app = driver.app.lock().await;
                    driver.handle_event(&mut app, event);
                }
                Ok(None) => {}
                Err(rejected) => debug!("Submit ignored: {}", rejected),
            }
        });
    }

    fn sign_in(&self, app: &mut ClientApp) {
        let ClientState::SignIn(state) = &mut app.state else {
            return;
        };
        if state.pending {
            return;
        }
        state.pending = true;
        state.notice = None;
        let form = state.form.clone();

        let driver = self.clone();
        self.spawn(async move {
            let result = driver.backend.sign_in(&form).await;
            let mut app = driver.app.lock().await;
            match result {
                Ok(identity) => {
                    info!("Signed in as {}", identity.user_id);
                    app.identity = Some(identity);
                    app.enter_quiz();
                    driver.load_questions(&mut app);
                }
                Err(e) => {
                    if let ClientState::SignIn(state) = &mut app.state {
                        state.pending = false;
                        state.notice = Some(Notice::error(e.user_message()));
                    }
                }
            }
        });
    }

    fn register(&self, app: &mut ClientApp) {
        let ClientState::Register(state) = &mut app.state else {
            return;
        };
        if state.pending {
            return;
        }
        state.pending = true;
        state.notice = None;
        let form = state.form.clone();

        let driver = self.clone();
        self.spawn(async move {
            let result = driver.backend.register(&form).await;
            let mut app = driver.app.lock().await;
            let ClientState::Register(state) = &mut app.state else {
                return;
            };
            state.pending = false;
            match result {
                Ok(()) => {
                    state.clear();
                    state.notice = Some(Notice::success("Registration successful!"));
                }
                Err(e) => state.notice = Some(Notice::error(e.user_message())),
            }
        });
    }

    fn open_quiz(&self, app: &mut ClientApp) {
        app.enter_quiz();
        self.load_questions(app);
    }

    fn open_leaderboard(&self, app: &mut ClientApp) {
        app.enter_leaderboard();
        if app.is_signed_in() {
            self.refresh_leaderboard(app);
        }
    }
}

/// Run the quiz client until the player quits.
pub async fn run(
    session: QuizSession,
    backend: Backend,
    identity: Option<Identity>,
    source: String,
) -> Result<(), QuizError> {
    let signed_in = identity.is_some();
    let app = Arc::new(Mutex::new(ClientApp::new(session, identity, source)));
    let driver = Driver::new(Arc::clone(&app), backend);

    if signed_in {
        let mut app = app.lock().await;
        driver.open_quiz(&mut app);
    }
    driver.start_ticker();

    let result = run_tui(&driver).await;
    driver.shutdown();
    info!("Client stopped");
    result
}

/// Run the client TUI.
async fn run_tui(driver: &Driver) -> Result<(), QuizError> {
    let mut terminal = terminal::TerminalGuard::enter()?;

    loop {
        {
            let app = driver.app.lock().await;
            if app.should_quit {
                break;
            }
            terminal.draw(|frame| ui::render(frame, &app))?;
        }

        if event::poll(INPUT_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let mut app = driver.app.lock().await;
                handle_input(driver, &mut app, key.code);
            }
        }

        driver.reap();
    }

    Ok(())
}

/// Handle keyboard input.
fn handle_input(driver: &Driver, app: &mut ClientApp, key: KeyCode) {
    match app.state {
        ClientState::Welcome => handle_welcome_input(driver, app, key),
        ClientState::SignIn(_) => handle_sign_in_input(driver, app, key),
        ClientState::Register(_) => handle_register_input(driver, app, key),
        ClientState::Quiz => handle_quiz_input(driver, app, key),
        ClientState::Leaderboard => handle_leaderboard_input(driver, app, key),
    }
}

fn handle_welcome_input(driver: &Driver, app: &mut ClientApp, key: KeyCode) {
    match key {
        KeyCode::Enter | KeyCode::Char('p') => driver.open_quiz(app),
        KeyCode::Char('s') => app.enter_sign_in(),
        KeyCode::Char('r') => app.enter_register(),
        KeyCode::Char('l') => driver.open_leaderboard(app),
        KeyCode::Char('o') if app.is_signed_in() => app.sign_out(),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_sign_in_input(driver: &Driver, app: &mut ClientApp, key: KeyCode) {
    let ClientState::SignIn(state) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Esc => app.enter_welcome(),
        KeyCode::Tab | KeyCode::Down => state.next_field(),
        KeyCode::BackTab | KeyCode::Up => state.previous_field(),
        KeyCode::Backspace => state.pop(),
        KeyCode::Char(c) => state.push(c),
        KeyCode::Enter => driver.sign_in(app),
        _ => {}
    }
}

fn handle_register_input(driver: &Driver, app: &mut ClientApp, key: KeyCode) {
    let ClientState::Register(state) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Esc => app.enter_welcome(),
        KeyCode::Tab | KeyCode::Down => state.next_field(),
        KeyCode::BackTab | KeyCode::Up => state.previous_field(),
        KeyCode::Backspace => state.pop(),
        KeyCode::Char(c) => state.push(c),
        KeyCode::Enter => driver.register(app),
        _ => {}
    }
}

fn handle_quiz_input(driver: &Driver, app: &mut ClientApp, key: KeyCode) {
    if !app.is_signed_in() {
        match key {
            KeyCode::Char('s') | KeyCode::Enter => app.enter_sign_in(),
            KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
            KeyCode::Esc => app.enter_welcome(),
            _ => {}
        }
        return;
    }

    match key {
        KeyCode::Up | KeyCode::Char('k') => app.session.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.session.select_next(),
        KeyCode::Char(' ') => {
            app.session.select_at_cursor();
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            let option = app
                .session
                .head()
                .and_then(|q| q.options.get(index))
                .cloned();
            if let Some(option) = option {
                app.session.select_option(&option);
            }
        }
        KeyCode::Enter => driver.submit(app.identity.clone()),
        KeyCode::Char('r') => {
            if app.session.phase() == Phase::Complete {
                app.session.reset_questions();
                app.questions = QuestionsView::NotLoaded;
            }
            driver.load_questions(app);
        }
        KeyCode::Char('l') => driver.open_leaderboard(app),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Esc => app.enter_welcome(),
        _ => {}
    }
}

fn handle_leaderboard_input(driver: &Driver, app: &mut ClientApp, key: KeyCode) {
    match key {
        KeyCode::Char('s') if !app.is_signed_in() => app.enter_sign_in(),
        KeyCode::Char('r') if app.is_signed_in() => driver.refresh_leaderboard(app),
        KeyCode::Char('p') | KeyCode::Enter => driver.open_quiz(app),
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Esc => app.enter_welcome(),
        _ => {}
    }
}
