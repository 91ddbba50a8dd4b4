//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Timed multiple-choice quiz in the terminal", long_about = None)]
pub struct Config {
    /// Base URL of the quiz API (questions, answers, leaderboard)
    #[arg(long, env = "QUIZ_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL of the account API; defaults to the quiz API
    #[arg(long, env = "QUIZ_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Play offline from a local JSON question file
    #[arg(short, long, env = "QUIZ_QUESTIONS")]
    pub questions: Option<PathBuf>,

    /// Play as this user id without signing in
    #[arg(short, long, env = "QUIZ_USER")]
    pub user: Option<String>,

    /// Directory for the persisted countdown and the log file
    #[arg(long, env = "QUIZ_STATE_DIR", default_value = ".orbit-quiz")]
    pub state_dir: PathBuf,

    /// Keep the countdown in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Log file; defaults to orbit-quiz.log in the state directory
    #[arg(long, env = "QUIZ_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(&self.api_url)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.state_dir.join("orbit-quiz.log"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
