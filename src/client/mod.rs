//! Terminal quiz client.
//!
//! Sign-in, the timed quiz with its result modal, and the leaderboard,
//! rendered with ratatui.

mod client;
mod state;
mod ui;

pub use client::run;
pub use state::{ClientApp, ClientState, FormState, LeaderboardView, Notice, QuestionsView};
