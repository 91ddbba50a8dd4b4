//! Main client UI renderer.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};

use crate::client::state::{ClientApp, ClientState};

use super::{form, leaderboard, quiz, welcome};

/// Render the client UI based on current state.
pub fn render(frame: &mut Frame, app: &ClientApp) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.state {
        ClientState::Welcome => welcome::render(frame, area, app),
        ClientState::SignIn(state) => form::render(frame, area, "SIGN IN", state, "Signing in..."),
        ClientState::Register(state) => {
            form::render(frame, area, "REGISTRATION", state, "Registering...")
        }
        ClientState::Quiz => quiz::render(frame, area, app),
        ClientState::Leaderboard => leaderboard::render(frame, area, app),
    }
}

/// Centered "sign in first" prompt used by gated screens.
pub fn render_sign_in_prompt(frame: &mut Frame, area: Rect, what: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Please sign in to {what}."),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[S] sign in  ·  [Esc] back  ·  [Q] quit",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}
