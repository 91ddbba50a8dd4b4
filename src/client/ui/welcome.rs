//! Landing screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::client::state::ClientApp;

pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(13),
        Constraint::Fill(1),
    ])
    .split(area);

    let greeting = match &app.identity {
        Some(identity) => Line::from(vec![
            Span::styled("Signed in as ", Style::default().fg(Color::White)),
            Span::styled(identity.display_name(), Style::default().fg(Color::Green).bold()),
        ]),
        None => Line::from("Not signed in".fg(Color::Yellow)),
    };

    let account_keys = if app.is_signed_in() {
        "[L] leaderboard  ·  [O] sign out  ·  [Q] quit"
    } else {
        "[S] sign in  ·  [R] register  ·  [L] leaderboard  ·  [Q] quit"
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "ORBIT QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from("20 seconds a question · one shot at glory".fg(Color::DarkGray)),
        Line::from(Span::styled(
            format!("Questions from {}", app.source),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        greeting,
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to play".fg(Color::DarkGray)),
        Line::from(""),
        Line::from(account_keys.fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
}
