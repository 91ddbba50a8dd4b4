//! Leaderboard screen.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::{ClientApp, LeaderboardView};

use super::render::render_sign_in_prompt;

/// Render the leaderboard screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    if !app.is_signed_in() {
        render_sign_in_prompt(frame, area, "view the leaderboard");
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let columns = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(48),
        Constraint::Fill(1),
    ])
    .split(chunks[1]);

    let me = app.identity.as_ref().map(|identity| identity.user_id.as_str());
    let mut lines = vec![Line::from("")];
    lines.extend(highlight_player(
        leaderboard_lines(&app.leaderboard, usize::MAX),
        &app.leaderboard,
        me,
    ));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Leaderboard ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, columns[1]);

    let controls = Paragraph::new("r refresh  ·  p play  ·  Esc back  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(controls, chunks[2]);
}

/// Lines for up to `limit` entries, or the loading/error placeholder.
pub fn leaderboard_lines(view: &LeaderboardView, limit: usize) -> Vec<Line<'static>> {
    match view {
        LeaderboardView::NotLoaded | LeaderboardView::Loading => {
            vec![Line::from("Loading leaderboard...".fg(Color::DarkGray))]
        }
        LeaderboardView::Failed(message) => vec![Line::from(Span::styled(
            format!("Error loading leaderboard: {message}"),
            Style::default().fg(Color::Red),
        ))],
        LeaderboardView::Loaded(entries) if entries.is_empty() => {
            vec![Line::from("No scores recorded yet.".fg(Color::DarkGray))]
        }
        LeaderboardView::Loaded(entries) => entries
            .iter()
            .take(limit)
            .enumerate()
            .map(|(index, entry)| {
                let rank = index + 1;
                let rank_style = match rank {
                    1 => Style::default().fg(Color::Yellow).bold(),
                    2 => Style::default().fg(Color::White),
                    3 => Style::default().fg(Color::LightRed),
                    _ => Style::default().fg(Color::DarkGray),
                };

                Line::from(vec![
                    Span::styled(format!("{:>3}. ", rank), rank_style),
                    Span::styled(
                        format!("{:<28}", entry.username),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>6}", entry.score),
                        Style::default().fg(Color::Cyan).bold(),
                    ),
                ])
            })
            .collect(),
    }
}

/// Mark the signed-in player's row.
fn highlight_player<'a>(
    mut lines: Vec<Line<'a>>,
    view: &LeaderboardView,
    me: Option<&str>,
) -> Vec<Line<'a>> {
    let (LeaderboardView::Loaded(entries), Some(me)) = (view, me) else {
        return lines;
    };

    for (line, entry) in lines.iter_mut().zip(entries) {
        if entry.username == me {
            line.spans
                .push(Span::styled(" <- You", Style::default().fg(Color::Green)));
        }
    }
    lines
}
