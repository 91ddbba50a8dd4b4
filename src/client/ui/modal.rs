//! Result modal drawn over the quiz between questions.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::client::state::LeaderboardView;
use crate::quiz::ResultModal;

use super::leaderboard::leaderboard_lines;

/// Rows of the leaderboard shown inside the modal.
const MODAL_LEADERBOARD_ROWS: usize = 5;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    modal: &ResultModal,
    seconds_left: u64,
    leaderboard: &LeaderboardView,
) {
    let popup = centered(area, 64, 18);
    frame.render_widget(Clear, popup);

    let title_color = if modal.completes {
        Color::Green
    } else {
        Color::Yellow
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            modal.title(),
            Style::default().fg(title_color).bold(),
        )),
        Line::from(""),
        Line::from(modal.message().fg(Color::White)),
        Line::from(""),
        Line::from(Span::styled(
            "Leaderboard",
            Style::default().fg(Color::Cyan).bold(),
        )),
    ];
    lines.extend(leaderboard_lines(leaderboard, MODAL_LEADERBOARD_ROWS));
    lines.push(Line::from(""));
    lines.push(Line::from(modal.footer().fg(Color::DarkGray)));
    lines.push(Line::from(Span::styled(
        format!("{seconds_left}s"),
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(title_color))
                .padding(Padding::horizontal(2)),
        );

    frame.render_widget(widget, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
