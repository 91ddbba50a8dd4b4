//! Account form screen, shared by sign-in and registration.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::state::FormState;
use crate::protocol::EditableForm;

const LABEL_WIDTH: usize = 20;

pub fn render<F: EditableForm>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    state: &FormState<F>,
    pending_text: &str,
) {
    let field_count = state.form.len() as u16;

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(field_count + 8),
        Constraint::Fill(1),
    ])
    .split(area);

    let columns = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(64),
        Constraint::Fill(1),
    ])
    .split(chunks[1]);

    let mut lines = vec![Line::from("")];

    for (index, label) in state.form.labels().iter().enumerate() {
        let focused = index == state.focus;
        let value = if state.form.is_secret(index) {
            "*".repeat(state.form.field(index).chars().count())
        } else {
            state.form.field(index).to_string()
        };

        let label_style = if focused {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if focused { "_" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(if focused { "> " } else { "  " }, label_style),
            Span::styled(format!("{:<width$}", label, width = LABEL_WIDTH), label_style),
            Span::styled(value, Style::default().fg(Color::Yellow)),
            Span::styled(cursor, Style::default().fg(Color::Yellow)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(match (&state.notice, state.pending) {
        (_, true) => Line::from(pending_text.fg(Color::Yellow)),
        (Some(notice), false) if notice.is_error => {
            Line::from(Span::styled(notice.text.clone(), Style::default().fg(Color::Red)))
        }
        (Some(notice), false) => {
            Line::from(Span::styled(notice.text.clone(), Style::default().fg(Color::Green)))
        }
        (None, false) => Line::from(""),
    });
    lines.push(Line::from(""));
    lines.push(Line::from(
        "Tab/arrows move  ·  Enter submit  ·  Esc back".fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {title} "))
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, columns[1]);
}
