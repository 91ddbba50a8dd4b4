//! Quiz screen for the client.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};

use crate::client::state::{ClientApp, QuestionsView, NO_QUESTIONS_MESSAGE};
use crate::models::Question;
use crate::quiz::{Phase, QuizSession};

use super::{modal, render::render_sign_in_prompt};

/// Render the quiz screen.
pub fn render(frame: &mut Frame, area: Rect, app: &ClientApp) {
    if !app.is_signed_in() {
        render_sign_in_prompt(frame, area, "play the quiz");
        return;
    }

    let session = &app.session;

    match (session.head(), session.phase()) {
        (_, Phase::Complete) => {
            render_placeholder(
                frame,
                area,
                "All questions answered!",
                "[R] play again  ·  [L] leaderboard  ·  [Q] quit",
            );
        }
        (Some(question), _) => render_question(frame, area, session, question),
        (None, _) => render_waiting(frame, area, &app.questions),
    }

    if let Some(result) = session.modal() {
        modal::render(frame, area, result, session.modal_seconds_left(), &app.leaderboard);
    }
}

fn render_waiting(frame: &mut Frame, area: Rect, questions: &QuestionsView) {
    match questions {
        QuestionsView::Failed(message) => {
            render_placeholder(frame, area, message, "[R] retry  ·  [Esc] back  ·  [Q] quit")
        }
        QuestionsView::Loaded => {
            render_placeholder(frame, area, NO_QUESTIONS_MESSAGE, "[Esc] back  ·  [Q] quit")
        }
        QuestionsView::Loading | QuestionsView::NotLoaded => {
            render_placeholder(frame, area, "Loading questions...", "[Q] quit")
        }
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str, controls: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(5),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Yellow).bold())),
        Line::from(""),
        Line::from(Span::styled(controls.to_string(), Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), chunks[1]);
}

fn render_question(frame: &mut Frame, area: Rect, session: &QuizSession, question: &Question) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Countdown
        Constraint::Length(5), // Question text
        Constraint::Min(6),    // Options
        Constraint::Length(2), // Status
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_countdown(frame, chunks[0], session);
    render_question_text(frame, chunks[1], &question.question);
    render_options(frame, chunks[2], session, &question.options);
    render_status(frame, chunks[3], session);
    render_controls(frame, chunks[4]);
}

fn render_countdown(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let text = if session.phase() == Phase::ResultModal {
        "Waiting for questions...".to_string()
    } else {
        format!(
            "Time left: {}s  ·  {} remaining",
            session.time_left(),
            session.remaining_questions()
        )
    };

    let color = match session.time_left() {
        0..=5 => Color::Red,
        6..=10 => Color::Yellow,
        _ => Color::Cyan,
    };

    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).bold());

    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Question ")
                .title_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        );

    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, session: &QuizSession, options: &[String]) {
    let locked = session.phase() != Phase::Answering;

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let is_cursor = i == session.cursor() && !locked;
            let is_selected = session.selected_option() == Some(opt.as_str());
            let prefix = if is_cursor { "> " } else { "  " };

            let style = if is_selected {
                Style::default().fg(Color::Black).bg(Color::Blue).bold()
            } else if locked {
                Style::default().fg(Color::DarkGray)
            } else if is_cursor {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(prefix, style),
                Span::styled(format!("{}) ", i + 1), style),
                Span::styled(opt.clone(), style),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );

    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, session: &QuizSession) {
    let line = match (session.phase(), session.error()) {
        (Phase::Submitting, _) => Line::from("Submitting...".fg(Color::Yellow)),
        (Phase::LockedCorrect, _) => Line::from(
            "Correct answer! Waiting for timer to finish..."
                .fg(Color::Green)
                .bold(),
        ),
        (_, Some(error)) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        (Phase::Answering, None) if session.selected_option().is_none() => {
            Line::from("Pick an option, then press Enter".fg(Color::DarkGray))
        }
        _ => Line::from(""),
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new(
        "j/k move  ·  Space or 1-9 select  ·  Enter submit  ·  l leaderboard  ·  q quit",
    )
    .alignment(Alignment::Center)
    .fg(Color::DarkGray);

    frame.render_widget(widget, area);
}
