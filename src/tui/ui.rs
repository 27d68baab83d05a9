// ui rendering

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::core::Role;
use crate::tui::app::{App, LogLevel};
use crate::tui::breathing::{Exercise, Phase};

pub const HELPLINES: &[(&str, &str)] = &[
    ("TeleMANAS (India)", "08046110007"),
    ("National Crisis Helpline", "1800-891-4416"),
];

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;

    frame.render_widget(Clear, frame.area());
    frame.render_widget(Block::default().style(theme.base()), frame.area());

    let banner = if app.crisis_alert { 5 } else { 0 };

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // header
            Constraint::Length(banner), // crisis banner
            Constraint::Min(5),         // conversation
            Constraint::Length(3),      // input
            Constraint::Length(1),      // footer
        ])
        .split(frame.area());

    render_header(frame, app, main[0]);
    if app.crisis_alert {
        render_crisis_banner(frame, app, main[1]);
    }
    render_body(frame, app, main[2]);
    render_input(frame, app, main[3]);
    render_footer(frame, app, main[4]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let line = Line::from(vec![
        Span::styled("Lumacalm AI", theme.title()),
        Span::styled("  | ", theme.muted()),
        Span::styled(app.user().to_string(), theme.base()),
        Span::styled("  | ", theme.muted()),
        Span::styled(app.backend.clone(), theme.muted()),
        Span::styled("  | ", theme.muted()),
        Span::styled(app.theme_kind.name(), theme.accent()),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border())
            .style(theme.base()),
    );
    frame.render_widget(header, area);
}

fn render_crisis_banner(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let mut lines = vec![Line::from(vec![
        Span::styled("Crisis Support Available: ", theme.alert()),
        Span::styled(
            "if you're experiencing a mental health crisis, please reach out immediately.",
            theme.base(),
        ),
    ])];
    for (name, number) in HELPLINES {
        lines.push(Line::from(vec![
            Span::styled(format!("{name}: "), theme.alert()),
            Span::styled(*number, theme.base()),
        ]));
    }

    let banner = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(" [Esc] dismiss ", theme.muted()))
            .borders(Borders::ALL)
            .border_style(theme.alert())
            .style(theme.base()),
    );
    frame.render_widget(banner, area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let rows = if app.show_logs {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(8)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5)])
            .split(area)
    };

    match &app.breathing {
        Some(exercise) => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(20), Constraint::Length(36)])
                .split(rows[0]);
            render_messages(frame, app, cols[0]);
            render_breathing(frame, app, exercise, cols[1]);
        }
        None => render_messages(frame, app, rows[0]),
    }

    if app.show_logs {
        render_logs(frame, app, rows[1]);
    }
}

fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .style(theme.base());

    let mut lines: Vec<Line> = Vec::new();

    if app.messages.is_empty() && !app.loading {
        lines.push(Line::styled("Welcome to Lumacalm AI", theme.title()));
        lines.push(Line::styled(
            "I'm here to listen and support you. How are you feeling today?",
            theme.muted(),
        ));
    }

    for message in &app.messages {
        let (who, style) = match message.role {
            Role::User => ("you", theme.user()),
            Role::Assistant | Role::System => ("lumacalm", theme.assistant()),
        };
        lines.push(Line::from(vec![
            Span::styled(who, style),
            Span::styled(format!("  {}", message.time), theme.muted()),
        ]));
        for text in message.content.lines() {
            lines.push(Line::styled(format!("  {text}"), theme.base()));
        }
        lines.push(Line::default());
    }

    if app.loading {
        lines.push(Line::styled("lumacalm is typing...", theme.muted()));
    }

    // keep the newest lines in view, scroll counts back from the bottom
    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|l| l.width().max(1).div_ceil(inner_width))
        .sum();
    let max_offset = total.saturating_sub(inner_height);
    let offset = max_offset.saturating_sub(app.scroll);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(paragraph, area);
}

fn render_breathing(frame: &mut Frame, app: &App, exercise: &Exercise, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .title(Span::styled(" Breathing Exercise ", theme.title()))
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .style(theme.base());

    let inner = area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });
    frame.render_widget(block, area);

    // the ball grows on the inhale
    let ball: &[&str] = match exercise.state.phase {
        Phase::Inhale => &[
            "    .-''''-.    ",
            "  .'        '.  ",
            " /            \\ ",
            "|              |",
            " \\            / ",
            "  '.        .'  ",
            "    '-....-'    ",
        ],
        Phase::Exhale => &[
            "",
            "     .--.     ",
            "    /    \\    ",
            "    \\    /    ",
            "     '--'     ",
            "",
            "",
        ],
    };

    let mut lines: Vec<Line> = ball
        .iter()
        .map(|&l| Line::styled(l, theme.accent()))
        .collect();
    lines.push(Line::default());
    lines.push(Line::styled(exercise.state.phase.instruction(), theme.base()));
    lines.push(Line::default());
    lines.push(Line::styled(exercise.state.message(), theme.muted()));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let visible = area.height.saturating_sub(2) as usize;
    let start = app.logs.len().saturating_sub(visible);

    let lines: Vec<Line> = app.logs[start..]
        .iter()
        .map(|entry| {
            let (tag, style) = match entry.level {
                LogLevel::Info => ("info ", theme.muted()),
                LogLevel::Ok => ("ok   ", theme.accent()),
                LogLevel::Warn => ("warn ", theme.alert()),
                LogLevel::Error => ("error", theme.alert()),
            };
            Line::from(vec![
                Span::styled(tag, style),
                Span::styled(format!(" {}", entry.message), theme.base()),
            ])
        })
        .collect();

    let logs = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Logs ", theme.title()))
            .borders(Borders::ALL)
            .border_style(theme.border())
            .style(theme.base()),
    );
    frame.render_widget(logs, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let content = if app.input.is_empty() {
        Line::styled("Share what's on your mind...", theme.muted())
    } else {
        Line::styled(app.input.clone(), theme.base())
    };

    let border = if app.loading {
        theme.border()
    } else {
        theme.accent()
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .style(theme.base()),
    );
    frame.render_widget(input, area);

    // real terminal cursor
    let x = cursor_column(app.cursor, area.width);
    frame.set_cursor_position((area.x + 1 + x, area.y + 1));
}

// clamped to the inside of a bordered box
fn cursor_column(cursor: usize, width: u16) -> u16 {
    let max_x = width.saturating_sub(2);
    u16::try_from(cursor).unwrap_or(u16::MAX).min(max_x)
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let line = match &app.notice {
        Some(notice) => Line::styled(format!(" {}", notice.text), theme.alert()),
        None => Line::from(vec![
            Span::styled(" [Enter]", theme.accent()),
            Span::styled(" send  ", theme.muted()),
            Span::styled("[^B]", theme.accent()),
            Span::styled(" breathe  ", theme.muted()),
            Span::styled("[^L]", theme.accent()),
            Span::styled(" logs  ", theme.muted()),
            Span::styled("[^T]", theme.accent()),
            Span::styled(" theme  ", theme.muted()),
            Span::styled("[^X]", theme.accent()),
            Span::styled(" clear  ", theme.muted()),
            Span::styled("[^O]", theme.accent()),
            Span::styled(" sign out  ", theme.muted()),
            Span::styled("[^Q]", theme.accent()),
            Span::styled(" quit   ", theme.muted()),
            Span::styled(
                "This chatbot does not provide professional therapy.",
                theme.muted(),
            ),
        ]),
    };

    frame.render_widget(Paragraph::new(line).style(theme.base()), area);
}
