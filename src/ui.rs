//! UI rendering functions.

use std::path::Path;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus};
use crate::derive::{ALL_SET_MESSAGE, Derived, Tone};
use crate::form::Stage;

/// Contract a path by replacing the home directory with `~` for display.
pub fn contract_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(suffix) = path.strip_prefix(&home)
    {
        return format!("~/{}", suffix.display());
    }
    path.display().to_string()
}

/// Number of spaces needed to right-align `right` after `left` within `width` columns.
pub fn gap_between(left: &str, right: &str, width: usize) -> usize {
    width.saturating_sub(left.width() + right.width())
}

/// Gauge color for a completeness score.
pub fn progress_color(progress: u8) -> Color {
    match progress {
        0..=25 => Color::Red,
        26..=75 => Color::Yellow,
        _ => Color::Green,
    }
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Positive => Color::Green,
        Tone::Warning => Color::Yellow,
    }
}

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Draw the main UI.
pub fn draw_ui(f: &mut Frame, app: &App, now: Instant) {
    let derived = app.derived();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress gauge
            Constraint::Length(1), // Step indicator
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Command panel
        ])
        .split(f.area());

    draw_progress(f, app, &derived, chunks[0]);
    draw_steps(f, app, chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Editor
            Constraint::Length(3), // Keywords
            Constraint::Length(8), // Summary
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Insights
            Constraint::Length(7), // Prompts
        ])
        .split(columns[1]);

    draw_editor(f, app, left[0]);
    draw_keywords(f, app, left[1]);
    draw_summary(f, app, &derived, now, left[2]);
    draw_insights(f, app, &derived, right[0]);
    draw_prompts(f, &derived, right[1]);
    draw_command_panel(f, app, now, chunks[3]);

    if app.show_help {
        draw_help_modal(f, app);
    }
}

fn draw_progress(f: &mut Frame, app: &App, derived: &Derived, area: Rect) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(" clarify ").left_aligned());
    if let Some(session_id) = &app.session_id {
        block = block.title(Line::from(format!(" {} ", session_id)).right_aligned());
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(progress_color(derived.progress)))
        .percent(u16::from(derived.progress))
        .label(format!("{}% complete", derived.progress));
    f.render_widget(gauge, area);
}

/// Step indicator: `● Question ── ○ Background ── ...`
fn draw_steps(f: &mut Frame, app: &App, area: Rect) {
    let current = app.form.stage;
    let mut spans = vec![Span::raw(" ")];

    for stage in Stage::ALL.iter() {
        if stage.index() > 0 {
            spans.push(Span::styled(" ── ", Style::default().fg(Color::DarkGray)));
        }
        let filled = !app.form.field(*stage).trim().is_empty();
        let (marker, style) = if *stage == current {
            (
                "●",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else if filled {
            ("✓", Style::default().fg(Color::Green))
        } else {
            ("○", Style::default().fg(Color::DarkGray))
        };
        spans.push(Span::styled(format!("{} {}", marker, stage.label()), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Field editor with a block cursor when focused.
fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let stage = app.form.stage;
    let text = app.form.field(stage);
    let focused = app.focus == Focus::Editor;

    let chars: Vec<char> = text.chars().collect();
    let pos = app.cursor.position().min(chars.len());
    let before: String = chars[..pos].iter().collect();
    let at: String = chars.get(pos).map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
    let after: String = chars.iter().skip(pos + 1).collect();

    let text_style = Style::default().fg(Color::White);
    let content = if focused {
        Line::from(vec![
            Span::styled(before, text_style),
            Span::styled(at, Style::default().fg(Color::Black).bg(Color::White)),
            Span::styled(after, text_style),
        ])
    } else if text.is_empty() {
        Line::from(Span::styled("(empty)", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(Span::styled(text.to_string(), text_style))
    };

    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", stage.prompt()));

    let editor = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(editor, area);
}

/// Keyword chips. Active chips are highlighted, the selected chip is underlined.
fn draw_keywords(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Keywords;
    let mut spans = Vec::new();

    for (i, keyword) in app.suggestions.iter().enumerate() {
        let active = app.form.keywords.contains(keyword);
        let mut style = if active {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if focused && i == app.keyword_index {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        spans.push(Span::styled(format!(" {} ", keyword), style));
        spans.push(Span::raw(" "));
    }
    if spans.is_empty() {
        spans.push(Span::styled(
            "(no keyword suggestions configured)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let title = if app.form.keywords.is_empty() {
        " Keywords ".to_string()
    } else {
        format!(" Keywords ({} selected) ", app.form.keywords.len())
    };
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(title);
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_summary(f: &mut Frame, app: &App, derived: &Derived, now: Instant, area: Rect) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Summary ");
    if app.is_copied(now) {
        block = block.title(
            Line::from(Span::styled(
                " ✓ Copied! ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))
            .right_aligned(),
        );
    }

    let lines: Vec<Line> = derived.summary.lines().map(Line::raw).collect();
    let summary = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(summary, area);
}

/// One insight per field; the current stage's insight is emphasized.
fn draw_insights(f: &mut Frame, app: &App, derived: &Derived, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    for insight in &derived.insights {
        let current = insight.field == app.form.stage;
        let color = tone_color(insight.tone);
        let mut title_style = Style::default().fg(color);
        if current {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }
        let marker = if current { "▶ " } else { "  " };
        let icon = match insight.tone {
            Tone::Positive => "✓",
            Tone::Warning => "!",
        };

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Cyan)),
            Span::styled(format!("{} {}: ", icon, insight.field.label()), title_style),
            Span::styled(insight.title, title_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", insight.description),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Insights ");
    let insights = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(insights, area);
}

fn draw_prompts(f: &mut Frame, derived: &Derived, area: Rect) {
    let lines: Vec<Line> = if derived.recommended_prompts.is_empty() {
        vec![Line::from(Span::styled(
            ALL_SET_MESSAGE,
            Style::default().fg(Color::Green),
        ))]
    } else {
        derived
            .recommended_prompts
            .iter()
            .map(|prompt| Line::from(format!("• {}", prompt)))
            .collect()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Consider answering ");
    let prompts = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(prompts, area);
}

/// Keyboard shortcuts (left) and copy status or log location (right).
fn draw_command_panel(f: &mut Frame, app: &App, now: Instant, area: Rect) {
    let shortcuts = match app.focus {
        Focus::Editor => "[Tab] Next  [^K] Keywords  [^Y] Copy  [^R] Reset  [F1] Help  [Esc] Quit",
        Focus::Keywords => "[←/→] Select  [Space] Toggle  [Esc] Back  [^Y] Copy",
    };

    let (status_text, status_color) = if let Some(error) = &app.copy_error {
        (format!("⚠ {}", error), Color::Yellow)
    } else if app.is_copied(now) {
        ("● Copied".to_string(), Color::Green)
    } else if let Some(dir) = &app.log_directory {
        (format!("Logs: {}", contract_path(dir)), Color::DarkGray)
    } else {
        (String::new(), Color::DarkGray)
    };

    let inner_width = area.width.saturating_sub(2) as usize;
    let spacing = gap_between(shortcuts, &status_text, inner_width);

    let command_line = Line::from(vec![
        Span::styled(shortcuts, Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(spacing)),
        Span::styled(status_text, Style::default().fg(status_color)),
    ]);

    let command_panel = Paragraph::new(command_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(command_panel, area);
}

/// Key bindings listed in the help overlay, grouped by section.
const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Editing",
        &[
            ("Tab/Enter", "Next step"),
            ("Shift+Tab", "Previous step"),
            ("←/→", "Move cursor"),
            ("Home/End", "Start/end of field"),
            ("Backspace", "Delete before cursor"),
            ("Delete", "Delete under cursor"),
        ],
    ),
    (
        "Keywords",
        &[
            ("Ctrl+K", "Focus keywords"),
            ("Space", "Toggle selected keyword"),
        ],
    ),
    (
        "Actions",
        &[
            ("Ctrl+Y", "Copy summary"),
            ("Ctrl+R", "Start over"),
            ("Esc", "Quit (from the editor)"),
            ("Ctrl+Q/C", "Quit"),
        ],
    ),
];

const HELP_MODAL_HEIGHT: u16 = 22;

fn draw_help_modal(f: &mut Frame, app: &App) {
    let modal_width: u16 = 50;
    let modal_height: u16 = HELP_MODAL_HEIGHT;
    let modal_area = centered_rect(modal_width, modal_height, f.area());

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let key_style = Style::default().fg(Color::Cyan);
    let desc_style = Style::default().fg(Color::DarkGray);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<10}", key), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    let mut content: Vec<Line> = Vec::new();
    for (i, (section, entries)) in HELP_SECTIONS.iter().enumerate() {
        if i > 0 {
            content.push(Line::from(""));
        }
        content.push(Line::from(Span::styled(format!("  {}", section), header_style)));
        content.extend(entries.iter().map(|&(key, desc)| entry(key, desc)));
    }
    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Config: ", desc_style),
        Span::raw(contract_path(&app.config_path)),
    ]));
    content.push(Line::from(Span::styled("F1 or Esc to close  ", desc_style)).right_aligned());

    let modal = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(Color::White)),
    );

    f.render_widget(modal, modal_area);
}
