use crate::overlay::{
    Badge, STATE_ASSET_CHANGED, STATE_COMPILE_ERROR, STATE_COMPILING, STATE_CONNECTING,
    STATE_RUNNING, STATE_STREAM_DOWN,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

/// Same glyph either way; the style tells the variants apart.
pub const AUTO_RELOAD_GLYPH: &str = "↻";

pub fn render_badge(frame: &mut Frame<'_>, area: Rect, badge: &Badge) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let label = truncate_line(&badge.label, area.width.saturating_sub(4) as usize);
    let glyph_style = if badge.auto_reload {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {label} "), badge_style(&badge.class)),
        Span::styled(format!("{AUTO_RELOAD_GLYPH} "), glyph_style),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_transitions(frame: &mut Frame<'_>, area: Rect, lines: &[String]) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    // Keep the tail visible; older transitions scroll away.
    let visible = area.height as usize;
    let start = lines.len().saturating_sub(visible);
    let body = lines[start..].join("\n");

    frame.render_widget(
        Paragraph::new(body)
            .style(Style::default().fg(Color::Gray))
            .wrap(Wrap { trim: false }),
        area,
    );
}

pub fn render_help(frame: &mut Frame<'_>, area: Rect) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let text = truncate_line(
        "click badge or press a to toggle auto-reload · q to quit",
        area.width as usize,
    );
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// The badge's class attribute is the state string; known states get fixed
/// colors and anything the server invents falls back to plain white.
pub fn badge_style(class: &str) -> Style {
    match class {
        STATE_CONNECTING => Style::default().fg(Color::DarkGray),
        STATE_COMPILING => Style::default().fg(Color::Black).bg(Color::Yellow),
        STATE_COMPILE_ERROR => Style::default().fg(Color::White).bg(Color::Red),
        STATE_RUNNING => Style::default().fg(Color::Black).bg(Color::Green),
        STATE_ASSET_CHANGED => Style::default().fg(Color::Black).bg(Color::Cyan),
        STATE_STREAM_DOWN => Style::default().fg(Color::Gray).bg(Color::DarkGray),
        _ => Style::default().fg(Color::White),
    }
}

fn truncate_line(input: &str, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::new();
    let mut used = 0usize;

    for ch in input.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}
