use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::{HIGH_SCORE_SLOTS, THEME};
use crate::powerup::PowerupKind;
use crate::renderer::powerup_color;
use crate::session::{MissionProgress, Snapshot};

/// Columns reserved for the sidebar, borders included.
pub const SIDEBAR_WIDTH: u16 = 28;

const MISSION_DONE_MARK: &str = "✓";

/// Draws score, time, active effects, high scores and missions.
pub fn render_sidebar(frame: &mut Frame<'_>, area: Rect, snapshot: &Snapshot<'_>) {
    let block = Block::bordered()
        .title(" snake ")
        .border_style(Style::new().fg(THEME.border_fg));
    let inner_width = usize::from(block.inner(area).width);

    let mut lines = vec![
        stat_line("Score", snapshot.score.to_string()),
        stat_line("Time", format!("{}s", snapshot.elapsed.as_secs())),
        stat_line("Length", snapshot.snake.len().to_string()),
        Line::from(""),
        section_title("Effects"),
    ];
    lines.extend(effect_lines(snapshot));

    lines.push(Line::from(""));
    lines.push(section_title("High Scores"));
    lines.extend(high_score_lines(snapshot.high_scores));

    lines.push(Line::from(""));
    lines.push(section_title("Missions"));
    lines.extend(
        snapshot
            .missions
            .iter()
            .map(|mission| Line::from(truncate_to_width(&mission_text(mission), inner_width))),
    );

    lines.push(Line::from(""));
    lines.push(section_title("Power-ups"));
    lines.extend(PowerupKind::ALL.iter().map(|kind| {
        Line::from(vec![
            Span::styled("() ", Style::new().fg(powerup_color(*kind))),
            Span::raw(kind.label()),
        ])
    }));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn stat_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::new().fg(THEME.hud_label)),
        Span::styled(value, Style::new().fg(THEME.hud_value)),
    ])
}

fn section_title(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::new()
            .fg(THEME.hud_value)
            .add_modifier(Modifier::BOLD),
    ))
}

fn effect_lines(snapshot: &Snapshot<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(remaining) = snapshot.shield_remaining {
        lines.push(Line::from(Span::styled(
            format!("Shield {}", seconds_left(remaining)),
            Style::new().fg(THEME.shield),
        )));
    }

    if let Some((multiplier, remaining)) = snapshot.speed_effect {
        let (label, color) = if multiplier > 1.0 {
            ("Speed", THEME.speed_boost)
        } else {
            ("Slow", THEME.slow)
        };
        lines.push(Line::from(Span::styled(
            format!("{label} x{multiplier} {}", seconds_left(remaining)),
            Style::new().fg(color),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "none",
            Style::new().fg(THEME.hud_label),
        )));
    }

    lines
}

fn high_score_lines(high_scores: &[u32]) -> Vec<Line<'static>> {
    (0..HIGH_SCORE_SLOTS)
        .map(|slot| {
            let value = high_scores
                .get(slot)
                .map_or_else(|| "-".to_owned(), u32::to_string);
            Line::from(format!("{}. {value}", slot + 1))
        })
        .collect()
}

fn mission_text(mission: &MissionProgress) -> String {
    if mission.earned {
        format!("{MISSION_DONE_MARK} {}", mission.label)
    } else {
        format!("{} ({}/{})", mission.label, mission.progress, mission.goal)
    }
}

fn seconds_left(remaining: Duration) -> String {
    format!("{:.1}s", remaining.as_secs_f32())
}

/// Cuts `text` so it spans at most `max_width` terminal columns.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out
}
