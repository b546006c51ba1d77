use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::THEME;
use crate::game::DeathReason;

/// Draws the pause screen as a centered popup.
pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect) {
    let popup = centered_popup(area, 60, 40);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("PAUSED"),
        Line::from(""),
        Line::from("[P]/[Space] Resume"),
        Line::from("[R] Restart"),
        Line::from("[Q]/[Esc] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" pause ")),
        popup,
    );
}

/// Draws the game-over screen as a centered popup.
pub fn render_game_over_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    score: u32,
    best_score: u32,
    death_reason: Option<DeathReason>,
) {
    let popup = centered_popup(area, 70, 60);
    frame.render_widget(Clear, popup);

    let [title_row, body_row, footer_row] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(popup);

    frame.render_widget(
        Paragraph::new(Line::from("Game Over!"))
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(THEME.menu_title)
                    .add_modifier(Modifier::BOLD),
            ),
        title_row,
    );

    let is_best = score > 0 && score >= best_score;
    let body = vec![
        Line::from(format!("Score: {score}")),
        Line::from(format!("Best: {}", best_score.max(score))),
        Line::from(death_reason.map_or("", death_reason_text)),
        Line::from(if is_best { "New high score!" } else { "" }),
    ];
    frame.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" game over ")),
        body_row,
    );

    frame.render_widget(
        Paragraph::new(Line::from("[R]/[Enter] Play again  [Q] Quit"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(THEME.menu_footer)),
        footer_row,
    );
}

fn death_reason_text(reason: DeathReason) -> &'static str {
    match reason {
        DeathReason::ObstacleCollision => "Cause: hit an obstacle",
        DeathReason::SelfCollision => "Cause: hit yourself",
        DeathReason::BoardFilled => "Cause: no room left",
    }
}

fn centered_popup(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let [_, mid, _] = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .areas(mid);

    center
}
