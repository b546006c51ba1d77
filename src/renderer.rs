use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;

use crate::config::{CELL_COLUMNS, GLYPH_CELL, GLYPH_ITEM, GLYPH_SHIELD_HEAD, GridSize, THEME};
use crate::food::AppleSize;
use crate::game::GameStatus;
use crate::powerup::PowerupKind;
use crate::session::Snapshot;
use crate::snake::Position;
use crate::ui::hud::{SIDEBAR_WIDTH, render_sidebar};
use crate::ui::menu::{render_game_over_menu, render_pause_menu};

/// Renders the full game frame from an immutable snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &Snapshot<'_>) {
    let bounds = snapshot.bounds;
    let field_width = bounds.width.saturating_mul(CELL_COLUMNS).saturating_add(2);
    let field_height = bounds.height.saturating_add(2);

    let [field_area, sidebar_area, _] = Layout::horizontal([
        Constraint::Length(field_width),
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(frame.area());
    let [field_area, _] =
        Layout::vertical([Constraint::Length(field_height), Constraint::Min(0)]).areas(field_area);

    let block = Block::bordered()
        .border_style(Style::new().fg(THEME.border_fg))
        .style(Style::new().bg(THEME.play_bg));
    let inner = block.inner(field_area);
    frame.render_widget(block, field_area);

    render_obstacles(frame, inner, snapshot);
    render_items(frame, inner, snapshot);
    render_snake(frame, inner, snapshot);
    render_sidebar(frame, sidebar_area, snapshot);

    match snapshot.status {
        GameStatus::Paused => render_pause_menu(frame, field_area),
        GameStatus::GameOver => render_game_over_menu(
            frame,
            field_area,
            snapshot.score,
            snapshot.high_scores.first().copied().unwrap_or(0),
            snapshot.death_reason,
        ),
        GameStatus::Running => {}
    }
}

fn render_obstacles(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot<'_>) {
    let style = Style::new().fg(THEME.obstacle);
    for obstacle in snapshot.obstacles {
        draw_cell(frame, inner, snapshot.bounds, *obstacle, GLYPH_CELL, style);
    }
}

fn render_items(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot<'_>) {
    let apple_color = match snapshot.apple.size {
        AppleSize::Small => THEME.apple_small,
        AppleSize::Big => THEME.apple_big,
    };
    draw_cell(
        frame,
        inner,
        snapshot.bounds,
        snapshot.apple.position,
        GLYPH_ITEM,
        Style::new().fg(apple_color).add_modifier(Modifier::BOLD),
    );

    for (position, powerup) in snapshot.powerups {
        let style = Style::new()
            .fg(powerup_color(powerup.kind))
            .add_modifier(Modifier::BOLD);
        draw_cell(frame, inner, snapshot.bounds, *position, GLYPH_ITEM, style);
    }
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot<'_>) {
    let head = snapshot.snake.head();
    let body_style = Style::new().fg(THEME.snake_body);

    for segment in snapshot.snake.segments().skip(1) {
        draw_cell(frame, inner, snapshot.bounds, *segment, GLYPH_CELL, body_style);
    }

    let (glyph, color) = if snapshot.shield_remaining.is_some() {
        (GLYPH_SHIELD_HEAD, THEME.shield)
    } else {
        (GLYPH_CELL, THEME.snake_head)
    };
    draw_cell(
        frame,
        inner,
        snapshot.bounds,
        head,
        glyph,
        Style::new().fg(color).add_modifier(Modifier::BOLD),
    );
}

/// Colour used for a power-up on the board and in the legend.
#[must_use]
pub fn powerup_color(kind: PowerupKind) -> Color {
    match kind {
        PowerupKind::SpeedBoost => THEME.speed_boost,
        PowerupKind::Slow => THEME.slow,
        PowerupKind::Shield => THEME.shield,
        PowerupKind::BonusGrowth => THEME.bonus_growth,
    }
}

fn draw_cell(
    frame: &mut Frame<'_>,
    inner: Rect,
    bounds: GridSize,
    position: Position,
    glyph: &str,
    style: Style,
) {
    let Some((x, y)) = logical_to_terminal(inner, bounds, position) else {
        return;
    };

    frame.buffer_mut().set_string(x, y, glyph, style);
}

fn logical_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.checked_mul(CELL_COLUMNS)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(CELL_COLUMNS) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
