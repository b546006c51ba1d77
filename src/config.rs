use std::time::Duration;

use ratatui::style::Color;

/// Logical grid dimensions passed through the game as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Default play-field width in cells.
pub const DEFAULT_GRID_WIDTH: u16 = 30;

/// Default play-field height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Tick rate at score zero, in ticks per second.
pub const BASE_FPS: u32 = 10;

/// Score needed per extra tick per second.
pub const POINTS_PER_SPEED_STEP: u32 = 10;

/// Probability that a freshly spawned apple is the small (growth 1) kind.
pub const SMALL_APPLE_CHANCE: f64 = 0.8;

/// Obstacles placed at the start of every episode.
pub const NUM_OBSTACLES: usize = 30;

/// Per-tick probability of a new power-up appearing.
pub const POWERUP_CHANCE: f64 = 0.005;

/// How long a timed power-up effect lasts once collected.
pub const POWERUP_DURATION: Duration = Duration::from_secs(5);

/// Length and score granted by the bonus-growth power-up.
pub const BONUS_GROWTH: u32 = 3;

/// Segments in a freshly reset snake.
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Number of high scores kept on disk.
pub const HIGH_SCORE_SLOTS: usize = 5;

/// Achievement key for reaching [`EAT_10_THRESHOLD`] points.
pub const ACHIEVEMENT_EAT_10: &str = "eat_10";

/// Score that unlocks [`ACHIEVEMENT_EAT_10`].
pub const EAT_10_THRESHOLD: u32 = 10;

/// Frame pacing for the render/input loop.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Tunable parameters for one game session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub bounds: GridSize,
    pub obstacle_count: usize,
    pub powerup_chance: f64,
    pub powerup_duration: Duration,
    pub small_apple_chance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bounds: GridSize {
                width: DEFAULT_GRID_WIDTH,
                height: DEFAULT_GRID_HEIGHT,
            },
            obstacle_count: NUM_OBSTACLES,
            powerup_chance: POWERUP_CHANCE,
            powerup_duration: POWERUP_DURATION,
            small_apple_chance: SMALL_APPLE_CHANCE,
        }
    }
}

/// Reasons a [`GameConfig`] cannot start an episode.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least {min_width}x1 cells, got {width}x{height}")]
    GridTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
    },
    #[error("{obstacles} obstacles do not fit beside the snake on a {cells}-cell grid")]
    TooManyObstacles { obstacles: usize, cells: usize },
    #[error("{name} must be a probability between 0 and 1, got {value}")]
    InvalidChance { name: &'static str, value: f64 },
}

impl GameConfig {
    /// Checks that an episode can be laid out on the configured grid.
    ///
    /// The starting snake needs [`INITIAL_SNAKE_LENGTH`] columns, and at
    /// least one cell must stay free for the apple.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_width = INITIAL_SNAKE_LENGTH as u16;
        if self.bounds.width < min_width || self.bounds.height == 0 {
            return Err(ConfigError::GridTooSmall {
                width: self.bounds.width,
                height: self.bounds.height,
                min_width,
            });
        }

        let cells = self.bounds.total_cells();
        if self.obstacle_count + INITIAL_SNAKE_LENGTH >= cells {
            return Err(ConfigError::TooManyObstacles {
                obstacles: self.obstacle_count,
                cells,
            });
        }

        for (name, value) in [
            ("powerup_chance", self.powerup_chance),
            ("small_apple_chance", self.small_apple_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidChance { name, value });
            }
        }

        Ok(())
    }
}

/// Fixed colour palette for the terminal frontend.
#[derive(Debug)]
pub struct Theme {
    pub snake_head: Color,
    pub snake_body: Color,
    pub apple_small: Color,
    pub apple_big: Color,
    pub obstacle: Color,
    pub speed_boost: Color,
    pub slow: Color,
    pub shield: Color,
    pub bonus_growth: Color,
    pub play_bg: Color,
    pub border_fg: Color,
    pub hud_label: Color,
    pub hud_value: Color,
    pub menu_title: Color,
    pub menu_footer: Color,
}

/// Palette used by the renderer.
pub const THEME: Theme = Theme {
    snake_head: Color::LightGreen,
    snake_body: Color::Green,
    apple_small: Color::Red,
    apple_big: Color::LightRed,
    obstacle: Color::DarkGray,
    speed_boost: Color::Cyan,
    slow: Color::Yellow,
    shield: Color::Blue,
    bonus_growth: Color::LightYellow,
    play_bg: Color::Black,
    border_fg: Color::Gray,
    hud_label: Color::DarkGray,
    hud_value: Color::White,
    menu_title: Color::Red,
    menu_footer: Color::DarkGray,
};

/// Glyph drawn for one cell; two columns wide to keep cells square.
pub const GLYPH_CELL: &str = "██";

/// Glyph for round entities (apple, power-ups).
pub const GLYPH_ITEM: &str = "()";

/// Glyph for the shielded snake head.
pub const GLYPH_SHIELD_HEAD: &str = "[]";

/// Terminal columns per logical cell.
pub const CELL_COLUMNS: u16 = 2;
