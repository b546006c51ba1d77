use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info};
use powerup_snake::config::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, FRAME_INTERVAL, GameConfig, GridSize, NUM_OBSTACLES,
};
use powerup_snake::error::AppError;
use powerup_snake::game::GameState;
use powerup_snake::input::{GameInput, InputHandler};
use powerup_snake::renderer;
use powerup_snake::score::{FileScoreStore, MemoryScoreStore, ScoreStore, default_data_dir};
use powerup_snake::session::GameSession;
use powerup_snake::terminal_runtime::TerminalSession;
use simplelog::{Config, LevelFilter, WriteLogger};

const LOG_FILE_NAME: &str = "powerup-snake.log";

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Play-field width in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    width: u16,

    /// Play-field height in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    height: u16,

    /// Obstacles placed at the start of each episode.
    #[arg(long, default_value_t = NUM_OBSTACLES)]
    obstacles: usize,

    /// Seed for a reproducible sequence of boards.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding highscores.json and achievements.json.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep scores in memory only.
    #[arg(long)]
    no_save: bool,

    /// Log file; defaults to powerup-snake.log in the data directory.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity (off, error, warn, info, debug, trace).
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Cli {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            bounds: GridSize {
                width: self.width,
                height: self.height,
            },
            obstacle_count: self.obstacles,
            ..GameConfig::default()
        }
    }
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);

    init_logging(&cli, &data_dir)?;

    let config = cli.game_config();
    config.validate()?;

    let now = Instant::now();
    let state = match cli.seed {
        Some(seed) => GameState::new_with_seed(config, seed, now)?,
        None => GameState::new(config, now)?,
    };

    if cli.no_save {
        info!("scores kept in memory only");
        play(GameSession::open(MemoryScoreStore::default(), state)?)
    } else {
        info!("scores stored in {}", data_dir.display());
        play(GameSession::open(FileScoreStore::open(&data_dir)?, state)?)
    }
}

fn init_logging(cli: &Cli, data_dir: &Path) -> Result<(), AppError> {
    let path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir.join(LOG_FILE_NAME));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    WriteLogger::init(cli.log_level, Config::default(), File::create(path)?)?;
    Ok(())
}

fn play<S: ScoreStore>(mut session: GameSession<S>) -> Result<(), AppError> {
    let outcome = {
        let mut terminal = TerminalSession::enter()?;
        run(&mut terminal, &mut session)
    };

    if let Err(error) = &outcome {
        error!("game loop stopped: {error}");
    }

    session.flush()?;
    info!("shut down cleanly");
    outcome
}

fn run<S: ScoreStore>(
    terminal: &mut TerminalSession,
    session: &mut GameSession<S>,
) -> Result<(), AppError> {
    let mut input = InputHandler::new();
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        terminal.draw(&session.snapshot(now))?;

        for game_input in input.poll_inputs()? {
            if game_input == GameInput::Quit {
                return Ok(());
            }

            session.handle_input(game_input, now)?;
            if game_input == GameInput::Restart {
                last_tick = now;
            }
        }

        let now = Instant::now();
        if advance_clock(&mut last_tick, session.state().tick_interval(), now) {
            session.tick(now);
        }

        let next_tick = last_tick + session.state().tick_interval();
        thread::sleep(next_tick.saturating_duration_since(Instant::now()).min(FRAME_INTERVAL));
    }
}

/// Moves `last_tick` forward by one interval once it is due.
///
/// Deadlines advance by whole intervals so the rate does not drift with
/// frame time. A backlog of more than one interval is dropped.
fn advance_clock(last_tick: &mut Instant, interval: Duration, now: Instant) -> bool {
    if now.saturating_duration_since(*last_tick) < interval {
        return false;
    }

    *last_tick += interval;
    if now.saturating_duration_since(*last_tick) >= interval {
        *last_tick = now;
    }
    true
}
