use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{BONUS_GROWTH, GameConfig, GridSize};
use crate::effects::EffectTracker;
use crate::food::{Apple, spawn_apple};
use crate::input::GameInput;
use crate::powerup::{Powerup, PowerupKind, spawn_powerup};
use crate::snake::{Position, Snake};
use crate::spawn::{SpawnError, spawn_obstacles};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameStatus {
    Running,
    Paused,
    GameOver,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeathReason {
    SelfCollision,
    ObstacleCollision,
    /// The snake grew so long that no cell was left for the next apple.
    BoardFilled,
}

/// What happened during one call to [`GameState::tick`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// Paused or already over; nothing advanced.
    Idle,
    Moved,
    /// A collision was absorbed by the shield; the snake held its position.
    ShieldBroken,
    AppleEaten { growth: u32 },
    PowerupCollected(PowerupKind),
    GameOver(DeathReason),
}

/// Complete mutable game state for one episode.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub obstacles: HashSet<Position>,
    pub apple: Apple,
    pub powerups: HashMap<Position, Powerup>,
    pub effects: EffectTracker,
    pub score: u32,
    pub tick_count: u64,
    pub status: GameStatus,
    pub death_reason: Option<DeathReason>,
    started_at: Instant,
    ended_at: Option<Instant>,
    config: GameConfig,
    rng: StdRng,
}

impl GameState {
    /// Starts an episode seeded from OS entropy.
    pub fn new(config: GameConfig, now: Instant) -> Result<Self, SpawnError> {
        Self::from_rng(config, StdRng::from_entropy(), now)
    }

    /// Creates a deterministic state for tests and reproducible simulations.
    pub fn new_with_seed(config: GameConfig, seed: u64, now: Instant) -> Result<Self, SpawnError> {
        Self::from_rng(config, StdRng::seed_from_u64(seed), now)
    }

    fn from_rng(config: GameConfig, mut rng: StdRng, now: Instant) -> Result<Self, SpawnError> {
        let bounds = config.bounds;
        let snake = Snake::centered(bounds);
        let snake_cells: HashSet<Position> = snake.segments().copied().collect();
        let obstacles = spawn_obstacles(&mut rng, bounds, config.obstacle_count, &snake_cells)?;

        let mut excluded = snake_cells;
        excluded.extend(obstacles.iter().copied());
        let apple = spawn_apple(&mut rng, bounds, &excluded, config.small_apple_chance)?;

        info!(
            "episode started on {}x{} grid with {} obstacles",
            bounds.width,
            bounds.height,
            obstacles.len()
        );

        Ok(Self {
            snake,
            obstacles,
            apple,
            powerups: HashMap::new(),
            effects: EffectTracker::new(),
            score: 0,
            tick_count: 0,
            status: GameStatus::Running,
            death_reason: None,
            started_at: now,
            ended_at: None,
            config,
            rng,
        })
    }

    /// Throws the episode away and lays out a fresh board.
    ///
    /// The random stream continues from where the old episode left it.
    pub fn restart(&mut self, now: Instant) -> Result<(), SpawnError> {
        *self = Self::from_rng(self.config, self.rng.clone(), now)?;
        Ok(())
    }

    /// Advances simulation by one gameplay tick.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if self.status != GameStatus::Running {
            return TickOutcome::Idle;
        }

        self.tick_count += 1;
        self.effects.expire(now);
        self.maybe_spawn_powerup(now);

        let next = self.snake.next_head_position(self.config.bounds);
        let hit_obstacle = self.obstacles.contains(&next);
        if hit_obstacle || self.snake.occupies(next) {
            if self.effects.shield_active() {
                debug!("shield absorbed collision at {next:?}");
                self.effects.break_shield();
                return TickOutcome::ShieldBroken;
            }

            let reason = if hit_obstacle {
                DeathReason::ObstacleCollision
            } else {
                DeathReason::SelfCollision
            };
            return self.end_episode(reason, now);
        }

        self.snake.push_head(next);
        let mut outcome = TickOutcome::Moved;

        if next == self.apple.position {
            let growth = self.apple.growth();
            self.snake.grow(growth);
            self.score += growth;

            let excluded = self.occupied_cells();
            match spawn_apple(
                &mut self.rng,
                self.config.bounds,
                &excluded,
                self.config.small_apple_chance,
            ) {
                Ok(apple) => self.apple = apple,
                Err(error) => {
                    debug!("apple respawn failed: {error}");
                    self.snake.trim_tail();
                    return self.end_episode(DeathReason::BoardFilled, now);
                }
            }

            outcome = TickOutcome::AppleEaten { growth };
        }

        if let Some(powerup) = self.powerups.remove(&next) {
            debug!("collected {:?} at {next:?}", powerup.kind);
            match powerup.kind {
                PowerupKind::BonusGrowth => {
                    self.snake.grow(BONUS_GROWTH);
                    self.score += BONUS_GROWTH;
                }
                kind => {
                    self.effects.apply(kind, now, self.config.powerup_duration);
                }
            }

            outcome = TickOutcome::PowerupCollected(powerup.kind);
        }

        self.snake.trim_tail();
        outcome
    }

    /// Applies one external input event.
    ///
    /// Turns are accepted while paused so a move can be lined up before
    /// resuming. Restart and quit belong to the session and are ignored here.
    pub fn apply_input(&mut self, input: GameInput) {
        match input {
            GameInput::Direction(direction) => {
                if self.status != GameStatus::GameOver {
                    let _ = self.snake.steer(direction);
                }
            }
            GameInput::Pause => {
                self.status = match self.status {
                    GameStatus::Running => GameStatus::Paused,
                    GameStatus::Paused => GameStatus::Running,
                    GameStatus::GameOver => GameStatus::GameOver,
                };
            }
            GameInput::Restart | GameInput::Quit => {}
        }
    }

    /// Every cell currently taken by an entity: snake, obstacles,
    /// power-ups and the apple.
    #[must_use]
    pub fn occupied_cells(&self) -> HashSet<Position> {
        let mut cells: HashSet<Position> = self.snake.segments().copied().collect();
        cells.extend(self.obstacles.iter().copied());
        cells.extend(self.powerups.keys().copied());
        cells.insert(self.apple.position);
        cells
    }

    /// Wall-clock time since the episode started, frozen once it ends.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.ended_at
            .unwrap_or(now)
            .saturating_duration_since(self.started_at)
    }

    /// Time until the next tick should run.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.effects.tick_interval(self.score)
    }

    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.config.bounds
    }

    fn maybe_spawn_powerup(&mut self, now: Instant) {
        if !self.rng.gen_bool(self.config.powerup_chance) {
            return;
        }

        let excluded = self.occupied_cells();
        match spawn_powerup(&mut self.rng, self.config.bounds, &excluded) {
            Ok((position, kind)) => {
                debug!("spawned {kind:?} power-up at {position:?}");
                self.powerups.insert(
                    position,
                    Powerup {
                        kind,
                        created_at: now,
                    },
                );
            }
            Err(error) => debug!("skipped power-up spawn: {error}"),
        }
    }

    fn end_episode(&mut self, reason: DeathReason, now: Instant) -> TickOutcome {
        info!(
            "episode over after {} ticks: {reason:?}, score {}",
            self.tick_count, self.score
        );
        self.status = GameStatus::GameOver;
        self.death_reason = Some(reason);
        self.ended_at = Some(now);
        TickOutcome::GameOver(reason)
    }
}

/// Applies `input` (if any) and one tick to a copy of `state`.
///
/// Leaves `state` untouched, which makes it convenient for tests and
/// look-ahead. Restart and quit inputs have no effect here.
#[must_use]
pub fn step(
    state: &GameState,
    input: Option<GameInput>,
    now: Instant,
) -> (GameState, TickOutcome) {
    let mut next = state.clone();
    if let Some(input) = input {
        next.apply_input(input);
    }
    let outcome = next.tick(now);
    (next, outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    use crate::config::{GameConfig, GridSize};
    use crate::food::Apple;
    use crate::input::{Direction, GameInput};
    use crate::powerup::{Powerup, PowerupKind};
    use crate::snake::{Position, Snake};

    use super::{DeathReason, GameState, GameStatus, TickOutcome, step};

    fn quiet_config(width: u16, height: u16) -> GameConfig {
        GameConfig {
            bounds: GridSize { width, height },
            obstacle_count: 0,
            powerup_chance: 0.0,
            ..GameConfig::default()
        }
    }

    fn quiet_state(width: u16, height: u16, seed: u64) -> (GameState, Instant) {
        let now = Instant::now();
        let state = GameState::new_with_seed(quiet_config(width, height), seed, now)
            .expect("board should have room");
        (state, now)
    }

    fn place_powerup(state: &mut GameState, position: Position, kind: PowerupKind, now: Instant) {
        state.powerups.insert(
            position,
            Powerup {
                kind,
                created_at: now,
            },
        );
    }

    #[test]
    fn new_episode_lays_out_disjoint_entities() {
        let now = Instant::now();
        let state = GameState::new_with_seed(GameConfig::default(), 9, now).expect("room");

        let snake: HashSet<_> = state.snake.segments().copied().collect();
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.obstacles.len(), 30);
        assert!(state.obstacles.is_disjoint(&snake));
        assert!(!snake.contains(&state.apple.position));
        assert!(!state.obstacles.contains(&state.apple.position));
    }

    #[test]
    fn snake_wraps_around_right_edge() {
        let (mut state, now) = quiet_state(6, 4, 1);
        state.snake = Snake::from_segments(vec![Position::new(5, 1)], Direction::Right);
        state.apple = Apple::small(Position::new(3, 3));

        state.tick(now);

        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.snake.head(), Position::new(0, 1));
    }

    #[test]
    fn snake_wraps_around_top_edge() {
        let (mut state, now) = quiet_state(6, 4, 1);
        state.snake = Snake::from_segments(vec![Position::new(2, 0)], Direction::Up);
        state.apple = Apple::small(Position::new(5, 1));

        state.tick(now);

        assert_eq!(state.snake.head(), Position::new(2, 3));
    }

    #[test]
    fn reversal_input_is_ignored() {
        let (mut state, now) = quiet_state(20, 20, 2);

        state.apply_input(GameInput::Direction(Direction::Left));
        assert_eq!(state.snake.heading(), Direction::Right);

        state.apply_input(GameInput::Direction(Direction::Down));
        assert_eq!(state.snake.heading(), Direction::Down);

        let head = state.snake.head();
        state.apple = Apple::small(Position::new(0, 0));
        state.tick(now);
        assert_eq!(state.snake.head(), Position::new(head.x, head.y + 1));
    }

    #[test]
    fn eating_apple_grows_snake_and_scores() {
        let (mut state, now) = quiet_state(10, 10, 3);
        let ahead = state.snake.next_head_position(state.bounds());
        state.apple = Apple::big(ahead);

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::AppleEaten { growth: 2 });
        assert_eq!(state.score, 2);
        assert_eq!(state.snake.target_len(), 5);
        assert_eq!(state.snake.len(), 4);

        state.apple = Apple::small(Position::new(0, 0));
        state.tick(now);
        assert_eq!(state.snake.len(), 5);
        state.tick(now);
        assert_eq!(state.snake.len(), 5);
    }

    #[test]
    fn running_into_obstacle_ends_episode() {
        let (mut state, now) = quiet_state(10, 10, 4);
        let ahead = state.snake.next_head_position(state.bounds());
        state.obstacles.insert(ahead);

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::ObstacleCollision));
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.death_reason, Some(DeathReason::ObstacleCollision));
    }

    #[test]
    fn running_into_own_body_ends_episode() {
        let (mut state, now) = quiet_state(6, 6, 5);
        state.snake = Snake::from_segments(
            vec![
                Position::new(2, 2),
                Position::new(3, 2),
                Position::new(3, 3),
                Position::new(2, 3),
                Position::new(1, 3),
                Position::new(1, 2),
            ],
            Direction::Up,
        );
        state.apple = Apple::small(Position::new(5, 5));
        state.apply_input(GameInput::Direction(Direction::Left));

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::SelfCollision));
    }

    #[test]
    fn moving_into_current_tail_cell_is_a_collision() {
        let (mut state, now) = quiet_state(6, 6, 6);
        state.snake = Snake::from_segments(
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(2, 2),
                Position::new(1, 2),
            ],
            Direction::Down,
        );
        state.apple = Apple::small(Position::new(5, 5));

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::SelfCollision));
    }

    #[test]
    fn shield_absorbs_collision_and_holds_position() {
        let (mut state, now) = quiet_state(10, 10, 7);
        let ahead = state.snake.next_head_position(state.bounds());
        state.obstacles.insert(ahead);
        state
            .effects
            .apply(PowerupKind::Shield, now, Duration::from_secs(5));
        let before: Vec<_> = state.snake.segments().copied().collect();

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::ShieldBroken);
        assert_eq!(state.status, GameStatus::Running);
        assert!(!state.effects.shield_active());
        let after: Vec<_> = state.snake.segments().copied().collect();
        assert_eq!(before, after);

        let outcome = state.tick(now);
        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::ObstacleCollision));
    }

    #[test]
    fn expired_shield_does_not_save_snake() {
        let (mut state, now) = quiet_state(10, 10, 8);
        let ahead = state.snake.next_head_position(state.bounds());
        state.obstacles.insert(ahead);
        state
            .effects
            .apply(PowerupKind::Shield, now, Duration::from_secs(5));

        let outcome = state.tick(now + Duration::from_secs(6));

        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::ObstacleCollision));
    }

    #[test]
    fn speed_powerup_changes_tick_interval() {
        let (mut state, now) = quiet_state(10, 10, 9);
        let ahead = state.snake.next_head_position(state.bounds());
        place_powerup(&mut state, ahead, PowerupKind::SpeedBoost, now);
        state.apple = Apple::small(Position::new(0, 0));

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::PowerupCollected(PowerupKind::SpeedBoost));
        assert!(state.powerups.is_empty());
        assert_eq!(state.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn bonus_growth_adds_three_length_and_score() {
        let (mut state, now) = quiet_state(20, 20, 10);
        let ahead = state.snake.next_head_position(state.bounds());
        place_powerup(&mut state, ahead, PowerupKind::BonusGrowth, now);
        state.apple = Apple::small(Position::new(0, 0));

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::PowerupCollected(PowerupKind::BonusGrowth));
        assert_eq!(state.score, 3);
        assert_eq!(state.snake.target_len(), 6);
        for _ in 0..3 {
            state.tick(now);
        }
        assert_eq!(state.snake.len(), 6);
    }

    #[test]
    fn shield_powerup_activates_shield() {
        let (mut state, now) = quiet_state(10, 10, 11);
        let ahead = state.snake.next_head_position(state.bounds());
        place_powerup(&mut state, ahead, PowerupKind::Shield, now);
        state.apple = Apple::small(Position::new(0, 0));

        state.tick(now);

        assert!(state.effects.shield_active());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn powerups_spawn_on_free_cells_when_chance_is_certain() {
        let now = Instant::now();
        let config = GameConfig {
            powerup_chance: 1.0,
            ..quiet_config(12, 12)
        };
        let mut state = GameState::new_with_seed(config, 12, now).expect("room");
        state.snake = Snake::from_segments(vec![Position::new(0, 0)], Direction::Right);
        state.apple = Apple::small(Position::new(11, 11));

        let outcome = state.tick(now);

        // The new power-up may land right ahead and be collected at once.
        let collected = matches!(outcome, TickOutcome::PowerupCollected(_));
        assert_eq!(state.powerups.len() + usize::from(collected), 1);
        for (position, powerup) in &state.powerups {
            assert_ne!(*position, state.apple.position);
            assert!(!state.snake.occupies(*position));
            assert_eq!(powerup.created_at, now);
        }
    }

    #[test]
    fn paused_state_does_not_advance() {
        let (mut state, now) = quiet_state(10, 10, 13);
        let head = state.snake.head();

        state.apply_input(GameInput::Pause);
        assert_eq!(state.tick(now), TickOutcome::Idle);
        assert_eq!(state.snake.head(), head);
        assert_eq!(state.tick_count, 0);

        state.apply_input(GameInput::Pause);
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn turns_are_buffered_while_paused() {
        let (mut state, _) = quiet_state(10, 10, 14);

        state.apply_input(GameInput::Pause);
        state.apply_input(GameInput::Direction(Direction::Up));

        assert_eq!(state.snake.heading(), Direction::Up);
    }

    #[test]
    fn game_over_ignores_pause_and_turns() {
        let (mut state, now) = quiet_state(10, 10, 15);
        let ahead = state.snake.next_head_position(state.bounds());
        state.obstacles.insert(ahead);
        state.tick(now);

        state.apply_input(GameInput::Pause);
        state.apply_input(GameInput::Direction(Direction::Up));

        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.snake.heading(), Direction::Right);
        assert_eq!(state.tick(now), TickOutcome::Idle);
    }

    #[test]
    fn restart_resets_episode() {
        let (mut state, now) = quiet_state(10, 10, 16);
        state.score = 12;
        let ahead = state.snake.next_head_position(state.bounds());
        state.obstacles.insert(ahead);
        state.tick(now);
        assert_eq!(state.status, GameStatus::GameOver);

        let later = now + Duration::from_secs(30);
        state.restart(later).expect("room");

        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.snake.len(), 3);
        assert!(state.obstacles.is_empty());
        assert!(state.powerups.is_empty());
        assert_eq!(state.death_reason, None);
        assert_eq!(state.elapsed(later), Duration::ZERO);
    }

    #[test]
    fn elapsed_freezes_at_game_over() {
        let (mut state, now) = quiet_state(10, 10, 17);
        let ahead = state.snake.next_head_position(state.bounds());
        state.obstacles.insert(ahead);

        state.tick(now + Duration::from_secs(4));

        assert_eq!(
            state.elapsed(now + Duration::from_secs(60)),
            Duration::from_secs(4)
        );
    }

    #[test]
    fn filling_the_board_ends_episode() {
        // Snake covers three of four cells, so the apple takes the last one.
        let (mut state, now) = quiet_state(4, 1, 18);
        assert_eq!(state.apple.position, Position::new(3, 0));

        let outcome = state.tick(now);

        assert_eq!(outcome, TickOutcome::GameOver(DeathReason::BoardFilled));
        assert_eq!(state.score, state.apple.growth());
        assert_eq!(state.snake.len(), 4);
    }

    #[test]
    fn step_leaves_input_state_untouched() {
        let (mut state, now) = quiet_state(10, 10, 19);
        state.apple = Apple::small(Position::new(0, 0));
        let head = state.snake.head();

        let (next, outcome) = step(&state, Some(GameInput::Direction(Direction::Down)), now);

        assert_eq!(outcome, TickOutcome::Moved);
        assert_eq!(state.snake.head(), head);
        assert_eq!(state.snake.heading(), Direction::Right);
        assert_eq!(next.snake.head(), Position::new(head.x, head.y + 1));
    }

    #[test]
    fn length_never_exceeds_target_during_long_run() {
        let now = Instant::now();
        let config = GameConfig {
            bounds: GridSize {
                width: 16,
                height: 12,
            },
            obstacle_count: 6,
            powerup_chance: 0.2,
            ..GameConfig::default()
        };
        let mut state = GameState::new_with_seed(config, 20, now).expect("room");
        let turns = [Direction::Down, Direction::Left, Direction::Up, Direction::Right];

        for tick in 0..300u64 {
            if tick % 7 == 0 {
                state.apply_input(GameInput::Direction(turns[(tick / 7) as usize % 4]));
            }
            // Keep the run going past obstacles and self-collisions.
            state
                .effects
                .apply(PowerupKind::Shield, now, Duration::from_secs(3600));

            state.tick(now);

            assert!(state.snake.head().is_within_bounds(state.bounds()));
            assert!(state.snake.len() <= state.snake.target_len());
        }
    }

    #[test]
    fn pending_growth_is_paid_one_segment_per_tick() {
        let (mut state, now) = quiet_state(20, 20, 21);
        let head = state.snake.head();
        state.apple = Apple::big(Position::new(head.x + 1, head.y));
        place_powerup(
            &mut state,
            Position::new(head.x + 2, head.y),
            PowerupKind::BonusGrowth,
            now,
        );

        assert_eq!(state.tick(now), TickOutcome::AppleEaten { growth: 2 });
        assert_eq!((state.snake.len(), state.snake.target_len()), (4, 5));
        state.apple = Apple::small(Position::new(head.x, head.y + 5));

        assert_eq!(
            state.tick(now),
            TickOutcome::PowerupCollected(PowerupKind::BonusGrowth)
        );
        assert_eq!((state.snake.len(), state.snake.target_len()), (5, 8));

        for expected in [6, 7, 8, 8, 8] {
            assert_eq!(state.tick(now), TickOutcome::Moved);
            assert_eq!(state.snake.len(), expected);
        }
        assert_eq!(state.snake.target_len(), 8);
    }
}
