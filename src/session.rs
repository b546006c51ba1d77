use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::{ACHIEVEMENT_EAT_10, EAT_10_THRESHOLD, GridSize};
use crate::food::Apple;
use crate::game::{DeathReason, GameState, GameStatus, TickOutcome};
use crate::input::GameInput;
use crate::powerup::Powerup;
use crate::score::{Achievements, ScoreStore, StoreError, top_scores};
use crate::snake::{Position, Snake};
use crate::spawn::SpawnError;

/// Progress towards one achievement, for display.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MissionProgress {
    pub label: &'static str,
    pub progress: u32,
    pub goal: u32,
    pub earned: bool,
}

/// Read-only view of everything the frontend draws.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub bounds: GridSize,
    pub snake: &'a Snake,
    pub obstacles: &'a HashSet<Position>,
    pub apple: Apple,
    pub powerups: &'a HashMap<Position, Powerup>,
    pub score: u32,
    pub elapsed: Duration,
    pub status: GameStatus,
    pub death_reason: Option<DeathReason>,
    pub shield_remaining: Option<Duration>,
    pub speed_effect: Option<(f32, Duration)>,
    pub high_scores: &'a [u32],
    pub missions: Vec<MissionProgress>,
}

/// One player's run of episodes plus the data that outlives them.
///
/// Owns the persistence gateway. The final score of an episode is written
/// exactly once, on the first tick that ends it.
#[derive(Debug)]
pub struct GameSession<S> {
    state: GameState,
    store: S,
    high_scores: Vec<u32>,
    achievements: Achievements,
    score_recorded: bool,
}

impl<S: ScoreStore> GameSession<S> {
    /// Loads persisted scores from `store` and wraps `state`.
    ///
    /// Corrupt persisted data is reported here rather than papered over.
    pub fn open(mut store: S, state: GameState) -> Result<Self, StoreError> {
        let high_scores = top_scores(&store.load_high_scores()?);
        let achievements = store.load_achievements()?;

        Ok(Self {
            state,
            store,
            high_scores,
            achievements,
            score_recorded: false,
        })
    }

    /// Routes one input: restart is handled here, the rest by the state.
    pub fn handle_input(&mut self, input: GameInput, now: Instant) -> Result<(), SpawnError> {
        match input {
            GameInput::Restart => self.restart(now),
            other => {
                self.state.apply_input(other);
                Ok(())
            }
        }
    }

    /// Starts a fresh episode. Allowed in every state.
    pub fn restart(&mut self, now: Instant) -> Result<(), SpawnError> {
        self.state.restart(now)?;
        self.score_recorded = false;
        Ok(())
    }

    /// Advances the episode and persists whatever the tick earned.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let outcome = self.state.tick(now);

        if matches!(outcome, TickOutcome::AppleEaten { .. }) {
            self.check_achievements();
        }

        if self.state.status == GameStatus::GameOver && !self.score_recorded {
            self.record_final_score();
        }

        outcome
    }

    /// Writes both records again; meant for shutdown.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.store.save_high_scores(&self.high_scores)?;
        self.store.save_achievements(&self.achievements)
    }

    #[must_use]
    pub fn snapshot(&self, now: Instant) -> Snapshot<'_> {
        let state = &self.state;
        let effects = &state.effects;

        Snapshot {
            bounds: state.bounds(),
            snake: &state.snake,
            obstacles: &state.obstacles,
            apple: state.apple,
            powerups: &state.powerups,
            score: state.score,
            elapsed: state.elapsed(now),
            status: state.status,
            death_reason: state.death_reason,
            shield_remaining: effects.shield_remaining(now),
            speed_effect: effects
                .speed_remaining(now)
                .map(|remaining| (effects.speed_multiplier(), remaining)),
            high_scores: &self.high_scores,
            missions: vec![MissionProgress {
                label: "Eat 10 apples",
                progress: state.score.min(EAT_10_THRESHOLD),
                goal: EAT_10_THRESHOLD,
                earned: self.achievements.is_earned(ACHIEVEMENT_EAT_10),
            }],
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for tests and tooling that stage specific boards.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[must_use]
    pub fn high_scores(&self) -> &[u32] {
        &self.high_scores
    }

    #[must_use]
    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn check_achievements(&mut self) {
        if self.state.score < EAT_10_THRESHOLD || !self.achievements.earn(ACHIEVEMENT_EAT_10) {
            return;
        }

        info!("achievement unlocked: {ACHIEVEMENT_EAT_10}");
        if let Err(error) = self.store.save_achievements(&self.achievements) {
            warn!("failed to save achievements: {error}");
        }
    }

    fn record_final_score(&mut self) {
        self.score_recorded = true;

        let mut scores = self.high_scores.clone();
        scores.push(self.state.score);
        self.high_scores = top_scores(&scores);

        if let Err(error) = self.store.save_high_scores(&self.high_scores) {
            warn!("failed to save high scores: {error}");
        }
    }
}
