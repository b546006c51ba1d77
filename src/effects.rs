use std::time::{Duration, Instant};

use log::debug;

use crate::config::{BASE_FPS, POINTS_PER_SPEED_STEP};
use crate::powerup::PowerupKind;

const NORMAL_SPEED: f32 = 1.0;
const BOOSTED_SPEED: f32 = 2.0;
const SLOWED_SPEED: f32 = 0.5;

/// Timed power-up effects: one speed modifier and one shield.
///
/// Re-collecting a kind moves its expiry forward instead of stacking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTracker {
    shield_active: bool,
    shield_expiry: Option<Instant>,
    speed_multiplier: f32,
    speed_expiry: Option<Instant>,
}

impl Default for EffectTracker {
    fn default() -> Self {
        Self {
            shield_active: false,
            shield_expiry: None,
            speed_multiplier: NORMAL_SPEED,
            speed_expiry: None,
        }
    }
}

impl EffectTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops effects whose expiry lies strictly before `now`.
    pub fn expire(&mut self, now: Instant) {
        if self.speed_multiplier != NORMAL_SPEED && is_past(self.speed_expiry, now) {
            debug!("speed effect x{} expired", self.speed_multiplier);
            self.speed_multiplier = NORMAL_SPEED;
            self.speed_expiry = None;
        }

        if self.shield_active && is_past(self.shield_expiry, now) {
            debug!("shield expired");
            self.shield_active = false;
            self.shield_expiry = None;
        }
    }

    /// Starts the timed effect for `kind`. Bonus growth has none.
    pub fn apply(&mut self, kind: PowerupKind, now: Instant, duration: Duration) {
        let expiry = Some(now + duration);

        match kind {
            PowerupKind::SpeedBoost => {
                self.speed_multiplier = BOOSTED_SPEED;
                self.speed_expiry = expiry;
            }
            PowerupKind::Slow => {
                self.speed_multiplier = SLOWED_SPEED;
                self.speed_expiry = expiry;
            }
            PowerupKind::Shield => {
                self.shield_active = true;
                self.shield_expiry = expiry;
            }
            PowerupKind::BonusGrowth => {}
        }
    }

    /// Consumes the shield after it absorbed a collision.
    pub fn break_shield(&mut self) {
        self.shield_active = false;
        self.shield_expiry = None;
    }

    #[must_use]
    pub fn shield_active(&self) -> bool {
        self.shield_active
    }

    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Time left on the shield, if one is up.
    #[must_use]
    pub fn shield_remaining(&self, now: Instant) -> Option<Duration> {
        self.shield_active.then(|| remaining(self.shield_expiry, now))
    }

    /// Time left on the speed modifier, if one is active.
    #[must_use]
    pub fn speed_remaining(&self, now: Instant) -> Option<Duration> {
        (self.speed_multiplier != NORMAL_SPEED).then(|| remaining(self.speed_expiry, now))
    }

    /// Simulation ticks per second for `score`, never below one.
    #[must_use]
    pub fn tick_rate(&self, score: u32) -> u32 {
        let scaled = (base_rate(score) as f32 * self.speed_multiplier).floor() as u32;
        scaled.max(1)
    }

    /// Wall-clock time between simulation ticks for `score`.
    #[must_use]
    pub fn tick_interval(&self, score: u32) -> Duration {
        Duration::from_secs(1) / self.tick_rate(score)
    }
}

/// Unmodified tick rate: one extra tick per second every ten points.
#[must_use]
pub fn base_rate(score: u32) -> u32 {
    BASE_FPS + score / POINTS_PER_SPEED_STEP
}

fn is_past(expiry: Option<Instant>, now: Instant) -> bool {
    expiry.is_none_or(|expiry| now > expiry)
}

fn remaining(expiry: Option<Instant>, now: Instant) -> Duration {
    expiry.map_or(Duration::ZERO, |expiry| expiry.saturating_duration_since(now))
}
