use std::collections::HashSet;
use std::time::Instant;

use rand::Rng;

use crate::config::GridSize;
use crate::snake::Position;
use crate::spawn::{SpawnError, sample_free_cell};

/// Power-up categories that can appear on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum PowerupKind {
    SpeedBoost,
    Slow,
    Shield,
    BonusGrowth,
}

impl PowerupKind {
    /// All kinds, in spawn-table order.
    pub const ALL: [Self; 4] = [Self::SpeedBoost, Self::Slow, Self::Shield, Self::BonusGrowth];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::SpeedBoost => "Speed",
            Self::Slow => "Slow",
            Self::Shield => "Shield",
            Self::BonusGrowth => "Bonus",
        }
    }
}

/// A power-up waiting on the board. Stays until picked up.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Powerup {
    pub kind: PowerupKind,
    pub created_at: Instant,
}

/// Picks a free cell and a uniformly random kind.
pub fn spawn_powerup<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    excluded: &HashSet<Position>,
) -> Result<(Position, PowerupKind), SpawnError> {
    let position = sample_free_cell(rng, bounds, excluded)?;
    let kind = PowerupKind::ALL[rng.gen_range(0..PowerupKind::ALL.len())];

    Ok((position, kind))
}
