use std::collections::HashSet;

use rand::Rng;

use crate::config::GridSize;
use crate::snake::Position;
use crate::spawn::{SpawnError, sample_free_cell};

/// Apple size tier, rolled once when the apple spawns.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AppleSize {
    Small,
    Big,
}

/// The single growth item currently on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Apple {
    pub position: Position,
    pub size: AppleSize,
}

impl Apple {
    /// Creates a small apple at `position`.
    #[must_use]
    pub fn small(position: Position) -> Self {
        Self {
            position,
            size: AppleSize::Small,
        }
    }

    /// Creates a big apple at `position`.
    #[must_use]
    pub fn big(position: Position) -> Self {
        Self {
            position,
            size: AppleSize::Big,
        }
    }

    /// Returns the length and score granted when eaten.
    #[must_use]
    pub fn growth(self) -> u32 {
        match self.size {
            AppleSize::Small => 1,
            AppleSize::Big => 2,
        }
    }
}

/// Spawns an apple on a free cell; small with probability `small_chance`.
pub fn spawn_apple<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    excluded: &HashSet<Position>,
    small_chance: f64,
) -> Result<Apple, SpawnError> {
    let position = sample_free_cell(rng, bounds, excluded)?;

    if rng.gen_bool(small_chance) {
        Ok(Apple::small(position))
    } else {
        Ok(Apple::big(position))
    }
}
