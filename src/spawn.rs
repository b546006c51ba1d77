use std::collections::HashSet;

use log::debug;
use rand::Rng;

use crate::config::GridSize;
use crate::snake::Position;

/// Rejection-sampling attempts per grid cell before falling back to a scan.
const SAMPLE_ATTEMPTS_PER_CELL: usize = 4;

/// Failures while placing entities on the grid.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum SpawnError {
    #[error("no free cell left on the {width}x{height} grid")]
    NoFreeCell { width: u16, height: u16 },
}

/// Picks a uniformly random in-bounds cell that is not in `excluded`.
///
/// Tries plain rejection sampling first, which is fast while the board is
/// mostly empty. After `4 * cells` misses it enumerates the free cells and
/// picks one of those, so a crowded board still terminates.
pub fn sample_free_cell<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    excluded: &HashSet<Position>,
) -> Result<Position, SpawnError> {
    let width = i32::from(bounds.width);
    let height = i32::from(bounds.height);
    let no_free_cell = SpawnError::NoFreeCell {
        width: bounds.width,
        height: bounds.height,
    };

    if width == 0 || height == 0 {
        return Err(no_free_cell);
    }

    for _ in 0..bounds.total_cells() * SAMPLE_ATTEMPTS_PER_CELL {
        let candidate = Position {
            x: rng.gen_range(0..width),
            y: rng.gen_range(0..height),
        };
        if !excluded.contains(&candidate) {
            return Ok(candidate);
        }
    }

    debug!(
        "rejection sampling exhausted with {} of {} cells excluded, scanning",
        excluded.len(),
        bounds.total_cells()
    );

    let candidates: Vec<Position> = (0..height)
        .flat_map(|y| (0..width).map(move |x| Position { x, y }))
        .filter(|position| !excluded.contains(position))
        .collect();

    if candidates.is_empty() {
        return Err(no_free_cell);
    }

    Ok(candidates[rng.gen_range(0..candidates.len())])
}

/// Places `count` distinct obstacles, none of them on a `reserved` cell.
pub fn spawn_obstacles<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    count: usize,
    reserved: &HashSet<Position>,
) -> Result<HashSet<Position>, SpawnError> {
    let mut used = reserved.clone();
    let mut obstacles = HashSet::with_capacity(count);

    for _ in 0..count {
        let position = sample_free_cell(rng, bounds, &used)?;
        used.insert(position);
        obstacles.insert(position);
    }

    Ok(obstacles)
}
