use std::collections::VecDeque;

use crate::config::{GridSize, INITIAL_SNAKE_LENGTH};
use crate::input::{Direction, turn_is_allowed};

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            x: self.x.rem_euclid(i32::from(bounds.width)),
            y: self.y.rem_euclid(i32::from(bounds.height)),
        }
    }

    /// Returns the neighbouring cell in `direction` on the torus grid.
    #[must_use]
    pub fn step(self, direction: Direction, bounds: GridSize) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
        .wrapped(bounds)
    }
}

/// Snake body, heading and growth target.
///
/// The body may temporarily hold more cells than `target_len` between
/// [`Snake::push_head`] and [`Snake::trim_tail`]; once a tick completes the
/// two agree.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    heading: Direction,
    target_len: usize,
}

impl Snake {
    /// Creates the starting snake: horizontal, head at the grid centre,
    /// tail extending to the left (wrapping on very narrow grids), moving
    /// right.
    #[must_use]
    pub fn centered(bounds: GridSize) -> Self {
        let head = Position {
            x: i32::from(bounds.width / 2),
            y: i32::from(bounds.height / 2),
        };
        let segments = (0..INITIAL_SNAKE_LENGTH as i32)
            .map(|offset| {
                Position {
                    x: head.x - offset,
                    y: head.y,
                }
                .wrapped(bounds)
            })
            .collect();

        Self::from_segments(segments, Direction::Right)
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// The growth target starts at the segment count.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>, heading: Direction) -> Self {
        assert!(!segments.is_empty(), "snake needs at least one segment");

        Self {
            target_len: segments.len(),
            body: VecDeque::from(segments),
            heading,
        }
    }

    /// Turns towards `direction` if it is perpendicular to the heading.
    ///
    /// Returns whether the heading changed. The heading is a single field, so
    /// the last accepted turn before a tick wins.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if !turn_is_allowed(self.heading, direction) {
            return false;
        }

        self.heading = direction;
        true
    }

    /// Returns the cell the head would enter on the next tick.
    #[must_use]
    pub fn next_head_position(&self, bounds: GridSize) -> Position {
        self.head().step(self.heading, bounds)
    }

    /// Inserts a new head cell without trimming the tail.
    pub fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Raises the growth target by `amount` cells.
    pub fn grow(&mut self, amount: u32) {
        self.target_len += amount as usize;
    }

    /// Removes tail cells until the body matches the growth target.
    pub fn trim_tail(&mut self) {
        while self.body.len() > self.target_len {
            let _ = self.body.pop_back();
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    #[must_use]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GridSize;
    use crate::input::Direction;

    use super::{Position, Snake};

    const BOUNDS: GridSize = GridSize {
        width: 30,
        height: 20,
    };

    #[test]
    fn position_wrapping_keeps_coordinates_inside_bounds() {
        let bounds = GridSize {
            width: 10,
            height: 8,
        };

        assert_eq!(Position::new(-1, 3).wrapped(bounds), Position::new(9, 3));
        assert_eq!(Position::new(4, 8).wrapped(bounds), Position::new(4, 0));
        assert_eq!(Position::new(-11, -9).wrapped(bounds), Position::new(9, 7));
    }

    #[test]
    fn step_wraps_around_every_edge() {
        let bounds = GridSize {
            width: 5,
            height: 4,
        };

        assert_eq!(
            Position::new(4, 2).step(Direction::Right, bounds),
            Position::new(0, 2)
        );
        assert_eq!(
            Position::new(0, 2).step(Direction::Left, bounds),
            Position::new(4, 2)
        );
        assert_eq!(
            Position::new(1, 0).step(Direction::Up, bounds),
            Position::new(1, 3)
        );
        assert_eq!(
            Position::new(1, 3).step(Direction::Down, bounds),
            Position::new(1, 0)
        );
    }

    #[test]
    fn centered_snake_has_three_segments_facing_right() {
        let snake = Snake::centered(BOUNDS);
        let segments: Vec<_> = snake.segments().copied().collect();

        assert_eq!(
            segments,
            vec![
                Position::new(15, 10),
                Position::new(14, 10),
                Position::new(13, 10),
            ]
        );
        assert_eq!(snake.heading(), Direction::Right);
        assert_eq!(snake.target_len(), 3);
    }

    #[test]
    fn steer_rejects_reversal_and_accepts_turn() {
        let mut snake = Snake::centered(BOUNDS);

        assert!(!snake.steer(Direction::Left));
        assert_eq!(snake.heading(), Direction::Right);

        assert!(snake.steer(Direction::Down));
        assert_eq!(snake.heading(), Direction::Down);
    }

    #[test]
    fn steer_checks_against_latest_accepted_heading() {
        let mut snake = Snake::centered(BOUNDS);

        assert!(snake.steer(Direction::Up));
        // Heading is now vertical, so a horizontal turn is legal again.
        assert!(snake.steer(Direction::Left));
        assert_eq!(snake.heading(), Direction::Left);
    }

    #[test]
    fn growth_is_realised_by_skipping_tail_trim() {
        let mut snake = Snake::from_segments(vec![Position::new(5, 5)], Direction::Right);

        snake.grow(2);
        for _ in 0..3 {
            let next = snake.next_head_position(BOUNDS);
            snake.push_head(next);
            snake.trim_tail();
        }

        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(8, 5));
    }

    #[test]
    fn trim_tail_drops_oldest_cells() {
        let mut snake = Snake::centered(BOUNDS);

        snake.push_head(Position::new(16, 10));
        assert_eq!(snake.len(), 4);
        snake.trim_tail();

        assert_eq!(snake.len(), 3);
        assert!(!snake.occupies(Position::new(13, 10)));
        assert!(snake.occupies(Position::new(16, 10)));
    }
}
