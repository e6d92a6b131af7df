use serde::{Deserialize, Serialize};

use Direction::*;

/// A cell on the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn moved(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// Heading of the snake. `Idle` is the (0, 0) heading a fresh game starts
/// with; no movement happens until a real direction is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Idle,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Idle => (0, 0),
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Up, Down) | (Down, Up) | (Left, Right) | (Right, Left)
        )
    }
}

/// Snake body, head first.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: Vec<Position>,
}

impl Snake {
    /// Panics on an empty body; callers validate the initial layout first.
    pub fn new(body: Vec<Position>) -> Self {
        assert!(!body.is_empty(), "a snake needs at least one segment");
        Snake { body }
    }

    pub fn body(&self) -> &[Position] {
        &self.body
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// True if `pos` overlaps any segment other than the head.
    pub fn hits_body(&self, pos: Position) -> bool {
        self.body[1..].contains(&pos)
    }

    pub fn push_head(&mut self, head: Position) {
        self.body.insert(0, head);
    }

    pub fn pop_tail(&mut self) -> Option<Position> {
        if self.body.len() > 1 {
            self.body.pop()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_delta() {
        assert_eq!(Idle.delta(), (0, 0));
        assert_eq!(Up.delta(), (0, -1));
        assert_eq!(Down.delta(), (0, 1));
        assert_eq!(Left.delta(), (-1, 0));
        assert_eq!(Right.delta(), (1, 0));
    }

    #[test]
    fn test_opposites() {
        assert!(Up.is_opposite(Down));
        assert!(Left.is_opposite(Right));
        assert!(!Up.is_opposite(Left));
        assert!(!Idle.is_opposite(Left));
        assert!(!Right.is_opposite(Idle));
    }

    #[test]
    fn test_position_moved() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved(Right), Position::new(6, 5));
        assert_eq!(pos.moved(Up), Position::new(5, 4));
        assert_eq!(pos.moved(Idle), pos);
    }

    #[test]
    fn test_body_hits_exclude_head() {
        let snake = Snake::new(vec![
            Position::new(5, 5),
            Position::new(4, 5),
            Position::new(3, 5),
        ]);
        assert!(!snake.hits_body(Position::new(5, 5)));
        assert!(snake.hits_body(Position::new(3, 5)));
        assert!(snake.contains(Position::new(5, 5)));
    }

    #[test]
    fn test_push_and_pop() {
        let mut snake = Snake::new(vec![Position::new(1, 1)]);
        snake.push_head(Position::new(2, 1));
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.head(), Position::new(2, 1));
        assert_eq!(snake.pop_tail(), Some(Position::new(1, 1)));
        assert_eq!(snake.pop_tail(), None);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&Left).unwrap();
        assert_eq!(json, "\"left\"");
        let back: Direction = serde_json::from_str("\"idle\"").unwrap();
        assert_eq!(back, Idle);
    }
}
