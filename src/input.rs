use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction;

/// What a key press asks the game to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    Restart,
    Pause,
    Quit,
    None,
}

pub fn map_key(key: KeyEvent) -> Command {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Command::Quit;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Command::Turn(Direction::Right)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => Command::Pause,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Command::Quit,
        _ => Command::None,
    }
}

/// Holds the heading the next tick will use. Only the latest accepted turn
/// before a tick counts.
#[derive(Debug, Clone)]
pub struct InputMapper {
    direction: Direction,
}

impl InputMapper {
    pub fn new(direction: Direction) -> Self {
        InputMapper { direction }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Takes the turn unless it would reverse straight into the neck.
    /// Returns whether the heading changed.
    pub fn steer(&mut self, requested: Direction) -> bool {
        if requested == Direction::Idle || self.direction.is_opposite(requested) {
            return false;
        }
        self.direction = requested;
        true
    }

    pub fn reset(&mut self, direction: Direction) {
        self.direction = direction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(map_key(key(KeyCode::Up)), Command::Turn(Up));
        assert_eq!(map_key(key(KeyCode::Down)), Command::Turn(Down));
        assert_eq!(map_key(key(KeyCode::Left)), Command::Turn(Left));
        assert_eq!(map_key(key(KeyCode::Right)), Command::Turn(Right));
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(map_key(key(KeyCode::Char('w'))), Command::Turn(Up));
        assert_eq!(map_key(key(KeyCode::Char('a'))), Command::Turn(Left));
        assert_eq!(map_key(key(KeyCode::Char('s'))), Command::Turn(Down));
        let upper_d = KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT);
        assert_eq!(map_key(upper_d), Command::Turn(Right));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(map_key(key(KeyCode::Char('r'))), Command::Restart);
        assert_eq!(map_key(key(KeyCode::Char(' '))), Command::Pause);
        assert_eq!(map_key(key(KeyCode::Esc)), Command::Quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Command::Quit);
    }

    #[test]
    fn test_unmapped_key() {
        assert_eq!(map_key(key(KeyCode::Char('x'))), Command::None);
        assert_eq!(map_key(key(KeyCode::Tab)), Command::None);
    }

    #[test]
    fn test_reversal_rejected() {
        let mut mapper = InputMapper::new(Right);

        assert!(!mapper.steer(Left));
        assert_eq!(mapper.direction(), Right);

        assert!(mapper.steer(Up));
        assert_eq!(mapper.direction(), Up);

        let mut mapper = InputMapper::new(Right);
        assert!(mapper.steer(Down));
        assert_eq!(mapper.direction(), Down);
    }

    #[test]
    fn test_idle_accepts_any_turn() {
        for dir in [Up, Down, Left, Right] {
            let mut mapper = InputMapper::new(Idle);
            assert!(mapper.steer(dir));
            assert_eq!(mapper.direction(), dir);
        }
    }

    #[test]
    fn test_latest_turn_wins() {
        let mut mapper = InputMapper::new(Right);
        mapper.steer(Up);
        mapper.steer(Right);
        assert_eq!(mapper.direction(), Right);
    }
}
