use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::warn;

use crate::config::{ConfigError, GameConfig};
use crate::snake::{Direction, Position, Snake};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    SelfCollision,
}

/// What a single tick did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No heading yet, nothing moved
    Idle,
    Moved,
    /// Food at `food` was eaten; the snake grew by one segment
    Ate { food: Position },
    Crashed(Collision),
    /// The game is already over
    Halted,
}

/// The grid, the snake on it and the food it is chasing.
pub struct Board {
    tile_count: i32,
    snake: Snake,
    food: Position,
    score: u32,
    state: GameState,
    food_reward: u32,
    food_retry_limit: usize,
    rng: StdRng,
}

impl Board {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, rng: StdRng) -> Self {
        Board {
            tile_count: config.tile_count(),
            snake: Snake::new(config.initial_snake.clone()),
            food: config.initial_food,
            score: 0,
            state: GameState::Running,
            food_reward: config.food_reward,
            food_retry_limit: config.food_retry_limit,
            rng,
        }
    }

    pub fn tile_count(&self) -> i32 {
        self.tile_count
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::Over
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.tile_count && pos.y >= 0 && pos.y < self.tile_count
    }

    /// Puts the board back to a fresh game. An empty snake is rejected and
    /// leaves the board untouched.
    pub fn reset(
        &mut self,
        initial_snake: &[Position],
        initial_food: Position,
    ) -> Result<(), ConfigError> {
        if initial_snake.is_empty() {
            return Err(ConfigError::EmptySnake);
        }
        self.snake = Snake::new(initial_snake.to_vec());
        self.food = initial_food;
        self.score = 0;
        self.state = GameState::Running;
        Ok(())
    }

    /// Advances the snake one cell in `direction`.
    pub fn advance_tick(&mut self, direction: Direction) -> TickOutcome {
        if self.is_over() {
            return TickOutcome::Halted;
        }
        if direction == Direction::Idle {
            return TickOutcome::Idle;
        }

        let new_head = self.snake.head().moved(direction);
        self.snake.push_head(new_head);

        let mut outcome = TickOutcome::Moved;
        if new_head == self.food {
            self.score += self.food_reward;
            outcome = TickOutcome::Ate { food: new_head };
            self.food = self.place_food();
        } else {
            self.snake.pop_tail();
        }

        let collision = if !self.in_bounds(new_head) {
            Some(Collision::Wall)
        } else if self.snake.hits_body(new_head) {
            Some(Collision::SelfCollision)
        } else {
            None
        };

        if let Some(collision) = collision {
            self.state = GameState::Over;
            return TickOutcome::Crashed(collision);
        }

        outcome
    }

    /// Picks a cell off the snake. Random draws first, then a scan; a full
    /// board keeps the current food where it is.
    fn place_food(&mut self) -> Position {
        for _ in 0..self.food_retry_limit {
            let candidate = Position::new(
                self.rng.gen_range(0..self.tile_count),
                self.rng.gen_range(0..self.tile_count),
            );
            if !self.snake.contains(candidate) {
                return candidate;
            }
        }

        let free = (0..self.tile_count)
            .flat_map(|y| (0..self.tile_count).map(move |x| Position::new(x, y)))
            .find(|pos| !self.snake.contains(*pos));

        match free {
            Some(pos) => pos,
            None => {
                warn!(
                    snake_len = self.snake.len(),
                    "no free cell left for food, keeping it in place"
                );
                self.food
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_food(&mut self, food: Position) {
        self.food = food;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn board_with(snake: Vec<Position>, food: Position, tiles: i32) -> Board {
        let config = GameConfig {
            canvas_size: 40.0 * tiles as f64,
            initial_snake: snake,
            initial_food: food,
            ..Default::default()
        };
        Board::with_seed(&config, 7)
    }

    fn line(head: (i32, i32), len: i32) -> Vec<Position> {
        (0..len).map(|i| Position::new(head.0 - i, head.1)).collect()
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut board = board_with(line((5, 5), 3), Position::new(6, 5), 20);
        let before = board.snake().clone();

        assert_eq!(board.advance_tick(Idle), TickOutcome::Idle);
        assert_eq!(board.snake(), &before);
        assert_eq!(board.food(), Position::new(6, 5));
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn test_move_translates_body() {
        let mut board = board_with(line((5, 5), 3), Position::new(0, 0), 20);

        assert_eq!(board.advance_tick(Right), TickOutcome::Moved);
        assert_eq!(
            board.snake().body(),
            &[Position::new(6, 5), Position::new(5, 5), Position::new(4, 5)]
        );
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut board = board_with(line((5, 5), 3), Position::new(6, 5), 20);

        let outcome = board.advance_tick(Right);

        assert_eq!(outcome, TickOutcome::Ate { food: Position::new(6, 5) });
        assert_eq!(board.score(), 10);
        assert_eq!(board.snake().len(), 4);
        assert!(!board.snake().contains(board.food()));
        assert!(board.in_bounds(board.food()));
    }

    #[test]
    fn test_food_never_lands_on_snake() {
        // Snake fills all but two cells of a 3x3 board
        let snake = vec![
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(0, 0),
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(2, 1),
            Position::new(2, 2),
        ];
        let mut board = board_with(snake, Position::new(1, 2), 3);

        assert_eq!(
            board.advance_tick(Down),
            TickOutcome::Ate { food: Position::new(1, 2) }
        );
        assert_eq!(board.food(), Position::new(0, 2));
    }

    #[test]
    fn test_full_board_keeps_food() {
        let snake = vec![Position::new(0, 0), Position::new(0, 1)];
        let mut board = board_with(snake, Position::new(1, 0), 2);
        // Three of four cells taken, then the last one is eaten
        assert_eq!(
            board.advance_tick(Right),
            TickOutcome::Ate { food: Position::new(1, 0) }
        );
        let food = board.food();
        assert_eq!(food, Position::new(1, 1));

        assert_eq!(board.advance_tick(Down), TickOutcome::Ate { food });
        assert_eq!(board.food(), food);
        assert_eq!(board.snake().len(), 4);
    }

    #[test]
    fn test_wall_collision_both_edges() {
        let mut board = board_with(vec![Position::new(19, 4)], Position::new(0, 0), 20);
        assert_eq!(board.advance_tick(Right), TickOutcome::Crashed(Collision::Wall));
        assert!(board.is_over());

        let mut board = board_with(vec![Position::new(0, 4)], Position::new(5, 5), 20);
        assert_eq!(board.advance_tick(Left), TickOutcome::Crashed(Collision::Wall));
        assert_eq!(board.state(), GameState::Over);
    }

    #[test]
    fn test_reverse_into_neck_collides() {
        let mut board = board_with(line((5, 5), 3), Position::new(0, 0), 20);

        assert_eq!(
            board.advance_tick(Left),
            TickOutcome::Crashed(Collision::SelfCollision)
        );
        assert_eq!(board.snake().head(), Position::new(4, 5));
        assert!(board.is_over());
    }

    #[test]
    fn test_loop_into_body_collides() {
        let mut board = board_with(line((5, 5), 5), Position::new(0, 0), 20);

        assert_eq!(board.advance_tick(Down), TickOutcome::Moved);
        assert_eq!(board.advance_tick(Left), TickOutcome::Moved);
        assert_eq!(
            board.advance_tick(Up),
            TickOutcome::Crashed(Collision::SelfCollision)
        );
        assert_eq!(board.snake().head(), Position::new(4, 5));
    }

    #[test]
    fn test_chasing_tail_is_allowed() {
        // 2x2 square: the head may step onto the cell the tail is leaving
        let snake = vec![
            Position::new(1, 0),
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(0, 0),
        ];
        let mut board = board_with(snake, Position::new(5, 5), 20);

        assert_eq!(board.advance_tick(Left), TickOutcome::Moved);
        assert!(!board.is_over());
    }

    #[test]
    fn test_over_board_ignores_ticks() {
        let mut board = board_with(vec![Position::new(0, 0)], Position::new(5, 5), 20);
        board.advance_tick(Up);
        let body = board.snake().clone();

        assert_eq!(board.advance_tick(Down), TickOutcome::Halted);
        assert_eq!(board.snake(), &body);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let start = line((5, 5), 2);
        let mut board = board_with(start.clone(), Position::new(6, 5), 20);
        board.advance_tick(Right);
        board.advance_tick(Up);
        board.set_food(Position::new(1, 1));

        board.reset(&start, Position::new(6, 5)).unwrap();
        let snapshot = (board.snake().clone(), board.food(), board.score(), board.state());
        board.reset(&start, Position::new(6, 5)).unwrap();

        assert_eq!(board.snake().body(), start.as_slice());
        assert_eq!(board.food(), Position::new(6, 5));
        assert_eq!(board.score(), 0);
        assert_eq!(board.state(), GameState::Running);
        assert_eq!(
            snapshot,
            (board.snake().clone(), board.food(), board.score(), board.state())
        );
    }

    #[test]
    fn test_reset_rejects_empty_snake() {
        let mut board = board_with(line((5, 5), 2), Position::new(8, 5), 20);
        board.advance_tick(Right);
        let body = board.snake().clone();

        assert_eq!(board.reset(&[], Position::new(1, 1)), Err(ConfigError::EmptySnake));
        assert_eq!(board.snake(), &body);
        assert_eq!(board.food(), Position::new(8, 5));
        assert_eq!(board.state(), GameState::Running);
    }
}
