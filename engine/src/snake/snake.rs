use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

use super::types::{Direction, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnakeId(pub u32);

impl fmt::Display for SnakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snake#{}", self.0)
    }
}

#[derive(Clone, Debug)]
pub struct Snake {
    pub id: SnakeId,
    /// Head first, tail last.
    pub body: VecDeque<Point>,
    /// `body` as it was before the last finalized step. Always the same length as `body`.
    pub prev_body: VecDeque<Point>,
    pub direction: Direction,
    pub next_direction: Direction,
    pub speed_factor: f64,
    pub speed_effect_end: Option<Instant>,
    /// Fraction of the current grid step already travelled, in [0, 1) between frames.
    pub move_progress: f64,
    pub is_player: bool,
    /// Remaining planned route for AI snakes, next cell first.
    pub current_path: VecDeque<Point>,
}

impl Snake {
    /// Builds a straight snake with its head at `head`, trailing away from `direction`.
    pub fn new(id: SnakeId, head: Point, direction: Direction, length: usize, is_player: bool) -> Self {
        let body: VecDeque<Point> = Self::initial_body(head, direction, length).collect();

        Self {
            id,
            prev_body: body.clone(),
            body,
            direction,
            next_direction: direction,
            speed_factor: 1.0,
            speed_effect_end: None,
            move_progress: 0.0,
            is_player,
            current_path: VecDeque::new(),
        }
    }

    /// Cells a freshly created snake would occupy.
    pub fn initial_body(head: Point, direction: Direction, length: usize) -> impl Iterator<Item = Point> {
        let (dx, dy) = direction.opposite().offset();
        (0..length.max(1) as i32).map(move |i| Point::new(head.x + dx * i, head.y + dy * i))
    }

    pub fn head(&self) -> Point {
        *self.body.front().expect("Snake body should never be empty")
    }

    pub fn tail(&self) -> Point {
        *self.body.back().expect("Snake body should never be empty")
    }

    pub fn neck(&self) -> Option<Point> {
        self.body.get(1).copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: &Point) -> bool {
        self.body.contains(pos)
    }

    /// True when `pos` matches any segment other than the head.
    pub fn body_contains(&self, pos: &Point) -> bool {
        self.body.iter().skip(1).any(|p| p == pos)
    }

    pub fn hits_self(&self) -> bool {
        self.body_contains(&self.head())
    }

    pub fn would_hit_neck(&self, direction: Direction) -> bool {
        self.neck() == Some(self.head().step(direction))
    }

    /// Buffers a direction for the next step. A direct reversal of the
    /// committed direction is rejected and leaves the buffer untouched.
    pub fn set_next_direction(&mut self, direction: Direction) -> bool {
        if direction.is_opposite(&self.direction) {
            return false;
        }
        self.next_direction = direction;
        true
    }

    /// Extends the snake by duplicating its tail in both `body` and `prev_body`.
    pub fn grow(&mut self) {
        let tail = self.tail();
        self.body.push_back(tail);
        let prev_tail = self.prev_body.back().copied().unwrap_or(tail);
        self.prev_body.push_back(prev_tail);
    }

    /// Installs a timed speed multiplier, replacing any active one.
    pub fn apply_speed_boost(&mut self, factor: f64, duration: Duration, now: Instant) {
        self.speed_factor = factor;
        self.speed_effect_end = Some(now + duration);
    }

    /// Drops the speed effect once its deadline has passed. Returns true if it expired.
    pub fn expire_speed_effect(&mut self, now: Instant) -> bool {
        match self.speed_effect_end {
            Some(end) if now >= end => {
                self.cancel_speed_effect();
                true
            }
            _ => false,
        }
    }

    pub fn cancel_speed_effect(&mut self) {
        self.speed_factor = 1.0;
        self.speed_effect_end = None;
    }

    pub fn speed_effect_remaining(&self, now: Instant) -> Option<Duration> {
        self.speed_effect_end.map(|end| end.saturating_duration_since(now))
    }

    pub fn postpone_deadlines(&mut self, by: Duration) {
        if let Some(end) = self.speed_effect_end.as_mut() {
            *end += by;
        }
    }

    /// Starts a discrete step: snapshots the body, commits the buffered
    /// direction and returns the cell the head is about to enter.
    pub fn begin_step(&mut self) -> Point {
        self.prev_body.clone_from(&self.body);
        self.direction = self.next_direction;
        self.head().step(self.direction)
    }

    /// Moves the head into `new_head` and drops the last segment.
    /// Growth comes from `grow` having duplicated the tail beforehand.
    pub fn advance_head(&mut self, new_head: Point) {
        self.body.push_front(new_head);
        self.body.pop_back();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake_right() -> Snake {
        Snake::new(SnakeId(0), Point::new(5, 5), Direction::Right, 3, true)
    }

    #[test]
    fn test_new_body_trails_behind_head() {
        let snake = snake_right();
        assert_eq!(
            snake.body,
            VecDeque::from(vec![Point::new(5, 5), Point::new(4, 5), Point::new(3, 5)])
        );
        assert_eq!(snake.body, snake.prev_body);
        assert_eq!(snake.next_direction, Direction::Right);

        let enemy = Snake::new(SnakeId(1), Point::new(30, 2), Direction::Left, 3, false);
        assert_eq!(enemy.tail(), Point::new(32, 2));
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut snake = snake_right();
        assert!(!snake.set_next_direction(Direction::Left));
        assert_eq!(snake.next_direction, Direction::Right);
        assert!(snake.set_next_direction(Direction::Up));
        assert_eq!(snake.next_direction, Direction::Up);
    }

    #[test]
    fn test_grow_keeps_prev_body_in_lockstep() {
        let mut snake = snake_right();
        let candidate = snake.begin_step();
        snake.grow();
        snake.advance_head(candidate);

        assert_eq!(snake.len(), 4);
        assert_eq!(snake.prev_body.len(), 4);
        assert_eq!(snake.head(), Point::new(6, 5));
        assert_eq!(snake.tail(), Point::new(3, 5));
    }

    #[test]
    fn test_step_without_growth_keeps_length() {
        let mut snake = snake_right();
        let candidate = snake.begin_step();
        snake.advance_head(candidate);

        assert_eq!(snake.len(), 3);
        assert_eq!(snake.prev_body.front(), Some(&Point::new(5, 5)));
        assert_eq!(snake.head(), Point::new(6, 5));
        assert_eq!(snake.tail(), Point::new(4, 5));
    }

    #[test]
    fn test_speed_boost_expires_at_deadline() {
        let now = Instant::now();
        let mut snake = snake_right();
        snake.apply_speed_boost(1.5, Duration::from_secs(7), now);
        assert_eq!(snake.speed_factor, 1.5);

        assert!(!snake.expire_speed_effect(now + Duration::from_millis(6999)));
        assert_eq!(snake.speed_factor, 1.5);

        assert!(snake.expire_speed_effect(now + Duration::from_secs(7)));
        assert_eq!(snake.speed_factor, 1.0);
        assert!(snake.speed_effect_end.is_none());
    }

    #[test]
    fn test_new_boost_replaces_active_one() {
        let now = Instant::now();
        let mut snake = snake_right();
        snake.apply_speed_boost(1.5, Duration::from_secs(7), now);
        let later = now + Duration::from_secs(5);
        snake.apply_speed_boost(0.6, Duration::from_secs(7), later);

        assert_eq!(snake.speed_factor, 0.6);
        assert!(!snake.expire_speed_effect(now + Duration::from_secs(8)));
        assert!(snake.expire_speed_effect(later + Duration::from_secs(7)));
    }

    #[test]
    fn test_neck_detection() {
        let snake = snake_right();
        assert!(snake.would_hit_neck(Direction::Left));
        assert!(!snake.would_hit_neck(Direction::Up));
    }

    #[test]
    fn test_self_hit_detection() {
        let mut snake = Snake::new(SnakeId(0), Point::new(5, 5), Direction::Right, 5, true);
        for dir in [Direction::Down, Direction::Left, Direction::Up] {
            snake.set_next_direction(dir);
            let next = snake.begin_step();
            snake.advance_head(next);
        }
        assert_eq!(snake.head(), Point::new(4, 5));
        assert!(snake.hits_self());
    }
}
