use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step away in `direction`. May lie outside the field.
    pub fn step(&self, direction: Direction) -> Point {
        let (dx, dy) = direction.offset();
        Point::new(self.x + dx, self.y + dy)
    }

    pub fn manhattan_distance(&self, other: &Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Direction of a single 4-connected step from `self` to `to`, if they are adjacent.
    pub fn direction_to(&self, to: &Point) -> Option<Direction> {
        Direction::ALL.into_iter().find(|&d| self.step(d) == *to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Grid offset with y growing downwards.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(&self, other: &Direction) -> bool {
        self.opposite() == *other
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
    OtherSnakeCollision,
}

/// Fixed-size playing field. Cells are addressed from (0, 0) in the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSize {
    pub width: i32,
    pub height: i32,
}

impl FieldSize {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_in_bounds(&self, pos: &Point) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_half_open() {
        let field = FieldSize::new(40, 30);
        assert!(field.is_in_bounds(&Point::new(0, 0)));
        assert!(field.is_in_bounds(&Point::new(39, 29)));
        assert!(!field.is_in_bounds(&Point::new(40, 0)));
        assert!(!field.is_in_bounds(&Point::new(0, 30)));
        assert!(!field.is_in_bounds(&Point::new(-1, 5)));
        assert!(!field.is_in_bounds(&Point::new(5, -1)));
    }

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Point::new(1, 2).manhattan_distance(&Point::new(4, -2)), 7);
        assert_eq!(Point::new(3, 3).manhattan_distance(&Point::new(3, 3)), 0);
    }

    #[test]
    fn test_step_moves_one_cell() {
        let p = Point::new(5, 5);
        assert_eq!(p.step(Direction::Up), Point::new(5, 4));
        assert_eq!(p.step(Direction::Down), Point::new(5, 6));
        assert_eq!(p.step(Direction::Left), Point::new(4, 5));
        assert_eq!(p.step(Direction::Right), Point::new(6, 5));
    }

    #[test]
    fn test_direction_to_adjacent_only() {
        let p = Point::new(2, 2);
        assert_eq!(p.direction_to(&Point::new(2, 1)), Some(Direction::Up));
        assert_eq!(p.direction_to(&Point::new(3, 2)), Some(Direction::Right));
        assert_eq!(p.direction_to(&Point::new(4, 2)), None);
        assert_eq!(p.direction_to(&Point::new(3, 3)), None);
        assert_eq!(p.direction_to(&p), None);
    }

    #[test]
    fn test_opposites() {
        for d in Direction::ALL {
            assert!(d.is_opposite(&d.opposite()));
            assert!(!d.is_opposite(&d));
        }
    }
}
