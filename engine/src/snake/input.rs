use super::types::Direction;

/// One discrete command per frame from the input side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputAction {
    #[default]
    None,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    TogglePause,
    /// Restarts only after game over.
    Confirm,
    /// Restarts at any time.
    Restart,
}

impl InputAction {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            InputAction::MoveUp => Some(Direction::Up),
            InputAction::MoveDown => Some(Direction::Down),
            InputAction::MoveLeft => Some(Direction::Left),
            InputAction::MoveRight => Some(Direction::Right),
            _ => None,
        }
    }
}

impl From<Direction> for InputAction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => InputAction::MoveUp,
            Direction::Down => InputAction::MoveDown,
            Direction::Left => InputAction::MoveLeft,
            Direction::Right => InputAction::MoveRight,
        }
    }
}
