mod bot_controller;
mod clock;
mod food;
mod food_spawner;
mod game_state;
mod input;
mod pathfinding;
mod session;
mod settings;
mod snake;
mod types;

pub use bot_controller::BotController;
pub use clock::{Clock, ManualClock, SystemClock};
pub use food::{Food, FoodType};
pub use food_spawner::{SpawnSchedule, find_free_cell, occupied_cells, try_spawn_one};
pub use game_state::{EatenMarker, PLAYER_ID, SnakeGameState};
pub use input::InputAction;
pub use pathfinding::find_path;
pub use session::{SnakeSession, SnakeSessionSnapshot, SnakeView};
pub use settings::SnakeSessionSettings;
pub use snake::{Snake, SnakeId};
pub use types::{DeathReason, Direction, FieldSize, Point};
