use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::settings::SnakeSessionSettings;
use super::snake::Snake;
use super::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    Standard,
    SpeedUp,
    SlowDown,
}

impl FoodType {
    /// Maps a uniform roll in [0, 1) onto the configured probability bands.
    pub fn from_roll(roll: f64, settings: &SnakeSessionSettings) -> FoodType {
        if roll < settings.speed_up_probability {
            FoodType::SpeedUp
        } else if roll < settings.speed_up_probability + settings.slow_down_probability {
            FoodType::SlowDown
        } else {
            FoodType::Standard
        }
    }

    pub fn points(&self, settings: &SnakeSessionSettings) -> u32 {
        match self {
            FoodType::Standard => settings.standard_points,
            FoodType::SpeedUp => settings.speed_up_points,
            FoodType::SlowDown => settings.slow_down_points,
        }
    }

    pub fn effect_duration(&self, settings: &SnakeSessionSettings) -> Duration {
        match self {
            FoodType::Standard => Duration::ZERO,
            FoodType::SpeedUp | FoodType::SlowDown => settings.speed_effect_duration(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub position: Point,
    pub food_type: FoodType,
    pub points: u32,
    pub duration: Duration,
}

impl Food {
    pub fn new(position: Point, food_type: FoodType, settings: &SnakeSessionSettings) -> Self {
        Self {
            position,
            food_type,
            points: food_type.points(settings),
            duration: food_type.effect_duration(settings),
        }
    }

    pub fn apply_effect(&self, snake: &mut Snake, settings: &SnakeSessionSettings, now: Instant) {
        apply_effect(self.food_type, self.duration, snake, settings, now);
    }
}

/// Every food grows the eater by one; speed foods also install a timed multiplier.
pub fn apply_effect(
    food_type: FoodType,
    duration: Duration,
    snake: &mut Snake,
    settings: &SnakeSessionSettings,
    now: Instant,
) {
    snake.grow();
    match food_type {
        FoodType::Standard => {}
        FoodType::SpeedUp => snake.apply_speed_boost(settings.speed_up_factor, duration, now),
        FoodType::SlowDown => snake.apply_speed_boost(settings.slow_down_factor, duration, now),
    }
}
