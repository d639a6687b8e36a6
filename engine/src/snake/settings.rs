use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use super::types::{FieldSize, Point};

/// Startup constants of a snake session. Loaded once; the session copies them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSessionSettings {
    pub field_width: i32,
    pub field_height: i32,
    /// Grid cells per second before speed factors.
    pub initial_speed: f64,
    pub speed_increment: f64,
    pub max_speed: f64,
    pub initial_snake_length: usize,
    pub initial_food_items: usize,
    pub max_food_items: usize,
    pub food_spawn_interval_ms: u64,
    pub initial_enemy_count: usize,
    pub max_enemy_count: usize,
    pub enemy_spawn_interval_ms: u64,
    pub speed_up_probability: f64,
    pub slow_down_probability: f64,
    pub standard_points: u32,
    pub speed_up_points: u32,
    pub slow_down_points: u32,
    pub speed_up_factor: f64,
    pub slow_down_factor: f64,
    pub speed_effect_duration_ms: u64,
    pub eaten_marker_duration_ms: u64,
}

impl Default for SnakeSessionSettings {
    fn default() -> Self {
        Self {
            field_width: 40,
            field_height: 30,
            initial_speed: 8.0,
            speed_increment: 0.5,
            max_speed: 20.0,
            initial_snake_length: 3,
            initial_food_items: 3,
            max_food_items: 50,
            food_spawn_interval_ms: 5_000,
            initial_enemy_count: 2,
            max_enemy_count: 3,
            enemy_spawn_interval_ms: 15_000,
            speed_up_probability: 0.15,
            slow_down_probability: 0.15,
            standard_points: 10,
            speed_up_points: 15,
            slow_down_points: 5,
            speed_up_factor: 1.5,
            slow_down_factor: 0.6,
            speed_effect_duration_ms: 7_000,
            eaten_marker_duration_ms: 150,
        }
    }
}

impl SnakeSessionSettings {
    pub fn field_size(&self) -> FieldSize {
        FieldSize::new(self.field_width, self.field_height)
    }

    pub fn food_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.food_spawn_interval_ms)
    }

    pub fn enemy_spawn_interval(&self) -> Duration {
        Duration::from_millis(self.enemy_spawn_interval_ms)
    }

    pub fn speed_effect_duration(&self) -> Duration {
        Duration::from_millis(self.speed_effect_duration_ms)
    }

    pub fn eaten_marker_duration(&self) -> Duration {
        Duration::from_millis(self.eaten_marker_duration_ms)
    }

    /// Player head position on reset: a quarter across, vertically centred.
    pub fn player_start(&self) -> Point {
        Point::new(self.field_width / 4, self.field_height / 2)
    }

    /// Placement attempts before giving up on an enemy position.
    pub fn enemy_placement_attempts(&self) -> usize {
        self.field_size().cell_count() / 2
    }
}

impl Validate for SnakeSessionSettings {
    fn validate(&self) -> Result<(), String> {
        if !(10..=100).contains(&self.field_width) {
            return Err("Field width must be between 10 and 100".to_string());
        }
        if !(10..=100).contains(&self.field_height) {
            return Err("Field height must be between 10 and 100".to_string());
        }
        if self.initial_snake_length < 2 {
            return Err("Initial snake length must be at least 2".to_string());
        }
        // Both the player start and the enemy spawn strip span a quarter of the width.
        if self.initial_snake_length as i32 > self.field_width / 4 {
            return Err("Initial snake length must fit within a quarter of the field width".to_string());
        }
        let floats = [
            self.initial_speed,
            self.speed_increment,
            self.max_speed,
            self.speed_up_probability,
            self.slow_down_probability,
            self.speed_up_factor,
            self.slow_down_factor,
        ];
        if floats.iter().any(|value| !value.is_finite()) {
            return Err("Speeds, probabilities and factors must be finite numbers".to_string());
        }
        if self.initial_speed <= 0.0 || self.max_speed < self.initial_speed {
            return Err("Speeds must be positive and max speed at least the initial speed".to_string());
        }
        if self.speed_increment < 0.0 {
            return Err("Speed increment must not be negative".to_string());
        }
        if self.max_food_items < 1 || self.initial_food_items > self.max_food_items {
            return Err("Food counts must satisfy 1 <= max and initial <= max".to_string());
        }
        if self.initial_enemy_count > self.max_enemy_count {
            return Err("Initial enemy count must not exceed max enemy count".to_string());
        }
        if self.food_spawn_interval_ms == 0 || self.enemy_spawn_interval_ms == 0 {
            return Err("Spawn intervals must be positive".to_string());
        }
        let probabilities = [self.speed_up_probability, self.slow_down_probability];
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p))
            || self.speed_up_probability + self.slow_down_probability > 1.0
        {
            return Err("Food type probabilities must be within 0.0..=1.0 and sum to at most 1.0".to_string());
        }
        if self.speed_up_factor <= 0.0 || self.slow_down_factor <= 0.0 {
            return Err("Speed effect factors must be positive".to_string());
        }
        Ok(())
    }
}
