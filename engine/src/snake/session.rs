use std::time::{Duration, Instant};

use crate::{SessionRng, log};
use super::clock::{Clock, SystemClock};
use super::food::Food;
use super::food_spawner::SpawnSchedule;
use super::game_state::{EatenMarker, PLAYER_ID, SnakeGameState};
use super::input::InputAction;
use super::settings::SnakeSessionSettings;
use super::snake::{Snake, SnakeId};
use super::types::{DeathReason, Direction, FieldSize, Point};

/// Read-only copy of one snake for presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakeView {
    pub id: SnakeId,
    pub body: Vec<Point>,
    pub prev_body: Vec<Point>,
    pub move_progress: f64,
    pub direction: Direction,
    pub speed_factor: f64,
    pub is_player: bool,
}

impl From<&Snake> for SnakeView {
    fn from(snake: &Snake) -> Self {
        Self {
            id: snake.id,
            body: snake.body.iter().copied().collect(),
            prev_body: snake.prev_body.iter().copied().collect(),
            move_progress: snake.move_progress,
            direction: snake.direction,
            speed_factor: snake.speed_factor,
            is_player: snake.is_player,
        }
    }
}

/// Everything a renderer needs for one frame. Owned copies; mutating it has no effect on the session.
#[derive(Clone, Debug, PartialEq)]
pub struct SnakeSessionSnapshot {
    pub field_size: FieldSize,
    pub player: SnakeView,
    pub enemies: Vec<SnakeView>,
    pub food: Vec<Food>,
    pub score: u32,
    pub is_over: bool,
    pub is_paused: bool,
    pub base_speed: f64,
    pub player_speed_factor: f64,
    pub speed_effect_remaining: Option<Duration>,
    pub food_eaten_position: Option<Point>,
    pub enemy_food_eaten_position: Option<Point>,
    pub game_end_reason: Option<DeathReason>,
}

/// Owns a running game and advances it once per frame.
pub struct SnakeSession<C: Clock = SystemClock> {
    settings: SnakeSessionSettings,
    clock: C,
    rng: SessionRng,
    state: SnakeGameState,
    is_paused: bool,
    paused_at: Option<Instant>,
    food_schedule: SpawnSchedule,
    enemy_schedule: SpawnSchedule,
}

impl SnakeSession<SystemClock> {
    pub fn with_system_clock(settings: SnakeSessionSettings, rng: SessionRng) -> Self {
        Self::new(settings, SystemClock, rng)
    }
}

impl<C: Clock> SnakeSession<C> {
    pub fn new(settings: SnakeSessionSettings, clock: C, mut rng: SessionRng) -> Self {
        let now = clock.now();
        let state = SnakeGameState::new(&settings, &mut rng);
        let food_schedule = SpawnSchedule::starting_at(now, settings.food_spawn_interval());
        let enemy_schedule = SpawnSchedule::starting_at(now, settings.enemy_spawn_interval());

        log!(
            "Session started (seed {}, {} enemies, {} food)",
            rng.seed(),
            state.enemies.len(),
            state.food.len()
        );

        Self {
            settings,
            clock,
            rng,
            state,
            is_paused: false,
            paused_at: None,
            food_schedule,
            enemy_schedule,
        }
    }

    /// Starts a new round, discarding every entity, path, schedule and speed effect.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.state = SnakeGameState::new(&self.settings, &mut self.rng);
        self.is_paused = false;
        self.paused_at = None;
        self.food_schedule = SpawnSchedule::starting_at(now, self.settings.food_spawn_interval());
        self.enemy_schedule = SpawnSchedule::starting_at(now, self.settings.enemy_spawn_interval());
        log!("Session reset ({} enemies, {} food)", self.state.enemies.len(), self.state.food.len());
    }

    /// Buffers the player's next direction. Reversals are ignored.
    pub fn handle_input(&mut self, direction: Direction) -> bool {
        self.state.set_player_direction(direction)
    }

    pub fn apply_input(&mut self, action: InputAction) {
        if let Some(direction) = action.direction() {
            self.handle_input(direction);
            return;
        }

        match action {
            InputAction::TogglePause if !self.state.is_over => self.toggle_pause(),
            InputAction::Confirm if self.state.is_over => self.reset(),
            InputAction::Restart => self.reset(),
            _ => {}
        }
    }

    /// Freezes or resumes the game. On resume every deadline moves forward by
    /// the paused span so no countdown advances while paused.
    pub fn toggle_pause(&mut self) {
        let now = self.clock.now();
        if self.is_paused {
            if let Some(paused_at) = self.paused_at.take() {
                let paused_for = now.saturating_duration_since(paused_at);
                self.food_schedule.postpone(paused_for);
                self.enemy_schedule.postpone(paused_for);
                self.state.postpone_deadlines(paused_for);
            }
            self.is_paused = false;
            log!("Resumed");
        } else {
            self.paused_at = Some(now);
            self.is_paused = true;
            log!("Paused");
        }
    }

    /// Advances the game by `delta_time` seconds: timed spawns, then the
    /// player, then each enemy's decision and movement in collection order.
    pub fn update(&mut self, delta_time: f64) {
        if self.state.is_over || self.is_paused {
            return;
        }
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        let now = self.clock.now();

        self.state.expire_speed_effects(now);

        if self.food_schedule.is_due(now) {
            self.state.spawn_food(&mut self.rng);
            self.food_schedule.reschedule(now);
        }

        if self.enemy_schedule.is_due(now) {
            self.state.spawn_enemy_if_possible(&mut self.rng);
            self.enemy_schedule.reschedule(now);
        }

        self.state.advance_snake(PLAYER_ID, delta_time, now, &mut self.rng);
        if self.state.is_over {
            return;
        }

        for id in self.state.enemy_ids() {
            // Removed earlier this frame by another snake's collision.
            if !self.state.has_enemy(id) {
                continue;
            }
            self.state.steer_enemy(id, &mut self.rng);
            self.state.advance_snake(id, delta_time, now, &mut self.rng);
            if self.state.is_over {
                return;
            }
        }
    }

    pub fn snapshot(&self) -> SnakeSessionSnapshot {
        // Time stands still while paused.
        let now = self.paused_at.unwrap_or_else(|| self.clock.now());
        let marker_duration = self.settings.eaten_marker_duration();
        let visible = |marker: Option<EatenMarker>| {
            marker
                .filter(|m| now.saturating_duration_since(m.at) <= marker_duration)
                .map(|m| m.position)
        };

        SnakeSessionSnapshot {
            field_size: self.state.field_size,
            player: SnakeView::from(&self.state.player),
            enemies: self.state.enemies.iter().map(SnakeView::from).collect(),
            food: self.state.food.clone(),
            score: self.state.score,
            is_over: self.state.is_over,
            is_paused: self.is_paused,
            base_speed: self.state.base_speed,
            player_speed_factor: self.state.player.speed_factor,
            speed_effect_remaining: self.state.player.speed_effect_remaining(now),
            food_eaten_position: visible(self.state.player_food_eaten),
            enemy_food_eaten_position: visible(self.state.enemy_food_eaten),
            game_end_reason: self.state.game_end_reason,
        }
    }

    pub fn state(&self) -> &SnakeGameState {
        &self.state
    }

    pub fn settings(&self) -> &SnakeSessionSettings {
        &self.settings
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}
