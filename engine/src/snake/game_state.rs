use std::collections::HashSet;
use std::iter;
use std::time::{Duration, Instant};

use crate::{SessionRng, log, log_warn};
use super::bot_controller::BotController;
use super::food::{Food, FoodType};
use super::food_spawner::{occupied_cells, try_spawn_one};
use super::settings::SnakeSessionSettings;
use super::snake::{Snake, SnakeId};
use super::types::{DeathReason, Direction, FieldSize, Point};

pub const PLAYER_ID: SnakeId = SnakeId(0);

/// Where and when a food item was last eaten, for presentation effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EatenMarker {
    pub position: Point,
    pub at: Instant,
}

/// All entities of one round plus the movement and collision rules that act on them.
#[derive(Clone, Debug)]
pub struct SnakeGameState {
    pub settings: SnakeSessionSettings,
    pub field_size: FieldSize,
    pub player: Snake,
    pub enemies: Vec<Snake>,
    pub food: Vec<Food>,
    pub score: u32,
    /// Grid cells per second shared by every snake, scaled by each snake's speed factor.
    pub base_speed: f64,
    pub is_over: bool,
    pub game_end_reason: Option<DeathReason>,
    pub player_food_eaten: Option<EatenMarker>,
    pub enemy_food_eaten: Option<EatenMarker>,
    next_snake_id: u32,
}

fn find_snake_mut<'a>(player: &'a mut Snake, enemies: &'a mut [Snake], id: SnakeId) -> Option<&'a mut Snake> {
    if player.id == id {
        Some(player)
    } else {
        enemies.iter_mut().find(|enemy| enemy.id == id)
    }
}

impl SnakeGameState {
    /// Fresh round: player at its start cell, initial enemies on the right
    /// side of the field and the initial batch of food.
    pub fn new(settings: &SnakeSessionSettings, rng: &mut SessionRng) -> Self {
        let player = Snake::new(
            PLAYER_ID,
            settings.player_start(),
            Direction::Right,
            settings.initial_snake_length,
            true,
        );

        let mut state = Self {
            settings: settings.clone(),
            field_size: settings.field_size(),
            player,
            enemies: Vec::with_capacity(settings.max_enemy_count),
            food: Vec::new(),
            score: 0,
            base_speed: settings.initial_speed,
            is_over: false,
            game_end_reason: None,
            player_food_eaten: None,
            enemy_food_eaten: None,
            next_snake_id: PLAYER_ID.0 + 1,
        };

        let mut occupied: HashSet<Point> = state.player.body.iter().copied().collect();
        for _ in 0..settings.initial_enemy_count {
            match state.create_enemy(&occupied, rng) {
                Some(enemy) => {
                    occupied.extend(enemy.body.iter().copied());
                    state.enemies.push(enemy);
                }
                None => log_warn!(
                    "Could not place enemy snake after {} attempts",
                    settings.enemy_placement_attempts()
                ),
            }
        }

        for _ in 0..settings.initial_food_items {
            state.spawn_food(rng);
        }

        state
    }

    pub fn snakes(&self) -> impl Iterator<Item = &Snake> {
        iter::once(&self.player).chain(self.enemies.iter())
    }

    pub fn snake(&self, id: SnakeId) -> Option<&Snake> {
        self.snakes().find(|snake| snake.id == id)
    }

    pub fn snake_mut(&mut self, id: SnakeId) -> Option<&mut Snake> {
        find_snake_mut(&mut self.player, &mut self.enemies, id)
    }

    pub fn has_enemy(&self, id: SnakeId) -> bool {
        self.enemies.iter().any(|enemy| enemy.id == id)
    }

    pub fn enemy_ids(&self) -> Vec<SnakeId> {
        self.enemies.iter().map(|enemy| enemy.id).collect()
    }

    fn allocate_id(&mut self) -> SnakeId {
        let id = SnakeId(self.next_snake_id);
        self.next_snake_id += 1;
        id
    }

    /// Places an enemy directly, bypassing the random placement.
    pub fn add_enemy(&mut self, head: Point, direction: Direction, length: usize) -> SnakeId {
        let id = self.allocate_id();
        self.enemies.push(Snake::new(id, head, direction, length, false));
        id
    }

    pub fn add_food(&mut self, position: Point, food_type: FoodType) {
        self.food.push(Food::new(position, food_type, &self.settings));
    }

    /// Random enemy in the rightmost quarter of the field, heading left with
    /// its body trailing to the right. `None` if no free spot turns up.
    fn create_enemy(&mut self, occupied: &HashSet<Point>, rng: &mut SessionRng) -> Option<Snake> {
        let quarter = self.field_size.width / 4;
        let length = self.settings.initial_snake_length;

        for _ in 0..self.settings.enemy_placement_attempts() {
            let head = Point::new(
                self.field_size.width - quarter + rng.random_range(0..quarter.max(1)),
                rng.random_range(0..self.field_size.height),
            );
            let fits = Snake::initial_body(head, Direction::Left, length)
                .all(|p| self.field_size.is_in_bounds(&p) && !occupied.contains(&p));
            if fits {
                let id = self.allocate_id();
                return Some(Snake::new(id, head, Direction::Left, length, false));
            }
        }
        None
    }

    /// Adds one enemy if below the cap, avoiding every snake and food item.
    pub fn spawn_enemy_if_possible(&mut self, rng: &mut SessionRng) -> Option<SnakeId> {
        if self.enemies.len() >= self.settings.max_enemy_count {
            return None;
        }

        log!("Attempting to spawn enemy snake (current: {})", self.enemies.len());
        let occupied = occupied_cells(self.snakes(), &self.food);
        match self.create_enemy(&occupied, rng) {
            Some(enemy) => {
                let id = enemy.id;
                self.enemies.push(enemy);
                log!("Spawned {} (total: {})", id, self.enemies.len());
                Some(id)
            }
            None => {
                log_warn!("Failed to spawn enemy snake: no free placement");
                None
            }
        }
    }

    pub fn spawn_food(&mut self, rng: &mut SessionRng) -> Option<Point> {
        try_spawn_one(
            &mut self.food,
            iter::once(&self.player).chain(self.enemies.iter()),
            &self.settings,
            rng,
        )
    }

    pub fn set_player_direction(&mut self, direction: Direction) -> bool {
        self.player.set_next_direction(direction)
    }

    pub fn expire_speed_effects(&mut self, now: Instant) {
        self.player.expire_speed_effect(now);
        for enemy in &mut self.enemies {
            enemy.expire_speed_effect(now);
        }
    }

    /// Shifts every time-based deadline held by the round, used when resuming from pause.
    pub fn postpone_deadlines(&mut self, by: Duration) {
        self.player.postpone_deadlines(by);
        for enemy in &mut self.enemies {
            enemy.postpone_deadlines(by);
        }
        for marker in [&mut self.player_food_eaten, &mut self.enemy_food_eaten].into_iter().flatten() {
            marker.at += by;
        }
    }

    /// Runs the AI decision for one enemy against the rest of the field.
    pub fn steer_enemy(&mut self, id: SnakeId, rng: &mut SessionRng) -> Option<Direction> {
        let index = self.enemies.iter().position(|enemy| enemy.id == id)?;
        let (before, rest) = self.enemies.split_at_mut(index);
        let (bot, after) = rest.split_first_mut()?;
        let others = iter::once(&self.player).chain(before.iter()).chain(after.iter());

        Some(BotController::update_direction(bot, others, &self.food, &self.field_size, rng))
    }

    /// Accumulates movement for one snake and finalizes every whole grid
    /// step that became due, checking collisions after each of them.
    pub fn advance_snake(&mut self, id: SnakeId, delta_time: f64, now: Instant, rng: &mut SessionRng) {
        if self.is_over {
            return;
        }
        let base_speed = self.base_speed;
        let Some(snake) = self.snake_mut(id) else {
            return;
        };
        snake.move_progress += snake.speed_factor * base_speed * delta_time;

        while !self.is_over {
            let Some(snake) = self.snake_mut(id) else {
                return;
            };
            if snake.move_progress < 1.0 {
                return;
            }
            snake.move_progress -= 1.0;

            let candidate = snake.begin_step();
            self.eat_food_at(id, candidate, now, rng);

            let Some(snake) = self.snake_mut(id) else {
                return;
            };
            snake.advance_head(candidate);

            if let Some(reason) = self.wall_or_self_collision(id) {
                self.kill(id, reason);
                return;
            }

            if self.resolve_snake_collisions(id) {
                return;
            }
        }
    }

    fn eat_food_at(&mut self, id: SnakeId, position: Point, now: Instant, rng: &mut SessionRng) -> bool {
        let Some(index) = self.food.iter().position(|item| item.position == position) else {
            return false;
        };
        let item = self.food[index].clone();

        let Some(snake) = find_snake_mut(&mut self.player, &mut self.enemies, id) else {
            return false;
        };
        item.apply_effect(snake, &self.settings, now);
        let marker = Some(EatenMarker { position, at: now });

        if snake.is_player {
            self.score += item.points;
            self.base_speed = (self.base_speed + self.settings.speed_increment).min(self.settings.max_speed);
            self.player_food_eaten = marker;
        } else {
            self.enemy_food_eaten = marker;
        }

        // The eaten item still covers `position`, so the replacement cannot land under the head.
        self.spawn_food(rng);
        self.food.remove(index);
        true
    }

    fn wall_or_self_collision(&self, id: SnakeId) -> Option<DeathReason> {
        let snake = self.snake(id)?;
        if !self.field_size.is_in_bounds(&snake.head()) {
            Some(DeathReason::WallCollision)
        } else if snake.hits_self() {
            Some(DeathReason::SelfCollision)
        } else {
            None
        }
    }

    /// Applies the head-based collision rules between `id` and every other
    /// snake. Returns true when `id` must stop moving this frame.
    fn resolve_snake_collisions(&mut self, id: SnakeId) -> bool {
        let Some(head) = self.snake(id).map(Snake::head) else {
            return true;
        };

        if id == self.player.id {
            let hit = self
                .enemies
                .iter()
                .find_map(|enemy| {
                    if enemy.head() == head {
                        Some((enemy.id, true))
                    } else if enemy.body_contains(&head) {
                        Some((enemy.id, false))
                    } else {
                        None
                    }
                });
            return match hit {
                Some((enemy_id, head_on)) => {
                    self.trigger_game_over(DeathReason::OtherSnakeCollision);
                    if head_on {
                        self.remove_enemy(enemy_id, "head-on collision with the player");
                    }
                    true
                }
                None => false,
            };
        }

        if self.player.head() == head {
            self.trigger_game_over(DeathReason::OtherSnakeCollision);
            self.remove_enemy(id, "head-on collision with the player");
            return true;
        }
        if self.player.body_contains(&head) {
            self.remove_enemy(id, "ran into the player");
            return true;
        }

        let hit = self
            .enemies
            .iter()
            .filter(|other| other.id != id)
            .find_map(|other| {
                if other.head() == head {
                    Some((other.id, true))
                } else if other.body_contains(&head) {
                    Some((other.id, false))
                } else {
                    None
                }
            });
        match hit {
            Some((other_id, true)) => {
                self.remove_enemy(id, "head-on collision with another enemy");
                self.remove_enemy(other_id, "head-on collision with another enemy");
                true
            }
            Some((_, false)) => {
                self.remove_enemy(id, "ran into another enemy");
                true
            }
            None => false,
        }
    }

    fn kill(&mut self, id: SnakeId, reason: DeathReason) {
        if id == self.player.id {
            self.trigger_game_over(reason);
        } else {
            self.remove_enemy(id, &format!("{:?}", reason));
        }
    }

    pub fn remove_enemy(&mut self, id: SnakeId, cause: &str) {
        let before = self.enemies.len();
        self.enemies.retain(|enemy| enemy.id != id);
        if self.enemies.len() != before {
            log!("Removed {}: {}", id, cause);
        }
    }

    /// Ends the round. The player's speed effect is dropped and leftover
    /// progress is discarded so it stays below one step.
    pub fn trigger_game_over(&mut self, reason: DeathReason) {
        if self.is_over {
            return;
        }
        self.is_over = true;
        self.game_end_reason = Some(reason);
        self.player.cancel_speed_effect();
        self.player.move_progress %= 1.0;
        log!("Game over ({:?}), score {}", reason, self.score);
    }
}
