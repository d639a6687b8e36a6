use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use supersnake_engine::snake::{
    Direction, FieldSize, InputAction, Point, SnakeSessionSnapshot, find_path,
};

const RANDOM_TURN_PROBABILITY: f64 = 0.05;

/// Scripted player input for headless runs. Either chases the nearest food
/// along a shortest path or wanders with occasional random turns, always
/// preferring a cell that is free this frame.
pub struct Autopilot {
    rng: StdRng,
    chase_food: bool,
}

impl Autopilot {
    pub fn new(seed: u64, chase_food: bool) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            chase_food,
        }
    }

    pub fn next_action(&mut self, snapshot: &SnakeSessionSnapshot) -> InputAction {
        let Some(&head) = snapshot.player.body.first() else {
            return InputAction::None;
        };
        let obstacles = blocked_cells(snapshot);

        if self.chase_food {
            if let Some(direction) = towards_nearest_food(head, snapshot, &obstacles) {
                return direction.into();
            }
        }

        let current = snapshot.player.direction;
        let ahead_is_free = is_free(head.step(current), &snapshot.field_size, &obstacles);
        if ahead_is_free && !self.rng.random_bool(RANDOM_TURN_PROBABILITY) {
            return InputAction::None;
        }

        let candidates: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| !d.is_opposite(&current))
            .filter(|d| is_free(head.step(*d), &snapshot.field_size, &obstacles))
            .collect();
        match candidates.choose(&mut self.rng) {
            Some(&direction) => direction.into(),
            None => InputAction::None,
        }
    }
}

fn blocked_cells(snapshot: &SnakeSessionSnapshot) -> HashSet<Point> {
    snapshot
        .enemies
        .iter()
        .flat_map(|enemy| enemy.body.iter().copied())
        .chain(snapshot.player.body.iter().skip(1).copied())
        .collect()
}

fn is_free(cell: Point, field: &FieldSize, obstacles: &HashSet<Point>) -> bool {
    field.is_in_bounds(&cell) && !obstacles.contains(&cell)
}

fn towards_nearest_food(head: Point, snapshot: &SnakeSessionSnapshot, obstacles: &HashSet<Point>) -> Option<Direction> {
    let target = snapshot
        .food
        .iter()
        .min_by_key(|item| head.manhattan_distance(&item.position))?;
    let path = find_path(head, target.position, &snapshot.field_size, obstacles)?;
    head.direction_to(path.first()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use supersnake_engine::SessionRng;
    use supersnake_engine::snake::{ManualClock, SnakeSession, SnakeSessionSettings};

    fn create_snapshot(settings: SnakeSessionSettings) -> SnakeSessionSnapshot {
        SnakeSession::new(settings, ManualClock::new(), SessionRng::new(42)).snapshot()
    }

    #[test]
    fn test_chases_nearest_food() {
        let settings = SnakeSessionSettings {
            initial_enemy_count: 0,
            initial_food_items: 0,
            ..SnakeSessionSettings::default()
        };
        let mut snapshot = create_snapshot(settings.clone());
        snapshot.food.push(supersnake_engine::snake::Food::new(
            Point::new(10, 5),
            supersnake_engine::snake::FoodType::Standard,
            &settings,
        ));

        let mut autopilot = Autopilot::new(7, true);
        assert_eq!(autopilot.next_action(&snapshot), InputAction::MoveUp);
    }

    #[test]
    fn test_turns_away_from_wall() {
        let settings = SnakeSessionSettings {
            initial_enemy_count: 0,
            initial_food_items: 0,
            ..SnakeSessionSettings::default()
        };
        let mut snapshot = create_snapshot(settings);
        snapshot.player.body = vec![Point::new(39, 15), Point::new(38, 15), Point::new(37, 15)];

        let mut autopilot = Autopilot::new(7, false);
        let action = autopilot.next_action(&snapshot);
        assert!(matches!(action, InputAction::MoveUp | InputAction::MoveDown));
    }

    #[test]
    fn test_empty_body_yields_no_input() {
        let mut snapshot = create_snapshot(SnakeSessionSettings::default());
        snapshot.player.body.clear();

        let mut autopilot = Autopilot::new(7, true);
        assert_eq!(autopilot.next_action(&snapshot), InputAction::None);
    }
}
