use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::SessionRng;
use super::food::{Food, FoodType};
use super::settings::SnakeSessionSettings;
use super::snake::Snake;
use super::types::{FieldSize, Point};

/// Wall-clock deadline for a recurring event, polled once per frame.
#[derive(Clone, Copy, Debug)]
pub struct SpawnSchedule {
    next_at: Instant,
    interval: Duration,
}

impl SpawnSchedule {
    pub fn starting_at(now: Instant, interval: Duration) -> Self {
        Self {
            next_at: now + interval,
            interval,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now > self.next_at
    }

    /// Next deadline is one interval from `now`, so a long frame never queues up several spawns.
    pub fn reschedule(&mut self, now: Instant) {
        self.next_at = now + self.interval;
    }

    pub fn postpone(&mut self, by: Duration) {
        self.next_at += by;
    }

    pub fn next_at(&self) -> Instant {
        self.next_at
    }
}

/// Every cell covered by a snake segment or a food item.
pub fn occupied_cells<'a>(snakes: impl IntoIterator<Item = &'a Snake>, food: &[Food]) -> HashSet<Point> {
    snakes
        .into_iter()
        .flat_map(|snake| snake.body.iter().copied())
        .chain(food.iter().map(|item| item.position))
        .collect()
}

/// Random free cell, or `None` when sampling fails within twice the number of free cells.
pub fn find_free_cell(field: &FieldSize, occupied: &HashSet<Point>, rng: &mut SessionRng) -> Option<Point> {
    let free_cells = field.cell_count().saturating_sub(occupied.len());
    if free_cells == 0 {
        return None;
    }

    for _ in 0..free_cells * 2 {
        let pos = Point::new(
            rng.random_range(0..field.width),
            rng.random_range(0..field.height),
        );
        if !occupied.contains(&pos) {
            return Some(pos);
        }
    }
    None
}

/// Adds one food item if below the cap and a free cell turns up.
/// Returns the new item's position; failure is silent.
pub fn try_spawn_one<'a>(
    food: &mut Vec<Food>,
    snakes: impl IntoIterator<Item = &'a Snake>,
    settings: &SnakeSessionSettings,
    rng: &mut SessionRng,
) -> Option<Point> {
    if food.len() >= settings.max_food_items {
        return None;
    }

    let occupied = occupied_cells(snakes, food);
    let food_type = FoodType::from_roll(rng.random::<f64>(), settings);
    let position = find_free_cell(&settings.field_size(), &occupied, rng)?;

    food.push(Food::new(position, food_type, settings));
    Some(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::snake::SnakeId;
    use crate::snake::types::Direction;

    const NO_SNAKES: [&Snake; 0] = [];

    fn small_settings(max_food_items: usize) -> SnakeSessionSettings {
        SnakeSessionSettings {
            field_width: 10,
            field_height: 10,
            max_food_items,
            ..SnakeSessionSettings::default()
        }
    }

    #[test]
    fn test_spawn_avoids_snakes_and_food() {
        let settings = small_settings(200);
        let mut rng = SessionRng::new(42);
        let snake = Snake::new(SnakeId(0), Point::new(5, 5), Direction::Right, 3, true);
        let mut food = Vec::new();

        for _ in 0..50 {
            try_spawn_one(&mut food, [&snake], &settings, &mut rng);
        }

        let positions: HashSet<Point> = food.iter().map(|f| f.position).collect();
        assert_eq!(positions.len(), food.len(), "food items overlap");
        assert!(food.iter().all(|f| !snake.occupies(&f.position)));
        assert!(food.iter().all(|f| settings.field_size().is_in_bounds(&f.position)));
    }

    #[test]
    fn test_spawn_never_exceeds_cap() {
        let settings = small_settings(5);
        let mut rng = SessionRng::new(42);
        let mut food = Vec::new();

        for _ in 0..100 {
            try_spawn_one(&mut food, NO_SNAKES, &settings, &mut rng);
            assert!(food.len() <= 5);
        }
        assert_eq!(food.len(), 5);
    }

    #[test]
    fn test_spawn_fails_silently_on_full_field() {
        let settings = small_settings(200);
        let mut rng = SessionRng::new(42);
        let field = settings.field_size();
        let mut food: Vec<Food> = (0..field.width)
            .flat_map(|x| (0..field.height).map(move |y| Point::new(x, y)))
            .map(|p| Food::new(p, FoodType::Standard, &settings))
            .collect();

        assert_eq!(try_spawn_one(&mut food, NO_SNAKES, &settings, &mut rng), None);
        assert_eq!(food.len(), 100);
    }

    #[test]
    fn test_type_distribution_roughly_matches_bands() {
        let settings = small_settings(1);
        let mut rng = SessionRng::new(7);
        let mut standard = 0;
        for _ in 0..2000 {
            let mut food = Vec::new();
            try_spawn_one(&mut food, NO_SNAKES, &settings, &mut rng);
            if food[0].food_type == FoodType::Standard {
                standard += 1;
            }
        }
        assert!((1250..=1550).contains(&standard), "standard count {}", standard);
    }

    #[test]
    fn test_schedule_due_strictly_after_deadline() {
        let start = Instant::now();
        let mut schedule = SpawnSchedule::starting_at(start, Duration::from_secs(5));
        assert!(!schedule.is_due(start + Duration::from_secs(5)));
        assert!(schedule.is_due(start + Duration::from_millis(5001)));

        let late = start + Duration::from_secs(17);
        schedule.reschedule(late);
        assert!(!schedule.is_due(late + Duration::from_secs(4)));
        assert!(schedule.is_due(late + Duration::from_secs(6)));
    }

    #[test]
    fn test_schedule_postpone_shifts_deadline() {
        let start = Instant::now();
        let mut schedule = SpawnSchedule::starting_at(start, Duration::from_secs(5));
        schedule.postpone(Duration::from_secs(3));
        assert_eq!(schedule.next_at(), start + Duration::from_secs(8));
    }
}
