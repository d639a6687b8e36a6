use std::collections::HashSet;

use crate::SessionRng;
use super::food::Food;
use super::pathfinding::find_path;
use super::snake::Snake;
use super::types::{Direction, FieldSize, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecisionState {
    Following,
    Recalculating,
}

/// Steering for AI snakes. Only ever sets `next_direction`; movement is left
/// to the game state like for the player.
pub struct BotController;

impl BotController {
    /// Decides this frame's direction for `bot`, following its cached route
    /// while it stays valid and replanning towards the nearest food otherwise.
    /// `others` are every other living snake, player included.
    pub fn update_direction<'a>(
        bot: &mut Snake,
        others: impl IntoIterator<Item = &'a Snake>,
        food: &[Food],
        field: &FieldSize,
        rng: &mut SessionRng,
    ) -> Direction {
        let mut state = DecisionState::Following;

        loop {
            match state {
                DecisionState::Following => match Self::follow_path(bot) {
                    Some(direction) => {
                        bot.set_next_direction(direction);
                        return bot.next_direction;
                    }
                    None => state = DecisionState::Recalculating,
                },
                DecisionState::Recalculating => {
                    let direction = Self::recalculate(bot, others, food, field, rng);
                    bot.set_next_direction(direction);
                    return bot.next_direction;
                }
            }
        }
    }

    /// Next direction along the cached path, or `None` once it is used up or
    /// no longer usable, in which case the path is cleared.
    fn follow_path(bot: &mut Snake) -> Option<Direction> {
        let head = bot.head();
        if bot.current_path.front() == Some(&head) {
            bot.current_path.pop_front();
        }

        let next = *bot.current_path.front()?;
        match head.direction_to(&next) {
            Some(direction) if !bot.would_hit_neck(direction) => Some(direction),
            _ => {
                bot.current_path.clear();
                None
            }
        }
    }

    fn recalculate<'a>(
        bot: &mut Snake,
        others: impl IntoIterator<Item = &'a Snake>,
        food: &[Food],
        field: &FieldSize,
        rng: &mut SessionRng,
    ) -> Direction {
        bot.current_path.clear();
        let obstacles = Self::obstacles_for(bot, others);
        let head = bot.head();

        let Some(target) = Self::nearest_food(head, food) else {
            return Self::safe_random_direction(bot, &obstacles, field, rng);
        };

        match find_path(head, target.position, field, &obstacles) {
            Some(path) if !path.is_empty() => {
                let direction = head.direction_to(&path[0]);
                bot.current_path.extend(path);
                direction.unwrap_or(bot.direction)
            }
            _ => Self::safe_random_direction(bot, &obstacles, field, rng),
        }
    }

    /// Cells the bot must not enter: every segment of the other snakes and
    /// its own body behind the head.
    pub fn obstacles_for<'a>(bot: &Snake, others: impl IntoIterator<Item = &'a Snake>) -> HashSet<Point> {
        others
            .into_iter()
            .flat_map(|snake| snake.body.iter().copied())
            .chain(bot.body.iter().skip(1).copied())
            .collect()
    }

    /// Closest food by Manhattan distance; the earliest item wins a tie.
    pub fn nearest_food(from: Point, food: &[Food]) -> Option<&Food> {
        food.iter().min_by_key(|item| from.manhattan_distance(&item.position))
    }

    /// Uniform pick among non-reversing directions whose next cell is free.
    /// A trapped bot keeps its current direction.
    pub fn safe_random_direction(
        bot: &Snake,
        obstacles: &HashSet<Point>,
        field: &FieldSize,
        rng: &mut SessionRng,
    ) -> Direction {
        let head = bot.head();
        let safe: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| !d.is_opposite(&bot.direction))
            .filter(|&d| {
                let next = head.step(d);
                field.is_in_bounds(&next) && !obstacles.contains(&next)
            })
            .collect();

        rng.choose(&safe).copied().unwrap_or(bot.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snake::food::FoodType;
    use crate::snake::settings::SnakeSessionSettings;
    use crate::snake::snake::SnakeId;
    use std::collections::VecDeque;

    const NO_SNAKES: [&Snake; 0] = [];

    fn field() -> FieldSize {
        FieldSize::new(20, 20)
    }

    fn food_at(x: i32, y: i32) -> Food {
        Food::new(Point::new(x, y), FoodType::Standard, &SnakeSessionSettings::default())
    }

    fn bot_at(x: i32, y: i32, direction: Direction) -> Snake {
        Snake::new(SnakeId(1), Point::new(x, y), direction, 3, false)
    }

    #[test]
    fn test_plans_path_to_nearest_food() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        let food = vec![food_at(2, 10), food_at(10, 6)];

        let dir = BotController::update_direction(&mut bot, NO_SNAKES, &food, &field(), &mut rng);

        assert_eq!(dir, Direction::Up);
        assert_eq!(bot.next_direction, Direction::Up);
        assert_eq!(bot.current_path.len(), 4);
        assert_eq!(bot.current_path.back(), Some(&Point::new(10, 6)));
    }

    #[test]
    fn test_follows_cached_path_and_pops_completed_step() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        bot.current_path = VecDeque::from(vec![Point::new(10, 10), Point::new(10, 9), Point::new(11, 9)]);
        // No food: a recalculation would have to pick a random direction.
        let dir = BotController::update_direction(&mut bot, NO_SNAKES, &[], &field(), &mut rng);

        assert_eq!(dir, Direction::Up);
        assert_eq!(bot.current_path, VecDeque::from(vec![Point::new(10, 9), Point::new(11, 9)]));
    }

    #[test]
    fn test_neck_collision_invalidates_path() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        // The neck sits at (11, 10).
        bot.current_path = VecDeque::from(vec![Point::new(11, 10), Point::new(12, 10)]);
        let food = vec![food_at(10, 14)];

        let dir = BotController::update_direction(&mut bot, NO_SNAKES, &food, &field(), &mut rng);

        assert_eq!(dir, Direction::Down);
        assert_eq!(bot.current_path.back(), Some(&Point::new(10, 14)));
        assert!(!bot.current_path.contains(&Point::new(11, 10)));
    }

    #[test]
    fn test_non_adjacent_step_invalidates_path() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        bot.current_path = VecDeque::from(vec![Point::new(5, 5)]);
        let food = vec![food_at(7, 10)];

        let dir = BotController::update_direction(&mut bot, NO_SNAKES, &food, &field(), &mut rng);

        assert_eq!(dir, Direction::Left);
        assert_eq!(bot.current_path.len(), 3);
    }

    #[test]
    fn test_exhausted_path_triggers_replan() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        bot.current_path = VecDeque::from(vec![Point::new(10, 10)]);
        let food = vec![food_at(10, 12)];

        let dir = BotController::update_direction(&mut bot, NO_SNAKES, &food, &field(), &mut rng);

        assert_eq!(dir, Direction::Down);
        assert_eq!(bot.current_path.len(), 2);
    }

    #[test]
    fn test_path_avoids_other_snakes() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        // A vertical wall of snake between the bot and the food.
        let mut blocker = Snake::new(SnakeId(0), Point::new(7, 6), Direction::Up, 9, true);
        blocker.body = (6..=14).map(|y| Point::new(7, y)).collect();
        blocker.prev_body = blocker.body.clone();
        let food = vec![food_at(4, 10)];

        BotController::update_direction(&mut bot, [&blocker], &food, &field(), &mut rng);

        assert!(!bot.current_path.is_empty());
        assert!(bot.current_path.iter().all(|p| !blocker.occupies(p)));
        assert_eq!(bot.current_path.back(), Some(&Point::new(4, 10)));
    }

    #[test]
    fn test_unreachable_food_falls_back_to_safe_move() {
        let mut rng = SessionRng::new(42);
        let mut bot = bot_at(10, 10, Direction::Left);
        let target = Point::new(2, 2);
        let mut cage = Snake::new(SnakeId(0), Point::new(2, 1), Direction::Up, 4, true);
        cage.body = Direction::ALL.iter().map(|&d| target.step(d)).collect();
        cage.prev_body = cage.body.clone();
        let food = vec![food_at(2, 2)];

        let dir = BotController::update_direction(&mut bot, [&cage], &food, &field(), &mut rng);

        assert!(bot.current_path.is_empty());
        assert_ne!(dir, Direction::Right);
    }

    #[test]
    fn test_no_food_picks_safe_random_direction() {
        let mut rng = SessionRng::new(3);
        for _ in 0..20 {
            let mut bot = bot_at(0, 10, Direction::Left);
            let dir = BotController::update_direction(&mut bot, NO_SNAKES, &[], &field(), &mut rng);
            // Left leaves the field and right is a reversal.
            assert!(dir == Direction::Up || dir == Direction::Down);
        }
    }

    #[test]
    fn test_trapped_bot_keeps_direction() {
        let mut rng = SessionRng::new(42);
        let bot = bot_at(0, 0, Direction::Left);
        let obstacles: HashSet<Point> = [Point::new(0, 1)].into_iter().collect();
        let dir = BotController::safe_random_direction(&bot, &obstacles, &field(), &mut rng);
        assert_eq!(dir, Direction::Left);
    }

    #[test]
    fn test_obstacles_exclude_own_head_only() {
        let bot = bot_at(10, 10, Direction::Left);
        let other = Snake::new(SnakeId(0), Point::new(3, 3), Direction::Right, 3, true);
        let obstacles = BotController::obstacles_for(&bot, [&other]);

        assert!(!obstacles.contains(&bot.head()));
        assert!(obstacles.contains(&Point::new(11, 10)));
        assert!(obstacles.contains(&Point::new(12, 10)));
        assert!(obstacles.contains(&other.head()));
        assert_eq!(obstacles.len(), 5);
    }

    #[test]
    fn test_nearest_food_prefers_first_on_tie() {
        let food = vec![food_at(12, 10), food_at(8, 10), food_at(10, 15)];
        let nearest = BotController::nearest_food(Point::new(10, 10), &food).unwrap();
        assert_eq!(nearest.position, Point::new(12, 10));
    }
}
