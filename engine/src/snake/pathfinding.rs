use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::types::{Direction, FieldSize, Point};

#[derive(Copy, Clone, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    g: u32,
    position: Point,
}

// BinaryHeap is a max-heap, so the comparison is inverted: lowest f first,
// then lowest h, then position for a stable order.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: Point, b: Point) -> u32 {
    a.manhattan_distance(&b)
}

/// A* search over the 4-connected field with unit step cost.
///
/// Returns the cells to travel through in order, excluding `start` and ending
/// at `target`. `None` means the target is currently unreachable: out of
/// bounds, itself an obstacle, or walled off. A start equal to the target
/// yields an empty path.
pub fn find_path(
    start: Point,
    target: Point,
    field: &FieldSize,
    obstacles: &HashSet<Point>,
) -> Option<Vec<Point>> {
    if !field.is_in_bounds(&target) || obstacles.contains(&target) {
        return None;
    }

    let mut open = BinaryHeap::new();
    let mut closed: HashSet<Point> = HashSet::new();
    let mut came_from: HashMap<Point, Point> = HashMap::new();
    let mut g_score: HashMap<Point, u32> = HashMap::new();

    let start_h = heuristic(start, target);
    g_score.insert(start, 0);
    open.push(OpenNode {
        f: start_h,
        h: start_h,
        g: 0,
        position: start,
    });

    while let Some(current) = open.pop() {
        if current.position == target {
            return Some(reconstruct_path(&came_from, start, target));
        }

        // Stale duplicate left behind by a later improvement.
        if !closed.insert(current.position) {
            continue;
        }

        for direction in Direction::ALL {
            let neighbor = current.position.step(direction);
            if !field.is_in_bounds(&neighbor)
                || obstacles.contains(&neighbor)
                || closed.contains(&neighbor)
            {
                continue;
            }

            let tentative_g = current.g + 1;
            let improves = g_score
                .get(&neighbor)
                .is_none_or(|&known| tentative_g < known);
            if !improves {
                continue;
            }

            came_from.insert(neighbor, current.position);
            g_score.insert(neighbor, tentative_g);
            let h = heuristic(neighbor, target);
            open.push(OpenNode {
                f: tentative_g + h,
                h,
                g: tentative_g,
                position: neighbor,
            });
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<Point, Point>, start: Point, target: Point) -> Vec<Point> {
    let mut path = Vec::new();
    let mut current = target;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}
