//! Movement policy for a single ant.
//!
//! Each tick an ant scores its eight neighbors, in the scan order of [`Direction::ALL`], and
//! then samples one of them in proportion to its score. The first matching rule decides the
//! score of a neighbor:
//!
//! 1. Off the grid: `0`.
//! 2. Home: if the ant carries anything it goes home, no questions asked (the result is
//!    one-hot on that direction and the scan stops). An empty-handed ant never steps on home.
//! 3. Food: the remaining quantity, as long as the ant may harvest it (not taboo, spare
//!    capacity, no other ant standing on it). The first such cell switches the scan into
//!    food mode, wiping every score assigned so far.
//! 4. Another ant, or food mode already active: `0`.
//! 5. Anything else: the pheromone value of the cell.
//!
//! Full ants, and every ant once the world has run out of food, then go through the homeward
//! filter: moves that take them further from home are dropped and the rest are flattened to
//! `1` so they beeline back.

use crate::entities::{Ant, FoodStore};
use crate::grid::{Direction, Grid, Position};
use crate::pheromone::PheromoneField;
use rand::Rng;

/// Weight vector aligned with [`Direction::ALL`].
pub type Weights = [f64; 8];

/// Read-only view of the world as seen by the ant being moved.
pub struct Surroundings<'a> {
    pub pheromones: &'a PheromoneField,
    /// Number of ants standing on each cell.
    pub occupancy: &'a Grid<usize>,
    pub food: &'a FoodStore,
    pub home: Position,
    /// No food is left anywhere in the world.
    pub food_exhausted: bool,
}

impl Surroundings<'_> {
    fn is_occupied(&self, position: Position) -> bool {
        self.occupancy.get(position).is_some_and(|ants| *ants > 0)
    }
}

pub fn movement_weights(ant: &Ant, surroundings: &Surroundings) -> Weights {
    let rows = surroundings.pheromones.rows();
    let cols = surroundings.pheromones.cols();
    let center = ant.location();

    let mut weights = [0.0; 8];
    let mut food_mode = false;

    for (index, direction) in Direction::ALL.iter().enumerate() {
        let Some(cell) = center.neighbor(*direction, rows, cols) else {
            continue;
        };

        if cell == surroundings.home {
            if ant.carry() > 0 {
                let mut forced = [0.0; 8];
                forced[index] = 1.0;
                return forced;
            }
            continue;
        }

        if let Some(food) = surroundings.food.get(cell) {
            if food.remaining() > 0 && ant.can_harvest(cell) && !surroundings.is_occupied(cell) {
                if !food_mode {
                    weights = [0.0; 8];
                    food_mode = true;
                }
                weights[index] = food.remaining() as f64;
            }
            continue;
        }

        if food_mode || surroundings.is_occupied(cell) {
            continue;
        }

        weights[index] = surroundings.pheromones.get(cell);
    }

    if ant.is_full() || surroundings.food_exhausted {
        homeward_filter(&mut weights, center, surroundings.home, rows, cols);
    }

    weights
}

/// Keeps only the moves that do not increase the distance to home, all with equal weight.
fn homeward_filter(weights: &mut Weights, center: Position, home: Position, rows: usize, cols: usize) {
    let distance = center.manhattan(home);

    for (weight, direction) in weights.iter_mut().zip(Direction::ALL) {
        if *weight <= 0.0 {
            continue;
        }

        *weight = match center.neighbor(direction, rows, cols) {
            Some(cell) if cell.manhattan(home) <= distance => 1.0,
            _ => 0.0,
        };
    }
}

/// Samples a direction with probability proportional to its weight.
///
/// Returns `None` when no direction has a positive weight, i.e. the ant stays put.
pub fn choose_direction<R: Rng + ?Sized>(weights: &Weights, rng: &mut R) -> Option<Direction> {
    let total: f64 = weights.iter().filter(|weight| **weight > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let target = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last = None;

    for (weight, direction) in weights.iter().zip(Direction::ALL) {
        if *weight <= 0.0 {
            continue;
        }

        cumulative += weight;
        last = Some(direction);

        if target < cumulative {
            return last;
        }
    }

    // Rounding can leave `target` a hair above the final cumulative sum
    last
}
