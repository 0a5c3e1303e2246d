use crate::grid::Position;
use crossterm::style::Color;
use rand::Rng;
use std::collections::btree_map;
use std::collections::{BTreeMap, HashMap};
use uuid::Builder;

/// The color every ant gets when random colors are disabled.
pub const COLONY_COLOR: Color = Color::DarkRed;

/// What an ant is currently doing.
/// Derived from how much it carries, never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AntState {
    /// Has spare capacity and follows pheromone towards food.
    Foraging,
    /// Is full and heads straight home.
    Returning,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ant {
    id: String,
    location: Position,
    carry: usize,
    capacity: usize,
    taboo: HashMap<Position, usize>,
    color: Color,
}

impl Ant {
    /// Creates an ant with an id and (optionally) a color drawn from `rng`,
    /// so that a seeded colony produces the same ants every run.
    pub fn spawn<R: Rng + ?Sized>(
        location: Position,
        capacity: usize,
        random_color: bool,
        rng: &mut R,
    ) -> Ant {
        let id = Builder::from_random_bytes(rng.gen()).into_uuid().to_string();
        let color = match random_color {
            true => Color::Rgb {
                r: rng.gen(),
                g: rng.gen(),
                b: rng.gen(),
            },
            false => COLONY_COLOR,
        };

        Ant {
            id,
            location,
            carry: 0,
            capacity,
            taboo: HashMap::new(),
            color,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> Position {
        self.location
    }

    pub fn carry(&self) -> usize {
        self.carry
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn taboo(&self) -> &HashMap<Position, usize> {
        &self.taboo
    }

    pub fn is_full(&self) -> bool {
        self.carry >= self.capacity
    }

    pub fn state(&self) -> AntState {
        match self.is_full() {
            true => AntState::Returning,
            false => AntState::Foraging,
        }
    }

    /// Whether the ant still remembers harvesting `position`.
    pub fn is_taboo(&self, position: Position) -> bool {
        self.taboo.get(&position).is_some_and(|ticks| *ticks > 0)
    }

    pub fn can_harvest(&self, position: Position) -> bool {
        !self.is_full() && !self.is_taboo(position)
    }

    /// Counts every remembered cell down by one tick.
    pub fn age_taboo(&mut self) {
        for ticks in self.taboo.values_mut() {
            *ticks = ticks.saturating_sub(1);
        }
    }

    pub(crate) fn move_to(&mut self, location: Position) {
        self.location = location;
    }

    /// Picks up one unit from `position` and remembers the cell for `cooldown` ticks.
    pub(crate) fn load(&mut self, position: Position, cooldown: usize) {
        self.taboo.insert(position, cooldown);
        self.carry += 1;
    }

    /// Drops everything carried, returning the amount.
    pub(crate) fn unload(&mut self) -> usize {
        std::mem::take(&mut self.carry)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Food {
    location: Position,
    remaining: usize,
    capacity: usize,
}

impl Food {
    pub fn new(location: Position, capacity: usize) -> Food {
        Food {
            location,
            remaining: capacity,
            capacity,
        }
    }

    pub fn location(&self) -> Position {
        self.location
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Food sites keyed by their location.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FoodStore {
    sites: BTreeMap<Position, Food>,
}

impl FoodStore {
    pub fn new(sites: impl IntoIterator<Item = Food>) -> FoodStore {
        FoodStore {
            sites: sites.into_iter().map(|food| (food.location, food)).collect(),
        }
    }

    pub fn get(&self, position: Position) -> Option<&Food> {
        self.sites.get(&position)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.sites.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, Position, Food> {
        self.sites.values()
    }

    pub fn total_remaining(&self) -> usize {
        self.sites.values().map(|food| food.remaining).sum()
    }

    /// Takes one unit from the site at `position`.
    ///
    /// With depletion the quantity goes down (never below zero) and an emptied site is removed
    /// from the store. Without depletion the site is left untouched.
    /// Returns the quantity left at the site, or `None` if there is no site there.
    pub fn harvest(&mut self, position: Position, depletion: bool) -> Option<usize> {
        let food = self.sites.get_mut(&position)?;

        if !depletion {
            return Some(food.remaining);
        }

        food.remaining = food.remaining.saturating_sub(1);
        let remaining = food.remaining;

        if remaining == 0 {
            self.sites.remove(&position);
        }

        Some(remaining)
    }
}

impl<'a> IntoIterator for &'a FoodStore {
    type Item = &'a Food;
    type IntoIter = btree_map::Values<'a, Position, Food>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
