//! # colony_engine
//!
//! A foraging simulation inspired by ant colony optimization.
//! Ants leave home, follow pheromone towards food, carry it back and mark their trail,
//! which evaporates over time.
//!
//! The engine is driven from the outside: call [`Colony::step`] until [`Colony::is_finished`]
//! and read the state through the accessors in between.

pub mod colony;
pub use colony::Colony;

pub mod config;
pub use config::{ColonyConfig, DepositPolicy};

pub mod entities;
pub use entities::{Ant, AntState, Food, FoodStore};

pub mod error;
pub use error::{ConfigError, LayoutError};

pub mod grid;
pub use grid::{Direction, Position};

pub mod movement;
pub mod pheromone;
pub use pheromone::PheromoneField;

mod layout;
pub use layout::Layout;

#[cfg(feature = "python")]
mod python;
