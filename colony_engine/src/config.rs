use crate::error::ConfigError;
use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// When an ant leaves pheromone behind after moving.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// Only ants at full capacity mark their trail, rewarding the way back from food.
    #[default]
    OnFullCarry,
    /// Every move marks the cell the ant lands on.
    EveryMove,
}

/// Everything needed to build a colony.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ColonyConfig {
    pub rows: usize,
    pub cols: usize,
    pub ant_count: usize,
    pub food_site_count: usize,
    /// Maximum units of food a single ant can carry.
    pub carry_capacity: usize,
    /// Initial units of food at each site.
    pub food_capacity: usize,
    /// Drop-off cell. `None` puts home at the center of the grid.
    pub home: Option<Position>,
    pub pheromone_deposit: f64,
    /// Fraction of pheromone removed from every cell on each tick.
    pub evaporation_coefficient: f64,
    /// Whether harvesting permanently reduces the food at a site.
    pub food_depletion: bool,
    pub random_agent_color: bool,
    /// Scatter ants over random free cells instead of starting them all on home.
    pub random_ant_placement: bool,
    /// Ticks before an ant may harvest the same cell again.
    pub taboo_cooldown: usize,
    pub deposit_policy: DepositPolicy,
    /// Seed for the random source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for ColonyConfig {
    fn default() -> ColonyConfig {
        ColonyConfig {
            rows: 20,
            cols: 20,
            ant_count: 25,
            food_site_count: 10,
            carry_capacity: 3,
            food_capacity: 10,
            home: None,
            pheromone_deposit: 100.0,
            evaporation_coefficient: 0.1,
            food_depletion: true,
            random_agent_color: false,
            random_ant_placement: false,
            taboo_cooldown: 5,
            deposit_policy: DepositPolicy::OnFullCarry,
            seed: None,
        }
    }
}

impl ColonyConfig {
    pub fn from_json_str(json: &str) -> Result<ColonyConfig, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<ColonyConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        ColonyConfig::from_json_str(&contents)
    }

    /// The configured home, or the grid center when none is set.
    pub fn home_position(&self) -> Position {
        self.home
            .unwrap_or(Position::new(self.rows / 2, self.cols / 2))
    }

    /// Number of cells on the grid, or `None` when it does not fit in a `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Checks every construction rule and reports the first one that is broken.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let available = self.cells().ok_or(ConfigError::GridTooLarge {
            rows: self.rows,
            cols: self.cols,
        })?;

        if self.carry_capacity == 0 {
            return Err(ConfigError::ZeroCarryCapacity);
        }

        if self.food_capacity == 0 {
            return Err(ConfigError::ZeroFoodCapacity);
        }

        if !self.pheromone_deposit.is_finite() || self.pheromone_deposit <= 0.0 {
            return Err(ConfigError::InvalidPheromoneDeposit(
                self.pheromone_deposit,
            ));
        }

        if !(0.0..1.0).contains(&self.evaporation_coefficient) {
            return Err(ConfigError::InvalidEvaporation(
                self.evaporation_coefficient,
            ));
        }

        let home = self.home_position();
        if home.row >= self.rows || home.col >= self.cols {
            return Err(ConfigError::HomeOutOfBounds {
                home,
                rows: self.rows,
                cols: self.cols,
            });
        }

        // Food never sits on home, and scattered ants need a cell of their own
        let occupied = self.ant_count.saturating_add(self.food_site_count);
        let required = match self.random_ant_placement {
            true => occupied.saturating_add(1),
            false => occupied.max(self.food_site_count.saturating_add(1)),
        };
        if required > available {
            return Err(ConfigError::NotEnoughCells {
                required,
                available,
            });
        }

        Ok(())
    }
}
