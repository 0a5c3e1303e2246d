use crate::grid::{Grid, Position};

/// The lowest value any cell can hold. Unexplored cells keep this baseline attraction.
pub const PHEROMONE_FLOOR: f64 = 1.0;

/// Trail strength for every cell on the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PheromoneField {
    grid: Grid<f64>,
}

impl PheromoneField {
    pub fn new(rows: usize, cols: usize) -> PheromoneField {
        PheromoneField {
            grid: Grid::new(rows, cols, PHEROMONE_FLOOR),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Returns the trail strength at `position`, or `0.0` for cells off the grid.
    pub fn get(&self, position: Position) -> f64 {
        self.grid.get(position).copied().unwrap_or(0.0)
    }

    pub fn deposit(&mut self, position: Position, amount: f64) {
        if let Some(cell) = self.grid.get_mut(position) {
            *cell += amount;
        }
    }

    /// Decays every cell by `coefficient`, then lifts anything below the floor back up to it.
    pub fn evaporate(&mut self, coefficient: f64) {
        let retained = 1.0 - coefficient;
        for cell in self.grid.values_mut() {
            *cell = (*cell * retained).max(PHEROMONE_FLOOR);
        }
    }

    /// Row-major view of all cell values.
    pub fn values(&self) -> &[f64] {
        self.grid.values()
    }

    pub fn max(&self) -> f64 {
        self.grid
            .values()
            .iter()
            .copied()
            .fold(PHEROMONE_FLOOR, f64::max)
    }
}
