use crate::{Colony, ColonyConfig, ConfigError};
use crossterm::style::Color;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// The colony as seen from Python.
#[pyclass(name = "Colony", module = "colony_engine")]
pub struct PyColony {
    inner: Colony,
}

/// Represents an ant in the colony.
#[derive(Clone)]
#[pyclass(name = "Ant", module = "colony_engine", get_all)]
pub struct PyAnt {
    /// The unique identifier for the ant.
    pub id: String,
    pub row: usize,
    pub col: usize,
    /// Units of food the ant is holding.
    pub carry: usize,
    pub capacity: usize,
    /// `#rrggbb` for random colors, the color name otherwise.
    pub color: String,
}

/// Represents a food site in the colony.
#[derive(Clone)]
#[pyclass(name = "Food", module = "colony_engine", get_all)]
pub struct PyFood {
    pub row: usize,
    pub col: usize,
    pub remaining: usize,
    pub capacity: usize,
}

#[pymethods]
impl PyColony {
    /// Creates a new colony.
    ///
    /// # Arguments
    /// * `config` - The configuration as a JSON string. Missing fields take their defaults.
    /// * `layout` - A text layout placing home, food and ants. If `None`, food is placed randomly.
    #[new]
    #[pyo3(signature = (config=None, layout=None))]
    pub fn new(config: Option<&str>, layout: Option<&str>) -> PyResult<PyColony> {
        let config = match config {
            Some(json) => ColonyConfig::from_json_str(json).map_err(to_py_error)?,
            None => ColonyConfig::default(),
        };

        let inner = match layout {
            Some(layout) => Colony::from_layout(layout, config)
                .map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => Colony::new(config).map_err(to_py_error)?,
        };

        Ok(PyColony { inner })
    }

    /// Advances one tick and returns the food left at the sites.
    pub fn step(&mut self) -> usize {
        self.inner.step()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    #[getter]
    pub fn tick(&self) -> u64 {
        self.inner.tick()
    }

    #[getter]
    pub fn home(&self) -> (usize, usize) {
        let home = self.inner.home();
        (home.row, home.col)
    }

    #[getter]
    pub fn brought_food(&self) -> usize {
        self.inner.brought_food()
    }

    #[getter]
    pub fn total_initial_food(&self) -> usize {
        self.inner.total_initial_food()
    }

    pub fn ants(&self) -> Vec<PyAnt> {
        self.inner
            .ants()
            .iter()
            .map(|ant| PyAnt {
                id: ant.id().to_string(),
                row: ant.location().row,
                col: ant.location().col,
                carry: ant.carry(),
                capacity: ant.capacity(),
                color: color_name(ant.color()),
            })
            .collect()
    }

    pub fn food(&self) -> Vec<PyFood> {
        self.inner
            .food()
            .iter()
            .map(|food| PyFood {
                row: food.location().row,
                col: food.location().col,
                remaining: food.remaining(),
                capacity: food.capacity(),
            })
            .collect()
    }

    /// The pheromone field as a list of rows.
    pub fn pheromones(&self) -> Vec<Vec<f64>> {
        self.inner
            .pheromones()
            .values()
            .chunks(self.inner.cols())
            .map(|row| row.to_vec())
            .collect()
    }
}

fn color_name(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("#{r:02x}{g:02x}{b:02x}"),
        color => format!("{color:?}"),
    }
}

fn to_py_error(error: ConfigError) -> PyErr {
    PyValueError::new_err(error.to_string())
}

#[pymodule]
fn colony_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyColony>()?;
    m.add_class::<PyAnt>()?;
    m.add_class::<PyFood>()?;
    Ok(())
}
