use crate::config::ColonyConfig;
use crate::error::{ConfigError, LayoutError};
use crate::grid::Position;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ROWS: LazyLock<Regex> = LazyLock::new(|| header(r"rows"));
static COLS: LazyLock<Regex> = LazyLock::new(|| header(r"cols"));
static ANTS: LazyLock<Regex> = LazyLock::new(|| header(r"ants"));
static LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*m (.*)$").expect("line pattern is valid"));

fn header(name: &str) -> Regex {
    Regex::new(&format!(r"(?m)^\s*{name} (\d+)\s*$")).expect("header pattern is valid")
}

/// Where everything starts out on the grid.
///
/// Either parsed from a text map:
///
/// ```text
/// rows 3
/// cols 4
/// ants 2
/// m .*..
/// m .H.a
/// m ...*
/// ```
///
/// where `H` is home, `*` a food site, `a` an ant away from home and `.` empty ground, and the
/// optional `ants` header puts that many ants on home. Or scattered at random from a config.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub rows: usize,
    pub cols: usize,
    pub home: Position,
    /// Ant start positions in creation order: ants on home first, then the rest in row-major order.
    pub ants: Vec<Position>,
    pub food: Vec<Position>,
}

impl Layout {
    pub fn parse(contents: &str) -> Result<Layout, LayoutError> {
        let rows =
            header_value(&ROWS, "rows", contents)?.ok_or(LayoutError::MissingHeader("rows"))?;
        let cols =
            header_value(&COLS, "cols", contents)?.ok_or(LayoutError::MissingHeader("cols"))?;
        let ants_on_home = header_value(&ANTS, "ants", contents)?.unwrap_or(0);

        if rows == 0 || cols == 0 {
            return Err(LayoutError::EmptyGrid { rows, cols });
        }

        let lines: Vec<&str> = LINE
            .captures_iter(contents)
            .filter_map(|captures| captures.get(1))
            .map(|line| line.as_str().trim())
            .collect();

        if lines.len() != rows {
            return Err(LayoutError::RowCount {
                expected: rows,
                found: lines.len(),
            });
        }

        let mut home = None;
        let mut others = Vec::new();
        let mut food = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(LayoutError::ColumnCount {
                    row,
                    expected: cols,
                    found,
                });
            }

            for (col, value) in line.chars().enumerate() {
                let position = Position::new(row, col);
                match value {
                    '.' => {}
                    '*' => food.push(position),
                    'a' => others.push(position),
                    'H' => {
                        if home.is_some() {
                            return Err(LayoutError::DuplicateHome(position));
                        }
                        home = Some(position);
                    }
                    _ => return Err(LayoutError::UnknownCell { value, position }),
                }
            }
        }

        let home = home.ok_or(LayoutError::MissingHome)?;

        // Every row was read, so the cell count fits
        let available = rows * cols;
        let required = ants_on_home.saturating_add(others.len());
        if required > available {
            return Err(ConfigError::NotEnoughCells {
                required,
                available,
            }
            .into());
        }

        let mut ants = vec![home; ants_on_home];
        ants.extend(others);

        Ok(Layout {
            rows,
            cols,
            home,
            ants,
            food,
        })
    }

    /// Scatters food over distinct cells other than home.
    /// Ants start on home, or on distinct free cells when `random_ant_placement` is set.
    ///
    /// Expects a config that already passed validation.
    pub fn scatter<R: Rng + ?Sized>(config: &ColonyConfig, rng: &mut R) -> Layout {
        let home = config.home_position();
        let free: Vec<Position> = (0..config.rows)
            .flat_map(|row| (0..config.cols).map(move |col| Position::new(row, col)))
            .filter(|position| *position != home)
            .collect();

        let food: Vec<Position> = free
            .choose_multiple(rng, config.food_site_count)
            .cloned()
            .collect();

        let ants = match config.random_ant_placement {
            true => {
                let taken: HashSet<Position> = food.iter().copied().collect();
                let open: Vec<Position> = free
                    .into_iter()
                    .filter(|position| !taken.contains(position))
                    .collect();
                open.choose_multiple(rng, config.ant_count)
                    .cloned()
                    .collect()
            }
            false => vec![home; config.ant_count],
        };

        Layout {
            rows: config.rows,
            cols: config.cols,
            home,
            ants,
            food,
        }
    }

    /// Copies the layout's shape into `config`, so validation and accessors agree with the map.
    pub fn apply_to(&self, config: &mut ColonyConfig) {
        config.rows = self.rows;
        config.cols = self.cols;
        config.home = Some(self.home);
        config.ant_count = self.ants.len();
        config.food_site_count = self.food.len();
        config.random_ant_placement = false;
    }
}

fn header_value(
    pattern: &Regex,
    name: &'static str,
    contents: &str,
) -> Result<Option<usize>, LayoutError> {
    let Some(value) = pattern.captures(contents).and_then(|captures| captures.get(1)) else {
        return Ok(None);
    };

    value
        .as_str()
        .parse()
        .map(Some)
        .map_err(|_| LayoutError::InvalidHeader {
            name,
            value: value.as_str().to_string(),
        })
}
