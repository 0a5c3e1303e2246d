//! Terminal driver for the foraging simulation.
//!
//! Builds a colony from a JSON config and/or a text layout, then steps it until every unit of
//! food is home (or nothing more can be collected), drawing the grid after each tick.

mod render;

use anyhow::{Context, Result};
use clap::Parser;
use colony_engine::{Colony, ColonyConfig, DepositPolicy};
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "colony", version, about = "Ant colony foraging simulation")]
struct Cli {
    /// JSON file with the colony configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Text layout placing home, food and ants (overrides the grid settings)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    /// Number of ants
    #[arg(long)]
    ants: Option<usize>,

    /// Number of food sites
    #[arg(long)]
    food: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Deposit pheromone on every move instead of only when full
    #[arg(long)]
    deposit_every_move: bool,

    /// Harvesting does not reduce the food at a site
    #[arg(long)]
    no_depletion: bool,

    /// Give every ant its own random color
    #[arg(long)]
    random_colors: bool,

    /// Stop after this many ticks even if the colony is not finished
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Pause between ticks, in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Print the plain text grid instead of drawing in color
    #[arg(long)]
    plain: bool,

    /// Do not render the grid
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// The config file (or the defaults), with command line flags applied on top.
    fn colony_config(&self) -> Result<ColonyConfig> {
        let mut config = match &self.config {
            Some(path) => ColonyConfig::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ColonyConfig::default(),
        };

        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(ants) = self.ants {
            config.ant_count = ants;
        }
        if let Some(food) = self.food {
            config.food_site_count = food;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.deposit_every_move {
            config.deposit_policy = DepositPolicy::EveryMove;
        }
        if self.no_depletion {
            config.food_depletion = false;
        }
        if self.random_colors {
            config.random_agent_color = true;
        }

        Ok(config)
    }

    fn build_colony(&self) -> Result<Colony> {
        let config = self.colony_config()?;

        let colony = match &self.layout {
            Some(path) => {
                let layout = fs::read_to_string(path)
                    .with_context(|| format!("reading layout from {}", path.display()))?;
                Colony::from_layout(&layout, config)?
            }
            None => Colony::new(config)?,
        };

        Ok(colony)
    }

    fn render(&self, colony: &Colony) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.plain {
            println!("{}", render::grid_text(colony));
            println!("{} {}", colony.brought_food(), colony.remaining_food());
            return Ok(());
        }

        render::draw(colony).context("drawing the colony")
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut colony = cli.build_colony()?;
    let delay = Duration::from_millis(cli.delay_ms);

    cli.render(&colony)?;
    while !colony.is_finished() && colony.tick() < cli.max_ticks {
        colony.step();
        cli.render(&colony)?;

        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    if colony.is_finished() {
        info!(
            ticks = colony.tick(),
            brought = colony.brought_food(),
            total = colony.total_initial_food(),
            "colony finished"
        );
    } else {
        warn!(
            ticks = colony.tick(),
            brought = colony.brought_food(),
            remaining = colony.remaining_food(),
            carried = colony.carried_food(),
            "tick limit reached before the colony finished"
        );
    }

    Ok(())
}
