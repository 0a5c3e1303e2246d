use crate::config::{ColonyConfig, DepositPolicy};
use crate::entities::{Ant, Food, FoodStore};
use crate::error::{ConfigError, LayoutError};
use crate::grid::{Grid, Position};
use crate::layout::Layout;
use crate::movement::{choose_direction, movement_weights, Surroundings};
use crate::pheromone::PheromoneField;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

/// The foraging simulation.
/// Owns every piece of mutable state and only changes it through [`Colony::step`].
pub struct Colony<R = StdRng> {
    config: ColonyConfig,
    pheromones: PheromoneField,
    occupancy: Grid<usize>,
    food: FoodStore,
    ants: Vec<Ant>,
    home: Position,
    brought_food: usize,
    total_initial_food: usize,
    tick: u64,
    rng: R,
}

impl Colony<StdRng> {
    /// Creates a colony with randomly placed food.
    /// The random source is seeded from `config.seed`, or from entropy when there is none.
    pub fn new(config: ColonyConfig) -> Result<Colony<StdRng>, ConfigError> {
        let rng = seeded_rng(config.seed);
        Colony::with_rng(config, rng)
    }

    /// Creates a colony from a text layout. See [`Layout`] for the format.
    pub fn from_layout(layout: &str, config: ColonyConfig) -> Result<Colony<StdRng>, LayoutError> {
        let rng = seeded_rng(config.seed);
        Colony::from_layout_with_rng(layout, config, rng)
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl<R: Rng> Colony<R> {
    /// Creates a colony with randomly placed food, drawing every random choice from `rng`.
    pub fn with_rng(config: ColonyConfig, mut rng: R) -> Result<Colony<R>, ConfigError> {
        config.validate()?;
        let layout = Layout::scatter(&config, &mut rng);
        Ok(Colony::assemble(config, layout, rng))
    }

    pub fn from_layout_with_rng(
        layout: &str,
        mut config: ColonyConfig,
        rng: R,
    ) -> Result<Colony<R>, LayoutError> {
        let layout = Layout::parse(layout)?;
        layout.apply_to(&mut config);
        config.validate()?;
        Ok(Colony::assemble(config, layout, rng))
    }

    fn assemble(config: ColonyConfig, layout: Layout, mut rng: R) -> Colony<R> {
        let mut occupancy = Grid::new(layout.rows, layout.cols, 0);
        let ants: Vec<Ant> = layout
            .ants
            .iter()
            .map(|location| {
                if let Some(count) = occupancy.get_mut(*location) {
                    *count += 1;
                }
                Ant::spawn(
                    *location,
                    config.carry_capacity,
                    config.random_agent_color,
                    &mut rng,
                )
            })
            .collect();

        let food = FoodStore::new(
            layout
                .food
                .iter()
                .map(|location| Food::new(*location, config.food_capacity)),
        );
        let total_initial_food = food.total_remaining();

        info!(
            rows = layout.rows,
            cols = layout.cols,
            ants = ants.len(),
            food_sites = food.len(),
            total_food = total_initial_food,
            home = %layout.home,
            "colony created"
        );

        Colony {
            pheromones: PheromoneField::new(layout.rows, layout.cols),
            occupancy,
            food,
            ants,
            home: layout.home,
            brought_food: 0,
            total_initial_food,
            tick: 0,
            rng,
            config,
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Every ant moves once, in creation order, and each sees the pheromone left by the ants
    /// before it in the same tick. The field then evaporates once.
    /// Returns the food still left at the sites.
    pub fn step(&mut self) -> usize {
        self.tick += 1;

        for index in 0..self.ants.len() {
            self.move_ant(index);
        }

        self.pheromones.evaporate(self.config.evaporation_coefficient);

        let remaining = self.food.total_remaining();
        debug!(
            tick = self.tick,
            remaining,
            brought = self.brought_food,
            carried = self.carried_food(),
            "tick complete"
        );

        remaining
    }

    /// Whether all food made it home, or nothing is left to collect and nobody is carrying any.
    pub fn is_finished(&self) -> bool {
        if self.brought_food == self.total_initial_food {
            return true;
        }

        self.food.is_empty() && self.ants.iter().all(|ant| ant.carry() == 0)
    }

    fn move_ant(&mut self, index: usize) {
        self.ants[index].age_taboo();

        let weights = {
            let surroundings = Surroundings {
                pheromones: &self.pheromones,
                occupancy: &self.occupancy,
                food: &self.food,
                home: self.home,
                food_exhausted: self.food.total_remaining() == 0,
            };
            movement_weights(&self.ants[index], &surroundings)
        };

        let Some(direction) = choose_direction(&weights, &mut self.rng) else {
            trace!(ant = index, "ant has nowhere to go");
            return;
        };

        let from = self.ants[index].location();
        let Some(to) = from.neighbor(direction, self.pheromones.rows(), self.pheromones.cols())
        else {
            return;
        };

        if let Some(count) = self.occupancy.get_mut(from) {
            *count = count.saturating_sub(1);
        }
        if let Some(count) = self.occupancy.get_mut(to) {
            *count += 1;
        }

        let ant = &mut self.ants[index];
        ant.move_to(to);
        trace!(ant = index, from = %from, to = %to, "ant moved");

        if self.food.contains(to) {
            if ant.can_harvest(to) {
                ant.load(to, self.config.taboo_cooldown);
                let left = self.food.harvest(to, self.config.food_depletion);
                debug!(
                    ant = index,
                    site = %to,
                    carry = ant.carry(),
                    left = ?left,
                    "food harvested"
                );
            }
        } else if to == self.home {
            let delivered = ant.unload();
            self.brought_food += delivered;
            debug!(
                ant = index,
                delivered,
                brought = self.brought_food,
                "food delivered"
            );
        }

        let deposit = match self.config.deposit_policy {
            DepositPolicy::OnFullCarry => ant.is_full(),
            DepositPolicy::EveryMove => true,
        };
        if deposit {
            self.pheromones.deposit(to, self.config.pheromone_deposit);
        }
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    pub fn rows(&self) -> usize {
        self.pheromones.rows()
    }

    pub fn cols(&self) -> usize {
        self.pheromones.cols()
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Ants in creation order, which is also the order they move in.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn food(&self) -> &FoodStore {
        &self.food
    }

    pub fn pheromones(&self) -> &PheromoneField {
        &self.pheromones
    }

    pub fn home(&self) -> Position {
        self.home
    }

    pub fn brought_food(&self) -> usize {
        self.brought_food
    }

    pub fn total_initial_food(&self) -> usize {
        self.total_initial_food
    }

    pub fn remaining_food(&self) -> usize {
        self.food.total_remaining()
    }

    pub fn carried_food(&self) -> usize {
        self.ants.iter().map(Ant::carry).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AntState;
    use crate::pheromone::PHEROMONE_FLOOR;
    use std::collections::{HashMap, HashSet};

    fn config() -> ColonyConfig {
        ColonyConfig {
            seed: Some(0),
            ..ColonyConfig::default()
        }
    }

    fn colony(layout: &str, config: ColonyConfig) -> Colony {
        Colony::from_layout(layout, config).unwrap()
    }

    fn assert_conservation(colony: &Colony) {
        assert_eq!(
            colony.brought_food() + colony.remaining_food() + colony.carried_food(),
            colony.total_initial_food(),
            "food was created or lost on tick {}",
            colony.tick()
        );
    }

    #[test]
    fn when_creating_a_colony_ants_start_on_home_and_food_is_placed_elsewhere() {
        let colony = Colony::new(config()).unwrap();

        assert_eq!(colony.ants().len(), 25);
        assert!(colony.ants().iter().all(|ant| ant.location() == colony.home()));
        assert_eq!(colony.home(), Position::new(10, 10));
        assert_eq!(colony.food().len(), 10);
        assert!(!colony.food().contains(colony.home()));
        assert_eq!(colony.total_initial_food(), 100);
        assert_eq!(colony.brought_food(), 0);
        assert_eq!(colony.tick(), 0);
    }

    #[test]
    fn when_creating_a_colony_with_too_many_entities_construction_fails() {
        let config = ColonyConfig {
            rows: 2,
            cols: 2,
            ant_count: 3,
            food_site_count: 2,
            ..config()
        };

        assert!(matches!(
            Colony::new(config),
            Err(ConfigError::NotEnoughCells { .. })
        ));
    }

    #[test]
    fn when_creating_a_colony_from_an_invalid_layout_construction_fails() {
        let result = Colony::from_layout("rows 1\ncols 1\nm *", config());
        assert!(matches!(result, Err(LayoutError::MissingHome)));

        let layout = "\
            rows 1
            cols 2
            ants 1
            m H*";
        let config = ColonyConfig {
            food_capacity: 0,
            ..config()
        };
        assert!(matches!(
            Colony::from_layout(layout, config),
            Err(LayoutError::Config(ConfigError::ZeroFoodCapacity))
        ));
    }

    #[test]
    fn when_the_same_seed_is_used_two_colonies_evolve_identically() {
        let mut first = Colony::new(config()).unwrap();
        let mut second = Colony::new(config()).unwrap();

        for _ in 0..50 {
            assert_eq!(first.step(), second.step());
        }

        let first_locations: Vec<Position> = first.ants().iter().map(Ant::location).collect();
        let second_locations: Vec<Position> = second.ants().iter().map(Ant::location).collect();
        assert_eq!(first_locations, second_locations);
        assert_eq!(first.pheromones(), second.pheromones());
        assert_eq!(first.brought_food(), second.brought_food());
    }

    #[test]
    fn when_food_sits_next_to_home_a_single_ant_brings_it_back() {
        let layout = "\
            rows 5
            cols 5
            ants 1
            m .....
            m .....
            m ..H*.
            m .....
            m .....";
        let config = ColonyConfig {
            food_capacity: 1,
            ..config()
        };
        let mut colony = colony(layout, config);

        assert_eq!(colony.step(), 0);
        assert_eq!(colony.ants()[0].location(), Position::new(2, 3));
        assert_eq!(colony.ants()[0].carry(), 1);
        assert!(colony.food().is_empty());

        colony.step();
        assert_eq!(colony.ants()[0].location(), Position::new(2, 2));
        assert_eq!(colony.brought_food(), 1);
        assert!(colony.is_finished());
    }

    #[test]
    fn when_food_is_next_to_home_the_colony_finishes_within_a_few_ticks() {
        let layout = "\
            rows 5
            cols 5
            ants 1
            m .....
            m .....
            m ..H..
            m ...*.
            m .....";
        let config = ColonyConfig {
            food_capacity: 1,
            ..config()
        };

        for seed in 0..10 {
            let mut colony = Colony::from_layout_with_rng(
                layout,
                config.clone(),
                StdRng::seed_from_u64(seed),
            )
            .unwrap();

            let mut ticks = 0;
            while !colony.is_finished() && ticks < 10 {
                colony.step();
                ticks += 1;
            }

            assert!(colony.is_finished());
            assert_eq!(colony.brought_food(), 1);
            assert!(colony.food().is_empty());
            assert_eq!(ticks, 2);
        }
    }

    #[test]
    fn when_a_cell_was_harvested_the_same_ant_waits_out_the_cooldown() {
        let layout = "\
            rows 1
            cols 3
            m a*H";
        let config = ColonyConfig {
            carry_capacity: 10,
            food_depletion: false,
            ..config()
        };
        let mut colony = colony(layout, config);
        let food = Position::new(0, 1);
        let home = Position::new(0, 2);

        // Harvest, then the loaded ant is pulled home
        colony.step();
        assert_eq!(colony.ants()[0].location(), food);
        assert_eq!(colony.ants()[0].carry(), 1);

        colony.step();
        assert_eq!(colony.ants()[0].location(), home);
        assert_eq!(colony.brought_food(), 1);

        // The only way out is the taboo cell, so the ant waits on home
        for _ in 0..3 {
            colony.step();
            assert_eq!(colony.ants()[0].location(), home);
            assert_eq!(colony.ants()[0].carry(), 0);
        }

        // Five ticks after the harvest the cell is fair game again
        colony.step();
        assert_eq!(colony.tick(), 6);
        assert_eq!(colony.ants()[0].location(), food);
        assert_eq!(colony.ants()[0].carry(), 1);
        assert_eq!(colony.food().get(food).map(Food::remaining), Some(10));
    }

    #[test]
    fn when_depletion_is_disabled_food_never_runs_out() {
        let layout = "\
            rows 3
            cols 3
            ants 2
            m *..
            m .H.
            m ..*";
        let config = ColonyConfig {
            food_depletion: false,
            ..config()
        };
        let mut colony = colony(layout, config);

        for _ in 0..100 {
            assert_eq!(colony.step(), 20);
        }
        assert_eq!(colony.food().len(), 2);
        assert!(colony.brought_food() > 0);
    }

    #[test]
    fn when_stepping_food_is_conserved_every_tick() {
        for seed in 0..5 {
            let config = ColonyConfig {
                rows: 12,
                cols: 12,
                ant_count: 15,
                food_site_count: 6,
                food_capacity: 4,
                seed: Some(seed),
                ..ColonyConfig::default()
            };
            let mut colony = Colony::new(config).unwrap();

            for _ in 0..300 {
                colony.step();
                assert_conservation(&colony);
            }
        }
    }

    #[test]
    fn when_stepping_with_every_move_deposits_food_is_still_conserved() {
        let config = ColonyConfig {
            rows: 10,
            cols: 10,
            ant_count: 10,
            food_site_count: 5,
            deposit_policy: DepositPolicy::EveryMove,
            random_ant_placement: true,
            random_agent_color: true,
            seed: Some(3),
            ..ColonyConfig::default()
        };
        let mut colony = Colony::new(config).unwrap();

        for _ in 0..300 {
            colony.step();
            assert_conservation(&colony);
        }
    }

    #[test]
    fn when_stepping_the_pheromone_field_never_drops_below_the_floor() {
        let mut colony = Colony::new(ColonyConfig {
            rows: 8,
            cols: 8,
            ant_count: 10,
            food_site_count: 4,
            evaporation_coefficient: 0.9,
            ..config()
        })
        .unwrap();

        for _ in 0..200 {
            colony.step();
            assert!(colony
                .pheromones()
                .values()
                .iter()
                .all(|value| *value >= PHEROMONE_FLOOR));
        }
    }

    #[test]
    fn when_stepping_food_sites_only_shrink() {
        let mut colony = Colony::new(ColonyConfig {
            rows: 10,
            cols: 10,
            ant_count: 12,
            food_site_count: 8,
            food_capacity: 6,
            ..config()
        })
        .unwrap();

        let mut previous: HashMap<Position, usize> = colony
            .food()
            .iter()
            .map(|food| (food.location(), food.remaining()))
            .collect();

        for _ in 0..300 {
            colony.step();
            for food in colony.food() {
                let before = previous.get(&food.location()).copied();
                assert!(before.is_some_and(|before| food.remaining() <= before));
                assert!(food.remaining() > 0);
            }
            previous = colony
                .food()
                .iter()
                .map(|food| (food.location(), food.remaining()))
                .collect();
        }
    }

    #[test]
    fn when_stepping_no_two_ants_share_a_cell_away_from_home() {
        for seed in 0..5 {
            let mut colony = Colony::new(ColonyConfig {
                rows: 8,
                cols: 8,
                ant_count: 20,
                food_site_count: 6,
                seed: Some(seed),
                ..ColonyConfig::default()
            })
            .unwrap();

            for _ in 0..200 {
                colony.step();
                let mut seen = HashSet::new();
                for ant in colony.ants() {
                    if ant.location() != colony.home() {
                        assert!(
                            seen.insert(ant.location()),
                            "two ants on {} at tick {}",
                            ant.location(),
                            colony.tick()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn when_stepping_carry_never_exceeds_capacity() {
        let mut colony = Colony::new(ColonyConfig {
            rows: 10,
            cols: 10,
            ant_count: 10,
            food_site_count: 8,
            carry_capacity: 2,
            ..config()
        })
        .unwrap();

        for _ in 0..300 {
            colony.step();
            for ant in colony.ants() {
                assert!(ant.carry() <= ant.capacity());
                if ant.carry() == ant.capacity() {
                    assert_eq!(ant.state(), AntState::Returning);
                }
            }
        }
    }

    #[test]
    fn when_a_full_ant_moves_it_marks_its_trail() {
        let layout = "\
            rows 1
            cols 4
            m H.a*";
        let config = ColonyConfig {
            carry_capacity: 1,
            evaporation_coefficient: 0.0,
            pheromone_deposit: 10.0,
            ..config()
        };
        let mut colony = colony(layout, config);

        // Picking up fills the ant, so the food cell gets marked
        colony.step();
        assert_eq!(colony.ants()[0].location(), Position::new(0, 3));
        assert_eq!(colony.pheromones().get(Position::new(0, 3)), 11.0);

        // On the way home it keeps marking
        colony.step();
        assert_eq!(colony.ants()[0].location(), Position::new(0, 2));
        assert_eq!(colony.pheromones().get(Position::new(0, 2)), 11.0);

        colony.step();
        assert_eq!(colony.ants()[0].location(), Position::new(0, 1));
        colony.step();
        assert_eq!(colony.ants()[0].location(), Position::new(0, 0));
        assert_eq!(colony.brought_food(), 1);
        // An empty ant on home leaves nothing behind
        assert_eq!(colony.pheromones().get(Position::new(0, 0)), PHEROMONE_FLOOR);
    }

    #[test]
    fn when_ants_are_not_full_no_pheromone_is_deposited_by_default() {
        let layout = "\
            rows 5
            cols 5
            ants 1
            m *....
            m .....
            m ..H..
            m .....
            m .....";
        let mut colony = colony(layout, config());

        // The single site is taboo for five ticks after each harvest, so the ant cannot fill up
        for _ in 0..10 {
            colony.step();
            assert!(colony.ants()[0].carry() < 3);
        }

        assert!(colony
            .pheromones()
            .values()
            .iter()
            .all(|value| *value == PHEROMONE_FLOOR));
    }

    #[test]
    fn when_depositing_on_every_move_even_empty_ants_mark_their_cell() {
        let layout = "\
            rows 2
            cols 3
            m a.a
            m H..";
        let config = ColonyConfig {
            deposit_policy: DepositPolicy::EveryMove,
            evaporation_coefficient: 0.5,
            pheromone_deposit: 8.0,
            ..config()
        };
        let mut colony = colony(layout, config);

        colony.step();

        // With no food anywhere both ants shuffle towards home
        assert_eq!(colony.ants()[0].location(), Position::new(1, 1));
        // Each move added 8 on top of the floor, then the field halved once
        for ant in colony.ants() {
            assert_eq!(colony.pheromones().get(ant.location()), 4.5);
        }
        assert_eq!(colony.pheromones().get(Position::new(0, 0)), PHEROMONE_FLOOR);
    }

    #[test]
    fn when_ants_are_boxed_in_they_stay_put() {
        let layout = "\
            rows 1
            cols 3
            m aaH";
        let mut colony = colony(layout, config());

        for _ in 0..5 {
            colony.step();
        }

        assert_eq!(colony.ants()[0].location(), Position::new(0, 0));
        assert_eq!(colony.ants()[1].location(), Position::new(0, 1));
    }

    #[test]
    fn when_there_is_no_food_the_colony_is_finished_from_the_start() {
        let layout = "\
            rows 2
            cols 2
            ants 3
            m H.
            m ..";
        let colony = colony(layout, config());

        assert_eq!(colony.total_initial_food(), 0);
        assert!(colony.is_finished());
    }

    #[test]
    fn when_running_a_default_colony_it_eventually_finishes() {
        let mut colony = Colony::new(ColonyConfig {
            rows: 10,
            cols: 10,
            ant_count: 4,
            food_site_count: 3,
            food_capacity: 3,
            ..config()
        })
        .unwrap();

        let mut ticks = 0;
        while !colony.is_finished() && ticks < 20_000 {
            colony.step();
            ticks += 1;
        }

        assert!(colony.is_finished());
        assert_eq!(colony.remaining_food(), 0);
        assert_eq!(colony.brought_food(), colony.total_initial_food());
    }

    #[test]
    fn when_counts_overflow_construction_fails_with_an_error() {
        let huge_grid = ColonyConfig {
            rows: usize::MAX,
            cols: 2,
            ..config()
        };
        assert!(matches!(
            Colony::new(huge_grid),
            Err(ConfigError::GridTooLarge { .. })
        ));

        let huge_colony = ColonyConfig {
            ant_count: usize::MAX,
            food_site_count: 1,
            ..config()
        };
        assert!(matches!(
            Colony::new(huge_colony),
            Err(ConfigError::NotEnoughCells { .. })
        ));

        let layout = "\
            rows 1
            cols 2
            ants 1000000000000000000
            m H.";
        assert!(matches!(
            Colony::from_layout(layout, config()),
            Err(LayoutError::Config(ConfigError::NotEnoughCells { .. }))
        ));
    }
}
