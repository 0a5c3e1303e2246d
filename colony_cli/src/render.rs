use colony_engine::{Ant, Colony, Position};
use crossterm::{
    cursor::{Hide, MoveTo},
    queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use rand::Rng;
use std::collections::HashMap;
use std::io::{self, Write};

/// What gets drawn on a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Glyph {
    Home,
    Food,
    Ant { color: Color, carrying: bool },
    /// Empty ground, with the trail strength relative to the strongest cell.
    Ground { heat: f64 },
}

impl Glyph {
    pub fn char(&self) -> char {
        match self {
            Glyph::Home => 'H',
            Glyph::Food => 'F',
            Glyph::Ant { carrying: true, .. } => 'A',
            Glyph::Ant { carrying: false, .. } => 'a',
            Glyph::Ground { .. } => '.',
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Glyph::Home => Color::Yellow,
            Glyph::Food => Color::Grey,
            Glyph::Ant { color, .. } => *color,
            Glyph::Ground { heat } if *heat > 0.5 => Color::Green,
            Glyph::Ground { heat } if *heat > 0.0 => Color::DarkGreen,
            Glyph::Ground { .. } => Color::Reset,
        }
    }
}

/// Works out the glyph for every cell, row by row.
/// Home wins over food, food over ants, and ants over bare ground.
pub fn glyphs<R: Rng>(colony: &Colony<R>) -> Vec<Vec<Glyph>> {
    let ants: HashMap<Position, &Ant> = colony
        .ants()
        .iter()
        .rev()
        .map(|ant| (ant.location(), ant))
        .collect();

    let pheromones = colony.pheromones();
    // Anything above the floor counts as trail
    let span = pheromones.max() - 1.0;

    (0..colony.rows())
        .map(|row| {
            (0..colony.cols())
                .map(|col| {
                    let position = Position::new(row, col);
                    if position == colony.home() {
                        Glyph::Home
                    } else if colony.food().contains(position) {
                        Glyph::Food
                    } else if let Some(ant) = ants.get(&position) {
                        Glyph::Ant {
                            color: ant.color(),
                            carrying: ant.carry() > 0,
                        }
                    } else {
                        let heat = match span > 0.0 {
                            true => (pheromones.get(position) - 1.0) / span,
                            false => 0.0,
                        };
                        Glyph::Ground { heat }
                    }
                })
                .collect()
        })
        .collect()
}

/// Plain text rendering of the grid inside a border.
pub fn grid_text<R: Rng>(colony: &Colony<R>) -> String {
    let border = format!(" {}\n", "-".repeat(colony.cols() * 2 + 1));
    let mut text = border.clone();

    for row in glyphs(colony) {
        text.push_str("| ");
        for glyph in row {
            let char = match glyph {
                Glyph::Ant { .. } => 'A',
                glyph => glyph.char(),
            };
            text.push(char);
            text.push(' ');
        }
        text.push_str("|\n");
    }

    text.push_str(&border);
    text
}

/// Draws the colony to the terminal.
pub fn draw<R: Rng>(colony: &Colony<R>) -> io::Result<()> {
    let mut stdout = io::stdout();

    // Display information about the colony
    queue!(
        stdout,
        Clear(ClearType::All),
        MoveTo(0, 0),
        Hide,
        Print("Tick: "),
        Print(colony.tick().to_string()),
        Print("\nBrought home: "),
        Print(format!(
            "{} / {}",
            colony.brought_food(),
            colony.total_initial_food()
        )),
        Print("\nLeft at sites: "),
        Print(colony.remaining_food().to_string()),
        Print(", Carried: "),
        Print(colony.carried_food().to_string()),
        Print("\n\n")
    )?;

    // Display the grid
    for row in glyphs(colony) {
        for glyph in row {
            queue!(
                stdout,
                SetForegroundColor(glyph.color()),
                Print(glyph.char()),
                Print(' '),
                SetForegroundColor(Color::Reset)
            )?;
        }
        queue!(stdout, Print("\n"))?;
    }

    stdout.flush()
}
