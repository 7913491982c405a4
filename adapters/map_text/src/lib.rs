#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text map adapter that turns cavern drawings into grids and unit seeds.
//!
//! Maps use `#` for walls, `.` for open floor, and `E` or `G` for an elf or a
//! goblin standing on floor:
//!
//! ```text
//! #######
//! #.G...#
//! #...EG#
//! #######
//! ```

use std::str::FromStr;

use beverage_bandits_core::{Cell, CellCoord, Faction, GridError, GridMap, UnitSeed};

/// Reasons a map drawing is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The input contained no map rows.
    #[error("map is empty")]
    Empty,
    /// A character other than `#`, `.`, `E` or `G` appeared.
    #[error("unrecognized glyph {glyph:?} at row {row}, column {column}")]
    UnrecognizedGlyph {
        /// The offending character.
        glyph: char,
        /// Zero-based row of the character.
        row: u32,
        /// Zero-based column of the character.
        column: u32,
    },
    /// The rows do not form a rectangle.
    #[error("map is not rectangular: {0}")]
    Grid(#[from] GridError),
    /// One side has nobody to fight with.
    #[error("map contains no {0:?} units")]
    MissingFaction(Faction),
}

/// Parsed map: terrain plus the units standing on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Immutable terrain.
    pub grid: GridMap,
    /// Starting units in reading order.
    pub units: Vec<UnitSeed>,
}

impl FromStr for Scenario {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text)
    }
}

/// Parses a map drawing.
///
/// Trailing whitespace on each line and blank lines before and after the map
/// are ignored. A blank line inside the map makes it ragged.
pub fn parse(text: &str) -> Result<Scenario, ParseError> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());
    let map_lines = match (first, last) {
        (Some(first), Some(last)) => &lines[first..=last],
        _ => return Err(ParseError::Empty),
    };

    let mut rows = Vec::new();
    let mut units = Vec::new();

    for (row, line) in map_lines.iter().enumerate() {
        let row = u32::try_from(row).map_err(|_| GridError::TooLarge)?;
        let mut cells = Vec::with_capacity(line.len());

        for (column, glyph) in line.chars().enumerate() {
            let column = u32::try_from(column).map_err(|_| GridError::TooLarge)?;
            let cell = match glyph {
                '#' => Cell::Wall,
                '.' => Cell::Floor,
                other => {
                    let faction = Faction::from_glyph(other).ok_or(ParseError::UnrecognizedGlyph {
                        glyph: other,
                        row,
                        column,
                    })?;
                    units.push(UnitSeed {
                        faction,
                        cell: CellCoord::new(column, row),
                    });
                    Cell::Floor
                }
            };
            cells.push(cell);
        }

        rows.push(cells);
    }

    let grid = GridMap::from_rows(rows)?;

    for faction in Faction::ALL {
        if !units.iter().any(|seed| seed.faction == faction) {
            return Err(ParseError::MissingFaction(faction));
        }
    }

    Ok(Scenario { grid, units })
}
