//! Text rendering of battle snapshots and reports.

use beverage_bandits_core::{BattleReport, BattleSnapshot, Faction};

/// Plural display name of a faction.
pub(crate) fn faction_name(faction: Faction) -> &'static str {
    match faction {
        Faction::Elf => "Elves",
        Faction::Goblin => "Goblins",
    }
}

/// Draws the map with the hit points of each row's units listed to its right.
pub(crate) fn frame(snapshot: &BattleSnapshot) -> String {
    let (_, rows) = snapshot.dimensions();
    let mut out = String::new();

    for row in 0..rows {
        let Some(glyphs) = snapshot.row(row) else {
            break;
        };
        out.extend(glyphs.iter());

        let annotations: Vec<String> = snapshot
            .units()
            .iter()
            .filter(|unit| unit.cell.row() == row)
            .map(|unit| format!("{}({})", unit.faction.glyph(), unit.health.get()))
            .collect();
        if !annotations.is_empty() {
            out.push_str("   ");
            out.push_str(&annotations.join(", "));
        }
        out.push('\n');
    }

    out
}

/// Heading printed above the frame captured after a round.
pub(crate) fn frame_heading(completed_rounds: u32, ended: bool) -> String {
    match (ended, completed_rounds) {
        (true, rounds) => format!("Combat ends during round {}:", rounds + 1),
        (false, 1) => "After 1 round:".to_owned(),
        (false, rounds) => format!("After {rounds} rounds:"),
    }
}

/// Three-line summary of a finished battle.
pub(crate) fn summary(report: &BattleReport) -> String {
    format!(
        "Combat ends after {rounds} full rounds\n\
         {victor} win with {hit_points} total hit points left\n\
         Outcome: {rounds} * {hit_points} = {outcome}\n",
        rounds = report.completed_rounds,
        victor = faction_name(report.victor),
        hit_points = report.remaining_hit_points,
        outcome = report.outcome,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use beverage_bandits_core::{
        AttackPower, Cell, CellCoord, GridMap, Health, UnitId, UnitSnapshot, UnitView,
    };

    fn unit(id: u32, faction: Faction, column: u32, row: u32, hp: u32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            faction,
            cell: CellCoord::new(column, row),
            health: Health::new(hp),
            attack_power: AttackPower::new(3),
        }
    }

    #[test]
    fn rows_list_their_units_in_reading_order() {
        let grid = GridMap::from_rows(vec![
            vec![Cell::Wall; 5],
            vec![Cell::Wall, Cell::Floor, Cell::Floor, Cell::Floor, Cell::Wall],
            vec![Cell::Wall; 5],
        ])
        .expect("rectangular grid");
        let units = UnitView::from_snapshots(vec![
            unit(0, Faction::Goblin, 3, 1, 197),
            unit(1, Faction::Elf, 1, 1, 200),
        ]);

        let picture = frame(&BattleSnapshot::capture(&grid, &units));

        assert_eq!(picture, "#####\n#E.G#   E(200), G(197)\n#####\n");
    }

    #[test]
    fn summary_spells_out_the_outcome() {
        let report = BattleReport {
            completed_rounds: 47,
            remaining_hit_points: 590,
            survivors: 4,
            victor: Faction::Goblin,
            outcome: 27_730,
        };

        assert_eq!(
            summary(&report),
            "Combat ends after 47 full rounds\n\
             Goblins win with 590 total hit points left\n\
             Outcome: 47 * 590 = 27730\n"
        );
    }

    #[test]
    fn headings_count_rounds() {
        assert_eq!(frame_heading(1, false), "After 1 round:");
        assert_eq!(frame_heading(3, false), "After 3 rounds:");
        assert_eq!(frame_heading(47, true), "Combat ends during round 48:");
    }
}
