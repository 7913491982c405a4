use beverage_bandits_core::{CellCoord, CombatRules, Faction, Health};
use beverage_bandits_map_text::parse;
use beverage_bandits_system_combat::{CombatEngine, CombatError, CombatState, RoundResult};
use beverage_bandits_world::{query, World};

fn engine(map: &str, rules: &CombatRules) -> CombatEngine {
    let scenario = parse(map).expect("valid map");
    let world = World::new(scenario.grid, &scenario.units, rules).expect("valid layout");
    CombatEngine::new(world)
}

fn render(engine: &CombatEngine) -> Vec<String> {
    let snapshot = query::snapshot(engine.world());
    let (_, rows) = snapshot.dimensions();
    (0..rows)
        .map(|row| {
            snapshot
                .row(row)
                .expect("row within snapshot")
                .iter()
                .collect()
        })
        .collect()
}

fn lines(picture: &str) -> Vec<String> {
    picture.lines().map(str::to_owned).collect()
}

struct Expected {
    map: &'static str,
    rounds: u32,
    hit_points: u64,
    victor: Faction,
}

const BATTLES: [Expected; 6] = [
    Expected {
        map: "#######\n#.G...#\n#...EG#\n#.#.#G#\n#..G#E#\n#.....#\n#######",
        rounds: 47,
        hit_points: 590,
        victor: Faction::Goblin,
    },
    Expected {
        map: "#######\n#G..#E#\n#E#E.E#\n#G.##.#\n#...#E#\n#...E.#\n#######",
        rounds: 37,
        hit_points: 982,
        victor: Faction::Elf,
    },
    Expected {
        map: "#######\n#E..EG#\n#.#G.E#\n#E.##E#\n#G..#.#\n#..E#.#\n#######",
        rounds: 46,
        hit_points: 859,
        victor: Faction::Elf,
    },
    Expected {
        map: "#######\n#E.G#.#\n#.#G..#\n#G.#.G#\n#G..#.#\n#...E.#\n#######",
        rounds: 35,
        hit_points: 793,
        victor: Faction::Goblin,
    },
    Expected {
        map: "#######\n#.E...#\n#.#..G#\n#.###.#\n#E#G#G#\n#...#G#\n#######",
        rounds: 54,
        hit_points: 536,
        victor: Faction::Goblin,
    },
    Expected {
        map: "#########\n#G......#\n#.E.#...#\n#..##..G#\n#...##..#\n#...#...#\n#.G...G.#\n#.....G.#\n#########",
        rounds: 20,
        hit_points: 937,
        victor: Faction::Goblin,
    },
];

#[test]
fn known_battles_end_with_expected_outcome() {
    for expected in &BATTLES {
        let mut engine = engine(expected.map, &CombatRules::default());
        let report = engine.run(None).expect("battle ends");

        assert_eq!(report.completed_rounds, expected.rounds, "{}", expected.map);
        assert_eq!(report.remaining_hit_points, expected.hit_points, "{}", expected.map);
        assert_eq!(report.victor, expected.victor, "{}", expected.map);
        assert_eq!(
            report.outcome,
            u64::from(expected.rounds) * expected.hit_points
        );
        assert_eq!(engine.state(), CombatState::CombatEnded);
        assert_eq!(engine.survivors(expected.victor.opponent()), 0);
    }
}

#[test]
fn battles_finish_within_hit_point_bound() {
    for expected in &BATTLES {
        let mut engine = engine(expected.map, &CombatRules::default());
        let total: u64 = query::unit_view(engine.world()).total_hit_points();
        let report = engine.run(None).expect("battle ends");

        assert!(u64::from(report.completed_rounds) <= total / 3);
    }
}

#[test]
fn first_example_matches_intermediate_rounds() {
    let mut engine = engine(BATTLES[0].map, &CombatRules::default());

    let mut pictures = Vec::new();
    let report = engine
        .run_observed(None, |engine| {
            if engine.completed_rounds() == 1 {
                pictures.push(render(engine));
            }
        })
        .expect("battle ends");

    assert_eq!(report.outcome, 27_730);
    assert_eq!(
        pictures[0],
        lines("#######\n#..G..#\n#...EG#\n#.#G#G#\n#...#E#\n#.....#\n#######")
    );
}

#[test]
fn units_close_in_over_first_rounds() {
    let mut engine = engine(
        "#########\n#G..G..G#\n#.......#\n#.......#\n#G..E..G#\n#.......#\n#.......#\n#G..G..G#\n#########",
        &CombatRules::default(),
    );

    let expected = [
        "#########\n#.G...G.#\n#...G...#\n#...E..G#\n#.G.....#\n#.......#\n#G..G..G#\n#.......#\n#########",
        "#########\n#..G.G..#\n#...G...#\n#.G.E.G.#\n#.......#\n#G..G..G#\n#.......#\n#.......#\n#########",
        "#########\n#.......#\n#..GGG..#\n#..GEG..#\n#G..G...#\n#......G#\n#.......#\n#.......#\n#########",
    ];

    for (round, picture) in (1..).zip(expected) {
        assert_eq!(
            engine.play_round().expect("round plays"),
            RoundResult::Completed { round }
        );
        assert_eq!(render(&engine), lines(picture), "after round {round}");
    }
}

#[test]
fn round_cut_short_by_victory_does_not_count() {
    let rules = CombatRules {
        hit_points: Health::new(3),
        ..CombatRules::default()
    };
    let mut engine = engine("#####\n#GE.#\n#G..#\n#####", &rules);

    let report = engine.run(None).expect("battle ends");

    assert_eq!(report.completed_rounds, 0);
    assert_eq!(report.remaining_hit_points, 6);
    assert_eq!(report.survivors, 2);
    assert_eq!(report.outcome, 0);
}

#[test]
fn fallen_units_free_their_cell_within_the_round() {
    let rules = CombatRules {
        hit_points: Health::new(3),
        ..CombatRules::default()
    };
    let mut engine = engine("########\n#EG..G.#\n########", &rules);

    assert_eq!(
        engine.play_round().expect("round plays"),
        RoundResult::Completed { round: 1 }
    );

    let world = engine.world();
    assert!(query::unit_at(world, CellCoord::new(2, 1)).is_none());
    let goblin = query::unit_at(world, CellCoord::new(4, 1)).expect("goblin advanced");
    assert_eq!(goblin.faction, Faction::Goblin);
    assert!(query::unit_at(world, CellCoord::new(5, 1)).is_none());
}

#[test]
fn play_round_after_the_end_repeats_the_report() {
    let rules = CombatRules {
        hit_points: Health::new(3),
        ..CombatRules::default()
    };
    let mut engine = engine("#####\n#GE.#\n#G..#\n#####", &rules);
    let report = engine.run(None).expect("battle ends");

    assert_eq!(engine.report(), Some(report));
    assert_eq!(
        engine.play_round().expect("no error after the end"),
        RoundResult::CombatEnded(report)
    );
    assert_eq!(engine.completed_rounds(), 0);
}

#[test]
fn separated_factions_stall() {
    let mut engine = engine("#######\n#E.#.G#\n#######", &CombatRules::default());

    assert_eq!(engine.run(None), Err(CombatError::Stalled { round: 1 }));
    assert_eq!(engine.completed_rounds(), 0);
}

#[test]
fn round_limit_stops_long_battles() {
    let mut engine = engine(BATTLES[0].map, &CombatRules::default());

    assert_eq!(
        engine.run(Some(10)),
        Err(CombatError::RoundLimitExceeded { limit: 10 })
    );
    assert_eq!(engine.completed_rounds(), 11);
    assert_eq!(engine.state(), CombatState::RoundComplete);
}

#[test]
fn stronger_elves_turn_the_tide() {
    let rules = CombatRules::default().with_attack_power(
        Faction::Elf,
        beverage_bandits_core::AttackPower::new(15),
    );
    let mut engine = engine(BATTLES[0].map, &rules);

    let report = engine.run(None).expect("battle ends");

    assert_eq!(report.victor, Faction::Elf);
    assert_eq!(report.completed_rounds, 29);
    assert_eq!(report.remaining_hit_points, 172);
    assert_eq!(engine.survivors(Faction::Elf), 2);
}
