#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Beverage Bandits battles from map files.

mod render;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use beverage_bandits_core::{AttackPower, BattleReport, CombatRules, Faction, Health};
use beverage_bandits_map_text::Scenario;
use beverage_bandits_system_combat::{search::minimum_flawless_attack, CombatEngine, CombatState};
use beverage_bandits_world::{query, World};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulates elves and goblins fighting through a cavern.
#[derive(Debug, Parser)]
#[command(name = "beverage-bandits", version)]
struct Cli {
    #[command(subcommand)]
    command: Mode,
    #[command(flatten)]
    rules: RulesArgs,
    /// Abort once a battle completes more rounds than this.
    #[arg(long, global = true)]
    max_rounds: Option<u32>,
    /// Print the result as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Fight the battle once and print its outcome.
    Simulate {
        /// Map file, or `-` for standard input.
        map: PathBuf,
        /// Print the battlefield after every round.
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Find the smallest elf attack power that wins without losing an elf.
    Rescue {
        /// Map file, or `-` for standard input.
        map: PathBuf,
        /// Highest elf attack power to try.
        #[arg(long, default_value_t = 200)]
        max_attack: u32,
    },
}

#[derive(Debug, Args)]
struct RulesArgs {
    /// TOML file with `hit_points`, `elf_attack` and `goblin_attack`.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Starting hit points of every unit.
    #[arg(long, global = true)]
    hit_points: Option<u32>,
    /// Attack power of every elf.
    #[arg(long, global = true)]
    elf_attack: Option<u32>,
    /// Attack power of every goblin.
    #[arg(long, global = true)]
    goblin_attack: Option<u32>,
}

#[derive(Debug, Serialize)]
struct RescueSummary {
    attack_power: AttackPower,
    report: BattleReport,
}

/// Entry point for the Beverage Bandits command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let rules = load_rules(&cli.rules)?;

    match cli.command {
        Mode::Simulate { map, verbose } => {
            let scenario = load_scenario(&map)?;
            simulate(scenario, &rules, cli.max_rounds, verbose, cli.json)
        }
        Mode::Rescue { map, max_attack } => {
            let scenario = load_scenario(&map)?;
            rescue(&scenario, &rules, max_attack, cli.max_rounds, cli.json)
        }
    }
}

fn simulate(
    scenario: Scenario,
    rules: &CombatRules,
    max_rounds: Option<u32>,
    verbose: bool,
    json: bool,
) -> Result<()> {
    let world = World::new(scenario.grid, &scenario.units, rules)
        .context("failed to place units on the map")?;
    let mut engine = CombatEngine::new(world);

    let report = engine
        .run_observed(max_rounds, |engine| {
            if verbose {
                let ended = engine.state() == CombatState::CombatEnded;
                println!(
                    "{}\n{}",
                    render::frame_heading(engine.completed_rounds(), ended),
                    render::frame(&query::snapshot(engine.world()))
                );
            }
        })
        .context("battle did not finish")?;
    info!(outcome = report.outcome, "simulation finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::summary(&report));
    }
    Ok(())
}

fn rescue(
    scenario: &Scenario,
    rules: &CombatRules,
    max_attack: u32,
    max_rounds: Option<u32>,
    json: bool,
) -> Result<()> {
    let victory = minimum_flawless_attack(
        &scenario.grid,
        &scenario.units,
        rules,
        Faction::Elf,
        AttackPower::new(max_attack),
        max_rounds,
    )
    .context("flawless victory search failed")?;

    if json {
        let summary = RescueSummary {
            attack_power: victory.attack_power,
            report: victory.report,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} need attack power {} to win without losses",
            render::faction_name(Faction::Elf),
            victory.attack_power.get()
        );
        print!("{}", render::summary(&victory.report));
    }
    Ok(())
}

fn load_rules(args: &RulesArgs) -> Result<CombatRules> {
    let mut rules = match &args.rules {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read rules from {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse rules in {}", path.display()))?
        }
        None => CombatRules::default(),
    };

    if let Some(hit_points) = args.hit_points {
        rules.hit_points = Health::new(hit_points);
    }
    if let Some(power) = args.elf_attack {
        rules.elf_attack = AttackPower::new(power);
    }
    if let Some(power) = args.goblin_attack {
        rules.goblin_attack = AttackPower::new(power);
    }

    Ok(rules)
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = if path == Path::new("-") {
        io::read_to_string(io::stdin()).context("failed to read map from standard input")?
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read map from {}", path.display()))?
    };

    text.parse()
        .with_context(|| format!("invalid map in {}", path.display()))
}
