//! CLI frontend for the SWN combat engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use commands::CheckKind;

#[derive(Parser)]
#[command(
    name = "swn",
    about = "Dice, checks, attacks and initiative for Stars Without Number",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// RNG seed for reproducible rolls
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll a dice formula, e.g. `1d20 + @dex + 2`
    Roll {
        /// The formula to roll
        formula: String,

        /// Variable binding, e.g. `dex=2` (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// Comparison policy: above, below, check, instinct
        #[arg(short, long)]
        policy: Option<String>,

        /// Target value for the comparison
        #[arg(short, long, allow_hyphen_values = true)]
        target: Option<i32>,
    },

    /// Make a check for an actor from an encounter file
    Check {
        /// Encounter file (JSON)
        file: PathBuf,

        /// Actor name (case-insensitive)
        actor: String,

        /// Kind of check
        #[arg(value_enum)]
        kind: CheckKind,

        /// Skill for skill checks
        #[arg(long)]
        skill: Option<String>,

        /// Ability to add (repeatable; the best applies)
        #[arg(short, long = "ability")]
        abilities: Vec<String>,

        /// Difficulty for skill checks
        #[arg(short, long, default_value = "8")]
        difficulty: i32,

        /// Extra modifier for saves and reaction rolls
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        bonus: i32,
    },

    /// Resolve one attack between two actors from an encounter file
    Attack {
        /// Encounter file (JSON)
        file: PathBuf,

        /// Attacking actor
        attacker: String,

        /// Target actor
        target: String,

        /// Weapon carried by the attacker (default: unarmed)
        #[arg(short, long)]
        weapon: Option<String>,

        /// Fire a burst (3 charges, +2 hit and damage)
        #[arg(long)]
        burst: bool,

        /// Charge into melee (+2 hit, -2 defense for a round)
        #[arg(long)]
        charge: bool,

        /// Situational modifier to hit
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        situational: i32,

        /// Apply damage and spent ammunition, then write the file back
        #[arg(long)]
        apply: bool,
    },

    /// Run an encounter's initiative for a number of rounds
    Encounter {
        /// Encounter file (JSON)
        file: PathBuf,

        /// Number of rounds to play through
        #[arg(short, long, default_value = "1")]
        rounds: u32,

        /// Initiative mode override: group, individual
        #[arg(short, long)]
        mode: Option<String>,

        /// Round-end policy override: reset, reroll, keep
        #[arg(short, long)]
        policy: Option<String>,

        /// Print the combat log as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut rng = commands::make_rng(cli.seed);

    let result = match cli.command {
        Commands::Roll {
            formula,
            vars,
            policy,
            target,
        } => commands::roll::run(&formula, &vars, policy.as_deref(), target, &mut rng),
        Commands::Check {
            file,
            actor,
            kind,
            skill,
            abilities,
            difficulty,
            bonus,
        } => commands::check::run(
            &file,
            &actor,
            &commands::check::CheckArgs {
                kind,
                skill,
                abilities,
                difficulty,
                bonus,
            },
            &mut rng,
        ),
        Commands::Attack {
            file,
            attacker,
            target,
            weapon,
            burst,
            charge,
            situational,
            apply,
        } => commands::attack::run(
            &file,
            &commands::attack::AttackArgs {
                attacker,
                target,
                weapon,
                burst,
                charge,
                situational,
                apply,
            },
            &mut rng,
        ),
        Commands::Encounter {
            file,
            rounds,
            mode,
            policy,
            json,
        } => commands::encounter::run(
            &file,
            rounds,
            mode.as_deref(),
            policy.as_deref(),
            json,
            &mut rng,
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
