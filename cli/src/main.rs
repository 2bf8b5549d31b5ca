//! roster-cli: thin command-line harness for the roster-core engine.
//!
//! # Commands
//!
//! - `solve-mono`: run ACO+TS on a single team's problem
//! - `solve-multi`: run the sequential multi-team coordinator
//! - `validate`: check a problem file's shape without solving
//!
//! No spreadsheet formatting, no progress bars, no ASCII banners —
//! those remain out of scope (spec.md §1); this binary exists purely to
//! exercise and test the library from the command line.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use roster_core::models::{LoggingOptions, RosterInput, RosterTunables, SolveOutcome};
use roster_core::multi_team::{solve_mono, solve_multi, MultiTeamInput, TeamSpec};
use roster_core::roster::RosterModel;

#[derive(Parser)]
#[command(name = "roster-cli")]
#[command(author = "roster-core")]
#[command(version = "0.1.0")]
#[command(about = "Duty roster ACO+TS optimization CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single team's roster with ACO followed by Tabu Search.
    SolveMono {
        /// Input JSON file path (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Seed for the RNG (omit for a process-seeded run)
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Solve several teams sequentially with cross-team exclusion.
    SolveMulti {
        /// Input JSON file path (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Seed for the RNG (omit for a process-seeded run)
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a single-team problem file without solving it.
    Validate {
        /// Input JSON file path
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Read input from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },
}

/// JSON request shape for `solve-mono`: the problem plus the ambient
/// knobs the core takes as constructor/call arguments rather than
/// fields of `RosterInput` itself.
#[derive(Debug, Deserialize)]
struct SolveMonoRequest {
    #[serde(flatten)]
    input: RosterInput,
    #[serde(default = "default_true")]
    enable_off_after_garde: bool,
    #[serde(default)]
    tunables: RosterTunables,
    #[serde(default)]
    logging: LoggingOptions,
    #[serde(default)]
    skip: bool,
}

#[derive(Debug, Deserialize)]
struct TeamRequest {
    #[serde(flatten)]
    input: RosterInput,
    #[serde(default)]
    skip: bool,
}

#[derive(Debug, Deserialize)]
struct SolveMultiRequest {
    teams: Vec<TeamRequest>,
    local_to_global: Vec<Vec<usize>>,
    global_to_local: Vec<HashMap<usize, usize>>,
    #[serde(default = "default_true")]
    enable_off_after_garde: bool,
    #[serde(default)]
    tunables: RosterTunables,
    #[serde(default)]
    logging: LoggingOptions,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct SolveMonoResponse {
    roster: Vec<usize>,
    score: f64,
}

impl From<SolveOutcome> for SolveMonoResponse {
    fn from(outcome: SolveOutcome) -> Self {
        SolveMonoResponse {
            roster: outcome.roster,
            score: outcome.score,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::SolveMono {
            input,
            stdin,
            seed,
            pretty,
        } => cmd_solve_mono(input, stdin, seed, pretty),

        Commands::SolveMulti {
            input,
            stdin,
            seed,
            pretty,
        } => cmd_solve_multi(input, stdin, seed, pretty),

        Commands::Validate { input, stdin } => cmd_validate(input, stdin),
    }
}

fn read_input(file: Option<PathBuf>, use_stdin: bool) -> Result<String> {
    if use_stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        Ok(buffer)
    } else if let Some(path) = file {
        fs::read_to_string(&path).with_context(|| format!("failed to read file: {path:?}"))
    } else {
        anyhow::bail!("either provide an input file or use --stdin")
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

fn cmd_solve_mono(
    input: Option<PathBuf>,
    stdin: bool,
    seed: Option<u64>,
    pretty: bool,
) -> Result<()> {
    let json_str = read_input(input, stdin)?;
    let request: SolveMonoRequest =
        serde_json::from_str(&json_str).context("failed to parse input JSON")?;

    eprintln!("running solve-mono...");
    let mut rng = make_rng(seed);
    let outcome = solve_mono(
        request.input,
        request.enable_off_after_garde,
        request.tunables,
        request.logging,
        request.skip,
        &mut rng,
    )
    .map_err(|e| anyhow::anyhow!("solve-mono error: {e}"))?;

    print_json(&SolveMonoResponse::from(outcome), pretty)
}

fn cmd_solve_multi(
    input: Option<PathBuf>,
    stdin: bool,
    seed: Option<u64>,
    pretty: bool,
) -> Result<()> {
    let json_str = read_input(input, stdin)?;
    let request: SolveMultiRequest =
        serde_json::from_str(&json_str).context("failed to parse input JSON")?;

    let multi_input = MultiTeamInput {
        teams: request
            .teams
            .into_iter()
            .map(|t| TeamSpec {
                input: t.input,
                skip: t.skip,
            })
            .collect(),
        local_to_global: request.local_to_global,
        global_to_local: request.global_to_local,
    };

    eprintln!("running solve-multi over {} teams...", multi_input.teams.len());
    let mut rng = make_rng(seed);
    let outcomes = solve_multi(
        multi_input,
        request.enable_off_after_garde,
        request.tunables,
        request.logging,
        &mut rng,
    )
    .map_err(|e| anyhow::anyhow!("solve-multi error: {e}"))?;

    let responses: Vec<SolveMonoResponse> = outcomes.into_iter().map(Into::into).collect();
    print_json(&responses, pretty)
}

fn cmd_validate(input: Option<PathBuf>, stdin: bool) -> Result<()> {
    let json_str = read_input(input, stdin)?;
    let input: RosterInput = serde_json::from_str(&json_str).context("JSON parse error")?;

    match RosterModel::new(input, true) {
        Ok(_) => {
            println!("{{\"valid\": true}}");
            Ok(())
        }
        Err(e) => {
            println!(
                "{{\"valid\": false, \"error\": \"{}\"}}",
                e.to_string().replace('"', "\\\"")
            );
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
