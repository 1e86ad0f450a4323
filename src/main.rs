#![warn(missing_docs)]
//! # Electric Chair Analyzer
//!
//! Entry point aggregating the state codec, rule engine, reachability
//! enumerator, equilibrium solver, and analysis driver into the `electrod`
//! binary. A thin `main.rs` that declares every module and dispatches CLI
//! commands to library-level functions rather than embedding logic in the
//! entry point itself.
//!
//! #### Authorship
//!
//! Electric Chair analyzer team.

use std::process;
use std::sync::atomic::AtomicBool;

use clap::Parser;

use crate::cli::Cli;
use crate::errors::AnalyzerError;

mod cli;
mod config;
mod driver;
mod errors;
mod game;
mod model;
mod query;
mod reachability;
mod solver;
mod strategy;
mod util;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        if !cli.quiet {
            eprintln!("error: {e}");
        }
        process::exit(errors::exit_code(&e));
    }
    process::exit(exitcode::OK);
}

fn run(cli: &Cli) -> Result<(), AnalyzerError> {
    let mut config = config::Config::load(cli.config_path.as_deref())?;
    if let Some(draw) = cli.draw_value {
        config.evaluation.draw = draw;
    }

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let driver = driver::Driver::new(config);

    if cli.init {
        let progress = driver.init()?;
        if !cli.quiet {
            print_progress(&progress);
        }
        return Ok(());
    }

    if cli.status {
        let progress = driver.status()?;
        if !cli.quiet {
            print_progress(&progress);
        }
        return Ok(());
    }

    if cli.clear {
        driver.clear()?;
        if !cli.quiet {
            println!("cleared strategy outputs and progress.");
        }
        return Ok(());
    }

    let stop = AtomicBool::new(false);
    let solved = driver.solve(cli.num, &stop)?;
    if !cli.quiet {
        println!("solved {solved} state(s).");
    }
    Ok(())
}

fn print_progress(progress: &driver::progress::Progress) {
    let total: u64 = progress.total_states.values().sum();
    let analyzed: u64 = progress.analyzed_states.values().sum();
    println!(
        "{}/{} states analyzed ({})",
        analyzed,
        total,
        if progress.is_complete { "complete" } else { "in progress" }
    );
    let mut turns: Vec<u8> = progress
        .total_states
        .keys()
        .filter_map(|k| k.parse().ok())
        .collect();
    turns.sort_unstable();
    for turn in turns {
        println!(
            "  turn {turn}: {}/{}",
            progress.analyzed(turn),
            progress.total(turn)
        );
    }
}
