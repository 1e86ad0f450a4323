//! # Command Line Module
//!
//! UNIX-like CLI surface for the `electrod` analyzer: a single
//! [clap](https://docs.rs/clap/latest/clap/)-derived struct rather than a
//! subcommand tree, since there is one command with mutually exclusive
//! modes, not several distinct verbs.
//!
//! #### Authorship
//!
//! Electric Chair analyzer team.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// `electrod` exhaustively solves the Electric Chair game by retrograde
/// analysis: reachability enumeration followed by backward-induction
/// equilibrium solving, with crash-resumable, chunked on-disk persistence.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["init", "status", "clear", "print_config"])
        .multiple(false)
))]
pub struct Cli {
    /* DEFAULT-MODE ARGUMENT */
    /// Number of states to solve this run (default mode).
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub num: usize,

    /* MUTUALLY EXCLUSIVE MODES */
    /// Load reachability metadata and initialize `progress.json`.
    #[arg(short = 'i', long)]
    pub init: bool,

    /// Print the progress summary and exit.
    #[arg(short = 's', long)]
    pub status: bool,

    /// Delete strategy outputs and reset progress.
    #[arg(short = 'c', long)]
    pub clear: bool,

    /// Print the resolved configuration and exit.
    #[arg(long = "config")]
    pub print_config: bool,

    /* DEFAULTS PROVIDED */
    /// Override `evaluation.draw` for this run.
    #[arg(short = 'd', long = "draw-value")]
    pub draw_value: Option<f64>,

    /// Path to a JSON configuration document. Defaults to
    /// `./analysis-config.json` if present, else the documented defaults.
    #[arg(long = "config-path")]
    pub config_path: Option<PathBuf>,

    /// Send no output to STDOUT during execution.
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_internally_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_num_is_one_thousand() {
        let cli = Cli::parse_from(["electrod"]);
        assert_eq!(cli.num, 1000);
        assert!(!cli.init && !cli.status && !cli.clear && !cli.print_config);
    }

    #[test]
    fn init_and_status_are_mutually_exclusive() {
        let result = Cli::try_parse_from(["electrod", "--init", "--status"]);
        assert!(result.is_err());
    }

    #[test]
    fn draw_value_override_parses_as_float() {
        let cli = Cli::parse_from(["electrod", "--draw-value", "0.25"]);
        assert_eq!(cli.draw_value, Some(0.25));
    }
}
