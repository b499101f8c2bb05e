use crate::config::{BaselinePolicy, MatcherBackend};
use crate::core::Priority;
use crate::io::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gapmap")]
#[command(about = "Scenario-to-test traceability and coverage gap analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile scenarios and tests from an input bundle
    Analyze {
        /// JSON bundle with service, apis, scenarios and tests
        #[arg(short, long)]
        input: PathBuf,

        /// Config file (defaults to the nearest .gapmap.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads for matcher calls (0 = all cores)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Similarity backend (heuristic, hosted)
        #[arg(long)]
        matcher: Option<MatcherBackend>,

        /// Incomplete-baseline policy (flag-only, downgrade)
        #[arg(long)]
        policy: Option<BaselinePolicy>,

        /// Exit with status 2 if any gap at this priority or more urgent exists
        #[arg(long = "fail-on-gaps", value_name = "PRIORITY")]
        fail_on_gaps: Option<Priority>,
    },

    /// Write a default .gapmap.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
