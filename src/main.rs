use anyhow::Result;
use gapmap::cli::{init_tracing, parse_args, Commands};
use gapmap::commands::{analyze, init_config, AnalyzeConfig, GateStatus};
use gapmap::observability::install_panic_hook;

/// Exit status when `--fail-on-gaps` trips.
const GATE_FAILED_EXIT_CODE: i32 = 2;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = parse_args();
    init_tracing(cli.verbosity);

    match cli.command {
        Commands::Analyze {
            input,
            config,
            format,
            output,
            jobs,
            matcher,
            policy,
            fail_on_gaps,
        } => {
            let status = analyze(AnalyzeConfig {
                input,
                config,
                format,
                output,
                jobs,
                matcher,
                policy,
                fail_on_gaps,
            })?;
            if status == GateStatus::Failed {
                std::process::exit(GATE_FAILED_EXIT_CODE);
            }
        }
        Commands::Init { force } => {
            init_config(force)?;
        }
    }

    Ok(())
}
