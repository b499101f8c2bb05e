//! Runtime setup for the binary: logging.
//!
//! Worker pools are not configured here; each analysis run builds its own
//! bounded pool from `[parallel]`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "gapmap=info",
        1 => "gapmap=debug",
        _ => "gapmap=trace",
    }
}

/// Install the global subscriber, writing to stderr so stdout stays
/// machine-readable. Later calls are no-ops.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_by_verbosity() {
        assert_eq!(default_filter(0), "gapmap=info");
        assert_eq!(default_filter(1), "gapmap=debug");
        assert_eq!(default_filter(5), "gapmap=trace");
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(0);
        init_tracing(1);
    }
}
