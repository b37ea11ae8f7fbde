//! Logging configuration and initialization
//!
//! All output goes to stderr. Worker processes reserve stdout for the
//! completion line, and the coordinator parses that stream.

use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// What the current process is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessRole {
    /// Server or one-shot run
    Coordinator,
    /// Single-chunk worker spawned by a coordinator
    Worker,
}

#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    pub verbose: u8,
    pub role: ProcessRole,
}

impl LogConfig {
    pub fn new(verbose: u8, role: ProcessRole) -> Self {
        Self { verbose, role }
    }

    /// Filter directive for the configured verbosity.
    ///
    /// Workers start one level quieter so a wave of them does not flood the
    /// coordinator's terminal.
    pub fn log_level(&self) -> &'static str {
        match (self.role, self.verbose) {
            (ProcessRole::Worker, 0) => "warn",
            (ProcessRole::Worker, 1) | (ProcessRole::Coordinator, 0) => "info",
            (_, 1) | (ProcessRole::Worker, 2) => "debug",
            (_, 2) => "trace",
            _ => "trace,hyper=debug,tower=debug",
        }
    }
}

/// Initialize tracing for the process. `RUST_LOG` takes precedence over `-v`.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .with_thread_ids(config.verbose >= 3)
        .with_line_number(config.verbose >= 3)
        .init();

    debug!("Started as {:?} with verbosity {}", config.role, config.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinator_levels() {
        let level = |v| LogConfig::new(v, ProcessRole::Coordinator).log_level();
        assert_eq!(level(0), "info");
        assert_eq!(level(1), "debug");
        assert_eq!(level(2), "trace");
        assert_eq!(level(5), "trace,hyper=debug,tower=debug");
    }

    #[test]
    fn test_workers_start_quieter() {
        let level = |v| LogConfig::new(v, ProcessRole::Worker).log_level();
        assert_eq!(level(0), "warn");
        assert_eq!(level(1), "info");
        assert_eq!(level(2), "debug");
        assert_eq!(level(3), "trace,hyper=debug,tower=debug");
    }
}
