//! Tracing setup shared by unbom binaries.
//!
//! Diagnostics go to stderr so stdout stays reserved for per-file results.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset.
pub const C_LOG_FILTER_DEFAULT: &str = "warn";

/// Logging switches taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecLogOptions {
    /// Emit engine debug events.
    pub if_verbose: bool,
    /// Only errors.
    pub if_quiet: bool,
}

impl SpecLogOptions {
    /// Filter directive implied by the switches; `quiet` wins over `verbose`.
    pub fn filter_directive(&self) -> &'static str {
        if self.if_quiet {
            "error"
        } else if self.if_verbose {
            "debug"
        } else {
            C_LOG_FILTER_DEFAULT
        }
    }
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the switches when it is set.
pub fn init_logging(spec_log_options: SpecLogOptions) -> Result<(), LogInitError> {
    let filter = build_env_filter(spec_log_options);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| LogInitError::Install(e.to_string()))
}

fn build_env_filter(spec_log_options: SpecLogOptions) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(spec_log_options.filter_directive()))
}
