//! Logging setup for programs built on this crate.
//!
//! The library itself only emits `tracing` events; nothing is printed unless a
//! subscriber is installed, e.g. with [`init_logging`].

use tracing::Level;
use tracing_subscriber::{ fmt, prelude::*, EnvFilter };

/// Verbosity level for logging output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Info and above.
    #[default]
    Normal,
    /// Debug and above: one event per compiled or processed circuit.
    Verbose,
    /// Everything, including per-batch sampling events.
    Trace,
}

impl Verbosity {
    pub fn to_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Map a count of `-v` flags to a verbosity.
    pub fn from_count(n: u8) -> Self {
        match n {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }
}

/// Install a global `fmt` subscriber filtered at `verbosity`, unless
/// `RUST_LOG` is set, in which case it takes precedence.
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(verbosity: Verbosity) {
    let level = verbosity.to_level();
    let default_filter = format!("stim_backend={level},stim_run={level}");
    let env_filter
        = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber
        = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr));
    let _ = subscriber.try_init();
}
