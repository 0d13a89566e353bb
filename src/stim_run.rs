//! `stim_run` - sample a Clifford circuit from the command line.
//!
//! Reads a circuit in JSON form, compiles it with the backend's default pass,
//! and prints counts keyed by bitstring (bits in sorted order).

use std::{ collections::BTreeMap, fs, path::PathBuf };
use anyhow::Context;
use clap::Parser;
use tracing::info;
use stim_backend::{
    Backend,
    StimBackend,
    circuit::Circuit,
    config::BackendConfig,
    logging::{ init_logging, Verbosity },
    stim_backend::translate,
};

/// Sample a Clifford circuit on a stabilizer-tableau simulator.
#[derive(Debug, Parser)]
#[command(name = "stim_run")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Circuit file (JSON)
    #[arg(value_name = "CIRCUIT")]
    circuit: PathBuf,

    /// Number of shots
    #[arg(short = 'n', long, default_value_t = 1000)]
    shots: usize,

    /// Master seed; overrides the config file and environment
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Optimisation level passed to the default compilation pass
    #[arg(short = 'O', long, default_value_t = 1)]
    optimisation_level: u8,

    /// Print the compiled simulator program instead of sampling
    #[arg(long)]
    stim: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet { Verbosity::Quiet } else { Verbosity::from_count(self.verbose) }
    }
}

fn bitstring(bits: &[bool]) -> String {
    bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let mut config
        = BackendConfig::load_from(cli.config.as_deref())
        .context("loading configuration")?;
    if cli.seed.is_some() { config.seed = cli.seed; }

    let src
        = fs::read_to_string(&cli.circuit)
        .with_context(|| format!("reading {}", cli.circuit.display()))?;
    let circ
        = Circuit::from_json(&src)
        .with_context(|| format!("parsing {}", cli.circuit.display()))?;

    let mut backend = StimBackend::with_config(config);
    let compiled
        = backend.get_compiled_circuit(&circ, cli.optimisation_level)
        .context("compiling circuit")?;
    info!(
        n_qubits = compiled.n_qubits(),
        n_bits = compiled.n_bits(),
        n_gates = compiled.n_gates(),
        "compiled"
    );

    if cli.stim {
        println!("{}", translate(&compiled)?.program);
        return Ok(());
    }

    let result = backend.run_circuit(&compiled, cli.shots, true)?;
    let counts: BTreeMap<String, usize>
        = result.get_counts().into_iter()
        .map(|(k, v)| (bitstring(&k), v))
        .collect();
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_flags() {
        let cli = Cli::parse_from(["stim_run", "c.json", "-n", "10", "-s", "3", "-vv", "--stim"]);
        assert_eq!(cli.shots, 10);
        assert_eq!(cli.seed, Some(3));
        assert!(cli.stim);
        assert_eq!(cli.verbosity(), Verbosity::Trace);
    }

    #[test]
    fn bitstrings() {
        assert_eq!(bitstring(&[true, false, true]), "101");
        assert_eq!(bitstring(&[]), "");
    }
}
