//! Stim-style instruction programs and a shot sampler over them.
//!
//! A [`StimCircuit`] is a flat list of instructions over integer qubit
//! targets, written in the same line format as the programs read and written
//! by [Stim][stim]:
//! ```text
//! H 0
//! CX 0 1 1 2
//! M 0 1 2
//! ```
//! Two-qubit gates take their targets in pairs. A [`Sampler`] runs a program
//! from ∣0...0⟩ on a [`Tableau`] once per shot, returning the measurement
//! record of each.
//!
//! [stim]: https://github.com/quantumlib/Stim

use std::{ fmt, str::FromStr };
use itertools::Itertools;
use rand::{ SeedableRng, rngs::StdRng };
use rayon::iter::{ IntoParallelIterator, ParallelIterator };
use tracing::trace;
use crate::{
    error::{ Error, Result },
    tableau::Tableau,
};

/// A single Stim instruction type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StimGate {
    I,
    X,
    Y,
    Z,
    H,
    S,
    SDag,
    SqrtX,
    SqrtXDag,
    CX,
    CY,
    CZ,
    ISwap,
    Swap,
    /// Z-basis measurement
    M,
    /// Z-basis reset
    R,
}

impl StimGate {
    pub const ALL: [Self; 16] = [
        Self::I, Self::X, Self::Y, Self::Z, Self::H, Self::S, Self::SDag,
        Self::SqrtX, Self::SqrtXDag, Self::CX, Self::CY, Self::CZ, Self::ISwap,
        Self::Swap, Self::M, Self::R,
    ];

    /// Canonical name in a program text.
    pub fn name(self) -> &'static str {
        match self {
            Self::I        => "I",
            Self::X        => "X",
            Self::Y        => "Y",
            Self::Z        => "Z",
            Self::H        => "H",
            Self::S        => "S",
            Self::SDag     => "S_DAG",
            Self::SqrtX    => "SQRT_X",
            Self::SqrtXDag => "SQRT_X_DAG",
            Self::CX       => "CX",
            Self::CY       => "CY",
            Self::CZ       => "CZ",
            Self::ISwap    => "ISWAP",
            Self::Swap     => "SWAP",
            Self::M        => "M",
            Self::R        => "R",
        }
    }

    /// Return `true` if targets are taken in pairs.
    pub fn is_two_qubit(self) -> bool {
        matches!(self, Self::CX | Self::CY | Self::CZ | Self::ISwap | Self::Swap)
    }
}

impl fmt::Display for StimGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StimGate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_ascii_uppercase();
        Self::ALL.into_iter()
            .find(|g| g.name() == upper)
            .or(match upper.as_str() {
                "CNOT" | "ZCX" => Some(Self::CX),
                "ZCY" => Some(Self::CY),
                "ZCZ" => Some(Self::CZ),
                "SQRT_Z" => Some(Self::S),
                "SQRT_Z_DAG" => Some(Self::SDag),
                "MZ" => Some(Self::M),
                "RZ" => Some(Self::R),
                _ => None,
            })
            .ok_or_else(|| Error::UnsupportedOp(s.to_string()))
    }
}

/// A single instruction applied to a list of targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub gate: StimGate,
    pub targets: Vec<u32>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gate)?;
        self.targets.iter().try_for_each(|t| write!(f, " {}", t))
    }
}

/// A program of Stim instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StimCircuit {
    instructions: Vec<Instruction>,
}

impl StimCircuit {
    pub fn new() -> Self { Self::default() }

    /// Append an instruction, merging it into the previous one if both have
    /// the same gate.
    ///
    /// Fails if a two-qubit gate gets an odd number of targets or a pair of
    /// identical targets.
    pub fn append_operation(&mut self, gate: StimGate, targets: &[u32])
        -> Result<&mut Self>
    {
        if gate.is_two_qubit() {
            if targets.len() % 2 != 0 {
                return Err(Error::stim_targets(
                    gate.name(),
                    format!("two-qubit gate given an odd number of targets ({})", targets.len()),
                ));
            }
            if let Some((a, _)) = targets.iter().tuples().find(|(a, b)| a == b) {
                return Err(Error::stim_targets(
                    gate.name(),
                    format!("interacting a target with itself ({})", a),
                ));
            }
        }
        if targets.is_empty() { return Ok(self); }
        match self.instructions.last_mut() {
            Some(last) if last.gate == gate => {
                last.targets.extend_from_slice(targets);
            },
            _ => {
                self.instructions.push(
                    Instruction { gate, targets: targets.to_vec() });
            },
        }
        Ok(self)
    }

    pub fn instructions(&self) -> &[Instruction] { &self.instructions }

    /// One more than the largest target index, or 0 if there are no targets.
    pub fn num_qubits(&self) -> usize {
        self.instructions.iter()
            .flat_map(|instr| instr.targets.iter())
            .max()
            .map(|t| *t as usize + 1)
            .unwrap_or(0)
    }

    /// Total number of measurement results produced per shot.
    pub fn num_measurements(&self) -> usize {
        self.instructions.iter()
            .filter(|instr| instr.gate == StimGate::M)
            .map(|instr| instr.targets.len())
            .sum()
    }

    /// Create a sampler for this program whose shots are seeded from `seed`.
    pub fn compile_sampler(&self, seed: u64) -> Sampler {
        Sampler {
            circuit: self.clone(),
            n: self.num_qubits(),
            seed,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl fmt::Display for StimCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instructions.iter().join("\n"))
    }
}

impl FromStr for StimCircuit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut circ = Self::new();
        for (k, line) in s.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() { continue; }
            let mut tokens = line.split_whitespace();
            let Some(name) = tokens.next() else { continue; };
            let gate: StimGate
                = name.parse()
                .map_err(|_| Error::stim_parse(k + 1, format!("unknown gate '{}'", name)))?;
            let targets: Vec<u32>
                = tokens
                .map(|t| {
                    t.parse::<u32>()
                        .map_err(|_| Error::stim_parse(k + 1, format!("invalid target '{}'", t)))
                })
                .collect::<Result<_>>()?;
            circ.append_operation(gate, &targets)
                .map_err(|e| Error::stim_parse(k + 1, e.to_string()))?;
        }
        Ok(circ)
    }
}

/// Default minimum number of shots before sampling runs in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

// splitmix64 finalizer; decorrelates per-shot seeds drawn from one master seed
fn shot_seed(seed: u64, shot: u64) -> u64 {
    let mut z = seed.wrapping_add(shot.wrapping_add(1).wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Draws measurement records from a compiled [`StimCircuit`].
///
/// Every shot gets its own RNG seeded from the sampler's seed and the shot
/// index, so output depends only on the seed and never on whether shots run
/// in parallel.
#[derive(Clone, Debug)]
pub struct Sampler {
    circuit: StimCircuit,
    n: usize,
    seed: u64,
    parallel: bool,
    parallel_threshold: usize,
}

impl Sampler {
    /// Enable or disable parallel sampling for batches of at least
    /// `threshold` shots.
    pub fn with_parallel(mut self, parallel: bool, threshold: usize) -> Self {
        self.parallel = parallel;
        self.parallel_threshold = threshold;
        self
    }

    pub fn seed(&self) -> u64 { self.seed }

    fn run_shot(&self, shot: usize) -> Vec<bool> {
        let mut rng = StdRng::seed_from_u64(shot_seed(self.seed, shot as u64));
        let mut tab = Tableau::new(self.n);
        let mut record: Vec<bool> = Vec::with_capacity(self.circuit.num_measurements());
        for instr in self.circuit.instructions.iter() {
            let ts = instr.targets.iter().map(|t| *t as usize);
            match instr.gate {
                StimGate::I => { },
                StimGate::X => { ts.for_each(|k| { tab.x(k); }); },
                StimGate::Y => { ts.for_each(|k| { tab.y(k); }); },
                StimGate::Z => { ts.for_each(|k| { tab.z(k); }); },
                StimGate::H => { ts.for_each(|k| { tab.h(k); }); },
                StimGate::S => { ts.for_each(|k| { tab.s(k); }); },
                StimGate::SDag => { ts.for_each(|k| { tab.s_dag(k); }); },
                StimGate::SqrtX => { ts.for_each(|k| { tab.sqrt_x(k); }); },
                StimGate::SqrtXDag => { ts.for_each(|k| { tab.sqrt_x_dag(k); }); },
                StimGate::CX => { ts.tuples().for_each(|(a, b)| { tab.cx(a, b); }); },
                StimGate::CY => { ts.tuples().for_each(|(a, b)| { tab.cy(a, b); }); },
                StimGate::CZ => { ts.tuples().for_each(|(a, b)| { tab.cz(a, b); }); },
                StimGate::ISwap => { ts.tuples().for_each(|(a, b)| { tab.iswap(a, b); }); },
                StimGate::Swap => { ts.tuples().for_each(|(a, b)| { tab.swap(a, b); }); },
                StimGate::M => {
                    ts.for_each(|k| { record.push(tab.measure(k, &mut rng).is_1()); });
                },
                StimGate::R => { ts.for_each(|k| { tab.reset(k, &mut rng); }); },
            }
        }
        record
    }

    /// Sample `shots` measurement records, each listing results in the order
    /// the measurements appear in the program.
    pub fn sample(&self, shots: usize) -> Vec<Vec<bool>> {
        let parallel = self.parallel && shots >= self.parallel_threshold;
        trace!(
            shots,
            parallel,
            n_qubits = self.n,
            n_measurements = self.circuit.num_measurements(),
            "sampling"
        );
        if parallel {
            (0..shots).into_par_iter().map(|k| self.run_shot(k)).collect()
        } else {
            (0..shots).map(|k| self.run_shot(k)).collect()
        }
    }
}
