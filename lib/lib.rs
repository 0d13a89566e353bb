//! A sampling backend for Clifford circuits.
//!
//! Circuits are built from named qubits and bits, compiled by a short sequence
//! of passes into the gate set {CX, H, S} plus measurements and resets,
//! translated into a Stim-style instruction program, and sampled shot-by-shot
//! on a stabilizer tableau. Simulation is efficient for any number of qubits,
//! but all operations are limited to Clifford-group transformations (i.e.
//! Hadamard, Pauli, singly controlled Pauli, or rotations that are integer
//! multiples of π/2).
//!
//! ```
//! use stim_backend::{ Backend, StimBackend, circuit::Circuit, config::BackendConfig };
//!
//! # fn main() -> stim_backend::Result<()> {
//! let mut circ = Circuit::new(3, 3);
//! circ.h(0)?.cx(0, 1)?.cx(1, 2)?.measure_all()?;
//! let mut backend = StimBackend::with_config(BackendConfig::seeded(1));
//! let result = backend.run_circuit(&circ, 10, true)?;
//! for shot in result.get_shots() {
//!     assert!(shot == [false; 3] || shot == [true; 3]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gate;
pub mod circuit;
pub mod predicates;
pub mod rebase;
pub mod passes;
pub mod tableau;
pub mod stim;
pub mod outcome;
pub mod result;
pub mod backend;
pub mod stim_backend;
pub mod config;
pub mod logging;

pub use error::{ Error, Result };
pub use backend::{ Backend, BackendInfo, Shots };
pub use stim_backend::StimBackend;
