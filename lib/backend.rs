//! The general contract shared by circuit-running backends.
//!
//! A backend advertises its capabilities through a [`BackendInfo`] and a list
//! of required [`Predicate`]s, offers a default compilation [`Pass`] that
//! brings arbitrary circuits into a form satisfying them, and runs circuits
//! asynchronously in principle: [`Backend::process_circuits`] returns
//! [`ResultHandle`]s that are later exchanged for [`BackendResult`]s.

use std::collections::BTreeSet;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;
use crate::{
    circuit::Circuit,
    error::{ Error, Result },
    gate::OpType,
    passes::Pass,
    predicates::Predicate,
    result::{ BackendResult, CircuitStatus, ResultHandle },
};

/// Static description of a backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub name: String,
    pub device_name: Option<String>,
    pub version: String,
    /// Qubit connectivity, if restricted.
    pub architecture: Option<Vec<(u32, u32)>>,
    pub gate_set: BTreeSet<OpType>,
}

/// Number of shots to take for each of a batch of circuits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shots {
    /// The same number for every circuit.
    Each(usize),
    /// One count per circuit.
    PerCircuit(Vec<usize>),
}

impl Shots {
    /// Expand to one count per circuit.
    ///
    /// # Errors
    /// Fails with [`Error::ShotsLengthMismatch`] if a per-circuit list has the
    /// wrong length.
    pub fn resolve(&self, n_circuits: usize) -> Result<Vec<usize>> {
        match self {
            Self::Each(n) => Ok(vec![*n; n_circuits]),
            Self::PerCircuit(ns) if ns.len() == n_circuits => Ok(ns.clone()),
            Self::PerCircuit(ns) => Err(Error::ShotsLengthMismatch {
                shots: ns.len(),
                circuits: n_circuits,
            }),
        }
    }
}

impl From<usize> for Shots {
    fn from(n: usize) -> Self { Self::Each(n) }
}

impl From<Vec<usize>> for Shots {
    fn from(ns: Vec<usize>) -> Self { Self::PerCircuit(ns) }
}

impl From<&[usize]> for Shots {
    fn from(ns: &[usize]) -> Self { Self::PerCircuit(ns.to_vec()) }
}

/// Storage for results awaiting retrieval.
pub type ResultCache = FxHashMap<ResultHandle, BackendResult>;

fn compile_with(pass: &dyn Pass, circ: &Circuit, optimisation_level: u8)
    -> Result<Circuit>
{
    let mut compiled = circ.clone();
    pass.apply(&mut compiled)?;
    debug!(
        optimisation_level,
        n_gates_in = circ.n_gates(),
        n_gates_out = compiled.n_gates(),
        "compiled circuit"
    );
    Ok(compiled)
}

/// A device or simulator that runs circuits.
pub trait Backend {
    fn backend_info(&self) -> &BackendInfo;

    /// Conditions every circuit must satisfy to be run.
    fn required_predicates(&self) -> Vec<Box<dyn Predicate>>;

    /// Pass rewriting any circuit into the backend's gate set.
    fn rebase_pass(&self) -> Box<dyn Pass>;

    /// Pass taking any circuit to one satisfying
    /// [`Self::required_predicates`].
    fn default_compilation_pass(&self, optimisation_level: u8) -> Result<Box<dyn Pass>>;

    /// Submit circuits, returning one handle per circuit.
    fn process_circuits(
        &mut self,
        circuits: &[Circuit],
        n_shots: Shots,
        valid_check: bool,
    ) -> Result<Vec<ResultHandle>>;

    fn circuit_status(&self, handle: &ResultHandle) -> Result<CircuitStatus>;

    fn cache(&self) -> &ResultCache;

    fn cache_mut(&mut self) -> &mut ResultCache;

    /// Whether results can be returned as individual shots.
    fn supports_shots(&self) -> bool { false }

    /// Whether results can be returned as counts.
    fn supports_counts(&self) -> bool { false }

    /// Return `true` if `circ` satisfies every required predicate.
    fn valid_circuit(&self, circ: &Circuit) -> bool {
        self.required_predicates().iter().all(|pred| pred.verify(circ))
    }

    /// Check every circuit against every required predicate, failing on the
    /// first violation.
    fn check_all_circuits(&self, circuits: &[Circuit]) -> Result<()> {
        let preds = self.required_predicates();
        for (index, circ) in circuits.iter().enumerate() {
            if let Some(pred) = preds.iter().find(|pred| !pred.verify(circ)) {
                return Err(Error::CircuitNotValid { index, predicate: pred.name() });
            }
        }
        Ok(())
    }

    /// Return a copy of `circ` compiled with
    /// [`Self::default_compilation_pass`].
    fn get_compiled_circuit(&self, circ: &Circuit, optimisation_level: u8)
        -> Result<Circuit>
    {
        let pass = self.default_compilation_pass(optimisation_level)?;
        compile_with(pass.as_ref(), circ, optimisation_level)
    }

    fn get_compiled_circuits(&self, circuits: &[Circuit], optimisation_level: u8)
        -> Result<Vec<Circuit>>
    {
        let pass = self.default_compilation_pass(optimisation_level)?;
        circuits.iter()
            .map(|circ| compile_with(pass.as_ref(), circ, optimisation_level))
            .collect()
    }

    fn process_circuit(&mut self, circ: &Circuit, n_shots: usize, valid_check: bool)
        -> Result<ResultHandle>
    {
        self.process_circuits(std::slice::from_ref(circ), Shots::Each(n_shots), valid_check)?
            .pop()
            .ok_or_else(|| Error::CircuitNotRun("no handle returned".into()))
    }

    /// Retrieve a result, leaving it in the cache.
    fn get_result(&self, handle: &ResultHandle) -> Result<BackendResult> {
        self.cache().get(handle)
            .cloned()
            .ok_or_else(|| Error::CircuitNotRun(handle.to_string()))
    }

    fn get_results(&self, handles: &[ResultHandle]) -> Result<Vec<BackendResult>> {
        handles.iter().map(|h| self.get_result(h)).collect()
    }

    /// Remove a result from the cache, returning it if present.
    fn pop_result(&mut self, handle: &ResultHandle) -> Option<BackendResult> {
        self.cache_mut().remove(handle)
    }

    fn empty_cache(&mut self) { self.cache_mut().clear(); }

    /// Process a single circuit and immediately retrieve its result.
    fn run_circuit(&mut self, circ: &Circuit, n_shots: usize, valid_check: bool)
        -> Result<BackendResult>
    {
        let handle = self.process_circuit(circ, n_shots, valid_check)?;
        self.get_result(&handle)
    }

    /// Process circuits and immediately retrieve their results, in order.
    fn run_circuits(&mut self, circuits: &[Circuit], n_shots: Shots, valid_check: bool)
        -> Result<Vec<BackendResult>>
    {
        let handles = self.process_circuits(circuits, n_shots, valid_check)?;
        self.get_results(&handles)
    }
}
