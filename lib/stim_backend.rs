//! A [`Backend`] simulating Clifford circuits with a stabilizer tableau.
//!
//! # Example
//! ```
//! use stim_backend::{ Backend, StimBackend, circuit::Circuit, config::BackendConfig };
//!
//! # fn main() -> stim_backend::Result<()> {
//! let mut circ = Circuit::new(2, 2);
//! circ.h(0)?.cx(0, 1)?.measure_all()?;
//!
//! let mut backend = StimBackend::with_config(BackendConfig::seeded(10546));
//! let compiled = backend.get_compiled_circuit(&circ, 1)?;
//! let handle = backend.process_circuit(&compiled, 100, true)?;
//! let counts = backend.get_result(&handle)?.get_counts();
//! // only 00 and 11 appear
//! assert!(counts.keys().all(|k| k[0] == k[1]));
//! assert_eq!(counts.values().sum::<usize>(), 100);
//! # Ok(())
//! # }
//! ```

use once_cell::sync::Lazy;
use rand::{ Rng, SeedableRng, rngs::StdRng };
use rustc_hash::FxHashMap;
use tracing::{ debug, debug_span };
use crate::{
    backend::{ Backend, BackendInfo, ResultCache, Shots },
    circuit::{ Bit, Circuit, Qubit },
    config::BackendConfig,
    error::{ Error, Result },
    gate::OpType,
    outcome::OutcomeArray,
    passes::{
        DecomposeBoxes,
        FlattenRegisters,
        Pass,
        RebaseCustom,
        RemoveRedundancies,
        SequencePass,
    },
    predicates::{
        DefaultRegisterPredicate,
        GateSetPredicate,
        NoClassicalControlPredicate,
        Predicate,
    },
    rebase::tk1_to_cliff,
    result::{ BackendResult, CircuitStatus, ResultHandle, StatusEnum },
    stim::{ StimCircuit, StimGate },
};

/// Operations the backend runs natively, with their simulator instructions.
pub const GATE_TABLE: [(OpType, StimGate); 15] = [
    (OpType::Noop,     StimGate::I),
    (OpType::X,        StimGate::X),
    (OpType::Y,        StimGate::Y),
    (OpType::Z,        StimGate::Z),
    (OpType::H,        StimGate::H),
    (OpType::S,        StimGate::S),
    (OpType::SX,       StimGate::SqrtX),
    (OpType::SXdg,     StimGate::SqrtXDag),
    (OpType::CX,       StimGate::CX),
    (OpType::CY,       StimGate::CY),
    (OpType::CZ,       StimGate::CZ),
    (OpType::ISWAPMax, StimGate::ISwap),
    (OpType::SWAP,     StimGate::Swap),
    (OpType::Measure,  StimGate::M),
    (OpType::Reset,    StimGate::R),
];

/// Look up the simulator instruction for an operation.
pub fn stim_gate(kind: OpType) -> Option<StimGate> {
    GATE_TABLE.iter().find(|(k, _)| *k == kind).map(|(_, g)| *g)
}

static BACKEND_INFO: Lazy<BackendInfo> = Lazy::new(|| {
    BackendInfo {
        name: "StimBackend".to_string(),
        device_name: None,
        version: env!("CARGO_PKG_VERSION").to_string(),
        architecture: None,
        gate_set: GATE_TABLE.iter().map(|(k, _)| *k).collect(),
    }
});

/// A translated circuit: the simulator program, plus which measurement record
/// entry to read for each of the circuit's bits (in sorted order).
#[derive(Clone, Debug)]
pub struct Translated {
    pub program: StimCircuit,
    pub bits: Vec<Bit>,
    pub readout_index: Vec<usize>,
}

/// Translate a circuit into a simulator program.
///
/// Qubits are numbered by their position in [`Circuit::qubits`]. Every
/// measurement must write to a distinct bit, and every bit must be written by
/// some measurement.
pub fn translate(circ: &Circuit) -> Result<Translated> {
    let index: FxHashMap<&Qubit, u32>
        = circ.qubits().iter().enumerate().map(|(k, q)| (q, k as u32)).collect();
    let lookup = |q: &Qubit| -> Result<u32> {
        index.get(q).copied().ok_or_else(|| Error::UnitMissing(q.to_string()))
    };
    let mut program = StimCircuit::new();
    let mut readout: FxHashMap<&Bit, usize> = FxHashMap::default();
    for cmd in circ.commands().iter() {
        let kind = cmd.kind();
        if cmd.is_conditional() {
            return Err(Error::UnsupportedOp(format!("conditional {}", kind)));
        }
        let gate = stim_gate(kind).ok_or_else(|| Error::UnsupportedOp(kind.to_string()))?;
        let targets: Vec<u32> = cmd.qubits.iter().map(lookup).collect::<Result<_>>()?;
        if kind == OpType::Measure {
            let bit = cmd.bits.first().ok_or_else(|| Error::ArityMismatch {
                op: kind.to_string(),
                what: "bit",
                expected: 1,
                got: 0,
            })?;
            if readout.contains_key(bit) {
                return Err(Error::MeasurementOverwritten(bit.to_string()));
            }
            readout.insert(bit, readout.len());
        }
        program.append_operation(gate, &targets)?;
    }
    let bits: Vec<Bit> = circ.bits().iter().cloned().collect();
    let readout_index: Vec<usize>
        = bits.iter()
        .map(|b| readout.get(b).copied().ok_or_else(|| Error::BitNotMeasured(b.to_string())))
        .collect::<Result<_>>()?;
    Ok(Translated { program, bits, readout_index })
}

/// Sampling backend for Clifford circuits.
#[derive(Clone, Debug)]
pub struct StimBackend {
    config: BackendConfig,
    cache: ResultCache,
    // master RNG drawing one sampler seed per circuit
    rng: StdRng,
}

impl Default for StimBackend {
    fn default() -> Self { Self::new() }
}

impl StimBackend {
    /// Create a new backend with default settings, seeded from system
    /// entropy.
    pub fn new() -> Self { Self::with_config(BackendConfig::default()) }

    pub fn with_config(config: BackendConfig) -> Self {
        let rng
            = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
        Self { config, cache: ResultCache::default(), rng }
    }

    pub fn config(&self) -> &BackendConfig { &self.config }

    fn run_one(&self, circ: &Circuit, n_shots: usize, seed: u64) -> Result<BackendResult> {
        let Translated { program, bits, readout_index } = translate(circ)?;
        let sampler
            = program.compile_sampler(seed)
            .with_parallel(self.config.parallel, self.config.parallel_threshold);
        let rows: Vec<Vec<bool>>
            = sampler.sample(n_shots).into_iter()
            .map(|record| readout_index.iter().map(|&r| record[r]).collect())
            .collect();
        Ok(BackendResult::new(bits.clone(), OutcomeArray::with_width(bits.len(), &rows)))
    }
}

impl Backend for StimBackend {
    fn backend_info(&self) -> &BackendInfo { &BACKEND_INFO }

    fn required_predicates(&self) -> Vec<Box<dyn Predicate>> {
        vec![
            Box::new(DefaultRegisterPredicate),
            Box::new(GateSetPredicate::new(GATE_TABLE.iter().map(|(k, _)| *k))),
            Box::new(NoClassicalControlPredicate),
        ]
    }

    fn rebase_pass(&self) -> Box<dyn Pass> {
        Box::new(RebaseCustom::new([OpType::CX, OpType::H, OpType::S], None, tk1_to_cliff))
    }

    /// No optimisation is performed, so every valid level gives the same pass.
    fn default_compilation_pass(&self, optimisation_level: u8) -> Result<Box<dyn Pass>> {
        if optimisation_level > 2 {
            return Err(Error::InvalidOptimisationLevel(optimisation_level));
        }
        Ok(Box::new(SequencePass::new(vec![
            Box::new(DecomposeBoxes),
            Box::new(FlattenRegisters),
            self.rebase_pass(),
            Box::new(RemoveRedundancies),
        ])))
    }

    fn process_circuits(
        &mut self,
        circuits: &[Circuit],
        n_shots: Shots,
        valid_check: bool,
    ) -> Result<Vec<ResultHandle>>
    {
        let _span
            = debug_span!("process_circuits", n_circuits = circuits.len()).entered();
        let shots = n_shots.resolve(circuits.len())?;
        if valid_check { self.check_all_circuits(circuits)?; }
        let seeds: Vec<u64> = circuits.iter().map(|_| self.rng.gen()).collect();
        let results: Vec<BackendResult>
            = circuits.iter().zip(shots.iter()).zip(seeds)
            .map(|((circ, &n), seed)| self.run_one(circ, n, seed))
            .collect::<Result<_>>()?;
        let handles: Vec<ResultHandle>
            = results.into_iter()
            .map(|res| {
                let handle = ResultHandle::new();
                debug!(
                    handle = %handle,
                    n_bits = res.get_bitlist().len(),
                    n_shots = res.n_shots(),
                    "processed circuit"
                );
                self.cache.insert(handle.clone(), res);
                handle
            })
            .collect();
        Ok(handles)
    }

    fn circuit_status(&self, handle: &ResultHandle) -> Result<CircuitStatus> {
        if self.cache.contains_key(handle) {
            Ok(CircuitStatus::new(StatusEnum::Completed))
        } else {
            Err(Error::CircuitNotRun(handle.to_string()))
        }
    }

    fn cache(&self) -> &ResultCache { &self.cache }

    fn cache_mut(&mut self) -> &mut ResultCache { &mut self.cache }

    fn supports_shots(&self) -> bool { true }

    fn supports_counts(&self) -> bool { true }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::circuit::{ Command, Op };

    fn backend() -> StimBackend { StimBackend::with_config(BackendConfig::seeded(10546)) }

    fn bell() -> Circuit {
        let mut circ = Circuit::new(2, 2);
        circ.h(0).unwrap().cx(0, 1).unwrap().measure_all().unwrap();
        circ
    }

    #[test]
    fn info() {
        let b = backend();
        let info = b.backend_info();
        assert_eq!(info.name, "StimBackend");
        assert!(info.device_name.is_none() && info.architecture.is_none());
        assert_eq!(info.gate_set.len(), 15);
        assert!(info.gate_set.contains(&OpType::ISWAPMax));
        assert!(!info.gate_set.contains(&OpType::T));
        assert!(b.supports_shots() && b.supports_counts());
    }

    #[test]
    fn translate_program() {
        let mut circ = Circuit::new(3, 2);
        circ.h(0).unwrap()
            .iswap_max(0, 2).unwrap()
            .sx(1).unwrap()
            .measure(2, 0).unwrap()
            .measure(0, 1).unwrap()
            .reset(1).unwrap()
            .noop(1).unwrap();
        let tr = translate(&circ).unwrap();
        assert_eq!(tr.program.to_string(), "H 0\nISWAP 0 2\nSQRT_X 1\nM 2 0\nR 1\nI 1");
        assert_eq!(tr.readout_index, vec![0, 1]);
    }

    #[test]
    fn translate_errors() {
        let mut circ = Circuit::new(1, 1);
        circ.measure(0, 0).unwrap().measure(0, 0).unwrap();
        assert!(matches!(translate(&circ), Err(Error::MeasurementOverwritten(_))));

        let mut circ = Circuit::new(1, 2);
        circ.measure(0, 1).unwrap();
        assert!(matches!(translate(&circ), Err(Error::BitNotMeasured(_))));

        let mut circ = Circuit::new(1, 0);
        circ.t(0).unwrap();
        assert!(matches!(translate(&circ), Err(Error::UnsupportedOp(_))));

        // commands installed by a pass bypass the builder checks
        let mut circ = Circuit::new(1, 1);
        circ.replace_commands(vec![
            Command::new(Op::new(OpType::Measure), vec![Qubit::new(0)], vec![]),
        ]);
        assert!(matches!(
            translate(&circ),
            Err(Error::ArityMismatch { what: "bit", expected: 1, got: 0, .. })
        ));
    }

    #[test]
    fn bits_returned_in_bit_order() {
        // measure into c[1] first, then c[0]
        let mut circ = Circuit::new(2, 2);
        circ.x(1).unwrap().measure(1, 1).unwrap().measure(0, 0).unwrap();
        let res = backend().run_circuit(&circ, 5, true).unwrap();
        assert_eq!(res.get_bitlist(), &[Bit::new(0), Bit::new(1)]);
        assert!(res.get_shots().iter().all(|s| s == &[false, true]));
    }

    #[test]
    fn bell_counts() {
        let mut b = backend();
        let res = b.run_circuit(&bell(), 400, true).unwrap();
        let counts = res.get_counts();
        assert_eq!(counts.len(), 2);
        assert!(counts.keys().all(|k| k[0] == k[1]));
        assert_eq!(counts.values().sum::<usize>(), 400);
    }

    #[test]
    fn shots_list() {
        let mut b = backend();
        let circs = [bell(), bell()];
        let handles = b.process_circuits(&circs, Shots::PerCircuit(vec![3, 7]), true).unwrap();
        assert_eq!(handles.len(), 2);
        assert_eq!(b.get_result(&handles[0]).unwrap().n_shots(), 3);
        assert_eq!(b.get_result(&handles[1]).unwrap().n_shots(), 7);
        assert!(matches!(
            b.process_circuits(&circs, Shots::PerCircuit(vec![3]), true),
            Err(Error::ShotsLengthMismatch { .. })
        ));
    }

    #[test]
    fn zero_shots() {
        let res = backend().run_circuit(&bell(), 0, true).unwrap();
        assert_eq!(res.n_shots(), 0);
        assert!(res.get_counts().is_empty());
    }

    #[test]
    fn validity_check() {
        let mut b = backend();
        let mut circ = Circuit::new(1, 1);
        circ.t(0).unwrap().measure(0, 0).unwrap();
        assert!(!b.valid_circuit(&circ));
        assert!(matches!(
            b.process_circuits(&[bell(), circ.clone()], Shots::Each(1), true),
            Err(Error::CircuitNotValid { index: 1, predicate: "GateSetPredicate" })
        ));
        assert!(b.cache().is_empty());

        let mut circ = Circuit::new(1, 1);
        let cmd = Command {
            op: Op::new(OpType::X),
            qubits: vec![Qubit::new(0)],
            bits: Vec::new(),
            condition: Some(crate::circuit::Condition { bits: vec![Bit::new(0)], value: 1 }),
        };
        circ.measure(0, 0).unwrap().add_command(cmd).unwrap();
        assert!(matches!(
            b.process_circuits(&[circ], Shots::Each(1), true),
            Err(Error::CircuitNotValid { index: 0, predicate: "NoClassicalControlPredicate" })
        ));
    }

    #[test]
    fn compile_then_run() {
        let b = backend();
        let mut circ = Circuit::default();
        circ.add_q_register("a", 2).unwrap().add_c_register("m", 2).unwrap();
        let mut inner = Circuit::new(2, 0);
        inner.ry(0.5, 0).unwrap().cz(0, 1).unwrap().sxdg(1).unwrap();
        let cmd = Command::new(
            Op::CircBox(Box::new(inner)),
            vec![Qubit::named("a", [0]), Qubit::named("a", [1])],
            Vec::new(),
        );
        circ.add_command(cmd).unwrap();
        for k in 0..2 {
            let cmd = Command::new(
                Op::new(OpType::Measure),
                vec![Qubit::named("a", [k])],
                vec![Bit::named("m", [k])],
            );
            circ.add_command(cmd).unwrap();
        }
        assert!(!b.valid_circuit(&circ));
        let compiled = b.get_compiled_circuit(&circ, 2).unwrap();
        assert!(b.valid_circuit(&compiled));
        assert_eq!(compiled.count_kind(OpType::CZ), 0);
        assert!(matches!(
            b.get_compiled_circuit(&circ, 3),
            Err(Error::InvalidOptimisationLevel(3))
        ));
    }

    #[test]
    fn cache_lifecycle() {
        let mut b = backend();
        let handle = b.process_circuit(&bell(), 10, true).unwrap();
        assert_eq!(b.circuit_status(&handle).unwrap().status, StatusEnum::Completed);
        assert!(b.get_result(&handle).is_ok());
        assert!(b.pop_result(&handle).is_some());
        assert!(b.circuit_status(&handle).unwrap_err().is_not_run());
        assert!(b.get_result(&handle).unwrap_err().is_not_run());

        let h2 = b.process_circuit(&bell(), 1, false).unwrap();
        b.empty_cache();
        assert!(b.circuit_status(&h2).is_err());
        assert!(b.circuit_status(&ResultHandle::from("nope")).is_err());
    }

    #[test]
    fn seeded_backends_agree() {
        let mut a = backend();
        let mut b = backend();
        let ra = a.run_circuits(&[bell(), bell()], Shots::Each(50), true).unwrap();
        let rb = b.run_circuits(&[bell(), bell()], Shots::Each(50), true).unwrap();
        assert_eq!(ra, rb);
    }
}
