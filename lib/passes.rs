//! Compilation passes that rewrite a [`Circuit`] in place.
//!
//! The passes here are exactly those needed to take an arbitrary Clifford
//! circuit to the gate set of the Stim backend: boxes are inlined, registers
//! are renamed to the defaults, gates are rebased to {CX, H, S}, and trivially
//! redundant gates are removed. None of them perform any further
//! optimization.

use std::collections::BTreeSet;
use rustc_hash::{ FxHashMap, FxHashSet };
use tracing::trace;
use crate::{
    circuit::{ Bit, Circuit, Command, Condition, Op, Qubit },
    error::{ Error, Result },
    gate::OpType,
    rebase::{ op_to_tk1, two_qubit_via_cx },
};

/// A transformation of a circuit.
pub trait Pass: Send + Sync {
    /// Short name identifying the pass in logs.
    fn name(&self) -> &'static str;

    /// Apply the pass to `circ`, returning `true` if anything changed.
    fn apply(&self, circ: &mut Circuit) -> Result<bool>;
}

/// Apply a series of passes in order.
pub struct SequencePass(pub Vec<Box<dyn Pass>>);

impl SequencePass {
    pub fn new(passes: Vec<Box<dyn Pass>>) -> Self { Self(passes) }
}

impl Pass for SequencePass {
    fn name(&self) -> &'static str { "SequencePass" }

    fn apply(&self, circ: &mut Circuit) -> Result<bool> {
        let mut changed = false;
        for pass in self.0.iter() {
            let c = pass.apply(circ)?;
            trace!(pass = pass.name(), changed = c, n_gates = circ.n_gates());
            changed |= c;
        }
        Ok(changed)
    }
}

/// Replace every [`Op::CircBox`] by its contents, recursively.
///
/// The box's qubits and bits, in sorted order, are mapped onto the command's
/// arguments. A condition on the box command is carried over to every inlined
/// command; boxes that are themselves conditional may not contain conditional
/// commands.
#[derive(Copy, Clone, Debug, Default)]
pub struct DecomposeBoxes;

impl DecomposeBoxes {
    fn inline(
        &self,
        outer: &Command,
        inner: &Circuit,
        acc: &mut Vec<Command>,
        phase: &mut f64,
    ) -> Result<()>
    {
        let mut inner = inner.clone();
        self.apply(&mut inner)?;
        let qmap: FxHashMap<&Qubit, &Qubit>
            = inner.qubits().iter().zip(outer.qubits.iter()).collect();
        let bmap: FxHashMap<&Bit, &Bit>
            = inner.bits().iter().zip(outer.bits.iter()).collect();
        let map_bit = |b: &Bit| -> Result<Bit> {
            bmap.get(b).map(|b| (*b).clone())
                .ok_or_else(|| Error::UnitMissing(b.to_string()))
        };
        for cmd in inner.commands().iter() {
            let qubits
                = cmd.qubits.iter()
                .map(|q| {
                    qmap.get(q).map(|q| (*q).clone())
                        .ok_or_else(|| Error::UnitMissing(q.to_string()))
                })
                .collect::<Result<Vec<Qubit>>>()?;
            let bits = cmd.bits.iter().map(map_bit).collect::<Result<Vec<Bit>>>()?;
            let condition
                = match (&outer.condition, &cmd.condition) {
                    (None, None) => None,
                    (Some(cond), None) => Some(cond.clone()),
                    (None, Some(cond)) => Some(Condition {
                        bits: cond.bits.iter().map(map_bit).collect::<Result<_>>()?,
                        value: cond.value,
                    }),
                    (Some(_), Some(_)) => {
                        return Err(Error::UnsupportedOp(
                            "conditional command inside a conditional CircBox".into()
                        ));
                    },
                };
            acc.push(Command { op: cmd.op.clone(), qubits, bits, condition });
        }
        // a phase under a condition is not global
        if outer.condition.is_none() { *phase += inner.phase(); }
        Ok(())
    }
}

impl Pass for DecomposeBoxes {
    fn name(&self) -> &'static str { "DecomposeBoxes" }

    fn apply(&self, circ: &mut Circuit) -> Result<bool> {
        if circ.commands().iter().all(|cmd| cmd.kind() != OpType::CircBox) {
            return Ok(false);
        }
        let commands = circ.take_commands();
        let mut acc: Vec<Command> = Vec::with_capacity(commands.len());
        let mut phase: f64 = 0.0;
        for cmd in commands.into_iter() {
            match &cmd.op {
                Op::CircBox(inner) => {
                    self.inline(&cmd, inner, &mut acc, &mut phase)?;
                },
                Op::Gate { .. } => { acc.push(cmd); },
            }
        }
        circ.replace_commands(acc);
        circ.add_phase(phase);
        Ok(true)
    }
}

/// Relabel all qubits as `q[0], ..., q[n - 1]` and all bits as `c[0], ...,
/// c[m - 1]`, preserving their sorted order.
#[derive(Copy, Clone, Debug, Default)]
pub struct FlattenRegisters;

impl Pass for FlattenRegisters {
    fn name(&self) -> &'static str { "FlattenRegisters" }

    fn apply(&self, circ: &mut Circuit) -> Result<bool> {
        let qmap: FxHashMap<Qubit, Qubit>
            = circ.qubits().iter().enumerate()
            .map(|(k, q)| (q.clone(), Qubit::new(k as u32)))
            .collect();
        let bmap: FxHashMap<Bit, Bit>
            = circ.bits().iter().enumerate()
            .map(|(k, b)| (b.clone(), Bit::new(k as u32)))
            .collect();
        if qmap.iter().all(|(a, b)| a == b) && bmap.iter().all(|(a, b)| a == b) {
            return Ok(false);
        }
        let relabel_q = |q: &mut Qubit| {
            if let Some(new) = qmap.get(q) { *q = new.clone(); }
        };
        let relabel_b = |b: &mut Bit| {
            if let Some(new) = bmap.get(b) { *b = new.clone(); }
        };
        let mut commands = circ.take_commands();
        for cmd in commands.iter_mut() {
            cmd.qubits.iter_mut().for_each(relabel_q);
            cmd.bits.iter_mut().for_each(relabel_b);
            if let Some(cond) = cmd.condition.as_mut() {
                cond.bits.iter_mut().for_each(relabel_b);
            }
        }
        let qubits: BTreeSet<Qubit> = qmap.into_values().collect();
        let bits: BTreeSet<Bit> = bmap.into_values().collect();
        circ.replace_units(qubits, bits);
        circ.replace_commands(commands);
        Ok(true)
    }
}

/// Produces a single-qubit replacement circuit (acting on `q[0]`) for
/// `TK1(a, b, c)`.
pub type Tk1Replacement = fn(f64, f64, f64) -> Result<Circuit>;

/// Rewrite every gate outside of a target gate set.
///
/// Two-qubit gates are first expanded in terms of CX (which is itself replaced
/// by `cx_replacement` if it is not in the gate set), and single-qubit gates
/// are converted to `TK1` form and passed to `tk1_replacement`. `Measure`,
/// `Reset`, `noop`, and boxes are left untouched.
#[derive(Clone, Debug)]
pub struct RebaseCustom {
    pub gateset: FxHashSet<OpType>,
    pub cx_replacement: Option<Circuit>,
    pub tk1_replacement: Tk1Replacement,
}

impl RebaseCustom {
    pub fn new<I>(
        gateset: I,
        cx_replacement: Option<Circuit>,
        tk1_replacement: Tk1Replacement,
    ) -> Self
    where I: IntoIterator<Item = OpType>
    {
        Self {
            gateset: gateset.into_iter().collect(),
            cx_replacement,
            tk1_replacement,
        }
    }

    fn keeps(&self, kind: OpType) -> bool {
        matches!(kind, OpType::Measure | OpType::Reset | OpType::Noop | OpType::CircBox)
            || self.gateset.contains(&kind)
    }

    // push the commands of `repl` onto `acc`, with its qubits (in sorted
    // order) mapped onto `qubits`
    fn splice(
        repl: &Circuit,
        qubits: &[Qubit],
        condition: &Option<Condition>,
        acc: &mut Vec<Command>,
    ) -> Result<()>
    {
        let qmap: FxHashMap<&Qubit, &Qubit>
            = repl.qubits().iter().zip(qubits).collect();
        for cmd in repl.commands().iter() {
            let qs
                = cmd.qubits.iter()
                .map(|q| {
                    qmap.get(q).map(|q| (*q).clone())
                        .ok_or_else(|| Error::UnitMissing(q.to_string()))
                })
                .collect::<Result<Vec<Qubit>>>()?;
            acc.push(Command {
                op: cmd.op.clone(),
                qubits: qs,
                bits: Vec::new(),
                condition: condition.clone(),
            });
        }
        Ok(())
    }

    fn rebase_single(
        &self,
        kind: OpType,
        params: &[f64],
        qubit: &Qubit,
        condition: &Option<Condition>,
        acc: &mut Vec<Command>,
        phase: &mut f64,
    ) -> Result<()>
    {
        if self.keeps(kind) {
            acc.push(Command {
                op: Op::with_params(kind, params.to_vec()),
                qubits: vec![qubit.clone()],
                bits: Vec::new(),
                condition: condition.clone(),
            });
            return Ok(());
        }
        let ([a, b, c], ph)
            = op_to_tk1(kind, params)
            .ok_or_else(|| Error::UnsupportedOp(kind.to_string()))?;
        let repl = (self.tk1_replacement)(a, b, c)?;
        Self::splice(&repl, std::slice::from_ref(qubit), condition, acc)?;
        if condition.is_none() { *phase += ph + repl.phase(); }
        Ok(())
    }

    fn rebase_cx(
        &self,
        qubits: &[Qubit],
        condition: &Option<Condition>,
        acc: &mut Vec<Command>,
        phase: &mut f64,
    ) -> Result<()>
    {
        if self.gateset.contains(&OpType::CX) {
            acc.push(Command {
                op: Op::new(OpType::CX),
                qubits: qubits.to_vec(),
                bits: Vec::new(),
                condition: condition.clone(),
            });
            return Ok(());
        }
        let repl
            = self.cx_replacement.as_ref()
            .ok_or_else(|| Error::UnsupportedOp(OpType::CX.to_string()))?;
        Self::splice(repl, qubits, condition, acc)?;
        if condition.is_none() { *phase += repl.phase(); }
        Ok(())
    }
}

impl Pass for RebaseCustom {
    fn name(&self) -> &'static str { "RebaseCustom" }

    fn apply(&self, circ: &mut Circuit) -> Result<bool> {
        if circ.commands().iter().all(|cmd| self.keeps(cmd.kind())) {
            return Ok(false);
        }
        let commands = circ.take_commands();
        let mut acc: Vec<Command> = Vec::with_capacity(commands.len());
        let mut phase: f64 = 0.0;
        for cmd in commands.into_iter() {
            let kind = cmd.kind();
            if self.keeps(kind) {
                acc.push(cmd);
            } else if kind == OpType::CX {
                self.rebase_cx(&cmd.qubits, &cmd.condition, &mut acc, &mut phase)?;
            } else if let Some(seq) = two_qubit_via_cx(kind) {
                for (sub, args) in seq.iter() {
                    let qs: Vec<Qubit>
                        = args.iter().map(|&k| cmd.qubits[k].clone()).collect();
                    if *sub == OpType::CX {
                        self.rebase_cx(&qs, &cmd.condition, &mut acc, &mut phase)?;
                    } else {
                        self.rebase_single(
                            *sub, &[], &qs[0], &cmd.condition, &mut acc, &mut phase)?;
                    }
                }
            } else if kind.n_qubits() == Some(1) {
                self.rebase_single(
                    kind,
                    cmd.op.params(),
                    &cmd.qubits[0],
                    &cmd.condition,
                    &mut acc,
                    &mut phase,
                )?;
            } else {
                return Err(Error::UnsupportedOp(kind.to_string()));
            }
        }
        circ.replace_commands(acc);
        circ.add_phase(phase);
        Ok(true)
    }
}

/// Remove gates that trivially have no effect.
///
/// Repeated until no further change is made:
/// - `noop`s and rotations by multiples of a full turn are removed
/// - adjacent rotations about the same axis on the same qubit are merged
/// - adjacent pairs of mutually inverse gates acting on the same qubits are
///   cancelled
///
/// Conditional commands, commands writing to bits, and boxes are never
/// touched and block merging across them.
#[derive(Copy, Clone, Debug, Default)]
pub struct RemoveRedundancies;

// tolerance on angles, in half-turns
const ANGLE_TOL: f64 = 1e-11;

// if a rotation by `angle` half-turns is the identity up to phase, return that
// phase
fn identity_phase(angle: f64) -> Option<f64> {
    let r = angle.rem_euclid(4.0);
    if r < ANGLE_TOL || 4.0 - r < ANGLE_TOL {
        Some(0.0)
    } else if (r - 2.0).abs() < ANGLE_TOL {
        Some(1.0)
    } else {
        None
    }
}

fn is_plain(cmd: &Command) -> bool {
    matches!(cmd.op, Op::Gate { .. })
        && cmd.kind().is_gate()
        && cmd.bits.is_empty()
        && cmd.condition.is_none()
}

impl RemoveRedundancies {
    // phase to add if `cmd` can be dropped outright
    fn drop_phase(cmd: &Command) -> Option<f64> {
        if cmd.kind() == OpType::Noop { return Some(0.0); }
        if !is_plain(cmd) { return None; }
        match cmd.kind() {
            OpType::Rx | OpType::Ry | OpType::Rz => identity_phase(cmd.op.params()[0]),
            OpType::TK1 => {
                cmd.op.params().iter()
                    .all(|p| identity_phase(*p) == Some(0.0))
                    .then_some(0.0)
            },
            _ => None,
        }
    }

    fn same_args(prev: &Command, cmd: &Command) -> bool {
        if prev.qubits == cmd.qubits { return true; }
        cmd.kind().is_symmetric()
            && prev.qubits.len() == 2
            && prev.qubits[0] == cmd.qubits[1]
            && prev.qubits[1] == cmd.qubits[0]
    }

    // run a single sweep over the circuit
    fn sweep(circ: &mut Circuit) -> bool {
        let commands = circ.take_commands();
        let mut kept: Vec<Option<Command>> = Vec::with_capacity(commands.len());
        let mut last: FxHashMap<Qubit, usize> = FxHashMap::default();
        let mut phase: f64 = 0.0;
        let mut changed = false;
        'cmds: for cmd in commands.into_iter() {
            if let Some(ph) = Self::drop_phase(&cmd) {
                phase += ph;
                changed = true;
                continue 'cmds;
            }
            if is_plain(&cmd) {
                let preds: Option<Vec<usize>>
                    = cmd.qubits.iter().map(|q| last.get(q).copied()).collect();
                if let Some(k) = preds.and_then(|p| {
                    let first = *p.first()?;
                    p.iter().all(|&j| j == first).then_some(first)
                }) {
                    if let Some(prev) = kept[k].as_ref().filter(|prev| {
                        is_plain(prev)
                            && prev.qubits.len() == cmd.qubits.len()
                            && Self::same_args(prev, &cmd)
                    }) {
                        let (pk, ck) = (prev.kind(), cmd.kind());
                        if pk.n_params() == 0 && ck.n_params() == 0 && pk.dagger_of(ck) {
                            kept[k] = None;
                            cmd.qubits.iter().for_each(|q| { last.remove(q); });
                            changed = true;
                            continue 'cmds;
                        }
                        if pk == ck && matches!(pk, OpType::Rx | OpType::Ry | OpType::Rz) {
                            let angle = prev.op.params()[0] + cmd.op.params()[0];
                            changed = true;
                            if let Some(ph) = identity_phase(angle) {
                                phase += ph;
                                kept[k] = None;
                                cmd.qubits.iter().for_each(|q| { last.remove(q); });
                            } else {
                                kept[k] = Some(Command::new(
                                    Op::with_params(pk, vec![angle]),
                                    cmd.qubits.clone(),
                                    Vec::new(),
                                ));
                            }
                            continue 'cmds;
                        }
                    }
                }
            }
            let idx = kept.len();
            cmd.qubits.iter().for_each(|q| { last.insert(q.clone(), idx); });
            kept.push(Some(cmd));
        }
        circ.replace_commands(kept.into_iter().flatten().collect());
        circ.add_phase(phase);
        changed
    }
}

impl Pass for RemoveRedundancies {
    fn name(&self) -> &'static str { "RemoveRedundancies" }

    fn apply(&self, circ: &mut Circuit) -> Result<bool> {
        let mut changed = false;
        while Self::sweep(circ) { changed = true; }
        Ok(changed)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rebase::tk1_to_cliff;

    fn clifford_rebase() -> RebaseCustom {
        RebaseCustom::new([OpType::CX, OpType::H, OpType::S], None, tk1_to_cliff)
    }

    #[test]
    fn decompose_nested_boxes() {
        let mut inner = Circuit::new(2, 0);
        inner.cx(0, 1).unwrap().add_phase(0.5);
        let mut mid = Circuit::new(2, 1);
        mid.h(1).unwrap()
            .add_circbox(inner, &[1, 0], &[]).unwrap()
            .measure(0, 0).unwrap();
        let mut circ = Circuit::new(3, 2);
        circ.add_circbox(mid, &[2, 0], &[1]).unwrap();

        assert!(DecomposeBoxes.apply(&mut circ).unwrap());
        let cmds = circ.commands();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0].kind(), OpType::H);
        assert_eq!(cmds[0].qubits, vec![Qubit::new(0)]);
        assert_eq!(cmds[1].kind(), OpType::CX);
        assert_eq!(cmds[1].qubits, vec![Qubit::new(0), Qubit::new(2)]);
        assert_eq!(cmds[2].qubits, vec![Qubit::new(2)]);
        assert_eq!(cmds[2].bits, vec![Bit::new(1)]);
        assert!((circ.phase() - 0.5).abs() < 1e-12);
        assert!(!DecomposeBoxes.apply(&mut circ).unwrap());
    }

    #[test]
    fn decompose_conditional_box() {
        let mut inner = Circuit::new(1, 0);
        inner.x(0).unwrap().z(0).unwrap();
        let mut circ = Circuit::new(1, 1);
        let cmd = Command {
            op: Op::CircBox(Box::new(inner)),
            qubits: vec![Qubit::new(0)],
            bits: Vec::new(),
            condition: Some(Condition { bits: vec![Bit::new(0)], value: 1 }),
        };
        circ.add_command(cmd).unwrap();
        DecomposeBoxes.apply(&mut circ).unwrap();
        assert_eq!(circ.n_gates(), 2);
        assert!(circ.commands().iter().all(|cmd| cmd.is_conditional()));
    }

    #[test]
    fn flatten_registers() {
        let mut circ = Circuit::default();
        circ.add_q_register("b", 1).unwrap()
            .add_q_register("a", 2).unwrap()
            .add_c_register("m", 1).unwrap();
        let cmd = Command::new(
            Op::new(OpType::CX),
            vec![Qubit::named("b", [0]), Qubit::named("a", [1])],
            Vec::new(),
        );
        circ.add_command(cmd).unwrap();
        let cmd = Command::new(
            Op::new(OpType::Measure),
            vec![Qubit::named("a", [0])],
            vec![Bit::named("m", [0])],
        );
        circ.add_command(cmd).unwrap();

        assert!(FlattenRegisters.apply(&mut circ).unwrap());
        // sorted: a[0], a[1], b[0]
        assert_eq!(circ.commands()[0].qubits, vec![Qubit::new(2), Qubit::new(1)]);
        assert_eq!(circ.commands()[1].qubits, vec![Qubit::new(0)]);
        assert_eq!(circ.commands()[1].bits, vec![Bit::new(0)]);
        assert!(circ.qubits().iter().all(|q| q.is_default()));
        assert!(!FlattenRegisters.apply(&mut circ).unwrap());
    }

    #[test]
    fn rebase_to_clifford_gateset() {
        let mut circ = Circuit::new(2, 1);
        circ.y(0).unwrap()
            .cz(0, 1).unwrap()
            .iswap_max(1, 0).unwrap()
            .sx(1).unwrap()
            .measure(1, 0).unwrap()
            .reset(0).unwrap();
        assert!(clifford_rebase().apply(&mut circ).unwrap());
        assert!(circ.commands().iter().all(|cmd| matches!(
            cmd.kind(),
            OpType::CX | OpType::H | OpType::S | OpType::Measure | OpType::Reset
        )));
        assert_eq!(circ.count_kind(OpType::Measure), 1);
        assert_eq!(circ.count_kind(OpType::Reset), 1);
        assert!(!clifford_rebase().apply(&mut circ).unwrap());
    }

    #[test]
    fn rebase_rejects_t() {
        let mut circ = Circuit::new(1, 0);
        circ.t(0).unwrap();
        assert!(matches!(
            clifford_rebase().apply(&mut circ),
            Err(Error::NonCliffordAngle(_))
        ));
    }

    #[test]
    fn rebase_keeps_condition() {
        let mut circ = Circuit::new(1, 1);
        circ.add_conditional_gate(OpType::Z, &[], &[0], &[0], 1).unwrap();
        clifford_rebase().apply(&mut circ).unwrap();
        assert_eq!(circ.count_kind(OpType::S), 2);
        assert!(circ.commands().iter().all(|cmd| cmd.is_conditional()));
    }

    #[test]
    fn rebase_without_cx() {
        let mut cx = Circuit::new(2, 0);
        cx.h(1).unwrap().cz(0, 1).unwrap().h(1).unwrap();
        let rebase = RebaseCustom::new(
            [OpType::CZ, OpType::H, OpType::S], Some(cx), tk1_to_cliff);
        let mut circ = Circuit::new(2, 0);
        circ.cx(1, 0).unwrap();
        rebase.apply(&mut circ).unwrap();
        assert_eq!(circ.count_kind(OpType::CZ), 1);
        assert_eq!(circ.commands()[0].qubits, vec![Qubit::new(0)]);

        let rebase = RebaseCustom::new([OpType::H], None, tk1_to_cliff);
        assert!(matches!(rebase.apply(&mut circ), Err(Error::UnsupportedOp(_))));
    }

    #[test]
    fn remove_inverse_pairs() {
        let mut circ = Circuit::new(2, 0);
        circ.h(0).unwrap()
            .s(1).unwrap()
            .cx(0, 1).unwrap()
            .cx(0, 1).unwrap()
            .h(0).unwrap()
            .sdg(1).unwrap()
            .noop(0).unwrap();
        assert!(RemoveRedundancies.apply(&mut circ).unwrap());
        assert_eq!(circ.n_gates(), 0);
    }

    #[test]
    fn remove_respects_order_and_direction() {
        let mut circ = Circuit::new(2, 0);
        circ.cx(0, 1).unwrap().cx(1, 0).unwrap();
        assert!(!RemoveRedundancies.apply(&mut circ).unwrap());
        assert_eq!(circ.n_gates(), 2);

        let mut circ = Circuit::new(2, 0);
        circ.cz(0, 1).unwrap().cz(1, 0).unwrap();
        assert!(RemoveRedundancies.apply(&mut circ).unwrap());
        assert_eq!(circ.n_gates(), 0);

        let mut circ = Circuit::new(2, 0);
        circ.h(0).unwrap().cx(0, 1).unwrap().h(0).unwrap();
        assert!(!RemoveRedundancies.apply(&mut circ).unwrap());
    }

    #[test]
    fn remove_blocked_by_measure() {
        let mut circ = Circuit::new(1, 1);
        circ.h(0).unwrap().measure(0, 0).unwrap().h(0).unwrap();
        assert!(!RemoveRedundancies.apply(&mut circ).unwrap());
        assert_eq!(circ.n_gates(), 3);
    }

    #[test]
    fn merge_rotations() {
        let mut circ = Circuit::new(1, 0);
        circ.rz(0.25, 0).unwrap().rz(0.5, 0).unwrap();
        RemoveRedundancies.apply(&mut circ).unwrap();
        assert_eq!(circ.n_gates(), 1);
        assert!((circ.commands()[0].op.params()[0] - 0.75).abs() < 1e-12);

        let mut circ = Circuit::new(1, 0);
        circ.rx(1.5, 0).unwrap().rx(0.5, 0).unwrap();
        RemoveRedundancies.apply(&mut circ).unwrap();
        assert_eq!(circ.n_gates(), 0);
        assert!((circ.phase() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cascading_cancellation() {
        // H S Sdg H cancels fully once the inner pair is gone
        let mut circ = Circuit::new(1, 0);
        circ.h(0).unwrap().s(0).unwrap().sdg(0).unwrap().h(0).unwrap();
        RemoveRedundancies.apply(&mut circ).unwrap();
        assert_eq!(circ.n_gates(), 0);
    }

    #[test]
    fn sequence() {
        let seq = SequencePass::new(vec![
            Box::new(DecomposeBoxes),
            Box::new(FlattenRegisters),
            Box::new(clifford_rebase()),
            Box::new(RemoveRedundancies),
        ]);
        let mut inner = Circuit::new(2, 0);
        inner.cx(0, 1).unwrap();
        let mut circ = Circuit::new(2, 0);
        circ.add_circbox(inner, &[0, 1], &[]).unwrap().cx(0, 1).unwrap();
        assert!(seq.apply(&mut circ).unwrap());
        assert_eq!(circ.n_gates(), 0);
    }
}
