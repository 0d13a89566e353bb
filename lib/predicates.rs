//! Structural requirements that a circuit must satisfy before it can be run on
//! a backend.

use rustc_hash::FxHashSet;
use crate::{
    circuit::Circuit,
    gate::OpType,
};

/// A boolean property of a [`Circuit`].
pub trait Predicate: Send + Sync {
    /// Short name identifying the predicate in error messages.
    fn name(&self) -> &'static str;

    /// Return `true` if `circ` satisfies the predicate.
    fn verify(&self, circ: &Circuit) -> bool;
}

/// All qubits belong to the default register `q` and all bits to the default
/// register `c`, with one-dimensional indices.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultRegisterPredicate;

impl Predicate for DefaultRegisterPredicate {
    fn name(&self) -> &'static str { "DefaultRegisterPredicate" }

    fn verify(&self, circ: &Circuit) -> bool {
        circ.qubits().iter().all(|q| q.is_default())
            && circ.bits().iter().all(|b| b.is_default())
    }
}

/// Every command's operation belongs to a fixed set.
#[derive(Clone, Debug)]
pub struct GateSetPredicate(pub FxHashSet<OpType>);

impl GateSetPredicate {
    pub fn new<I>(gates: I) -> Self
    where I: IntoIterator<Item = OpType>
    {
        Self(gates.into_iter().collect())
    }
}

impl Predicate for GateSetPredicate {
    fn name(&self) -> &'static str { "GateSetPredicate" }

    fn verify(&self, circ: &Circuit) -> bool {
        circ.commands().iter().all(|cmd| self.0.contains(&cmd.kind()))
    }
}

/// No command is classically controlled.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoClassicalControlPredicate;

impl Predicate for NoClassicalControlPredicate {
    fn name(&self) -> &'static str { "NoClassicalControlPredicate" }

    fn verify(&self, circ: &Circuit) -> bool {
        circ.commands().iter().all(|cmd| !cmd.is_conditional())
    }
}
