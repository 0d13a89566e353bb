//! Circuits of operations acting on named qubits and classical bits.
//!
//! A [`Circuit`] owns a set of [`Qubit`]s and [`Bit`]s and a list of
//! [`Command`]s, stored in the order they were added (which is always a valid
//! topological order). Units are identified by a register name and an index,
//! and are ordered first by register name and then lexicographically by index;
//! this ordering determines the qubit indices used by the simulator and the
//! order of bits in returned results.
//!
//! # Example
//! ```
//! use stim_backend::circuit::Circuit;
//!
//! # fn main() -> stim_backend::Result<()> {
//! // two qubits in register `q`, two bits in register `c`
//! let mut circ = Circuit::new(2, 2);
//! circ.h(0)?.cx(0, 1)?.measure(0, 0)?.measure(1, 1)?;
//! assert_eq!(circ.n_gates(), 4);
//! println!("{}", circ);
//! // H q[0];
//! // CX q[0], q[1];
//! // Measure q[0] --> c[0];
//! // Measure q[1] --> c[1];
//! # Ok(())
//! # }
//! ```

use std::{ collections::BTreeSet, fmt };
use itertools::Itertools;
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ Error, Result },
    gate::OpType,
};

macro_rules! unit_id {
    ( $name:ident, $default_reg:literal, $doc:literal ) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(Serialize, Deserialize)]
        pub struct $name {
            pub reg: String,
            pub index: Vec<u32>,
        }

        impl $name {
            /// Name of the default register.
            pub const DEFAULT_REGISTER: &'static str = $default_reg;

            /// Create a new unit in the default register.
            pub fn new(index: u32) -> Self {
                Self { reg: $default_reg.to_string(), index: vec![index] }
            }

            /// Create a new unit in a named register with a possibly
            /// multi-dimensional index.
            pub fn named<S, I>(reg: S, index: I) -> Self
            where
                S: Into<String>,
                I: IntoIterator<Item = u32>,
            {
                Self { reg: reg.into(), index: index.into_iter().collect() }
            }

            /// Return `true` if `self` is in the default register with a
            /// one-dimensional index.
            pub fn is_default(&self) -> bool {
                self.reg == $default_reg && self.index.len() == 1
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}[{}]", self.reg, self.index.iter().join(", "))
            }
        }
    }
}
unit_id!(Qubit, "q", "A qubit, identified by register name and index.");
unit_id!(Bit, "c", "A classical bit, identified by register name and index.");

/// An operation, without the units it acts on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// A gate, measurement, or reset, along with any angle parameters.
    Gate { kind: OpType, params: Vec<f64> },
    /// An embedded circuit, acting on its units in sorted order.
    CircBox(Box<Circuit>),
}

impl Op {
    /// Create a new parameterless operation.
    pub fn new(kind: OpType) -> Self { Self::Gate { kind, params: Vec::new() } }

    /// Create a new parameterized operation.
    pub fn with_params(kind: OpType, params: Vec<f64>) -> Self {
        Self::Gate { kind, params }
    }

    /// Return the kind of operation.
    pub fn kind(&self) -> OpType {
        match self {
            Self::Gate { kind, .. } => *kind,
            Self::CircBox(..) => OpType::CircBox,
        }
    }

    /// Return the angle parameters (empty for boxes).
    pub fn params(&self) -> &[f64] {
        match self {
            Self::Gate { params, .. } => params,
            Self::CircBox(..) => &[],
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gate { kind, params } if params.is_empty()
                => write!(f, "{}", kind),
            Self::Gate { kind, params }
                => write!(f, "{}({})", kind, params.iter().join(", ")),
            Self::CircBox(circ)
                => write!(f, "CircBox[{} cmds]", circ.n_gates()),
        }
    }
}

/// Classical control on a [`Command`].
///
/// The command is applied only if `bits`, read as a little-endian integer
/// (`bits[0]` is the least significant), equals `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub bits: Vec<Bit>,
    pub value: u32,
}

/// An operation applied to specific units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub op: Op,
    pub qubits: Vec<Qubit>,
    #[serde(default)]
    pub bits: Vec<Bit>,
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl Command {
    /// Create a new unconditional command.
    pub fn new(op: Op, qubits: Vec<Qubit>, bits: Vec<Bit>) -> Self {
        Self { op, qubits, bits, condition: None }
    }

    /// Return the kind of the underlying operation.
    pub fn kind(&self) -> OpType { self.op.kind() }

    /// Return `true` if the command has a classical condition.
    pub fn is_conditional(&self) -> bool { self.condition.is_some() }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(cond) = &self.condition {
            write!(f, "IF ([{}] == {}) THEN ", cond.bits.iter().join(", "), cond.value)?;
        }
        write!(f, "{} {}", self.op, self.qubits.iter().join(", "))?;
        if !self.bits.is_empty() {
            write!(f, " --> {}", self.bits.iter().join(", "))?;
        }
        write!(f, ";")
    }
}

/// A quantum circuit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    qubits: BTreeSet<Qubit>,
    bits: BTreeSet<Bit>,
    commands: Vec<Command>,
    #[serde(default)]
    phase: f64,
}

impl Circuit {
    /// Create a new circuit with `n_qubits` qubits in the default register
    /// `q` and `n_bits` bits in the default register `c`.
    pub fn new(n_qubits: u32, n_bits: u32) -> Self {
        Self {
            qubits: (0..n_qubits).map(Qubit::new).collect(),
            bits: (0..n_bits).map(Bit::new).collect(),
            commands: Vec::new(),
            phase: 0.0,
        }
    }

    /// Add a qubit.
    pub fn add_qubit(&mut self, qubit: Qubit) -> Result<&mut Self> {
        if self.qubits.contains(&qubit) {
            return Err(Error::UnitExists(qubit.to_string()));
        }
        self.qubits.insert(qubit);
        Ok(self)
    }

    /// Add a classical bit.
    pub fn add_bit(&mut self, bit: Bit) -> Result<&mut Self> {
        if self.bits.contains(&bit) {
            return Err(Error::UnitExists(bit.to_string()));
        }
        self.bits.insert(bit);
        Ok(self)
    }

    /// Add a one-dimensional register of `size` qubits.
    pub fn add_q_register(&mut self, name: &str, size: u32) -> Result<&mut Self> {
        (0..size).try_for_each(|k| {
            self.add_qubit(Qubit::named(name, [k])).map(|_| ())
        })?;
        Ok(self)
    }

    /// Add a one-dimensional register of `size` bits.
    pub fn add_c_register(&mut self, name: &str, size: u32) -> Result<&mut Self> {
        (0..size).try_for_each(|k| {
            self.add_bit(Bit::named(name, [k])).map(|_| ())
        })?;
        Ok(self)
    }

    /// All qubits, in sorted order.
    pub fn qubits(&self) -> &BTreeSet<Qubit> { &self.qubits }

    /// All bits, in sorted order.
    pub fn bits(&self) -> &BTreeSet<Bit> { &self.bits }

    pub fn n_qubits(&self) -> usize { self.qubits.len() }

    pub fn n_bits(&self) -> usize { self.bits.len() }

    /// Number of commands.
    pub fn n_gates(&self) -> usize { self.commands.len() }

    pub fn commands(&self) -> &[Command] { &self.commands }

    /// Global phase in half-turns.
    pub fn phase(&self) -> f64 { self.phase }

    /// Add to the global phase (in half-turns), reduced modulo 2.
    pub fn add_phase(&mut self, ph: f64) -> &mut Self {
        self.phase = (self.phase + ph).rem_euclid(2.0);
        self
    }

    /// Count the commands of a given kind.
    pub fn count_kind(&self, kind: OpType) -> usize {
        self.commands.iter().filter(|cmd| cmd.kind() == kind).count()
    }

    fn check_command(&self, cmd: &Command) -> Result<()> {
        let kind = cmd.kind();
        let (n_qubits, n_bits)
            = match &cmd.op {
                Op::CircBox(inner) => {
                    inner.validate()?;
                    (inner.n_qubits(), inner.n_bits())
                },
                Op::Gate { .. } => (
                    kind.n_qubits().unwrap_or(0),
                    kind.n_bits().unwrap_or(0),
                ),
            };
        if cmd.qubits.len() != n_qubits {
            return Err(Error::ArityMismatch {
                op: kind.to_string(),
                what: "qubit",
                expected: n_qubits,
                got: cmd.qubits.len(),
            });
        }
        if cmd.bits.len() != n_bits {
            return Err(Error::ArityMismatch {
                op: kind.to_string(),
                what: "bit",
                expected: n_bits,
                got: cmd.bits.len(),
            });
        }
        if let Op::Gate { params, .. } = &cmd.op {
            if params.len() != kind.n_params() {
                return Err(Error::ParamMismatch {
                    op: kind.to_string(),
                    expected: kind.n_params(),
                    got: params.len(),
                });
            }
            if params.iter().any(|p| !p.is_finite()) {
                return Err(Error::NonFiniteParam { op: kind.to_string() });
            }
        }
        if let Some(q) = cmd.qubits.iter().find(|q| !self.qubits.contains(q)) {
            return Err(Error::UnitMissing(q.to_string()));
        }
        let cond_bits: &[Bit]
            = cmd.condition.as_ref().map(|c| c.bits.as_slice()).unwrap_or(&[]);
        if let Some(b)
            = cmd.bits.iter().chain(cond_bits).find(|b| !self.bits.contains(b))
        {
            return Err(Error::UnitMissing(b.to_string()));
        }
        if let Some(q) = cmd.qubits.iter().duplicates().next() {
            return Err(Error::RepeatedUnit(q.to_string()));
        }
        if let Some(b) = cmd.bits.iter().duplicates().next() {
            return Err(Error::RepeatedUnit(b.to_string()));
        }
        if let Some(b) = cond_bits.iter().duplicates().next() {
            return Err(Error::RepeatedUnit(b.to_string()));
        }
        Ok(())
    }

    // check every command, descending into boxes
    fn validate(&self) -> Result<()> {
        self.commands.iter().try_for_each(|cmd| self.check_command(cmd))
    }

    /// Append a command, verifying that all its units exist in the circuit and
    /// that its argument and parameter counts match its operation.
    pub fn add_command(&mut self, cmd: Command) -> Result<&mut Self> {
        self.check_command(&cmd)?;
        self.commands.push(cmd);
        Ok(self)
    }

    /// Append a gate acting on qubits in the default register.
    pub fn add_gate(&mut self, kind: OpType, params: &[f64], qubits: &[u32])
        -> Result<&mut Self>
    {
        let op = Op::with_params(kind, params.to_vec());
        let qubits = qubits.iter().copied().map(Qubit::new).collect();
        self.add_command(Command::new(op, qubits, Vec::new()))
    }

    /// Append a gate acting on qubits in the default register, applied only if
    /// the bits `cond_bits` in the default register (least significant first)
    /// hold `value`.
    pub fn add_conditional_gate(
        &mut self,
        kind: OpType,
        params: &[f64],
        qubits: &[u32],
        cond_bits: &[u32],
        value: u32,
    ) -> Result<&mut Self>
    {
        let op = Op::with_params(kind, params.to_vec());
        let qubits = qubits.iter().copied().map(Qubit::new).collect();
        let condition = Condition {
            bits: cond_bits.iter().copied().map(Bit::new).collect(),
            value,
        };
        let cmd = Command { op, qubits, bits: Vec::new(), condition: Some(condition) };
        self.add_command(cmd)
    }

    /// Append a sub-circuit whose qubits and bits (in sorted order) are
    /// mapped onto `qubits` and `bits` in the default registers.
    pub fn add_circbox(&mut self, circ: Circuit, qubits: &[u32], bits: &[u32])
        -> Result<&mut Self>
    {
        let op = Op::CircBox(Box::new(circ));
        let qubits = qubits.iter().copied().map(Qubit::new).collect();
        let bits = bits.iter().copied().map(Bit::new).collect();
        self.add_command(Command::new(op, qubits, bits))
    }

    /// Append a Z-basis measurement of qubit `q` into bit `c`.
    pub fn measure(&mut self, q: u32, c: u32) -> Result<&mut Self> {
        let op = Op::new(OpType::Measure);
        self.add_command(Command::new(op, vec![Qubit::new(q)], vec![Bit::new(c)]))
    }

    /// Append a Z-basis measurement of every default-register qubit `q[i]`
    /// into bit `c[i]`.
    pub fn measure_all(&mut self) -> Result<&mut Self> {
        let pairs: Vec<(Qubit, Bit)>
            = self.qubits.iter()
            .filter(|q| q.is_default())
            .map(|q| (q.clone(), Bit::new(q.index[0])))
            .collect();
        for (q, c) in pairs {
            let op = Op::new(OpType::Measure);
            self.add_command(Command::new(op, vec![q], vec![c]))?;
        }
        Ok(self)
    }

    pub fn reset(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Reset, &[], &[q])
    }

    pub fn noop(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Noop, &[], &[q])
    }

    pub fn x(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::X, &[], &[q])
    }

    pub fn y(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Y, &[], &[q])
    }

    pub fn z(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Z, &[], &[q])
    }

    pub fn h(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::H, &[], &[q])
    }

    pub fn s(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::S, &[], &[q])
    }

    pub fn sdg(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Sdg, &[], &[q])
    }

    pub fn t(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::T, &[], &[q])
    }

    pub fn tdg(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Tdg, &[], &[q])
    }

    pub fn sx(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::SX, &[], &[q])
    }

    pub fn sxdg(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::SXdg, &[], &[q])
    }

    pub fn v(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::V, &[], &[q])
    }

    pub fn vdg(&mut self, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Vdg, &[], &[q])
    }

    /// Rotation about X by `angle` half-turns.
    pub fn rx(&mut self, angle: f64, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Rx, &[angle], &[q])
    }

    /// Rotation about Y by `angle` half-turns.
    pub fn ry(&mut self, angle: f64, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Ry, &[angle], &[q])
    }

    /// Rotation about Z by `angle` half-turns.
    pub fn rz(&mut self, angle: f64, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::Rz, &[angle], &[q])
    }

    /// `Rz(a) Rx(b) Rz(c)`, with angles in half-turns.
    pub fn tk1(&mut self, a: f64, b: f64, c: f64, q: u32) -> Result<&mut Self> {
        self.add_gate(OpType::TK1, &[a, b, c], &[q])
    }

    pub fn cx(&mut self, c: u32, t: u32) -> Result<&mut Self> {
        self.add_gate(OpType::CX, &[], &[c, t])
    }

    pub fn cy(&mut self, c: u32, t: u32) -> Result<&mut Self> {
        self.add_gate(OpType::CY, &[], &[c, t])
    }

    pub fn cz(&mut self, a: u32, b: u32) -> Result<&mut Self> {
        self.add_gate(OpType::CZ, &[], &[a, b])
    }

    pub fn iswap_max(&mut self, a: u32, b: u32) -> Result<&mut Self> {
        self.add_gate(OpType::ISWAPMax, &[], &[a, b])
    }

    pub fn swap(&mut self, a: u32, b: u32) -> Result<&mut Self> {
        self.add_gate(OpType::SWAP, &[], &[a, b])
    }

    /// Append all commands of `other`, which must act only on units already
    /// in `self`, and add its phase.
    pub fn append(&mut self, other: &Circuit) -> Result<&mut Self> {
        for cmd in other.commands.iter() {
            self.add_command(cmd.clone())?;
        }
        self.add_phase(other.phase);
        Ok(self)
    }

    /// Parse a circuit from JSON, checking every command, including those
    /// inside boxes.
    pub fn from_json(s: &str) -> Result<Self> {
        let raw: Circuit = serde_json::from_str(s)?;
        let mut circ = Circuit {
            qubits: raw.qubits,
            bits: raw.bits,
            commands: Vec::with_capacity(raw.commands.len()),
            phase: 0.0,
        };
        for cmd in raw.commands.into_iter() {
            circ.add_command(cmd)?;
        }
        circ.add_phase(raw.phase);
        Ok(circ)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    // commands are replaced wholesale by compilation passes, which are
    // responsible for keeping them consistent with the unit sets
    pub(crate) fn replace_commands(&mut self, commands: Vec<Command>) {
        self.commands = commands;
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub(crate) fn replace_units(&mut self, qubits: BTreeSet<Qubit>, bits: BTreeSet<Bit>) {
        self.qubits = qubits;
        self.bits = bits;
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.commands.len();
        for (k, cmd) in self.commands.iter().enumerate() {
            cmd.fmt(f)?;
            if k < n - 1 { writeln!(f)?; }
        }
        Ok(())
    }
}
