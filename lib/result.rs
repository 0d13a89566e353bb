//! Results of running circuits, and handles for retrieving them.

use std::{ collections::BTreeMap, fmt };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;
use crate::{
    circuit::Bit,
    error::{ Error, Result },
    outcome::OutcomeArray,
};

/// Opaque identifier for a submitted circuit.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultHandle(String);

impl ResultHandle {
    /// Create a fresh random (v4 UUID) handle.
    pub fn new() -> Self { Self(Uuid::new_v4().to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl Default for ResultHandle {
    fn default() -> Self { Self::new() }
}

impl From<String> for ResultHandle {
    fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for ResultHandle {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl fmt::Display for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stage of a submitted circuit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEnum {
    /// Results are available.
    Completed,
}

impl fmt::Display for StatusEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Status of a submitted circuit with an optional message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStatus {
    pub status: StatusEnum,
    pub message: String,
}

impl CircuitStatus {
    pub fn new(status: StatusEnum) -> Self {
        Self { status, message: String::new() }
    }
}

impl fmt::Display for CircuitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{}: {}", self.status, self.message)
        }
    }
}

/// Shot table of a circuit run, along with the bits labeling its columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResult {
    bits: Vec<Bit>,
    shots: OutcomeArray,
}

impl BackendResult {
    /// Create a new result. `bits` labels the columns of `shots` in order.
    pub fn new(bits: Vec<Bit>, shots: OutcomeArray) -> Self {
        Self { bits, shots }
    }

    /// The bits labeling each column of the shot table.
    pub fn get_bitlist(&self) -> &[Bit] { &self.bits }

    pub fn outcome_array(&self) -> &OutcomeArray { &self.shots }

    pub fn n_shots(&self) -> usize { self.shots.n_outcomes() }

    /// All shots, each a readout of every bit in [`Self::get_bitlist`] order.
    pub fn get_shots(&self) -> Vec<Vec<bool>> { self.shots.to_readouts() }

    /// Number of times each distinct readout occurred.
    pub fn get_counts(&self) -> BTreeMap<Vec<bool>, usize> { self.shots.counts() }

    fn select(&self, bits: &[Bit]) -> Result<OutcomeArray> {
        let indices: Vec<usize>
            = bits.iter()
            .map(|b| {
                self.bits.iter().position(|x| x == b)
                    .ok_or_else(|| Error::UnitMissing(b.to_string()))
            })
            .collect::<Result<_>>()?;
        self.shots.choose_indices(&indices)
            .ok_or_else(|| Error::UnitMissing(format!("{:?}", indices)))
    }

    /// Like [`Self::get_shots`], but reading only `bits`, in the given order.
    pub fn get_shots_for(&self, bits: &[Bit]) -> Result<Vec<Vec<bool>>> {
        Ok(self.select(bits)?.to_readouts())
    }

    /// Like [`Self::get_counts`], but reading only `bits`, in the given order.
    pub fn get_counts_for(&self, bits: &[Bit]) -> Result<BTreeMap<Vec<bool>, usize>> {
        Ok(self.select(bits)?.counts())
    }
}
