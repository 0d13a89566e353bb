//! Error types for circuit construction, compilation, and simulation.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    // circuit construction
    /// A qubit or bit was added twice.
    #[error("unit {0} already exists in circuit")]
    UnitExists(String),

    /// A command refers to a qubit or bit not present in the circuit.
    #[error("unit {0} does not exist in circuit")]
    UnitMissing(String),

    /// A command was given the wrong number of qubits or bits.
    #[error("{op} expects {expected} {what} argument(s), got {got}")]
    ArityMismatch {
        op: String,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A gate was given the wrong number of parameters.
    #[error("{op} expects {expected} parameter(s), got {got}")]
    ParamMismatch { op: String, expected: usize, got: usize },

    /// The same qubit or bit appears twice in a single command.
    #[error("unit {0} appears more than once in a single command")]
    RepeatedUnit(String),

    /// A gate parameter is NaN or infinite.
    #[error("{op} was given a non-finite parameter")]
    NonFiniteParam { op: String },

    // compilation
    /// An angle was encountered that is not a multiple of a half-turn.
    #[error("Non-Clifford angle encountered: {0}")]
    NonCliffordAngle(f64),

    /// An operation has no counterpart in the target instruction set.
    #[error("unsupported operation: {0}")]
    UnsupportedOp(String),

    /// An optimisation level outside `0..=2` was requested.
    #[error("optimisation level must be 0, 1, or 2; got {0}")]
    InvalidOptimisationLevel(u8),

    // execution
    /// Two measurements write to the same classical bit.
    #[error("Measurement overwritten: bit {0}")]
    MeasurementOverwritten(String),

    /// A classical bit is never written by any measurement.
    #[error("bit {0} is never measured")]
    BitNotMeasured(String),

    /// A per-circuit shot list does not line up with the circuits.
    #[error("The length of n_shots and circuits must match ({shots} != {circuits})")]
    ShotsLengthMismatch { shots: usize, circuits: usize },

    /// A circuit failed one of the backend's required predicates.
    #[error("circuit {index} does not satisfy {predicate}")]
    CircuitNotValid { index: usize, predicate: &'static str },

    /// No result is cached under the given handle.
    #[error("circuit corresponding to {0} has not been run by this backend instance")]
    CircuitNotRun(String),

    // stim programs
    /// Malformed line in a stim program.
    #[error("line {line}: {message}")]
    StimParse { line: usize, message: String },

    /// Bad target list for a stim instruction.
    #[error("{gate}: {message}")]
    StimTargets { gate: &'static str, message: String },

    // config and serialization
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self { Self::ConfigLoad(Box::new(err)) }
}

impl Error {
    pub(crate) fn stim_targets(gate: &'static str, message: impl Into<String>)
        -> Self
    {
        Self::StimTargets { gate, message: message.into() }
    }

    pub(crate) fn stim_parse(line: usize, message: impl Into<String>) -> Self {
        Self::StimParse { line, message: message.into() }
    }

    /// Return `true` if `self` is [`Error::CircuitNotRun`].
    pub fn is_not_run(&self) -> bool { matches!(self, Self::CircuitNotRun(..)) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shots_mismatch_display() {
        let err = Error::ShotsLengthMismatch { shots: 2, circuits: 3 };
        assert!(err.to_string().starts_with("The length of n_shots and circuits must match"));
    }

    #[test]
    fn angle_display() {
        let err = Error::NonCliffordAngle(0.25);
        assert_eq!(err.to_string(), "Non-Clifford angle encountered: 0.25");
    }

    #[test]
    fn from_json() {
        let res: std::result::Result<i32, serde_json::Error>
            = serde_json::from_str("not json");
        let err: Error = res.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn not_run() {
        assert!(Error::CircuitNotRun("abc".into()).is_not_run());
        assert!(!Error::BitNotMeasured("c[0]".into()).is_not_run());
    }
}
