use std::fmt;
use std::path::PathBuf;

use field::FieldElement;

use crate::evaluator::EvalError;
use crate::wire::WireId;

/// Circuit-construction invariant violations. Fatal at build time.
#[derive(Debug)]
pub enum ConstructionError {
    /// An assertion on three constant wires does not hold in the field.
    ConstantAssertionFailed {
        w1: FieldElement,
        w2: FieldElement,
        w3: FieldElement,
    },
    /// A boolean-only operation received a constant outside `{0, 1}`.
    NonBooleanConstant {
        op: &'static str,
        value: FieldElement,
    },
    /// A boolean-only operation received a wire not known to be boolean.
    NonBooleanOperand { op: &'static str },
    /// A wire id outside the allocated range was used.
    UnknownWire { id: WireId },
    /// A constant does not fit in the requested bit width.
    ConstantOutOfRange { bits: usize },
    /// `split` was requested with a zero bit width.
    ZeroWidthSplit,
    /// `pack` was requested with no bit wires.
    EmptyBitVector,
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionError::ConstantAssertionFailed { w1, w2, w3 } => write!(
                f,
                "assertion failed on constant wires: {w1} * {w2} != {w3} (mod p)"
            ),
            ConstructionError::NonBooleanConstant { op, value } => write!(
                f,
                "`{op}` requires boolean operands, got constant {value}"
            ),
            ConstructionError::NonBooleanOperand { op } => write!(
                f,
                "`{op}` requires operands known to be boolean (split the wire or assert it binary first)"
            ),
            ConstructionError::UnknownWire { id } => {
                write!(f, "wire id {id} does not exist in this circuit")
            }
            ConstructionError::ConstantOutOfRange { bits } => {
                write!(f, "constant does not fit in {bits} bits")
            }
            ConstructionError::ZeroWidthSplit => write!(f, "cannot split a wire into 0 bits"),
            ConstructionError::EmptyBitVector => write!(f, "cannot pack an empty bit vector"),
        }
    }
}

impl std::error::Error for ConstructionError {}

/// Configuration failures. Fatal.
#[derive(Debug)]
pub enum ConfigError {
    /// No circuit generator has been registered on the current thread.
    NoActiveGenerator,
    /// The external prover binary does not exist at the configured path.
    ProverNotFound(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoActiveGenerator => {
                write!(f, "the current thread does not have an active circuit generator")
            }
            ConfigError::ProverNotFound(path) => {
                write!(f, "prover binary not found: {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Umbrella over the four error kinds the builder surfaces.
#[derive(Debug)]
pub enum CircuitError {
    Construction(ConstructionError),
    Evaluation(EvalError),
    Config(ConfigError),
    Io(std::io::Error),
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitError::Construction(e) => write!(f, "construction error: {e}"),
            CircuitError::Evaluation(e) => write!(f, "evaluation error: {e}"),
            CircuitError::Config(e) => write!(f, "configuration error: {e}"),
            CircuitError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for CircuitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CircuitError::Construction(e) => Some(e),
            CircuitError::Evaluation(e) => Some(e),
            CircuitError::Config(e) => Some(e),
            CircuitError::Io(e) => Some(e),
        }
    }
}

impl From<ConstructionError> for CircuitError {
    fn from(e: ConstructionError) -> Self {
        CircuitError::Construction(e)
    }
}

impl From<EvalError> for CircuitError {
    fn from(e: EvalError) -> Self {
        CircuitError::Evaluation(e)
    }
}

impl From<ConfigError> for CircuitError {
    fn from(e: ConfigError) -> Self {
        CircuitError::Config(e)
    }
}

impl From<std::io::Error> for CircuitError {
    fn from(e: std::io::Error) -> Self {
        CircuitError::Io(e)
    }
}
