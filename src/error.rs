//! Error types for `briny_mlp`.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are never
//! recovered from locally; they propagate to the caller unchanged.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tensor kernels and modules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Two shapes were required to agree and did not.
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Shapes cannot be broadcast together.
    #[error("Cannot broadcast shapes {lhs:?} and {rhs:?}")]
    Broadcast {
        /// Left-hand side shape
        lhs: Vec<usize>,
        /// Right-hand side shape
        rhs: Vec<usize>,
    },

    /// A dimension index is out of range for the tensor's rank.
    #[error("Invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The requested dimension
        dim: isize,
        /// Number of dimensions
        ndim: usize,
    },

    /// An argument had the wrong kind or arity.
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// An operation received nothing to work on.
    #[error("Operation '{op}' received no inputs")]
    EmptyInput {
        /// The operation name
        op: &'static str,
    },

    /// An operation name did not match any known kind.
    #[error("Unknown operation '{0}'")]
    UnknownOp(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create a broadcast error
    pub fn broadcast(lhs: &[usize], rhs: &[usize]) -> Self {
        Self::Broadcast {
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}
