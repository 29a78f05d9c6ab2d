//! Activation operations and their instantiation.
//!
//! An MLP is usually configured with a list of operation kinds ("ReLU",
//! "Softmax", ...). [`OpKind`] is that closed set, [`Op`] is a ready-to-run
//! instance, and [`call_nn_op`] turns the former into the latter. Softmax and
//! log-softmax need an axis; they are always instantiated over the feature
//! dimension of a batch-first tensor, [`SOFTMAX_FEATURE_DIM`].

use super::{Module, Value, single_tensor};
use crate::error::{Error, Result};
use crate::ops::{cpu, dispatch};
use crate::tensors::Ten64;
use core::fmt;
use core::str::FromStr;

/// Axis softmax-like operations normalize over (`[batch, features]`).
pub const SOFTMAX_FEATURE_DIM: isize = 1;

/// The kinds of operation an MLP layer list can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// `max(0, x)`
    ReLU,
    /// `1 / (1 + e^-x)`
    Sigmoid,
    /// `tanh(x)`
    Tanh,
    /// `ln(1 + e^x)`
    Softplus,
    /// `e^x`
    Exp,
    /// `x`
    Identity,
    /// Normalized exponential along an axis.
    Softmax,
    /// Logarithm of the normalized exponential along an axis.
    LogSoftmax,
}

impl OpKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::ReLU,
        Self::Sigmoid,
        Self::Tanh,
        Self::Softplus,
        Self::Exp,
        Self::Identity,
        Self::Softmax,
        Self::LogSoftmax,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReLU => "ReLU",
            Self::Sigmoid => "Sigmoid",
            Self::Tanh => "Tanh",
            Self::Softplus => "Softplus",
            Self::Exp => "Exp",
            Self::Identity => "Identity",
            Self::Softmax => "Softmax",
            Self::LogSoftmax => "LogSoftmax",
        }
    }

    /// Whether instances of this kind carry an axis.
    #[must_use]
    pub const fn needs_dim(self) -> bool {
        matches!(self, Self::Softmax | Self::LogSoftmax)
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    /// Case-insensitive; `_` and `-` are ignored, so `"log_softmax"` parses.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&key))
            .ok_or_else(|| Error::UnknownOp(s.to_string()))
    }
}

/// Marks a type as naming an operation kind.
pub trait OpType {
    /// The kind `Self` stands for.
    fn kind() -> OpKind;
}

macro_rules! op_markers {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {$(
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl OpType for $name {
            fn kind() -> OpKind {
                OpKind::$name
            }
        }
    )*};
}

op_markers!(
    /// Names [`OpKind::ReLU`].
    ReLU,
    /// Names [`OpKind::Sigmoid`].
    Sigmoid,
    /// Names [`OpKind::Tanh`].
    Tanh,
    /// Names [`OpKind::Softplus`].
    Softplus,
    /// Names [`OpKind::Identity`].
    Identity,
    /// Names [`OpKind::Softmax`].
    Softmax,
    /// Names [`OpKind::LogSoftmax`].
    LogSoftmax,
);

/// An instantiated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    ReLU,
    Sigmoid,
    Tanh,
    Softplus,
    Exp,
    Identity,
    Softmax { dim: isize },
    LogSoftmax { dim: isize },
}

impl Op {
    /// The kind this instance was built from.
    #[must_use]
    pub const fn kind(&self) -> OpKind {
        match self {
            Self::ReLU => OpKind::ReLU,
            Self::Sigmoid => OpKind::Sigmoid,
            Self::Tanh => OpKind::Tanh,
            Self::Softplus => OpKind::Softplus,
            Self::Exp => OpKind::Exp,
            Self::Identity => OpKind::Identity,
            Self::Softmax { .. } => OpKind::Softmax,
            Self::LogSoftmax { .. } => OpKind::LogSoftmax,
        }
    }

    /// The axis of softmax-like operations, `None` otherwise.
    #[must_use]
    pub const fn dim(&self) -> Option<isize> {
        match self {
            Self::Softmax { dim } | Self::LogSoftmax { dim } => Some(*dim),
            _ => None,
        }
    }

    /// Runs the operation on one tensor.
    ///
    /// # Errors
    /// [`Error::InvalidDimension`] if a softmax axis is out of range for `input`.
    pub fn apply(&self, input: &Ten64) -> Result<Ten64> {
        match *self {
            Self::ReLU => Ok(cpu::relu(input)),
            Self::Sigmoid => Ok(cpu::sigmoid(input)),
            Self::Tanh => Ok(cpu::tanh(input)),
            Self::Softplus => Ok(cpu::softplus(input)),
            Self::Exp => Ok(dispatch::exp(input)),
            Self::Identity => Ok(input.clone()),
            Self::Softmax { dim } => cpu::softmax(input, dim),
            Self::LogSoftmax { dim } => cpu::log_softmax(input, dim),
        }
    }
}

impl Module for Op {
    fn forward(&self, args: &[Value]) -> Result<Value> {
        let input = single_tensor(args, self.kind().name())?;
        self.apply(input).map(Value::Tensor)
    }
}

/// Instantiates an operation of the given kind.
///
/// Softmax and log-softmax are built over [`SOFTMAX_FEATURE_DIM`]; every other
/// kind takes no parameters.
///
/// # Example
/// ```rust
/// use briny_mlp::nn::{Op, OpKind, call_nn_op};
///
/// assert_eq!(call_nn_op(OpKind::Softmax), Op::Softmax { dim: 1 });
/// assert_eq!(call_nn_op(OpKind::ReLU), Op::ReLU);
/// ```
#[must_use]
pub fn call_nn_op(kind: OpKind) -> Op {
    let op = match kind {
        OpKind::Softmax => Op::Softmax {
            dim: SOFTMAX_FEATURE_DIM,
        },
        OpKind::LogSoftmax => Op::LogSoftmax {
            dim: SOFTMAX_FEATURE_DIM,
        },
        OpKind::ReLU => Op::ReLU,
        OpKind::Sigmoid => Op::Sigmoid,
        OpKind::Tanh => Op::Tanh,
        OpKind::Softplus => Op::Softplus,
        OpKind::Exp => Op::Exp,
        OpKind::Identity => Op::Identity,
    };
    log::trace!("instantiated {kind} as {op:?}");
    op
}

/// Instantiates the operation named by the marker type `T`.
///
/// ```rust
/// use briny_mlp::nn::{Op, activation::Softmax, instantiate};
///
/// assert_eq!(instantiate::<Softmax>(), Op::Softmax { dim: 1 });
/// ```
#[must_use]
pub fn instantiate<T: OpType>() -> Op {
    call_nn_op(T::kind())
}
