//! Composable building blocks for multi-layer perceptrons.
//!
//! Every block implements [`Module`]: it receives a slice of [`Value`]s (the
//! positional arguments of a forward call) and returns a single [`Value`].
//! `Value` is an explicit tagged variant, so "is this a tensor or a list of
//! tensors" is a `match`, never a runtime type check.
//!
//! - [`Exp`] — element-wise exponentiation
//! - [`ConcatModule`] — concatenation along the last axis, optionally
//!   broadcasting the leading dimensions first
//! - [`ListOutModule`] — applies several modules to the same arguments and
//!   returns all their outputs
//! - [`call_nn_op`] — instantiates activation operations, fixing the softmax
//!   axis to the feature dimension
//!
//! # Example
//!
//! ```rust
//! use briny_mlp::nn::{ConcatModule, Exp, ListOutModule, Module, Value};
//! use briny_mlp::tensor;
//!
//! let modules: Vec<Box<dyn Module>> = vec![Box::new(ConcatModule::new(true)), Box::new(Exp)];
//! let heads = ListOutModule::new(modules).unwrap();
//!
//! let x = Value::from(tensor!([[0.0, 0.0]]));
//! let outs = heads.forward_each(&[x]).unwrap();
//! assert_eq!(outs.len(), 2);
//! ```

use crate::error::{Error, Result};
use crate::tensors::Ten64;
use core::fmt;

mod concat;
pub use self::concat::ConcatModule;

mod exp;
pub use self::exp::Exp;

mod list_out;
pub use self::list_out::ListOutModule;

pub mod activation;
pub use self::activation::{Op, OpKind, OpType, SOFTMAX_FEATURE_DIM, call_nn_op, instantiate};

/// An argument to, or result of, a forward call.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single tensor.
    Tensor(Ten64),
    /// An ordered sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the tensor if `self` is one.
    pub fn as_tensor(&self) -> Option<&Ten64> {
        match self {
            Self::Tensor(t) => Some(t),
            Self::List(_) => None,
        }
    }

    /// `true` for [`Value::Tensor`].
    pub fn is_tensor(&self) -> bool {
        matches!(self, Self::Tensor(_))
    }

    /// Unwraps a tensor.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `self` is a list.
    pub fn into_tensor(self) -> Result<Ten64> {
        match self {
            Self::Tensor(t) => Ok(t),
            Self::List(items) => Err(Error::invalid_argument(
                "value",
                format!("expected a tensor, found a list of {} values", items.len()),
            )),
        }
    }

    /// Unwraps a list.
    ///
    /// # Errors
    /// [`Error::InvalidArgument`] if `self` is a tensor.
    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Self::List(items) => Ok(items),
            Self::Tensor(t) => Err(Error::invalid_argument(
                "value",
                format!("expected a list, found a tensor of shape {:?}", t.shape),
            )),
        }
    }
}

impl From<Ten64> for Value {
    fn from(t: Ten64) -> Self {
        Self::Tensor(t)
    }
}

impl From<Vec<Ten64>> for Value {
    fn from(ts: Vec<Ten64>) -> Self {
        Self::List(ts.into_iter().map(Self::Tensor).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

/// A parameter-free computation over [`Value`]s.
///
/// Implementations must not mutate shared state in `forward`, so one
/// instance can be called from several threads at once.
pub trait Module: Send + Sync + fmt::Debug {
    /// Runs the computation on the positional arguments `args`.
    fn forward(&self, args: &[Value]) -> Result<Value>;
}

impl<M: Module + ?Sized> Module for Box<M> {
    fn forward(&self, args: &[Value]) -> Result<Value> {
        (**self).forward(args)
    }
}

/// Extracts the single tensor argument of a unary operation.
pub(crate) fn single_tensor<'a>(args: &'a [Value], op: &'static str) -> Result<&'a Ten64> {
    match args {
        [] => Err(Error::EmptyInput { op }),
        [Value::Tensor(t)] => Ok(t),
        [Value::List(_)] => Err(Error::invalid_argument(
            "input",
            format!("{op} expects a tensor, found a list"),
        )),
        _ => Err(Error::invalid_argument(
            "input",
            format!("{op} expects one argument, got {}", args.len()),
        )),
    }
}
