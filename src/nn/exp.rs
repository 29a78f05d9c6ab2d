use super::{Module, OpKind, OpType, Value, single_tensor};
use crate::backprop::{self, FnTen64To};
use crate::error::Result;
use crate::ops::dispatch;
use crate::tensors::{Ten64, WithGrad};

/// Element-wise exponentiation, `y = e^x`.
///
/// Holds no parameters. Typically placed after the scale head of an encoder
/// so that its output is positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exp;

impl Exp {
    /// Applies `e^x` to a tensor directly.
    #[must_use]
    pub fn apply(&self, input: &Ten64) -> Ten64 {
        dispatch::exp(input)
    }

    /// Forward pass with a backward closure, see [`backprop::exp`].
    #[must_use]
    pub fn forward_with_grad(&self, input: &WithGrad<Ten64>) -> (Ten64, Box<FnTen64To<'static>>) {
        backprop::exp(input)
    }
}

impl Module for Exp {
    fn forward(&self, args: &[Value]) -> Result<Value> {
        let input = single_tensor(args, "exp")?;
        Ok(Value::Tensor(self.apply(input)))
    }
}

impl OpType for Exp {
    fn kind() -> OpKind {
        OpKind::Exp
    }
}
