//! Differentiable operations and autograd utilities.
//!
//! # Backpropagation Primitives
//!
//! Gradient-carrying versions of the two kernels the MLP building blocks are
//! made of:
//! - **Exponentiation:** `e^x` with gradient `g · e^x`.
//! - **Concatenation along the last axis:** with optional broadcasting of the
//!   leading dimensions; the gradient is split back per input and summed over
//!   any broadcast dimensions.
//!
//! ## Autograd Pattern
//!
//! Each operation follows a simple pattern:
//! 1. **Inputs** are references to `WithGrad<Ten64>`.
//! 2. **Forward Pass** computes an output `Ten64`.
//! 3. **Backward Pass** returns a closure capturing minimal cloned data to compute gradients.
//!
//! The backward closures implement `Fn`, so they can be invoked more than once.

use crate::error::{Error, Result};
use crate::ops::{cpu, dispatch};
use crate::tensors::{Ten64, Tensor, WithGrad, broadcast_shapes};
use rayon::prelude::*;

/// Backward closure of a unary operation.
pub type FnTen64To<'a> = dyn Fn(&Ten64) -> Ten64 + 'a;

/// Backward closure of an operation over a list of inputs.
pub type FnTen64ToMany<'a> = dyn Fn(&Ten64) -> Result<Vec<Ten64>> + 'a;

/// Applies `e^x` element-wise.
///
/// # Returns
/// - `out`: Tensor of the same shape.
/// - `back`: Closure mapping `dL/d(out)` to `dL/d(input) = dL/d(out) · out`.
///
/// # Panics
/// The backward closure panics if the upstream gradient has a different shape.
///
/// # Example
/// ```rust
/// use briny_mlp::{tensor, tensors::WithGrad, backprop::exp};
///
/// let x = WithGrad::new(tensor!([0.0, 0.0]));
/// let (out, back) = exp(&x);
/// assert_eq!(out.data, vec![1.0, 1.0]);
/// assert_eq!(back(&tensor!([2.0, 3.0])).data, vec![2.0, 3.0]);
/// ```
pub fn exp(input: &WithGrad<Ten64>) -> (Ten64, Box<FnTen64To<'static>>) {
    let out = dispatch::exp(&input.value);
    let saved = out.clone();

    let back = move |grad_output: &Ten64| {
        assert_eq!(grad_output.shape, saved.shape, "exp gradient shape mismatch");
        let grad = grad_output
            .data
            .par_iter()
            .zip(&saved.data)
            .map(|(&g, &y)| g * y)
            .collect();
        Tensor::new(saved.shape.clone(), grad)
    };

    (out, Box::new(back))
}

/// Concatenates tensors along their last dimension, optionally broadcasting
/// their leading dimensions to a common shape first.
///
/// # Returns
/// - `out`: The concatenated tensor.
/// - `back`: Closure mapping `dL/d(out)` to one gradient per input, each with
///   that input's original shape.
///
/// # Errors
/// - [`Error::EmptyInput`] when `inputs` is empty
/// - [`Error::InvalidDimension`] for a rank-0 input
/// - [`Error::Broadcast`] if `allow_broadcast` and the leading shapes are incompatible
/// - [`Error::ShapeMismatch`] if not broadcasting and the leading shapes differ
pub fn cat_last(
    inputs: &[&WithGrad<Ten64>],
    allow_broadcast: bool,
) -> Result<(Ten64, Box<FnTen64ToMany<'static>>)> {
    if inputs.is_empty() {
        return Err(Error::EmptyInput { op: "cat" });
    }

    let shapes: Vec<Vec<usize>> = inputs.iter().map(|t| t.value.shape.clone()).collect();
    let mut widths = Vec::with_capacity(inputs.len());
    for shape in &shapes {
        let width = shape.last().copied().ok_or(Error::InvalidDimension {
            dim: -1,
            ndim: 0,
        })?;
        widths.push(width);
    }

    let out = if allow_broadcast {
        let common = broadcast_shapes(shapes.iter().map(|s| &s[..s.len() - 1]))?;
        let expanded = inputs
            .iter()
            .zip(&widths)
            .map(|(t, &w)| {
                let mut target = common.clone();
                target.push(w);
                cpu::expand(&t.value, &target)
            })
            .collect::<Result<Vec<_>>>()?;
        cpu::cat_last(&expanded.iter().collect::<Vec<_>>())?
    } else {
        cpu::cat_last(&inputs.iter().map(|t| &t.value).collect::<Vec<_>>())?
    };

    let back = move |grad_output: &Ten64| -> Result<Vec<Ten64>> {
        cpu::split_last(grad_output, &widths)?
            .into_iter()
            .zip(&shapes)
            .map(|(piece, shape)| cpu::sum_to(&piece, shape))
            .collect()
    };

    Ok((out, Box::new(back)))
}
