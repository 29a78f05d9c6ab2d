//! Parallel CPU backend tensor operations
//!
//! # CPU Backend
//!
//! This module provides the CPU implementations of every kernel the MLP
//! building blocks need. They are the default when calling into
//! `ops::dispatch`, and the only implementation for the shape kernels.
//!
//! ## Features
//!
//! - Parallel execution using [`rayon`](https://docs.rs/rayon)
//! - Pure Rust, no `unsafe`
//!
//! ## Implemented Ops
//!
//! - Elementwise: `exp`, `relu`, `sigmoid`, `tanh`, `softplus`
//! - Axis-wise: `softmax`, `log_softmax`
//! - Shape: `expand`, `sum_to`, `cat_last`, `split_last`
//!
//! ## Design Goals
//!
//! - Deterministic results (given deterministic input and scheduling)
//! - Inputs are never mutated; every kernel allocates its output
//! - Shape violations are reported as [`Error`]s, never panics

use crate::error::{Error, Result};
use crate::tensors::{Ten64, Tensor, broadcast_strides, contiguous_strides};
use rayon::prelude::*;

fn map_unary(input: &Ten64, f: impl Fn(f64) -> f64 + Sync + Send) -> Ten64 {
    let data = input.data.par_iter().map(|&x| f(x)).collect();
    Tensor::new(input.shape.clone(), data)
}

/// Applies `e^x` element-wise.
///
/// # Example
/// ```rust
/// use briny_mlp::{tensor, ops::cpu::exp};
///
/// let out = exp(&tensor!([0.0, 1.0]));
/// assert_eq!(out.data[0], 1.0);
/// ```
pub fn exp(input: &Ten64) -> Ten64 {
    map_unary(input, f64::exp)
}

/// Applies `max(0, x)` element-wise.
pub fn relu(input: &Ten64) -> Ten64 {
    map_unary(input, |x| if x > 0.0 { x } else { 0.0 })
}

/// Applies the logistic function `1 / (1 + e^-x)` element-wise.
pub fn sigmoid(input: &Ten64) -> Ten64 {
    map_unary(input, |x| 1.0 / (1.0 + (-x).exp()))
}

/// Applies the hyperbolic tangent element-wise.
pub fn tanh(input: &Ten64) -> Ten64 {
    map_unary(input, f64::tanh)
}

/// Applies `ln(1 + e^x)` element-wise.
///
/// Evaluated as `max(x, 0) + ln(1 + e^-|x|)` so large inputs do not overflow.
pub fn softplus(input: &Ten64) -> Ten64 {
    map_unary(input, |x| x.max(0.0) + (-x.abs()).exp().ln_1p())
}

/// Splits `shape` around `dim` into `(outer, len, inner)` element counts.
fn axis_extents(shape: &[usize], dim: usize) -> (usize, usize, usize) {
    let outer = shape[..dim].iter().product();
    let len = shape[dim];
    let inner = shape[dim + 1..].iter().product();
    (outer, len, inner)
}

/// Shared driver for softmax-like kernels.
///
/// For every lane along `dim`, `f` receives the lane's maximum and the sum of
/// `e^(x - max)` and maps each element to its output.
fn normalize_along(
    input: &Ten64,
    dim: isize,
    f: impl Fn(f64, f64, f64) -> f64 + Sync + Send,
) -> Result<Ten64> {
    let dim = input.normalize_dim(dim)?;
    let (_, len, inner) = axis_extents(&input.shape, dim);
    let block = len * inner;
    let mut data = vec![0.0f64; input.numel()];

    if block > 0 {
        data.par_chunks_mut(block)
            .zip(input.data.par_chunks(block))
            .for_each(|(out, src)| {
                for j in 0..inner {
                    let lane = (0..len).map(|k| src[k * inner + j]);
                    let max = lane.clone().fold(f64::NEG_INFINITY, f64::max);
                    let sum: f64 = lane.map(|x| (x - max).exp()).sum();
                    for k in 0..len {
                        let idx = k * inner + j;
                        out[idx] = f(src[idx], max, sum);
                    }
                }
            });
    }

    Ok(Tensor::new(input.shape.clone(), data))
}

/// Normalized exponential along `dim`: each lane sums to one.
///
/// # Errors
/// [`Error::InvalidDimension`] if `dim` is out of range (negative counts from the end).
///
/// # Example
/// ```rust
/// use briny_mlp::{tensor, ops::cpu::softmax};
///
/// let out = softmax(&tensor!([[1.0, 1.0], [2.0, 2.0]]), 1).unwrap();
/// assert_eq!(out.data, vec![0.5, 0.5, 0.5, 0.5]);
/// ```
pub fn softmax(input: &Ten64, dim: isize) -> Result<Ten64> {
    normalize_along(input, dim, |x, max, sum| (x - max).exp() / sum)
}

/// Logarithm of [`softmax`] along `dim`, computed without forming the ratio.
pub fn log_softmax(input: &Ten64, dim: isize) -> Result<Ten64> {
    normalize_along(input, dim, |x, max, sum| x - max - sum.ln())
}

/// Materializes `input` broadcast to `target`.
///
/// `input.shape` is aligned with the trailing dimensions of `target`; each of
/// its dimensions must equal the target dimension or be `1`.
///
/// # Errors
/// [`Error::Broadcast`] if `input` cannot be broadcast to `target`.
pub fn expand(input: &Ten64, target: &[usize]) -> Result<Ten64> {
    if input.shape == target {
        return Ok(input.clone());
    }

    let src_strides = broadcast_strides(&input.shape, target)?;
    let out_strides = contiguous_strides(target);
    let numel: usize = target.iter().product();
    let src = &input.data;

    let data = (0..numel)
        .into_par_iter()
        .map(|i| {
            let mut rem = i;
            let mut offset = 0;
            for (&os, &ss) in out_strides.iter().zip(&src_strides) {
                offset += (rem / os) * ss;
                rem %= os;
            }
            src[offset]
        })
        .collect();

    Ok(Tensor::new(target.to_vec(), data))
}

/// Sums `input` down to `target`, the inverse of [`expand`] for gradients.
///
/// # Errors
/// [`Error::Broadcast`] if `target` does not broadcast to `input.shape`.
pub fn sum_to(input: &Ten64, target: &[usize]) -> Result<Ten64> {
    if input.shape == target {
        return Ok(input.clone());
    }

    let dst_strides = broadcast_strides(target, &input.shape)?;
    let in_strides = contiguous_strides(&input.shape);
    let mut out = Tensor::zeros(target.to_vec());

    for (i, &x) in input.data.iter().enumerate() {
        let mut rem = i;
        let mut offset = 0;
        for (&is, &ds) in in_strides.iter().zip(&dst_strides) {
            offset += (rem / is) * ds;
            rem %= is;
        }
        out.data[offset] += x;
    }

    Ok(out)
}

/// Concatenates tensors along their last dimension.
///
/// All inputs must have rank ≥ 1 and identical leading dimensions.
///
/// # Errors
/// - [`Error::EmptyInput`] for an empty slice
/// - [`Error::InvalidDimension`] for a rank-0 input
/// - [`Error::ShapeMismatch`] if leading dimensions differ
///
/// # Example
/// ```rust
/// use briny_mlp::{tensor, ops::cpu::cat_last};
///
/// let a = tensor!([[1.0], [2.0]]);
/// let b = tensor!([[3.0, 4.0], [5.0, 6.0]]);
/// let c = cat_last(&[&a, &b]).unwrap();
/// assert_eq!(c.shape, vec![2, 3]);
/// assert_eq!(c.data, vec![1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);
/// ```
pub fn cat_last(inputs: &[&Ten64]) -> Result<Ten64> {
    let first = inputs.first().ok_or(Error::EmptyInput { op: "cat" })?;
    let leading = first.leading_shape();

    let mut widths = Vec::with_capacity(inputs.len());
    for t in inputs {
        let width = t.last_dim().ok_or(Error::InvalidDimension { dim: -1, ndim: 0 })?;
        if t.leading_shape() != leading {
            return Err(Error::shape_mismatch(leading, t.leading_shape()));
        }
        widths.push(width);
    }

    let total: usize = widths.iter().sum();
    let rows: usize = leading.iter().product();
    let mut shape = leading.to_vec();
    shape.push(total);

    let mut data = vec![0.0f64; rows * total];
    if total > 0 {
        data.par_chunks_mut(total)
            .enumerate()
            .for_each(|(row, out_row)| {
                let mut col = 0;
                for (t, &w) in inputs.iter().zip(&widths) {
                    out_row[col..col + w].copy_from_slice(&t.data[row * w..(row + 1) * w]);
                    col += w;
                }
            });
    }

    Ok(Tensor::new(shape, data))
}

/// Splits `input` along its last dimension into pieces of the given widths.
///
/// # Errors
/// [`Error::ShapeMismatch`] if the widths do not sum to the last dimension.
pub fn split_last(input: &Ten64, widths: &[usize]) -> Result<Vec<Ten64>> {
    let total: usize = widths.iter().sum();
    if input.last_dim() != Some(total) {
        let mut expected = input.leading_shape().to_vec();
        expected.push(total);
        return Err(Error::shape_mismatch(&expected, &input.shape));
    }

    let leading = input.leading_shape();
    let rows: usize = leading.iter().product();
    let mut col = 0;
    let mut pieces = Vec::with_capacity(widths.len());

    for &w in widths {
        let mut data = Vec::with_capacity(rows * w);
        for row in 0..rows {
            let start = row * total + col;
            data.extend_from_slice(&input.data[start..start + w]);
        }
        let mut shape = leading.to_vec();
        shape.push(w);
        pieces.push(Tensor::new(shape, data));
        col += w;
    }

    Ok(pieces)
}
