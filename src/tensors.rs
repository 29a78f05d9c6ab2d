//! Core tensor data structures and shape arithmetic.
//!
//! # Core Tensor Utilities
//!
//! This module defines the minimal tensor representation the MLP building
//! blocks operate on: an N-dimensional array stored as a shape and flat
//! row-major data.
//!
//! It supports:
//! - Construction of N-dimensional tensors, checked (`try_new`) or panicking (`new`)
//! - Leading/last dimension queries used by concatenation along the last axis
//! - Broadcast shape computation over any number of shapes
//! - Autograd-compatible `WithGrad` wrappers
//! - The `tensor!` macro for literal tensors
//!
//! ## Design Highlights
//! - Tensors are strongly typed: `Tensor<T>` for any element type (usually `f64`)
//! - Shape is stored as a `Vec<usize>` and enforced at runtime
//! - Broadcasting follows the usual right-aligned rule: two dims are
//!   compatible when equal or when one of them is `1`
//!
//! ## Example
//!
//! ```rust
//! use briny_mlp::tensors::Tensor;
//! let t = Tensor::new(vec![2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! assert_eq!(t.shape, vec![2, 3]);
//! assert_eq!(t.leading_shape(), &[2]);
//! assert_eq!(t.last_dim(), Some(3));
//! ```

use crate::error::{Error, Result};

/// Represents an N-dimensional tensor with a shape and flat row-major data.
///
/// - All elements must be the same type (`T`).
/// - `shape` defines the structure, e.g., `[2, 3]` for a 2×3 matrix.
/// - `data` holds the flattened content in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    pub shape: Vec<usize>,
    pub data: Vec<T>,
}

/// The tensor type every kernel in this crate computes on.
pub type Ten64 = Tensor<f64>;

impl<T> Tensor<T> {
    /// Creates a new tensor with the given shape and flat data.
    ///
    /// # Panics
    /// Panics if the number of elements in `data` does not match the shape product.
    pub fn new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Self {
        let shape = shape.into();
        assert_eq!(
            shape.iter().product::<usize>(),
            data.len(),
            "shape {:?} is incompatible with {} data elements",
            shape,
            data.len()
        );
        Self { shape, data }
    }

    /// Creates a new tensor, reporting a shape/data mismatch as an error.
    pub fn try_new(shape: impl Into<Vec<usize>>, data: Vec<T>) -> Result<Self> {
        let shape = shape.into();
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(Error::shape_mismatch(&shape, &[data.len()]));
        }
        Ok(Self { shape, data })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// All dimensions except the last one.
    ///
    /// Empty for rank-0 and rank-1 tensors.
    pub fn leading_shape(&self) -> &[usize] {
        match self.shape.split_last() {
            Some((_, leading)) => leading,
            None => &[],
        }
    }

    /// Size of the last dimension, or `None` for a scalar.
    pub fn last_dim(&self) -> Option<usize> {
        self.shape.last().copied()
    }

    /// Resolves a possibly negative dimension index against this tensor's rank.
    pub fn normalize_dim(&self, dim: isize) -> Result<usize> {
        normalize_dim(dim, self.ndim())
    }
}

impl<T: Clone + Default> Tensor<T> {
    /// A tensor of the given shape filled with `T::default()`.
    pub fn zeros(shape: impl Into<Vec<usize>>) -> Self {
        let shape = shape.into();
        let numel = shape.iter().product::<usize>();
        Self {
            shape,
            data: vec![T::default(); numel],
        }
    }

    /// A zero tensor with the same shape as `self`.
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.shape.clone())
    }
}

/// A container for tracking gradients of values (used in autograd).
///
/// Typically used as `WithGrad<Ten64>`.
#[derive(Debug, Clone)]
pub struct WithGrad<T> {
    pub value: T,
    pub grad: T,
}

impl<T: Clone + Default> WithGrad<Tensor<T>> {
    /// Wraps a tensor with a zeroed gradient of the same shape.
    pub fn new(value: Tensor<T>) -> Self {
        let grad = value.zeros_like();
        Self { value, grad }
    }
}

/// Resolves `dim` (negative values count from the end) for a tensor of rank `ndim`.
pub fn normalize_dim(dim: isize, ndim: usize) -> Result<usize> {
    let rank = ndim as isize;
    let resolved = if dim < 0 { dim + rank } else { dim };
    if resolved < 0 || resolved >= rank {
        return Err(Error::InvalidDimension { dim, ndim });
    }
    Ok(resolved as usize)
}

/// Computes the broadcast of two shapes.
///
/// Shapes are aligned on their trailing dimensions; missing leading
/// dimensions count as `1`. Returns `None` if the shapes are incompatible.
pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let max_ndim = a.len().max(b.len());
    let mut result = Vec::with_capacity(max_ndim);

    // right to left
    for i in 0..max_ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim || b_dim == 1 {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else {
            return None;
        }
    }

    result.reverse();
    Some(result)
}

/// Folds [`broadcast_shape`] over any number of shapes.
///
/// An empty iterator yields the scalar shape `[]`.
pub fn broadcast_shapes<'a, I>(shapes: I) -> Result<Vec<usize>>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    shapes.into_iter().try_fold(Vec::new(), |acc, shape| {
        broadcast_shape(&acc, shape).ok_or_else(|| Error::broadcast(&acc, shape))
    })
}

/// Row-major strides for `shape`.
pub fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut product = 1;
    for (stride, &dim) in strides.iter_mut().zip(shape).rev() {
        *stride = product;
        product *= dim;
    }
    strides
}

/// Strides that read a tensor of shape `src` as if it had shape `target`.
///
/// Broadcast dimensions (size `1` in `src`, or absent) get stride `0`.
/// Fails if `src` cannot be broadcast to `target`.
pub fn broadcast_strides(src: &[usize], target: &[usize]) -> Result<Vec<usize>> {
    if src.len() > target.len() {
        return Err(Error::broadcast(src, target));
    }
    let offset = target.len() - src.len();
    let src_strides = contiguous_strides(src);
    let mut strides = vec![0; target.len()];

    for (i, (&dim, &stride)) in src.iter().zip(&src_strides).enumerate() {
        let want = target[offset + i];
        if dim == want {
            strides[offset + i] = stride;
        } else if dim != 1 {
            return Err(Error::broadcast(src, target));
        }
    }
    Ok(strides)
}

/// Defines a tensor from nested literal arrays.
///
/// Supports arbitrary dimensionality as long as sublists are uniform in shape.
///
/// # Example
/// ```
/// use briny_mlp::tensor;
/// let t = tensor!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(t.shape, vec![2, 2]);
/// ```
#[macro_export]
macro_rules! tensor {
    ($lit:literal) => {
        $crate::tensors::Tensor::new(Vec::<usize>::new(), vec![$lit])
    };

    ([ $( [ $( $inner:tt )* ] ),+ $(,)? ]) => {
        $crate::tensor!(@rows $( $crate::tensor!([ $( $inner )* ]) ),+)
    };

    ([ $( $lit:literal ),+ $(,)? ]) => {
        $crate::tensor!(@rows $( $crate::tensor!($lit) ),+)
    };

    (@rows $( $child:expr ),+) => {{
        let children = vec![ $( $child ),+ ];
        let first_shape = &children[0].shape;
        assert!(children.iter().all(|c| c.shape == *first_shape),
            "ragged tensor literal (rows have mismatched shapes)");
        let mut shape = vec![children.len()];
        shape.extend_from_slice(first_shape);
        let mut data = Vec::with_capacity(children.len() * children[0].data.len());
        for c in children { data.extend(c.data); }
        $crate::tensors::Tensor::new(shape, data)
    }};
}
