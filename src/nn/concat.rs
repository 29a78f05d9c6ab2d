use super::{Module, Value};
use crate::backprop::{self, FnTen64ToMany};
use crate::error::{Error, Result};
use crate::ops::cpu;
use crate::tensors::{Ten64, WithGrad, broadcast_shapes};

/// Concatenates tensors along their last dimension.
///
/// With `allow_broadcast` set, the leading dimensions (all but the last) of
/// every input are first broadcast to a common shape; each input keeps its
/// own last dimension. Without it, leading dimensions must already match.
///
/// # Argument handling
///
/// - A single argument is unwrapped: `forward(&[x])` behaves like `forward` on
///   the contents of `x`.
/// - A single tensor (bare, or as the only item of a list) is returned
///   unchanged; no concatenation happens.
/// - Otherwise every item must be a tensor; nested lists are rejected.
///
/// # Example
///
/// ```rust
/// use briny_mlp::nn::{ConcatModule, Module, Value};
/// use briny_mlp::tensors::Tensor;
///
/// let a = Tensor::new(vec![4, 1, 2], vec![0.0; 8]);
/// let b = Tensor::new(vec![1, 3, 5], vec![0.0; 15]);
///
/// let out = ConcatModule::new(true)
///     .forward(&[Value::from(a), Value::from(b)])
///     .unwrap()
///     .into_tensor()
///     .unwrap();
/// assert_eq!(out.shape, vec![4, 3, 7]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcatModule {
    allow_broadcast: bool,
}

impl ConcatModule {
    /// Creates the module; the broadcasting choice is fixed for its lifetime.
    #[must_use]
    pub const fn new(allow_broadcast: bool) -> Self {
        Self { allow_broadcast }
    }

    /// Whether leading dimensions are broadcast before concatenating.
    #[must_use]
    pub const fn allow_broadcast(&self) -> bool {
        self.allow_broadcast
    }

    /// Concatenates `tensors` along the last axis.
    ///
    /// # Errors
    /// - [`Error::EmptyInput`] for an empty slice
    /// - [`Error::InvalidDimension`] if any tensor is rank 0
    /// - [`Error::ShapeMismatch`] if not broadcasting and leading shapes differ
    /// - [`Error::Broadcast`] if broadcasting and leading shapes are incompatible
    pub fn concat(&self, tensors: &[&Ten64]) -> Result<Ten64> {
        if !self.allow_broadcast {
            return cpu::cat_last(tensors);
        }

        if tensors.is_empty() {
            return Err(Error::EmptyInput { op: "concat" });
        }
        if tensors.iter().any(|t| t.ndim() == 0) {
            return Err(Error::InvalidDimension { dim: -1, ndim: 0 });
        }

        let common = broadcast_shapes(tensors.iter().map(|t| t.leading_shape()))?;
        let expanded = tensors
            .iter()
            .map(|t| {
                let mut target = common.clone();
                target.extend(t.last_dim());
                cpu::expand(t, &target)
            })
            .collect::<Result<Vec<_>>>()?;

        cpu::cat_last(&expanded.iter().collect::<Vec<_>>())
    }

    /// Forward pass with a backward closure, see [`backprop::cat_last`].
    pub fn forward_with_grad(
        &self,
        inputs: &[&WithGrad<Ten64>],
    ) -> Result<(Ten64, Box<FnTen64ToMany<'static>>)> {
        backprop::cat_last(inputs, self.allow_broadcast)
    }
}

impl Module for ConcatModule {
    fn forward(&self, args: &[Value]) -> Result<Value> {
        let items = match args {
            [] => return Err(Error::EmptyInput { op: "concat" }),
            [Value::Tensor(t)] => {
                log::trace!("concat: single tensor {:?}, passing through", t.shape);
                return Ok(Value::Tensor(t.clone()));
            }
            [Value::List(items)] => items.as_slice(),
            many => many,
        };

        if let Some(pos) = items.iter().position(|v| !v.is_tensor()) {
            return Err(Error::invalid_argument(
                "inputs",
                format!("concat expects tensors, found a nested list at position {pos}"),
            ));
        }
        let tensors: Vec<&Ten64> = items.iter().filter_map(Value::as_tensor).collect();

        match tensors.as_slice() {
            [] => Err(Error::EmptyInput { op: "concat" }),
            [single] => {
                log::trace!("concat: single tensor {:?}, passing through", single.shape);
                Ok(Value::Tensor((*single).clone()))
            }
            _ => {
                let out = self.concat(&tensors)?;
                log::trace!(
                    "concat: {} tensors -> {:?} (broadcast: {})",
                    tensors.len(),
                    out.shape,
                    self.allow_broadcast
                );
                Ok(Value::Tensor(out))
            }
        }
    }
}
