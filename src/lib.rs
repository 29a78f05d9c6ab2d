//! briny_mlp: composable building blocks for configurable MLPs.
//!
//! The encoder and decoder networks of a semi-supervised VAE are multi-layer
//! perceptrons assembled from linear layers, activations, and a handful of
//! shape-handling helpers. This crate provides those helpers together with
//! the minimal tensor type and kernels they run on.
//!
//! # Features
//!
//! - Element-wise exponentiation as a module ([`nn::Exp`]).
//! - Concatenation along the last axis with optional broadcasting of the
//!   leading dimensions ([`nn::ConcatModule`]).
//! - Fan-out of one input to several modules ([`nn::ListOutModule`]).
//! - Activation instantiation with the softmax axis fixed to the feature
//!   dimension ([`nn::call_nn_op`]).
//! - Gradient-carrying variants of exp and concatenation ([`backprop`]).
//!
//! # Modules
//!
//! - [`tensors`] — Core tensor data structures and shape arithmetic.
//! - [`ops`] — CPU kernels and backend dispatch.
//! - [`backprop`] — Differentiable operations.
//! - [`nn`] — The module building blocks.
//! - [`backend`] — Runtime backend selection.
//! - [`error`] — Error type shared by every fallible operation.
//! - [`approx`] — Tolerance-based comparison of floats and tensors.
//!
//! # Example
//!
//! ```rust
//! use briny_mlp::nn::{ConcatModule, Module, Value};
//! use briny_mlp::tensor;
//!
//! let x = tensor!([[1.0, 2.0], [3.0, 4.0]]);
//! let y = tensor!([[5.0], [6.0]]);
//! let xy = ConcatModule::default()
//!     .forward(&[Value::from(x), Value::from(y)])
//!     .unwrap()
//!     .into_tensor()
//!     .unwrap();
//! assert_eq!(xy.shape, vec![2, 3]);
//! ```

pub mod approx;
pub mod backend;
pub mod backprop;
pub mod error;
pub mod nn;
pub mod ops;
pub mod tensors;

pub use crate::error::{Error, Result};
