//! # Operation Dispatch Layer
//!
//! This module defines the tensor kernels behind the MLP building blocks and
//! dispatches the accelerated ones across compute backends.
//!
//! ## Submodules
//!
//! - [`cpu`] — Multi-threaded CPU kernels (default fallback backend)
//! - [`wgpu`] *(opt-in)* — GPU compute shader for element-wise exp using `wgpu`
//! - [`cuda`] *(planned)* — CUDA placeholder, dispatches to WebGPU
//! - [`dispatch`] — Dynamic backend switching
//!
//! ## Backend Selection
//!
//! ```rust
//! use briny_mlp::backend::{set_backend, Backend};
//! use briny_mlp::{tensor, ops::dispatch::exp};
//!
//! set_backend(Backend::Cpu);
//! let out = exp(&tensor!([0.0]));
//! assert_eq!(out.data, vec![1.0]);
//! ```
//!
//! ## Feature Flags
//!
//! - `wgpu` — Enables `wgpu` (WebGPU) backend
//! - `cuda` — Enables placeholder CUDA module (dispatches to WGPU)

pub mod cpu;
#[cfg(feature = "cuda")]
pub mod cuda;
pub mod dispatch;
#[cfg(feature = "wgpu")]
pub mod wgpu;
