//! Operation Dispatch Layer
//!
//! This module selects the correct backend (CPU, WGPU, CUDA) at runtime for
//! the element-wise kernels that have accelerated implementations, based on
//! the global `Backend`.
//!
//! Each function attempts backend-specific implementations in priority order:
//! 1. `Cuda` (if enabled)
//! 2. `Wgpu` (if enabled)
//! 3. Falls back to `Cpu`
//!
//! Shape kernels (`cat_last`, `expand`, ...) only exist on the CPU and are
//! called from `ops::cpu` directly.
//!
//! # Example
//! ```rust
//! use briny_mlp::{tensor, ops::dispatch::exp};
//!
//! let out = exp(&tensor!([[0.0, 0.0], [0.0, 0.0]])); // uses GPU if selected and available
//! assert_eq!(out.data, vec![1.0; 4]);
//! ```

use crate::backend::{Backend, get_backend};
use crate::tensors::Ten64;

/// Dispatches element-wise exponentiation to the selected backend.
///
/// # Behavior
/// Attempts CUDA → WGPU → CPU, depending on availability and features.
/// A failed accelerated attempt is logged and the CPU kernel runs instead.
pub fn exp(input: &Ten64) -> Ten64 {
    match get_backend() {
        Backend::Cuda => {
            #[cfg(feature = "cuda")]
            {
                if let Some(result) = super::cuda::cuda_exp(input) {
                    return result;
                }
            }
            log::debug!("cuda exp unavailable, falling back to cpu");
        }
        Backend::Wgpu => {
            #[cfg(feature = "wgpu")]
            {
                if let Some(result) = super::wgpu::wgpu_exp(input) {
                    return result;
                }
            }
            log::debug!("wgpu exp unavailable, falling back to cpu");
        }
        Backend::Cpu => {}
    }

    super::cpu::exp(input)
}
