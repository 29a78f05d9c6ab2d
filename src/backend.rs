//! Process-wide choice of where element-wise kernels run.
//!
//! Only [`crate::ops::dispatch`] reads this setting. Shape kernels
//! (concatenation, broadcasting) always run on the CPU, and a backend whose
//! cargo feature is disabled or whose device is missing degrades to the CPU
//! kernel rather than failing.
//!
//! ```
//! use briny_mlp::backend::{Backend, get_backend, set_backend};
//!
//! let backend: Backend = "cpu".parse().unwrap();
//! set_backend(backend);
//! assert_eq!(get_backend(), Backend::Cpu);
//! ```

use crate::error::{Error, Result};
use core::str::FromStr;
use core::sync::atomic::{AtomicU8, Ordering};

/// Where element-wise kernels are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Backend {
    /// rayon kernels in `ops::cpu`.
    #[default]
    Cpu = 0,
    /// WGSL compute shaders (feature `wgpu`), computed in `f32`.
    Wgpu = 1,
    /// Routed to `Wgpu` until a native kernel exists (feature `cuda`).
    Cuda = 2,
}

impl Backend {
    const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::Wgpu,
            2 => Self::Cuda,
            _ => Self::Cpu,
        }
    }
}

impl FromStr for Backend {
    type Err = Error;

    /// Accepts `cpu`, `wgpu` or `cuda`, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "wgpu" => Ok(Self::Wgpu),
            "cuda" => Ok(Self::Cuda),
            _ => Err(Error::invalid_argument(
                "backend",
                format!("unknown backend '{s}'"),
            )),
        }
    }
}

static ACTIVE: AtomicU8 = AtomicU8::new(Backend::Cpu as u8);

/// Selects the backend for every subsequent element-wise kernel call.
pub fn set_backend(backend: Backend) {
    log::debug!("element-wise backend set to {backend:?}");
    ACTIVE.store(backend as u8, Ordering::Release);
}

/// The backend element-wise kernels currently dispatch to.
pub fn get_backend() -> Backend {
    Backend::from_tag(ACTIVE.load(Ordering::Acquire))
}
