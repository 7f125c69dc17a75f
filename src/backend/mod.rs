//! Backend trait definition and module structure.
//!
//! A backend owns exactly one external primitive, `plugin_add`, which reports
//! its outcome as an integer status the way native accelerator libraries do.
//! Interpreting that status is left to the kernel.

use crate::error::Error;
use crate::Target;
use std::fmt::Debug;

pub mod cpu;
#[cfg(feature = "cuda")]
pub mod cuda;

/// Status returned by a primitive that completed.
pub const STATUS_SUCCESS: i32 = 0;
/// Status returned when arguments do not satisfy the primitive's contract.
pub const STATUS_INVALID_ARGUMENT: i32 = -1;
/// Status returned when the device rejected the launch or a transfer.
pub const STATUS_DEVICE_ERROR: i32 = -2;

/// Execution context handed to kernels by the host, one variant per target.
#[derive(Debug, Clone)]
pub enum KernelContext {
    Host(cpu::CpuContext),
    #[cfg(feature = "cuda")]
    Cuda(std::sync::Arc<cuda::CudaContext>),
}

impl KernelContext {
    pub fn target(&self) -> Target {
        match self {
            KernelContext::Host(_) => Target::Host,
            #[cfg(feature = "cuda")]
            KernelContext::Cuda(_) => Target::Cuda,
        }
    }
}

pub trait Backend: Sized + Debug + Clone + 'static {
    /// Context type the primitive runs under.
    type Context: Debug;

    /// Target this backend is registered for.
    const TARGET: Target;

    /// Extracts this backend's context, failing if the host passed another target's.
    fn context(ctx: &KernelContext) -> Result<&Self::Context, Error>;

    /// Element-wise `z[i] = x[i] + y[i]` for `i < compute_size`.
    ///
    /// Returns [`STATUS_SUCCESS`] or a non-zero status. `z` must not be
    /// written when the status is [`STATUS_INVALID_ARGUMENT`].
    fn plugin_add(
        ctx: &Self::Context,
        x: &[f32],
        y: &[f32],
        z: &mut [f32],
        compute_size: usize,
    ) -> i32;
}

pub(crate) fn context_mismatch(expected: Target, ctx: &KernelContext) -> Error {
    Error::InvalidOperation(format!(
        "kernel for {:?} received a {:?} context",
        expected,
        ctx.target()
    ))
}
