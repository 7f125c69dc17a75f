//! CPU backend implementation using `ndarray`.

use crate::backend::{Backend, KernelContext, STATUS_INVALID_ARGUMENT, STATUS_SUCCESS};
use crate::error::Error;
use crate::Target;
use ndarray::{ArrayView1, ArrayViewMut1, Zip};

/// Host execution context. Carries nothing; the host CPU needs no handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuContext;

/// Marker struct for the CPU backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuBackend;

impl Backend for CpuBackend {
    type Context = CpuContext;

    const TARGET: Target = Target::Host;

    fn context(ctx: &KernelContext) -> Result<&CpuContext, Error> {
        match ctx {
            KernelContext::Host(cpu) => Ok(cpu),
            #[allow(unreachable_patterns)]
            other => Err(super::context_mismatch(Self::TARGET, other)),
        }
    }

    fn plugin_add(
        _ctx: &CpuContext,
        x: &[f32],
        y: &[f32],
        z: &mut [f32],
        compute_size: usize,
    ) -> i32 {
        if x.len() < compute_size || y.len() < compute_size || z.len() < compute_size {
            debug_println!(
                "plugin_add: compute_size {} exceeds buffers x={} y={} z={}",
                compute_size,
                x.len(),
                y.len(),
                z.len()
            );
            return STATUS_INVALID_ARGUMENT;
        }

        let x = ArrayView1::from(&x[..compute_size]);
        let y = ArrayView1::from(&y[..compute_size]);
        let z = ArrayViewMut1::from(&mut z[..compute_size]);
        Zip::from(z)
            .and(x)
            .and(y)
            .for_each(|out, &a, &b| *out = a + b);
        STATUS_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_add_prefix_only() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        let mut z = [0.0; 4];
        let status = CpuBackend::plugin_add(&CpuContext, &x, &y, &mut z, 3);
        assert_eq!(status, STATUS_SUCCESS);
        assert_eq!(z, [11.0, 22.0, 33.0, 0.0]);
    }

    #[test]
    fn test_plugin_add_short_buffer_untouched() {
        let x = [1.0, 2.0];
        let y = [1.0, 2.0, 3.0];
        let mut z = [7.0; 3];
        let status = CpuBackend::plugin_add(&CpuContext, &x, &y, &mut z, 3);
        assert_eq!(status, STATUS_INVALID_ARGUMENT);
        assert_eq!(z, [7.0; 3]);
    }
}
