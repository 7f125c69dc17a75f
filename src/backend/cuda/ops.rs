#![cfg(feature = "cuda")]

use super::context::CudaContext;
use crate::backend::{
    Backend, KernelContext, STATUS_DEVICE_ERROR, STATUS_INVALID_ARGUMENT, STATUS_SUCCESS,
};
use crate::error::Error;
use crate::Target;

use cust::launch;
use cust::memory::{CopyDestination, DeviceBuffer};
use std::sync::Arc;

// --- CudaBackend Struct ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CudaBackend;

impl CudaBackend {
    fn launch_plugin_add(
        ctx: &CudaContext,
        x: &[f32],
        y: &[f32],
        z: &mut [f32],
        compute_size: usize,
    ) -> Result<(), Error> {
        let kernel = ctx.get_kernel("plugin_add_kernel").ok_or_else(|| {
            Error::CudaError("plugin_add_kernel not found. Check plugin.cu and build.rs.".into())
        })?;
        let stream = ctx.get_stream();

        let x_dev = DeviceBuffer::from_slice(&x[..compute_size])?;
        let y_dev = DeviceBuffer::from_slice(&y[..compute_size])?;
        let mut z_dev = unsafe { DeviceBuffer::<f32>::uninitialized(compute_size)? };

        let block_size = 256u32;
        let grid_size = compute_size.div_ceil(block_size as usize) as u32;
        unsafe {
            launch!(kernel<<<grid_size, block_size, 0, stream>>>(
                x_dev.as_device_ptr(),
                y_dev.as_device_ptr(),
                z_dev.as_device_ptr(),
                compute_size as i32
            ))?;
        }
        stream.synchronize()?;

        z_dev.copy_to(&mut z[..compute_size])?;
        Ok(())
    }
}

impl Backend for CudaBackend {
    type Context = Arc<CudaContext>;

    const TARGET: Target = Target::Cuda;

    fn context(ctx: &KernelContext) -> Result<&Arc<CudaContext>, Error> {
        match ctx {
            KernelContext::Cuda(cuda) => Ok(cuda),
            other => Err(crate::backend::context_mismatch(Self::TARGET, other)),
        }
    }

    fn plugin_add(
        ctx: &Arc<CudaContext>,
        x: &[f32],
        y: &[f32],
        z: &mut [f32],
        compute_size: usize,
    ) -> i32 {
        if x.len() < compute_size || y.len() < compute_size || z.len() < compute_size {
            return STATUS_INVALID_ARGUMENT;
        }
        if compute_size == 0 {
            return STATUS_SUCCESS;
        }
        if compute_size > i32::MAX as usize {
            return STATUS_INVALID_ARGUMENT;
        }
        match Self::launch_plugin_add(ctx, x, y, z, compute_size) {
            Ok(()) => STATUS_SUCCESS,
            Err(_e) => {
                debug_println!("[CudaBackend::plugin_add] launch failed: {}", _e);
                STATUS_DEVICE_ERROR
            }
        }
    }
}
