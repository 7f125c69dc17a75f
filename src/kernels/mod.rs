//! Kernels: run an attached op's computation on one target.

use crate::backend::{Backend, STATUS_SUCCESS};
use crate::error::Error;
use crate::operators::OpParam;
use crate::tensor::{DataType, TensorData};
use crate::{KernelContext, Place};
use std::fmt::Debug;

pub mod plugin;

pub use plugin::PluginCompute;

pub trait Kernel: Debug {
    /// Op this kernel computes.
    fn op_type(&self) -> &str;

    /// Place the kernel was registered for.
    fn place(&self) -> Place;

    fn set_param(&mut self, param: OpParam) -> Result<(), Error>;

    fn run(&mut self, ctx: &KernelContext) -> Result<(), Error>;
}

fn check_len(name: &str, len: usize, required: usize) -> Result<(), Error> {
    if len < required {
        return Err(Error::BufferTooSmall {
            name: name.to_string(),
            len,
            required,
        });
    }
    Ok(())
}

/// Hands `compute_size` elements of `x` and `y` to `B::plugin_add`, writing `out`.
///
/// Only `Float32` buffers are wired to the primitive. Any non-zero status is
/// returned as [`Error::DispatchFailure`]; `out` may then hold a partial write.
pub fn dispatch<B: Backend>(
    ctx: &B::Context,
    x: &TensorData,
    y: &TensorData,
    out: &mut TensorData,
    compute_size: usize,
) -> Result<(), Error> {
    if let Some(dtype) = [x.data_type(), y.data_type(), out.data_type()]
        .into_iter()
        .find(|&t| t != DataType::Float32)
    {
        return Err(Error::UnsupportedType {
            op: "plugin_add".to_string(),
            dtype,
        });
    }
    let (TensorData::F32(x), TensorData::F32(y), TensorData::F32(z)) = (x, y, out) else {
        return Err(Error::InternalLogicError(
            "plugin_add buffers changed type during dispatch".into(),
        ));
    };

    check_len("X", x.len(), compute_size)?;
    check_len("Y", y.len(), compute_size)?;
    check_len("Out", z.len(), compute_size)?;

    debug_println!(
        "dispatch plugin_add on {:?}: compute_size={}",
        B::TARGET,
        compute_size
    );
    let status = B::plugin_add(ctx, x, y, z, compute_size);
    if status != STATUS_SUCCESS {
        return Err(Error::DispatchFailure {
            primitive: "plugin_add".to_string(),
            status,
        });
    }
    Ok(())
}
