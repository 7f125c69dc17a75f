//! The `plugin_add` kernel.

use super::{dispatch, Kernel};
use crate::backend::Backend;
use crate::error::Error;
use crate::operators::plugin::PLUGIN_ADD;
use crate::operators::{OpParam, PluginParam};
use crate::tensor::{DataType, Tensor, TensorData};
use crate::{DataLayout, KernelContext, Place, Precision};
use std::marker::PhantomData;

/// Runs `plugin_add` on backend `B` over the flat `computesize` prefix.
#[derive(Debug)]
pub struct PluginCompute<B: Backend> {
    param: Option<PluginParam>,
    _backend: PhantomData<B>,
}

impl<B: Backend> Default for PluginCompute<B> {
    fn default() -> Self {
        Self {
            param: None,
            _backend: PhantomData,
        }
    }
}

impl<B: Backend> PluginCompute<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place this kernel is registered under.
    pub fn registered_place() -> Place {
        Place::new(B::TARGET, Precision::Float, DataLayout::Nchw)
    }

    fn input_type(tensor: &Tensor, name: &str) -> Result<DataType, Error> {
        let dtype = tensor
            .data_type()
            .ok_or_else(|| Error::EmptyTensor(name.to_string()))?;
        if Precision::from(dtype) != Self::registered_place().precision {
            return Err(Error::UnsupportedType {
                op: PLUGIN_ADD.to_string(),
                dtype,
            });
        }
        Ok(dtype)
    }

    fn snapshot(tensor: &Tensor, name: &str) -> Result<TensorData, Error> {
        tensor
            .data()
            .clone()
            .ok_or_else(|| Error::EmptyTensor(name.to_string()))
    }
}

impl<B: Backend> Kernel for PluginCompute<B> {
    fn op_type(&self) -> &str {
        PLUGIN_ADD
    }

    fn place(&self) -> Place {
        Self::registered_place()
    }

    fn set_param(&mut self, param: OpParam) -> Result<(), Error> {
        match param {
            OpParam::Plugin(p) => {
                self.param = Some(p);
                Ok(())
            }
        }
    }

    fn run(&mut self, ctx: &KernelContext) -> Result<(), Error> {
        let param = self
            .param
            .as_ref()
            .ok_or_else(|| Error::MissingTensor(format!("{}: kernel param", PLUGIN_ADD)))?;
        let ctx = B::context(ctx)?;

        Self::input_type(&param.x, "X")?;
        Self::input_type(&param.y, "Y")?;

        // The primitive writes into a scratch copy of Out; Out only takes a complete result.
        drop(param.out.mutable_data_f32()?);
        let mut z = Self::snapshot(&param.out, "Out")?;
        let result = match (param.x.data().as_ref(), param.y.data().as_ref()) {
            (Some(x), Some(y)) => dispatch::<B>(ctx, x, y, &mut z, param.compute_size),
            _ => Err(Error::EmptyTensor(format!("{}: X or Y", PLUGIN_ADD))),
        };

        let mut out = param.out.data_mut()?;
        match result {
            Ok(()) => {
                *out = Some(z);
                Ok(())
            }
            Err(e) => {
                // In place, Out still holds the untouched input.
                if !param.out.same_as(&param.x) && !param.out.same_as(&param.y) {
                    *out = None;
                }
                Err(e)
            }
        }
    }
}
