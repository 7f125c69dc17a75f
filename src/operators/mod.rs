//! Operators: attach to a graph node and infer output shapes.

use crate::error::Error;
use crate::op_desc::OpDesc;
use crate::scope::Scope;
use std::fmt::Debug;

pub mod plugin;

pub use plugin::{PluginOp, PluginParam};

/// Parameters an op hands to its kernel after attaching.
#[derive(Debug, Clone)]
pub enum OpParam {
    Plugin(PluginParam),
}

pub trait OpLite: Debug {
    /// Name the op is registered under.
    fn op_type(&self) -> &str;

    /// Binds the op to its tensors and reads its attributes.
    fn attach(&mut self, desc: &OpDesc, scope: &mut Scope) -> Result<(), Error>;

    /// Checks that every tensor the op needs is bound.
    fn check_shape(&self) -> Result<(), Error>;

    /// Computes and writes the output dims (and lod).
    fn infer_shape(&self) -> Result<(), Error>;

    /// The attached parameters, for the kernel.
    fn param(&self) -> Option<OpParam>;

    /// `check_shape` followed by `infer_shape`.
    fn run_shape_inference(&self) -> Result<(), Error> {
        self.check_shape()?;
        self.infer_shape()
    }
}
