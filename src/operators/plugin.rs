//! The `plugin_add` operator.

use super::{OpLite, OpParam};
use crate::broadcast;
use crate::error::Error;
use crate::op_desc::OpDesc;
use crate::scope::Scope;
use crate::tensor::Tensor;

pub const PLUGIN_ADD: &str = "plugin_add";

/// Tensors and attributes of one attached `plugin_add` node.
#[derive(Debug, Clone)]
pub struct PluginParam {
    pub x: Tensor,
    pub y: Tensor,
    pub out: Tensor,
    /// `-1` aligns trailing dims; otherwise the left offset of the shorter input.
    pub axis: i32,
    /// Flat element count handed to the primitive.
    pub compute_size: usize,
}

#[derive(Debug, Default)]
pub struct PluginOp {
    param: Option<PluginParam>,
}

impl PluginOp {
    pub fn new() -> Self {
        Self::default()
    }

    fn invalid_attr(name: &str, reason: String) -> Error {
        Error::InvalidAttribute {
            op: PLUGIN_ADD.to_string(),
            name: name.to_string(),
            reason,
        }
    }
}

impl OpLite for PluginOp {
    fn op_type(&self) -> &str {
        PLUGIN_ADD
    }

    fn attach(&mut self, desc: &OpDesc, scope: &mut Scope) -> Result<(), Error> {
        let x = scope.var(desc.input("X")?)?;
        let y = scope.var(desc.input("Y")?)?;
        let out = scope.new_var(desc.output("Out")?);

        let axis = desc.get_attr_i32("axis")?;
        if axis < broadcast::AUTO_AXIS {
            return Err(Self::invalid_attr(
                "axis",
                format!("expected -1 or a non-negative offset, got {}", axis),
            ));
        }

        let compute_size = desc.get_attr_i32("computesize")?;
        let compute_size = usize::try_from(compute_size).map_err(|_| {
            Self::invalid_attr(
                "computesize",
                format!("expected a non-negative element count, got {}", compute_size),
            )
        })?;

        debug_println!(
            "attach {}: X={:?} Y={:?} Out={:?} axis={} computesize={}",
            PLUGIN_ADD,
            x,
            y,
            out,
            axis,
            compute_size
        );

        self.param = Some(PluginParam {
            x,
            y,
            out,
            axis,
            compute_size,
        });
        Ok(())
    }

    fn check_shape(&self) -> Result<(), Error> {
        match self.param {
            Some(_) => Ok(()),
            None => Err(Error::MissingTensor(format!("{}: X, Y, Out", PLUGIN_ADD))),
        }
    }

    fn infer_shape(&self) -> Result<(), Error> {
        let param = self
            .param
            .as_ref()
            .ok_or_else(|| Error::MissingTensor(format!("{}: X, Y, Out", PLUGIN_ADD)))?;

        let x_dims = param.x.dims();
        let y_dims = param.y.dims();
        let out_dims = broadcast::resolve(&x_dims, &y_dims, param.axis).map_err(|e| match e {
            Error::ShapeMismatch {
                shape_a,
                shape_b,
                axis,
                reason,
                ..
            } => Error::ShapeMismatch {
                op: PLUGIN_ADD.to_string(),
                shape_a,
                shape_b,
                axis,
                reason,
            },
            other => other,
        })?;

        debug_println!(
            "infer_shape {}: {} and {} -> {}",
            PLUGIN_ADD,
            x_dims,
            y_dims,
            out_dims
        );

        param.out.resize(out_dims);
        param.out.set_lod(param.x.lod());
        Ok(())
    }

    fn param(&self) -> Option<OpParam> {
        self.param.clone().map(OpParam::Plugin)
    }
}
