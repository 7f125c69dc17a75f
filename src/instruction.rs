//! One graph node bound to its op and picked kernel.

use crate::error::Error;
use crate::kernels::Kernel;
use crate::op_desc::OpDesc;
use crate::operators::OpLite;
use crate::registry::OpRegistry;
use crate::scope::Scope;
use crate::{KernelContext, Place};

#[derive(Debug)]
pub struct Instruction {
    op: Box<dyn OpLite>,
    kernel: Box<dyn Kernel>,
}

impl Instruction {
    /// Creates and attaches the op named by `desc`, then picks its kernel for `place`.
    pub fn new(
        registry: &OpRegistry,
        desc: &OpDesc,
        scope: &mut Scope,
        place: Place,
    ) -> Result<Self, Error> {
        let mut op = registry.create_op(&desc.op_type)?;
        op.attach(desc, scope)?;
        let entry = registry.kernel_entry(&desc.op_type, place)?;
        entry.check_arguments(desc)?;
        let mut kernel = (entry.create)();
        let param = op.param().ok_or_else(|| {
            Error::InternalLogicError(format!("{} attached without a param", desc.op_type))
        })?;
        kernel.set_param(param)?;
        Ok(Self { op, kernel })
    }

    pub fn op(&self) -> &dyn OpLite {
        self.op.as_ref()
    }

    pub fn kernel(&self) -> &dyn Kernel {
        self.kernel.as_ref()
    }

    pub fn infer_shape(&self) -> Result<(), Error> {
        self.op.run_shape_inference()
    }

    /// Infers shapes, then runs the kernel. Any error aborts the node.
    pub fn run(&mut self, ctx: &KernelContext) -> Result<(), Error> {
        self.infer_shape()?;
        debug_println!("run {} on {}", self.op.op_type(), self.kernel.place());
        self.kernel.run(ctx)
    }
}
