//! Plug-in operator and kernel for a broadcasting elementwise add.
//!
//! This library provides the two halves of the `plugin_add` operator:
//! - Shape inference with NumPy-style broadcasting and an explicit axis offset
//! - A compute kernel that hands flat buffers to an accelerator primitive
//!
//! Both are bound to the op name through an explicit [`OpRegistry`].
//!
//! # Features
//! - `cuda` - Enables the CUDA primitive (requires CUDA toolkit)
//! - `serialization` - Enables JSON loading of op descriptions
//! - `debug_logs` - Prints debug traces
//!
//! # Example
//! ```rust
//! use plugin_ops::{
//!     backend::cpu::CpuContext, Instruction, KernelContext, OpDesc, OpRegistry, Place, Scope,
//!     Tensor,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scope = Scope::new();
//!     scope.insert("x", Tensor::from_f32(vec![1.0, 2.0, 3.0], &[3])?);
//!     scope.insert("y", Tensor::from_f32(vec![4.0, 5.0, 6.0], &[3])?);
//!
//!     let desc = OpDesc::new("plugin_add")
//!         .with_input("X", &["x"])
//!         .with_input("Y", &["y"])
//!         .with_output("Out", &["out"])
//!         .with_attr("axis", -1)
//!         .with_attr("computesize", 3);
//!
//!     let registry = OpRegistry::with_builtins();
//!     let mut inst = Instruction::new(&registry, &desc, &mut scope, Place::host_float())?;
//!     inst.run(&KernelContext::Host(CpuContext::default()))?;
//!
//!     let out = scope.find_var("out").unwrap();
//!     assert_eq!(out.to_vec_f32()?, vec![5.0, 7.0, 9.0]);
//!     Ok(())
//! }
//! ```

// --- Central debug_println macro definition ---
/// Conditional logging macro. Prints if 'debug_logs' feature is enabled.
#[cfg(feature = "debug_logs")]
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {
        ::std::println!("[DEBUG {}] {}", module_path!(), ::std::format_args!($($arg)*))
    };
}

/// Conditional logging macro (disabled version). Does nothing.
#[cfg(not(feature = "debug_logs"))]
#[macro_export]
macro_rules! debug_println {
    ($($arg:tt)*) => {};
}

pub mod backend;
pub mod broadcast;
pub mod error;
pub mod instruction;
pub mod kernels;
pub mod op_desc;
pub mod operators;
pub mod registry;
pub mod scope;
pub mod shape;
pub mod tensor;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware target a kernel runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Target {
    /// Host CPU
    Host,
    /// CUDA accelerator
    #[cfg(feature = "cuda")]
    Cuda,
}

/// Numeric precision a kernel is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Precision {
    Float,
    Fp16,
    Int32,
    Int64,
    Any,
}

impl From<DataType> for Precision {
    fn from(dtype: DataType) -> Self {
        match dtype {
            DataType::Float32 => Precision::Float,
            DataType::Float16 => Precision::Fp16,
            DataType::Int32 => Precision::Int32,
            DataType::Int64 => Precision::Int64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum DataLayout {
    Nchw,
    Any,
}

/// The (target, precision, layout) key a kernel is registered and picked under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Place {
    pub target: Target,
    pub precision: Precision,
    pub layout: DataLayout,
}

impl Place {
    pub fn new(target: Target, precision: Precision, layout: DataLayout) -> Self {
        Self {
            target,
            precision,
            layout,
        }
    }

    /// Host, float32, NCHW.
    pub fn host_float() -> Self {
        Self::new(Target::Host, Precision::Float, DataLayout::Nchw)
    }

    #[cfg(feature = "cuda")]
    pub fn cuda_float() -> Self {
        Self::new(Target::Cuda, Precision::Float, DataLayout::Nchw)
    }

    /// Whether a kernel registered here can serve `requested`. `Any` on the
    /// registered side matches every precision or layout; the target must be equal.
    pub fn accepts(&self, requested: Place) -> bool {
        self.target == requested.target
            && (self.precision == Precision::Any || self.precision == requested.precision)
            && (self.layout == DataLayout::Any || self.layout == requested.layout)
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.target, self.precision, self.layout)
    }
}

// Re-export the public types for easier use by consumers of the library
pub use backend::{Backend, KernelContext, STATUS_SUCCESS};
pub use backend::cpu::CpuBackend;
#[cfg(feature = "cuda")]
pub use backend::cuda::CudaBackend;
pub use broadcast::resolve;
pub use error::Error;
pub use instruction::Instruction;
pub use kernels::{dispatch, Kernel, PluginCompute};
pub use op_desc::{Attribute, OpDesc};
pub use operators::{OpLite, PluginOp, PluginParam};
pub use registry::{global_registry, OpRegistry};
pub use scope::Scope;
pub use shape::{Lod, Shape};
pub use tensor::{DataType, Tensor, TensorData};
