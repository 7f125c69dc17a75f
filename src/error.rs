#[cfg(feature = "cuda")]
use cust;
use std::io;
use thiserror::Error;

use crate::tensor::DataType;
use crate::Place;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Shape error: {0}")]
    ShapeError(String),

    #[error("Shape mismatch for {op}: {shape_a:?} and {shape_b:?} with axis {axis}: {reason}")]
    ShapeMismatch {
        op: String,
        shape_a: Vec<i64>,
        shape_b: Vec<i64>,
        axis: i32,
        reason: String,
    },

    #[error("Unsupported data type {dtype:?} for {op}")]
    UnsupportedType { op: String, dtype: DataType },

    #[error("Accelerator primitive {primitive} failed with status {status}")]
    DispatchFailure { primitive: String, status: i32 },

    #[error("Buffer too small: {name} holds {len} elements, {required} required")]
    BufferTooSmall {
        name: String,
        len: usize,
        required: usize,
    },

    #[error("Tensor {0} is not bound")]
    MissingTensor(String),

    #[error("Variable {0} not found in scope")]
    VariableNotFound(String),

    #[error("Op {op} has no argument named {argument}")]
    MissingArgument { op: String, argument: String },

    #[error("Op {op} is missing required attribute {name}")]
    MissingAttribute { op: String, name: String },

    #[error("Invalid attribute {name} for op {op}: {reason}")]
    InvalidAttribute {
        op: String,
        name: String,
        reason: String,
    },

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("No kernel registered for {op} on {place}")]
    NoKernelForPlace { op: String, place: Place },

    #[error("Duplicate registration: {0}")]
    DuplicateRegistration(String),

    #[error("Tensor {0} has no data")]
    EmptyTensor(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Internal logic error: {0}")]
    InternalLogicError(String),

    #[cfg(feature = "cuda")]
    #[error("CUDA error: {0}")]
    CudaError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[cfg(feature = "serialization")]
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[cfg(feature = "serialization")]
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

#[cfg(feature = "cuda")]
impl From<cust::error::CudaError> for Error {
    fn from(err: cust::error::CudaError) -> Self {
        Error::CudaError(err.to_string())
    }
}
