mod context;
mod ops;

pub use context::{get_global_context, init_context, CudaContext, CudaContextGuard};
pub use ops::CudaBackend;
