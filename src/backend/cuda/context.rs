// CUDA context management using cust
// Handles device initialization, the stream, and loading the plugin module

use crate::error::Error;
use cust::context::{Context, CurrentContext};
use cust::device::Device;
use cust::function::Function;
use cust::module::Module;
use cust::stream::{Stream, StreamFlags};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Once};

/// PTX for `kernels/plugin.cu`, compiled by the build script.
const PLUGIN_PTX: &str = include_str!(concat!(env!("OUT_DIR"), "/plugin.ptx"));

/// Kernels the plugin module must export.
const PLUGIN_KERNELS: &[&str] = &["plugin_add_kernel"];

// Fields drop in order: kernels before their module, everything before the context.
pub struct CudaContext {
    kernels: HashMap<String, Function<'static>>,
    _module: Arc<Module>,
    stream: Stream,
    device_id: u32,
    pub(crate) _context: Context,
}

impl fmt::Debug for CudaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CudaContext")
            .field("device_id", &self.device_id)
            .field("kernels", &self.kernels.keys().collect::<Vec<_>>())
            .finish()
    }
}

lazy_static! {
    static ref GLOBAL_CUDA_CONTEXT: Mutex<Option<Arc<CudaContext>>> = Mutex::new(None);
    static ref CUDA_INIT: Once = Once::new();
}

impl CudaContext {
    fn new(device_id: u32) -> Result<Self, Error> {
        cust::init(cust::CudaFlags::empty())?;
        let device = Device::get_device(device_id).map_err(|e| Error::CudaError(e.to_string()))?;
        let context = Context::new(device).map_err(|e| Error::CudaError(e.to_string()))?;
        let stream =
            Stream::new(StreamFlags::DEFAULT, None).map_err(|e| Error::CudaError(e.to_string()))?;

        let (module, kernels) = Self::load_plugin_module(&context, PLUGIN_PTX)?;

        debug_println!(
            "[CudaContext] Loaded kernels: {:?}",
            kernels.keys().collect::<Vec<_>>()
        );
        Ok(Self {
            kernels,
            _module: module,
            stream,
            device_id,
            _context: context,
        })
    }

    fn load_plugin_module(
        context: &Context,
        ptx: &str,
    ) -> Result<(Arc<Module>, HashMap<String, Function<'static>>), Error> {
        debug_println!("Loading plugin module ({} bytes of PTX)", ptx.len());
        CurrentContext::set_current(context)?;

        let module = Arc::new(
            Module::from_ptx(ptx, &[])
                .map_err(|e| Error::CudaError(format!("Failed to load plugin module: {}", e)))?,
        );

        let mut kernels = HashMap::new();
        for &kernel_name in PLUGIN_KERNELS {
            let func = module.get_function(kernel_name).map_err(|e| {
                Error::CudaError(format!(
                    "Failed to load kernel '{}' from plugin module: {}",
                    kernel_name, e
                ))
            })?;
            let static_func =
                unsafe { std::mem::transmute::<Function<'_>, Function<'static>>(func) };
            kernels.insert(kernel_name.to_string(), static_func);
        }
        Ok((module, kernels))
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    pub fn get_stream(&self) -> &Stream {
        &self.stream
    }

    pub fn get_kernel(&self, name: &str) -> Option<&Function<'static>> {
        self.kernels.get(name)
    }
}

pub fn init_context(device_id: u32) -> Result<(), Error> {
    CUDA_INIT.call_once(|| {
        let mut global_ctx_guard = match GLOBAL_CUDA_CONTEXT.lock() {
            Ok(guard) => guard,
            Err(_) => {
                eprintln!("FATAL: CUDA context mutex was poisoned during initialization");
                return;
            }
        };

        if global_ctx_guard.is_none() {
            debug_println!("Initializing CUDA context for device {}...", device_id);
            match CudaContext::new(device_id) {
                Ok(context) => {
                    *global_ctx_guard = Some(Arc::new(context));
                }
                Err(e) => {
                    eprintln!("FATAL: Failed to initialize CUDA context: {}", e);
                }
            }
        }
    });

    let final_check_guard = GLOBAL_CUDA_CONTEXT.lock().map_err(|_| {
        Error::InternalLogicError(
            "CUDA context mutex was poisoned after initialization check".to_string(),
        )
    })?;

    if CUDA_INIT.is_completed() && final_check_guard.is_some() {
        Ok(())
    } else {
        Err(Error::CudaError(
            "CUDA context initialization failed or context is not available.".into(),
        ))
    }
}

pub fn get_global_context() -> Result<Arc<CudaContext>, Error> {
    let global_ctx = GLOBAL_CUDA_CONTEXT
        .lock()
        .map_err(|_| Error::InternalLogicError("CUDA context mutex was poisoned".to_string()))?;

    match global_ctx.as_ref() {
        Some(ctx) => Ok(ctx.clone()),
        None => Err(Error::CudaError(
            "CUDA context not initialized. Call init_context first.".into(),
        )),
    }
}

/// Makes the global context current on this thread for as long as the guard lives.
pub struct CudaContextGuard {
    _context_arc: Arc<CudaContext>,
}

impl CudaContextGuard {
    pub fn new() -> Result<Self, Error> {
        let context = get_global_context()?;
        CurrentContext::set_current(&context._context).map_err(|e| {
            Error::InternalLogicError(format!("Failed to set current CUDA context: {}", e))
        })?;
        Ok(CudaContextGuard {
            _context_arc: context,
        })
    }
}
