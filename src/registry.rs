//! Explicit operator registry.
//!
//! An op name maps to one op factory (shape inference) and any number of
//! kernel factories, each keyed by the [`Place`] it runs on.

use crate::backend::cpu::CpuBackend;
#[cfg(feature = "cuda")]
use crate::backend::cuda::CudaBackend;
use crate::error::Error;
use crate::kernels::{Kernel, PluginCompute};
use crate::op_desc::OpDesc;
use crate::operators::plugin::PLUGIN_ADD;
use crate::operators::{OpLite, PluginOp};
use crate::{Place, Target};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

pub type OpFactory = fn() -> Box<dyn OpLite>;
pub type KernelFactory = fn() -> Box<dyn Kernel>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgDirection {
    Input,
    Output,
}

/// Declared tensor argument of a kernel and the target its data must live on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgBinding {
    pub name: String,
    pub direction: ArgDirection,
    pub target: Target,
}

#[derive(Clone)]
pub struct KernelEntry {
    pub place: Place,
    pub alias: String,
    pub bindings: Vec<ArgBinding>,
    pub create: KernelFactory,
}

impl KernelEntry {
    pub fn new(place: Place, alias: &str, create: KernelFactory) -> Self {
        Self {
            place,
            alias: alias.to_string(),
            bindings: Vec::new(),
            create,
        }
    }

    pub fn bind_input(mut self, name: &str, target: Target) -> Self {
        self.bindings.push(ArgBinding {
            name: name.to_string(),
            direction: ArgDirection::Input,
            target,
        });
        self
    }

    pub fn bind_output(mut self, name: &str, target: Target) -> Self {
        self.bindings.push(ArgBinding {
            name: name.to_string(),
            direction: ArgDirection::Output,
            target,
        });
        self
    }

    pub fn binding(&self, name: &str) -> Option<&ArgBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Checks that `desc` provides an argument for every bound parameter.
    pub fn check_arguments(&self, desc: &OpDesc) -> Result<(), Error> {
        for binding in &self.bindings {
            match binding.direction {
                ArgDirection::Input => desc.input(&binding.name)?,
                ArgDirection::Output => desc.output(&binding.name)?,
            };
        }
        Ok(())
    }
}

impl fmt::Debug for KernelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelEntry")
            .field("place", &self.place)
            .field("alias", &self.alias)
            .field("bindings", &self.bindings)
            .finish()
    }
}

#[derive(Default)]
pub struct OpRegistry {
    ops: HashMap<String, OpFactory>,
    kernels: HashMap<String, Vec<KernelEntry>>,
}

impl OpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `plugin_add` with every kernel enabled at build time.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .ops
            .insert(PLUGIN_ADD.to_string(), || Box::new(PluginOp::new()));
        registry.insert_kernel(
            PLUGIN_ADD,
            plugin_kernel_entry(
                PluginCompute::<CpuBackend>::registered_place(),
                || Box::new(PluginCompute::<CpuBackend>::new()),
            ),
        );
        #[cfg(feature = "cuda")]
        registry.insert_kernel(
            PLUGIN_ADD,
            plugin_kernel_entry(
                PluginCompute::<CudaBackend>::registered_place(),
                || Box::new(PluginCompute::<CudaBackend>::new()),
            ),
        );
        registry
    }

    fn insert_kernel(&mut self, op: &str, entry: KernelEntry) {
        debug_println!("register kernel {} on {} ({})", op, entry.place, entry.alias);
        self.kernels.entry(op.to_string()).or_default().push(entry);
    }

    pub fn register_op(&mut self, name: &str, factory: OpFactory) -> Result<(), Error> {
        if self.ops.contains_key(name) {
            return Err(Error::DuplicateRegistration(format!("op {}", name)));
        }
        debug_println!("register op {}", name);
        self.ops.insert(name.to_string(), factory);
        Ok(())
    }

    pub fn register_kernel(&mut self, op: &str, entry: KernelEntry) -> Result<(), Error> {
        let taken = self.kernels.get(op).is_some_and(|entries| {
            entries
                .iter()
                .any(|e| e.place == entry.place && e.alias == entry.alias)
        });
        if taken {
            return Err(Error::DuplicateRegistration(format!(
                "kernel {} on {} ({})",
                op, entry.place, entry.alias
            )));
        }
        if let Some(b) = entry.bindings.iter().find(|b| b.target != entry.place.target) {
            return Err(Error::InvalidOperation(format!(
                "kernel {} on {} binds {} to {:?}",
                op, entry.place, b.name, b.target
            )));
        }
        self.insert_kernel(op, entry);
        Ok(())
    }

    pub fn has_op(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    pub fn op_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create_op(&self, name: &str) -> Result<Box<dyn OpLite>, Error> {
        self.ops
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| Error::UnknownOperator(name.to_string()))
    }

    pub fn kernel_entries(&self, op: &str) -> &[KernelEntry] {
        self.kernels.get(op).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kernel_places(&self, op: &str) -> Vec<Place> {
        self.kernel_entries(op).iter().map(|e| e.place).collect()
    }

    /// Entry serving `op` on `place`: an exact place match first, then the
    /// first entry whose `Any` precision or layout accepts it.
    pub fn kernel_entry(&self, op: &str, place: Place) -> Result<&KernelEntry, Error> {
        if !self.has_op(op) && !self.kernels.contains_key(op) {
            return Err(Error::UnknownOperator(op.to_string()));
        }
        let entries = self.kernel_entries(op);
        entries
            .iter()
            .find(|e| e.place == place)
            .or_else(|| entries.iter().find(|e| e.place.accepts(place)))
            .ok_or_else(|| Error::NoKernelForPlace {
                op: op.to_string(),
                place,
            })
    }

    pub fn create_kernel(&self, op: &str, place: Place) -> Result<Box<dyn Kernel>, Error> {
        self.kernel_entry(op, place).map(|e| (e.create)())
    }
}

impl fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpRegistry")
            .field("ops", &self.op_names())
            .field("kernels", &self.kernels)
            .finish()
    }
}

fn plugin_kernel_entry(place: Place, create: KernelFactory) -> KernelEntry {
    KernelEntry::new(place, "def", create)
        .bind_input("X", place.target)
        .bind_input("Y", place.target)
        .bind_output("Out", place.target)
}

lazy_static! {
    static ref GLOBAL_REGISTRY: OpRegistry = OpRegistry::with_builtins();
}

/// Process-wide registry of the built-in ops.
pub fn global_registry() -> &'static OpRegistry {
    &GLOBAL_REGISTRY
}
