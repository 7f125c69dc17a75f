use plugin_ops::backend::cpu::CpuBackend;
use plugin_ops::operators::plugin::PLUGIN_ADD;
use plugin_ops::registry::KernelEntry;
use plugin_ops::{
    global_registry, DataLayout, DataType, Error, Instruction, OpDesc, OpRegistry, Place,
    PluginCompute, PluginOp, Precision, Scope, Target, Tensor,
};

#[test]
fn test_builtins_register_plugin_add() {
    let registry = OpRegistry::with_builtins();
    assert!(registry.has_op(PLUGIN_ADD));
    assert_eq!(registry.op_names(), vec![PLUGIN_ADD]);
    assert!(registry.kernel_places(PLUGIN_ADD).contains(&Place::host_float()));
    assert!(registry.create_op(PLUGIN_ADD).is_ok());
    assert!(registry.create_kernel(PLUGIN_ADD, Place::host_float()).is_ok());
}

#[test]
fn test_global_registry_matches_builtins() {
    let global = global_registry();
    assert!(global.has_op(PLUGIN_ADD));
    assert_eq!(
        global.kernel_places(PLUGIN_ADD),
        OpRegistry::with_builtins().kernel_places(PLUGIN_ADD)
    );
}

#[test]
fn test_unknown_operator() {
    let registry = OpRegistry::with_builtins();
    assert!(matches!(
        registry.create_op("elementwise_mul"),
        Err(Error::UnknownOperator(name)) if name == "elementwise_mul"
    ));
    assert!(matches!(
        registry.create_kernel("elementwise_mul", Place::host_float()),
        Err(Error::UnknownOperator(_))
    ));
}

#[test]
fn test_no_kernel_for_place() {
    let registry = OpRegistry::with_builtins();
    let fp16 = Place::new(Target::Host, Precision::Fp16, DataLayout::Nchw);
    match registry.create_kernel(PLUGIN_ADD, fp16) {
        Err(Error::NoKernelForPlace { op, place }) => {
            assert_eq!(op, PLUGIN_ADD);
            assert_eq!(place, fp16);
        }
        other => panic!("expected NoKernelForPlace, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_duplicate_registration() {
    let mut registry = OpRegistry::with_builtins();
    assert!(matches!(
        registry.register_op(PLUGIN_ADD, || Box::new(PluginOp::new())),
        Err(Error::DuplicateRegistration(_))
    ));
    let entry = KernelEntry::new(Place::host_float(), "def", || {
        Box::new(PluginCompute::<CpuBackend>::new())
    });
    assert!(matches!(
        registry.register_kernel(PLUGIN_ADD, entry),
        Err(Error::DuplicateRegistration(_))
    ));

    // Another alias on the same place is allowed
    let alias = KernelEntry::new(Place::host_float(), "alt", || {
        Box::new(PluginCompute::<CpuBackend>::new())
    });
    assert!(registry.register_kernel(PLUGIN_ADD, alias).is_ok());
    assert_eq!(registry.kernel_entries(PLUGIN_ADD).len(), 2 + cfg!(feature = "cuda") as usize);
}

#[test]
fn test_custom_registration() -> Result<(), Error> {
    let mut registry = OpRegistry::new();
    assert!(!registry.has_op("my_add"));
    registry.register_op("my_add", || Box::new(PluginOp::new()))?;
    let any = Place::new(Target::Host, Precision::Any, DataLayout::Any);
    registry.register_kernel(
        "my_add",
        KernelEntry::new(any, "def", || Box::new(PluginCompute::<CpuBackend>::new()))
            .bind_input("X", Target::Host)
            .bind_output("Out", Target::Host),
    )?;
    assert_eq!(registry.kernel_places("my_add"), vec![any]);
    assert_eq!(registry.kernel_entries("my_add")[0].bindings.len(), 2);
    assert!(registry.create_kernel("my_add", any).is_ok());
    Ok(())
}

#[test]
fn test_any_precision_serves_concrete_place() -> Result<(), Error> {
    let mut registry = OpRegistry::new();
    registry.register_op("my_add", || Box::new(PluginOp::new()))?;
    let any = Place::new(Target::Host, Precision::Any, DataLayout::Any);
    registry.register_kernel(
        "my_add",
        KernelEntry::new(any, "any", || Box::new(PluginCompute::<CpuBackend>::new())),
    )?;
    assert!(any.accepts(Place::host_float()));
    assert!(!Place::host_float().accepts(any));
    assert_eq!(registry.kernel_entry("my_add", Place::host_float())?.alias, "any");

    // An exact place wins over an `Any` entry registered before it
    registry.register_kernel(
        "my_add",
        KernelEntry::new(Place::host_float(), "exact", || {
            Box::new(PluginCompute::<CpuBackend>::new())
        }),
    )?;
    assert_eq!(registry.kernel_entry("my_add", Place::host_float())?.alias, "exact");
    Ok(())
}

#[test]
fn test_precision_of_data_type() {
    assert_eq!(Precision::from(DataType::Float32), Precision::Float);
    assert_eq!(Precision::from(DataType::Float16), Precision::Fp16);
    assert_eq!(Precision::from(DataType::Int32), Precision::Int32);
    assert_eq!(Precision::from(DataType::Int64), Precision::Int64);
}

#[test]
fn test_instruction_checks_bound_arguments() -> Result<(), Error> {
    let mut registry = OpRegistry::new();
    registry.register_op(PLUGIN_ADD, || Box::new(PluginOp::new()))?;
    registry.register_kernel(
        PLUGIN_ADD,
        KernelEntry::new(Place::host_float(), "def", || {
            Box::new(PluginCompute::<CpuBackend>::new())
        })
        .bind_input("X", Target::Host)
        .bind_input("Bias", Target::Host),
    )?;

    let mut scope = Scope::new();
    scope.insert("x", Tensor::from_f32(vec![1.0], &[1])?);
    scope.insert("y", Tensor::from_f32(vec![1.0], &[1])?);
    let desc = OpDesc::new(PLUGIN_ADD)
        .with_input("X", &["x"])
        .with_input("Y", &["y"])
        .with_output("Out", &["out"])
        .with_attr("axis", -1)
        .with_attr("computesize", 1);
    match Instruction::new(&registry, &desc, &mut scope, Place::host_float()) {
        Err(Error::MissingArgument { argument, .. }) => assert_eq!(argument, "Bias"),
        other => panic!("expected MissingArgument, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[cfg(feature = "cuda")]
#[test]
fn test_binding_target_must_match_place() {
    let mut registry = OpRegistry::new();
    let entry = KernelEntry::new(Place::host_float(), "def", || {
        Box::new(PluginCompute::<CpuBackend>::new())
    })
    .bind_input("X", Target::Cuda);
    assert!(matches!(
        registry.register_kernel(PLUGIN_ADD, entry),
        Err(Error::InvalidOperation(_))
    ));
}
