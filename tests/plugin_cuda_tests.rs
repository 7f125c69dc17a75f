#![cfg(feature = "cuda")]

use approx::assert_relative_eq;
use plugin_ops::backend::cuda::{get_global_context, init_context, CudaBackend, CudaContextGuard};
use plugin_ops::operators::plugin::PLUGIN_ADD;
use plugin_ops::{
    dispatch, global_registry, Error, Instruction, KernelContext, OpDesc, Place, Scope, Tensor,
    TensorData,
};
use serial_test::serial;

fn cuda_ctx() -> Result<KernelContext, Error> {
    init_context(0)?;
    Ok(KernelContext::Cuda(get_global_context()?))
}

#[serial]
#[test]
fn test_cuda_dispatch_adds() -> Result<(), Error> {
    let ctx = cuda_ctx()?;
    let _guard = CudaContextGuard::new()?;
    let KernelContext::Cuda(cuda) = &ctx else {
        panic!("expected a CUDA context");
    };

    let n = 1000;
    let x = TensorData::F32((0..n).map(|i| i as f32).collect());
    let y = TensorData::F32((0..n).map(|i| 0.5 * i as f32).collect());
    let mut out = TensorData::F32(vec![0.0; n]);
    dispatch::<CudaBackend>(cuda, &x, &y, &mut out, n)?;

    let TensorData::F32(z) = out else {
        panic!("output changed type");
    };
    for (i, v) in z.iter().enumerate() {
        assert_relative_eq!(*v, 1.5 * i as f32, epsilon = 1e-4);
    }
    Ok(())
}

#[serial]
#[test]
fn test_cuda_context_needs_no_build_env() -> Result<(), Error> {
    std::env::remove_var("OUT_DIR");
    init_context(0)?;
    let ctx = get_global_context()?;
    assert!(ctx.get_kernel("plugin_add_kernel").is_some());
    Ok(())
}

#[serial]
#[test]
fn test_cuda_instruction() -> Result<(), Error> {
    let ctx = cuda_ctx()?;
    let _guard = CudaContextGuard::new()?;

    let mut scope = Scope::new();
    scope.insert("x", Tensor::from_f32(vec![1.0, 2.0, 3.0, 4.0], &[2, 2])?);
    scope.insert("y", Tensor::from_f32(vec![10.0, 20.0], &[2])?);
    let desc = OpDesc::new(PLUGIN_ADD)
        .with_input("X", &["x"])
        .with_input("Y", &["y"])
        .with_output("Out", &["out"])
        .with_attr("axis", -1)
        .with_attr("computesize", 2);

    let mut inst = Instruction::new(global_registry(), &desc, &mut scope, Place::cuda_float())?;
    inst.run(&ctx)?;
    assert_eq!(scope.var("out")?.to_vec_f32()?, vec![11.0, 22.0, 0.0, 0.0]);

    // A host context cannot drive the CUDA kernel
    let host = KernelContext::Host(plugin_ops::backend::cpu::CpuContext);
    assert!(matches!(inst.run(&host), Err(Error::InvalidOperation(_))));
    Ok(())
}
