use std::env;
use std::path::PathBuf;
use std::process::Command;

fn main() {
    if env::var("CARGO_FEATURE_CUDA").is_err() {
        println!("cargo:warning=CUDA feature not enabled, skipping kernel compilation.");
        return;
    }

    println!("cargo:rerun-if-env-changed=CUDA_PATH");
    println!("cargo:warning=CUDA feature enabled, compiling kernels...");

    // Find nvcc - Use `which` crate first for better cross-platform compatibility
    let nvcc_path = match which::which("nvcc") {
        Ok(path) => path,
        Err(_) => {
            if let Ok(cuda_path) = env::var("CUDA_PATH") {
                PathBuf::from(cuda_path).join("bin").join("nvcc")
            } else {
                ["/usr/local/cuda/bin/nvcc", "/opt/cuda/bin/nvcc"]
                    .iter()
                    .map(PathBuf::from)
                    .find(|p| p.exists())
                    .expect("nvcc not found. Ensure CUDA Toolkit is installed and nvcc is in PATH, or set CUDA_PATH.")
            }
        }
    };
    println!("cargo:warning=Using nvcc found at: {:?}", nvcc_path);

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let kernels_to_compile = [("src/backend/cuda/kernels/plugin.cu", "plugin.ptx")];

    for (src_path, ptx_filename) in kernels_to_compile {
        let ptx_path = out_dir.join(ptx_filename);
        println!(
            "cargo:warning=Compiling {} to {}",
            src_path,
            ptx_path.display()
        );

        let status = Command::new(&nvcc_path)
            .arg("--ptx")
            .arg("-O3")
            .arg("-o")
            .arg(&ptx_path)
            .arg(src_path)
            .status()
            .unwrap_or_else(|e| panic!("Failed to execute nvcc for {}: {}", src_path, e));

        if !status.success() {
            panic!("nvcc failed to compile {}", src_path);
        }
        println!("cargo:rerun-if-changed={}", src_path);
    }
}
