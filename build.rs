use std::env;
use std::path::PathBuf;

fn default_cuda_path() -> String {
    if cfg!(target_os = "windows") {
        "C:/Program Files/NVIDIA GPU Computing Toolkit/CUDA/v12.9".to_string()
    } else {
        "/usr/local/cuda".to_string()
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CUDA_PATH");

    // Without the cuda feature the crate uses its own stubs and links nothing
    if env::var("CARGO_FEATURE_CUDA").is_err() {
        println!("cargo:warning=Skipping NVRTC linkage (cuda feature not enabled)");
        return;
    }

    let cuda_path = env::var("CUDA_PATH").unwrap_or_else(|_| default_cuda_path());
    let root = PathBuf::from(&cuda_path);

    let candidates = if cfg!(target_os = "windows") {
        vec![root.join("lib").join("x64")]
    } else {
        vec![root.join("lib64"), root.join("lib"), root.join("targets/x86_64-linux/lib")]
    };

    let mut found = false;
    for dir in candidates {
        if dir.exists() {
            println!("cargo:rustc-link-search=native={}", dir.display());
            found = true;
        }
    }

    if !found {
        println!(
            "cargo:warning=No CUDA library directory under {}, relying on the system linker path",
            cuda_path
        );
    }

    println!("cargo:rustc-link-lib=nvrtc");
}
