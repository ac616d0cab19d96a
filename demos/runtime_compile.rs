/// Example compiling a templated kernel at runtime via NVRTC and printing
/// the PTX plus the mangled kernel names.
use perdix_nvrtc::{CompileOptions, CompilerError, ProgramSource, RuntimeCompiler};
use tracing_subscriber::EnvFilter;

const KERNELS: &str = r#"
#include "math.cuh"

template <typename T>
__global__ void saxpy(T a, const T* x, T* y, int n) {
    int i = blockIdx.x * blockDim.x + threadIdx.x;
    if (i < n) {
        y[i] = fma_op(a, x[i], y[i]);
    }
}
"#;

const MATH_HEADER: &str = r#"
template <typename T>
__device__ T fma_op(T a, T x, T y) { return a * x + y; }
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Perdix NVRTC Runtime Compilation Demo ===\n");

    let compiler = RuntimeCompiler::new().with_options(
        CompileOptions::new()
            .arch("compute_80")
            .fast_math(true)
            .define("BLOCK_SIZE", Some("256")),
    );

    let (major, minor) = compiler.version()?;
    println!("NVRTC version: {}.{}", major, minor);

    let program = ProgramSource::new(KERNELS, "saxpy.cu")
        .header("math.cuh", MATH_HEADER)
        .name_expression("saxpy<float>")
        .name_expression("saxpy<double>");

    match compiler.compile(&program) {
        Ok(compiled) => {
            for (expression, lowered) in &compiled.lowered_names {
                println!("{:<16} -> {}", expression, lowered);
            }
            if !compiled.log.is_empty() {
                println!("\nCompiler log:\n{}", compiled.log);
            }
            println!("\nGenerated PTX ({} bytes):\n{}", compiled.ptx.len(), compiled.ptx);
        }
        Err(CompilerError::CompilationFailed { log }) => {
            eprintln!("Compilation failed:\n{}", log);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
