//! # Perdix NVRTC - Runtime Compilation Bindings
//!
//! Host-side bindings for NVIDIA's NVRTC runtime compiler. The crate turns
//! Rust strings, string arrays and program handles into the C calling
//! convention of `libnvrtc`, calls it, and turns result codes, PTX, logs and
//! lowered names back into Rust values.
//!
//! ## Key Features
//!
//! - **One Entry Point per NVRTC Call**: [`runtime::bindings`] mirrors the C API
//! - **Checked Arguments**: missing arguments, count/array mismatches and empty
//!   output slots are rejected before the library is called
//! - **Size-Then-Fetch Outputs**: PTX and logs copied into exactly-sized buffers
//! - **Scoped Native Memory**: every marshaled string is freed on every exit path
//! - **Injected Logging**: a [`Context`] carries the log level, no globals
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use perdix_nvrtc::runtime::bindings::{
//!     compile_program, create_program, destroy_program, get_ptx,
//! };
//! use perdix_nvrtc::{Context, NvrtcResult, ProgramHandle};
//!
//! let ctx = Context::new();
//! let mut prog = ProgramHandle::new();
//!
//! let src = "extern \"C\" __global__ void noop() {}";
//! let result = create_program(&ctx, Some(&mut prog), Some(src), Some("noop.cu"), 0, None, None)?;
//! assert_eq!(result, NvrtcResult::Success);
//!
//! if compile_program(&ctx, Some(&prog), 0, None)?.is_success() {
//!     let mut ptx = [String::new()];
//!     get_ptx(&ctx, Some(&prog), Some(&mut ptx[..]))?;
//!     println!("{}", ptx[0]);
//! }
//!
//! destroy_program(&ctx, Some(&mut prog))?;
//! # Ok::<(), perdix_nvrtc::BindingError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cuda`: link `libnvrtc` (found through `CUDA_PATH`). Without it every
//!   native call reports `NVRTC_ERROR_INTERNAL_ERROR`.
//!
//! ## Configuration
//!
//! - `CUDA_PATH`: CUDA toolkit root used by the build script
//! - `PERDIX_NVRTC_LOG`: default [`LogLevel`] for [`Context::from_env`]

pub mod runtime;

// Re-export key types
pub use runtime::{
    BindingError, CompileOptions, CompiledProgram, CompilerError, Context, LinkedNvrtc, LogLevel,
    NvrtcApi, NvrtcResult, ProgramHandle, ProgramSource, RuntimeCompiler,
};
