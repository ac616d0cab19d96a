//! # Runtime Module - NVRTC Program Marshaling
//!
//! This module binds NVRTC (NVIDIA Runtime Compilation) for host code. It
//! owns no compiler logic: every entry point converts host values into the
//! C calling convention, makes the native call and converts the results
//! back, leaving compilation itself to the library.
//!
//! ## Key Components
//!
//! - **Result Codes**: [`NvrtcResult`], returned by every entry point
//! - **Handle Box**: [`ProgramHandle`] holds the opaque `nvrtcProgram`
//! - **Marshaling**: NUL-terminated strings and pointer tables, freed on scope exit
//! - **Two-Phase Fetch**: size query, exact allocation, fetch (PTX and log)
//! - **Name Expressions**: template instantiations resolved to lowered names
//! - **Compiler**: [`RuntimeCompiler`] for the create/compile/fetch/destroy sequence
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  RuntimeCompiler     │  Scoped create → compile → fetch → destroy
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  bindings::*         │  Argument checks, marshaling, result codes
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  NvrtcApi            │  C ABI seam
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │  libnvrtc            │  Linked with the `cuda` feature
//! └──────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Nothing here locks. Each entry point blocks the calling thread until the
//! library returns. [`ProgramHandle`] is plain data and may move between
//! threads; whether two threads may drive *different* programs at the same
//! time is up to the linked NVRTC, and the same program must never be used
//! from two threads at once.
//!
//! ## Example
//!
//! ```rust,no_run
//! use perdix_nvrtc::runtime::{CompileOptions, ProgramSource, RuntimeCompiler};
//!
//! let compiler = RuntimeCompiler::new()
//!     .with_options(CompileOptions::new().arch("compute_89").fast_math(true));
//!
//! let program = ProgramSource::new(
//!     "template <typename T> __global__ void fill(T* x, T v) { x[threadIdx.x] = v; }",
//!     "fill.cu",
//! )
//! .name_expression("fill<float>");
//!
//! let compiled = compiler.compile(&program)?;
//! println!("{}", compiled.lowered_name("fill<float>").unwrap_or_default());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod bindings;
pub mod context;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod marshal;
pub mod output;
pub mod result;
pub mod runtime_compiler;

#[cfg(test)]
pub(crate) mod fake;

pub use api::{NvrtcApi, RawProgram};
pub use context::{Context, LogLevel, LOG_LEVEL_ENV};
pub use error::{BindingError, BindingResult, CompilerError};
pub use ffi::LinkedNvrtc;
pub use handle::ProgramHandle;
pub use output::OutputKind;
pub use result::{NvrtcResult, JNVRTC_INTERNAL_ERROR};
pub use runtime_compiler::{CompileOptions, CompiledProgram, ProgramSource, RuntimeCompiler};
