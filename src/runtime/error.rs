use std::os::raw::c_int;

use thiserror::Error;

use super::result::{NvrtcResult, JNVRTC_INTERNAL_ERROR};

/// Failure raised by the binding itself, before or after the native call.
///
/// Native result codes are never turned into a `BindingError`; they are
/// returned to the caller as [`NvrtcResult`]. Argument errors are raised
/// before the native library is touched, allocation errors after it ran.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Parameter '{parameter}' is null for {operation}")]
    NullArgument {
        parameter: &'static str,
        operation: &'static str,
    },

    #[error("The {parameter} array length must be {count_parameter} ({expected}), got {actual}")]
    LengthMismatch {
        parameter: &'static str,
        count_parameter: &'static str,
        expected: c_int,
        actual: usize,
    },

    #[error("String array {parameter} must at least have length 1")]
    EmptyOutputSlot {
        parameter: &'static str,
        operation: &'static str,
    },

    #[error("Parameter '{parameter}' contains an interior NUL byte for {operation}")]
    InteriorNul {
        parameter: &'static str,
        operation: &'static str,
    },

    #[error("Out of memory while creating result string ({requested} bytes)")]
    OutOfMemory { requested: usize },
}

impl BindingError {
    /// True for errors detected before any native call was made.
    pub fn is_argument_error(&self) -> bool {
        !matches!(self, Self::OutOfMemory { .. })
    }

    /// The sentinel code reported in place of a native result.
    pub fn result_code(&self) -> c_int {
        JNVRTC_INTERNAL_ERROR
    }
}

pub type BindingResult<T> = std::result::Result<T, BindingError>;

/// Errors from the high-level [`RuntimeCompiler`](super::RuntimeCompiler).
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("NVRTC error in {operation}: {message} ({result})")]
    Nvrtc {
        operation: &'static str,
        result: NvrtcResult,
        message: String,
    },

    #[error("Compilation failed:\n{log}")]
    CompilationFailed { log: String },

    #[error("No lowered name for expression '{0}'")]
    MissingLoweredName(String),
}

impl CompilerError {
    /// Native code behind the failure, when there is one.
    pub fn nvrtc_result(&self) -> Option<NvrtcResult> {
        match self {
            Self::Nvrtc { result, .. } => Some(*result),
            Self::CompilationFailed { .. } => Some(NvrtcResult::Compilation),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompilerError>;
