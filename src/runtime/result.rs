use std::fmt;
use std::os::raw::c_int;

/// Raw NVRTC success code
pub const NVRTC_SUCCESS: c_int = 0;

/// Raw code returned by the stub library and by NVRTC for internal failures
pub const NVRTC_ERROR_INTERNAL_ERROR: c_int = 11;

/// Sentinel returned in place of a native code when the binding itself
/// rejected a call (bad argument or host allocation failure).
pub const JNVRTC_INTERNAL_ERROR: c_int = 0x8000_0001_u32 as c_int;

/// Outcome of a native NVRTC call.
///
/// Every entry point returns one of these; it must be checked before any
/// output written by the call is trusted. Codes this crate does not know
/// about are preserved in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NvrtcResult {
    Success,
    OutOfMemory,
    ProgramCreationFailure,
    InvalidInput,
    InvalidProgram,
    InvalidOption,
    Compilation,
    BuiltinOperationFailure,
    NoNameExpressionsAfterCompilation,
    NoLoweredNamesBeforeCompilation,
    NameExpressionNotValid,
    InternalError,
    Unknown(c_int),
}

impl NvrtcResult {
    pub fn from_raw(raw: c_int) -> Self {
        match raw {
            0 => Self::Success,
            1 => Self::OutOfMemory,
            2 => Self::ProgramCreationFailure,
            3 => Self::InvalidInput,
            4 => Self::InvalidProgram,
            5 => Self::InvalidOption,
            6 => Self::Compilation,
            7 => Self::BuiltinOperationFailure,
            8 => Self::NoNameExpressionsAfterCompilation,
            9 => Self::NoLoweredNamesBeforeCompilation,
            10 => Self::NameExpressionNotValid,
            11 => Self::InternalError,
            other => Self::Unknown(other),
        }
    }

    pub fn as_raw(self) -> c_int {
        match self {
            Self::Success => 0,
            Self::OutOfMemory => 1,
            Self::ProgramCreationFailure => 2,
            Self::InvalidInput => 3,
            Self::InvalidProgram => 4,
            Self::InvalidOption => 5,
            Self::Compilation => 6,
            Self::BuiltinOperationFailure => 7,
            Self::NoNameExpressionsAfterCompilation => 8,
            Self::NoLoweredNamesBeforeCompilation => 9,
            Self::NameExpressionNotValid => 10,
            Self::InternalError => 11,
            Self::Unknown(raw) => raw,
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Canonical `NVRTC_*` identifier, the same text `nvrtcGetErrorString`
    /// produces for known codes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Success => "NVRTC_SUCCESS",
            Self::OutOfMemory => "NVRTC_ERROR_OUT_OF_MEMORY",
            Self::ProgramCreationFailure => "NVRTC_ERROR_PROGRAM_CREATION_FAILURE",
            Self::InvalidInput => "NVRTC_ERROR_INVALID_INPUT",
            Self::InvalidProgram => "NVRTC_ERROR_INVALID_PROGRAM",
            Self::InvalidOption => "NVRTC_ERROR_INVALID_OPTION",
            Self::Compilation => "NVRTC_ERROR_COMPILATION",
            Self::BuiltinOperationFailure => "NVRTC_ERROR_BUILTIN_OPERATION_FAILURE",
            Self::NoNameExpressionsAfterCompilation => {
                "NVRTC_ERROR_NO_NAME_EXPRESSIONS_AFTER_COMPILATION"
            }
            Self::NoLoweredNamesBeforeCompilation => {
                "NVRTC_ERROR_NO_LOWERED_NAMES_BEFORE_COMPILATION"
            }
            Self::NameExpressionNotValid => "NVRTC_ERROR_NAME_EXPRESSION_NOT_VALID",
            Self::InternalError => "NVRTC_ERROR_INTERNAL_ERROR",
            Self::Unknown(_) => "NVRTC_ERROR unknown",
        }
    }
}

impl From<c_int> for NvrtcResult {
    fn from(raw: c_int) -> Self {
        Self::from_raw(raw)
    }
}

impl From<NvrtcResult> for c_int {
    fn from(result: NvrtcResult) -> Self {
        result.as_raw()
    }
}

impl fmt::Display for NvrtcResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "unknown NVRTC result code {}", raw),
            known => write!(f, "{} ({})", known.name(), known.as_raw()),
        }
    }
}
