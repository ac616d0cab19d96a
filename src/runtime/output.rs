//! Size-then-fetch retrieval of variable-length program outputs.
//!
//! NVRTC never hands out its internal buffers. The caller asks for a size,
//! allocates exactly that many bytes and lets the library copy into them.
//! PTX and the program log follow the same steps and share this code.

use std::os::raw::c_char;

use super::api::{NvrtcApi, RawProgram};
use super::context::Context;
use super::error::{BindingError, BindingResult};
use super::result::NvrtcResult;

/// Which program output to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Ptx,
    ProgramLog,
}

impl OutputKind {
    pub fn size_operation(self) -> &'static str {
        match self {
            Self::Ptx => "nvrtcGetPTXSize",
            Self::ProgramLog => "nvrtcGetProgramLogSize",
        }
    }

    pub fn fetch_operation(self) -> &'static str {
        match self {
            Self::Ptx => "nvrtcGetPTX",
            Self::ProgramLog => "nvrtcGetProgramLog",
        }
    }

    /// Name of the output-slot parameter in error messages.
    pub fn slot_parameter(self) -> &'static str {
        match self {
            Self::Ptx => "ptx",
            Self::ProgramLog => "log",
        }
    }

    pub(crate) unsafe fn query_size<A: NvrtcApi>(
        self,
        api: &A,
        prog: RawProgram,
        size: *mut usize,
    ) -> NvrtcResult {
        let raw = match self {
            Self::Ptx => api.get_ptx_size(prog, size),
            Self::ProgramLog => api.get_program_log_size(prog, size),
        };
        NvrtcResult::from_raw(raw)
    }

    pub(crate) unsafe fn fetch<A: NvrtcApi>(
        self,
        api: &A,
        prog: RawProgram,
        buffer: *mut c_char,
    ) -> NvrtcResult {
        let raw = match self {
            Self::Ptx => api.get_ptx(prog, buffer),
            Self::ProgramLog => api.get_program_log(prog, buffer),
        };
        NvrtcResult::from_raw(raw)
    }
}

/// Zeroed buffer of exactly `size` bytes, or `OutOfMemory`.
pub fn allocate_exact(size: usize) -> BindingResult<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| BindingError::OutOfMemory { requested: size })?;
    buffer.resize(size, 0);
    Ok(buffer)
}

/// Host string from a filled buffer, stopping at the first NUL and never
/// reading past the end of the buffer.
pub fn buffer_to_string(buffer: &[u8]) -> BindingResult<String> {
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    let text = String::from_utf8_lossy(&buffer[..end]);

    let mut out = String::new();
    out.try_reserve_exact(text.len())
        .map_err(|_| BindingError::OutOfMemory { requested: text.len() })?;
    out.push_str(&text);
    Ok(out)
}

/// Runs the two-phase protocol for `kind` and stores the text in `slot`.
///
/// Returns the size-query code if it failed (nothing is allocated in that
/// case), otherwise the fetch code. The slot is written after any fetch,
/// whatever code the fetch produced.
pub(crate) fn fetch_output<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: RawProgram,
    kind: OutputKind,
    slot: &mut String,
) -> BindingResult<NvrtcResult> {
    let mut size = 0usize;
    let result = unsafe { kind.query_size(ctx.api(), prog, &mut size) };
    if !result.is_success() {
        return Ok(ctx.report(kind.size_operation(), result));
    }

    if size == 0 {
        slot.clear();
        return Ok(result);
    }

    let mut buffer = allocate_exact(size).map_err(|e| ctx.reject(e))?;
    let result = unsafe { kind.fetch(ctx.api(), prog, buffer.as_mut_ptr() as *mut c_char) };
    *slot = buffer_to_string(&buffer).map_err(|e| ctx.reject(e))?;

    Ok(ctx.report(kind.fetch_operation(), result))
}
