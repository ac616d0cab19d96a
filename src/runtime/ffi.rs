use std::os::raw::{c_char, c_int};

use super::api::{NvrtcApi, RawProgram};

// NVRTC FFI bindings
#[cfg(feature = "cuda")]
#[link(name = "nvrtc")]
extern "C" {
    fn nvrtcCreateProgram(
        prog: *mut RawProgram,
        src: *const c_char,
        name: *const c_char,
        num_headers: c_int,
        headers: *const *const c_char,
        include_names: *const *const c_char,
    ) -> c_int;

    fn nvrtcDestroyProgram(prog: *mut RawProgram) -> c_int;

    fn nvrtcCompileProgram(
        prog: RawProgram,
        num_options: c_int,
        options: *const *const c_char,
    ) -> c_int;

    fn nvrtcGetPTXSize(prog: RawProgram, ptx_size: *mut usize) -> c_int;
    fn nvrtcGetPTX(prog: RawProgram, ptx: *mut c_char) -> c_int;
    fn nvrtcGetProgramLogSize(prog: RawProgram, log_size: *mut usize) -> c_int;
    fn nvrtcGetProgramLog(prog: RawProgram, log: *mut c_char) -> c_int;
    fn nvrtcAddNameExpression(prog: RawProgram, name_expression: *const c_char) -> c_int;
    fn nvrtcGetLoweredName(
        prog: RawProgram,
        name_expression: *const c_char,
        lowered_name: *mut *const c_char,
    ) -> c_int;
    fn nvrtcVersion(major: *mut c_int, minor: *mut c_int) -> c_int;
    fn nvrtcGetErrorString(result: c_int) -> *const c_char;
}

// Stub implementations when CUDA is not available
#[cfg(not(feature = "cuda"))]
#[allow(non_snake_case)]
#[rustfmt::skip]
mod stubs {
    use super::*;
    use crate::runtime::result::NVRTC_ERROR_INTERNAL_ERROR as UNAVAILABLE;

    pub unsafe fn nvrtcCreateProgram(_: *mut RawProgram, _: *const c_char, _: *const c_char, _: c_int, _: *const *const c_char, _: *const *const c_char) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcDestroyProgram(_: *mut RawProgram) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcCompileProgram(_: RawProgram, _: c_int, _: *const *const c_char) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcGetPTXSize(_: RawProgram, _: *mut usize) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcGetPTX(_: RawProgram, _: *mut c_char) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcGetProgramLogSize(_: RawProgram, _: *mut usize) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcGetProgramLog(_: RawProgram, _: *mut c_char) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcAddNameExpression(_: RawProgram, _: *const c_char) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcGetLoweredName(_: RawProgram, _: *const c_char, _: *mut *const c_char) -> c_int { UNAVAILABLE }
    pub unsafe fn nvrtcVersion(_: *mut c_int, _: *mut c_int) -> c_int { UNAVAILABLE }

    pub unsafe fn nvrtcGetErrorString(result: c_int) -> *const c_char {
        let text: &'static [u8] = match result {
            0 => b"NVRTC_SUCCESS\0",
            1 => b"NVRTC_ERROR_OUT_OF_MEMORY\0",
            2 => b"NVRTC_ERROR_PROGRAM_CREATION_FAILURE\0",
            3 => b"NVRTC_ERROR_INVALID_INPUT\0",
            4 => b"NVRTC_ERROR_INVALID_PROGRAM\0",
            5 => b"NVRTC_ERROR_INVALID_OPTION\0",
            6 => b"NVRTC_ERROR_COMPILATION\0",
            7 => b"NVRTC_ERROR_BUILTIN_OPERATION_FAILURE\0",
            8 => b"NVRTC_ERROR_NO_NAME_EXPRESSIONS_AFTER_COMPILATION\0",
            9 => b"NVRTC_ERROR_NO_LOWERED_NAMES_BEFORE_COMPILATION\0",
            10 => b"NVRTC_ERROR_NAME_EXPRESSION_NOT_VALID\0",
            11 => b"NVRTC_ERROR_INTERNAL_ERROR\0",
            _ => return std::ptr::null(),
        };
        text.as_ptr() as *const c_char
    }
}

#[cfg(not(feature = "cuda"))]
use stubs::*;

/// The process-wide NVRTC library.
///
/// With the `cuda` feature this links `libnvrtc`; without it every call
/// except `error_string` reports `NVRTC_ERROR_INTERNAL_ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedNvrtc;

impl NvrtcApi for LinkedNvrtc {
    unsafe fn create_program(
        &self,
        prog: *mut RawProgram,
        src: *const c_char,
        name: *const c_char,
        num_headers: c_int,
        headers: *const *const c_char,
        include_names: *const *const c_char,
    ) -> c_int {
        nvrtcCreateProgram(prog, src, name, num_headers, headers, include_names)
    }

    unsafe fn destroy_program(&self, prog: *mut RawProgram) -> c_int {
        nvrtcDestroyProgram(prog)
    }

    unsafe fn compile_program(
        &self,
        prog: RawProgram,
        num_options: c_int,
        options: *const *const c_char,
    ) -> c_int {
        nvrtcCompileProgram(prog, num_options, options)
    }

    unsafe fn get_ptx_size(&self, prog: RawProgram, ptx_size: *mut usize) -> c_int {
        nvrtcGetPTXSize(prog, ptx_size)
    }

    unsafe fn get_ptx(&self, prog: RawProgram, ptx: *mut c_char) -> c_int {
        nvrtcGetPTX(prog, ptx)
    }

    unsafe fn get_program_log_size(&self, prog: RawProgram, log_size: *mut usize) -> c_int {
        nvrtcGetProgramLogSize(prog, log_size)
    }

    unsafe fn get_program_log(&self, prog: RawProgram, log: *mut c_char) -> c_int {
        nvrtcGetProgramLog(prog, log)
    }

    unsafe fn add_name_expression(
        &self,
        prog: RawProgram,
        name_expression: *const c_char,
    ) -> c_int {
        nvrtcAddNameExpression(prog, name_expression)
    }

    unsafe fn get_lowered_name(
        &self,
        prog: RawProgram,
        name_expression: *const c_char,
        lowered_name: *mut *const c_char,
    ) -> c_int {
        nvrtcGetLoweredName(prog, name_expression, lowered_name)
    }

    unsafe fn version(&self, major: *mut c_int, minor: *mut c_int) -> c_int {
        nvrtcVersion(major, minor)
    }

    fn error_string(&self, result: c_int) -> *const c_char {
        // nvrtcGetErrorString accepts any value and returns static storage
        unsafe { nvrtcGetErrorString(result) }
    }
}
