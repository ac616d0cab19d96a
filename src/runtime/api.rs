use std::os::raw::{c_char, c_int, c_void};

/// Raw `nvrtcProgram` as the C library sees it.
pub type RawProgram = *mut c_void;

/// The C ABI of the runtime compiler, one method per exported function.
///
/// [`LinkedNvrtc`](super::ffi::LinkedNvrtc) forwards to the real library.
/// Everything above this trait only marshals arguments and results, so a
/// different implementation can stand in for the library in tests.
///
/// # Safety
///
/// Implementations receive raw pointers exactly as `nvrtc.h` defines them.
/// Callers guarantee that string pointers are NUL-terminated and live for
/// the call, that pointer tables hold `num_*` entries (or are null), and
/// that output buffers are at least as large as the matching size query
/// reported.
pub trait NvrtcApi {
    unsafe fn create_program(
        &self,
        prog: *mut RawProgram,
        src: *const c_char,
        name: *const c_char,
        num_headers: c_int,
        headers: *const *const c_char,
        include_names: *const *const c_char,
    ) -> c_int;

    unsafe fn destroy_program(&self, prog: *mut RawProgram) -> c_int;

    unsafe fn compile_program(
        &self,
        prog: RawProgram,
        num_options: c_int,
        options: *const *const c_char,
    ) -> c_int;

    unsafe fn get_ptx_size(&self, prog: RawProgram, ptx_size: *mut usize) -> c_int;

    unsafe fn get_ptx(&self, prog: RawProgram, ptx: *mut c_char) -> c_int;

    unsafe fn get_program_log_size(&self, prog: RawProgram, log_size: *mut usize) -> c_int;

    unsafe fn get_program_log(&self, prog: RawProgram, log: *mut c_char) -> c_int;

    unsafe fn add_name_expression(&self, prog: RawProgram, name_expression: *const c_char)
        -> c_int;

    unsafe fn get_lowered_name(
        &self,
        prog: RawProgram,
        name_expression: *const c_char,
        lowered_name: *mut *const c_char,
    ) -> c_int;

    unsafe fn version(&self, major: *mut c_int, minor: *mut c_int) -> c_int;

    /// Static description of a result code, or null for codes the library
    /// does not recognise. Never fails.
    fn error_string(&self, result: c_int) -> *const c_char;
}
