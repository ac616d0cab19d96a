//! One entry point per NVRTC function.
//!
//! Each entry point checks its arguments, marshals them, makes exactly one
//! native call (two for the buffer fetches) and hands back the native
//! result code. `Err` is reserved for failures of the binding itself:
//! a missing required argument, a count that disagrees with its array, an
//! empty output slot, a string that cannot be made NUL-terminated, or a
//! host allocation failure. Argument errors never reach the library.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;

use super::api::{NvrtcApi, RawProgram};
use super::context::Context;
use super::error::{BindingError, BindingResult};
use super::handle::ProgramHandle;
use super::marshal::{
    marshal_counted_array, optional_array_ptr, optional_ptr, NativeString,
};
use super::output::{buffer_to_string, fetch_output, OutputKind};
use super::result::NvrtcResult;

fn required<'a, T: ?Sized, A: NvrtcApi>(
    ctx: &Context<A>,
    value: Option<&'a T>,
    parameter: &'static str,
    operation: &'static str,
) -> BindingResult<&'a T> {
    value.ok_or_else(|| ctx.reject(BindingError::NullArgument { parameter, operation }))
}

fn required_mut<'a, T: ?Sized, A: NvrtcApi>(
    ctx: &Context<A>,
    value: Option<&'a mut T>,
    parameter: &'static str,
    operation: &'static str,
) -> BindingResult<&'a mut T> {
    value.ok_or_else(|| ctx.reject(BindingError::NullArgument { parameter, operation }))
}

/// Output slots must have room for at least one element.
fn first_slot<'a, A: NvrtcApi>(
    ctx: &Context<A>,
    slots: &'a mut [String],
    parameter: &'static str,
    operation: &'static str,
) -> BindingResult<&'a mut String> {
    slots
        .first_mut()
        .ok_or_else(|| ctx.reject(BindingError::EmptyOutputSlot { parameter, operation }))
}

/// Description of `result` from the library, `None` for codes it does not
/// recognise.
pub fn error_string<A: NvrtcApi>(ctx: &Context<A>, result: NvrtcResult) -> Option<String> {
    ctx.trace_call("nvrtcGetErrorString");
    let text = ctx.api().error_string(result.as_raw());
    if text.is_null() {
        None
    } else {
        // Static storage owned by the library
        Some(unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned())
    }
}

/// `nvrtcVersion`. Both outputs are written whatever the result.
pub fn version<A: NvrtcApi>(
    ctx: &Context<A>,
    major: Option<&mut i32>,
    minor: Option<&mut i32>,
) -> BindingResult<NvrtcResult> {
    const OP: &str = "nvrtcVersion";
    let major = required_mut(ctx, major, "major", OP)?;
    let minor = required_mut(ctx, minor, "minor", OP)?;

    ctx.trace_call(OP);
    let mut native_major: c_int = 0;
    let mut native_minor: c_int = 0;
    let result = unsafe { ctx.api().version(&mut native_major, &mut native_minor) };
    *major = native_major;
    *minor = native_minor;
    Ok(ctx.report(OP, NvrtcResult::from_raw(result)))
}

/// `nvrtcCreateProgram`.
///
/// `headers` and `include_names`, when present, must each hold exactly
/// `num_headers` entries. The handle is rewritten with whatever the library
/// stored, including on failure.
pub fn create_program<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&mut ProgramHandle>,
    src: Option<&str>,
    name: Option<&str>,
    num_headers: i32,
    headers: Option<&[&str]>,
    include_names: Option<&[&str]>,
) -> BindingResult<NvrtcResult> {
    const OP: &str = "nvrtcCreateProgram";
    let prog = required_mut(ctx, prog, "prog", OP)?;
    let src = required(ctx, src, "src", OP)?;

    let native_src = NativeString::new(src, "src", OP).map_err(|e| ctx.reject(e))?;
    let native_name = name
        .map(|name| NativeString::new(name, "name", OP))
        .transpose()
        .map_err(|e| ctx.reject(e))?;
    let native_headers = marshal_counted_array(headers, num_headers, "headers", "numHeaders", OP)
        .map_err(|e| ctx.reject(e))?;
    let native_include_names =
        marshal_counted_array(include_names, num_headers, "includeNames", "numHeaders", OP)
            .map_err(|e| ctx.reject(e))?;

    if prog.is_valid() {
        ctx.warn(OP, "handle already holds a live program; it will no longer be reachable");
    }

    ctx.trace_call(OP);
    let mut raw: RawProgram = ptr::null_mut();
    let result = NvrtcResult::from_raw(unsafe {
        ctx.api().create_program(
            &mut raw,
            native_src.as_ptr(),
            optional_ptr(&native_name),
            num_headers as c_int,
            optional_array_ptr(&native_headers),
            optional_array_ptr(&native_include_names),
        )
    });

    prog.write_native(raw, result.is_success());
    if prog.is_valid() {
        prog.record_metadata(src, name);
    }
    Ok(ctx.report(OP, result))
}

/// `nvrtcDestroyProgram`. The handle is rewritten with whatever the library
/// left behind; after success it no longer refers to a live program.
pub fn destroy_program<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&mut ProgramHandle>,
) -> BindingResult<NvrtcResult> {
    const OP: &str = "nvrtcDestroyProgram";
    let prog = required_mut(ctx, prog, "prog", OP)?;

    ctx.trace_call(OP);
    let was_valid = prog.is_valid();
    let mut raw = prog.read_native();
    let result = NvrtcResult::from_raw(unsafe { ctx.api().destroy_program(&mut raw) });

    prog.write_native(raw, was_valid && !result.is_success());
    Ok(ctx.report(OP, result))
}

/// `nvrtcCompileProgram`. `options`, when present, must hold exactly
/// `num_options` entries.
pub fn compile_program<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    num_options: i32,
    options: Option<&[&str]>,
) -> BindingResult<NvrtcResult> {
    const OP: &str = "nvrtcCompileProgram";
    let prog = required(ctx, prog, "prog", OP)?;
    let native_options = marshal_counted_array(options, num_options, "options", "numOptions", OP)
        .map_err(|e| ctx.reject(e))?;

    ctx.trace_call(OP);
    let result = unsafe {
        ctx.api().compile_program(
            prog.read_native(),
            num_options as c_int,
            optional_array_ptr(&native_options),
        )
    };
    Ok(ctx.report(OP, NvrtcResult::from_raw(result)))
}

fn get_output_size<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    size_ret: Option<&mut usize>,
    kind: OutputKind,
    size_parameter: &'static str,
) -> BindingResult<NvrtcResult> {
    let op = kind.size_operation();
    let prog = required(ctx, prog, "prog", op)?;
    let size_ret = required_mut(ctx, size_ret, size_parameter, op)?;

    ctx.trace_call(op);
    let mut native_size = 0usize;
    let result = unsafe { kind.query_size(ctx.api(), prog.read_native(), &mut native_size) };
    *size_ret = native_size;
    Ok(ctx.report(op, result))
}

fn get_output<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    slots: Option<&mut [String]>,
    kind: OutputKind,
) -> BindingResult<NvrtcResult> {
    let op = kind.fetch_operation();
    let prog = required(ctx, prog, "prog", op)?;
    let slots = required_mut(ctx, slots, kind.slot_parameter(), op)?;
    let slot = first_slot(ctx, slots, kind.slot_parameter(), op)?;

    ctx.trace_call(op);
    fetch_output(ctx, prog.read_native(), kind, slot)
}

/// `nvrtcGetPTXSize`: size of the PTX including its terminating NUL.
pub fn get_ptx_size<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    ptx_size_ret: Option<&mut usize>,
) -> BindingResult<NvrtcResult> {
    get_output_size(ctx, prog, ptx_size_ret, OutputKind::Ptx, "ptxSizeRet")
}

/// `nvrtcGetPTX` through the size-then-fetch protocol; the text lands in
/// `ptx[0]`.
pub fn get_ptx<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    ptx: Option<&mut [String]>,
) -> BindingResult<NvrtcResult> {
    get_output(ctx, prog, ptx, OutputKind::Ptx)
}

/// `nvrtcGetProgramLogSize`: size of the log including its terminating NUL.
pub fn get_program_log_size<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    log_size_ret: Option<&mut usize>,
) -> BindingResult<NvrtcResult> {
    get_output_size(ctx, prog, log_size_ret, OutputKind::ProgramLog, "logSizeRet")
}

/// `nvrtcGetProgramLog` through the size-then-fetch protocol; the text
/// lands in `log[0]`. Available after a failed compilation as well.
pub fn get_program_log<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    log: Option<&mut [String]>,
) -> BindingResult<NvrtcResult> {
    get_output(ctx, prog, log, OutputKind::ProgramLog)
}

/// `nvrtcAddNameExpression`. Only accepted by the library before compiling.
pub fn add_name_expression<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    name_expression: Option<&str>,
) -> BindingResult<NvrtcResult> {
    const OP: &str = "nvrtcAddNameExpression";
    let prog = required(ctx, prog, "prog", OP)?;
    let name_expression = required(ctx, name_expression, "name_expression", OP)?;
    let native_expression =
        NativeString::new(name_expression, "name_expression", OP).map_err(|e| ctx.reject(e))?;

    ctx.trace_call(OP);
    let result = unsafe {
        ctx.api()
            .add_name_expression(prog.read_native(), native_expression.as_ptr())
    };
    Ok(ctx.report(OP, NvrtcResult::from_raw(result)))
}

/// `nvrtcGetLoweredName`; the mangled name lands in `lowered_name[0]`.
///
/// The slot is left untouched when the library reports failure or returns
/// no name.
pub fn get_lowered_name<A: NvrtcApi>(
    ctx: &Context<A>,
    prog: Option<&ProgramHandle>,
    name_expression: Option<&str>,
    lowered_name: Option<&mut [String]>,
) -> BindingResult<NvrtcResult> {
    const OP: &str = "nvrtcGetLoweredName";
    let prog = required(ctx, prog, "prog", OP)?;
    let name_expression = required(ctx, name_expression, "name_expression", OP)?;
    let lowered_name = required_mut(ctx, lowered_name, "lowered_name", OP)?;
    let slot = first_slot(ctx, lowered_name, "lowered_name", OP)?;
    let native_expression =
        NativeString::new(name_expression, "name_expression", OP).map_err(|e| ctx.reject(e))?;

    ctx.trace_call(OP);
    let mut native_lowered: *const c_char = ptr::null();
    let result = NvrtcResult::from_raw(unsafe {
        ctx.api().get_lowered_name(
            prog.read_native(),
            native_expression.as_ptr(),
            &mut native_lowered,
        )
    });

    if result.is_success() && !native_lowered.is_null() {
        // Owned by the program; copy it out before anything else can free it
        let bytes = unsafe { CStr::from_ptr(native_lowered) }.to_bytes();
        *slot = buffer_to_string(bytes).map_err(|e| ctx.reject(e))?;
    }
    Ok(ctx.report(OP, result))
}
