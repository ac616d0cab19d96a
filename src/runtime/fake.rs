//! In-process stand-in for libnvrtc used by the unit tests.
//!
//! It follows the library's documented contract closely enough to exercise
//! every marshaling path, and records each native call so tests can check
//! that rejected calls never reached the library.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use super::api::{NvrtcApi, RawProgram};
use super::result::NvrtcResult;

const BASE_ADDRESS: usize = 0x1000;

#[derive(Debug, Default)]
struct FakeProgram {
    source: String,
    name: String,
    include_names: Vec<String>,
    expressions: Vec<String>,
    lowered: Vec<(String, CString)>,
    compiled: bool,
    ptx: Option<CString>,
    log: CString,
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: usize,
    programs: HashMap<usize, FakeProgram>,
    calls: Vec<&'static str>,
    fail_next_size_query: Option<NvrtcResult>,
    fail_next_destroy: Option<NvrtcResult>,
    last_reported_size: Option<usize>,
    last_create_seed: Option<usize>,
}

#[derive(Debug, Default)]
pub struct FakeNvrtc {
    state: RefCell<FakeState>,
}

unsafe fn read_str(ptr: *const c_char) -> String {
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

unsafe fn read_table(table: *const *const c_char, count: c_int) -> Vec<String> {
    (0..count as usize).map(|i| read_str(*table.add(i))).collect()
}

fn code(result: NvrtcResult) -> c_int {
    result.as_raw()
}

/// Names declared as `__global__ void <name>`.
fn kernel_names(source: &str) -> Vec<String> {
    source
        .split("__global__")
        .skip(1)
        .filter_map(|rest| {
            let rest = rest.trim_start().strip_prefix("void")?.trim_start();
            let end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_'))?;
            Some(rest[..end].to_string())
        })
        .collect()
}

fn included_files(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| line.trim().strip_prefix("#include \""))
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

fn braces_balanced(source: &str) -> bool {
    let mut depth = 0i64;
    for c in source.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}

/// Itanium-flavoured mangling for `kernel<Args>` expressions.
fn mangle(expression: &str) -> Option<(String, String)> {
    let trimmed = expression.trim().trim_start_matches('&');
    let (base, args) = match trimmed.find('<') {
        Some(open) => (&trimmed[..open], trimmed[open + 1..].trim_end_matches('>')),
        None => (trimmed, ""),
    };
    if base.is_empty() {
        return None;
    }
    let mut mangled = format!("_Z{}{}", base.len(), base);
    if !args.is_empty() {
        mangled.push('I');
        for arg in args.split(',') {
            mangled.push_str(match arg.trim() {
                "float" => "f",
                "double" => "d",
                "int" => "i",
                "unsigned int" => "j",
                other => other,
            });
        }
        mangled.push('E');
    }
    mangled.push_str("vPv");
    Some((base.to_string(), mangled))
}

impl FakeNvrtc {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &'static str) {
        self.state.borrow_mut().calls.push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn last_reported_size(&self) -> Option<usize> {
        self.state.borrow().last_reported_size
    }

    /// The next PTX or log size query fails with `result`.
    pub fn fail_next_size_query(&self, result: NvrtcResult) {
        self.state.borrow_mut().fail_next_size_query = Some(result);
    }

    /// The next destroy fails with `result` and leaves the program alive.
    pub fn fail_next_destroy(&self, result: NvrtcResult) {
        self.state.borrow_mut().fail_next_destroy = Some(result);
    }

    /// Value found in the create out-parameter on the last create call.
    pub fn last_create_seed(&self) -> Option<usize> {
        self.state.borrow().last_create_seed
    }

    /// Creates and compiles `source` directly through the native entry points.
    pub fn create_compiled(&self, source: &str) -> RawProgram {
        let src = CString::new(source).unwrap();
        let mut prog: RawProgram = ptr::null_mut();
        unsafe {
            let result = self.create_program(
                &mut prog,
                src.as_ptr(),
                ptr::null(),
                0,
                ptr::null(),
                ptr::null(),
            );
            assert_eq!(result, 0);
            assert_eq!(self.compile_program(prog, 0, ptr::null()), 0);
        }
        prog
    }

    fn id_of(prog: RawProgram) -> usize {
        (prog as usize).wrapping_sub(BASE_ADDRESS) / 0x10
    }

    fn with_program<R>(
        &self,
        prog: RawProgram,
        f: impl FnOnce(&mut FakeProgram) -> Result<R, NvrtcResult>,
    ) -> Result<R, NvrtcResult> {
        if prog.is_null() {
            return Err(NvrtcResult::InvalidProgram);
        }
        let mut state = self.state.borrow_mut();
        let program = state
            .programs
            .get_mut(&Self::id_of(prog))
            .ok_or(NvrtcResult::InvalidProgram)?;
        f(program)
    }

    fn size_query(&self, prog: RawProgram, out: *mut usize, ptx: bool) -> c_int {
        if let Some(forced) = self.state.borrow_mut().fail_next_size_query.take() {
            return code(forced);
        }
        if out.is_null() {
            return code(NvrtcResult::InvalidInput);
        }
        let size = self.with_program(prog, |program| {
            if ptx {
                program
                    .ptx
                    .as_ref()
                    .map(|p| p.as_bytes_with_nul().len())
                    .ok_or(NvrtcResult::InvalidProgram)
            } else {
                Ok(program.log.as_bytes_with_nul().len())
            }
        });
        match size {
            Ok(size) => {
                unsafe { *out = size };
                self.state.borrow_mut().last_reported_size = Some(size);
                0
            }
            Err(result) => code(result),
        }
    }

    fn copy_out(&self, prog: RawProgram, buffer: *mut c_char, ptx: bool) -> c_int {
        if buffer.is_null() {
            return code(NvrtcResult::InvalidInput);
        }
        let copied = self.with_program(prog, |program| {
            let bytes = if ptx {
                program.ptx.as_ref().ok_or(NvrtcResult::InvalidProgram)?.as_bytes_with_nul()
            } else {
                program.log.as_bytes_with_nul()
            };
            unsafe {
                ptr::copy_nonoverlapping(bytes.as_ptr() as *const c_char, buffer, bytes.len())
            };
            Ok(())
        });
        match copied {
            Ok(()) => 0,
            Err(result) => code(result),
        }
    }

    fn compile(program: &mut FakeProgram, options: &[String]) -> NvrtcResult {
        let mut errors = Vec::new();

        for option in options {
            if !option.starts_with('-') {
                program.log = CString::new(format!("nvrtc: error: invalid option \"{}\"\n", option))
                    .unwrap_or_default();
                return NvrtcResult::InvalidOption;
            }
        }

        let kernels = kernel_names(&program.source);
        if kernels.is_empty() || !braces_balanced(&program.source) {
            errors.push(format!("{}(1): error: expected a declaration", program.name));
        }
        for include in included_files(&program.source) {
            if !program.include_names.contains(&include) {
                errors.push(format!(
                    "{}(1): catastrophic error: cannot open source file \"{}\"",
                    program.name, include
                ));
            }
        }

        let mut lowered = Vec::new();
        for expression in &program.expressions {
            match mangle(expression) {
                Some((base, mangled)) if kernels.contains(&base) => {
                    lowered.push((expression.clone(), CString::new(mangled).unwrap_or_default()));
                }
                _ => errors.push(format!(
                    "{}(1): error: name expression \"{}\" does not name a kernel",
                    program.name, expression
                )),
            }
        }

        if !errors.is_empty() {
            let log = format!(
                "{}\n\n{} errors detected in the compilation of \"{}\".\n",
                errors.join("\n"),
                errors.len(),
                program.name
            );
            program.log = CString::new(log).unwrap_or_default();
            return NvrtcResult::Compilation;
        }

        let arch = options
            .iter()
            .find_map(|o| {
                o.strip_prefix("--gpu-architecture=")
                    .or_else(|| o.strip_prefix("-arch="))
            })
            .unwrap_or("compute_52")
            .replace("compute_", "sm_");
        let mut ptx = format!(
            "//\n// Generated by fake NVRTC\n//\n\n.version 8.4\n.target {}\n.address_size 64\n",
            arch
        );
        for kernel in &kernels {
            let symbol = lowered
                .iter()
                .find(|(expr, _)| mangle(expr).map(|(base, _)| base) == Some(kernel.clone()))
                .map(|(_, m)| m.to_string_lossy().into_owned())
                .unwrap_or_else(|| kernel.clone());
            ptx.push_str(&format!("\n.visible .entry {}()\n{{\n\tret;\n}}\n", symbol));
        }

        program.ptx = Some(CString::new(ptx).unwrap_or_default());
        program.lowered = lowered;
        program.log = CString::default();
        program.compiled = true;
        NvrtcResult::Success
    }
}

static ERROR_STRINGS: [&[u8]; 12] = [
    b"NVRTC_SUCCESS\0",
    b"NVRTC_ERROR_OUT_OF_MEMORY\0",
    b"NVRTC_ERROR_PROGRAM_CREATION_FAILURE\0",
    b"NVRTC_ERROR_INVALID_INPUT\0",
    b"NVRTC_ERROR_INVALID_PROGRAM\0",
    b"NVRTC_ERROR_INVALID_OPTION\0",
    b"NVRTC_ERROR_COMPILATION\0",
    b"NVRTC_ERROR_BUILTIN_OPERATION_FAILURE\0",
    b"NVRTC_ERROR_NO_NAME_EXPRESSIONS_AFTER_COMPILATION\0",
    b"NVRTC_ERROR_NO_LOWERED_NAMES_BEFORE_COMPILATION\0",
    b"NVRTC_ERROR_NAME_EXPRESSION_NOT_VALID\0",
    b"NVRTC_ERROR_INTERNAL_ERROR\0",
];

impl NvrtcApi for FakeNvrtc {
    unsafe fn create_program(
        &self,
        prog: *mut RawProgram,
        src: *const c_char,
        name: *const c_char,
        num_headers: c_int,
        headers: *const *const c_char,
        include_names: *const *const c_char,
    ) -> c_int {
        self.record("nvrtcCreateProgram");
        if !prog.is_null() {
            self.state.borrow_mut().last_create_seed = Some(*prog as usize);
        }
        if prog.is_null() || src.is_null() || num_headers < 0 {
            return code(NvrtcResult::InvalidInput);
        }
        if num_headers > 0 && (headers.is_null() || include_names.is_null()) {
            *prog = ptr::null_mut();
            return code(NvrtcResult::InvalidInput);
        }

        let program = FakeProgram {
            source: read_str(src),
            name: if name.is_null() {
                "default_program".to_string()
            } else {
                read_str(name)
            },
            include_names: if num_headers > 0 {
                read_table(include_names, num_headers)
            } else {
                Vec::new()
            },
            ..Default::default()
        };

        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.programs.insert(id, program);
        *prog = (BASE_ADDRESS + id * 0x10) as RawProgram;
        0
    }

    unsafe fn destroy_program(&self, prog: *mut RawProgram) -> c_int {
        self.record("nvrtcDestroyProgram");
        if prog.is_null() {
            return code(NvrtcResult::InvalidInput);
        }
        if (*prog).is_null() {
            return code(NvrtcResult::InvalidProgram);
        }
        if let Some(forced) = self.state.borrow_mut().fail_next_destroy.take() {
            return code(forced);
        }
        let removed = self.state.borrow_mut().programs.remove(&Self::id_of(*prog));
        match removed {
            Some(_) => {
                *prog = ptr::null_mut();
                0
            }
            None => code(NvrtcResult::InvalidProgram),
        }
    }

    unsafe fn compile_program(
        &self,
        prog: RawProgram,
        num_options: c_int,
        options: *const *const c_char,
    ) -> c_int {
        self.record("nvrtcCompileProgram");
        if num_options < 0 || (num_options > 0 && options.is_null()) {
            return code(NvrtcResult::InvalidInput);
        }
        let options = if num_options > 0 { read_table(options, num_options) } else { Vec::new() };
        match self.with_program(prog, |program| Ok(Self::compile(program, &options))) {
            Ok(result) | Err(result) => code(result),
        }
    }

    unsafe fn get_ptx_size(&self, prog: RawProgram, ptx_size: *mut usize) -> c_int {
        self.record("nvrtcGetPTXSize");
        self.size_query(prog, ptx_size, true)
    }

    unsafe fn get_ptx(&self, prog: RawProgram, ptx: *mut c_char) -> c_int {
        self.record("nvrtcGetPTX");
        self.copy_out(prog, ptx, true)
    }

    unsafe fn get_program_log_size(&self, prog: RawProgram, log_size: *mut usize) -> c_int {
        self.record("nvrtcGetProgramLogSize");
        self.size_query(prog, log_size, false)
    }

    unsafe fn get_program_log(&self, prog: RawProgram, log: *mut c_char) -> c_int {
        self.record("nvrtcGetProgramLog");
        self.copy_out(prog, log, false)
    }

    unsafe fn add_name_expression(
        &self,
        prog: RawProgram,
        name_expression: *const c_char,
    ) -> c_int {
        self.record("nvrtcAddNameExpression");
        if name_expression.is_null() {
            return code(NvrtcResult::InvalidInput);
        }
        let expression = read_str(name_expression);
        let result = self.with_program(prog, |program| {
            if program.compiled {
                return Err(NvrtcResult::NoNameExpressionsAfterCompilation);
            }
            program.expressions.push(expression);
            Ok(())
        });
        match result {
            Ok(()) => 0,
            Err(result) => code(result),
        }
    }

    unsafe fn get_lowered_name(
        &self,
        prog: RawProgram,
        name_expression: *const c_char,
        lowered_name: *mut *const c_char,
    ) -> c_int {
        self.record("nvrtcGetLoweredName");
        if name_expression.is_null() || lowered_name.is_null() {
            return code(NvrtcResult::InvalidInput);
        }
        let expression = read_str(name_expression);
        let found = self.with_program(prog, |program| {
            if !program.compiled {
                return Err(NvrtcResult::NoLoweredNamesBeforeCompilation);
            }
            program
                .lowered
                .iter()
                .find(|(expr, _)| *expr == expression)
                .map(|(_, mangled)| mangled.as_ptr())
                .ok_or(NvrtcResult::NameExpressionNotValid)
        });
        match found {
            Ok(name) => {
                *lowered_name = name;
                0
            }
            Err(result) => code(result),
        }
    }

    unsafe fn version(&self, major: *mut c_int, minor: *mut c_int) -> c_int {
        self.record("nvrtcVersion");
        if major.is_null() || minor.is_null() {
            return code(NvrtcResult::InvalidInput);
        }
        *major = 12;
        *minor = 4;
        0
    }

    fn error_string(&self, result: c_int) -> *const c_char {
        self.record("nvrtcGetErrorString");
        usize::try_from(result)
            .ok()
            .and_then(|i| ERROR_STRINGS.get(i))
            .map_or(ptr::null(), |s| s.as_ptr() as *const c_char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_names() {
        let src = "extern \"C\" __global__ void add(float* a) {}\n\
                   template<typename T> __global__ void scale(T* x) {}";
        assert_eq!(kernel_names(src), vec!["add", "scale"]);
    }

    #[test]
    fn test_mangle_templated_expression() {
        let (base, mangled) = mangle("&scale<float>").unwrap();
        assert_eq!(base, "scale");
        assert_eq!(mangled, "_Z5scaleIfEvPv");
    }
}
