use super::api::NvrtcApi;
use super::bindings;
use super::context::Context;
use super::error::{CompilerError, Result};
use super::ffi::LinkedNvrtc;
use super::handle::ProgramHandle;
use super::result::NvrtcResult;

/// NVRTC command-line options, rendered in the order NVRTC documents them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub gpu_architecture: Option<String>,
    pub relocatable_device_code: bool,
    pub fast_math: bool,
    pub include_paths: Vec<String>,
    pub defines: Vec<(String, Option<String>)>,
    pub extra: Vec<String>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual architecture such as `compute_89`.
    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.gpu_architecture = Some(arch.into());
        self
    }

    pub fn relocatable_device_code(mut self, enabled: bool) -> Self {
        self.relocatable_device_code = enabled;
        self
    }

    pub fn fast_math(mut self, enabled: bool) -> Self {
        self.fast_math = enabled;
        self
    }

    pub fn include_path(mut self, path: impl Into<String>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.defines.push((name.into(), value.map(str::to_string)));
        self
    }

    /// Any flag not covered above, passed through verbatim.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.extra.push(flag.into());
        self
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(arch) = &self.gpu_architecture {
            args.push(format!("--gpu-architecture={}", arch));
        }
        args.push(format!(
            "--relocatable-device-code={}",
            self.relocatable_device_code
        ));
        if self.fast_math {
            args.push("--use_fast_math".to_string());
        }
        for path in &self.include_paths {
            args.push(format!("--include-path={}", path));
        }
        for (name, value) in &self.defines {
            match value {
                Some(value) => args.push(format!("--define-macro={}={}", name, value)),
                None => args.push(format!("--define-macro={}", name)),
            }
        }
        args.extend(self.extra.iter().cloned());
        args
    }
}

/// One translation unit plus the in-memory headers it includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSource {
    pub source: String,
    pub name: String,
    /// `(include name, contents)` pairs.
    pub headers: Vec<(String, String)>,
    /// Template instantiations whose mangled names are wanted back.
    pub name_expressions: Vec<String>,
}

impl ProgramSource {
    pub fn new(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            headers: Vec::new(),
            name_expressions: Vec::new(),
        }
    }

    pub fn header(mut self, include_name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.headers.push((include_name.into(), contents.into()));
        self
    }

    pub fn name_expression(mut self, expression: impl Into<String>) -> Self {
        self.name_expressions.push(expression.into());
        self
    }
}

/// Output of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    pub ptx: String,
    /// Warnings; empty for a clean build.
    pub log: String,
    /// `(name expression, lowered name)` in registration order.
    pub lowered_names: Vec<(String, String)>,
}

impl CompiledProgram {
    pub fn lowered_name(&self, expression: &str) -> Option<&str> {
        self.lowered_names
            .iter()
            .find(|(expr, _)| expr == expression)
            .map(|(_, lowered)| lowered.as_str())
    }
}

/// Destroys the program when compilation leaves scope, on every path.
struct ProgramGuard<'c, A: NvrtcApi> {
    ctx: &'c Context<A>,
    handle: ProgramHandle,
}

impl<A: NvrtcApi> Drop for ProgramGuard<'_, A> {
    fn drop(&mut self) {
        if self.handle.is_valid() {
            if let Ok(result) = bindings::destroy_program(self.ctx, Some(&mut self.handle)) {
                if !result.is_success() {
                    tracing::warn!(%result, "failed to destroy NVRTC program");
                }
            }
        }
    }
}

/// Runtime CUDA compiler using NVRTC
pub struct RuntimeCompiler<A: NvrtcApi = LinkedNvrtc> {
    ctx: Context<A>,
    options: CompileOptions,
}

impl RuntimeCompiler<LinkedNvrtc> {
    pub fn new() -> Self {
        Self::with_context(Context::from_env())
    }
}

impl Default for RuntimeCompiler<LinkedNvrtc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: NvrtcApi> RuntimeCompiler<A> {
    pub fn with_context(ctx: Context<A>) -> Self {
        Self {
            ctx,
            options: CompileOptions::default(),
        }
    }

    /// Options applied to every compilation.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn context(&self) -> &Context<A> {
        &self.ctx
    }

    fn check(&self, operation: &'static str, result: NvrtcResult) -> Result<()> {
        if result.is_success() {
            return Ok(());
        }
        let message = bindings::error_string(&self.ctx, result)
            .unwrap_or_else(|| result.name().to_string());
        Err(CompilerError::Nvrtc {
            operation,
            result,
            message,
        })
    }

    /// Version of the linked NVRTC as `(major, minor)`.
    pub fn version(&self) -> Result<(i32, i32)> {
        let (mut major, mut minor) = (0, 0);
        let result = bindings::version(&self.ctx, Some(&mut major), Some(&mut minor))?;
        self.check("nvrtcVersion", result)?;
        Ok((major, minor))
    }

    /// Compile CUDA source code to PTX with the compiler's options.
    ///
    /// A failed compilation returns [`CompilerError::CompilationFailed`]
    /// carrying the program log.
    pub fn compile(&self, program: &ProgramSource) -> Result<CompiledProgram> {
        self.compile_with(program, &self.options)
    }

    pub fn compile_with(
        &self,
        program: &ProgramSource,
        options: &CompileOptions,
    ) -> Result<CompiledProgram> {
        let headers: Vec<&str> = program.headers.iter().map(|(_, c)| c.as_str()).collect();
        let include_names: Vec<&str> = program.headers.iter().map(|(n, _)| n.as_str()).collect();
        let has_headers = !headers.is_empty();

        let mut guard = ProgramGuard {
            ctx: &self.ctx,
            handle: ProgramHandle::new(),
        };

        // Create program
        let result = bindings::create_program(
            &self.ctx,
            Some(&mut guard.handle),
            Some(program.source.as_str()),
            Some(program.name.as_str()),
            headers.len() as i32,
            has_headers.then_some(headers.as_slice()),
            has_headers.then_some(include_names.as_slice()),
        )?;
        self.check("nvrtcCreateProgram", result)?;

        for expression in &program.name_expressions {
            let result = bindings::add_name_expression(
                &self.ctx,
                Some(&guard.handle),
                Some(expression.as_str()),
            )?;
            self.check("nvrtcAddNameExpression", result)?;
        }

        // Compile
        let args = options.to_args();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let compile_result = bindings::compile_program(
            &self.ctx,
            Some(&guard.handle),
            arg_refs.len() as i32,
            Some(arg_refs.as_slice()),
        )?;

        // Get compilation log
        let mut log = vec![String::new()];
        let result = bindings::get_program_log(
            &self.ctx,
            Some(&guard.handle),
            Some(log.as_mut_slice()),
        )?;
        self.check("nvrtcGetProgramLog", result)?;
        let log = log.swap_remove(0);

        if compile_result == NvrtcResult::Compilation {
            return Err(CompilerError::CompilationFailed { log });
        }
        self.check("nvrtcCompileProgram", compile_result)?;

        // Get PTX
        let mut ptx = vec![String::new()];
        let result = bindings::get_ptx(&self.ctx, Some(&guard.handle), Some(ptx.as_mut_slice()))?;
        self.check("nvrtcGetPTX", result)?;

        let mut lowered_names = Vec::with_capacity(program.name_expressions.len());
        for expression in &program.name_expressions {
            let mut lowered = vec![String::new()];
            let result = bindings::get_lowered_name(
                &self.ctx,
                Some(&guard.handle),
                Some(expression.as_str()),
                Some(lowered.as_mut_slice()),
            )?;
            self.check("nvrtcGetLoweredName", result)?;
            if lowered[0].is_empty() {
                return Err(CompilerError::MissingLoweredName(expression.clone()));
            }
            lowered_names.push((expression.clone(), lowered.swap_remove(0)));
        }

        Ok(CompiledProgram {
            ptx: ptx.swap_remove(0),
            log,
            lowered_names,
        })
    }

    /// Compile a single kernel for `compute_capability` (e.g. `compute_89`)
    /// with relocatable device code off and fast math on.
    pub fn compile_to_ptx(
        &self,
        source: &str,
        kernel_name: &str,
        compute_capability: &str,
    ) -> Result<String> {
        let options = self
            .options
            .clone()
            .arch(compute_capability)
            .relocatable_device_code(false)
            .fast_math(true);
        let program = ProgramSource::new(source, kernel_name);
        self.compile_with(&program, &options).map(|compiled| compiled.ptx)
    }
}
