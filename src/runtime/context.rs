//! Logging configuration passed explicitly to every entry point.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::api::NvrtcApi;
use super::error::BindingError;
use super::ffi::LinkedNvrtc;
use super::result::NvrtcResult;

/// Environment variable read by [`Context::from_env`].
pub const LOG_LEVEL_ENV: &str = "PERDIX_NVRTC_LOG";

/// Verbosity of the binding's own events. Ordered from silent to chattiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    #[default]
    Quiet,
    Error,
    Warning,
    Info,
    Debug,
    Trace,
    DebugTrace,
}

impl LogLevel {
    /// Level named by `PERDIX_NVRTC_LOG`, `Quiet` when unset or unparsable.
    pub fn from_env() -> Self {
        env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level '{0}'")]
pub struct ParseLogLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "off" | "0" => Ok(Self::Quiet),
            "error" | "1" => Ok(Self::Error),
            "warning" | "warn" | "2" => Ok(Self::Warning),
            "info" | "3" => Ok(Self::Info),
            "debug" | "4" => Ok(Self::Debug),
            "trace" | "5" => Ok(Self::Trace),
            "debugtrace" | "debug_trace" | "6" => Ok(Self::DebugTrace),
            _ => Err(ParseLogLevelError(s.to_string())),
        }
    }
}

/// The native library plus the log level for calls made through it.
pub struct Context<A = LinkedNvrtc> {
    api: A,
    log_level: LogLevel,
}

impl Context<LinkedNvrtc> {
    pub fn new() -> Self {
        Self::with_api(LinkedNvrtc)
    }

    /// Linked library with the level taken from `PERDIX_NVRTC_LOG`.
    pub fn from_env() -> Self {
        Self::new().with_log_level(LogLevel::from_env())
    }
}

impl Default for Context<LinkedNvrtc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: NvrtcApi> Context<A> {
    pub fn with_api(api: A) -> Self {
        Self {
            api,
            log_level: LogLevel::Quiet,
        }
    }

    /// Builder form of [`set_log_level`](Self::set_log_level).
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub(crate) fn trace_call(&self, operation: &'static str) {
        if self.log_level >= LogLevel::Trace {
            tracing::trace!(operation, "Executing {}", operation);
        }
    }

    pub(crate) fn report(&self, operation: &'static str, result: NvrtcResult) -> NvrtcResult {
        if !result.is_success() && self.log_level >= LogLevel::Debug {
            tracing::debug!(operation, code = result.as_raw(), "{} returned {}", operation, result);
        }
        result
    }

    pub(crate) fn warn(&self, operation: &'static str, message: &str) {
        if self.log_level >= LogLevel::Warning {
            tracing::warn!(operation, "{}", message);
        }
    }

    pub(crate) fn reject(&self, error: BindingError) -> BindingError {
        if self.log_level >= LogLevel::Warning {
            tracing::warn!(code = error.result_code(), "{}", error);
        }
        error
    }
}

impl<A> fmt::Debug for Context<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("api", &std::any::type_name::<A>())
            .field("log_level", &self.log_level)
            .finish()
    }
}
