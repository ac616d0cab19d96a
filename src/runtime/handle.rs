use std::fmt;
use std::ptr;

use super::api::RawProgram;

/// Host-side box around one native `nvrtcProgram`.
///
/// The native reference is a platform-width integer that only means
/// something to the library. It is considered live between a successful
/// create and the matching destroy; outside that window the binding hands
/// the library a null program instead of the stale address.
///
/// A handle is the only owner of its native reference, so it cannot be
/// duplicated; a copy would keep a freed address marked live.
///
/// ```compile_fail
/// use perdix_nvrtc::ProgramHandle;
///
/// let handle = ProgramHandle::new();
/// let copy = handle.clone();
/// ```
#[derive(Default)]
pub struct ProgramHandle {
    native: usize,
    valid: bool,
    source: Option<String>,
    name: Option<String>,
}

impl ProgramHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the native reference currently points at a live program.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The raw native reference. Zero once destroyed.
    pub fn native_value(&self) -> usize {
        self.native
    }

    /// Source text recorded by the last successful create.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Program name recorded by the last successful create.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Pointer to hand to the library; null unless the handle is live.
    pub(crate) fn read_native(&self) -> RawProgram {
        if self.valid {
            self.native as RawProgram
        } else {
            ptr::null_mut()
        }
    }

    /// Stores whatever the library left in its out-parameter.
    pub(crate) fn write_native(&mut self, raw: RawProgram, live: bool) {
        self.native = raw as usize;
        self.valid = live && !raw.is_null();
        if !self.valid {
            self.source = None;
            self.name = None;
        }
    }

    pub(crate) fn record_metadata(&mut self, source: &str, name: Option<&str>) {
        self.source = Some(source.to_string());
        self.name = name.map(str::to_string);
    }
}

impl fmt::Debug for ProgramHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramHandle")
            .field("native", &format_args!("{:#x}", self.native))
            .field("valid", &self.valid)
            .field("name", &self.name)
            .finish()
    }
}
