//! Host strings to NUL-terminated native strings and pointer tables.
//!
//! Every buffer built here is owned by the value returned and released when
//! it goes out of scope, whichever way the surrounding call exits.

use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;

use super::error::{BindingError, BindingResult};

/// Owned NUL-terminated copy of a host string.
#[derive(Debug)]
pub struct NativeString {
    inner: CString,
}

impl NativeString {
    pub fn new(
        value: &str,
        parameter: &'static str,
        operation: &'static str,
    ) -> BindingResult<Self> {
        CString::new(value)
            .map(|inner| Self { inner })
            .map_err(|_| BindingError::InteriorNul { parameter, operation })
    }

    pub fn as_ptr(&self) -> *const c_char {
        self.inner.as_ptr()
    }
}

/// Optional string argument; null when absent.
pub fn optional_ptr(value: &Option<NativeString>) -> *const c_char {
    value.as_ref().map_or(ptr::null(), NativeString::as_ptr)
}

/// Owned array of native strings plus the `const char**` table pointing
/// into it.
#[derive(Debug)]
pub struct NativeStringArray {
    // `pointers` borrows from the heap buffers of `strings`; the CStrings
    // never move their contents, so the table stays valid while both live.
    strings: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl NativeStringArray {
    pub fn new(
        values: &[&str],
        parameter: &'static str,
        operation: &'static str,
    ) -> BindingResult<Self> {
        let strings = values
            .iter()
            .map(|value| CString::new(*value))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BindingError::InteriorNul { parameter, operation })?;
        let pointers = strings.iter().map(|s| s.as_ptr()).collect();
        Ok(Self { strings, pointers })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Count in the form the C ABI expects.
    pub fn count(&self) -> c_int {
        self.strings.len() as c_int
    }

    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }
}

/// Optional array argument; null when absent.
pub fn optional_array_ptr(value: &Option<NativeStringArray>) -> *const *const c_char {
    value.as_ref().map_or(ptr::null(), NativeStringArray::as_ptr)
}

/// Fails unless `array` holds exactly `count` entries.
pub fn check_array_len(
    parameter: &'static str,
    count_parameter: &'static str,
    count: c_int,
    array: &[&str],
) -> BindingResult<()> {
    let matches = usize::try_from(count).map_or(false, |expected| expected == array.len());
    if matches {
        Ok(())
    } else {
        Err(BindingError::LengthMismatch {
            parameter,
            count_parameter,
            expected: count,
            actual: array.len(),
        })
    }
}

/// Validates and converts an optional array argument against its count.
pub fn marshal_counted_array(
    values: Option<&[&str]>,
    count: c_int,
    parameter: &'static str,
    count_parameter: &'static str,
    operation: &'static str,
) -> BindingResult<Option<NativeStringArray>> {
    match values {
        Some(values) => {
            check_array_len(parameter, count_parameter, count, values)?;
            NativeStringArray::new(values, parameter, operation).map(Some)
        }
        None => Ok(None),
    }
}
