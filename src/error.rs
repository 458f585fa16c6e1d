// Copyright 2025 YottaDB Python Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::os::raw::c_int;
use std::str::Utf8Error;

use pyo3::exceptions::{PyException, PyUnicodeDecodeError, PyValueError};
use pyo3::prelude::*;
use thiserror::Error;

use crate::ffi::{YDB_ERR_GVUNDEF, YDB_OK};

pyo3::create_exception!(
    yotta,
    YottaError,
    PyException,
    "Base exception class for the YDB binding."
);

pyo3::create_exception!(
    yotta,
    UndefinedGlobalError,
    YottaError,
    "This indicates that the program attempted to evaluate an undefined global variable."
);

/// Result type for calls into the database.
pub type YdbResult<T> = Result<T, YdbError>;

/// Errors raised by a database call.
#[derive(Debug, Error)]
pub enum YdbError {
    #[error("attempted to evaluate an undefined global variable")]
    UndefinedGlobal,

    /// A return code with no dedicated error yet.
    #[error("unimplemented exception from YottaDB: code {0}")]
    Unmapped(c_int),

    /// Output bytes that are not UTF-8, kept for the Python exception.
    #[error("YottaDB returned invalid UTF-8: {source}")]
    Decode { bytes: Vec<u8>, source: Utf8Error },

    #[error("argument of {len} bytes does not fit a YottaDB buffer")]
    ArgumentTooLong { len: usize },
}

impl YdbError {
    /// The native return code behind this error, if any.
    pub fn code(&self) -> Option<c_int> {
        match self {
            YdbError::UndefinedGlobal => Some(YDB_ERR_GVUNDEF),
            YdbError::Unmapped(code) => Some(*code),
            YdbError::Decode { .. } | YdbError::ArgumentTooLong { .. } => None,
        }
    }
}

/// Return codes with a dedicated error. Anything else becomes `Unmapped`.
const MAPPED_CODES: &[(c_int, fn() -> YdbError)] = &[(YDB_ERR_GVUNDEF, undefined_global)];

fn undefined_global() -> YdbError {
    YdbError::UndefinedGlobal
}

/// Map a native return code to an error.
pub fn from_code(code: c_int) -> YdbError {
    MAPPED_CODES
        .iter()
        .find(|(mapped, _)| *mapped == code)
        .map_or(YdbError::Unmapped(code), |(_, make)| make())
}

/// `Ok` for `YDB_OK`, the mapped error otherwise.
pub fn check(code: c_int) -> YdbResult<()> {
    if code == YDB_OK {
        Ok(())
    } else {
        Err(from_code(code))
    }
}

/// Convert a YdbError into a PyErr.
pub fn to_py(err: YdbError) -> PyErr {
    match err {
        YdbError::UndefinedGlobal => UndefinedGlobalError::new_err(err.to_string()),
        YdbError::Unmapped(_) => YottaError::new_err(err.to_string()),
        YdbError::Decode { bytes, source } => Python::with_gil(|py| {
            match PyUnicodeDecodeError::new_utf8(py, &bytes, source) {
                Ok(exc) => PyErr::from_value(exc.into_any()),
                Err(err) => err,
            }
        }),
        YdbError::ArgumentTooLong { .. } => PyValueError::new_err(err.to_string()),
    }
}

/// Add the exception hierarchy to the module. Any failure aborts the import.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    let exceptions = [
        ("YottaError", py.get_type::<YottaError>()),
        ("UndefinedGlobalError", py.get_type::<UndefinedGlobalError>()),
    ];
    for (name, exception) in exceptions {
        m.add(name, exception)?;
    }
    Ok(())
}
