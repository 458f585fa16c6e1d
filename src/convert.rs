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

use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PySequence, PyString, PyTuple};

/// A global name and its subscripts, checked and kept alive as Python strings.
///
/// The `&str` views handed to the database borrow from these objects, so the
/// key must outlive the native call.
pub struct Key<'py> {
    varname: Bound<'py, PyString>,
    subs: Vec<Bound<'py, PyString>>,
}

impl<'py> Key<'py> {
    pub fn extract(varname: &Bound<'py, PyAny>, subs: &Bound<'py, PyAny>) -> PyResult<Self> {
        Ok(Self {
            varname: py_to_string(varname)?,
            subs: py_to_strings(subs)?,
        })
    }

    pub fn varname(&self) -> PyResult<&str> {
        self.varname.to_str()
    }

    pub fn subs(&self) -> PyResult<Vec<&str>> {
        self.subs.iter().map(|s| s.to_str()).collect()
    }
}

/// Require a `str`.
pub fn py_to_string<'py>(obj: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyString>> {
    match obj.downcast::<PyString>() {
        Ok(s) => Ok(s.clone()),
        Err(_) => Err(type_error(obj, "string")),
    }
}

/// Require a sequence whose items are all `str`.
///
/// Anything implementing the sequence protocol qualifies, registered with
/// `collections.abc.Sequence` or not. Mappings do not.
pub fn py_to_strings<'py>(obj: &Bound<'py, PyAny>) -> PyResult<Vec<Bound<'py, PyString>>> {
    // SAFETY: obj is a live reference held by the Bound.
    if unsafe { pyo3::ffi::PySequence_Check(obj.as_ptr()) } != 1 {
        return Err(type_error(obj, "sequence"));
    }
    // SAFETY: PySequence_Check accepted the object.
    let seq = unsafe { obj.downcast_unchecked::<PySequence>() };
    let len = seq.len()?;
    let mut items = Vec::with_capacity(len);
    for idx in 0..len {
        let item = seq.get_item(idx)?;
        items.push(py_to_string(&item)?);
    }
    Ok(items)
}

/// Build a tuple of `str` from decoded subscripts.
pub fn strings_to_tuple<'py>(py: Python<'py>, items: Vec<String>) -> PyResult<Bound<'py, PyTuple>> {
    PyTuple::new(py, items)
}

fn type_error(obj: &Bound<'_, PyAny>, expected: &str) -> PyErr {
    match obj.get_type().name() {
        Ok(name) => PyTypeError::new_err(format!("'{name}' object is not a {expected}")),
        Err(err) => err,
    }
}
