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

pub mod buffer;
pub mod client;
mod convert;
pub mod error;
pub mod ffi;
mod functions;
pub mod native;
#[cfg(test)]
mod testing;

use pyo3::prelude::*;

/// Python bindings for the YottaDB simple API.
#[pymodule]
fn yotta(m: &Bound<'_, PyModule>) -> PyResult<()> {
    error::register(m)?;
    functions::register(m)?;
    m.add("YDB_DEL_TREE", ffi::YDB_DEL_TREE)?;
    m.add("YDB_DEL_NODE", ffi::YDB_DEL_NODE)?;
    m.add("YDB_MAX_STR", ffi::YDB_MAX_STR)?;
    m.add("YDB_MAX_SUBS", ffi::YDB_MAX_SUBS)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    connect()
}

#[cfg(feature = "native")]
fn connect() -> PyResult<()> {
    use std::sync::Arc;

    functions::install(|| client::Client::new(Arc::new(native::YdbNative)));
    Ok(())
}

#[cfg(not(feature = "native"))]
fn connect() -> PyResult<()> {
    Err(pyo3::exceptions::PyImportError::new_err(
        "yotta was built without libyottadb; rebuild with the `native` feature",
    ))
}
