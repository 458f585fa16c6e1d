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

//! The module-level functions, one per simple API entry point.
//!
//! Each `ydb_*_s` function checks its arguments while holding the GIL,
//! releases the GIL around the native call, and converts the outcome back.
//! [`Client`] lets one native call in at a time, so threads that released
//! the GIL still reach the library one by one.

use std::os::raw::c_int;
use std::sync::OnceLock;
use std::time::Duration;

use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::client::Client;
use crate::convert::{py_to_string, strings_to_tuple, Key};
use crate::error::{to_py, YottaError};

static CLIENT: OnceLock<Client> = OnceLock::new();

/// Set the client the module functions use. Later calls keep the first one.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub fn install(make: impl FnOnce() -> Client) {
    CLIENT.get_or_init(make);
}

fn client() -> PyResult<&'static Client> {
    CLIENT
        .get()
        .ok_or_else(|| YottaError::new_err("YottaDB client is not initialized"))
}

/// Add every function to the module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ydb_data_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_delete_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_delete_excl_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_get_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_incr_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_lock_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_lock_decr_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_lock_incr_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_node_next_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_node_previous_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_set_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_str2zwr_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_subscript_next_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_subscript_previous_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_tp_s, m)?)?;
    m.add_function(wrap_pyfunction!(ydb_zwr2str_s, m)?)?;
    Ok(())
}

/// Get information about YottaDB data.
///
/// Returns 0 (no node), 1 (value), 10 (children) or 11 (value and children).
#[pyfunction]
fn ydb_data_s(
    py: Python<'_>,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<u32> {
    data(py, client()?, varname, subs)
}

/// Delete a value from YottaDB.
///
/// `deltype` is `YDB_DEL_NODE` for the value only, `YDB_DEL_TREE` for the subtree.
#[pyfunction]
fn ydb_delete_s(
    py: Python<'_>,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
    deltype: c_int,
) -> PyResult<()> {
    delete(py, client()?, varname, subs, deltype)
}

/// Get a value from YottaDB.
#[pyfunction]
fn ydb_get_s(py: Python<'_>, varname: &Bound<'_, PyAny>, subs: &Bound<'_, PyAny>) -> PyResult<String> {
    get(py, client()?, varname, subs)
}

/// Set a value into YottaDB.
#[pyfunction]
fn ydb_set_s(
    py: Python<'_>,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
    value: &Bound<'_, PyAny>,
) -> PyResult<()> {
    set(py, client()?, varname, subs, value)
}

/// Unlocks a YottaDB node by one level.
#[pyfunction]
fn ydb_lock_decr_s(
    py: Python<'_>,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<()> {
    lock_decr(py, client()?, varname, subs)
}

/// Locks a YottaDB node, waiting up to `timeout` seconds.
#[pyfunction]
fn ydb_lock_incr_s(
    py: Python<'_>,
    timeout: u64,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<()> {
    lock_incr(py, client()?, timeout, varname, subs)
}

/// Orders on a YottaDB node's subscripts.
#[pyfunction]
fn ydb_subscript_next_s(
    py: Python<'_>,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<String> {
    subscript_next(py, client()?, varname, subs)
}

/// Queries on a YottaDB node's subscripts.
///
/// Returns the subscripts of the next node as a tuple, or None at the end.
#[pyfunction]
fn ydb_node_next_s<'py>(
    py: Python<'py>,
    varname: &Bound<'py, PyAny>,
    subs: &Bound<'py, PyAny>,
) -> PyResult<Option<Bound<'py, PyTuple>>> {
    node_next(py, client()?, varname, subs)
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_delete_excl_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_incr_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_lock_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_node_previous_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_subscript_previous_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_tp_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_str2zwr_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

/// Not implemented; returns NotImplemented.
#[pyfunction]
#[pyo3(signature = (*_args))]
fn ydb_zwr2str_s(py: Python<'_>, _args: &Bound<'_, PyTuple>) -> PyObject {
    py.NotImplemented()
}

fn data(
    py: Python<'_>,
    client: &Client,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<u32> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    py.allow_threads(|| client.data(varname, &subs)).map_err(to_py)
}

fn delete(
    py: Python<'_>,
    client: &Client,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
    deltype: c_int,
) -> PyResult<()> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    py.allow_threads(|| client.delete(varname, &subs, deltype))
        .map_err(to_py)
}

fn get(
    py: Python<'_>,
    client: &Client,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<String> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    py.allow_threads(|| client.get(varname, &subs)).map_err(to_py)
}

fn set(
    py: Python<'_>,
    client: &Client,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
    value: &Bound<'_, PyAny>,
) -> PyResult<()> {
    let key = Key::extract(varname, subs)?;
    let value = py_to_string(value)?;
    let (varname, subs, value) = (key.varname()?, key.subs()?, value.to_str()?);
    py.allow_threads(|| client.set(varname, &subs, value))
        .map_err(to_py)
}

fn lock_decr(
    py: Python<'_>,
    client: &Client,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<()> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    py.allow_threads(|| client.lock_decr(varname, &subs))
        .map_err(to_py)
}

fn lock_incr(
    py: Python<'_>,
    client: &Client,
    timeout: u64,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<()> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    let timeout = Duration::from_secs(timeout);
    py.allow_threads(|| client.lock_incr(timeout, varname, &subs))
        .map_err(to_py)
}

fn subscript_next(
    py: Python<'_>,
    client: &Client,
    varname: &Bound<'_, PyAny>,
    subs: &Bound<'_, PyAny>,
) -> PyResult<String> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    py.allow_threads(|| client.subscript_next(varname, &subs))
        .map_err(to_py)
}

fn node_next<'py>(
    py: Python<'py>,
    client: &Client,
    varname: &Bound<'py, PyAny>,
    subs: &Bound<'py, PyAny>,
) -> PyResult<Option<Bound<'py, PyTuple>>> {
    let key = Key::extract(varname, subs)?;
    let (varname, subs) = (key.varname()?, key.subs()?);
    match py.allow_threads(|| client.node_next(varname, &subs)) {
        Ok(Some(next)) => strings_to_tuple(py, next).map(Some),
        Ok(None) => Ok(None),
        Err(err) => Err(to_py(err)),
    }
}
