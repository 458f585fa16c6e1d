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

//! Raw declarations for the libyottadb simple API.
//!
//! Mirrors `libyottadb.h`, `libydberrors.h` and `libydberrors2.h`.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_uint};

/// Buffer descriptor used by every simple API call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ydb_buffer_t {
    pub len_alloc: c_uint,
    pub len_used: c_uint,
    pub buf_addr: *mut c_char,
}

/// Normal return code.
pub const YDB_OK: c_int = 0;

/// Largest string value the database stores.
pub const YDB_MAX_STR: usize = 1024 * 1024;

/// Largest number of subscripts a node may have.
pub const YDB_MAX_SUBS: usize = 31;

/// `ydb_delete_s` flag: delete the node and its whole subtree.
pub const YDB_DEL_TREE: c_int = 1;

/// `ydb_delete_s` flag: delete only the value at the node.
pub const YDB_DEL_NODE: c_int = 2;

/// Written to `ret_subs_used` by `ydb_node_next_s` when no node follows.
pub const YDB_NODE_END: c_int = -1;

/// Non-error code returned by lock calls that ran out of time.
pub const YDB_LOCK_TIMEOUT: c_int = c_int::MAX - 4;

/// Global variable undefined.
pub const YDB_ERR_GVUNDEF: c_int = -150_372_994;

/// Landing buffer too small for the value.
pub const YDB_ERR_INVSTRLEN: c_int = -150_375_522;

/// No further node or subscript exists.
pub const YDB_ERR_NODEEND: c_int = -151_027_922;

#[cfg(feature = "native")]
extern "C" {
    pub fn ydb_data_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
        ret_value: *mut c_uint,
    ) -> c_int;

    pub fn ydb_delete_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
        deltype: c_int,
    ) -> c_int;

    pub fn ydb_get_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
        ret_value: *mut ydb_buffer_t,
    ) -> c_int;

    pub fn ydb_set_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
        value: *const ydb_buffer_t,
    ) -> c_int;

    pub fn ydb_lock_decr_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
    ) -> c_int;

    pub fn ydb_lock_incr_s(
        timeout_nsec: u64,
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
    ) -> c_int;

    pub fn ydb_subscript_next_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
        ret_value: *mut ydb_buffer_t,
    ) -> c_int;

    pub fn ydb_node_next_s(
        varname: *const ydb_buffer_t,
        subs_used: c_int,
        subsarray: *const ydb_buffer_t,
        ret_subs_used: *mut c_int,
        ret_subsarray: *mut ydb_buffer_t,
    ) -> c_int;
}
