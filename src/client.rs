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

use std::os::raw::{c_int, c_uint};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, trace};

use crate::buffer::{decode_all, Buffer, BufferList, Landing};
use crate::error::{check, YdbResult};
use crate::ffi::{YDB_ERR_NODEEND, YDB_NODE_END, YDB_OK};
use crate::native::Native;

/// Held for the duration of every native call. The simple API is
/// single-threaded and its state is per process, not per client.
static NATIVE_CALL: Mutex<()> = Mutex::new(());

/// Typed front end over a [`Native`] implementation.
///
/// Each method builds the descriptors for one call, invokes the entry point
/// and maps the status code. Descriptors and landing buffers are dropped
/// before the method returns, whatever the outcome.
#[derive(Clone)]
pub struct Client {
    native: Arc<dyn Native>,
}

impl Client {
    pub fn new(native: Arc<dyn Native>) -> Self {
        Self { native }
    }

    /// Whether the node has a value (1), children (10), both (11) or neither (0).
    pub fn data(&self, varname: &str, subs: &[&str]) -> YdbResult<u32> {
        let mut ret: c_uint = 0;
        let code = self.invoke("data", varname, subs, |native, name, list| {
            native.data(name, list, &mut ret)
        })?;
        check(code)?;
        Ok(ret)
    }

    /// Delete the node value (`YDB_DEL_NODE`) or the whole subtree (`YDB_DEL_TREE`).
    pub fn delete(&self, varname: &str, subs: &[&str], deltype: c_int) -> YdbResult<()> {
        let code = self.invoke("delete", varname, subs, |native, name, list| {
            native.delete(name, list, deltype)
        })?;
        check(code)
    }

    pub fn get(&self, varname: &str, subs: &[&str]) -> YdbResult<String> {
        let mut landing = Landing::value();
        let mut out = landing.buffer();
        let code = self.invoke("get", varname, subs, |native, name, list| {
            native.get(name, list, &mut out)
        })?;
        check(code)?;
        out.decode()
    }

    pub fn set(&self, varname: &str, subs: &[&str], value: &str) -> YdbResult<()> {
        let value = Buffer::new(value)?;
        let code = self.invoke("set", varname, subs, |native, name, list| {
            native.set(name, list, &value)
        })?;
        check(code)
    }

    /// Release one level of a lock taken with [`Client::lock_incr`].
    pub fn lock_decr(&self, varname: &str, subs: &[&str]) -> YdbResult<()> {
        let code = self.invoke("lock_decr", varname, subs, |native, name, list| {
            native.lock_decr(name, list)
        })?;
        check(code)
    }

    /// Take or deepen a lock, waiting up to `timeout` if it is held elsewhere.
    pub fn lock_incr(&self, timeout: Duration, varname: &str, subs: &[&str]) -> YdbResult<()> {
        let timeout_nsec = u64::try_from(timeout.as_nanos()).unwrap_or(u64::MAX);
        let code = self.invoke("lock_incr", varname, subs, |native, name, list| {
            native.lock_incr(timeout_nsec, name, list)
        })?;
        check(code)
    }

    /// The sibling following the last subscript, at the same depth.
    pub fn subscript_next(&self, varname: &str, subs: &[&str]) -> YdbResult<String> {
        let mut landing = Landing::value();
        let mut out = landing.buffer();
        let code = self.invoke("subscript_next", varname, subs, |native, name, list| {
            native.subscript_next(name, list, &mut out)
        })?;
        check(code)?;
        out.decode()
    }

    /// Subscripts of the next node in depth-first order, `None` past the last.
    pub fn node_next(&self, varname: &str, subs: &[&str]) -> YdbResult<Option<Vec<String>>> {
        let mut landing = Landing::subscripts();
        let mut outs = landing.buffers();
        let mut used = outs.len() as c_int;
        let code = self.invoke("node_next", varname, subs, |native, name, list| {
            native.node_next(name, list, &mut used, &mut outs)
        })?;
        if code == YDB_ERR_NODEEND || (code == YDB_OK && used == YDB_NODE_END) {
            trace!(varname, "subscript tree exhausted");
            return Ok(None);
        }
        check(code)?;
        let used = usize::try_from(used).unwrap_or(0).min(outs.len());
        decode_all(&outs[..used]).map(Some)
    }

    /// Describe the global and its subscripts, then run one native call.
    fn invoke<F>(&self, op: &'static str, varname: &str, subs: &[&str], call: F) -> YdbResult<c_int>
    where
        F: FnOnce(&dyn Native, &Buffer<'_>, &[Buffer<'_>]) -> c_int,
    {
        let name = Buffer::new(varname)?;
        let list = BufferList::new(subs)?;
        let code = {
            let _serial = NATIVE_CALL.lock().unwrap_or_else(PoisonError::into_inner);
            trace!(op, varname, subs = list.len(), "calling YottaDB");
            call(self.native.as_ref(), &name, list.as_slice())
        };
        drop(list);
        if code != YDB_OK {
            debug!(op, varname, code, "YottaDB returned an error code");
        }
        Ok(code)
    }
}
