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

//! In-memory stand-in for libyottadb.
//!
//! Nodes live in a `BTreeMap` keyed by `[varname, sub1, sub2, ...]`, which
//! gives depth-first order for free. Besides the entry points it counts
//! calls, injects return codes and simulates locks held by another process.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound::{Excluded, Unbounded};
use std::os::raw::{c_int, c_uint};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::buffer::{Buffer, OutBuffer};
use crate::ffi::{
    YDB_DEL_NODE, YDB_DEL_TREE, YDB_ERR_GVUNDEF, YDB_ERR_INVSTRLEN, YDB_ERR_NODEEND,
    YDB_LOCK_TIMEOUT, YDB_NODE_END, YDB_OK,
};
use crate::native::Native;

/// Returned for a deletion type the stub does not know.
pub const PARAM_INVALID: c_int = -151_027_770;

/// Longest wait a contended lock actually sleeps, to keep tests quick.
const MAX_LOCK_WAIT: Duration = Duration::from_millis(100);

type Path = Vec<Vec<u8>>;

#[derive(Default)]
pub struct MemoryNative {
    nodes: Mutex<BTreeMap<Path, Vec<u8>>>,
    locks: Mutex<HashMap<Path, u32>>,
    foreign_locks: Mutex<HashSet<Path>>,
    calls: AtomicUsize,
    fail_with: Mutex<Option<c_int>>,
    end_by_count: AtomicBool,
    last_lock_timeout: Mutex<Option<u64>>,
}

impl MemoryNative {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry-point invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next call return `code` without touching any state.
    pub fn fail_next(&self, code: c_int) {
        *self.fail_with.lock().unwrap() = Some(code);
    }

    /// Report the end of the tree through `ret_subs_used` instead of NODEEND.
    pub fn signal_end_by_count(&self) {
        self.end_by_count.store(true, Ordering::SeqCst);
    }

    /// Pretend another process holds the lock on this node.
    pub fn hold_elsewhere(&self, varname: &str, subs: &[&str]) {
        self.foreign_locks.lock().unwrap().insert(text_path(varname, subs));
    }

    pub fn lock_level(&self, varname: &str, subs: &[&str]) -> u32 {
        let locks = self.locks.lock().unwrap();
        locks.get(&text_path(varname, subs)).copied().unwrap_or(0)
    }

    /// The nanosecond timeout passed to the latest `lock_incr`.
    pub fn last_lock_timeout(&self) -> Option<u64> {
        *self.last_lock_timeout.lock().unwrap()
    }

    /// Store bytes that need not be valid UTF-8.
    pub fn insert_raw(&self, varname: &str, subs: &[&[u8]], value: &[u8]) {
        let mut path = vec![varname.as_bytes().to_vec()];
        path.extend(subs.iter().map(|s| s.to_vec()));
        self.nodes.lock().unwrap().insert(path, value.to_vec());
    }

    fn enter(&self) -> Option<c_int> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fail_with.lock().unwrap().take()
    }
}

fn text_path(varname: &str, subs: &[&str]) -> Path {
    let mut path = vec![varname.as_bytes().to_vec()];
    path.extend(subs.iter().map(|s| s.as_bytes().to_vec()));
    path
}

fn path(varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> Path {
    let mut path = vec![varname.as_bytes().to_vec()];
    path.extend(subs.iter().map(|s| s.as_bytes().to_vec()));
    path
}

fn is_descendant(key: &Path, of: &Path) -> bool {
    key.len() > of.len() && key.starts_with(of)
}

impl Native for MemoryNative {
    fn data(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], ret_value: &mut c_uint) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let nodes = self.nodes.lock().unwrap();
        let target = path(varname, subs);
        let has_value = nodes.contains_key(&target);
        let has_children = nodes
            .range::<Path, _>((Excluded(&target), Unbounded))
            .next()
            .is_some_and(|(key, _)| is_descendant(key, &target));
        *ret_value = c_uint::from(has_value) + 10 * c_uint::from(has_children);
        YDB_OK
    }

    fn delete(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], deltype: c_int) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let mut nodes = self.nodes.lock().unwrap();
        let target = path(varname, subs);
        match deltype {
            YDB_DEL_NODE => {
                nodes.remove(&target);
            }
            YDB_DEL_TREE => nodes.retain(|key, _| !key.starts_with(&target)),
            _ => return PARAM_INVALID,
        }
        YDB_OK
    }

    fn get(
        &self,
        varname: &Buffer<'_>,
        subs: &[Buffer<'_>],
        ret_value: &mut OutBuffer<'_>,
    ) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let nodes = self.nodes.lock().unwrap();
        match nodes.get(&path(varname, subs)) {
            None => YDB_ERR_GVUNDEF,
            Some(value) if ret_value.write(value) => YDB_OK,
            Some(_) => YDB_ERR_INVSTRLEN,
        }
    }

    fn set(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], value: &Buffer<'_>) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let mut nodes = self.nodes.lock().unwrap();
        nodes.insert(path(varname, subs), value.as_bytes().to_vec());
        YDB_OK
    }

    fn lock_decr(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let mut locks = self.locks.lock().unwrap();
        let target = path(varname, subs);
        if let Some(level) = locks.get_mut(&target) {
            *level -= 1;
            if *level == 0 {
                locks.remove(&target);
            }
        }
        YDB_OK
    }

    fn lock_incr(&self, timeout_nsec: u64, varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        *self.last_lock_timeout.lock().unwrap() = Some(timeout_nsec);
        let target = path(varname, subs);
        if self.foreign_locks.lock().unwrap().contains(&target) {
            if timeout_nsec > 0 {
                thread::sleep(Duration::from_nanos(timeout_nsec).min(MAX_LOCK_WAIT));
            }
            return YDB_LOCK_TIMEOUT;
        }
        *self.locks.lock().unwrap().entry(target).or_insert(0) += 1;
        YDB_OK
    }

    fn subscript_next(
        &self,
        varname: &Buffer<'_>,
        subs: &[Buffer<'_>],
        ret_value: &mut OutBuffer<'_>,
    ) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let nodes = self.nodes.lock().unwrap();
        let full = path(varname, subs);
        let depth = full.len() - 1;
        let (parent, current) = (&full[..depth], &full[depth]);
        let next = nodes
            .keys()
            .filter(|key| key.len() > depth && key.starts_with(parent))
            .map(|key| &key[depth])
            .filter(|sub| *sub > current)
            .min();
        match next {
            None => YDB_ERR_NODEEND,
            Some(sub) if ret_value.write(sub) => YDB_OK,
            Some(_) => YDB_ERR_INVSTRLEN,
        }
    }

    fn node_next(
        &self,
        varname: &Buffer<'_>,
        subs: &[Buffer<'_>],
        ret_subs_used: &mut c_int,
        ret_subs: &mut [OutBuffer<'_>],
    ) -> c_int {
        if let Some(code) = self.enter() {
            return code;
        }
        let nodes = self.nodes.lock().unwrap();
        let full = path(varname, subs);
        let next = nodes
            .range::<Path, _>((Excluded(&full), Unbounded))
            .next()
            .map(|(key, _)| key)
            .filter(|key| key[0] == full[0]);
        let Some(key) = next else {
            if self.end_by_count.load(Ordering::SeqCst) {
                *ret_subs_used = YDB_NODE_END;
                return YDB_OK;
            }
            return YDB_ERR_NODEEND;
        };
        let found = &key[1..];
        *ret_subs_used = found.len() as c_int;
        if found.len() > ret_subs.len() {
            return YDB_ERR_INVSTRLEN;
        }
        for (out, sub) in ret_subs.iter_mut().zip(found) {
            if !out.write(sub) {
                return YDB_ERR_INVSTRLEN;
            }
        }
        YDB_OK
    }
}

/// Counts how many calls are inside the library at once.
///
/// Every entry point sleeps briefly so that unserialized callers overlap.
#[derive(Default)]
pub struct OverlapNative {
    inside: AtomicUsize,
    peak: AtomicUsize,
}

impl OverlapNative {
    const STAY: Duration = Duration::from_millis(20);

    /// Most calls seen inside at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) -> c_int {
        let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Self::STAY);
        self.inside.fetch_sub(1, Ordering::SeqCst);
        YDB_OK
    }
}

impl Native for OverlapNative {
    fn data(&self, _: &Buffer<'_>, _: &[Buffer<'_>], ret_value: &mut c_uint) -> c_int {
        *ret_value = 0;
        self.enter()
    }

    fn delete(&self, _: &Buffer<'_>, _: &[Buffer<'_>], _: c_int) -> c_int {
        self.enter()
    }

    fn get(&self, _: &Buffer<'_>, _: &[Buffer<'_>], _: &mut OutBuffer<'_>) -> c_int {
        self.enter()
    }

    fn set(&self, _: &Buffer<'_>, _: &[Buffer<'_>], _: &Buffer<'_>) -> c_int {
        self.enter()
    }

    fn lock_decr(&self, _: &Buffer<'_>, _: &[Buffer<'_>]) -> c_int {
        self.enter()
    }

    fn lock_incr(&self, _: u64, _: &Buffer<'_>, _: &[Buffer<'_>]) -> c_int {
        self.enter()
    }

    fn subscript_next(&self, _: &Buffer<'_>, _: &[Buffer<'_>], _: &mut OutBuffer<'_>) -> c_int {
        self.enter()
    }

    fn node_next(
        &self,
        _: &Buffer<'_>,
        _: &[Buffer<'_>],
        ret_subs_used: &mut c_int,
        _: &mut [OutBuffer<'_>],
    ) -> c_int {
        *ret_subs_used = YDB_NODE_END;
        self.enter()
    }
}
