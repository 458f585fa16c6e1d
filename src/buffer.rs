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

//! Buffer descriptors handed to the simple API.
//!
//! Input descriptors borrow the caller's string data and never copy it.
//! Output descriptors point into a [`Landing`] area owned by the call.
//! Every heap allocation here lives exactly as long as the value that owns
//! it, so a call releases its buffers on every return path.

use std::marker::PhantomData;
use std::os::raw::{c_char, c_int, c_uint};
use std::{ptr, slice, str};

use tracing::trace;

use crate::error::{YdbError, YdbResult};
use crate::ffi::{ydb_buffer_t, YDB_MAX_STR, YDB_MAX_SUBS};

/// Read-only descriptor over borrowed bytes.
#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct Buffer<'a> {
    raw: ydb_buffer_t,
    _data: PhantomData<&'a [u8]>,
}

impl<'a> Buffer<'a> {
    /// Describe a string's UTF-8 bytes.
    pub fn new(text: &'a str) -> YdbResult<Self> {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(data: &'a [u8]) -> YdbResult<Self> {
        let len = c_uint::try_from(data.len())
            .map_err(|_| YdbError::ArgumentTooLong { len: data.len() })?;
        Ok(Self {
            raw: ydb_buffer_t {
                len_alloc: len,
                len_used: len,
                // The API never writes through input descriptors.
                buf_addr: data.as_ptr() as *mut c_char,
            },
            _data: PhantomData,
        })
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        // SAFETY: built from a slice borrowed for 'a with exactly this length.
        unsafe { slice::from_raw_parts(self.raw.buf_addr as *const u8, self.raw.len_used as usize) }
    }

    pub fn as_ptr(&self) -> *const ydb_buffer_t {
        &self.raw
    }
}

/// The subscript array of one call.
///
/// Owns the descriptor array; the strings stay owned by the caller.
pub struct BufferList<'a> {
    buffers: Vec<Buffer<'a>>,
}

impl<'a> BufferList<'a> {
    /// Describe every item. A failing item drops the partial array.
    pub fn new(items: &[&'a str]) -> YdbResult<Self> {
        let mut list = Self {
            buffers: Vec::with_capacity(items.len()),
        };
        track::acquired();
        for item in items {
            list.buffers.push(Buffer::new(item)?);
        }
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn as_slice(&self) -> &[Buffer<'a>] {
        &self.buffers
    }
}

impl Drop for BufferList<'_> {
    fn drop(&mut self) {
        trace!(count = self.buffers.len(), "releasing buffer list");
        track::released();
    }
}

/// Count and base pointer of a descriptor slice, as the C API takes them.
pub fn raw_parts(buffers: &[Buffer<'_>]) -> (c_int, *const ydb_buffer_t) {
    if buffers.is_empty() {
        return (0, ptr::null());
    }
    (buffers.len() as c_int, buffers.as_ptr().cast())
}

/// Writable descriptor the database fills in.
#[repr(transparent)]
pub struct OutBuffer<'a> {
    raw: ydb_buffer_t,
    _data: PhantomData<&'a mut [u8]>,
}

impl<'a> OutBuffer<'a> {
    pub fn new(storage: &'a mut [u8]) -> Self {
        let len_alloc = c_uint::try_from(storage.len()).unwrap_or(c_uint::MAX);
        Self {
            raw: ydb_buffer_t {
                len_alloc,
                len_used: 0,
                buf_addr: storage.as_mut_ptr().cast(),
            },
            _data: PhantomData,
        }
    }

    pub fn capacity(&self) -> usize {
        self.raw.len_alloc as usize
    }

    /// Length the database reported, which can exceed the capacity when the
    /// value did not fit.
    pub fn len_used(&self) -> usize {
        self.raw.len_used as usize
    }

    /// Copy `bytes` in the way the database does.
    ///
    /// Returns `false` and records the needed length when they do not fit.
    pub fn write(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.capacity() {
            self.raw.len_used = c_uint::try_from(bytes.len()).unwrap_or(c_uint::MAX);
            return false;
        }
        // SAFETY: buf_addr points at `capacity` writable bytes borrowed for 'a.
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.raw.buf_addr.cast::<u8>(), bytes.len());
        }
        self.raw.len_used = bytes.len() as c_uint;
        true
    }

    pub fn as_bytes(&self) -> &[u8] {
        let len = self.len_used().min(self.capacity());
        // SAFETY: storage is borrowed for 'a and len never exceeds len_alloc.
        unsafe { slice::from_raw_parts(self.raw.buf_addr as *const u8, len) }
    }

    pub fn decode(&self) -> YdbResult<String> {
        let bytes = self.as_bytes();
        match str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_owned()),
            Err(source) => Err(YdbError::Decode {
                bytes: bytes.to_vec(),
                source,
            }),
        }
    }

    pub fn as_mut_ptr(&mut self) -> *mut ydb_buffer_t {
        &mut self.raw
    }
}

/// Decode a run of output descriptors, all or nothing.
pub fn decode_all(buffers: &[OutBuffer<'_>]) -> YdbResult<Vec<String>> {
    buffers.iter().map(OutBuffer::decode).collect()
}

/// Heap area backing the output descriptors of one call.
pub struct Landing {
    storage: Vec<u8>,
    slot: usize,
}

impl Landing {
    fn new(slots: usize, slot: usize) -> Self {
        track::acquired();
        Self {
            storage: vec![0; slots * slot],
            slot,
        }
    }

    /// One value of up to `YDB_MAX_STR` bytes.
    pub fn value() -> Self {
        Self::new(1, YDB_MAX_STR)
    }

    /// A full subscript array: `YDB_MAX_SUBS` slots of `YDB_MAX_STR` bytes.
    pub fn subscripts() -> Self {
        Self::new(YDB_MAX_SUBS, YDB_MAX_STR)
    }

    pub fn buffer(&mut self) -> OutBuffer<'_> {
        OutBuffer::new(&mut self.storage[..self.slot])
    }

    pub fn buffers(&mut self) -> Vec<OutBuffer<'_>> {
        self.storage.chunks_mut(self.slot).map(OutBuffer::new).collect()
    }
}

impl Drop for Landing {
    fn drop(&mut self) {
        trace!(bytes = self.storage.len(), "releasing landing buffers");
        track::released();
    }
}


#[cfg(not(test))]
mod track {
    #[inline(always)]
    pub fn acquired() {}

    #[inline(always)]
    pub fn released() {}
}
