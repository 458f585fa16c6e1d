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

use crate::buffer::{Buffer, OutBuffer};

/// The simple API entry points, one method per C function.
///
/// Methods take descriptors built by the caller and return the raw status
/// code. Interpreting the code is left to [`crate::client::Client`].
pub trait Native: Send + Sync {
    fn data(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], ret_value: &mut c_uint) -> c_int;

    fn delete(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], deltype: c_int) -> c_int;

    fn get(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], ret_value: &mut OutBuffer<'_>)
        -> c_int;

    fn set(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], value: &Buffer<'_>) -> c_int;

    fn lock_decr(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> c_int;

    /// Blocks for up to `timeout_nsec` while the lock is held elsewhere.
    fn lock_incr(&self, timeout_nsec: u64, varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> c_int;

    fn subscript_next(
        &self,
        varname: &Buffer<'_>,
        subs: &[Buffer<'_>],
        ret_value: &mut OutBuffer<'_>,
    ) -> c_int;

    /// `ret_subs_used` holds the number of landing buffers on entry and the
    /// number filled on return.
    fn node_next(
        &self,
        varname: &Buffer<'_>,
        subs: &[Buffer<'_>],
        ret_subs_used: &mut c_int,
        ret_subs: &mut [OutBuffer<'_>],
    ) -> c_int;
}

#[cfg(feature = "native")]
pub use self::linked::YdbNative;

#[cfg(feature = "native")]
mod linked {
    use std::os::raw::{c_int, c_uint};

    use super::Native;
    use crate::buffer::{raw_parts, Buffer, OutBuffer};
    use crate::ffi;

    /// Calls straight into libyottadb.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct YdbNative;

    // SAFETY (all methods): every descriptor borrows memory that outlives the
    // call, Buffer and OutBuffer are repr(transparent) over ydb_buffer_t, and
    // the library does not retain pointers after returning.
    impl Native for YdbNative {
        fn data(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], ret_value: &mut c_uint) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe { ffi::ydb_data_s(varname.as_ptr(), used, array, ret_value) }
        }

        fn delete(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], deltype: c_int) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe { ffi::ydb_delete_s(varname.as_ptr(), used, array, deltype) }
        }

        fn get(
            &self,
            varname: &Buffer<'_>,
            subs: &[Buffer<'_>],
            ret_value: &mut OutBuffer<'_>,
        ) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe { ffi::ydb_get_s(varname.as_ptr(), used, array, ret_value.as_mut_ptr()) }
        }

        fn set(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>], value: &Buffer<'_>) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe { ffi::ydb_set_s(varname.as_ptr(), used, array, value.as_ptr()) }
        }

        fn lock_decr(&self, varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe { ffi::ydb_lock_decr_s(varname.as_ptr(), used, array) }
        }

        fn lock_incr(&self, timeout_nsec: u64, varname: &Buffer<'_>, subs: &[Buffer<'_>]) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe { ffi::ydb_lock_incr_s(timeout_nsec, varname.as_ptr(), used, array) }
        }

        fn subscript_next(
            &self,
            varname: &Buffer<'_>,
            subs: &[Buffer<'_>],
            ret_value: &mut OutBuffer<'_>,
        ) -> c_int {
            let (used, array) = raw_parts(subs);
            unsafe {
                ffi::ydb_subscript_next_s(varname.as_ptr(), used, array, ret_value.as_mut_ptr())
            }
        }

        fn node_next(
            &self,
            varname: &Buffer<'_>,
            subs: &[Buffer<'_>],
            ret_subs_used: &mut c_int,
            ret_subs: &mut [OutBuffer<'_>],
        ) -> c_int {
            let (used, array) = raw_parts(subs);
            *ret_subs_used = (*ret_subs_used).min(ret_subs.len() as c_int);
            unsafe {
                ffi::ydb_node_next_s(
                    varname.as_ptr(),
                    used,
                    array,
                    ret_subs_used,
                    ret_subs.as_mut_ptr().cast(),
                )
            }
        }
    }
}
