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

//! Build script for the yotta extension.
//!
//! Links libyottadb when the `native` feature is enabled. The library is
//! looked up in `$ydb_dist`, the directory YottaDB installs itself into.

use std::env;

const DEFAULT_YDB_DIST: &str = "/usr/local/lib/yottadb/r122";

fn main() {
    println!("cargo::rerun-if-env-changed=ydb_dist");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    let dist = env::var("ydb_dist").unwrap_or_else(|_| DEFAULT_YDB_DIST.to_string());
    println!("cargo::rustc-link-search=native={dist}");
    println!("cargo::rustc-link-lib=dylib=yottadb");
    // Let the extension find libyottadb at import time without LD_LIBRARY_PATH.
    println!("cargo::rustc-cdylib-link-arg=-Wl,-rpath,{dist}");
}
