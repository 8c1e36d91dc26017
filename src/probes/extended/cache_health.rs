//! npm cache size and integrity.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::sys::command::{self, RunOptions};
use crate::sys::fs::dir_size;

/// Cache size above which the cache is reported as oversized (5 GiB).
pub const CACHE_SIZE_LIMIT: u64 = 5 * 1024 * 1024 * 1024;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheHealth {
    pub path: PathBuf,
    pub exists: bool,
    pub size: u64,
    pub exceeds_limit: bool,
    /// The content-addressable store (`_cacache`) is present.
    pub has_cacache: bool,
    /// Result of `npm cache verify`, when it ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_ok: Option<bool>,
}

/// Measure the cache without running npm.
pub fn measure_cache(path: &Path) -> CacheHealth {
    let exists = path.is_dir();
    let size = dir_size(path);
    CacheHealth {
        path: path.to_path_buf(),
        exists,
        size,
        exceeds_limit: size > CACHE_SIZE_LIMIT,
        has_cacache: path.join("_cacache").is_dir(),
        verify_ok: None,
    }
}

/// Measure the cache and, when it holds a store, run `npm cache verify`.
pub fn probe_cache(path: &Path) -> CacheHealth {
    let mut health = measure_cache(path);
    if health.has_cacache {
        let options = RunOptions {
            timeout: VERIFY_TIMEOUT,
            ..Default::default()
        };
        health.verify_ok = Some(command::run_with("npm", &["cache", "verify"], &options).is_some());
    }
    health
}
