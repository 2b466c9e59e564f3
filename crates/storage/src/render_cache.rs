//! Directory-backed cache of rendered images.
//!
//! Images are written once under a name carrying a random token and are
//! never read back; the cache only decides where they go and when they are
//! deleted. Expired files are swept at the start of every batch.
//!
//! Sweep-then-write for one directory runs under a lock shared by every
//! `RenderCache` pointing at that directory in the process, so a sweep never
//! races a concurrent batch that has just written its files.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, SystemTime};

use oven_common::{OvenError, OvenResult};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactFamily, ArtifactName};

/// Images older than this are swept.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

const TOKEN_LEN: usize = 8;

/// Where a written image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub file_path: PathBuf,
    /// Path under the public image prefix, as handed to clients.
    pub public_path: String,
}

/// Render cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct RenderCache {
    dir: PathBuf,
    public_prefix: String,
    ttl: Duration,
}

impl RenderCache {
    pub fn new(dir: impl Into<PathBuf>, public_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Public path for a file name: `{prefix}/{name}`.
    pub fn public_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name)
    }

    /// Write one PNG. A `.png` suffix is appended when missing and the
    /// directory is created on demand.
    pub fn write_image(&self, name: &str, png: &[u8]) -> OvenResult<StoredImage> {
        let file_name = if name.ends_with(".png") {
            name.to_string()
        } else {
            format!("{}.png", name)
        };

        fs::create_dir_all(&self.dir).map_err(|e| {
            OvenError::CacheError(format!(
                "failed to create cache directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let file_path = self.dir.join(&file_name);
        fs::write(&file_path, png).map_err(|e| {
            OvenError::CacheError(format!("failed to write {}: {}", file_path.display(), e))
        })?;

        debug!(path = %file_path.display(), bytes = png.len(), "Wrote image");

        Ok(StoredImage {
            public_path: self.public_path(&file_name),
            file_path,
        })
    }

    /// Delete tracked images older than the TTL.
    pub fn sweep(&self) -> OvenResult<usize> {
        sweep_expired(&self.dir, &ArtifactFamily::tracked_suffixes(), self.ttl)
    }

    /// Sweep, then write every image of a batch, holding the directory lock
    /// throughout. Results are in input order.
    pub fn store_batch(
        &self,
        images: Vec<(ArtifactName, Vec<u8>)>,
    ) -> OvenResult<Vec<StoredImage>> {
        let lock = directory_lock(&self.dir)?;
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let removed = self.sweep()?;
        let stored = images
            .iter()
            .map(|(name, png)| self.write_image(&name.to_string(), png))
            .collect::<OvenResult<Vec<_>>>()?;

        info!(
            dir = %self.dir.display(),
            removed = removed,
            written = stored.len(),
            "Stored image batch"
        );
        Ok(stored)
    }
}

/// Process-wide lock for a cache directory.
///
/// The directory is created first so that every spelling of it resolves to
/// the same canonical key.
fn directory_lock(dir: &Path) -> OvenResult<Arc<Mutex<()>>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    fs::create_dir_all(dir).map_err(|e| {
        OvenError::CacheError(format!(
            "failed to create cache directory {}: {}",
            dir.display(),
            e
        ))
    })?;
    let key = fs::canonicalize(dir).map_err(|e| {
        OvenError::CacheError(format!("failed to resolve {}: {}", dir.display(), e))
    })?;

    let mut locks = LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(locks.entry(key).or_default().clone())
}

/// Delete files in `dir` whose name ends with one of `suffixes` and whose
/// modification time is more than `ttl` ago.
///
/// A missing directory sweeps nothing. Files whose metadata cannot be read
/// are skipped with a warning; a failed delete is an error.
pub fn sweep_expired<S: AsRef<str>>(
    dir: &Path,
    suffixes: &[S],
    ttl: Duration,
) -> OvenResult<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(OvenError::CacheError(format!(
                "failed to list {}: {}",
                dir.display(),
                e
            )))
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;

    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !suffixes.iter().any(|s| name.ends_with(s.as_ref())) {
            continue;
        }

        let path = entry.path();
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stat cached image");
                continue;
            }
        };

        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= ttl {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(OvenError::CacheError(format!(
                    "failed to remove {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }

    debug!(dir = %dir.display(), removed = removed, "Swept expired images");
    Ok(removed)
}

/// Cache-busting token of lowercase letters.
pub fn random_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}
