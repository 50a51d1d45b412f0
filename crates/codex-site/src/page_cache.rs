//! Persistent storage for generated pages.
//!
//! - [`PageCache`]: trait for cache implementations
//! - [`NullPageCache`]: no-op cache (caching disabled)
//! - [`FilePageCache`]: one file per page on disk
//!
//! Every entry is stamped with the data revision it was generated from. A
//! lookup with a different revision is a miss, so pages are regenerated
//! after the data changes.
//!
//! Cache failures are never fatal. A failed read is a miss, a failed write is
//! logged and dropped, and the page is regenerated next time.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in file names. Keeps ids like `../x` inside their directory.
const FILE_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Encode an id or locale as a single path segment.
pub(crate) fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, FILE_NAME).to_string()
}

/// Storage for serialized page payloads.
pub trait PageCache: Send + Sync {
    /// Stored payload for a page, if one was stored under `revision`.
    fn get(&self, route: &str, locale: &str, id: &str, revision: &str) -> Option<Vec<u8>>;

    /// Store a payload generated from `revision`, replacing any previous one.
    fn set(&self, route: &str, locale: &str, id: &str, revision: &str, value: &[u8]);
}

/// Cache that stores nothing.
#[derive(Debug, Default)]
pub struct NullPageCache;

impl PageCache for NullPageCache {
    fn get(&self, _route: &str, _locale: &str, _id: &str, _revision: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _route: &str, _locale: &str, _id: &str, _revision: &str, _value: &[u8]) {}
}

/// File-based page cache.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION                       # cache version string
/// +-- pages/
///     +-- {route}/{locale}/{id}.page
/// ```
///
/// Each entry is a revision header followed by the payload:
///
/// ```text
/// [revision_len: u32 LE][revision bytes][payload bytes]
/// ```
///
/// A `VERSION` mismatch wipes the whole directory on construction, so pages
/// written by a build with a different payload shape are never read back.
#[derive(Debug)]
pub struct FilePageCache {
    pages_dir: PathBuf,
}

impl FilePageCache {
    /// Open the cache at `root`, validating its version.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self {
            pages_dir: root.join("pages"),
        }
    }

    fn entry_path(&self, route: &str, locale: &str, id: &str) -> PathBuf {
        self.pages_dir
            .join(route)
            .join(path_segment(locale))
            .join(format!("{}.page", path_segment(id)))
    }
}

impl PageCache for FilePageCache {
    fn get(&self, route: &str, locale: &str, id: &str, revision: &str) -> Option<Vec<u8>> {
        let mut file = File::open(self.entry_path(route, locale, id)).ok()?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf).ok()?;
        let stored_len = usize::try_from(u32::from_le_bytes(len_buf)).ok()?;

        // Compare the header before reading the payload
        if stored_len != revision.len() {
            return None;
        }
        let mut stored = vec![0u8; stored_len];
        file.read_exact(&mut stored).ok()?;
        if stored != revision.as_bytes() {
            return None;
        }

        let mut value = Vec::new();
        file.read_to_end(&mut value).ok()?;
        Some(value)
    }

    fn set(&self, route: &str, locale: &str, id: &str, revision: &str, value: &[u8]) {
        let path = self.entry_path(route, locale, id);
        let Some(parent) = path.parent() else {
            return;
        };
        let Ok(revision_len) = u32::try_from(revision.len()) else {
            tracing::warn!(len = revision.len(), "Revision too long to cache page");
            return;
        };

        let mut buf = Vec::with_capacity(4 + revision.len() + value.len());
        buf.extend_from_slice(&revision_len.to_le_bytes());
        buf.extend_from_slice(revision.as_bytes());
        buf.extend_from_slice(value);

        if let Err(e) = fs::create_dir_all(parent).and_then(|()| fs::write(&path, &buf)) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write cached page");
        }
    }
}

/// Wipe `root` unless its `VERSION` file matches `version`.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!(version, "Page cache version matches");
            return;
        }
        Ok(stored) => {
            tracing::info!(%stored, current = version, "Page cache version changed, wiping");
        }
        Err(_) => {
            tracing::info!("No page cache VERSION file, initializing");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(error = %e, "Failed to remove page cache directory");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!(error = %e, "Failed to create page cache directory");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!(error = %e, "Failed to write page cache VERSION file");
    }
}
