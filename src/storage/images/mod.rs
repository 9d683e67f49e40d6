//! Uploaded images on disk, one file per saved match.
//!
//! Files are named `<user_id>_<base>_<n><ext>`: `base` is the sanitised stem of
//! the uploaded filename and `n` counts up per `(user, base)`.


use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::storage::error::{StoreError, StoreResult};

const DEFAULT_EXTENSION: &str = ".jpg";

const MAX_BASE_LEN: usize = 30;

const TEMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Clone)]
/// Writes and removes uploaded images under a root directory.
pub struct ImageStore {
    root: PathBuf,
    /// Held while a filename is picked and written; shared by clones.
    write_lock: Arc<Mutex<()>>,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensures the root directory exists.
    pub fn ensure_root(&self) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|_| StoreError::UploadDirUnavailable {
                path: self.root.clone(),
            })?;
        }
        Ok(())
    }

    /// Picks the next free filename for `original_filename` uploaded by `user_id`.
    pub fn next_filename(&self, user_id: &str, original_filename: &str) -> StoreResult<String> {
        let (base, ext) = split_filename(original_filename);
        let next = self.highest_number(user_id, &base)? + 1;
        Ok(format!("{}_{}_{}{}", user_id, base, next, ext))
    }

    /// Writes `bytes` and returns `(stored_filename, path)`.
    pub fn save(
        &self,
        user_id: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> StoreResult<(String, PathBuf)> {
        self.ensure_root()?;

        let _guard = self.write_lock.lock();
        let filename = self.next_filename(user_id, original_filename)?;
        let final_path = self.root.join(&filename);
        let temp_path = self
            .root
            .join(format!(".{}{}", Uuid::new_v4().simple(), TEMP_SUFFIX));

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &final_path)?;

        debug!(filename = %filename, bytes = bytes.len(), "Saved image");
        Ok((filename, final_path))
    }

    /// Removes a stored image. Returns `false` if it was already gone.
    pub fn remove(&self, path: &Path) -> StoreResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted image");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn highest_number(&self, user_id: &str, base: &str) -> StoreResult<u32> {
        if !self.root.exists() {
            return Ok(0);
        }

        let prefix = format!("{}_{}_", user_id, base);
        let mut highest = 0;

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();

            if let Some(name) = name.to_str()
                && !name.ends_with(TEMP_SUFFIX)
                && let Some(rest) = name.strip_prefix(&prefix)
                && let Some(number) = rest.split('.').next()
                && let Ok(n) = number.parse::<u32>()
            {
                highest = highest.max(n);
            }
        }

        Ok(highest)
    }
}

/// Splits an uploaded filename into a sanitised base and an extension (with dot).
pub(crate) fn split_filename(original: &str) -> (String, String) {
    let path = Path::new(original);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let base: String = stem
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .replace(' ', "_")
        .chars()
        .take(MAX_BASE_LEN)
        .collect();

    let ext: String = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let ext = if ext.is_empty() {
        DEFAULT_EXTENSION.to_string()
    } else {
        format!(".{}", ext)
    };

    (base, ext)
}
