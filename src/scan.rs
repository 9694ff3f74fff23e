//! Enumeration of per-slot directories under `pg_replslot`.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::REPLSLOT_DIR;
use crate::{Error, Result};

/// Lazy iterator over slot directories, in directory read order.
///
/// Entries that stat as something other than a directory are skipped.
/// Entries that cannot be stat'ed are still yielded so that the failure
/// shows up on that slot's report.
#[derive(Debug)]
pub struct SlotDirs {
    root: PathBuf,
    entries: ReadDir,
}

impl SlotDirs {
    /// Opens `<datadir>/pg_replslot`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotsRootUnreadable`] if the directory cannot be listed.
    pub fn open(datadir: &Path) -> Result<Self> {
        let root = datadir.join(REPLSLOT_DIR);
        let entries = fs::read_dir(&root).map_err(|e| Error::SlotsRootUnreadable {
            path: root.clone(),
            source: e,
        })?;

        debug!("Scanning {:?}", root);
        Ok(Self { root, entries })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for SlotDirs {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error reading directory {:?}: {}", self.root, e);
                    continue;
                }
            };

            let file_name = entry.file_name();
            if file_name == "." || file_name == ".." {
                continue;
            }

            let path = self.root.join(&file_name);

            // follows symlinks, like stat(2)
            match fs::metadata(&path) {
                Ok(meta) if !meta.is_dir() => {
                    debug!("Skipping non-directory entry {:?}", path);
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Could not stat {:?}: {}", path, e);
                }
            }

            return Some(path);
        }
    }
}
