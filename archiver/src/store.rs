use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use tempfile::NamedTempFile;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone)]
pub struct StoreEntry {
    pub name: String,
    pub kind: EntryKind,
    pub modified: SystemTime,
}

/// File store rooted at the working directory, addressed by path segments.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        ContentStore { root: root.into() }
    }

    pub fn path<S: AsRef<str>>(&self, segments: &[S]) -> PathBuf {
        segments
            .iter()
            .fold(self.root.clone(), |path, segment| path.join(segment.as_ref()))
    }

    pub fn exists<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        self.path(segments).exists()
    }

    /// Read a whole file. A missing file is `Ok(None)`.
    pub fn read<S: AsRef<str>>(&self, segments: &[S]) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path(segments);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io("read", path, e)),
        }
    }

    /// Replace the file with `bytes`, creating parent directories as needed.
    ///
    /// The content lands in a temporary sibling first and is renamed into
    /// place, so readers see either the old or the new file.
    pub fn write<S: AsRef<str>>(&self, segments: &[S], bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path(segments);
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();
        fs::create_dir_all(&parent)
            .map_err(|e| StoreError::io("create directory", parent.clone(), e))?;

        let mut tmp = NamedTempFile::new_in(&parent)
            .map_err(|e| StoreError::io("create temp file in", parent, e))?;
        // Temp files are created owner-only; archived files should be readable like any other.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|e| StoreError::io("set permissions on", tmp.path().to_path_buf(), e))?;
        }
        tmp.write_all(bytes)
            .map_err(|e| StoreError::io("write", tmp.path().to_path_buf(), e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::io("replace", path.clone(), e.error))?;
        Ok(())
    }

    pub fn remove<S: AsRef<str>>(&self, segments: &[S]) -> Result<(), StoreError> {
        let path = self.path(segments);
        fs::remove_file(&path).map_err(|e| StoreError::io("remove", path, e))
    }

    /// Direct children of a directory with their modification times.
    /// A directory that does not exist lists as empty.
    pub fn list<S: AsRef<str>>(&self, segments: &[S]) -> Result<Vec<StoreEntry>, StoreError> {
        let dir = self.path(segments);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io("list", dir, e)),
        };

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("list", dir.clone(), e))?;
            let metadata = entry
                .metadata()
                .map_err(|e| StoreError::io("inspect", entry.path(), e))?;
            let modified = metadata
                .modified()
                .map_err(|e| StoreError::io("inspect", entry.path(), e))?;
            let kind = if metadata.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };

            children.push(StoreEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                modified,
            });
        }

        Ok(children)
    }
}
