// src/fs/mock.rs

use super::FileSystem;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for tests.
///
/// Only tracks which paths exist. Adding a file implicitly creates its
/// parent directories.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let mut paths = self.paths.lock().unwrap();
        Self::insert_with_parents(&mut paths, path.as_ref());
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let mut paths = self.paths.lock().unwrap();
        paths.remove(path.as_ref());
    }

    fn insert_with_parents(paths: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            if !paths.insert(ancestor.to_path_buf()) {
                // Parents of an already known path are known too.
                break;
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let paths = self.paths.lock().unwrap();
        paths.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut paths = self.paths.lock().unwrap();
        Self::insert_with_parents(&mut paths, path);
        Ok(())
    }
}
