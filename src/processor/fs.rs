//! Filesystem access behind a trait, so the compiler runs the same against
//! the OS and against in-memory fixtures.

use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub trait FileSystem: Send + Sync {
    fn read_file(&self, path: &Path) -> io::Result<String>;
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem.
#[derive(Debug, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// In-memory file map. Paths are stored normalized so `/a/./x` and `/a/x`
/// name the same file.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<FxHashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = crate::core::normalize(path.as_ref());
        self.files.write().insert(path, content.into());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = crate::core::normalize(path.as_ref());
        self.files.write().remove(&path);
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<String> {
        let path = crate::core::normalize(path);
        self.files.read().get(&path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path.display()))
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().contains_key(&crate::core::normalize(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_fs_round_trip() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/a/./x.st.css", ".root {}");
        assert!(fs.exists(Path::new("/a/x.st.css")));
        assert_eq!(fs.read_file(Path::new("/a/x.st.css")).unwrap(), ".root {}");
        fs.remove_file("/a/x.st.css");
        assert!(!fs.exists(Path::new("/a/x.st.css")));
    }
}
