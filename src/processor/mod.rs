//! File processing: reading, caching, and module resolution.
//!
//! The [`FileProcessor`] is the only component that touches the filesystem.
//! Processed metas are cached by path and invalidated by content hash, so
//! repeated resolver and transformer lookups of the same file are cheap and
//! yield the same `Arc`.

pub mod fs;
pub mod functions;
pub mod resolve;

use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};
use thiserror::Error;

use crate::core::dirname;
use crate::meta::{StyleMeta, process};

pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use functions::{FunctionRegistry, MixinFunction};
pub use resolve::{DefaultModuleResolver, ModuleResolver};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to read `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

struct CacheEntry {
    hash: u64,
    meta: Arc<StyleMeta>,
}

/// Reads, processes, and caches stylesheets.
pub struct FileProcessor {
    fs: Arc<dyn FileSystem>,
    resolver: Arc<dyn ModuleResolver>,
    functions: Arc<FunctionRegistry>,
    cache: RwLock<FxHashMap<PathBuf, CacheEntry>>,
}

impl FileProcessor {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        let resolver = Arc::new(DefaultModuleResolver::new(fs.clone()));
        Self::with_resolver(fs, resolver)
    }

    pub fn with_resolver(fs: Arc<dyn FileSystem>, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            fs,
            resolver,
            functions: Arc::new(FunctionRegistry::new()),
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// Process a stylesheet, reusing the cached meta when the content is
    /// unchanged.
    pub fn process_file(&self, path: &Path) -> Result<Arc<StyleMeta>, ProcessError> {
        let path = crate::core::normalize(path);
        let source = self
            .fs
            .read_file(&path)
            .map_err(|source| ProcessError::io(&path, source))?;
        let hash = content_hash(&source);

        if let Some(entry) = self.cache.read().get(&path) {
            if entry.hash == hash {
                tracing::trace!(path = %path.display(), "meta cache hit");
                return Ok(entry.meta.clone());
            }
        }

        tracing::trace!(path = %path.display(), "processing");
        let meta = Arc::new(process(path.clone(), &source));
        self.cache
            .write()
            .insert(path, CacheEntry { hash, meta: meta.clone() });
        Ok(meta)
    }

    /// Resolve an import request made by `importing_file`. Function-mixin
    /// modules are never resolved as paths.
    pub fn resolve_request(&self, importing_file: &Path, request: &str) -> Option<PathBuf> {
        if self.functions.has_module(request) {
            return None;
        }
        self.resolver.resolve(&dirname(importing_file), request)
    }

    /// Drop a cached meta.
    pub fn invalidate(&self, path: &Path) {
        self.cache.write().remove(&crate::core::normalize(path));
    }
}

fn content_hash(source: &str) -> u64 {
    let mut hasher = FxHasher::default();
    source.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(files: &[(&str, &str)]) -> (Arc<MemoryFileSystem>, FileProcessor) {
        let fs = Arc::new(MemoryFileSystem::new());
        for (path, content) in files {
            fs.add_file(path, *content);
        }
        let processor = FileProcessor::new(fs.clone());
        (fs, processor)
    }

    #[test]
    fn cache_returns_same_meta_for_unchanged_content() {
        let (_, processor) = setup(&[("/a.st.css", ".root {}")]);
        let first = processor.process_file(Path::new("/a.st.css")).unwrap();
        let second = processor.process_file(Path::new("/a.st.css")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_content_reprocesses() {
        let (fs, processor) = setup(&[("/a.st.css", ".root {}")]);
        let first = processor.process_file(Path::new("/a.st.css")).unwrap();
        fs.add_file("/a.st.css", ".root {} .other {}");
        let second = processor.process_file(Path::new("/a.st.css")).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.symbols.get("other").is_some());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let (_, processor) = setup(&[]);
        let error = processor.process_file(Path::new("/missing.st.css")).unwrap_err();
        assert!(matches!(error, ProcessError::Io { .. }));
    }

    #[test]
    fn resolve_request_skips_function_modules() {
        let (_, processor) = setup(&[("/mixins.js", "")]);
        processor.functions().register(
            "./mixins.js",
            "noop",
            Arc::new(|_: &[String]| Ok(Vec::new())),
        );
        assert_eq!(processor.resolve_request(Path::new("/entry.st.css"), "./mixins.js"), None);
    }
}
