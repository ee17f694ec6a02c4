//! Import request resolution.
//!
//! Relative requests resolve against the importing file's directory; bare
//! requests walk up through `node_modules` directories. Both try the
//! request verbatim first and then with stylesheet extensions appended.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::{join_normalized, normalize};
use crate::processor::fs::FileSystem;

/// Extensions tried after the verbatim request.
const EXTENSIONS: &[&str] = &[".st.css", ".css"];

pub trait ModuleResolver: Send + Sync {
    /// Resolve `request` as imported from a file in `context_dir`. Returns
    /// the normalized path of an existing file, or `None`.
    fn resolve(&self, context_dir: &Path, request: &str) -> Option<PathBuf>;
}

/// Node-style resolution over a [`FileSystem`].
pub struct DefaultModuleResolver {
    fs: Arc<dyn FileSystem>,
}

impl DefaultModuleResolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn try_candidates(&self, base: PathBuf) -> Option<PathBuf> {
        if self.fs.exists(&base) {
            return Some(base);
        }
        let name = base.file_name()?.to_string_lossy().into_owned();
        for ext in EXTENSIONS {
            let candidate = base.with_file_name(format!("{name}{ext}"));
            if self.fs.exists(&candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

impl ModuleResolver for DefaultModuleResolver {
    fn resolve(&self, context_dir: &Path, request: &str) -> Option<PathBuf> {
        if request.is_empty() {
            return None;
        }
        if request.starts_with("./") || request.starts_with("../") {
            return self.try_candidates(join_normalized(context_dir, request));
        }
        if request.starts_with('/') {
            return self.try_candidates(normalize(Path::new(request)));
        }
        // Bare request: walk ancestors looking for node_modules.
        let mut dir = Some(context_dir);
        while let Some(current) = dir {
            let base = join_normalized(&current.join("node_modules"), request);
            if let Some(found) = self.try_candidates(base) {
                return Some(found);
            }
            dir = current.parent();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::fs::MemoryFileSystem;

    fn resolver(files: &[&str]) -> DefaultModuleResolver {
        let fs = MemoryFileSystem::new();
        for file in files {
            fs.add_file(file, "");
        }
        DefaultModuleResolver::new(Arc::new(fs))
    }

    #[test]
    fn relative_request() {
        let r = resolver(&["/a/button.st.css"]);
        assert_eq!(
            r.resolve(Path::new("/a"), "./button.st.css"),
            Some(PathBuf::from("/a/button.st.css"))
        );
        assert_eq!(
            r.resolve(Path::new("/a/b"), "../button.st.css"),
            Some(PathBuf::from("/a/button.st.css"))
        );
        assert_eq!(r.resolve(Path::new("/a"), "./missing.st.css"), None);
    }

    #[test]
    fn extension_is_appended() {
        let r = resolver(&["/a/button.st.css"]);
        assert_eq!(
            r.resolve(Path::new("/a"), "./button"),
            Some(PathBuf::from("/a/button.st.css"))
        );
    }

    #[test]
    fn bare_request_walks_node_modules() {
        let r = resolver(&["/proj/node_modules/lib/index.st.css"]);
        assert_eq!(
            r.resolve(Path::new("/proj/src/deep"), "lib/index.st.css"),
            Some(PathBuf::from("/proj/node_modules/lib/index.st.css"))
        );
    }
}
