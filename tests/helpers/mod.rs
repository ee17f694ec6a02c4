//! Shared fixtures: build a compiler over an in-memory project.

use std::path::Path;
use std::sync::Arc;

use stylium::{MemoryFileSystem, StyleCompiler, TransformOutput};

// Not every suite uses every helper.
#[allow(dead_code)]
pub fn compiler(files: &[(&str, &str)]) -> StyleCompiler {
    let fs = Arc::new(MemoryFileSystem::new());
    for (path, content) in files {
        fs.add_file(path, *content);
    }
    StyleCompiler::new(fs)
}

#[allow(dead_code)]
pub fn compile(files: &[(&str, &str)], entry: &str) -> TransformOutput {
    compiler(files)
        .compile(Path::new(entry))
        .expect("entry file should compile")
}

/// Compile a single standalone stylesheet named `/entry.st.css`.
#[allow(dead_code)]
pub fn compile_one(source: &str) -> TransformOutput {
    compile(&[("/entry.st.css", source)], "/entry.st.css")
}
