//! File processing tests over both filesystems: caching, invalidation, and
//! import request resolution.

mod helpers;

use std::path::Path;
use std::sync::Arc;

use helpers::{compile, compiler};
use stylium::{OsFileSystem, ProcessError, StyleCompiler};

#[test]
fn os_filesystem_caches_by_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("entry.st.css");
    std::fs::write(&path, ".root { color: red; }").unwrap();

    let compiler = StyleCompiler::new(Arc::new(OsFileSystem));
    let first = compiler.process(&path).unwrap();
    let second = compiler.process(&path).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    std::fs::write(&path, ".root { color: blue; }").unwrap();
    let changed = compiler.process(&path).unwrap();
    assert!(!Arc::ptr_eq(&first, &changed));
}

#[test]
fn invalidation_forces_a_reprocess() {
    let compiler = compiler(&[("/entry.st.css", ".root {}")]);
    let first = compiler.process(Path::new("/entry.st.css")).unwrap();
    compiler.processor().invalidate(Path::new("/entry.st.css"));
    let second = compiler.process(Path::new("/entry.st.css")).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.namespace, second.namespace);
}

#[test]
fn import_requests_resolve_without_an_extension() {
    let output = compile(
        &[
            ("/a/button.st.css", ".root {}"),
            (
                "/a/entry.st.css",
                ":import { -st-from: \"./button\"; -st-default: Button; }\n\
                 Button { color: red; }",
            ),
        ],
        "/a/entry.st.css",
    );
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.css, ".button__root {\n    color: red;\n}\n");
}

#[test]
fn bare_requests_walk_node_modules() {
    let output = compile(
        &[
            ("/proj/node_modules/lib/index.st.css", ".root {}"),
            (
                "/proj/src/entry.st.css",
                "@st-import Lib from \"lib/index.st.css\";\nLib { color: red; }",
            ),
        ],
        "/proj/src/entry.st.css",
    );
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.css, ".index__root {\n    color: red;\n}\n");
}

#[test]
fn missing_entry_file_is_an_io_error() {
    let compiler = compiler(&[]);
    let error = compiler.compile(Path::new("/missing.st.css")).unwrap_err();
    assert!(matches!(error, ProcessError::Io { .. }));
}

#[test]
fn dependency_edits_show_up_in_later_compiles() {
    let files = [
        ("/vars.st.css", ":vars { color1: red; }"),
        (
            "/entry.st.css",
            "@st-import [color1] from \"./vars.st.css\";\n.root { color: value(color1); }",
        ),
    ];
    let fs = Arc::new(stylium::MemoryFileSystem::new());
    for (path, content) in files {
        fs.add_file(path, content);
    }
    let compiler = StyleCompiler::new(fs.clone());

    let first = compiler.compile(Path::new("/entry.st.css")).unwrap();
    assert!(first.css.contains("color: red;"));

    fs.add_file("/vars.st.css", ":vars { color1: green; }");
    let second = compiler.compile(Path::new("/entry.st.css")).unwrap();
    assert!(second.css.contains("color: green;"));
}
