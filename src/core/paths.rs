//! Path utilities for import resolution and asset rewriting.
//!
//! The compiler treats file identifiers as plain slash-separated paths and
//! never touches the real filesystem here; all normalization is lexical so
//! the same logic works against in-memory fixtures and the OS alike.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: resolve `.` and `..` segments without
/// consulting the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Join `request` onto `base` and normalize the result.
pub fn join_normalized(base: &Path, request: &str) -> PathBuf {
    normalize(&base.join(request))
}

/// The containing directory of a file path. Root-level files live in `/`.
pub fn dirname(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("/"))
}

/// Express `target` relative to the directory `from`, using `..` hops where
/// needed. Both inputs are expected to be absolute and normalized.
pub fn relative_to(from: &Path, target: &Path) -> PathBuf {
    let from_parts: Vec<_> = from.components().collect();
    let target_parts: Vec<_> = target.components().collect();

    let common = from_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from_parts.len() {
        out.push("..");
    }
    for part in &target_parts[common..] {
        out.push(part);
    }
    out
}

/// Rewrite a relative URL declared in `origin_dir` so that it stays correct
/// when the declaration is inlined into a file under `consumer_dir`.
///
/// Absolute paths, fragments, and scheme-qualified URLs pass through
/// untouched.
pub fn rebase_url(url: &str, origin_dir: &Path, consumer_dir: &Path) -> String {
    if !is_relative_url(url) {
        return url.to_string();
    }
    let absolute = join_normalized(origin_dir, url);
    let relative = relative_to(consumer_dir, &absolute);
    let text = relative.to_string_lossy().replace('\\', "/");
    if text.starts_with("../") { text } else { format!("./{text}") }
}

/// True for URLs that are resolved against the declaring file's directory.
pub fn is_relative_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    if url.starts_with('/') || url.starts_with('#') || url.starts_with("data:") {
        return false;
    }
    // A scheme like `http:` or `https:` makes the URL absolute.
    !url.split('/').next().is_some_and(|head| head.contains(':'))
}
