//! Per-file semantic model.
//!
//! [`process`] turns parsed source into a [`StyleMeta`]: the symbol table,
//! import statements, and namespace for one stylesheet. Everything here is
//! local to the file; cross-file meaning is the resolver's job.

pub mod process;
pub mod symbol;

use std::path::PathBuf;

use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::css::Stylesheet;
use crate::diagnostics::Diagnostics;

pub use process::process;
pub use symbol::{ImportKind, ImportRef, Symbol, SymbolTable};

/// Where a keyframes name comes from. Keyframes have their own namespace,
/// separate from class and var symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyframesInfo {
    /// Declared by an `@keyframes` block in this file.
    Local,
    /// Bound by a `keyframes(...)` import entry.
    Imported(ImportRef),
}

/// One import statement (`:import` block or `@st-import`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub request: String,
    pub default_name: Option<SmolStr>,
    /// `(source, local)` pairs; equal unless renamed with `as`.
    pub named: Vec<(SmolStr, SmolStr)>,
    /// Named keyframes bindings, same pairing.
    pub keyframes: Vec<(SmolStr, SmolStr)>,
    pub offset: TextSize,
}

/// The processed form of one stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMeta {
    pub path: PathBuf,
    pub namespace: SmolStr,
    pub ast: Stylesheet,
    pub symbols: SymbolTable,
    pub imports: Vec<ImportStatement>,
    pub keyframes: IndexMap<SmolStr, KeyframesInfo>,
    pub diagnostics: Diagnostics,
}

impl StyleMeta {
    /// The scoped form of a class name: `{namespace}__{name}`.
    pub fn scoped_class(&self, name: &str) -> String {
        format!("{}__{}", self.namespace, name)
    }

    /// The scoped form of a state: `{namespace}--{state}`.
    pub fn scoped_state(&self, state: &str) -> String {
        format!("{}--{}", self.namespace, state)
    }

    /// The scoped form of a keyframes name: `{namespace}__{name}`.
    pub fn scoped_keyframes(&self, name: &str) -> String {
        format!("{}__{}", self.namespace, name)
    }
}
