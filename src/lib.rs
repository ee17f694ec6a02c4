//! Compiler core for a scoped CSS superset.
//!
//! Stylesheets declare imports, typed vars, states, and mixins on top of
//! plain CSS; compiling a file scopes every name to its declaring file's
//! namespace and emits flat CSS plus a map of exports for the host
//! application.
//!
//! Module layout, bottom up:
//!
//! ```text
//!                 +-----------+
//!                 | compiler  |   entry point: process + transform
//!                 +-----------+
//!                  /         \
//!          +-------------+  +-----------+
//!          | transformer |  | resolver  |   scoping, mixins, exports /
//!          +-------------+  +-----------+   cross-file symbol walks
//!                  \         /
//!               +---------------+
//!               |   processor   |   file cache, module resolution,
//!               +---------------+   function-mixin registry
//!                      |
//!                 +--------+     +---------------+
//!                 |  meta  |     | custom_values |   per-file symbols /
//!                 +--------+     +---------------+   typed value boxes
//!                      |
//!                  +-------+
//!                  |  css  |   lexer, parser, selectors, values
//!                  +-------+
//! ```
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use stylium::{OsFileSystem, StyleCompiler};
//!
//! # fn main() -> Result<(), stylium::ProcessError> {
//! let compiler = StyleCompiler::new(Arc::new(OsFileSystem));
//! let output = compiler.compile(Path::new("button.st.css"))?;
//! println!("{}", output.css);
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod core;
pub mod css;
pub mod custom_values;
pub mod diagnostics;
pub mod meta;
pub mod processor;
pub mod resolver;
pub mod transformer;

pub use compiler::StyleCompiler;
pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
pub use meta::{StyleMeta, Symbol};
pub use processor::{
    FileProcessor, FileSystem, FunctionRegistry, MemoryFileSystem, MixinFunction,
    ModuleResolver, OsFileSystem, ProcessError,
};
pub use resolver::{CssResolved, ResolvedSymbol, StyleResolver};
pub use transformer::{Exports, StyleTransformer, TransformOutput};
