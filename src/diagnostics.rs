//! Diagnostics collected across parsing, processing, and transformation.
//!
//! Every stage appends to a [`Diagnostics`] sink instead of failing fast, so
//! a single compile surfaces everything wrong with a file at once.

use std::fmt;
use std::path::PathBuf;

use text_size::TextSize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Stable machine-readable category for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    ParseError,
    UnresolvedImport,
    UnknownMixin,
    OverrideMixin,
    InvalidArgument,
    UnknownBoxType,
    DeprecatedAlias,
    UnknownVar,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ParseError => "parse-error",
            DiagnosticCode::UnresolvedImport => "unresolved-import",
            DiagnosticCode::UnknownMixin => "unknown-mixin",
            DiagnosticCode::OverrideMixin => "override-mixin",
            DiagnosticCode::InvalidArgument => "invalid-argument",
            DiagnosticCode::UnknownBoxType => "unknown-box-type",
            DiagnosticCode::DeprecatedAlias => "deprecated-alias",
            DiagnosticCode::UnknownVar => "unknown-var",
        }
    }
}

/// A single reported problem, located by byte offset in its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub file: PathBuf,
    pub offset: TextSize,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            file: PathBuf::new(),
            offset: TextSize::new(0),
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, ..Self::error(code, message) }
    }

    pub fn at(mut self, offset: TextSize) -> Self {
        self.offset = offset;
        self
    }

    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {} ({}:{})",
            self.severity,
            self.code.as_str(),
            self.message,
            self.file.display(),
            u32::from(self.offset),
        )
    }
}

/// Ordered diagnostic sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(code = diagnostic.code.as_str(), "{}", diagnostic.message);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    /// Errors only, skipping warnings.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
