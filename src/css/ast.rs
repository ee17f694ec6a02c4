//! Mutable CSS tree manipulated by the transform passes.
//!
//! The tree is deliberately small: rules keep their selector as text (the
//! selector module parses it on demand) and declaration values stay as text
//! until the value module is asked for structure. Printing is canonical, not
//! byte-preserving.

use smol_str::SmolStr;
use text_size::TextSize;

/// One node in a rule body or at the stylesheet top level.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Decl(Declaration),
    Comment(String),
}

/// A style rule: selector plus ordered children (declarations, nested
/// at-rules are not produced by the parser but tolerated by the printer).
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub offset: TextSize,
}

impl Rule {
    pub fn decls(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Decl(decl) => Some(decl),
            _ => None,
        })
    }
}

/// An at-rule such as `@media`, `@supports`, `@keyframes`, `@namespace`,
/// `@st-import`. `body` is `None` for statement-style at-rules.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: SmolStr,
    pub params: String,
    pub body: Option<Vec<Node>>,
    pub offset: TextSize,
}

impl AtRule {
    /// True for conditional group rules whose body nests ordinary rules.
    pub fn is_conditional(&self) -> bool {
        matches!(self.name.as_str(), "media" | "supports")
    }
}

/// A `prop: value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub prop: SmolStr,
    pub value: String,
    pub important: bool,
    pub offset: TextSize,
}

impl Declaration {
    pub fn new(prop: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        Self { prop: prop.into(), value: value.into(), important: false, offset: TextSize::new(0) }
    }
}

/// A parsed source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}
