//! CSS syntax layer: tokens, tree, selectors, and value expressions.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod print;
pub mod selector;
pub mod value;

pub use ast::{AtRule, Declaration, Node, Rule, Stylesheet};
pub use parser::parse;
pub use print::print;
