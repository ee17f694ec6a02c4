//! Canonical stylesheet serializer.
//!
//! Output is normalized: four-space indentation, one declaration per line,
//! a trailing semicolon on every declaration. The transform passes compare
//! printed output in tests, so the format must stay stable.

use std::fmt::Write;

use crate::css::ast::{AtRule, Declaration, Node, Rule, Stylesheet};

pub fn print(sheet: &Stylesheet) -> String {
    let mut out = String::new();
    print_nodes(&mut out, &sheet.nodes, 0);
    out
}

fn print_nodes(out: &mut String, nodes: &[Node], indent: usize) {
    for node in nodes {
        match node {
            Node::Rule(rule) => print_rule(out, rule, indent),
            Node::AtRule(at) => print_at_rule(out, at, indent),
            Node::Decl(decl) => print_decl(out, decl, indent),
            Node::Comment(text) => {
                push_indent(out, indent);
                out.push_str(text);
                out.push('\n');
            }
        }
    }
}

fn print_rule(out: &mut String, rule: &Rule, indent: usize) {
    push_indent(out, indent);
    let _ = writeln!(out, "{} {{", rule.selector);
    print_nodes(out, &rule.nodes, indent + 1);
    push_indent(out, indent);
    out.push_str("}\n");
}

fn print_at_rule(out: &mut String, at: &AtRule, indent: usize) {
    push_indent(out, indent);
    match &at.body {
        Some(body) => {
            if at.params.is_empty() {
                let _ = writeln!(out, "@{} {{", at.name);
            } else {
                let _ = writeln!(out, "@{} {} {{", at.name, at.params);
            }
            print_nodes(out, body, indent + 1);
            push_indent(out, indent);
            out.push_str("}\n");
        }
        None => {
            let _ = writeln!(out, "@{} {};", at.name, at.params);
        }
    }
}

fn print_decl(out: &mut String, decl: &Declaration, indent: usize) {
    push_indent(out, indent);
    if decl.important {
        let _ = writeln!(out, "{}: {} !important;", decl.prop, decl.value);
    } else {
        let _ = writeln!(out, "{}: {};", decl.prop, decl.value);
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse;

    #[test]
    fn round_trip_is_canonical() {
        let (sheet, _) = parse(".a{color:red;border:1px solid}@media screen{.b{x:y}}");
        assert_eq!(
            print(&sheet),
            ".a {\n    color: red;\n    border: 1px solid;\n}\n\
             @media screen {\n    .b {\n        x: y;\n    }\n}\n"
        );
    }

    #[test]
    fn statement_at_rule_prints_with_semicolon() {
        let (sheet, _) = parse("@namespace \"Button\";");
        assert_eq!(print(&sheet), "@namespace \"Button\";\n");
    }

    #[test]
    fn important_survives() {
        let (sheet, _) = parse(".a { color: red !important }");
        assert!(print(&sheet).contains("color: red !important;"));
    }
}
