//! Subset extraction and prefix grafting for mixin composition.
//!
//! A mixin application copies the part of the origin stylesheet that hangs
//! off one class, with that class replaced by the `&` placeholder. Grafting
//! later substitutes the consumer's scoped selector for `&`. Order of rules
//! is preserved throughout.

use crate::css::ast::{Node, Rule};
use crate::css::selector::{
    Selector, SelectorPart, SimpleSelector, parse_selector_list,
};

/// How rules are admitted into a mixin subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsetMode {
    /// Only selectors anchored on the mixin class survive; other selector
    /// branches are dropped.
    Named,
    /// Every rule participates; selectors not anchored on `.root` are
    /// nested under the placeholder as descendants.
    Root,
}

/// Copy the rules of `nodes` that belong to the mixin rooted at `class_name`,
/// replacing the anchor with `&`. At-rules with bodies are recursed into and
/// kept only when they retain rules.
pub fn create_subset(nodes: &[Node], class_name: &str, mode: SubsetMode) -> Vec<Node> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            Node::Rule(rule) => {
                if matches!(rule.selector.as_str(), ":vars" | ":import") {
                    continue;
                }
                if let Some(subset) = subset_rule(rule, class_name, mode) {
                    out.push(Node::Rule(subset));
                }
            }
            Node::AtRule(at) if at.is_conditional() => {
                if let Some(body) = &at.body {
                    let inner = create_subset(body, class_name, mode);
                    if inner.iter().any(|n| matches!(n, Node::Rule(_))) {
                        let mut copy = at.clone();
                        copy.body = Some(inner);
                        out.push(Node::AtRule(copy));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn subset_rule(rule: &Rule, class_name: &str, mode: SubsetMode) -> Option<Rule> {
    let list = parse_selector_list(&rule.selector);
    let mut kept = Vec::new();
    for selector in list.selectors {
        match rebase_selector(selector, class_name, mode) {
            Some(rebased) => kept.push(rebased.to_string()),
            None => {}
        }
    }
    if kept.is_empty() {
        return None;
    }
    let mut copy = rule.clone();
    copy.selector = kept.join(", ");
    Some(copy)
}

/// Replace the anchor class at the head of `selector` with `&`. In root
/// mode a selector without the anchor is nested under `&` instead.
fn rebase_selector(mut selector: Selector, class_name: &str, mode: SubsetMode) -> Option<Selector> {
    let anchored = match selector.parts.first() {
        Some(SelectorPart::Simple(SimpleSelector::Class(name))) => name == class_name,
        Some(SelectorPart::Simple(SimpleSelector::Type(name))) => name == class_name,
        _ => false,
    };
    if anchored {
        selector.parts[0] = SelectorPart::Simple(SimpleSelector::Nesting);
        return Some(selector);
    }
    match mode {
        SubsetMode::Named => None,
        SubsetMode::Root => {
            let mut parts = vec![
                SelectorPart::Simple(SimpleSelector::Nesting),
                SelectorPart::Combinator(crate::css::selector::Combinator::Descendant),
            ];
            parts.append(&mut selector.parts);
            Some(Selector::from_parts(parts))
        }
    }
}

/// Substitute the consumer's scoped selector for every `&` in a rebased
/// selector string. A consumer selector list fans out: each target in the
/// list gets its own grafted branch.
pub fn graft_prefix(selector: &str, prefix: &str) -> String {
    let targets = parse_selector_list(prefix);
    if targets.selectors.len() <= 1 {
        return selector.replace('&', prefix);
    }
    targets
        .selectors
        .iter()
        .map(|target| selector.replace('&', &target.to_string()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse;

    fn rules(nodes: &[Node]) -> Vec<&Rule> {
        nodes
            .iter()
            .filter_map(|n| match n {
                Node::Rule(rule) => Some(rule),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn named_subset_keeps_anchored_rules() {
        let (sheet, _) = parse(
            ".x { color: red; } .x:hover { color: blue; } .x .child {} .other {}",
        );
        let subset = create_subset(&sheet.nodes, "x", SubsetMode::Named);
        let rules = rules(&subset);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].selector, "&");
        assert_eq!(rules[1].selector, "&:hover");
        assert_eq!(rules[2].selector, "& .child");
    }

    #[test]
    fn named_subset_drops_unanchored_branches() {
        let (sheet, _) = parse(".x, .other { color: red; }");
        let subset = create_subset(&sheet.nodes, "x", SubsetMode::Named);
        assert_eq!(rules(&subset)[0].selector, "&");
    }

    #[test]
    fn root_subset_nests_foreign_rules() {
        let (sheet, _) = parse(".root { color: red; } .part { color: blue; }");
        let subset = create_subset(&sheet.nodes, "root", SubsetMode::Root);
        let rules = rules(&subset);
        assert_eq!(rules[0].selector, "&");
        assert_eq!(rules[1].selector, "& .part");
    }

    #[test]
    fn conditional_at_rules_survive_when_they_keep_rules() {
        let (sheet, _) = parse("@media screen { .x { color: red; } .y {} }");
        let subset = create_subset(&sheet.nodes, "x", SubsetMode::Named);
        let [Node::AtRule(at)] = subset.as_slice() else {
            panic!("expected a media rule");
        };
        assert_eq!(rules(at.body.as_ref().unwrap())[0].selector, "&");
    }

    #[test]
    fn import_and_vars_blocks_never_enter_a_subset() {
        let (sheet, _) = parse(":vars { a: red; } :import { -st-from: \"./x\"; } .root {}");
        let subset = create_subset(&sheet.nodes, "root", SubsetMode::Root);
        assert_eq!(rules(&subset).len(), 1);
    }

    #[test]
    fn grafting_replaces_every_placeholder() {
        assert_eq!(graft_prefix("&:hover", ".ns__a"), ".ns__a:hover");
        assert_eq!(graft_prefix("& .ns__part", ".ns__a"), ".ns__a .ns__part");
    }

    #[test]
    fn grafting_fans_out_over_target_lists() {
        assert_eq!(
            graft_prefix("&:hover", ".ns__a, .ns__b"),
            ".ns__a:hover, .ns__b:hover"
        );
        assert_eq!(
            graft_prefix("& .part", ".ns__a, .ns__b"),
            ".ns__a .part, .ns__b .part"
        );
    }
}
