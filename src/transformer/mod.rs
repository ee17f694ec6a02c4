//! The transform pass: turns a processed stylesheet into plain CSS plus its
//! JavaScript-facing exports.
//!
//! Order of operations per rule: scope the selector, evaluate declaration
//! values, then apply mixins. Mixin output is produced fully transformed in
//! its origin context, so the pass never revisits inserted rules.

pub mod mixin;
pub mod reparent;
pub mod scope;
pub mod values;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::css::ast::{Node, Stylesheet};
use crate::css::print;
use crate::css::selector::parse_selector_list;
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::meta::{ImportStatement, StyleMeta, Symbol};
use crate::processor::FileProcessor;
use crate::resolver::StyleResolver;

/// Named-argument overrides bound for one mixin application.
pub type Bindings = FxHashMap<SmolStr, String>;

/// The exports of one transformed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Exports {
    pub classes: IndexMap<String, String>,
    pub vars: IndexMap<String, String>,
    #[serde(rename = "stVars")]
    pub st_vars: IndexMap<String, serde_json::Value>,
    pub keyframes: IndexMap<String, String>,
}

#[derive(Debug)]
pub struct TransformOutput {
    pub css: String,
    pub exports: Exports,
    pub diagnostics: Diagnostics,
}

/// Context a rule is transformed in. Consumer rules use the defaults; the
/// mixin engine swaps in the origin file, argument bindings, and URL
/// rebasing.
pub(crate) struct RuleCtx<'c> {
    pub meta: &'c Arc<StyleMeta>,
    pub bindings: Option<&'c Bindings>,
    /// Mixin subsets keep `-st-extends`; consumer rules drop it.
    pub keep_extends: bool,
    /// The class whose inheritance chain anchors `&`.
    pub nesting_anchor: &'c str,
    /// Directory relative URLs were written against, when it differs from
    /// the output file's directory.
    pub rebase_from: Option<&'c Path>,
}

impl<'c> RuleCtx<'c> {
    pub(crate) fn consumer(meta: &'c Arc<StyleMeta>) -> Self {
        Self {
            meta,
            bindings: None,
            keep_extends: false,
            nesting_anchor: "root",
            rebase_from: None,
        }
    }
}

/// Transforms one stylesheet against the project's processed files.
pub struct StyleTransformer<'a> {
    processor: &'a FileProcessor,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) mixin_stack: Vec<(PathBuf, SmolStr)>,
    pub(crate) consumer_dir: PathBuf,
}

impl<'a> StyleTransformer<'a> {
    pub fn new(processor: &'a FileProcessor) -> Self {
        Self {
            processor,
            diagnostics: Diagnostics::new(),
            mixin_stack: Vec::new(),
            consumer_dir: PathBuf::from("/"),
        }
    }

    pub(crate) fn resolver(&self) -> StyleResolver<'a> {
        StyleResolver::new(self.processor)
    }

    pub(crate) fn processor(&self) -> &'a FileProcessor {
        self.processor
    }

    /// Transform a processed stylesheet to output CSS and exports.
    pub fn transform(mut self, meta: &Arc<StyleMeta>) -> TransformOutput {
        tracing::trace!(path = %meta.path.display(), "transforming");
        self.consumer_dir = crate::core::dirname(&meta.path);
        self.diagnostics.extend(meta.diagnostics.clone());
        self.validate_imports(meta);

        let mut nodes = meta.ast.nodes.clone();
        strip_definitions(&mut nodes);
        let ctx = RuleCtx::consumer(meta);
        self.transform_nodes(&ctx, &mut nodes);

        let exports = self.build_exports(meta);
        TransformOutput {
            css: print(&Stylesheet { nodes }),
            exports,
            diagnostics: self.diagnostics,
        }
    }

    /// Walk a node list, transforming rules in place. Returns after mixin
    /// siblings have been skipped; they are already final.
    pub(crate) fn transform_nodes(&mut self, ctx: &RuleCtx<'_>, nodes: &mut Vec<Node>) {
        let mut i = 0;
        while i < nodes.len() {
            if matches!(nodes[i], Node::Rule(_)) {
                let inserted = self.transform_rule_at(ctx, nodes, i);
                i += 1 + inserted;
                continue;
            }
            if let Node::AtRule(at) = &mut nodes[i] {
                match at.name.as_str() {
                    "keyframes" | "-webkit-keyframes" => self.transform_keyframes(ctx, at),
                    _ => {
                        if let Some(mut body) = at.body.take() {
                            self.transform_nodes(ctx, &mut body);
                            at.body = Some(body);
                        }
                    }
                }
            }
            i += 1;
        }
    }

    /// Transform the rule at `index`: scope, evaluate, apply mixins.
    /// Returns the number of sibling nodes inserted after it.
    fn transform_rule_at(
        &mut self,
        ctx: &RuleCtx<'_>,
        nodes: &mut Vec<Node>,
        index: usize,
    ) -> usize {
        let mut mixin: Option<(String, TextSize, usize)> = None;
        {
            let Node::Rule(rule) = &mut nodes[index] else { return 0 };

            let mut list = parse_selector_list(&rule.selector);
            self.scope_selector_list(ctx, &mut list);
            rule.selector = list.to_string();

            let mut kept = Vec::with_capacity(rule.nodes.len());
            for node in rule.nodes.drain(..) {
                match node {
                    Node::Decl(decl) if decl.prop == "-st-mixin" => {
                        if mixin.is_some() {
                            self.diagnostics.push(
                                Diagnostic::warning(
                                    DiagnosticCode::OverrideMixin,
                                    "`-st-mixin` overrides an earlier mixin declaration",
                                )
                                .at(decl.offset)
                                .in_file(&ctx.meta.path),
                            );
                        }
                        mixin = Some((decl.value, decl.offset, kept.len()));
                    }
                    Node::Decl(decl) if decl.prop == "-st-states" => {}
                    Node::Decl(decl) if decl.prop == "-st-extends" && !ctx.keep_extends => {}
                    Node::Decl(mut decl) => {
                        self.evaluate_decl(ctx, &mut decl);
                        kept.push(Node::Decl(decl));
                    }
                    other => kept.push(other),
                }
            }
            rule.nodes = kept;
        }

        let Some((value, offset, position)) = mixin else { return 0 };
        let prefix = match &nodes[index] {
            Node::Rule(rule) => rule.selector.clone(),
            _ => return 0,
        };
        let (inline, siblings) = self.apply_mixins(ctx, &value, offset, &prefix);

        if let Node::Rule(rule) = &mut nodes[index] {
            let position = position.min(rule.nodes.len());
            rule.nodes.splice(position..position, inline);
        }
        let count = siblings.len();
        for (k, sibling) in siblings.into_iter().enumerate() {
            nodes.insert(index + 1 + k, sibling);
        }
        count
    }

    /// Scope an `@keyframes` name and evaluate its step declarations.
    fn transform_keyframes(&mut self, ctx: &RuleCtx<'_>, at: &mut crate::css::ast::AtRule) {
        let name = at.params.trim().to_string();
        if ctx.meta.keyframes.contains_key(name.as_str()) {
            at.params = ctx.meta.scoped_keyframes(&name);
        }
        if let Some(body) = &mut at.body {
            for node in body {
                if let Node::Rule(step) = node {
                    for child in &mut step.nodes {
                        if let Node::Decl(decl) = child {
                            self.evaluate_decl(ctx, decl);
                        }
                    }
                }
            }
        }
    }

    // ========================================================================
    // Imports and exports
    // ========================================================================

    fn validate_imports(&mut self, meta: &Arc<StyleMeta>) {
        for statement in &meta.imports {
            self.validate_import(meta, statement);
        }
    }

    fn validate_import(&mut self, meta: &Arc<StyleMeta>, statement: &ImportStatement) {
        if self.processor.functions().has_module(&statement.request) {
            return;
        }
        let Some(path) = self.processor.resolve_request(&meta.path, &statement.request) else {
            self.diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnresolvedImport,
                    format!("unknown import `{}`", statement.request),
                )
                .at(statement.offset)
                .in_file(&meta.path),
            );
            return;
        };
        let Ok(target) = self.processor.process_file(&path) else {
            return;
        };
        for (source, _) in &statement.named {
            if !target.symbols.contains(source) {
                self.diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::UnresolvedImport,
                        format!("`{}` has no export named `{source}`", statement.request),
                    )
                    .at(statement.offset)
                    .in_file(&meta.path),
                );
            }
        }
        for (source, _) in &statement.keyframes {
            if !target.keyframes.contains_key(source) {
                self.diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::UnresolvedImport,
                        format!("`{}` has no keyframes named `{source}`", statement.request),
                    )
                    .at(statement.offset)
                    .in_file(&meta.path),
                );
            }
        }
    }

    fn build_exports(&mut self, meta: &Arc<StyleMeta>) -> Exports {
        let resolver = self.resolver();
        let mut exports = Exports::default();

        for symbol in meta.symbols.classes() {
            let name = symbol.name().clone();
            if symbol.import_ref().is_some() && symbol.extends().is_none() {
                // Alias classes export their origin's scoped name.
                if let Some(origin) = resolver.resolve_symbol_origin(meta, symbol) {
                    if matches!(origin.symbol, Symbol::Class { .. }) {
                        exports.classes.insert(
                            name.to_string(),
                            origin.meta.scoped_class(origin.symbol.name()),
                        );
                    }
                }
                continue;
            }
            let mut parts = vec![meta.scoped_class(&name)];
            for entry in resolver.resolve_extends(meta, &name).iter().skip(1) {
                if entry.symbol.is_class() {
                    parts.push(entry.meta.scoped_class(entry.symbol.name()));
                }
            }
            exports.classes.insert(name.to_string(), parts.join(" "));
        }

        let var_names: Vec<SmolStr> = meta
            .symbols
            .vars()
            .map(|(name, _)| name.clone())
            .collect();
        for name in var_names {
            let (text, json) = self.export_var(meta, &name);
            if let Some(text) = text {
                exports.vars.insert(name.to_string(), text);
            }
            if let Some(json) = json {
                exports.st_vars.insert(name.to_string(), json);
            }
        }

        let keyframe_names: Vec<SmolStr> = meta.keyframes.keys().cloned().collect();
        for name in keyframe_names {
            if let Some((origin, local)) = resolver.resolve_keyframes(meta, &name) {
                exports
                    .keyframes
                    .insert(name.to_string(), origin.scoped_keyframes(&local));
            }
        }
        exports
    }
}

/// Drop definition-only nodes from the output tree.
fn strip_definitions(nodes: &mut Vec<Node>) {
    nodes.retain(|node| match node {
        Node::Rule(rule) => !matches!(rule.selector.as_str(), ":import" | ":vars"),
        Node::AtRule(at) => !matches!(at.name.as_str(), "st-import" | "namespace"),
        _ => true,
    });
}
