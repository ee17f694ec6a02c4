//! Mixin composition.
//!
//! A `-st-mixin` application copies the origin class's subset, transforms
//! it in the origin's own context (origin namespace, origin vars with the
//! call's named-argument overrides, origin keyframes), then grafts the
//! consumer's scoped selector over the `&` placeholder. The first bare-`&`
//! rule splices inline at the `-st-mixin` position; everything else is
//! appended after the consumer rule.
//!
//! Recursion is guarded by a frame stack of `(origin file, class)`: a
//! reference already on the stack is skipped, which truncates circular
//! mixins instead of erroring.

use text_size::TextSize;

use crate::core::dirname;
use crate::css::ast::{AtRule, Declaration, Node};
use crate::css::value::{ValueNode, parse_named_args, parse_value, split_comma, stringify};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::meta::{KeyframesInfo, Symbol};
use crate::resolver::{CssResolved, ResolvedSymbol};
use crate::transformer::reparent::{SubsetMode, create_subset, graft_prefix};
use crate::transformer::{Bindings, RuleCtx, StyleTransformer};

impl StyleTransformer<'_> {
    /// Apply every mixin referenced by a `-st-mixin` value. Returns the
    /// nodes to splice inline and the siblings to insert after the rule.
    pub(crate) fn apply_mixins(
        &mut self,
        ctx: &RuleCtx<'_>,
        value: &str,
        offset: TextSize,
        prefix: &str,
    ) -> (Vec<Node>, Vec<Node>) {
        let mut inline = Vec::new();
        let mut siblings = Vec::new();
        // References separate on whitespace; commas between them are
        // tolerated, commas inside argument lists stay with their call.
        for node in parse_value(value) {
            match &node {
                ValueNode::Ident(name) => {
                    self.apply_mixin(ctx, name, &[], offset, prefix, &mut inline, &mut siblings);
                }
                ValueNode::Function { name, args } => {
                    self.apply_mixin(ctx, name, args, offset, prefix, &mut inline, &mut siblings);
                }
                ValueNode::Space | ValueNode::Div(',') => {}
                other => {
                    self.diagnostics.push(
                        Diagnostic::error(
                            DiagnosticCode::InvalidArgument,
                            format!(
                                "invalid mixin reference `{}`",
                                stringify(std::slice::from_ref(other)),
                            ),
                        )
                        .at(offset)
                        .in_file(&ctx.meta.path),
                    );
                }
            }
        }
        (inline, siblings)
    }

    fn apply_mixin(
        &mut self,
        ctx: &RuleCtx<'_>,
        name: &str,
        args: &[ValueNode],
        offset: TextSize,
        prefix: &str,
        inline: &mut Vec<Node>,
        siblings: &mut Vec<Node>,
    ) {
        let Some(symbol) = ctx.meta.symbols.get(name).cloned() else {
            self.diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnknownMixin,
                    format!("unknown mixin `{name}`"),
                )
                .at(offset)
                .in_file(&ctx.meta.path),
            );
            return;
        };

        if let Some(ResolvedSymbol::Function { module, export }) =
            self.resolver().deep_resolve(ctx.meta, &symbol)
        {
            self.apply_function_mixin(ctx, &module, &export, args, offset, inline);
            return;
        }

        let chain = self.declared_chain(ctx, &symbol);
        if chain.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnknownMixin,
                    format!("`{name}` is not a mixin"),
                )
                .at(offset)
                .in_file(&ctx.meta.path),
            );
            return;
        }

        let bindings = self.bind_named_args(ctx, args, offset);
        // Alias chains apply base subsets before the enriched ones, so the
        // nearest declaration overrides.
        for entry in chain.iter().rev() {
            self.apply_css_entry(ctx, entry, bindings.as_ref(), prefix, inline, siblings);
        }
    }

    /// The declared classes a mixin reference passes through, nearest
    /// first: the symbol itself (resolved past pure imports), then each
    /// alias it forwards to.
    fn declared_chain(&self, ctx: &RuleCtx<'_>, symbol: &Symbol) -> Vec<CssResolved> {
        let resolver = self.resolver();
        let mut declared = Vec::new();
        let mut visited = rustc_hash::FxHashSet::default();
        let mut current =
            Some(CssResolved { meta: ctx.meta.clone(), symbol: symbol.clone() });

        while let Some(entry) = current.take() {
            if !visited.insert((entry.meta.path.clone(), entry.symbol.name().clone())) {
                break;
            }
            if entry.symbol.is_import() {
                current = resolver
                    .resolve(&entry.meta, &entry.symbol)
                    .and_then(ResolvedSymbol::into_css);
                continue;
            }
            if !matches!(entry.symbol, Symbol::Class { .. } | Symbol::Element { .. }) {
                break;
            }
            declared.push(entry.clone());
            current = match &entry.symbol {
                Symbol::Class { alias: Some(reference), extends: None, .. }
                | Symbol::Element { alias: Some(reference), extends: None, .. } => resolver
                    .resolve_import(&entry.meta, reference)
                    .and_then(ResolvedSymbol::into_css),
                _ => None,
            };
        }
        declared
    }

    /// Named-argument overrides, evaluated in the consumer's context and
    /// bound for this application only.
    fn bind_named_args(
        &mut self,
        ctx: &RuleCtx<'_>,
        args: &[ValueNode],
        offset: TextSize,
    ) -> Option<Bindings> {
        if args.is_empty() {
            return None;
        }
        match parse_named_args(args) {
            Ok(pairs) => {
                let mut bindings = Bindings::default();
                for (name, raw) in pairs {
                    let mut decl = Declaration::new("", raw);
                    decl.offset = offset;
                    self.evaluate_decl(ctx, &mut decl);
                    bindings.insert(name, decl.value);
                }
                Some(bindings)
            }
            Err(message) => {
                self.diagnostics.push(
                    Diagnostic::error(DiagnosticCode::InvalidArgument, message)
                        .at(offset)
                        .in_file(&ctx.meta.path),
                );
                None
            }
        }
    }

    fn apply_css_entry(
        &mut self,
        ctx: &RuleCtx<'_>,
        entry: &CssResolved,
        bindings: Option<&Bindings>,
        prefix: &str,
        inline: &mut Vec<Node>,
        siblings: &mut Vec<Node>,
    ) {
        let frame = (entry.meta.path.clone(), entry.symbol.name().clone());
        if self.mixin_stack.contains(&frame) {
            tracing::trace!(
                file = %frame.0.display(),
                class = %frame.1,
                "circular mixin reference truncated"
            );
            return;
        }
        self.mixin_stack.push(frame);

        let class_name = entry.symbol.name().clone();
        let root_mode = class_name == "root";
        let mode = if root_mode { SubsetMode::Root } else { SubsetMode::Named };
        let mut subset = create_subset(&entry.meta.ast.nodes, &class_name, mode);

        let origin_dir = dirname(&entry.meta.path);
        let origin_ctx = RuleCtx {
            meta: &entry.meta,
            bindings,
            keep_extends: true,
            nesting_anchor: &class_name,
            rebase_from: (origin_dir != self.consumer_dir).then_some(origin_dir.as_path()),
        };
        self.transform_nodes(&origin_ctx, &mut subset);

        let mut took_inline = false;
        for node in subset {
            match node {
                Node::Rule(mut rule) => {
                    if !took_inline && rule.selector == "&" {
                        took_inline = true;
                        inline.extend(rule.nodes);
                    } else {
                        rule.selector = graft_prefix(&rule.selector, prefix);
                        siblings.push(Node::Rule(rule));
                    }
                }
                Node::AtRule(mut at) => {
                    if let Some(body) = &mut at.body {
                        graft_nodes(body, prefix);
                    }
                    siblings.push(Node::AtRule(at));
                }
                other => siblings.push(other),
            }
        }

        if root_mode && entry.meta.path != ctx.meta.path {
            self.duplicate_origin_keyframes(ctx, entry, &origin_ctx, siblings);
        }
        self.mixin_stack.pop();
    }

    /// A root mixin carries its animations along. Keyframes the consumer
    /// can already reach through its own imports keep the one scoped copy.
    fn duplicate_origin_keyframes(
        &mut self,
        ctx: &RuleCtx<'_>,
        entry: &CssResolved,
        origin_ctx: &RuleCtx<'_>,
        siblings: &mut Vec<Node>,
    ) {
        let resolver = self.resolver();
        for node in &entry.meta.ast.nodes {
            let Node::AtRule(at) = node else { continue };
            if !matches!(at.name.as_str(), "keyframes" | "-webkit-keyframes") {
                continue;
            }
            let name = at.params.trim();
            if entry.meta.keyframes.get(name) != Some(&KeyframesInfo::Local) {
                continue;
            }
            let reachable = ctx.meta.keyframes.keys().any(|local| {
                resolver
                    .resolve_keyframes(ctx.meta, local)
                    .is_some_and(|(origin, source)| {
                        origin.path == entry.meta.path && source == name
                    })
            });
            if reachable {
                continue;
            }
            let mut copy: AtRule = at.clone();
            self.transform_keyframes(origin_ctx, &mut copy);
            siblings.push(Node::AtRule(copy));
        }
    }

    fn apply_function_mixin(
        &mut self,
        ctx: &RuleCtx<'_>,
        module: &str,
        export: &str,
        args: &[ValueNode],
        offset: TextSize,
        inline: &mut Vec<Node>,
    ) {
        let Some(function) = self.processor().functions().get(module, export) else {
            self.diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnknownMixin,
                    format!("`{module}` has no mixin function `{export}`"),
                )
                .at(offset)
                .in_file(&ctx.meta.path),
            );
            return;
        };

        let call_args: Vec<String> = split_comma(args)
            .iter()
            .map(|group| {
                let mut decl = Declaration::new("", stringify(group));
                decl.offset = offset;
                self.evaluate_decl(ctx, &mut decl);
                decl.value
            })
            .collect();

        match function.apply(&call_args) {
            Ok(decls) => {
                for (prop, value) in decls {
                    let mut decl = Declaration::new(prop, value);
                    decl.offset = offset;
                    inline.push(Node::Decl(decl));
                }
            }
            Err(message) => {
                self.diagnostics.push(
                    Diagnostic::error(
                        DiagnosticCode::InvalidArgument,
                        format!("mixin function `{export}` failed: {message}"),
                    )
                    .at(offset)
                    .in_file(&ctx.meta.path),
                );
            }
        }
    }
}

fn graft_nodes(nodes: &mut [Node], prefix: &str) {
    for node in nodes {
        match node {
            Node::Rule(rule) => rule.selector = graft_prefix(&rule.selector, prefix),
            Node::AtRule(at) => {
                if let Some(body) = &mut at.body {
                    graft_nodes(body, prefix);
                }
            }
            _ => {}
        }
    }
}
