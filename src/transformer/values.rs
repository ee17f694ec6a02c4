//! Declaration value evaluation.
//!
//! `value(name)` substitutes a var, `value(name, key, ...)` indexes into a
//! typed value, and animation names are mapped to their scoped keyframes.
//! Failures diagnose and leave the written text in place, so one bad
//! expression never corrupts the rest of the declaration.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::css::ast::Declaration;
use crate::css::value::{ValueNode, parse_value, split_comma, stringify};
use crate::custom_values::{BoxError, BoxedValue, default_registry, get_value, parse_box};
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::meta::{StyleMeta, Symbol};
use crate::resolver::ResolvedSymbol;
use crate::transformer::{RuleCtx, StyleTransformer};

type VarVisited = FxHashSet<(PathBuf, SmolStr)>;

/// A var value after evaluation: plain text, or a typed value that still
/// carries structure.
enum VarValue {
    Plain(String),
    Boxed(BoxedValue),
}

impl StyleTransformer<'_> {
    pub(crate) fn evaluate_decl(&mut self, ctx: &RuleCtx<'_>, decl: &mut Declaration) {
        if matches!(decl.prop.as_str(), "animation" | "animation-name") {
            self.rename_keyframes(ctx, decl);
        }
        let mut visited = VarVisited::default();
        decl.value = self.evaluate_text(ctx, &decl.value, decl.offset, &mut visited);
        if ctx.rebase_from.is_some() {
            decl.value = self.rebase_urls(ctx, &decl.value);
        }
    }

    /// Substitute every `value()` call in `text`.
    fn evaluate_text(
        &mut self,
        ctx: &RuleCtx<'_>,
        text: &str,
        offset: TextSize,
        visited: &mut VarVisited,
    ) -> String {
        let nodes = parse_value(text);
        let mut out = String::with_capacity(text.len());
        for node in &nodes {
            self.evaluate_node(ctx, node, offset, visited, &mut out);
        }
        out
    }

    fn evaluate_node(
        &mut self,
        ctx: &RuleCtx<'_>,
        node: &ValueNode,
        offset: TextSize,
        visited: &mut VarVisited,
        out: &mut String,
    ) {
        match node {
            ValueNode::Function { name, args } if name == "value" => {
                out.push_str(&self.evaluate_value_call(ctx, args, offset, visited));
            }
            ValueNode::Function { name, args } => {
                out.push_str(name);
                out.push('(');
                for arg in args {
                    self.evaluate_node(ctx, arg, offset, visited, out);
                }
                out.push(')');
            }
            other => out.push_str(&stringify(std::slice::from_ref(other))),
        }
    }

    /// One `value(name, path...)` call. Returns the substituted text, or
    /// the call as written when it cannot be resolved.
    fn evaluate_value_call(
        &mut self,
        ctx: &RuleCtx<'_>,
        args: &[ValueNode],
        offset: TextSize,
        visited: &mut VarVisited,
    ) -> String {
        let original = || format!("value({})", stringify(args));
        let groups = split_comma(args);
        let Some((first, path_groups)) = groups.split_first() else {
            self.diag_error(ctx, DiagnosticCode::InvalidArgument, "`value()` needs a var name", offset);
            return original();
        };
        let [ValueNode::Ident(name)] = first.as_slice() else {
            self.diag_error(
                ctx,
                DiagnosticCode::InvalidArgument,
                format!("invalid var reference `{}`", stringify(first)),
                offset,
            );
            return original();
        };
        let path: Vec<String> =
            path_groups.iter().map(|group| stringify(group).trim().to_string()).collect();

        if path.is_empty() {
            if let Some(bound) = ctx.bindings.and_then(|b| b.get(name.as_str())) {
                return bound.clone();
            }
        }

        let Some(value) = self.resolve_var(ctx, name, offset, visited) else {
            return original();
        };
        match value {
            VarValue::Plain(text) => {
                if path.is_empty() {
                    text
                } else {
                    self.diag_error(
                        ctx,
                        DiagnosticCode::InvalidArgument,
                        format!("`{name}` is not a typed value and cannot be indexed"),
                        offset,
                    );
                    original()
                }
            }
            VarValue::Boxed(boxed) => {
                let path_refs: Vec<&str> = path.iter().map(String::as_str).collect();
                match get_value(&boxed, &path_refs, default_registry()) {
                    Ok(text) => text,
                    Err(error) => {
                        let code = match error {
                            BoxError::UnknownType(_) => DiagnosticCode::UnknownBoxType,
                            BoxError::InvalidArgument(_) => DiagnosticCode::InvalidArgument,
                        };
                        self.diag_error(ctx, code, error.to_string(), offset);
                        original()
                    }
                }
            }
        }
    }

    /// Resolve a var name to its evaluated value, following imports to the
    /// declaring file and evaluating in that file's context.
    fn resolve_var(
        &mut self,
        ctx: &RuleCtx<'_>,
        name: &str,
        offset: TextSize,
        visited: &mut VarVisited,
    ) -> Option<VarValue> {
        let Some(symbol) = ctx.meta.symbols.get(name) else {
            self.diag_warning(
                ctx,
                DiagnosticCode::UnknownVar,
                format!("unknown var `{name}`"),
                offset,
            );
            return None;
        };
        let resolved = self.resolver().deep_resolve(ctx.meta, symbol);
        let Some(ResolvedSymbol::Css(resolved)) = resolved else {
            self.diag_warning(
                ctx,
                DiagnosticCode::UnknownVar,
                format!("could not resolve var `{name}`"),
                offset,
            );
            return None;
        };
        let Symbol::Var { name: var_name, value: raw } = &resolved.symbol else {
            self.diag_warning(
                ctx,
                DiagnosticCode::UnknownVar,
                format!("`{name}` is not a var"),
                offset,
            );
            return None;
        };

        if !visited.insert((resolved.meta.path.clone(), var_name.clone())) {
            self.diag_error(
                ctx,
                DiagnosticCode::InvalidArgument,
                format!("cyclic value definition through `{name}`"),
                offset,
            );
            return None;
        }

        let var_meta = resolved.meta.clone();
        let raw = raw.clone();
        let var_ctx = RuleCtx {
            meta: &var_meta,
            bindings: ctx.bindings,
            keep_extends: false,
            nesting_anchor: "root",
            rebase_from: None,
        };
        let evaluated = self.evaluate_text(&var_ctx, &raw, offset, visited);

        let nodes = parse_value(&evaluated);
        if let [ValueNode::Function { name: fn_name, args }] = nodes.as_slice() {
            match parse_box(fn_name, args, default_registry()) {
                Ok(Some((boxed, deprecated))) => {
                    if deprecated {
                        self.diag_warning(
                            ctx,
                            DiagnosticCode::DeprecatedAlias,
                            format!("`{fn_name}` is deprecated, use `{}`", boxed.tag),
                            offset,
                        );
                    }
                    return Some(VarValue::Boxed(boxed));
                }
                Ok(None) => {}
                Err(error) => {
                    let code = match error {
                        BoxError::UnknownType(_) => DiagnosticCode::UnknownBoxType,
                        BoxError::InvalidArgument(_) => DiagnosticCode::InvalidArgument,
                    };
                    self.diag_error(ctx, code, error.to_string(), offset);
                    return None;
                }
            }
        }
        Some(VarValue::Plain(evaluated))
    }

    /// Evaluate a var for the exports: the flat string form (when one
    /// exists) and the JSON form.
    pub(crate) fn export_var(
        &mut self,
        meta: &Arc<StyleMeta>,
        name: &str,
    ) -> (Option<String>, Option<serde_json::Value>) {
        let ctx = RuleCtx::consumer(meta);
        let offset = TextSize::new(0);
        let mut visited = VarVisited::default();
        match self.resolve_var(&ctx, name, offset, &mut visited) {
            Some(VarValue::Plain(text)) => {
                let json = serde_json::Value::String(text.clone());
                (Some(text), Some(json))
            }
            Some(VarValue::Boxed(boxed)) => {
                let flat = default_registry()
                    .lookup(&boxed.tag)
                    .and_then(|lookup| lookup.behavior.flatten(&boxed.payload).ok());
                (flat, Some(crate::custom_values::unbox(&boxed)))
            }
            None => (None, None),
        }
    }

    /// Map animation names through the keyframes namespace.
    fn rename_keyframes(&mut self, ctx: &RuleCtx<'_>, decl: &mut Declaration) {
        let resolver = self.resolver();
        let nodes = parse_value(&decl.value);
        let mut out = String::with_capacity(decl.value.len());
        for node in &nodes {
            match node {
                ValueNode::Ident(name) if ctx.meta.keyframes.contains_key(name.as_str()) => {
                    match resolver.resolve_keyframes(ctx.meta, name) {
                        Some((origin, local)) => out.push_str(&origin.scoped_keyframes(&local)),
                        None => out.push_str(name),
                    }
                }
                other => out.push_str(&stringify(std::slice::from_ref(other))),
            }
        }
        decl.value = out;
    }

    /// Rewrite relative `url()` references against the output directory.
    fn rebase_urls(&mut self, ctx: &RuleCtx<'_>, text: &str) -> String {
        let Some(origin_dir) = ctx.rebase_from else {
            return text.to_string();
        };
        let nodes = parse_value(text);
        let mut out = String::with_capacity(text.len());
        for node in &nodes {
            match node {
                ValueNode::Url(raw) => {
                    let inner = crate::css::value::strip_quotes(raw);
                    let rebased =
                        crate::core::paths::rebase_url(inner, origin_dir, &self.consumer_dir);
                    out.push_str("url(");
                    out.push_str(&rebased);
                    out.push(')');
                }
                other => out.push_str(&stringify(std::slice::from_ref(other))),
            }
        }
        out
    }

    fn diag_error(
        &mut self,
        ctx: &RuleCtx<'_>,
        code: DiagnosticCode,
        message: impl Into<String>,
        offset: TextSize,
    ) {
        self.diagnostics
            .push(Diagnostic::error(code, message).at(offset).in_file(&ctx.meta.path));
    }

    fn diag_warning(
        &mut self,
        ctx: &RuleCtx<'_>,
        code: DiagnosticCode,
        message: impl Into<String>,
        offset: TextSize,
    ) {
        self.diagnostics
            .push(Diagnostic::warning(code, message).at(offset).in_file(&ctx.meta.path));
    }
}
