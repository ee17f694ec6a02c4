//! Builds a [`StyleMeta`] from source text.
//!
//! One document-order pass over the parsed tree collects imports, vars,
//! keyframes, and the symbols introduced by selectors and `-st-*`
//! directives. The implicit `root` class is always registered first.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextSize;

use crate::css::ast::{AtRule, Node, Rule};
use crate::css::selector::{
    PseudoArg, Selector, SelectorPart, SimpleSelector, parse_selector_list,
};
use crate::css::value::strip_quotes;
use crate::css::{Stylesheet, parse};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};
use crate::meta::symbol::{ImportKind, ImportRef, Symbol, SymbolTable};
use crate::meta::{ImportStatement, KeyframesInfo, StyleMeta};

/// Process one stylesheet into its semantic model.
pub fn process(path: impl Into<PathBuf>, source: &str) -> StyleMeta {
    let path = path.into();
    let (ast, diagnostics) = parse(source);
    tracing::trace!(path = %path.display(), "processing stylesheet");

    let mut processor = Processor {
        symbols: SymbolTable::new(),
        imports: Vec::new(),
        keyframes: IndexMap::new(),
        diagnostics,
    };
    processor.symbols.insert(Symbol::Class {
        name: SmolStr::new_static("root"),
        extends: None,
        states: Vec::new(),
        alias: None,
    });

    let namespace = namespace_of(&ast).unwrap_or_else(|| namespace_from_path(&path));
    processor.collect(&ast.nodes);

    StyleMeta {
        path,
        namespace,
        ast,
        symbols: processor.symbols,
        imports: processor.imports,
        keyframes: processor.keyframes,
        diagnostics: processor.diagnostics,
    }
}

/// Derive a namespace from the file name: `button.st.css` becomes `button`,
/// non-identifier characters become underscores.
pub fn namespace_from_path(path: &Path) -> SmolStr {
    let stem = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem
        .strip_suffix(".st.css")
        .or_else(|| stem.strip_suffix(".css"))
        .map(str::to_string)
        .unwrap_or(stem);

    let mut out = String::with_capacity(stem.len());
    for (i, ch) in stem.chars().enumerate() {
        if ch.is_alphanumeric() || ch == '_' {
            if i == 0 && ch.is_ascii_digit() {
                out.push('_');
            }
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    SmolStr::new(out)
}

fn namespace_of(ast: &Stylesheet) -> Option<SmolStr> {
    ast.nodes.iter().find_map(|node| match node {
        Node::AtRule(at) if at.name == "namespace" => {
            let name = strip_quotes(&at.params);
            (!name.is_empty()).then(|| SmolStr::new(name))
        }
        _ => None,
    })
}

struct Processor {
    symbols: SymbolTable,
    imports: Vec<ImportStatement>,
    keyframes: IndexMap<SmolStr, KeyframesInfo>,
    diagnostics: Diagnostics,
}

impl Processor {
    fn collect(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Rule(rule) => match rule.selector.as_str() {
                    ":import" => self.import_block(rule),
                    ":vars" => self.vars_block(rule),
                    _ => self.style_rule(rule),
                },
                Node::AtRule(at) => self.at_rule(at),
                _ => {}
            }
        }
    }

    fn at_rule(&mut self, at: &AtRule) {
        match at.name.as_str() {
            "st-import" => self.st_import(at),
            "keyframes" | "-webkit-keyframes" => {
                let name = at.params.trim();
                if name.is_empty() {
                    self.error(at.offset, "`@keyframes` is missing a name");
                } else {
                    self.keyframes
                        .entry(SmolStr::new(name))
                        .or_insert(KeyframesInfo::Local);
                }
            }
            "media" | "supports" | "st-scope" => {
                if let Some(body) = &at.body {
                    self.collect(body);
                }
            }
            _ => {}
        }
    }

    // ========================================================================
    // Imports
    // ========================================================================

    fn import_block(&mut self, rule: &Rule) {
        let mut statement = ImportStatement {
            request: String::new(),
            default_name: None,
            named: Vec::new(),
            keyframes: Vec::new(),
            offset: rule.offset,
        };
        for decl in rule.decls() {
            match decl.prop.as_str() {
                "-st-from" => statement.request = strip_quotes(&decl.value).to_string(),
                "-st-default" => statement.default_name = Some(SmolStr::new(decl.value.trim())),
                "-st-named" => {
                    let (named, keyframes) = self.parse_named_list(&decl.value, decl.offset);
                    statement.named.extend(named);
                    statement.keyframes.extend(keyframes);
                }
                other => {
                    self.error(decl.offset, format!("unknown `:import` declaration `{other}`"));
                }
            }
        }
        self.finish_import(statement);
    }

    /// `@st-import Default, [a, b as c, keyframes(k)] from "./path"`.
    fn st_import(&mut self, at: &AtRule) {
        let Some(from_at) = at.params.rfind(" from ") else {
            self.error(at.offset, "`@st-import` is missing a `from` clause");
            return;
        };
        let (bindings, request) = at.params.split_at(from_at);
        let request = strip_quotes(request[" from ".len()..].trim()).to_string();

        let mut statement = ImportStatement {
            request,
            default_name: None,
            named: Vec::new(),
            keyframes: Vec::new(),
            offset: at.offset,
        };

        let bindings = bindings.trim();
        let (default_part, named_part) = match bindings.find('[') {
            Some(open) => {
                let close = bindings.rfind(']').unwrap_or(bindings.len());
                (&bindings[..open], Some(&bindings[open + 1..close]))
            }
            None => (bindings, None),
        };
        let default_part = default_part.trim().trim_end_matches(',').trim();
        if !default_part.is_empty() {
            statement.default_name = Some(SmolStr::new(default_part));
        }
        if let Some(named) = named_part {
            let (named, keyframes) = self.parse_named_list(named, at.offset);
            statement.named.extend(named);
            statement.keyframes.extend(keyframes);
        }
        self.finish_import(statement);
    }

    fn finish_import(&mut self, statement: ImportStatement) {
        if statement.request.is_empty() {
            self.error(statement.offset, "import is missing a source path");
            return;
        }
        if statement.default_name.is_none()
            && statement.named.is_empty()
            && statement.keyframes.is_empty()
        {
            self.error(statement.offset, "import binds no names");
            return;
        }

        if let Some(name) = &statement.default_name {
            self.symbols.insert(Symbol::Import {
                name: name.clone(),
                reference: ImportRef {
                    request: statement.request.clone(),
                    kind: ImportKind::Default,
                },
            });
        }
        for (source, local) in &statement.named {
            self.symbols.insert(Symbol::Import {
                name: local.clone(),
                reference: ImportRef {
                    request: statement.request.clone(),
                    kind: ImportKind::Named { source: source.clone() },
                },
            });
        }
        for (source, local) in &statement.keyframes {
            self.keyframes.insert(
                local.clone(),
                KeyframesInfo::Imported(ImportRef {
                    request: statement.request.clone(),
                    kind: ImportKind::Keyframes { source: source.clone() },
                }),
            );
        }
        self.imports.push(statement);
    }

    /// Comma-separated binding list: `a, b as c, keyframes(k, k2 as l)`.
    /// Returns `(named, keyframes)` as `(source, local)` pairs.
    fn parse_named_list(
        &mut self,
        text: &str,
        offset: TextSize,
    ) -> (Vec<(SmolStr, SmolStr)>, Vec<(SmolStr, SmolStr)>) {
        let mut named = Vec::new();
        let mut keyframes = Vec::new();
        for entry in split_top_level_commas(text) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if let Some(inner) = entry
                .strip_prefix("keyframes(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                for sub in inner.split(',') {
                    if let Some(pair) = self.parse_binding(sub.trim(), offset) {
                        keyframes.push(pair);
                    }
                }
            } else if let Some(pair) = self.parse_binding(entry, offset) {
                named.push(pair);
            }
        }
        (named, keyframes)
    }

    /// `name` or `name as local`.
    fn parse_binding(&mut self, entry: &str, offset: TextSize) -> Option<(SmolStr, SmolStr)> {
        let words: Vec<&str> = entry.split_whitespace().collect();
        match words.as_slice() {
            [] => None,
            [name] => Some((SmolStr::new(name), SmolStr::new(name))),
            [source, "as", local] => Some((SmolStr::new(source), SmolStr::new(local))),
            _ => {
                self.error(offset, format!("invalid import binding `{entry}`"));
                None
            }
        }
    }

    // ========================================================================
    // Vars and rules
    // ========================================================================

    fn vars_block(&mut self, rule: &Rule) {
        for decl in rule.decls() {
            self.symbols.insert(Symbol::Var {
                name: decl.prop.clone(),
                value: decl.value.clone(),
            });
        }
    }

    fn style_rule(&mut self, rule: &Rule) {
        let selectors = parse_selector_list(&rule.selector);
        for selector in &selectors.selectors {
            self.register_selector(selector);
        }
        if let Some((name, is_class)) = simple_target(&selectors.selectors) {
            self.apply_directives(rule, &name, is_class);
        } else {
            for decl in rule.decls() {
                if matches!(decl.prop.as_str(), "-st-extends" | "-st-states") {
                    self.error(
                        decl.offset,
                        format!("`{}` requires a simple class or element selector", decl.prop),
                    );
                }
            }
        }
    }

    fn register_selector(&mut self, selector: &Selector) {
        for part in &selector.parts {
            let SelectorPart::Simple(simple) = part else { continue };
            match simple {
                SimpleSelector::Class(name) => self.register_class(name),
                SimpleSelector::Type(name) => self.register_element(name),
                SimpleSelector::PseudoClass { arg: Some(PseudoArg::Selectors(list)), .. } => {
                    for inner in &list.selectors {
                        self.register_selector(inner);
                    }
                }
                _ => {}
            }
        }
    }

    fn register_class(&mut self, name: &SmolStr) {
        match self.symbols.get(name) {
            Some(Symbol::Import { reference, .. }) => {
                // An imported name used as a class is an alias until a
                // local `-st-extends` claims it.
                let alias = Some(reference.clone());
                self.symbols.insert(Symbol::Class {
                    name: name.clone(),
                    extends: None,
                    states: Vec::new(),
                    alias,
                });
            }
            Some(_) => {}
            None => self.symbols.insert(Symbol::Class {
                name: name.clone(),
                extends: None,
                states: Vec::new(),
                alias: None,
            }),
        }
    }

    fn register_element(&mut self, name: &SmolStr) {
        match self.symbols.get(name) {
            Some(Symbol::Import { reference, .. }) => {
                let alias = Some(reference.clone());
                self.symbols.insert(Symbol::Element {
                    name: name.clone(),
                    extends: None,
                    alias,
                });
            }
            Some(_) => {}
            None => {
                // Only custom elements get a symbol; plain tags stay as-is.
                if name.chars().next().is_some_and(char::is_uppercase) {
                    self.symbols.insert(Symbol::Element {
                        name: name.clone(),
                        extends: None,
                        alias: None,
                    });
                }
            }
        }
    }

    fn apply_directives(&mut self, rule: &Rule, target: &SmolStr, is_class: bool) {
        for decl in rule.decls() {
            match decl.prop.as_str() {
                "-st-extends" => {
                    let value = SmolStr::new(decl.value.trim());
                    match self.symbols.get_mut(target) {
                        Some(Symbol::Class { extends, alias, .. })
                        | Some(Symbol::Element { extends, alias, .. }) => {
                            *extends = Some(value);
                            *alias = None;
                        }
                        _ => {}
                    }
                }
                "-st-states" => {
                    if !is_class {
                        self.error(decl.offset, "`-st-states` only applies to classes");
                        continue;
                    }
                    let list: Vec<SmolStr> = decl
                        .value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(SmolStr::new)
                        .collect();
                    if let Some(Symbol::Class { states, .. }) = self.symbols.get_mut(target) {
                        *states = list;
                    }
                }
                _ => {}
            }
        }
    }

    fn error(&mut self, offset: TextSize, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(DiagnosticCode::ParseError, message).at(offset));
    }
}

/// The single target of a rule whose selector list is one simple class or
/// element selector; directives only attach there.
fn simple_target(selectors: &[Selector]) -> Option<(SmolStr, bool)> {
    let [selector] = selectors else { return None };
    match selector.parts.as_slice() {
        [SelectorPart::Simple(SimpleSelector::Class(name))] => Some((name.clone(), true)),
        [SelectorPart::Simple(SimpleSelector::Type(name))] => Some((name.clone(), false)),
        _ => None,
    }
}

fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0u32;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}
