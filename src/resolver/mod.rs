//! Cross-file symbol resolution.
//!
//! The resolver walks import references between processed stylesheets. All
//! walks carry an explicit visited set keyed by `(file, symbol name)`, so
//! circular imports terminate and return the last symbol reached instead of
//! erroring.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::meta::{ImportKind, ImportRef, KeyframesInfo, StyleMeta, Symbol};
use crate::processor::FileProcessor;

/// A symbol located in the stylesheet that declares it.
#[derive(Debug, Clone)]
pub struct CssResolved {
    pub meta: Arc<StyleMeta>,
    pub symbol: Symbol,
}

/// What an import reference ultimately names.
#[derive(Debug, Clone)]
pub enum ResolvedSymbol {
    Css(CssResolved),
    /// A function-mixin export; `module` is the import request as written.
    Function { module: String, export: SmolStr },
}

impl ResolvedSymbol {
    pub fn as_css(&self) -> Option<&CssResolved> {
        match self {
            ResolvedSymbol::Css(resolved) => Some(resolved),
            ResolvedSymbol::Function { .. } => None,
        }
    }

    pub fn into_css(self) -> Option<CssResolved> {
        match self {
            ResolvedSymbol::Css(resolved) => Some(resolved),
            ResolvedSymbol::Function { .. } => None,
        }
    }
}

type Visited = FxHashSet<(PathBuf, SmolStr)>;

/// Resolves symbols across files through a shared [`FileProcessor`].
pub struct StyleResolver<'a> {
    processor: &'a FileProcessor,
}

impl<'a> StyleResolver<'a> {
    pub fn new(processor: &'a FileProcessor) -> Self {
        Self { processor }
    }

    /// One resolution hop. Import symbols resolve to the symbol they name
    /// in the target file (which may itself be an import); anything else
    /// resolves to itself.
    pub fn resolve(&self, meta: &Arc<StyleMeta>, symbol: &Symbol) -> Option<ResolvedSymbol> {
        match symbol {
            Symbol::Import { reference, .. } => self.resolve_import(meta, reference),
            other => Some(ResolvedSymbol::Css(CssResolved {
                meta: meta.clone(),
                symbol: other.clone(),
            })),
        }
    }

    /// Follow import hops until a declared symbol is reached. A revisited
    /// `(file, name)` pair ends the walk at the current symbol.
    pub fn deep_resolve(&self, meta: &Arc<StyleMeta>, symbol: &Symbol) -> Option<ResolvedSymbol> {
        let mut visited = Visited::default();
        let mut current = CssResolved { meta: meta.clone(), symbol: symbol.clone() };
        while let Symbol::Import { reference, name } = &current.symbol {
            if !visited.insert((current.meta.path.clone(), name.clone())) {
                break;
            }
            match self.resolve_import(&current.meta, reference)? {
                ResolvedSymbol::Css(next) => current = next,
                function @ ResolvedSymbol::Function { .. } => return Some(function),
            }
        }
        Some(ResolvedSymbol::Css(current))
    }

    /// The inheritance chain of a class or element, most-derived first.
    /// Each entry is a declared symbol; the chain follows `-st-extends`
    /// and alias references, resolving import hops in between.
    pub fn resolve_extends(&self, meta: &Arc<StyleMeta>, name: &str) -> Vec<CssResolved> {
        let mut chain = Vec::new();
        let Some(symbol) = meta.symbols.get(name) else {
            return chain;
        };
        let mut visited = Visited::default();
        let mut current = Some(CssResolved { meta: meta.clone(), symbol: symbol.clone() });

        while let Some(entry) = current.take() {
            if !visited.insert((entry.meta.path.clone(), entry.symbol.name().clone())) {
                break;
            }
            // Land on a declared symbol before recording the link.
            let entry = if entry.symbol.is_import() {
                match self
                    .deep_resolve(&entry.meta, &entry.symbol)
                    .and_then(ResolvedSymbol::into_css)
                {
                    Some(declared) => declared,
                    None => break,
                }
            } else {
                entry
            };
            if !matches!(entry.symbol, Symbol::Class { .. } | Symbol::Element { .. }) {
                break;
            }
            chain.push(entry.clone());

            current = if let Some(extends) = entry.symbol.extends() {
                entry.meta.symbols.get(extends).map(|next| CssResolved {
                    meta: entry.meta.clone(),
                    symbol: next.clone(),
                })
            } else if let Some(alias) = entry.symbol.import_ref() {
                self.resolve_import(&entry.meta, alias)
                    .and_then(ResolvedSymbol::into_css)
            } else {
                None
            };
        }
        chain
    }

    /// The file that originally declared a symbol, following both import
    /// bindings and alias classes. A local `-st-extends` claims the symbol
    /// for its own file and stops the walk.
    pub fn resolve_symbol_origin(
        &self,
        meta: &Arc<StyleMeta>,
        symbol: &Symbol,
    ) -> Option<CssResolved> {
        let mut visited = Visited::default();
        let mut current = CssResolved { meta: meta.clone(), symbol: symbol.clone() };
        loop {
            let reference = match &current.symbol {
                Symbol::Import { reference, .. } => Some(reference.clone()),
                Symbol::Class { alias: Some(reference), extends: None, .. }
                | Symbol::Element { alias: Some(reference), extends: None, .. } => {
                    Some(reference.clone())
                }
                _ => None,
            };
            let Some(reference) = reference else {
                return Some(current);
            };
            if !visited.insert((current.meta.path.clone(), current.symbol.name().clone())) {
                return Some(current);
            }
            match self.resolve_import(&current.meta, &reference)? {
                ResolvedSymbol::Css(next) => current = next,
                ResolvedSymbol::Function { .. } => return None,
            }
        }
    }

    /// Resolve a keyframes name to the file and local name that declare it.
    pub fn resolve_keyframes(
        &self,
        meta: &Arc<StyleMeta>,
        name: &str,
    ) -> Option<(Arc<StyleMeta>, SmolStr)> {
        let mut visited = Visited::default();
        let mut meta = meta.clone();
        let mut name = SmolStr::new(name);
        loop {
            match meta.keyframes.get(&name)? {
                KeyframesInfo::Local => return Some((meta, name)),
                KeyframesInfo::Imported(reference) => {
                    if !visited.insert((meta.path.clone(), name.clone())) {
                        return Some((meta, name));
                    }
                    let ImportKind::Keyframes { source } = &reference.kind else {
                        return None;
                    };
                    let path = self.processor.resolve_request(&meta.path, &reference.request)?;
                    let target = self.processor.process_file(&path).ok()?;
                    name = source.clone();
                    meta = target;
                }
            }
        }
    }

    pub(crate) fn resolve_import(
        &self,
        meta: &Arc<StyleMeta>,
        reference: &ImportRef,
    ) -> Option<ResolvedSymbol> {
        if self.processor.functions().has_module(&reference.request) {
            let export = match &reference.kind {
                ImportKind::Default => SmolStr::new_static("default"),
                ImportKind::Named { source } | ImportKind::Keyframes { source } => source.clone(),
            };
            return Some(ResolvedSymbol::Function {
                module: reference.request.clone(),
                export,
            });
        }

        let path = self.processor.resolve_request(&meta.path, &reference.request)?;
        let target = self.processor.process_file(&path).ok()?;
        let symbol = match &reference.kind {
            ImportKind::Default => target.symbols.get("root"),
            ImportKind::Named { source } => target.symbols.get(source),
            ImportKind::Keyframes { .. } => None,
        }?;
        Some(ResolvedSymbol::Css(CssResolved {
            symbol: symbol.clone(),
            meta: target,
        }))
    }
}
