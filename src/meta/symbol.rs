//! Stylesheet symbols and the per-file symbol table.
//!
//! Every name a stylesheet declares or imports gets one entry: classes,
//! custom elements, vars, and imported bindings. Keyframes live in their own
//! namespace on the file meta, since an animation and a class may share a
//! name. Insertion order is preserved because exports are emitted in
//! declaration order.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// How an imported binding maps onto the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// `-st-default` / the bare name before `from`.
    Default,
    /// `-st-named` entry; `source` is the name in the source file, which
    /// differs from the local name under `as` renaming.
    Named { source: SmolStr },
    /// A named keyframes binding: `keyframes(source)`.
    Keyframes { source: SmolStr },
}

/// A single imported binding: the module request plus which export it picks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub request: String,
    pub kind: ImportKind,
}

/// A boolean state declared through `-st-states`.
pub type State = SmolStr;

/// One named entity in a stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Class {
        name: SmolStr,
        /// Name of another symbol in this table, from `-st-extends`.
        extends: Option<SmolStr>,
        states: Vec<State>,
        /// Set when the class name was introduced by an import and the
        /// local rule only aliases it. Cleared by a local `-st-extends`.
        alias: Option<ImportRef>,
    },
    Element {
        name: SmolStr,
        extends: Option<SmolStr>,
        alias: Option<ImportRef>,
    },
    Var {
        name: SmolStr,
        /// Raw declaration text; evaluated lazily during transform.
        value: String,
    },
    Import {
        name: SmolStr,
        reference: ImportRef,
    },
}

impl Symbol {
    pub fn name(&self) -> &SmolStr {
        match self {
            Symbol::Class { name, .. }
            | Symbol::Element { name, .. }
            | Symbol::Var { name, .. }
            | Symbol::Import { name, .. } => name,
        }
    }

    /// The import this symbol forwards to, if it is not locally owned:
    /// either an import binding or an alias class/element.
    pub fn import_ref(&self) -> Option<&ImportRef> {
        match self {
            Symbol::Import { reference, .. } => Some(reference),
            Symbol::Class { alias, .. } | Symbol::Element { alias, .. } => alias.as_ref(),
            _ => None,
        }
    }

    pub fn extends(&self) -> Option<&SmolStr> {
        match self {
            Symbol::Class { extends, .. } | Symbol::Element { extends, .. } => extends.as_ref(),
            _ => None,
        }
    }

    pub fn states(&self) -> &[State] {
        match self {
            Symbol::Class { states, .. } => states,
            _ => &[],
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Symbol::Class { .. })
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Symbol::Import { .. })
    }
}

/// Name-to-symbol map for one file, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: IndexMap<SmolStr, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Insert or replace.
    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.name().clone(), symbol);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &Symbol)> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Classes in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values().filter(|s| s.is_class())
    }

    /// Vars in declaration order.
    pub fn vars(&self) -> impl Iterator<Item = (&SmolStr, &str)> {
        self.symbols.values().filter_map(|s| match s {
            Symbol::Var { name, value } => Some((name, value.as_str())),
            _ => None,
        })
    }
}
