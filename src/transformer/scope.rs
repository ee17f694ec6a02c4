//! Selector scoping.
//!
//! Classes become `.{namespace}__{name}` in the namespace of the file that
//! declares them, custom elements collapse to their origin root class,
//! declared states become `.{namespace}--{state}`, and custom
//! pseudo-elements reach into the anchor's inheritance chain. Native CSS
//! constructs pass through untouched.

use smol_str::SmolStr;

use crate::css::selector::{
    Combinator, PseudoArg, SelectorList, SelectorPart, SimpleSelector,
};
use crate::meta::Symbol;
use crate::resolver::CssResolved;
use crate::transformer::{RuleCtx, StyleTransformer};

impl StyleTransformer<'_> {
    pub(crate) fn scope_selector_list(&mut self, ctx: &RuleCtx<'_>, list: &mut SelectorList) {
        for selector in &mut list.selectors {
            self.scope_parts(ctx, &mut selector.parts);
        }
    }

    fn scope_parts(&mut self, ctx: &RuleCtx<'_>, parts: &mut Vec<SelectorPart>) {
        let resolver = self.resolver();
        // The anchor is the inheritance chain of the most recent class or
        // element; states and pseudo-elements resolve against it.
        let mut anchor: Vec<CssResolved> = resolver.resolve_extends(ctx.meta, "root");

        let mut i = 0;
        while i < parts.len() {
            let part = parts[i].clone();
            match part {
                SelectorPart::Simple(SimpleSelector::Class(name)) => {
                    parts[i] =
                        SelectorPart::Simple(SimpleSelector::Class(self.scope_class(ctx, &name)));
                    anchor = resolver.resolve_extends(ctx.meta, &name);
                }
                SelectorPart::Simple(SimpleSelector::Type(name)) => {
                    if let Some(scoped) = self.scope_element(ctx, &name) {
                        parts[i] = SelectorPart::Simple(SimpleSelector::Class(scoped));
                    }
                    anchor = resolver.resolve_extends(ctx.meta, &name);
                }
                SelectorPart::Simple(SimpleSelector::Nesting) => {
                    anchor = resolver.resolve_extends(ctx.meta, ctx.nesting_anchor);
                }
                SelectorPart::Simple(SimpleSelector::PseudoClass { name, arg }) => match arg {
                    Some(PseudoArg::Selectors(mut inner)) => {
                        self.scope_selector_list(ctx, &mut inner);
                        parts[i] = SelectorPart::Simple(SimpleSelector::PseudoClass {
                            name,
                            arg: Some(PseudoArg::Selectors(inner)),
                        });
                    }
                    Some(PseudoArg::Raw(_)) => {}
                    None => {
                        if let Some(entry) =
                            anchor.iter().find(|entry| entry.symbol.states().contains(&name))
                        {
                            let scoped = entry.meta.scoped_state(&name);
                            parts[i] =
                                SelectorPart::Simple(SimpleSelector::Class(SmolStr::new(scoped)));
                        }
                    }
                },
                SelectorPart::Simple(SimpleSelector::PseudoElement(name)) => {
                    // Skip the anchor's own entry: a pseudo-element names a
                    // part of what it extends, not of itself.
                    let found = anchor.iter().skip(1).find_map(|entry| {
                        entry
                            .meta
                            .symbols
                            .get(&name)
                            .filter(|symbol| symbol.is_class())
                            .map(|_| entry.meta.clone())
                    });
                    if let Some(part_meta) = found {
                        let scoped = SmolStr::new(part_meta.scoped_class(&name));
                        parts.splice(
                            i..=i,
                            [
                                SelectorPart::Combinator(Combinator::Descendant),
                                SelectorPart::Simple(SimpleSelector::Class(scoped)),
                            ],
                        );
                        anchor = resolver.resolve_extends(&part_meta, &name);
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }

    /// A class resolves to its origin namespace when it aliases an import,
    /// and to the local namespace otherwise.
    fn scope_class(&mut self, ctx: &RuleCtx<'_>, name: &str) -> SmolStr {
        if let Some(symbol) = ctx.meta.symbols.get(name) {
            if symbol.import_ref().is_some() && symbol.extends().is_none() {
                if let Some(origin) = self.resolver().resolve_symbol_origin(ctx.meta, symbol) {
                    if matches!(origin.symbol, Symbol::Class { .. }) {
                        return SmolStr::new(origin.meta.scoped_class(origin.symbol.name()));
                    }
                }
            }
        }
        SmolStr::new(ctx.meta.scoped_class(name))
    }

    /// A custom element known to the file collapses to the class that
    /// declares it; plain tags return `None` and stay as written.
    fn scope_element(&mut self, ctx: &RuleCtx<'_>, name: &str) -> Option<SmolStr> {
        let symbol = ctx.meta.symbols.get(name)?;
        if !matches!(symbol, Symbol::Element { .. } | Symbol::Import { .. }) {
            return None;
        }
        let origin = self.resolver().resolve_symbol_origin(ctx.meta, symbol)?;
        match origin.symbol {
            Symbol::Class { .. } => {
                Some(SmolStr::new(origin.meta.scoped_class(origin.symbol.name())))
            }
            _ => None,
        }
    }
}
