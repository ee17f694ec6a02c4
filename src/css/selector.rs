//! Selector parsing into a flat part list.
//!
//! The scoping passes rewrite selectors by splicing parts in place, so the
//! model is deliberately flat: a selector is a sequence of simple selectors
//! and combinators, not a tree. Functional pseudo-classes that accept
//! selectors (`:is`, `:not`, `:where`, `:has`) recurse; anything else keeps
//! its argument text raw.

use std::fmt;

use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

impl Combinator {
    fn as_str(&self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => " > ",
            Combinator::Adjacent => " + ",
            Combinator::Sibling => " ~ ",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PseudoArg {
    /// Nested selectors, for `:is()`-style pseudo-classes.
    Selectors(SelectorList),
    /// Verbatim argument text, for `:nth-child(2n+1)` and friends.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    /// Element selector (`Button`, `div`).
    Type(SmolStr),
    Universal,
    Class(SmolStr),
    Id(SmolStr),
    /// Raw text between `[` and `]`.
    Attribute(String),
    PseudoClass { name: SmolStr, arg: Option<PseudoArg> },
    PseudoElement(SmolStr),
    /// The `&` placeholder.
    Nesting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectorPart {
    Combinator(Combinator),
    Simple(SimpleSelector),
}

/// One complex selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    pub fn from_parts(parts: Vec<SelectorPart>) -> Self {
        Self { parts }
    }
}

/// A comma-separated selector list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                SelectorPart::Combinator(c) => f.write_str(c.as_str())?,
                SelectorPart::Simple(simple) => write!(f, "{simple}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleSelector::Type(name) => f.write_str(name),
            SimpleSelector::Universal => f.write_str("*"),
            SimpleSelector::Class(name) => write!(f, ".{name}"),
            SimpleSelector::Id(name) => write!(f, "#{name}"),
            SimpleSelector::Attribute(raw) => write!(f, "[{raw}]"),
            SimpleSelector::PseudoClass { name, arg } => {
                write!(f, ":{name}")?;
                match arg {
                    Some(PseudoArg::Selectors(list)) => write!(f, "({list})"),
                    Some(PseudoArg::Raw(raw)) => write!(f, "({raw})"),
                    None => Ok(()),
                }
            }
            SimpleSelector::PseudoElement(name) => write!(f, "::{name}"),
            SimpleSelector::Nesting => f.write_str("&"),
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

/// Pseudo-classes whose argument is itself a selector list.
fn takes_selector_arg(name: &str) -> bool {
    matches!(name, "is" | "not" | "where" | "has" | "matches")
}

/// Parse a comma-separated selector list.
pub fn parse_selector_list(input: &str) -> SelectorList {
    let mut scanner = SelectorScanner { chars: input.chars().peekable() };
    scanner.list(true)
}

struct SelectorScanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl SelectorScanner<'_> {
    fn list(&mut self, top_level: bool) -> SelectorList {
        let mut selectors = Vec::new();
        loop {
            let (selector, terminator) = self.selector(top_level);
            if !selector.parts.is_empty() {
                selectors.push(selector);
            }
            if terminator != Some(',') {
                break;
            }
        }
        SelectorList { selectors }
    }

    /// Returns the parsed selector and the character that ended it (`,`,
    /// `)`, or none at end of input).
    fn selector(&mut self, top_level: bool) -> (Selector, Option<char>) {
        let mut parts: Vec<SelectorPart> = Vec::new();
        let mut pending: Option<Combinator> = None;
        let mut terminator = None;

        while let Some(&ch) = self.chars.peek() {
            match ch {
                ',' => {
                    self.chars.next();
                    terminator = Some(',');
                    break;
                }
                ')' if !top_level => {
                    self.chars.next();
                    terminator = Some(')');
                    break;
                }
                c if c.is_whitespace() => {
                    self.chars.next();
                    if !parts.is_empty() && pending.is_none() {
                        pending = Some(Combinator::Descendant);
                    }
                }
                '>' | '+' | '~' => {
                    self.chars.next();
                    pending = Some(match ch {
                        '>' => Combinator::Child,
                        '+' => Combinator::Adjacent,
                        _ => Combinator::Sibling,
                    });
                }
                _ => {
                    let simple = self.simple(ch);
                    if let Some(combinator) = pending.take() {
                        if !parts.is_empty() {
                            parts.push(SelectorPart::Combinator(combinator));
                        }
                    }
                    parts.push(SelectorPart::Simple(simple));
                }
            }
        }
        (Selector { parts }, terminator)
    }

    fn simple(&mut self, ch: char) -> SimpleSelector {
        match ch {
            '*' => {
                self.chars.next();
                SimpleSelector::Universal
            }
            '&' => {
                self.chars.next();
                SimpleSelector::Nesting
            }
            '.' => {
                self.chars.next();
                SimpleSelector::Class(self.name())
            }
            '#' => {
                self.chars.next();
                SimpleSelector::Id(self.name())
            }
            '[' => {
                self.chars.next();
                let mut raw = String::new();
                for c in self.chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    raw.push(c);
                }
                SimpleSelector::Attribute(raw)
            }
            ':' => {
                self.chars.next();
                if self.chars.peek().is_some_and(|&c| c == ':') {
                    self.chars.next();
                    return SimpleSelector::PseudoElement(self.name());
                }
                let name = self.name();
                let arg = if self.chars.peek().is_some_and(|&c| c == '(') {
                    self.chars.next();
                    if takes_selector_arg(&name) {
                        Some(PseudoArg::Selectors(self.list(false)))
                    } else {
                        Some(PseudoArg::Raw(self.raw_until_close()))
                    }
                } else {
                    None
                };
                SimpleSelector::PseudoClass { name, arg }
            }
            _ => SimpleSelector::Type(self.name()),
        }
    }

    /// A CSS name: letters, digits, `-`, `_`, `%` (keyframe offsets), and
    /// any non-ascii.
    fn name(&mut self) -> SmolStr {
        let mut out = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '%') || !ch.is_ascii() {
                out.push(ch);
                self.chars.next();
            } else {
                break;
            }
        }
        SmolStr::new(out)
    }

    /// Balanced raw scan for non-selector pseudo-class arguments.
    fn raw_until_close(&mut self) -> String {
        let mut raw = String::new();
        let mut depth = 0u32;
        while let Some(ch) = self.chars.next() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            raw.push(ch);
        }
        raw
    }
}
