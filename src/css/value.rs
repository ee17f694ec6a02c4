//! Declaration value expressions.
//!
//! A small character scanner turns a value string into a flat node list with
//! nested function calls, which is what `value()` evaluation, mixin argument
//! binding, and typed value parsing all walk. `url()` contents are kept raw
//! because unquoted URLs are not otherwise tokenizable.

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// Bare word: idents, numbers with units, hex colors.
    Ident(String),
    /// Quoted string, stored without its quotes.
    Str { quote: char, text: String },
    /// `name(args)`.
    Function { name: String, args: Vec<ValueNode> },
    /// `url(raw)`.
    Url(String),
    /// A run of whitespace.
    Space,
    /// A divider character: `,` or `/`.
    Div(char),
}

/// Scan a value string into nodes. Never fails; unbalanced parens close at
/// end of input.
pub fn parse_value(input: &str) -> Vec<ValueNode> {
    let mut scanner = Scanner { chars: input.char_indices().peekable(), input };
    scanner.nodes(true)
}

struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl Scanner<'_> {
    fn nodes(&mut self, top_level: bool) -> Vec<ValueNode> {
        let mut out = Vec::new();
        while let Some(&(index, ch)) = self.chars.peek() {
            match ch {
                ')' if !top_level => {
                    self.chars.next();
                    break;
                }
                ')' => {
                    // Stray close paren at the top level: keep it as text.
                    self.chars.next();
                    out.push(ValueNode::Ident(")".to_string()));
                }
                c if c.is_whitespace() => {
                    while self.chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
                        self.chars.next();
                    }
                    out.push(ValueNode::Space);
                }
                ',' | '/' => {
                    self.chars.next();
                    out.push(ValueNode::Div(ch));
                }
                '"' | '\'' => {
                    self.chars.next();
                    out.push(self.string(ch));
                }
                _ => out.push(self.word(index)),
            }
        }
        out
    }

    fn string(&mut self, quote: char) -> ValueNode {
        let mut text = String::new();
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => {
                    text.push(ch);
                    if let Some((_, escaped)) = self.chars.next() {
                        text.push(escaped);
                    }
                }
                c if c == quote => break,
                c => text.push(c),
            }
        }
        ValueNode::Str { quote, text }
    }

    fn word(&mut self, start: usize) -> ValueNode {
        let mut end = start;
        while let Some(&(index, ch)) = self.chars.peek() {
            if ch.is_whitespace() || matches!(ch, ',' | '/' | '(' | ')' | '"' | '\'') {
                end = index;
                break;
            }
            self.chars.next();
            end = index + ch.len_utf8();
        }
        let word = &self.input[start..end];

        if self.chars.peek().is_some_and(|&(_, ch)| ch == '(') {
            self.chars.next();
            if word.eq_ignore_ascii_case("url") {
                return ValueNode::Url(self.raw_until_close());
            }
            let args = self.nodes(false);
            return ValueNode::Function { name: word.to_string(), args };
        }
        ValueNode::Ident(word.to_string())
    }

    fn raw_until_close(&mut self) -> String {
        let mut raw = String::new();
        for (_, ch) in self.chars.by_ref() {
            if ch == ')' {
                break;
            }
            raw.push(ch);
        }
        raw.trim().to_string()
    }
}

/// Serialize nodes back to value text.
pub fn stringify(nodes: &[ValueNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        stringify_node(node, &mut out);
    }
    out
}

fn stringify_node(node: &ValueNode, out: &mut String) {
    match node {
        ValueNode::Ident(text) => out.push_str(text),
        ValueNode::Str { quote, text } => {
            out.push(*quote);
            out.push_str(text);
            out.push(*quote);
        }
        ValueNode::Function { name, args } => {
            out.push_str(name);
            out.push('(');
            for arg in args {
                stringify_node(arg, out);
            }
            out.push(')');
        }
        ValueNode::Url(raw) => {
            out.push_str("url(");
            out.push_str(raw);
            out.push(')');
        }
        ValueNode::Space => out.push(' '),
        ValueNode::Div(ch) => out.push(*ch),
    }
}

/// Split a node list on top-level commas, trimming surrounding whitespace
/// from each group. Empty groups are dropped.
pub fn split_comma(nodes: &[ValueNode]) -> Vec<Vec<ValueNode>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for node in nodes {
        match node {
            ValueNode::Div(',') => {
                push_group(&mut groups, std::mem::take(&mut current));
            }
            other => current.push(other.clone()),
        }
    }
    push_group(&mut groups, current);
    groups
}

fn push_group(groups: &mut Vec<Vec<ValueNode>>, mut group: Vec<ValueNode>) {
    while group.first() == Some(&ValueNode::Space) {
        group.remove(0);
    }
    while group.last() == Some(&ValueNode::Space) {
        group.pop();
    }
    if !group.is_empty() {
        groups.push(group);
    }
}

/// Parse `name value` pairs from a comma-separated argument list, as used by
/// parameterized mixin calls. Each group must start with an ident followed
/// by at least one value node.
pub fn parse_named_args(args: &[ValueNode]) -> Result<Vec<(SmolStr, String)>, String> {
    let mut pairs = Vec::new();
    for group in split_comma(args) {
        let Some((ValueNode::Ident(name), rest)) = group.split_first() else {
            return Err(format!("invalid named argument `{}`", stringify(&group)));
        };
        let value = stringify(rest).trim().to_string();
        if value.is_empty() {
            return Err(format!("named argument `{name}` is missing a value"));
        }
        pairs.push((SmolStr::new(name), value));
    }
    Ok(pairs)
}

/// Strip one layer of matching quotes, if present.
pub fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}
