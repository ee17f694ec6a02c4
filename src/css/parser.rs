//! Error-tolerant recursive descent parser over the token stream.
//!
//! The parser slices the raw source for selectors and declaration values, so
//! any text the lexer cannot classify still lands in the tree verbatim.
//! Malformed constructs produce a [`DiagnosticCode::ParseError`] and the
//! parser resynchronizes at the next `;` or `}`.

use text_size::TextSize;

use crate::css::ast::{AtRule, Declaration, Node, Rule, Stylesheet};
use crate::css::lexer::{Token, TokenKind, tokenize};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};

/// Parse a full stylesheet. Never fails: broken input yields a partial tree
/// plus diagnostics.
pub fn parse(source: &str) -> (Stylesheet, Diagnostics) {
    let tokens = tokenize(source);
    let mut parser = Parser { source, tokens, pos: 0, diagnostics: Diagnostics::new() };
    let nodes = parser.parse_nodes(true);
    (Stylesheet { nodes }, parser.diagnostics)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    diagnostics: Diagnostics,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|t| t.kind == TokenKind::Whitespace) {
            self.pos += 1;
        }
    }

    fn error(&mut self, message: impl Into<String>, offset: TextSize) {
        self.diagnostics.push(Diagnostic::error(DiagnosticCode::ParseError, message).at(offset));
    }

    /// Rules and at-rules. Used for the top level and for conditional
    /// at-rule bodies; a trailing `}` closes the list when `top_level` is
    /// false.
    fn parse_nodes(&mut self, top_level: bool) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            self.skip_ws();
            let Some(token) = self.peek() else { break };
            match token.kind {
                TokenKind::RBrace => {
                    if top_level {
                        let offset = token.offset;
                        self.error("unexpected `}`", offset);
                        self.pos += 1;
                        continue;
                    }
                    self.pos += 1;
                    break;
                }
                TokenKind::Comment => {
                    let text = token.text.to_string();
                    self.pos += 1;
                    nodes.push(Node::Comment(text));
                }
                TokenKind::AtKeyword => {
                    if let Some(at) = self.parse_at_rule() {
                        nodes.push(Node::AtRule(at));
                    }
                }
                TokenKind::Semicolon => {
                    // Stray semicolons are tolerated.
                    self.pos += 1;
                }
                _ => {
                    if let Some(rule) = self.parse_rule() {
                        nodes.push(Node::Rule(rule));
                    }
                }
            }
        }
        nodes
    }

    fn parse_rule(&mut self) -> Option<Rule> {
        let start = self.peek()?.offset;
        let selector = self.selector_text_until_brace();
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::LBrace) => {
                self.pos += 1;
                let nodes = self.parse_declarations();
                if selector.is_empty() {
                    self.error("rule is missing a selector", start);
                    return None;
                }
                Some(Rule { selector, nodes, offset: start })
            }
            _ => {
                self.error("expected `{` after selector", start);
                self.recover_statement();
                None
            }
        }
    }

    /// Collect selector text until `{`, `;`, `}` or end of input, collapsing
    /// whitespace runs and dropping comments.
    fn selector_text_until_brace(&mut self) -> String {
        let mut out = String::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semicolon => break,
                TokenKind::Whitespace => {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    self.pos += 1;
                }
                TokenKind::Comment => {
                    self.pos += 1;
                }
                _ => {
                    out.push_str(token.text);
                    self.pos += 1;
                }
            }
        }
        out.trim().to_string()
    }

    fn parse_at_rule(&mut self) -> Option<AtRule> {
        let token = self.bump()?;
        let offset = token.offset;
        let name = smol_str::SmolStr::new(&token.text[1..]);

        // Params run until `{`, `;` or `}`; parens may nest freely.
        let mut depth = 0u32;
        let mut start = None;
        let mut end = offset;
        while let Some(next) = self.peek() {
            match next.kind {
                TokenKind::LBrace | TokenKind::Semicolon | TokenKind::RBrace if depth == 0 => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            if !next.is_trivia() {
                start.get_or_insert(next.offset);
                end = next.end();
            }
            self.pos += 1;
        }
        let params = match start {
            Some(start) => self.source[usize::from(start)..usize::from(end)].to_string(),
            None => String::new(),
        };

        let body = match self.peek().map(|t| t.kind) {
            Some(TokenKind::LBrace) => {
                self.pos += 1;
                if block_holds_rules(&name) {
                    Some(self.parse_nodes(false))
                } else {
                    Some(self.parse_declarations())
                }
            }
            Some(TokenKind::Semicolon) => {
                self.pos += 1;
                None
            }
            _ => None,
        };

        Some(AtRule { name, params, body, offset })
    }

    /// Declarations and comments inside a rule body, up to the closing `}`.
    fn parse_declarations(&mut self) -> Vec<Node> {
        let mut nodes = Vec::new();
        loop {
            self.skip_ws();
            let Some(token) = self.peek() else { break };
            match token.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Comment => {
                    let text = token.text.to_string();
                    self.pos += 1;
                    nodes.push(Node::Comment(text));
                }
                TokenKind::Semicolon => {
                    self.pos += 1;
                }
                TokenKind::Ident => {
                    if let Some(decl) = self.parse_declaration() {
                        nodes.push(Node::Decl(decl));
                    }
                }
                _ => {
                    let offset = token.offset;
                    self.error(format!("unexpected `{}` in declaration block", token.text), offset);
                    self.recover_statement();
                }
            }
        }
        nodes
    }

    fn parse_declaration(&mut self) -> Option<Declaration> {
        let prop_token = self.bump()?;
        let offset = prop_token.offset;
        let prop = smol_str::SmolStr::new(prop_token.text);

        self.skip_ws();
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Colon) => {
                self.pos += 1;
            }
            _ => {
                self.error(format!("expected `:` after `{prop}`"), offset);
                self.recover_statement();
                return None;
            }
        }

        // Value runs to the first top-level `;` or the closing `}`;
        // semicolons inside parens (data URLs) do not terminate it.
        let mut depth = 0u32;
        let mut start = None;
        let mut end = offset;
        while let Some(next) = self.peek() {
            match next.kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.pos += 1;
                    break;
                }
                TokenKind::RBrace if depth == 0 => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            if !next.is_trivia() {
                start.get_or_insert(next.offset);
                end = next.end();
            }
            self.pos += 1;
        }

        let raw = match start {
            Some(start) => self.source[usize::from(start)..usize::from(end)].trim(),
            None => "",
        };
        let (value, important) = split_important(raw);
        if value.is_empty() {
            self.error(format!("declaration `{prop}` has no value"), offset);
            return None;
        }
        Some(Declaration { prop, value, important, offset })
    }

    /// Skip ahead to just past the next `;`, or stop before `}`/EOF.
    fn recover_statement(&mut self) {
        let mut depth = 0u32;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.pos += 1;
                    return;
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::LBrace | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
    }
}

/// At-rules whose block nests rules rather than declarations.
fn block_holds_rules(name: &str) -> bool {
    matches!(name, "media" | "supports" | "keyframes" | "-webkit-keyframes" | "st-scope")
}

fn split_important(raw: &str) -> (String, bool) {
    let trimmed = raw.trim_end();
    if let Some(stripped) = trimmed.strip_suffix("important") {
        let stripped = stripped.trim_end();
        if let Some(value) = stripped.strip_suffix('!') {
            return (value.trim_end().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}
