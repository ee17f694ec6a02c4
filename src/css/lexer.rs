//! Logos-based tokenizer for CSS source text.
//!
//! Whitespace and comments are produced as ordinary tokens; the parser
//! decides where they are significant (selectors and declaration values keep
//! their internal spacing).

use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// CSS token kinds. Idents cover custom properties and vendor-prefixed
/// directives (`-st-mixin`, `--x`); numbers carry their unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    Comment,
    Ident,
    AtKeyword,
    Hash,
    String,
    Number,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    Dot,
    Star,
    Gt,
    Plus,
    Tilde,
    Amp,
    Eq,
    Pipe,
    Caret,
    Dollar,
    Slash,
    Bang,
    Percent,
    Minus,
    Error,
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { inner: LogosToken::lexer(input), offset: 0 }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match result {
            Ok(token) => token.into(),
            Err(()) => TokenKind::Error,
        };
        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to TokenKind.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogosToken {
    #[regex(r"[ \t\r\n\u{0c}]+")]
    Whitespace,

    #[regex(r"/\*([^*]|\*[^/])*\*+/")]
    Comment,

    #[regex(r"-?-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    #[regex(r"@[a-zA-Z_-][a-zA-Z0-9_-]*")]
    AtKeyword,

    #[regex(r"#[a-zA-Z0-9_-]+")]
    Hash,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    String,

    #[regex(r"-?[0-9]+(\.[0-9]+)?(%|[a-zA-Z]+)?")]
    #[regex(r"-?\.[0-9]+(%|[a-zA-Z]+)?")]
    Number,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("=")]
    Eq,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("$")]
    Dollar,
    #[token("/")]
    Slash,
    #[token("!")]
    Bang,
    #[token("%")]
    Percent,
    #[token("-")]
    Minus,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::Comment => TokenKind::Comment,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::AtKeyword => TokenKind::AtKeyword,
            LogosToken::Hash => TokenKind::Hash,
            LogosToken::String => TokenKind::String,
            LogosToken::Number => TokenKind::Number,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::Semicolon => TokenKind::Semicolon,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::Star => TokenKind::Star,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::Plus => TokenKind::Plus,
            LogosToken::Tilde => TokenKind::Tilde,
            LogosToken::Amp => TokenKind::Amp,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::Pipe => TokenKind::Pipe,
            LogosToken::Caret => TokenKind::Caret,
            LogosToken::Dollar => TokenKind::Dollar,
            LogosToken::Slash => TokenKind::Slash,
            LogosToken::Bang => TokenKind::Bang,
            LogosToken::Percent => TokenKind::Percent,
            LogosToken::Minus => TokenKind::Minus,
        }
    }
}
