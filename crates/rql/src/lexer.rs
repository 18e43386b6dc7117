//! Query lexer (tokenizer).
//!
//! Produces tokens lazily from a query string. The parser pulls one token at a time through
//! [`Lexer::next_token`]; [`tokenize`] collects the whole stream for inspection and tests.

use std::{fmt, iter::Peekable, str::Chars};

use crate::error::LexError;

/// A recognized operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `eq`
    Eq,
    /// `ne`
    Ne,
    /// `lt`
    Lt,
    /// `gt`
    Gt,
    /// `lte`
    Lte,
    /// `gte`
    Gte,
    /// `in`
    In,
    /// `out`
    Out,
    /// `like`
    Like,
    /// `and`
    And,
    /// `or`
    Or,
    /// `sort`
    Sort,
    /// `limit`
    Limit,
}

/// Keyword table, shared read-only by every lexer.
static KEYWORDS: [(&str, Keyword); 13] = [
    ("eq", Keyword::Eq),
    ("ne", Keyword::Ne),
    ("lt", Keyword::Lt),
    ("gt", Keyword::Gt),
    ("lte", Keyword::Lte),
    ("gte", Keyword::Gte),
    ("in", Keyword::In),
    ("out", Keyword::Out),
    ("like", Keyword::Like),
    ("and", Keyword::And),
    ("or", Keyword::Or),
    ("sort", Keyword::Sort),
    ("limit", Keyword::Limit),
];

impl Keyword {
    /// Looks up a keyword, ignoring ASCII case.
    pub fn lookup(word: &str) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(word))
            .map(|(_, keyword)| *keyword)
    }

    /// Returns the canonical lowercase spelling.
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map_or("", |(name, _)| name)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End of input. Returned forever once the input is exhausted.
    Eof,
    /// A recognized operator keyword.
    Keyword(Keyword),
    /// Any other bare word.
    Identifier,
    /// An integer numeral.
    Integer,
    /// A numeral with a fraction or exponent.
    Float,
    /// A quoted literal (the quotes are stripped, content preserved).
    String,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `&`, separating top-level operations.
    Ampersand,
}

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The token text. Quoted strings hold their content without quotes.
    pub lexeme: String,
    /// Byte position of the token's first character.
    pub position: usize,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    /// Returns true if this token marks the end of input.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// Returns true for characters that may appear in a bare word.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
        || matches!(
            ch,
            '_' | '-' | '+' | '.' | '*' | ':' | '@' | '/' | '~' | '%' | '$'
        )
}

/// Classifies a complete bare word as a numeral, keyword or identifier.
pub fn classify_word(word: &str) -> TokenKind {
    if let Some(kind) = numeral_kind(word) {
        return kind;
    }
    match Keyword::lookup(word) {
        Some(keyword) => TokenKind::Keyword(keyword),
        None => TokenKind::Identifier,
    }
}

/// Returns `Integer` or `Float` if the word is a numeral.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional exponent.
fn numeral_kind(word: &str) -> Option<TokenKind> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let unsigned = word.strip_prefix(['+', '-']).unwrap_or(word);
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => (&unsigned[..idx], Some(&unsigned[idx + 1..])),
        None => (unsigned, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    if !whole.is_empty() && !all_digits(whole) {
        return None;
    }
    if fraction.is_some_and(|f| !f.is_empty() && !all_digits(f)) {
        return None;
    }
    if whole.is_empty() && !fraction.is_some_and(all_digits) {
        return None;
    }
    if let Some(exp) = exponent {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if !all_digits(exp) {
            return None;
        }
    }

    if fraction.is_some() || exponent.is_some() {
        Some(TokenKind::Float)
    } else {
        Some(TokenKind::Integer)
    }
}

/// Tokenizes a query string on demand.
pub struct Lexer<'a> {
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Returns the next token.
    ///
    /// Once the input is exhausted every call returns an [`TokenKind::Eof`] token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let start = self.position;
        let Some(&ch) = self.chars.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", start));
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '&' => TokenKind::Ampersand,
            '"' | '\'' => return self.read_string(ch),
            c if is_word_char(c) => return Ok(self.read_word()),
            other => {
                return Err(LexError::new(
                    format!("unexpected character '{other}'"),
                    start,
                ));
            }
        };

        self.advance();
        Ok(Token::new(kind, ch.to_string(), start))
    }

    /// Reads a quoted literal delimited by `quote`.
    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // opening quote

        let mut content = String::new();
        loop {
            match self.chars.peek() {
                Some(&ch) if ch == quote => {
                    self.advance();
                    return Ok(Token::new(TokenKind::String, content, start));
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => return Err(LexError::new("unclosed quote", start)),
            }
        }
    }

    /// Reads a bare word and classifies it.
    fn read_word(&mut self) -> Token {
        let start = self.position;
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if !is_word_char(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }

        Token::new(classify_word(&word), word, start)
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a whole query string, excluding the final end-of-input token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token()?;
        if token.is_eof() {
            return Ok(tokens);
        }
        tokens.push(token);
    }
}
