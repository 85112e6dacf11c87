//! Scanner for Solidity source text.
//!
//! Produces a flat token stream consumed by the declaration, statement and
//! expression parsers. The scanner never fails: byte sequences it cannot
//! classify become `Invalid` tokens which downstream stages degrade into
//! diagnostics. Comments are kept in the stream with their text so doc
//! comments can be re-emitted above the generated items.

/// Classification of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Number,
    HexNumber,
    StringLiteral,
    Operator,
    Punctuation,
    Comment,
    DocComment,
    Invalid,
}

/// One lexical token. `text` is the token's content: string literals are
/// stored without their quotes and comments without their delimiters.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Structural comparison used by the parsers. String literals and
    /// comments never match, so bracket counting cannot be thrown off by
    /// punctuation embedded in them.
    pub fn is(&self, text: &str) -> bool {
        self.text == text && !self.is_comment() && self.kind != TokenKind::StringLiteral
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::DocComment)
    }
}

/// Words the scanner classifies as keywords. Elementary type names
/// (`uint256`, `bytes32`, ...) stay identifiers; the converter recognizes
/// them by shape instead of by a fixed list.
const KEYWORDS: &[&str] = &[
    "abstract", "anonymous", "assembly", "assert", "break", "catch", "constant", "constructor",
    "continue", "contract", "delete", "do", "else", "emit", "enum", "event", "external",
    "fallback", "false", "for", "function", "if", "immutable", "import", "indexed", "interface",
    "internal", "is", "library", "mapping", "memory", "modifier", "new", "override", "payable",
    "pragma", "private", "public", "pure", "receive", "require", "return", "returns", "revert",
    "storage", "struct", "this", "true", "try", "type", "unchecked", "using", "view", "virtual",
    "while",
];

/// Multi-character operators first so maximal munch picks the longest match.
const OPERATORS: &[&str] = &[
    ">>=", "<<=", "**", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "&&", "||",
    "==", "!=", "<=", ">=", "<<", ">>", "=>", "+", "-", "*", "/", "%", "!", "=", "<", ">", "&",
    "|", "^", "~", "?",
];

const PUNCTUATION: &[char] = &['(', ')', '{', '}', '[', ']', ';', ',', '.', ':'];

/// Lazy, restartable token source over one file's text. Pure function of
/// the input: scanning has no side effects and two scans of the same text
/// yield the same stream.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let c = self.peek()?;
        let line = self.line;
        let column = self.column;

        let token = if c == '/' && self.peek_at(1) == Some('/') {
            self.scan_line_comment(line, column)
        } else if c == '/' && self.peek_at(1) == Some('*') {
            self.scan_block_comment(line, column)
        } else if c == '"' || c == '\'' {
            self.scan_string(c, line, column)
        } else if c.is_ascii_digit() {
            self.scan_number(line, column)
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            self.scan_identifier(line, column)
        } else if PUNCTUATION.contains(&c) {
            self.bump();
            Token {
                kind: TokenKind::Punctuation,
                text: c.to_string(),
                line,
                column,
            }
        } else if let Some(op) = self.scan_operator() {
            Token {
                kind: TokenKind::Operator,
                text: op,
                line,
                column,
            }
        } else {
            self.bump();
            Token {
                kind: TokenKind::Invalid,
                text: c.to_string(),
                line,
                column,
            }
        };
        Some(token)
    }

    fn scan_line_comment(&mut self, line: usize, column: usize) -> Token {
        // consume the leading slashes to decide doc vs plain
        self.bump();
        self.bump();
        let doc = self.peek() == Some('/') && self.peek_at(1) != Some('/');
        if doc {
            self.bump();
        }
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.bump();
        }
        Token {
            kind: if doc {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            },
            text: text.trim().to_owned(),
            line,
            column,
        }
    }

    fn scan_block_comment(&mut self, line: usize, column: usize) -> Token {
        self.bump();
        self.bump();
        let doc = self.peek() == Some('*') && self.peek_at(1) != Some('/');
        if doc {
            self.bump();
        }
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
                // unterminated comment: degrade to whatever was collected
                None => break,
            }
        }
        Token {
            kind: if doc {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            },
            text: text.trim().to_owned(),
            line,
            column,
        }
    }

    fn scan_string(&mut self, quote: char, line: usize, column: usize) -> Token {
        self.bump();
        let mut text = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        text.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    return Token {
                        kind: TokenKind::StringLiteral,
                        text,
                        line,
                        column,
                    };
                }
                Some('\n') | None => {
                    // unterminated literal, surface as invalid
                    return Token {
                        kind: TokenKind::Invalid,
                        text,
                        line,
                        column,
                    };
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        let hex = self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X'));
        if hex {
            text.push('0');
            self.bump();
            if let Some(marker) = self.bump() {
                text.push(marker);
            }
            while let Some(c) = self.peek() {
                if !c.is_ascii_hexdigit() && c != '_' {
                    break;
                }
                text.push(c);
                self.bump();
            }
            return Token {
                kind: TokenKind::HexNumber,
                text,
                line,
                column,
            };
        }
        // decimal run; also swallows exponent forms like 1e18
        while let Some(c) = self.peek() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            text.push(c);
            self.bump();
        }
        Token {
            kind: TokenKind::Number,
            text,
            line,
            column,
        }
    }

    fn scan_identifier(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if !c.is_alphanumeric() && c != '_' && c != '$' {
                break;
            }
            text.push(c);
            self.bump();
        }
        let kind = if KEYWORDS.contains(&text.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn scan_operator(&mut self) -> Option<String> {
        for op in OPERATORS {
            if self.matches_str(op) {
                for _ in 0..op.len() {
                    self.bump();
                }
                return Some((*op).to_owned());
            }
        }
        None
    }

    fn matches_str(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }
}

impl Iterator for Scanner {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Scans the whole input eagerly. The parsers work over a materialized
/// stream because declaration parsing needs lookahead and body spans.
pub fn tokenize(source: &str) -> Vec<Token> {
    Scanner::new(source).collect()
}

/// Reconstructs an approximation of the original source for a token span.
/// Used when a construct degrades to an "unsupported" placeholder so the
/// original intent survives as a comment in the output.
pub fn span_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut previous: Option<&str> = None;
    for token in tokens {
        if token.is_comment() {
            continue;
        }
        let glue_before = matches!(token.text.as_str(), ")" | "]" | ";" | "," | "." | "(" | "[");
        let glue_after = matches!(previous, Some("(") | Some("[") | Some(".") | Some("!"));
        if !out.is_empty() && !glue_before && !glue_after {
            out.push(' ');
        }
        match token.kind {
            TokenKind::StringLiteral => {
                out.push('"');
                out.push_str(&token.text);
                out.push('"');
            }
            _ => out.push_str(&token.text),
        }
        previous = Some(token.text.as_str());
    }
    out
}
