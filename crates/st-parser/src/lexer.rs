use st_core::{SigTableError, SourceLocation, SourceSpan};

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(String),
    String(String),
    Char,
    Keyword(Keyword),
    Symbol(Symbol),
    Operator(&'static str),
    Eof,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Dot,
    Ellipsis,
    Star,
    Arrow,
    Tilde,
    Pipe,
    Assign,
}

#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

// Longest first so that maximal munch picks the right operator.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "&&", "||", "++", "--", "==", "!=", "<=", ">=", ":=", "<<", ">>",
    "&^", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "+", "-", "/", "%", "&", "^", "<",
    ">", "!",
];

pub struct Lexer<'a> {
    bytes: &'a [u8],
    idx: usize,
    line: usize,
    col: usize,
    prev_can_insert_semi: bool,
    pending_semi: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            bytes: src.as_bytes(),
            idx: 0,
            line: 1,
            col: 1,
            prev_can_insert_semi: false,
            pending_semi: false,
        }
    }

    pub fn lex_all(mut self) -> Result<Vec<Token>, SigTableError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn location(&self) -> SourceLocation {
        SourceLocation {
            line: self.line,
            column: self.col,
        }
    }

    fn semi_token(&self) -> Token {
        Token {
            kind: TokenKind::Symbol(Symbol::Semi),
            location: self.location(),
        }
    }

    fn next_token(&mut self) -> Result<Token, SigTableError> {
        if self.pending_semi {
            self.pending_semi = false;
            return Ok(self.semi_token());
        }
        self.skip_whitespace_and_comments()?;
        if self.pending_semi {
            self.pending_semi = false;
            return Ok(self.semi_token());
        }
        let location = self.location();
        if self.idx >= self.bytes.len() {
            // A final newline is implied at end of input.
            if self.prev_can_insert_semi {
                self.prev_can_insert_semi = false;
                return Ok(self.semi_token());
            }
            return Ok(Token {
                kind: TokenKind::Eof,
                location,
            });
        }

        let ch = self.peek_char();
        let kind = if is_ident_start(ch) {
            let ident = self.read_while(is_ident_continue);
            keyword(&ident).map_or(TokenKind::Ident(ident), TokenKind::Keyword)
        } else if ch.is_ascii_digit() || (ch == '.' && self.peek_next_char().is_ascii_digit()) {
            TokenKind::Number(self.read_number())
        } else {
            match ch {
                '"' => TokenKind::String(self.read_interpreted_string(&location)?),
                '`' => TokenKind::String(self.read_raw_string(&location)?),
                '\'' => {
                    self.read_char_lit(&location)?;
                    TokenKind::Char
                }
                _ => self.read_punctuation(ch, &location)?,
            }
        };
        self.prev_can_insert_semi = can_insert_semi_after(&kind);
        Ok(Token { kind, location })
    }

    fn read_punctuation(
        &mut self,
        ch: char,
        location: &SourceLocation,
    ) -> Result<TokenKind, SigTableError> {
        if ch == '.' && self.starts_with("...") {
            self.advance_n(3);
            return Ok(TokenKind::Symbol(Symbol::Ellipsis));
        }
        if self.starts_with("<-") {
            self.advance_n(2);
            return Ok(TokenKind::Symbol(Symbol::Arrow));
        }
        let symbol = match ch {
            '(' => Some(Symbol::LParen),
            ')' => Some(Symbol::RParen),
            '{' => Some(Symbol::LBrace),
            '}' => Some(Symbol::RBrace),
            '[' => Some(Symbol::LBracket),
            ']' => Some(Symbol::RBracket),
            ',' => Some(Symbol::Comma),
            ';' => Some(Symbol::Semi),
            '.' => Some(Symbol::Dot),
            '~' => Some(Symbol::Tilde),
            ':' if !self.starts_with(":=") => Some(Symbol::Colon),
            '*' if !self.starts_with("*=") => Some(Symbol::Star),
            '|' if !self.starts_with("||") && !self.starts_with("|=") => Some(Symbol::Pipe),
            '=' if !self.starts_with("==") => Some(Symbol::Assign),
            _ => None,
        };
        if let Some(symbol) = symbol {
            self.advance();
            return Ok(TokenKind::Symbol(symbol));
        }
        if let Some(op) = OPERATORS.iter().copied().find(|op| self.starts_with(op)) {
            self.advance_n(op.len());
            return Ok(TokenKind::Operator(op));
        }
        Err(SigTableError::with_span(
            "GO_PARSE_ERROR",
            format!("Unexpected character '{}'.", ch),
            span_at(location),
        ))
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), SigTableError> {
        loop {
            if self.idx >= self.bytes.len() {
                return Ok(());
            }
            match self.peek_char() {
                ' ' | '\t' | '\r' => self.advance(),
                '\n' => {
                    self.advance();
                    if self.prev_can_insert_semi {
                        self.prev_can_insert_semi = false;
                        self.pending_semi = true;
                        return Ok(());
                    }
                }
                '/' if self.peek_next_char() == '/' => {
                    while self.idx < self.bytes.len() && self.peek_char() != '\n' {
                        self.advance();
                    }
                }
                '/' if self.peek_next_char() == '*' => {
                    let start = self.location();
                    self.advance_n(2);
                    let mut saw_newline = false;
                    loop {
                        if self.idx >= self.bytes.len() {
                            return Err(SigTableError::with_span(
                                "GO_PARSE_ERROR",
                                "Unterminated block comment.",
                                span_at(&start),
                            ));
                        }
                        if self.starts_with("*/") {
                            self.advance_n(2);
                            break;
                        }
                        if self.peek_char() == '\n' {
                            saw_newline = true;
                        }
                        self.advance();
                    }
                    // A general comment spanning lines acts like a newline.
                    if saw_newline && self.prev_can_insert_semi {
                        self.prev_can_insert_semi = false;
                        self.pending_semi = true;
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_interpreted_string(
        &mut self,
        start: &SourceLocation,
    ) -> Result<String, SigTableError> {
        self.advance();
        let begin = self.idx;
        loop {
            if self.idx >= self.bytes.len() || self.peek_char() == '\n' {
                return Err(SigTableError::with_span(
                    "GO_PARSE_ERROR",
                    "Unterminated string literal.",
                    span_at(start),
                ));
            }
            match self.peek_char() {
                '\\' => self.advance_n(2),
                '"' => break,
                _ => self.advance(),
            }
        }
        let value = String::from_utf8_lossy(&self.bytes[begin..self.idx]).to_string();
        self.advance();
        Ok(value)
    }

    fn read_raw_string(&mut self, start: &SourceLocation) -> Result<String, SigTableError> {
        self.advance();
        let begin = self.idx;
        while self.idx < self.bytes.len() && self.peek_char() != '`' {
            self.advance();
        }
        if self.idx >= self.bytes.len() {
            return Err(SigTableError::with_span(
                "GO_PARSE_ERROR",
                "Unterminated raw string literal.",
                span_at(start),
            ));
        }
        let value = String::from_utf8_lossy(&self.bytes[begin..self.idx]).to_string();
        self.advance();
        Ok(value)
    }

    fn read_char_lit(&mut self, start: &SourceLocation) -> Result<(), SigTableError> {
        self.advance();
        loop {
            if self.idx >= self.bytes.len() || self.peek_char() == '\n' {
                return Err(SigTableError::with_span(
                    "GO_PARSE_ERROR",
                    "Unterminated rune literal.",
                    span_at(start),
                ));
            }
            match self.peek_char() {
                '\\' => self.advance_n(2),
                '\'' => {
                    self.advance();
                    return Ok(());
                }
                _ => self.advance(),
            }
        }
    }

    fn read_number(&mut self) -> String {
        let begin = self.idx;
        while self.idx < self.bytes.len() {
            let ch = self.peek_char();
            let prev = self.bytes[self.idx.saturating_sub(1)];
            let exponent_sign = (ch == '+' || ch == '-')
                && self.idx > begin
                && ((matches!(prev, b'e' | b'E') && !is_hex_literal(&self.bytes[begin..self.idx]))
                    || matches!(prev, b'p' | b'P'));
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                self.advance();
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.bytes[begin..self.idx]).to_string()
    }

    fn read_while(&mut self, predicate: fn(char) -> bool) -> String {
        let begin = self.idx;
        while self.idx < self.bytes.len() && predicate(self.peek_char()) {
            self.advance();
        }
        String::from_utf8_lossy(&self.bytes[begin..self.idx]).to_string()
    }

    fn starts_with(&self, text: &str) -> bool {
        self.bytes[self.idx..].starts_with(text.as_bytes())
    }

    fn peek_char(&self) -> char {
        self.char_at(self.idx)
    }

    fn peek_next_char(&self) -> char {
        let width = utf8_width(self.bytes[self.idx]);
        self.char_at(self.idx + width)
    }

    fn char_at(&self, idx: usize) -> char {
        if idx >= self.bytes.len() {
            return '\0';
        }
        let width = utf8_width(self.bytes[idx]).min(self.bytes.len() - idx);
        std::str::from_utf8(&self.bytes[idx..idx + width])
            .ok()
            .and_then(|text| text.chars().next())
            .unwrap_or('\u{fffd}')
    }

    fn advance(&mut self) {
        if self.idx >= self.bytes.len() {
            return;
        }
        let byte = self.bytes[self.idx];
        self.idx = (self.idx + utf8_width(byte)).min(self.bytes.len());
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }

    fn advance_n(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }
}

fn span_at(location: &SourceLocation) -> SourceSpan {
    SourceSpan::point(location.line, location.column)
}

fn utf8_width(byte: u8) -> usize {
    match byte {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    }
}

fn is_hex_literal(prefix: &[u8]) -> bool {
    prefix.len() > 1 && prefix[0] == b'0' && matches!(prefix[1], b'x' | b'X')
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn keyword(ident: &str) -> Option<Keyword> {
    let keyword = match ident {
        "break" => Keyword::Break,
        "case" => Keyword::Case,
        "chan" => Keyword::Chan,
        "const" => Keyword::Const,
        "continue" => Keyword::Continue,
        "default" => Keyword::Default,
        "defer" => Keyword::Defer,
        "else" => Keyword::Else,
        "fallthrough" => Keyword::Fallthrough,
        "for" => Keyword::For,
        "func" => Keyword::Func,
        "go" => Keyword::Go,
        "goto" => Keyword::Goto,
        "if" => Keyword::If,
        "import" => Keyword::Import,
        "interface" => Keyword::Interface,
        "map" => Keyword::Map,
        "package" => Keyword::Package,
        "range" => Keyword::Range,
        "return" => Keyword::Return,
        "select" => Keyword::Select,
        "struct" => Keyword::Struct,
        "switch" => Keyword::Switch,
        "type" => Keyword::Type,
        "var" => Keyword::Var,
        _ => return None,
    };
    Some(keyword)
}

fn can_insert_semi_after(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Ident(_) | TokenKind::Number(_) | TokenKind::String(_) | TokenKind::Char => {
            true
        }
        TokenKind::Keyword(keyword) => matches!(
            keyword,
            Keyword::Break | Keyword::Continue | Keyword::Fallthrough | Keyword::Return
        ),
        TokenKind::Symbol(symbol) => matches!(
            symbol,
            Symbol::RParen | Symbol::RBracket | Symbol::RBrace
        ),
        TokenKind::Operator(op) => matches!(*op, "++" | "--"),
        TokenKind::Eof => false,
    }
}
