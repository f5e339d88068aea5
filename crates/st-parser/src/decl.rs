use st_core::{ChanDir, SigTableError, SourceSpan};

use crate::ast::*;
use crate::lexer::{Keyword, Lexer, Symbol, Token, TokenKind};

pub fn parse_go_file(file_name: &str, source: &str) -> Result<GoFile, SigTableError> {
    let tokens = Lexer::new(source).lex_all().map_err(|error| {
        SigTableError {
            message: format!("{}: {}", file_name, error.message),
            ..error
        }
    })?;
    DeclParser {
        tokens,
        pos: 0,
        file_name,
    }
    .parse_file()
}

enum ParamEntry {
    Ambiguous(String),
    Named(String, TypeExpr, bool),
    Unnamed(TypeExpr, bool),
}

struct DeclParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file_name: &'a str,
}

impl DeclParser<'_> {
    fn parse_file(mut self) -> Result<GoFile, SigTableError> {
        self.skip_semis();
        if !self.peek().is_keyword(Keyword::Package) {
            return Err(self.error("expected package clause"));
        }
        self.advance();
        let package = self.expect_ident()?;

        let mut file = GoFile {
            package,
            imports: Vec::new(),
            types: Vec::new(),
            consts: Vec::new(),
        };

        loop {
            match &self.peek().kind {
                TokenKind::Eof => break,
                TokenKind::Symbol(Symbol::Semi) => {
                    self.advance();
                }
                TokenKind::Keyword(Keyword::Import) => {
                    self.advance();
                    self.parse_import_decl(&mut file.imports)?;
                }
                TokenKind::Keyword(Keyword::Type) => {
                    self.advance();
                    self.parse_type_decl(&mut file.types)?;
                }
                TokenKind::Keyword(Keyword::Const) => {
                    self.advance();
                    self.parse_const_decl(&mut file.consts)?;
                }
                TokenKind::Keyword(Keyword::Func) | TokenKind::Keyword(Keyword::Var) => {
                    self.skip_declaration()?;
                }
                _ => return Err(self.error("expected top-level declaration")),
            }
        }

        Ok(file)
    }

    fn parse_import_decl(&mut self, out: &mut Vec<ImportSpec>) -> Result<(), SigTableError> {
        if !self.eat_symbol(Symbol::LParen) {
            out.push(self.parse_import_spec()?);
            return Ok(());
        }
        loop {
            self.skip_semis();
            if self.eat_symbol(Symbol::RParen) {
                return Ok(());
            }
            out.push(self.parse_import_spec()?);
            self.expect_spec_end()?;
        }
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, SigTableError> {
        let alias = match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            TokenKind::Symbol(Symbol::Dot) => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        match &self.peek().kind {
            TokenKind::String(path) => {
                let path = path.clone();
                self.advance();
                Ok(ImportSpec { alias, path })
            }
            _ => Err(self.error("expected import path")),
        }
    }

    fn parse_type_decl(&mut self, out: &mut Vec<TypeSpec>) -> Result<(), SigTableError> {
        if !self.eat_symbol(Symbol::LParen) {
            out.push(self.parse_type_spec()?);
            return Ok(());
        }
        loop {
            self.skip_semis();
            if self.eat_symbol(Symbol::RParen) {
                return Ok(());
            }
            out.push(self.parse_type_spec()?);
            self.expect_spec_end()?;
        }
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec, SigTableError> {
        let start = self.peek().location.clone();
        let name = self.expect_ident()?;
        let mut generic = false;
        if self.peek().is_symbol(Symbol::LBracket) && self.looks_like_type_params() {
            let close = self.matching_close(self.pos)?;
            self.pos = close + 1;
            generic = true;
        }
        let alias = self.eat_symbol(Symbol::Assign);
        let ty = self.parse_type()?;
        let end = self.previous_location();
        Ok(TypeSpec {
            name,
            alias,
            generic,
            ty,
            location: SourceSpan { start, end },
        })
    }

    // `type A[T any] ...` versus `type A [N]int`.
    fn looks_like_type_params(&self) -> bool {
        matches!(self.peek_at(1).kind, TokenKind::Ident(_))
            && !matches!(
                self.peek_at(2).kind,
                TokenKind::Symbol(Symbol::RBracket)
                    | TokenKind::Symbol(Symbol::Dot)
                    | TokenKind::Operator(_)
            )
    }

    fn parse_const_decl(&mut self, out: &mut Vec<ConstSpec>) -> Result<(), SigTableError> {
        if !self.eat_symbol(Symbol::LParen) {
            out.extend(self.parse_const_spec()?);
            return Ok(());
        }
        loop {
            self.skip_semis();
            if self.eat_symbol(Symbol::RParen) {
                return Ok(());
            }
            out.extend(self.parse_const_spec()?);
            self.expect_spec_end()?;
        }
    }

    fn parse_const_spec(&mut self) -> Result<Vec<ConstSpec>, SigTableError> {
        let mut names = vec![self.expect_ident()?];
        while self.eat_symbol(Symbol::Comma) {
            names.push(self.expect_ident()?);
        }

        let mut depth = 0usize;
        let mut seen_assign = false;
        let mut groups: Vec<Vec<TokenKind>> = vec![Vec::new()];
        loop {
            let kind = self.peek().kind.clone();
            match kind {
                TokenKind::Eof => break,
                TokenKind::Symbol(Symbol::Semi) | TokenKind::Symbol(Symbol::RParen)
                    if depth == 0 =>
                {
                    break
                }
                TokenKind::Symbol(Symbol::Assign) if depth == 0 && !seen_assign => {
                    seen_assign = true;
                }
                TokenKind::Symbol(Symbol::Comma) if depth == 0 && seen_assign => {
                    groups.push(Vec::new());
                }
                _ => {
                    depth = self.track_depth(&kind, depth)?;
                    if seen_assign {
                        if let Some(group) = groups.last_mut() {
                            group.push(kind);
                        }
                    }
                }
            }
            self.advance();
        }

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(index, name)| ConstSpec {
                name,
                value: groups.get(index).and_then(|group| const_value(group)),
            })
            .collect())
    }

    fn skip_declaration(&mut self) -> Result<(), SigTableError> {
        self.advance();
        let mut depth = 0usize;
        loop {
            let kind = self.peek().kind.clone();
            match kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Symbol(Symbol::Semi) if depth == 0 => {
                    self.advance();
                    return Ok(());
                }
                _ => {
                    depth = self.track_depth(&kind, depth)?;
                    self.advance();
                }
            }
        }
    }

    fn track_depth(&self, kind: &TokenKind, depth: usize) -> Result<usize, SigTableError> {
        match kind {
            TokenKind::Symbol(Symbol::LParen | Symbol::LBracket | Symbol::LBrace) => Ok(depth + 1),
            TokenKind::Symbol(Symbol::RParen | Symbol::RBracket | Symbol::RBrace) => depth
                .checked_sub(1)
                .ok_or_else(|| self.error("unbalanced closing bracket")),
            _ => Ok(depth),
        }
    }

    fn matching_close(&self, open: usize) -> Result<usize, SigTableError> {
        let mut depth = 0usize;
        let mut index = open;
        while index < self.tokens.len() {
            let kind = &self.tokens[index].kind;
            if *kind == TokenKind::Eof {
                break;
            }
            depth = self.track_depth(kind, depth)?;
            if depth == 0 {
                return Ok(index);
            }
            index += 1;
        }
        Err(self.error("unterminated bracket"))
    }

    fn parse_type(&mut self) -> Result<TypeExpr, SigTableError> {
        let kind = self.peek().kind.clone();
        match kind {
            TokenKind::Ident(name) => {
                self.advance();
                let base = if self.eat_symbol(Symbol::Dot) {
                    TypeExpr::Qualified {
                        package: name,
                        name: self.expect_ident()?,
                    }
                } else {
                    TypeExpr::Name(name)
                };
                if !self.eat_symbol(Symbol::LBracket) {
                    return Ok(base);
                }
                let mut args = Vec::new();
                loop {
                    if self.eat_symbol(Symbol::RBracket) {
                        break;
                    }
                    args.push(self.parse_type()?);
                    if !self.eat_symbol(Symbol::Comma) {
                        self.expect_symbol(Symbol::RBracket, "']' after type arguments")?;
                        break;
                    }
                }
                Ok(TypeExpr::Instance {
                    base: Box::new(base),
                    args,
                })
            }
            TokenKind::Symbol(Symbol::Star) => {
                self.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::Symbol(Symbol::LBracket) => {
                self.advance();
                if self.eat_symbol(Symbol::RBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = self.parse_array_len()?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Symbol(Symbol::LParen) => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect_symbol(Symbol::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Symbol(Symbol::Arrow) => {
                self.advance();
                if !self.peek().is_keyword(Keyword::Chan) {
                    return Err(self.error("expected 'chan' after '<-'"));
                }
                self.advance();
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword(Keyword::Chan) => {
                self.advance();
                let dir = if self.eat_symbol(Symbol::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword(Keyword::Map) => {
                self.advance();
                self.expect_symbol(Symbol::LBracket, "'[' after map")?;
                let key = self.parse_type()?;
                self.expect_symbol(Symbol::RBracket, "']' after map key")?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword(Keyword::Func) => {
                self.advance();
                Ok(TypeExpr::Func(self.parse_signature()?))
            }
            TokenKind::Keyword(Keyword::Interface) => {
                self.advance();
                Ok(TypeExpr::Interface(self.parse_interface_body()?))
            }
            TokenKind::Keyword(Keyword::Struct) => {
                self.advance();
                Ok(TypeExpr::Struct(self.parse_struct_body()?))
            }
            _ => Err(self.error("expected type")),
        }
    }

    // Called after the opening '['; consumes the closing ']'.
    fn parse_array_len(&mut self) -> Result<ArrayLen, SigTableError> {
        let close = self.matching_close(self.pos - 1)?;
        let inner = self.tokens[self.pos..close]
            .iter()
            .map(|token| token.kind.clone())
            .collect::<Vec<_>>();
        self.pos = close + 1;
        let len = match inner.as_slice() {
            [TokenKind::Number(value)] => ArrayLen::Literal(value.clone()),
            [TokenKind::Ident(name)] => ArrayLen::Name(name.clone()),
            [TokenKind::Ident(package), TokenKind::Symbol(Symbol::Dot), TokenKind::Ident(name)] => {
                ArrayLen::Qualified {
                    package: package.clone(),
                    name: name.clone(),
                }
            }
            [] => return Err(self.error("expected array length")),
            _ => ArrayLen::Expr(
                inner
                    .iter()
                    .map(token_text)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        };
        Ok(len)
    }

    // Called after `func`.
    fn parse_signature(&mut self) -> Result<FuncTypeExpr, SigTableError> {
        let params = self.parse_param_list()?;
        let results = if self.peek().is_symbol(Symbol::LParen) {
            self.parse_param_list()?
        } else if starts_type(&self.peek().kind) {
            vec![ParamExpr {
                name: None,
                ty: self.parse_type()?,
                variadic: false,
            }]
        } else {
            Vec::new()
        };
        Ok(FuncTypeExpr { params, results })
    }

    fn parse_param_list(&mut self) -> Result<Vec<ParamExpr>, SigTableError> {
        self.expect_symbol(Symbol::LParen, "'(' to open parameter list")?;
        let mut entries = Vec::new();
        loop {
            if self.eat_symbol(Symbol::RParen) {
                break;
            }
            entries.push(self.parse_param_entry()?);
            if !self.eat_symbol(Symbol::Comma) {
                self.expect_symbol(Symbol::RParen, "')' to close parameter list")?;
                break;
            }
        }

        let any_named = entries
            .iter()
            .any(|entry| matches!(entry, ParamEntry::Named(..)));
        if !any_named {
            return Ok(entries
                .into_iter()
                .map(|entry| match entry {
                    ParamEntry::Ambiguous(name) => ParamExpr {
                        name: None,
                        ty: TypeExpr::Name(name),
                        variadic: false,
                    },
                    ParamEntry::Unnamed(ty, variadic) | ParamEntry::Named(_, ty, variadic) => {
                        ParamExpr {
                            name: None,
                            ty,
                            variadic,
                        }
                    }
                })
                .collect());
        }

        // `a, b int` shares the type of the next named entry.
        let mut params = Vec::with_capacity(entries.len());
        let mut pending: Option<TypeExpr> = None;
        for entry in entries.into_iter().rev() {
            match entry {
                ParamEntry::Named(name, ty, variadic) => {
                    pending = Some(ty.clone());
                    params.push(ParamExpr {
                        name: Some(name),
                        ty,
                        variadic,
                    });
                }
                ParamEntry::Ambiguous(name) => {
                    let Some(ty) = pending.clone() else {
                        return Err(self.error("mixed named and unnamed parameters"));
                    };
                    params.push(ParamExpr {
                        name: Some(name),
                        ty,
                        variadic: false,
                    });
                }
                ParamEntry::Unnamed(..) => {
                    return Err(self.error("mixed named and unnamed parameters"));
                }
            }
        }
        params.reverse();
        Ok(params)
    }

    fn parse_param_entry(&mut self) -> Result<ParamEntry, SigTableError> {
        if let TokenKind::Ident(name) = self.peek().kind.clone() {
            let next = self.peek_at(1).kind.clone();
            match next {
                TokenKind::Symbol(Symbol::Comma) | TokenKind::Symbol(Symbol::RParen) => {
                    self.advance();
                    return Ok(ParamEntry::Ambiguous(name));
                }
                TokenKind::Symbol(Symbol::Dot) => {
                    return Ok(ParamEntry::Unnamed(self.parse_type()?, false));
                }
                TokenKind::Symbol(Symbol::Ellipsis) => {
                    self.advance();
                    self.advance();
                    return Ok(ParamEntry::Named(name, self.parse_type()?, true));
                }
                TokenKind::Symbol(Symbol::LBracket) => {
                    // `List[int]` is a type, `buf [4]byte` a named parameter.
                    let close = self.matching_close(self.pos + 1)?;
                    let after = &self.tokens[(close + 1).min(self.tokens.len() - 1)].kind;
                    if matches!(
                        after,
                        TokenKind::Symbol(Symbol::Comma) | TokenKind::Symbol(Symbol::RParen)
                    ) {
                        return Ok(ParamEntry::Unnamed(self.parse_type()?, false));
                    }
                    self.advance();
                    return Ok(ParamEntry::Named(name, self.parse_type()?, false));
                }
                ref kind if starts_type(kind) => {
                    self.advance();
                    return Ok(ParamEntry::Named(name, self.parse_type()?, false));
                }
                _ => return Err(self.error("unexpected token in parameter list")),
            }
        }
        if self.eat_symbol(Symbol::Ellipsis) {
            return Ok(ParamEntry::Unnamed(self.parse_type()?, true));
        }
        Ok(ParamEntry::Unnamed(self.parse_type()?, false))
    }

    fn parse_interface_body(&mut self) -> Result<Vec<InterfaceElem>, SigTableError> {
        self.expect_symbol(Symbol::LBrace, "'{' after interface")?;
        let mut elems = Vec::new();
        loop {
            self.skip_semis();
            if self.eat_symbol(Symbol::RBrace) {
                break;
            }
            let is_method = matches!(self.peek().kind, TokenKind::Ident(_))
                && self.peek_at(1).is_symbol(Symbol::LParen);
            if is_method {
                let name = self.expect_ident()?;
                let func = self.parse_signature()?;
                elems.push(InterfaceElem::Method { name, func });
            } else {
                let mut terms = Vec::new();
                loop {
                    let tilde = self.eat_symbol(Symbol::Tilde);
                    terms.push(UnionTermExpr {
                        tilde,
                        ty: self.parse_type()?,
                    });
                    if !self.eat_symbol(Symbol::Pipe) {
                        break;
                    }
                }
                if terms.len() == 1 && !terms[0].tilde {
                    let term = terms.remove(0);
                    elems.push(InterfaceElem::Embed(term.ty));
                } else {
                    elems.push(InterfaceElem::Union(terms));
                }
            }
            if !self.peek().is_symbol(Symbol::RBrace) {
                self.expect_symbol(Symbol::Semi, "';' between interface elements")?;
            }
        }
        Ok(elems)
    }

    fn parse_struct_body(&mut self) -> Result<Vec<FieldExpr>, SigTableError> {
        self.expect_symbol(Symbol::LBrace, "'{' after struct")?;
        let mut fields = Vec::new();
        loop {
            self.skip_semis();
            if self.eat_symbol(Symbol::RBrace) {
                break;
            }
            if self.eat_symbol(Symbol::Star) {
                fields.push(FieldExpr {
                    name: None,
                    ty: TypeExpr::Pointer(Box::new(self.parse_type()?)),
                });
            } else if let TokenKind::Ident(name) = self.peek().kind.clone() {
                let embedded = match &self.peek_at(1).kind {
                    TokenKind::Symbol(Symbol::Dot)
                    | TokenKind::Symbol(Symbol::Semi)
                    | TokenKind::Symbol(Symbol::RBrace)
                    | TokenKind::String(_) => true,
                    TokenKind::Symbol(Symbol::LBracket) => {
                        let close = self.matching_close(self.pos + 1)?;
                        let after = &self.tokens[(close + 1).min(self.tokens.len() - 1)].kind;
                        matches!(
                            after,
                            TokenKind::Symbol(Symbol::Semi)
                                | TokenKind::Symbol(Symbol::RBrace)
                                | TokenKind::String(_)
                        )
                    }
                    _ => false,
                };
                if embedded {
                    fields.push(FieldExpr {
                        name: None,
                        ty: self.parse_type()?,
                    });
                } else {
                    self.advance();
                    let mut names = vec![name];
                    while self.eat_symbol(Symbol::Comma) {
                        names.push(self.expect_ident()?);
                    }
                    let ty = self.parse_type()?;
                    fields.extend(names.into_iter().map(|name| FieldExpr {
                        name: Some(name),
                        ty: ty.clone(),
                    }));
                }
            } else {
                return Err(self.error("expected struct field"));
            }
            if matches!(self.peek().kind, TokenKind::String(_)) {
                self.advance();
            }
            if !self.peek().is_symbol(Symbol::RBrace) {
                self.expect_symbol(Symbol::Semi, "';' between struct fields")?;
            }
        }
        Ok(fields)
    }

    fn expect_spec_end(&mut self) -> Result<(), SigTableError> {
        if self.eat_symbol(Symbol::Semi) || self.peek().is_symbol(Symbol::RParen) {
            return Ok(());
        }
        Err(self.error("expected ';' or ')' after declaration"))
    }

    fn skip_semis(&mut self) {
        while self.eat_symbol(Symbol::Semi) {}
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn previous_location(&self) -> st_core::SourceLocation {
        self.tokens[self.pos.saturating_sub(1)].location.clone()
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat_symbol(&mut self, symbol: Symbol) -> bool {
        if self.peek().is_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: Symbol, what: &str) -> Result<(), SigTableError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {}", what)))
        }
    }

    fn expect_ident(&mut self) -> Result<String, SigTableError> {
        match &self.peek().kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn error(&self, message: &str) -> SigTableError {
        let token = self.peek();
        SigTableError::with_span(
            "GO_PARSE_ERROR",
            format!(
                "{}:{}:{}: {}, found {}.",
                self.file_name,
                token.location.line,
                token.location.column,
                message,
                token_text(&token.kind)
            ),
            SourceSpan::point(token.location.line, token.location.column),
        )
    }
}

fn starts_type(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::Symbol(Symbol::Star)
            | TokenKind::Symbol(Symbol::LBracket)
            | TokenKind::Symbol(Symbol::LParen)
            | TokenKind::Symbol(Symbol::Arrow)
            | TokenKind::Keyword(Keyword::Map)
            | TokenKind::Keyword(Keyword::Chan)
            | TokenKind::Keyword(Keyword::Func)
            | TokenKind::Keyword(Keyword::Interface)
            | TokenKind::Keyword(Keyword::Struct)
    )
}

fn const_value(tokens: &[TokenKind]) -> Option<ConstValue> {
    match tokens {
        [TokenKind::Number(value)] => Some(ConstValue::Literal(value.clone())),
        [TokenKind::Ident(name)] => Some(ConstValue::Name(name.clone())),
        [TokenKind::Ident(package), TokenKind::Symbol(Symbol::Dot), TokenKind::Ident(name)] => {
            Some(ConstValue::Qualified {
                package: package.clone(),
                name: name.clone(),
            })
        }
        _ => None,
    }
}

fn token_text(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(text) | TokenKind::Number(text) => text.clone(),
        TokenKind::String(text) => format!("\"{}\"", text),
        TokenKind::Char => "rune literal".to_string(),
        TokenKind::Keyword(keyword) => format!("{:?}", keyword).to_lowercase(),
        TokenKind::Symbol(symbol) => match symbol {
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::LBrace => "{",
            Symbol::RBrace => "}",
            Symbol::LBracket => "[",
            Symbol::RBracket => "]",
            Symbol::Comma => ",",
            Symbol::Semi => ";",
            Symbol::Colon => ":",
            Symbol::Dot => ".",
            Symbol::Ellipsis => "...",
            Symbol::Star => "*",
            Symbol::Arrow => "<-",
            Symbol::Tilde => "~",
            Symbol::Pipe => "|",
            Symbol::Assign => "=",
        }
        .to_string(),
        TokenKind::Operator(op) => (*op).to_string(),
        TokenKind::Eof => "end of file".to_string(),
    }
}
