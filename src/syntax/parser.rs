//! Tolerant declaration parser.
//!
//! Recovers package, imports, type declarations, member signatures and local
//! variable declarations from a token stream. Never fails: problems are
//! recorded as [`ParseError`]s and parsing resumes at the next plausible
//! declaration.

use smol_str::SmolStr;

use super::ast::{
    DeclKind, ImportDecl, LocalDecl, MemberDecl, MemberDeclKind, Modifiers, ParamDecl, ParseError,
    SourceFile, TypeDecl,
};
use super::lexer::{Lexeme, Token, lex};
use crate::base::{LineCol, LineIndex, TextRange, TextSize};

/// Parse a Haxe or ActionScript source file.
pub fn parse(text: &str) -> SourceFile {
    let mut parser = Parser::new(text);
    parser.parse_file();
    if !parser.file.errors.is_empty() {
        tracing::debug!(errors = parser.file.errors.len(), "parsed with errors");
    }
    parser.file
}

struct Parser<'t> {
    text: &'t str,
    tokens: Vec<Lexeme>,
    pos: usize,
    lines: LineIndex,
    /// Open ActionScript `package a.b {` blocks.
    package_depth: u32,
    file: SourceFile,
}

impl<'t> Parser<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            tokens: lex(text),
            pos: 0,
            lines: LineIndex::new(text),
            package_depth: 0,
            file: SourceFile::default(),
        }
    }

    // ------------------------------------------------------------------
    // token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|l| l.kind)
    }

    fn at(&self, kind: Token) -> bool {
        self.peek() == Some(kind)
    }

    fn at_text(&self, text: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|l| l.text(self.text) == text)
    }

    fn bump(&mut self) -> Option<Lexeme> {
        let lexeme = self.tokens.get(self.pos).copied();
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn eat(&mut self, kind: Token) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn position(&self, lexeme: Lexeme) -> LineCol {
        self.lines.line_col(lexeme.range.start())
    }

    /// Position of the current token, or of the end of file.
    fn here(&self) -> LineCol {
        match self.tokens.get(self.pos) {
            Some(l) => self.position(*l),
            None => self.lines.line_col(self.lines_end()),
        }
    }

    fn lines_end(&self) -> TextSize {
        TextSize::of(self.text)
    }

    /// Line of the last consumed token.
    fn prev_line(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(l) => self.position(*l).line,
            None => 0,
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let line = self.here().line;
        self.file.errors.push(ParseError {
            line,
            message: message.into(),
        });
    }

    fn name(&mut self) -> Option<SmolStr> {
        let lexeme = self.tokens.get(self.pos).copied()?;
        if lexeme.kind.is_contextual_name() {
            self.pos += 1;
            Some(SmolStr::new(lexeme.text(self.text)))
        } else {
            None
        }
    }

    fn at_name(&self, n: usize) -> bool {
        self.peek_at(n).is_some_and(Token::is_contextual_name)
    }

    /// Source text between two token indices (inclusive), whitespace removed.
    fn compact_text(&self, first: usize, last: usize) -> SmolStr {
        let range = TextRange::new(
            self.tokens[first].range.start(),
            self.tokens[last].range.end(),
        );
        self.text[range].split_whitespace().collect::<String>().into()
    }

    /// Source text between two token indices (inclusive), trimmed.
    fn raw_text(&self, first: usize, last: usize) -> SmolStr {
        let range = TextRange::new(
            self.tokens[first].range.start(),
            self.tokens[last].range.end(),
        );
        SmolStr::new(self.text[range].trim())
    }

    /// Consume from an opening delimiter through its match.
    fn skip_balanced(&mut self, open: Token, close: Token) -> Option<Lexeme> {
        if !self.eat(open) {
            return None;
        }
        let mut depth = 1u32;
        while let Some(lexeme) = self.bump() {
            if lexeme.kind == open {
                depth += 1;
            } else if lexeme.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some(lexeme);
                }
            }
        }
        None
    }

    /// Skip an expression up to (not including) a `stop` token at depth 0
    /// or an unmatched closing delimiter. Returns the skipped text.
    fn skip_expression(&mut self, stops: &[Token]) -> Option<SmolStr> {
        let first = self.pos;
        let mut depth = 0u32;
        while let Some(kind) = self.peek() {
            match kind {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                k if depth == 0 && stops.contains(&k) => break,
                _ => {}
            }
            self.pos += 1;
        }
        (self.pos > first).then(|| self.raw_text(first, self.pos - 1))
    }

    fn skip_metadata(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                Token::Meta => {
                    self.pos += 1;
                    if self.at(Token::LParen) {
                        self.skip_balanced(Token::LParen, Token::RParen);
                    }
                }
                Token::Directive => {
                    let is_condition = self.at_text("#if") || self.at_text("#elseif");
                    self.pos += 1;
                    if is_condition {
                        if self.at(Token::LParen) {
                            self.skip_balanced(Token::LParen, Token::RParen);
                        } else if self.at(Token::Op) {
                            // `#if !flash`
                            self.pos += 1;
                            self.name();
                        } else {
                            self.name();
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::empty();
        loop {
            self.skip_metadata();
            let flag = match self.peek() {
                Some(Token::Public) => Modifiers::PUBLIC,
                Some(Token::Private) => Modifiers::PRIVATE,
                Some(Token::Protected) => Modifiers::PROTECTED,
                Some(Token::Internal) => Modifiers::INTERNAL,
                Some(Token::Static) => Modifiers::STATIC,
                Some(Token::Override) => Modifiers::OVERRIDE,
                Some(Token::Inline) => Modifiers::INLINE,
                Some(Token::Dynamic) if !self.at_name_then_colon() => Modifiers::DYNAMIC,
                Some(Token::Extern) => Modifiers::EXTERN,
                Some(Token::Macro) => Modifiers::MACRO,
                // `final class`, `final function`; a bare `final x` is a declaration
                Some(Token::Final)
                    if matches!(
                        self.peek_at(1),
                        Some(Token::Class | Token::Function | Token::Interface)
                    ) || self.peek_at(1).is_some_and(Token::is_modifier) =>
                {
                    Modifiers::FINAL
                }
                Some(Token::Abstract) if self.peek_at(1) == Some(Token::Class) => {
                    Modifiers::ABSTRACT
                }
                _ => break,
            };
            modifiers |= flag;
            self.pos += 1;
        }
        modifiers
    }

    /// `dynamic:` used as a field name in anonymous structures.
    fn at_name_then_colon(&self) -> bool {
        self.peek_at(1) == Some(Token::Colon)
    }

    // ------------------------------------------------------------------
    // file level
    // ------------------------------------------------------------------

    fn parse_file(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                Token::Package => self.parse_package(),
                Token::Import | Token::Using => self.parse_import(),
                Token::RBrace if self.package_depth > 0 => {
                    self.package_depth -= 1;
                    self.pos += 1;
                }
                _ => {
                    if !self.parse_type_decl() {
                        self.error("unexpected token at top level");
                        self.pos += 1;
                    }
                }
            }
        }
        if self.package_depth > 0 {
            self.error("unclosed package block");
        }
    }

    fn dotted_path(&mut self) -> Option<(SmolStr, bool)> {
        let mut path = String::from(self.name()?.as_str());
        let mut wildcard = false;
        while self.at(Token::Dot) {
            if self.at_name(1) {
                self.pos += 1;
                let segment = self.name().unwrap_or_default();
                path.push('.');
                path.push_str(&segment);
            } else if self.peek_at(1) == Some(Token::Op) {
                self.pos += 1;
                if self.at_text("*") {
                    self.pos += 1;
                    wildcard = true;
                }
                break;
            } else {
                break;
            }
        }
        Some((path.into(), wildcard))
    }

    fn parse_package(&mut self) {
        let Some(keyword) = self.bump() else { return };
        let line = self.position(keyword).line;
        let path = self.dotted_path().map(|(p, _)| p).unwrap_or_default();
        self.file.package = path;
        self.file.package_line = Some(line);

        if self.eat(Token::LBrace) {
            self.package_depth += 1;
        } else if !self.eat(Token::Semi) {
            self.error("expected ';' after package");
        }
    }

    fn parse_import(&mut self) {
        let Some(keyword) = self.bump() else { return };
        let line = self.position(keyword).line;
        let using = keyword.kind == Token::Using;

        let Some((path, wildcard)) = self.dotted_path() else {
            self.error("expected import path");
            self.skip_expression(&[Token::Semi]);
            self.eat(Token::Semi);
            return;
        };
        let alias = if self.eat(Token::As) || self.eat(Token::In) {
            self.name()
        } else {
            None
        };
        if !self.eat(Token::Semi) {
            self.error("expected ';' after import");
        }

        self.file.imports.push(ImportDecl {
            path,
            alias,
            wildcard,
            using,
            line,
        });
    }

    // ------------------------------------------------------------------
    // types
    // ------------------------------------------------------------------

    fn parse_type_decl(&mut self) -> bool {
        let first = self.pos;
        self.skip_metadata();
        let start = self.here();
        let modifiers = self.modifiers();

        let kind = match self.peek() {
            Some(Token::Class) => DeclKind::Class,
            Some(Token::Interface) => DeclKind::Interface,
            Some(Token::Enum) => DeclKind::Enum,
            Some(Token::Typedef) => DeclKind::TypeDef,
            Some(Token::Abstract) => DeclKind::Abstract,
            _ => return self.pos > first,
        };
        self.pos += 1;

        let Some(name) = self.name() else {
            self.error("expected type name");
            return true;
        };

        let mut decl = TypeDecl {
            name,
            kind,
            modifiers,
            type_params: self.type_params(),
            extends: Vec::new(),
            implements: Vec::new(),
            underlying: None,
            members: Vec::new(),
            start,
            open_brace: None,
            close_brace: None,
        };

        match kind {
            DeclKind::Class | DeclKind::Interface => {
                self.parse_heritage(&mut decl);
                self.parse_class_body(&mut decl);
            }
            DeclKind::Abstract => {
                if self.eat(Token::LParen) {
                    decl.underlying = self.parse_type();
                    self.eat(Token::RParen);
                }
                while self.at_text("from") || self.at_text("to") {
                    self.pos += 1;
                    self.parse_type();
                }
                self.parse_class_body(&mut decl);
            }
            DeclKind::Enum => self.parse_enum_body(&mut decl),
            DeclKind::TypeDef => {
                if !self.eat(Token::Eq) {
                    self.error("expected '=' in typedef");
                }
                if self.at(Token::LBrace) {
                    self.parse_anon_body(&mut decl);
                } else if let Some(target) = self.parse_type() {
                    decl.extends.push(target);
                }
                self.eat(Token::Semi);
            }
        }

        self.file.types.push(decl);
        true
    }

    fn type_params(&mut self) -> Vec<SmolStr> {
        let mut params = Vec::new();
        if !self.eat(Token::Lt) {
            return params;
        }
        let mut depth = 1u32;
        let mut expect_name = true;
        while let Some(lexeme) = self.bump() {
            match lexeme.kind {
                Token::Lt => depth += 1,
                Token::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Token::Comma if depth == 1 => {
                    expect_name = true;
                    continue;
                }
                Token::Ident if depth == 1 && expect_name => {
                    params.push(SmolStr::new(lexeme.text(self.text)));
                }
                _ => {}
            }
            expect_name = false;
        }
        params
    }

    fn parse_heritage(&mut self, decl: &mut TypeDecl) {
        loop {
            let target = if self.eat(Token::Extends) {
                &mut decl.extends
            } else if self.eat(Token::Implements) {
                &mut decl.implements
            } else {
                break;
            };
            let mut list = Vec::new();
            loop {
                match self.parse_type() {
                    Some(ty) => list.push(ty),
                    None => break,
                }
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            target.extend(list);
        }
    }

    fn open_body(&mut self, decl: &mut TypeDecl) -> bool {
        match self.tokens.get(self.pos).copied() {
            Some(lexeme) if lexeme.kind == Token::LBrace => {
                decl.open_brace = Some(self.position(lexeme));
                self.pos += 1;
                true
            }
            _ => {
                self.error(format!("expected '{{' to open {}", decl.name));
                false
            }
        }
    }

    /// Consume the closing brace if present, recording its position.
    fn close_body(&mut self, decl: &mut TypeDecl) -> bool {
        match self.tokens.get(self.pos).copied() {
            Some(lexeme) if lexeme.kind == Token::RBrace => {
                decl.close_brace = Some(self.position(lexeme));
                self.pos += 1;
                true
            }
            None => {
                self.error(format!("unclosed body of {}", decl.name));
                true
            }
            _ => false,
        }
    }

    fn parse_class_body(&mut self, decl: &mut TypeDecl) {
        if !self.open_body(decl) {
            return;
        }
        while !self.close_body(decl) {
            if let Some(member) = self.parse_member() {
                decl.members.push(member);
            }
        }
    }

    fn parse_enum_body(&mut self, decl: &mut TypeDecl) {
        if !self.open_body(decl) {
            return;
        }
        while !self.close_body(decl) {
            self.skip_metadata();
            let start = self.here();
            let Some(name) = self.name() else {
                if !self.at(Token::RBrace) {
                    self.pos += 1;
                }
                continue;
            };
            let params = if self.at(Token::LParen) {
                self.params()
            } else {
                Vec::new()
            };
            if self.eat(Token::Colon) {
                self.parse_type();
            }
            self.eat(Token::Semi);
            decl.members.push(MemberDecl {
                name,
                kind: MemberDeclKind::EnumCase,
                modifiers: Modifiers::PUBLIC,
                accessors: None,
                params,
                type_ref: None,
                start,
                end_line: self.prev_line(),
                locals: Vec::new(),
            });
        }
    }

    fn parse_anon_body(&mut self, decl: &mut TypeDecl) {
        if !self.open_body(decl) {
            return;
        }
        while !self.close_body(decl) {
            match self.peek() {
                Some(Token::Gt) => {
                    self.pos += 1;
                    if let Some(base) = self.parse_type() {
                        decl.extends.push(base);
                    }
                    self.eat(Token::Comma);
                }
                _ if self.at_short_field() => {
                    let start = self.here();
                    self.eat(Token::Question);
                    let name = self.name().unwrap_or_default();
                    self.eat(Token::Colon);
                    let type_ref = self.parse_type();
                    if !self.eat(Token::Comma) {
                        self.eat(Token::Semi);
                    }
                    decl.members.push(MemberDecl {
                        name,
                        kind: MemberDeclKind::Var,
                        modifiers: Modifiers::PUBLIC,
                        accessors: None,
                        params: Vec::new(),
                        type_ref,
                        start,
                        end_line: self.prev_line(),
                        locals: Vec::new(),
                    });
                }
                Some(Token::Comma) => self.pos += 1,
                _ => {
                    if let Some(mut member) = self.parse_member() {
                        member.modifiers |= Modifiers::PUBLIC;
                        decl.members.push(member);
                    }
                }
            }
        }
    }

    /// `name:Type` or `?name:Type` inside an anonymous structure.
    fn at_short_field(&self) -> bool {
        let offset = usize::from(self.at(Token::Question));
        self.at_name(offset) && self.peek_at(offset + 1) == Some(Token::Colon)
    }

    // ------------------------------------------------------------------
    // members
    // ------------------------------------------------------------------

    fn parse_member(&mut self) -> Option<MemberDecl> {
        self.skip_metadata();
        let start = self.here();
        let modifiers = self.modifiers();

        match self.peek() {
            Some(Token::Var | Token::Final | Token::Const) => self.parse_var(start, modifiers),
            Some(Token::Function) => self.parse_function(start, modifiers),
            Some(Token::Semi) => {
                self.pos += 1;
                None
            }
            Some(Token::RBrace) | None => None,
            Some(_) => {
                self.error("unexpected token in type body");
                self.pos += 1;
                self.skip_expression(&[Token::Semi]);
                self.eat(Token::Semi);
                None
            }
        }
    }

    fn accessor_name(&mut self) -> SmolStr {
        match self.bump() {
            Some(lexeme) if lexeme.kind != Token::RParen && lexeme.kind != Token::Comma => {
                SmolStr::new(lexeme.text(self.text))
            }
            Some(_) => {
                self.pos -= 1;
                SmolStr::new("default")
            }
            None => SmolStr::new("default"),
        }
    }

    fn parse_var(&mut self, start: LineCol, mut modifiers: Modifiers) -> Option<MemberDecl> {
        let keyword = self.bump()?;
        if matches!(keyword.kind, Token::Final | Token::Const) {
            modifiers |= Modifiers::FINAL;
        }
        let Some(name) = self.name() else {
            self.error("expected variable name");
            self.skip_expression(&[Token::Semi]);
            self.eat(Token::Semi);
            return None;
        };

        let accessors = if self.eat(Token::LParen) {
            let get = self.accessor_name();
            self.eat(Token::Comma);
            let set = self.accessor_name();
            self.eat(Token::RParen);
            Some((get, set))
        } else {
            None
        };
        let type_ref = if self.eat(Token::Colon) {
            self.parse_type()
        } else {
            None
        };
        if self.eat(Token::Eq) {
            self.skip_expression(&[Token::Semi, Token::Comma]);
        }
        if !self.eat(Token::Semi) {
            self.eat(Token::Comma);
        }

        Some(MemberDecl {
            name,
            kind: if accessors.is_some() {
                MemberDeclKind::Property
            } else {
                MemberDeclKind::Var
            },
            modifiers,
            accessors,
            params: Vec::new(),
            type_ref,
            start,
            end_line: self.prev_line(),
            locals: Vec::new(),
        })
    }

    fn parse_function(&mut self, start: LineCol, modifiers: Modifiers) -> Option<MemberDecl> {
        self.bump()?;

        // ActionScript `function get name()` / `function set name(v)`
        let accessor = if (self.at_text("get") || self.at_text("set")) && self.at_name(1) {
            let is_get = self.at_text("get");
            self.pos += 1;
            Some(is_get)
        } else {
            None
        };

        let name = if self.eat(Token::New) {
            SmolStr::new("new")
        } else if let Some(name) = self.name() {
            name
        } else {
            self.error("expected function name");
            return None;
        };
        self.type_params();

        let params = self.params();
        let type_ref = if self.eat(Token::Colon) {
            self.parse_type()
        } else {
            None
        };

        let (locals, end_line) = if self.at(Token::LBrace) {
            self.scan_body()
        } else {
            if !self.eat(Token::Semi) {
                // expression body: `function f() return x;`
                self.skip_expression(&[Token::Semi]);
                self.eat(Token::Semi);
            }
            (Vec::new(), self.prev_line())
        };

        let (kind, accessors, type_ref) = match accessor {
            Some(true) => (
                MemberDeclKind::Property,
                Some((SmolStr::new("get"), SmolStr::new("never"))),
                type_ref,
            ),
            Some(false) => (
                MemberDeclKind::Property,
                Some((SmolStr::new("never"), SmolStr::new("set"))),
                params.first().and_then(|p| p.type_ref.clone()),
            ),
            None => (MemberDeclKind::Function, None, type_ref),
        };

        Some(MemberDecl {
            name,
            kind,
            modifiers,
            accessors,
            params: if accessor.is_some() { Vec::new() } else { params },
            type_ref,
            start,
            end_line,
            locals,
        })
    }

    fn params(&mut self) -> Vec<ParamDecl> {
        let mut params = Vec::new();
        if !self.eat(Token::LParen) {
            self.error("expected '(' before parameters");
            return params;
        }
        loop {
            match self.peek() {
                None => break,
                Some(Token::RParen) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Comma) => {
                    self.pos += 1;
                    continue;
                }
                _ => {}
            }
            self.skip_metadata();
            let rest = self.eat(Token::Ellipsis);
            let optional = self.eat(Token::Question);
            let Some(name) = self.name() else {
                self.error("expected parameter name");
                if self.skip_expression(&[Token::Comma]).is_none() {
                    break;
                }
                continue;
            };
            let type_ref = if self.eat(Token::Colon) {
                self.parse_type()
            } else {
                None
            };
            let default = if self.eat(Token::Eq) {
                self.skip_expression(&[Token::Comma])
            } else {
                None
            };
            params.push(ParamDecl {
                name,
                type_ref,
                optional,
                default,
                rest,
            });
        }
        params
    }

    /// Scan a brace-delimited function body for local declarations.
    fn scan_body(&mut self) -> (Vec<LocalDecl>, u32) {
        let mut locals = Vec::new();
        self.pos += 1;
        let mut depth = 1u32;

        while let Some(lexeme) = self.bump() {
            match lexeme.kind {
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return (locals, self.position(lexeme).line);
                    }
                }
                Token::Var | Token::Final if self.at_name(0) => {
                    let line = self.position(lexeme).line;
                    let name = self.name().unwrap_or_default();
                    let type_ref = if self.eat(Token::Colon) {
                        self.parse_type()
                    } else {
                        None
                    };
                    locals.push(LocalDecl {
                        name,
                        type_ref,
                        line,
                    });
                }
                _ => {}
            }
        }

        self.error("unclosed function body");
        (locals, self.prev_line())
    }

    // ------------------------------------------------------------------
    // type expressions
    // ------------------------------------------------------------------

    /// Parse a type expression, returning its compacted source text.
    fn parse_type(&mut self) -> Option<SmolStr> {
        let first = self.pos;
        self.type_expr();
        (self.pos > first).then(|| self.compact_text(first, self.pos - 1))
    }

    fn type_expr(&mut self) -> bool {
        if !self.type_atom() {
            return false;
        }
        while self.eat(Token::Arrow) {
            if !self.type_atom() {
                return false;
            }
        }
        true
    }

    fn type_atom(&mut self) -> bool {
        match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                if !self.at(Token::RParen) {
                    self.type_expr();
                    while self.eat(Token::Comma) {
                        self.type_expr();
                    }
                }
                self.eat(Token::RParen)
            }
            Some(Token::LBrace) => self.skip_balanced(Token::LBrace, Token::RBrace).is_some(),
            Some(Token::Question) => {
                self.pos += 1;
                self.type_atom()
            }
            Some(Token::Op) if self.at_text("*") => {
                self.pos += 1;
                true
            }
            Some(kind) if kind.is_contextual_name() => {
                self.pos += 1;
                loop {
                    if self.at(Token::Dot) && self.at_name(1) {
                        self.pos += 2;
                    } else if self.at(Token::Dot) && self.peek_at(1) == Some(Token::Lt) {
                        // ActionScript `Vector.<T>`
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                if self.eat(Token::Lt) {
                    loop {
                        if !self.type_expr() {
                            break;
                        }
                        if !self.eat(Token::Comma) {
                            break;
                        }
                    }
                    if !self.eat(Token::Gt) {
                        self.error("expected '>' closing type parameters");
                    }
                }
                true
            }
            _ => false,
        }
    }
}
