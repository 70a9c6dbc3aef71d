//! Tokenizer built on `logos`.
//!
//! Whitespace and comments are skipped. Characters the lexer does not know
//! (`$`, backticks, stray unicode) are dropped so a half-typed file still
//! yields a usable token stream.

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("using")]
    Using,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("typedef")]
    Typedef,
    #[token("abstract")]
    Abstract,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("function")]
    Function,
    #[token("var")]
    Var,
    #[token("final")]
    Final,
    #[token("const")]
    Const,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("internal")]
    Internal,
    #[token("static")]
    Static,
    #[token("override")]
    Override,
    #[token("inline")]
    Inline,
    #[token("dynamic")]
    Dynamic,
    #[token("extern")]
    Extern,
    #[token("macro")]
    Macro,
    #[token("new")]
    New,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("return")]
    Return,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("as")]
    As,
    #[token("in")]
    In,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,
    #[regex(r"0x[0-9A-Fa-f]+|[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    #[regex(r"@:?[A-Za-z_][A-Za-z0-9_]*")]
    Meta,
    #[regex(r"#[A-Za-z]+")]
    Directive,

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
    Semi,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("?")]
    Question,
    #[token("->")]
    Arrow,
    #[regex(r"[+\-*/%&|^!~]")]
    Op,
}

impl Token {
    /// Declaration modifiers that may precede a type or member.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Token::Public
                | Token::Private
                | Token::Protected
                | Token::Internal
                | Token::Static
                | Token::Override
                | Token::Inline
                | Token::Dynamic
                | Token::Extern
                | Token::Macro
                | Token::Final
        )
    }

    /// Tokens that can be used as a name even though they lex as keywords.
    pub fn is_contextual_name(self) -> bool {
        matches!(
            self,
            Token::Ident | Token::Dynamic | Token::Default | Token::Macro | Token::As | Token::In
        )
    }
}

/// A token with its byte range in the source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: Token,
    pub range: TextRange,
}

impl Lexeme {
    pub fn text<'t>(&self, source: &'t str) -> &'t str {
        &source[self.range]
    }
}

/// Tokenize a whole file.
pub fn lex(text: &str) -> Vec<Lexeme> {
    let mut lexer = Token::lexer(text);
    let mut tokens = Vec::new();
    let mut skipped = 0usize;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Lexeme {
                kind,
                range: TextRange::new(
                    TextSize::from(span.start as u32),
                    TextSize::from(span.end as u32),
                ),
            }),
            Err(()) => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::trace!(skipped, "lexer dropped unknown characters");
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        lex(text).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("class Foo extends Bar"),
            vec![Token::Class, Token::Ident, Token::Extends, Token::Ident]
        );
        // keyword prefixes stay identifiers
        assert_eq!(kinds("classy vars"), vec![Token::Ident, Token::Ident]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "// line\nvar /* block\n * more */ x";
        assert_eq!(kinds(text), vec![Token::Var, Token::Ident]);
    }

    #[test]
    fn test_arrow_and_generics() {
        assert_eq!(
            kinds("Array<Int>->Void"),
            vec![Token::Ident, Token::Lt, Token::Ident, Token::Gt, Token::Arrow, Token::Ident]
        );
        assert_eq!(
            kinds("Map<String,Array<Int>>"),
            vec![
                Token::Ident,
                Token::Lt,
                Token::Ident,
                Token::Comma,
                Token::Ident,
                Token::Lt,
                Token::Ident,
                Token::Gt,
                Token::Gt
            ]
        );
    }

    #[test]
    fn test_ranges_and_unknown_chars() {
        let text = "var $x = 'a';";
        let tokens = lex(text);
        assert_eq!(tokens[0].text(text), "var");
        assert_eq!(tokens[1].text(text), "x");
        assert_eq!(tokens[3].kind, Token::Str);
        assert_eq!(tokens[3].text(text), "'a'");
    }

    #[test]
    fn test_metadata_and_numbers() {
        assert_eq!(
            kinds("@:isVar var x = 0x1F + 1.5"),
            vec![Token::Meta, Token::Var, Token::Ident, Token::Eq, Token::Number, Token::Op, Token::Number]
        );
        assert_eq!(kinds("for (i in a...b)")[5], Token::Ellipsis);
    }
}
