//! Syntax layer — lexing and declaration parsing for Haxe and ActionScript.
//!
//! The parser here is deliberately shallow: it recovers packages, imports,
//! type declarations, member signatures and local variable declarations,
//! which is all the resolver and generator need. Expression bodies are
//! only scanned, never built into trees.

pub mod ast;
pub mod chars;
pub mod language;
pub mod lexer;
pub mod parser;

pub use ast::{
    DeclKind, ImportDecl, LocalDecl, MemberDecl, MemberDeclKind, Modifiers, ParamDecl, ParseError,
    SourceFile, TypeDecl,
};
pub use chars::{CharacterClass, CharacterClassTable};
pub use language::Language;
pub use lexer::{Lexeme, Token, lex};
pub use parser::parse;
