//! Declaration-level syntax tree produced by [`parse`](super::parse).

use bitflags::bitflags;
use smol_str::SmolStr;

use crate::base::LineCol;

bitflags! {
    /// Declaration modifiers. Orthogonal to the kind of declaration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const STATIC = 1 << 2;
        const OVERRIDE = 1 << 3;
        const INLINE = 1 << 4;
        const FINAL = 1 << 5;
        const EXTERN = 1 << 6;
        const DYNAMIC = 1 << 7;
        const MACRO = 1 << 8;
        const PROTECTED = 1 << 9;
        const INTERNAL = 1 << 10;
        const ABSTRACT = 1 << 11;
    }
}

/// A parsed file.
#[derive(Clone, Debug, Default)]
pub struct SourceFile {
    /// Package path; empty string for `package;` and the root package.
    pub package: SmolStr,
    /// Line of the `package` declaration, if any.
    pub package_line: Option<u32>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
    pub errors: Vec<ParseError>,
}

/// `import a.b.C;`, `import a.b.*;`, `import a.b.C as D;` or `using a.b.C;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportDecl {
    /// Dotted path without the trailing `.*`.
    pub path: SmolStr,
    pub alias: Option<SmolStr>,
    pub wildcard: bool,
    pub using: bool,
    pub line: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    TypeDef,
    Abstract,
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: SmolStr,
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<SmolStr>,
    /// Superclass for classes, extended interfaces for interfaces,
    /// aliased/extended types for typedefs.
    pub extends: Vec<SmolStr>,
    pub implements: Vec<SmolStr>,
    /// Underlying type of an abstract.
    pub underlying: Option<SmolStr>,
    pub members: Vec<MemberDecl>,
    /// Position of the declaration keyword.
    pub start: LineCol,
    pub open_brace: Option<LineCol>,
    /// `None` when the body was never closed.
    pub close_brace: Option<LineCol>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberDeclKind {
    /// `var x:T` / `final x:T`
    Var,
    /// `var x(get, set):T`, or an ActionScript `function get x()`
    Property,
    Function,
    EnumCase,
}

#[derive(Clone, Debug)]
pub struct MemberDecl {
    pub name: SmolStr,
    pub kind: MemberDeclKind,
    pub modifiers: Modifiers,
    /// Haxe `(get, set)` accessor pair.
    pub accessors: Option<(SmolStr, SmolStr)>,
    pub params: Vec<ParamDecl>,
    /// Declared type, or return type for functions.
    pub type_ref: Option<SmolStr>,
    pub start: LineCol,
    pub end_line: u32,
    pub locals: Vec<LocalDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: SmolStr,
    pub type_ref: Option<SmolStr>,
    pub optional: bool,
    pub default: Option<SmolStr>,
    pub rest: bool,
}

/// A `var` declared inside a function body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDecl {
    pub name: SmolStr,
    pub type_ref: Option<SmolStr>,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl SourceFile {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Find a top-level type declaration by name.
    pub fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

impl TypeDecl {
    pub fn member(&self, name: &str) -> Option<&MemberDecl> {
        self.members.iter().find(|m| m.name == name)
    }
}
