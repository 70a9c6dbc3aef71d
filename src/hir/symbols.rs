//! Symbol model — types, members and their flags.
//!
//! Symbols reference each other by name only. A superclass or an
//! implemented interface is a [`TypeRef`] resolved on demand through the
//! [`SymbolTable`](super::SymbolTable), so mutually referencing hierarchies
//! never form ownership cycles.

use std::fmt;
use std::sync::{Arc, OnceLock};

use smol_str::SmolStr;

use crate::base::{FileId, LineCol};
use crate::syntax::{DeclKind, Language, Modifiers};

// ============================================================================
// KINDS
// ============================================================================

/// Primary kind of a type-level symbol. Exactly one per symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    TypeDef,
    Abstract,
}

impl TypeKind {
    /// Restricted kinds cannot host generated implementation members.
    pub fn is_restricted(self) -> bool {
        match self {
            TypeKind::Interface | TypeKind::Enum | TypeKind::TypeDef => true,
            TypeKind::Class | TypeKind::Abstract => false,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::TypeDef => "typedef",
            TypeKind::Abstract => "abstract",
        }
    }
}

impl From<DeclKind> for TypeKind {
    fn from(kind: DeclKind) -> Self {
        match kind {
            DeclKind::Class => TypeKind::Class,
            DeclKind::Interface => TypeKind::Interface,
            DeclKind::Enum => TypeKind::Enum,
            DeclKind::TypeDef => TypeKind::TypeDef,
            DeclKind::Abstract => TypeKind::Abstract,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Property,
    EnumCase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
}

impl Visibility {
    /// Visibility from explicit modifiers, falling back to the language
    /// default for the given container.
    pub fn from_modifiers(modifiers: Modifiers, default: Visibility) -> Self {
        if modifiers.contains(Modifiers::PUBLIC) {
            Visibility::Public
        } else if modifiers.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else if modifiers.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else if modifiers.contains(Modifiers::INTERNAL) {
            Visibility::Internal
        } else {
            default
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
        }
    }
}

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// A type as written in source: `Int`, `a.b.C`, `Array<Foo>`, `Int->Void`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeRef(SmolStr);

impl TypeRef {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a function type.
    pub fn is_function(&self) -> bool {
        self.0.contains("->")
    }

    /// The type path without generic arguments: `a.b.C<T>` → `a.b.C`.
    pub fn base_name(&self) -> &str {
        match self.0.find('<') {
            Some(idx) => self.0[..idx].trim_end_matches('.'),
            None => &self.0,
        }
    }

    /// Last segment of the base name: `a.b.C<T>` → `C`.
    pub fn simple_name(&self) -> &str {
        let base = self.base_name();
        base.rsplit('.').next().unwrap_or(base)
    }

    /// Generic arguments at the outermost level: `Map<String,Array<Int>>`
    /// → `["String", "Array<Int>"]`.
    pub fn type_args(&self) -> Vec<TypeRef> {
        let Some(open) = self.0.find('<') else {
            return Vec::new();
        };
        let Some(close) = self.0.rfind('>') else {
            return Vec::new();
        };
        if close <= open {
            return Vec::new();
        }
        let inner = &self.0[open + 1..close];
        let mut args = Vec::new();
        let mut depth = 0i32;
        let mut start = 0;
        for (idx, c) in inner.char_indices() {
            match c {
                '<' | '(' | '{' => depth += 1,
                '>' | ')' | '}' => depth -= 1,
                ',' if depth == 0 => {
                    args.push(TypeRef::new(inner[start..idx].trim()));
                    start = idx + 1;
                }
                _ => {}
            }
        }
        let last = inner[start..].trim();
        if !last.is_empty() {
            args.push(TypeRef::new(last));
        }
        args
    }

    /// The name to look up in the symbol table. `Null<T>` is transparent.
    pub fn lookup_name(&self) -> Option<&str> {
        if self.is_function() || self.0.starts_with('{') || self.0.starts_with('(') {
            return None;
        }
        Some(self.base_name())
    }

    /// Unwrap `Null<T>` to `T`, leaving other types alone.
    pub fn strip_null(&self) -> TypeRef {
        if self.base_name() == "Null" {
            if let Some(inner) = self.type_args().into_iter().next() {
                return inner;
            }
        }
        self.clone()
    }

    pub fn is_void(&self) -> bool {
        matches!(self.as_str(), "Void" | "void")
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: SmolStr,
    pub type_ref: Option<TypeRef>,
    pub optional: bool,
    pub default: Option<SmolStr>,
    pub rest: bool,
}

/// A local variable or parameter visible inside a method body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalVar {
    pub name: SmolStr,
    pub type_ref: Option<TypeRef>,
    /// Line of the declaration.
    pub line: u32,
    pub is_param: bool,
}

/// A field, method, property or enum constructor of a [`Symbol`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: SmolStr,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub modifiers: Modifiers,
    /// Field type, or return type for methods.
    pub type_ref: Option<TypeRef>,
    pub params: Vec<Param>,
    /// Haxe `(get, set)` accessor pair for properties.
    pub accessors: Option<(SmolStr, SmolStr)>,
    pub start: LineCol,
    pub end_line: u32,
    pub locals: Vec<LocalVar>,
}

impl Member {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    pub fn is_constructor(&self) -> bool {
        self.is_method() && self.name == "new"
    }

    /// Whether the member may be redefined in a subclass.
    pub fn is_overridable(&self) -> bool {
        self.is_method()
            && !self.is_constructor()
            && !self.is_static()
            && !self
                .modifiers
                .intersects(Modifiers::INLINE | Modifiers::FINAL | Modifiers::MACRO)
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end_line
    }

    /// Parameters and locals visible at `line`, innermost (latest) first.
    pub fn visible_locals(&self, line: u32) -> impl Iterator<Item = &LocalVar> {
        self.locals.iter().rev().filter(move |l| l.is_param || l.line <= line)
    }

    /// Parameter list as declaration text: `a:Int, ?b:String = "x"`.
    pub fn params_text(&self, language: Language) -> String {
        self.params
            .iter()
            .map(|p| {
                let mut text = String::new();
                if p.rest {
                    text.push_str("...");
                }
                if p.optional && language == Language::Haxe && p.default.is_none() {
                    text.push('?');
                }
                text.push_str(&p.name);
                if let Some(ty) = &p.type_ref {
                    text.push(':');
                    text.push_str(ty.as_str());
                }
                if let Some(default) = &p.default {
                    text.push_str(" = ");
                    text.push_str(default);
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parameter names as call arguments: `a, b`.
    pub fn args_text(&self) -> String {
        self.params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Human readable signature, e.g. `update(dt:Float):Void`.
    pub fn signature(&self, language: Language) -> String {
        let mut text = String::from(self.name.as_str());
        if self.is_method() || !self.params.is_empty() {
            text.push('(');
            text.push_str(&self.params_text(language));
            text.push(')');
        }
        if let Some(ty) = &self.type_ref {
            text.push(':');
            text.push_str(ty.as_str());
        }
        text
    }
}

// ============================================================================
// SYMBOLS
// ============================================================================

/// A class, interface, enum, typedef or abstract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: SmolStr,
    /// `pack.Name`, or just `Name` in the root package. Empty for the void
    /// sentinel.
    pub qualified_name: Arc<str>,
    pub package: Arc<str>,
    /// Dotted path of the module declaring the type. In Haxe this is the
    /// file stem under the package, shared by every type in the file; an
    /// ActionScript type is its own module.
    pub module: Arc<str>,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<SmolStr>,
    pub members: Vec<Member>,
    /// Superclass, extended interfaces, or typedef targets.
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    /// Underlying type of an abstract.
    pub underlying: Option<TypeRef>,
    pub file: FileId,
    pub start: LineCol,
    pub open_brace: Option<LineCol>,
    pub close_brace: Option<LineCol>,
    /// Last line belonging to the declaration.
    pub end_line: u32,
}

impl Symbol {
    /// The "unknown" sentinel returned when the caret is outside any type.
    pub fn void() -> &'static Symbol {
        static VOID: OnceLock<Symbol> = OnceLock::new();
        VOID.get_or_init(|| Symbol {
            name: SmolStr::default(),
            qualified_name: Arc::from(""),
            package: Arc::from(""),
            module: Arc::from(""),
            kind: TypeKind::Class,
            modifiers: Modifiers::empty(),
            type_params: Vec::new(),
            members: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            underlying: None,
            file: FileId::DETACHED,
            start: LineCol::default(),
            open_brace: None,
            close_brace: None,
            end_line: 0,
        })
    }

    pub fn is_void(&self) -> bool {
        self.qualified_name.is_empty()
    }

    /// Whether the type names its module (`lib.Shapes` in `lib/Shapes.hx`).
    pub fn is_module_primary(&self) -> bool {
        self.module.is_empty() || *self.module == *self.qualified_name
    }

    /// Path an `import` statement uses for this type: the qualified name for
    /// a primary type, `pack.Module.Type` for a secondary one.
    pub fn import_path(&self) -> Arc<str> {
        if self.is_module_primary() {
            self.qualified_name.clone()
        } else {
            Arc::from(format!("{}.{}", self.module, self.name))
        }
    }

    /// Own member by name (no inheritance).
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.member(name).is_some()
    }

    /// Superclass reference of a class.
    pub fn superclass_ref(&self) -> Option<&TypeRef> {
        match self.kind {
            TypeKind::Class => self.extends.first(),
            _ => None,
        }
    }

    pub fn contains_line(&self, line: u32) -> bool {
        self.start.line <= line && line <= self.end_line
    }

    /// Member whose line range contains `line`.
    pub fn member_at_line(&self, line: u32) -> Option<&Member> {
        self.members.iter().find(|m| m.contains_line(line))
    }

    pub fn fields(&self) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(|m| matches!(m.kind, MemberKind::Field | MemberKind::Property))
    }

    pub fn methods(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.is_method())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_kinds() {
        assert!(TypeKind::Interface.is_restricted());
        assert!(TypeKind::Enum.is_restricted());
        assert!(TypeKind::TypeDef.is_restricted());
        assert!(!TypeKind::Class.is_restricted());
        assert!(!TypeKind::Abstract.is_restricted());
    }

    #[test]
    fn test_type_ref_names() {
        let ty = TypeRef::new("haxe.ds.Map<String,Array<Int>>");
        assert_eq!(ty.base_name(), "haxe.ds.Map");
        assert_eq!(ty.simple_name(), "Map");
        assert_eq!(
            ty.type_args(),
            vec![TypeRef::new("String"), TypeRef::new("Array<Int>")]
        );

        let vector = TypeRef::new("Vector.<int>");
        assert_eq!(vector.base_name(), "Vector");
    }

    #[test]
    fn test_type_ref_lookup_name() {
        assert_eq!(TypeRef::new("Int->Void").lookup_name(), None);
        assert_eq!(TypeRef::new("{x:Int}").lookup_name(), None);
        assert_eq!(TypeRef::new("Null<Foo>").strip_null(), TypeRef::new("Foo"));
        assert_eq!(TypeRef::new("a.Foo").lookup_name(), Some("a.Foo"));
        assert!(TypeRef::new("Void").is_void());
        assert!(TypeRef::new("void").is_void());
    }

    #[test]
    fn test_void_sentinel() {
        let void = Symbol::void();
        assert!(void.is_void());
        assert!(void.members.is_empty());
        assert!(void.file.is_detached());
    }

    #[test]
    fn test_visibility_defaults() {
        assert_eq!(
            Visibility::from_modifiers(Modifiers::STATIC, Visibility::Private),
            Visibility::Private
        );
        assert_eq!(
            Visibility::from_modifiers(Modifiers::PUBLIC | Modifiers::STATIC, Visibility::Private),
            Visibility::Public
        );
    }

    #[test]
    fn test_member_params_text() {
        let member = Member {
            name: "f".into(),
            kind: MemberKind::Method,
            visibility: Visibility::Public,
            modifiers: Modifiers::PUBLIC,
            type_ref: Some(TypeRef::new("Void")),
            params: vec![
                Param {
                    name: "a".into(),
                    type_ref: Some(TypeRef::new("Int")),
                    optional: false,
                    default: None,
                    rest: false,
                },
                Param {
                    name: "b".into(),
                    type_ref: Some(TypeRef::new("String")),
                    optional: true,
                    default: None,
                    rest: false,
                },
            ],
            accessors: None,
            start: LineCol::new(0, 0),
            end_line: 0,
            locals: Vec::new(),
        };

        assert_eq!(member.params_text(Language::Haxe), "a:Int, ?b:String");
        assert_eq!(member.args_text(), "a, b");
        assert_eq!(member.signature(Language::Haxe), "f(a:Int, ?b:String):Void");
        assert!(member.is_overridable());
    }
}
