//! Per-language facts: file extensions, builtin types, declaration keywords.

use std::path::Path;

/// Source language of a file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Language {
    #[default]
    Haxe,
    ActionScript,
}

const HAXE_BUILTINS: &[&str] = &[
    "Any", "Array", "Bool", "Class", "Date", "Dynamic", "EReg", "Enum", "Float", "Int",
    "IntIterator", "Iterable", "Iterator", "KeyValueIterator", "Lambda", "Map", "Math", "Null",
    "Reflect", "Std", "String", "StringBuf", "StringTools", "Type", "UInt", "Void", "Xml",
];

const AS3_BUILTINS: &[&str] = &[
    "*", "Array", "Boolean", "Class", "Date", "Error", "Function", "Math", "Number", "Object",
    "RegExp", "String", "Vector", "XML", "XMLList", "int", "uint", "void",
];

const DECLARATION_KEYWORDS: &[&str] = &[
    "var", "final", "const", "function", "class", "interface", "enum", "typedef", "abstract",
    "extends", "implements", "new", "package", "import",
];

impl Language {
    /// Guess the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "hx" => Some(Language::Haxe),
            "as" => Some(Language::ActionScript),
            _ => None,
        }
    }

    /// File extensions (without the dot) handled for this language.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Haxe => &["hx"],
            Language::ActionScript => &["as"],
        }
    }

    /// Types visible everywhere without an import.
    pub fn builtin_types(self) -> &'static [&'static str] {
        match self {
            Language::Haxe => HAXE_BUILTINS,
            Language::ActionScript => AS3_BUILTINS,
        }
    }

    pub fn is_builtin(self, name: &str) -> bool {
        self.builtin_types().contains(&name)
    }

    /// Name of the "no value" return type.
    pub fn void_type(self) -> &'static str {
        match self {
            Language::Haxe => "Void",
            Language::ActionScript => "void",
        }
    }

    /// Type used when nothing better is known.
    pub fn dynamic_type(self) -> &'static str {
        match self {
            Language::Haxe => "Dynamic",
            Language::ActionScript => "*",
        }
    }

    /// Keywords after which the caret sits in a declaration position.
    pub fn is_declaration_keyword(self, word: &str) -> bool {
        DECLARATION_KEYWORDS.contains(&word)
    }

    /// Whether the language has `enum` and `typedef` declarations.
    pub fn has_algebraic_types(self) -> bool {
        matches!(self, Language::Haxe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("src/a/Foo.hx")), Some(Language::Haxe));
        assert_eq!(Language::from_path(Path::new("Foo.as")), Some(Language::ActionScript));
        assert_eq!(Language::from_path(Path::new("Foo.java")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_builtins_are_per_language() {
        assert!(Language::Haxe.is_builtin("Int"));
        assert!(!Language::Haxe.is_builtin("int"));
        assert!(Language::ActionScript.is_builtin("int"));
        assert!(!Language::ActionScript.is_builtin("Sprite"));
    }
}
