//! Character classes — which characters make up a "word" for token scanning.
//!
//! A class lists its own characters and may inherit the characters of
//! another named class. Editor configuration normally provides these; the
//! default class covers ASCII identifiers.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// Characters of the default word class.
pub const DEFAULT_WORD_CHARS: &str =
    "qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJKLZXCVBNM0123456789_";

/// A named set of characters, optionally extending another class.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterClass {
    pub name: SmolStr,
    pub inherit: Option<SmolStr>,
    pub chars: String,
}

impl CharacterClass {
    /// A class holding the default word characters.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            inherit: None,
            chars: DEFAULT_WORD_CHARS.to_string(),
        }
    }

    pub fn with_chars(mut self, chars: impl Into<String>) -> Self {
        self.chars = chars.into();
        self
    }

    pub fn inheriting(mut self, parent: impl Into<SmolStr>) -> Self {
        self.inherit = Some(parent.into());
        self
    }

    /// Whether `c` is a word character of this class alone (no inheritance).
    ///
    /// Non-ASCII identifier characters are always accepted so that unicode
    /// identifiers scan as one token.
    pub fn contains(&self, c: char) -> bool {
        self.chars.contains(c) || (!c.is_ascii() && unicode_ident::is_xid_continue(c))
    }
}

impl Default for CharacterClass {
    fn default() -> Self {
        Self::new("word")
    }
}

/// Named character classes with inheritance resolution.
#[derive(Clone, Debug, Default)]
pub struct CharacterClassTable {
    classes: IndexMap<SmolStr, CharacterClass>,
}

impl CharacterClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a class.
    pub fn insert(&mut self, class: CharacterClass) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&CharacterClass> {
        self.classes.get(name)
    }

    /// Full character list of a class: its own characters followed by the
    /// inherited ones. Unknown parents contribute nothing; inheritance
    /// cycles are cut at the first repeated class.
    pub fn characters(&self, name: &str) -> Option<String> {
        let mut class = self.classes.get(name)?;
        let mut result = class.chars.clone();
        let mut seen = FxHashSet::default();
        seen.insert(class.name.clone());

        while let Some(parent) = class.inherit.as_deref() {
            let Some(next) = self.classes.get(parent) else {
                break;
            };
            if !seen.insert(next.name.clone()) {
                tracing::warn!(class = %name, parent, "character class inheritance cycle");
                break;
            }
            result.push_str(&next.chars);
            class = next;
        }

        Some(result)
    }

    /// Flatten a class (with its ancestors) into a standalone class.
    pub fn resolve(&self, name: &str) -> Option<CharacterClass> {
        let chars = self.characters(name)?;
        Some(CharacterClass {
            name: SmolStr::new(name),
            inherit: None,
            chars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_class_chars() {
        let class = CharacterClass::default();
        assert!(class.contains('a'));
        assert!(class.contains('_'));
        assert!(class.contains('9'));
        assert!(!class.contains('.'));
        assert!(!class.contains('$'));
        assert!(class.contains('é'));
    }

    #[test]
    fn test_inherited_characters_are_appended() {
        let mut table = CharacterClassTable::new();
        table.insert(CharacterClass::new("base").with_chars("ab"));
        table.insert(CharacterClass::new("ext").with_chars("$").inheriting("base"));

        assert_eq!(table.characters("ext").as_deref(), Some("$ab"));
        assert_eq!(table.characters("base").as_deref(), Some("ab"));
        assert!(table.characters("missing").is_none());
    }

    #[test]
    fn test_unknown_parent_contributes_nothing() {
        let mut table = CharacterClassTable::new();
        table.insert(CharacterClass::new("x").with_chars("x").inheriting("nope"));
        assert_eq!(table.characters("x").as_deref(), Some("x"));
    }

    #[test]
    fn test_inheritance_cycle_is_cut() {
        let mut table = CharacterClassTable::new();
        table.insert(CharacterClass::new("a").with_chars("a").inheriting("b"));
        table.insert(CharacterClass::new("b").with_chars("b").inheriting("a"));

        assert_eq!(table.characters("a").as_deref(), Some("ab"));
        let resolved = table.resolve("b").unwrap();
        assert!(resolved.contains('a') && resolved.contains('b'));
        assert!(resolved.inherit.is_none());
    }
}
