//! Generator options — formatting choices for emitted code.

use smol_str::SmolStr;

use crate::syntax::Language;

/// Indentation for generated lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndentStyle {
    /// Copy the indentation of neighbouring lines.
    #[default]
    Infer,
    Tabs,
    Spaces(u8),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BraceStyle {
    #[default]
    SameLine,
    NextLine,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorOptions {
    /// Language assumed for files whose extension is not recognised.
    pub default_language: Language,
    pub indent: IndentStyle,
    pub brace_style: BraceStyle,
    /// Prefix that marks a backing field for accessor generation.
    pub field_prefix: SmolStr,
    /// Insert imports in alphabetical position instead of appending.
    pub sort_imports: bool,
    /// Emit `public` on generated accessors and delegates.
    pub public_accessors: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            default_language: Language::Haxe,
            indent: IndentStyle::Infer,
            brace_style: BraceStyle::SameLine,
            field_prefix: SmolStr::new_static("_"),
            sort_imports: true,
            public_accessors: true,
        }
    }
}

impl GeneratorOptions {
    pub fn with_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    pub fn with_indent(mut self, indent: IndentStyle) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_brace_style(mut self, brace_style: BraceStyle) -> Self {
        self.brace_style = brace_style;
        self
    }

    pub fn with_field_prefix(mut self, prefix: &str) -> Self {
        self.field_prefix = SmolStr::new(prefix);
        self
    }

    /// Indent unit implied by the style, or `None` to infer it.
    pub fn indent_unit(&self) -> Option<String> {
        match self.indent {
            IndentStyle::Infer => None,
            IndentStyle::Tabs => Some("\t".to_string()),
            IndentStyle::Spaces(n) => Some(" ".repeat(usize::from(n.max(1)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = GeneratorOptions::default();
        assert_eq!(options.field_prefix, "_");
        assert!(options.sort_imports);
        assert_eq!(options.indent_unit(), None);
    }

    #[test]
    fn test_indent_unit() {
        let options = GeneratorOptions::default().with_indent(IndentStyle::Spaces(2));
        assert_eq!(options.indent_unit().as_deref(), Some("  "));
        let tabs = GeneratorOptions {
            indent: IndentStyle::Tabs,
            ..GeneratorOptions::default()
        };
        assert_eq!(tabs.indent_unit().as_deref(), Some("\t"));
    }
}
