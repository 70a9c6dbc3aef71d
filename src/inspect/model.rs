//! [`Inspectable`] for the symbol model and generator options.

use super::filtered::{Inspectable, PropertyDescriptor};
use crate::hir::{Member, MemberKind, Modifiers, Symbol, TypeRef};
use crate::ide::{BraceStyle, GeneratorOptions, IndentStyle};
use crate::syntax::Language;

const BROWSABLE: &str = "Browsable";
const READ_ONLY: &str = "ReadOnly";
const ADVANCED: &str = "Advanced";

fn modifiers_text(modifiers: Modifiers) -> String {
    modifiers
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn types_text(types: &[TypeRef]) -> String {
    types.iter().map(TypeRef::as_str).collect::<Vec<_>>().join(", ")
}

impl Inspectable for Symbol {
    fn properties(&self) -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::new("name", "Identity", self.name.as_str())
                .display_name("Name")
                .attribute(BROWSABLE)
                .attribute(READ_ONLY),
            PropertyDescriptor::new("qualified_name", "Identity", &*self.qualified_name)
                .display_name("Qualified Name")
                .attribute(BROWSABLE)
                .attribute(READ_ONLY),
            PropertyDescriptor::new("package", "Identity", &*self.package)
                .display_name("Package")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("kind", "Declaration", self.kind.display())
                .display_name("Kind")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("modifiers", "Declaration", modifiers_text(self.modifiers))
                .display_name("Modifiers")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("extends", "Declaration", types_text(&self.extends))
                .display_name("Extends")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("implements", "Declaration", types_text(&self.implements))
                .display_name("Implements")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("members", "Declaration", self.members.len().to_string())
                .display_name("Members")
                .attribute(READ_ONLY),
            PropertyDescriptor::new("file", "Location", self.file.to_string())
                .display_name("File")
                .attribute(ADVANCED),
            PropertyDescriptor::new(
                "lines",
                "Location",
                format!("{}-{}", self.start.line + 1, self.end_line.saturating_add(1)),
            )
            .display_name("Lines")
            .attribute(ADVANCED),
        ]
    }
}

impl Inspectable for Member {
    fn properties(&self) -> Vec<PropertyDescriptor> {
        let kind = match self.kind {
            MemberKind::Field => "field",
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::EnumCase => "enum case",
        };
        let type_text = self.type_ref.as_ref().map(TypeRef::to_string).unwrap_or_default();
        let mut properties = vec![
            PropertyDescriptor::new("name", "Identity", self.name.as_str())
                .display_name("Name")
                .attribute(BROWSABLE)
                .attribute(READ_ONLY),
            PropertyDescriptor::new("kind", "Identity", kind)
                .display_name("Kind")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("visibility", "Declaration", self.visibility.keyword())
                .display_name("Visibility")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("static", "Declaration", self.is_static().to_string())
                .display_name("Static")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("type", "Declaration", type_text)
                .display_name("Type")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("line", "Location", (self.start.line + 1).to_string())
                .display_name("Line")
                .attribute(ADVANCED),
        ];
        if self.is_method() {
            properties.push(
                PropertyDescriptor::new("parameters", "Declaration", self.args_text())
                    .display_name("Parameters")
                    .attribute(BROWSABLE),
            );
        }
        if let Some((get, set)) = &self.accessors {
            properties.push(
                PropertyDescriptor::new("accessors", "Declaration", format!("({get}, {set})"))
                    .display_name("Accessors")
                    .attribute(BROWSABLE),
            );
        }
        properties
    }
}

impl Inspectable for GeneratorOptions {
    fn properties(&self) -> Vec<PropertyDescriptor> {
        let language = match self.default_language {
            Language::Haxe => "Haxe",
            Language::ActionScript => "ActionScript",
        };
        let indent = match self.indent {
            IndentStyle::Infer => "infer".to_string(),
            IndentStyle::Tabs => "tabs".to_string(),
            IndentStyle::Spaces(n) => format!("{n} spaces"),
        };
        let braces = match self.brace_style {
            BraceStyle::SameLine => "same line",
            BraceStyle::NextLine => "next line",
        };
        vec![
            PropertyDescriptor::new("default_language", "General", language)
                .display_name("Default Language")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("indent", "Formatting", indent)
                .display_name("Indentation")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("brace_style", "Formatting", braces)
                .display_name("Brace Style")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("field_prefix", "Generation", self.field_prefix.as_str())
                .display_name("Field Prefix")
                .attribute(BROWSABLE),
            PropertyDescriptor::new("sort_imports", "Generation", self.sort_imports.to_string())
                .display_name("Sort Imports")
                .attribute(BROWSABLE),
            PropertyDescriptor::new(
                "public_accessors",
                "Generation",
                self.public_accessors.to_string(),
            )
            .display_name("Public Accessors")
            .attribute(ADVANCED),
        ]
    }
}
