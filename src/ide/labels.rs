//! Localisable strings for action descriptors.
//!
//! Keys follow the editor's resource naming. A host with its own string
//! tables implements [`LabelProvider`]; [`DefaultLabels`] carries English.

use std::borrow::Cow;

/// Description shown for every generator action.
pub const GENERATOR_DESCRIPTION_KEY: &str = "ASCompletion.Info.GeneratorTemplate";

/// Icon index of generator actions in the host's icon strip.
pub const GENERATOR_ICON: u32 = 34;

pub trait LabelProvider: Send + Sync {
    /// Look up a string by key.
    fn string(&self, key: &str) -> Option<Cow<'_, str>>;

    /// Look up a string and substitute `{0}` with `arg`. Unknown keys come
    /// back as the key itself so missing translations stay visible.
    fn format(&self, key: &str, arg: &str) -> String {
        match self.string(key) {
            Some(template) => template.replace("{0}", arg),
            None => {
                tracing::debug!(key, "missing label");
                key.to_string()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultLabels;

impl LabelProvider for DefaultLabels {
    fn string(&self, key: &str) -> Option<Cow<'_, str>> {
        let text = match key {
            GENERATOR_DESCRIPTION_KEY => "Code generator",
            "ASCompletion.Label.AddImport" => "Add import {0}",
            "ASCompletion.Label.PromoteLocal" => "Promote '{0}' to class member",
            "ASCompletion.Label.GenerateGetter" => "Generate getter for '{0}'",
            "ASCompletion.Label.GenerateSetter" => "Generate setter for '{0}'",
            "ASCompletion.Label.GenerateGetterSetter" => "Generate getter and setter for '{0}'",
            "ASCompletion.Label.OverrideMethod" => "Override '{0}'",
            "ASCompletion.Label.ImplementInterface" => "Implement interface '{0}'",
            "ASCompletion.Label.GenerateDelegates" => "Generate delegate methods for '{0}'",
            "ASCompletion.Label.GenerateSwitchCases" => "Generate switch cases for '{0}'",
            "ASCompletion.Label.CreateVariable" => "Create variable '{0}'",
            "ASCompletion.Label.CreateMethod" => "Create method '{0}'",
            _ => return None,
        };
        Some(Cow::Borrowed(text))
    }
}
