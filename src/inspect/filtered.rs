//! Filtered property view over any [`Inspectable`] object.
//!
//! Properties can be narrowed by attribute (allow-list or deny-list, only
//! one at a time) and by name. Naming an attribute or property the object
//! does not have is a caller error, reported as [`FilterError`].

use std::cmp::Ordering;

use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(SmolStr),

    #[error("property not found: {0}")]
    PropertyNotFound(SmolStr),
}

/// One displayable property of an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: SmolStr,
    pub display_name: SmolStr,
    pub category: SmolStr,
    pub value: String,
    pub attributes: Vec<SmolStr>,
}

impl PropertyDescriptor {
    pub fn new(name: &str, category: &str, value: impl Into<String>) -> Self {
        Self {
            name: SmolStr::new(name),
            display_name: SmolStr::new(name),
            category: SmolStr::new(category),
            value: value.into(),
            attributes: Vec::new(),
        }
    }

    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = SmolStr::new(display_name);
        self
    }

    pub fn attribute(mut self, attribute: &str) -> Self {
        self.attributes.push(SmolStr::new(attribute));
        self
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// An object that can list its properties.
pub trait Inspectable {
    fn properties(&self) -> Vec<PropertyDescriptor>;
}

/// Category first, then display name, both ordinal.
pub fn compare_descriptors(a: &PropertyDescriptor, b: &PropertyDescriptor) -> Ordering {
    a.category
        .as_str()
        .cmp(b.category.as_str())
        .then_with(|| a.display_name.as_str().cmp(b.display_name.as_str()))
}

pub struct FilteredView<'a, T: Inspectable + ?Sized> {
    target: Option<&'a T>,
    browsable_attributes: Vec<SmolStr>,
    hidden_attributes: Vec<SmolStr>,
    browsable_properties: Vec<SmolStr>,
    hidden_properties: Vec<SmolStr>,
}

impl<'a, T: Inspectable + ?Sized> FilteredView<'a, T> {
    pub fn new(target: &'a T) -> Self {
        Self {
            target: Some(target),
            browsable_attributes: Vec::new(),
            hidden_attributes: Vec::new(),
            browsable_properties: Vec::new(),
            hidden_properties: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self {
            target: None,
            browsable_attributes: Vec::new(),
            hidden_attributes: Vec::new(),
            browsable_properties: Vec::new(),
            hidden_properties: Vec::new(),
        }
    }

    pub fn target(&self) -> Option<&'a T> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<&'a T>) {
        self.target = target;
    }

    /// Show only properties carrying one of `attributes`. Clears the hidden
    /// attribute list.
    pub fn set_browsable_attributes<I, S>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hidden_attributes.clear();
        self.browsable_attributes = collect(attributes);
    }

    /// Hide properties carrying any of `attributes`. Clears the browsable
    /// attribute list.
    pub fn set_hidden_attributes<I, S>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.browsable_attributes.clear();
        self.hidden_attributes = collect(attributes);
    }

    /// Show exactly these properties, overriding every other filter.
    pub fn set_browsable_properties<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.browsable_properties = collect(names);
    }

    pub fn set_hidden_properties<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.hidden_properties = collect(names);
    }

    pub fn browsable_attributes(&self) -> &[SmolStr] {
        &self.browsable_attributes
    }

    pub fn hidden_attributes(&self) -> &[SmolStr] {
        &self.hidden_attributes
    }

    /// Compute the visible properties, sorted by category then display name.
    pub fn refresh(&self) -> Result<Vec<PropertyDescriptor>, FilterError> {
        let Some(target) = self.target else {
            return Ok(Vec::new());
        };
        let all = target.properties();
        let mut shown: Vec<PropertyDescriptor> = Vec::new();

        if !self.browsable_attributes.is_empty() {
            for attribute in &self.browsable_attributes {
                for property in with_attribute(&all, attribute)? {
                    show(&mut shown, property);
                }
            }
        } else {
            shown.extend(all.iter().cloned());
            for attribute in &self.hidden_attributes {
                for property in with_attribute(&all, attribute)? {
                    shown.retain(|p| p.name != property.name);
                }
            }
        }

        for name in &self.hidden_properties {
            let property = by_name(&all, name)?;
            shown.retain(|p| p.name != property.name);
        }

        if !self.browsable_properties.is_empty() {
            shown.clear();
            for name in &self.browsable_properties {
                show(&mut shown, by_name(&all, name)?);
            }
        }

        shown.sort_by(compare_descriptors);
        tracing::trace!(total = all.len(), shown = shown.len(), "refreshed property view");
        Ok(shown)
    }
}

fn collect<I, S>(items: I) -> Vec<SmolStr>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items.into_iter().map(|s| SmolStr::new(s.as_ref())).collect()
}

fn with_attribute<'p>(
    all: &'p [PropertyDescriptor],
    attribute: &SmolStr,
) -> Result<Vec<&'p PropertyDescriptor>, FilterError> {
    let matching: Vec<_> = all.iter().filter(|p| p.has_attribute(attribute)).collect();
    if matching.is_empty() {
        return Err(FilterError::AttributeNotFound(attribute.clone()));
    }
    Ok(matching)
}

fn by_name<'p>(all: &'p [PropertyDescriptor], name: &SmolStr) -> Result<&'p PropertyDescriptor, FilterError> {
    all.iter()
        .find(|p| p.name == *name)
        .ok_or_else(|| FilterError::PropertyNotFound(name.clone()))
}

fn show(shown: &mut Vec<PropertyDescriptor>, property: &PropertyDescriptor) {
    if !shown.iter().any(|p| p.name == property.name) {
        shown.push(property.clone());
    }
}
