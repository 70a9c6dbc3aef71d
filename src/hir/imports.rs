//! Per-file import table.
//!
//! Keyed by import path so that inserting an import which is already present
//! is a no-op, and iteration follows declaration order.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::syntax::ImportDecl;

/// One `import` or `using` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    /// Dotted path without a trailing `.*`.
    pub path: Arc<str>,
    pub alias: Option<SmolStr>,
    pub wildcard: bool,
    pub using: bool,
    pub line: u32,
}

impl Import {
    pub fn new(path: impl Into<Arc<str>>, line: u32) -> Self {
        Self {
            path: path.into(),
            alias: None,
            wildcard: false,
            using: false,
            line,
        }
    }

    /// Name this import introduces into the file scope.
    pub fn visible_name(&self) -> Option<&str> {
        if self.wildcard {
            return None;
        }
        match &self.alias {
            Some(alias) => Some(alias),
            None => self.path.rsplit('.').next(),
        }
    }

    fn key(&self) -> Arc<str> {
        if self.wildcard {
            Arc::from(format!("{}.*", self.path))
        } else {
            self.path.clone()
        }
    }
}

impl From<&ImportDecl> for Import {
    fn from(decl: &ImportDecl) -> Self {
        Self {
            path: Arc::from(decl.path.as_str()),
            alias: decl.alias.clone(),
            wildcard: decl.wildcard,
            using: decl.using,
            line: decl.line,
        }
    }
}

/// Where a new import line goes relative to the existing ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportSlot {
    /// Insert a line directly before this line.
    Before(u32),
    /// Insert a line directly after this line.
    After(u32),
    /// The file has no imports.
    Empty,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportTable {
    entries: IndexMap<Arc<str>, Import>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_decls<'a>(decls: impl IntoIterator<Item = &'a ImportDecl>) -> Self {
        let mut table = Self::new();
        for decl in decls {
            table.insert(Import::from(decl));
        }
        table
    }

    /// Add an import. Returns `false` if an identical path was already present.
    pub fn insert(&mut self, import: Import) -> bool {
        let key = import.key();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, import);
        true
    }

    /// Exact (non-wildcard) import of `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.get(path).is_some_and(|i| !i.wildcard)
    }

    pub fn get(&self, path: &str) -> Option<&Import> {
        self.entries.get(path)
    }

    /// Whether `qualified_name` is made visible by an import declared on or
    /// before `at_line`.
    pub fn covers(&self, qualified_name: &str, at_line: u32) -> bool {
        let package = match qualified_name.rfind('.') {
            Some(idx) => &qualified_name[..idx],
            None => "",
        };
        self.entries.values().any(|i| {
            i.line <= at_line
                && if i.wildcard {
                    *i.path == *package
                } else {
                    *i.path == *qualified_name
                }
        })
    }

    /// Candidate qualified names for a short type name, in declaration order.
    /// Aliased and exact imports come before wildcard expansions.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let mut exact = Vec::new();
        let mut wildcard = Vec::new();
        for import in self.entries.values() {
            if import.wildcard {
                wildcard.push(format!("{}.{name}", import.path));
            } else if import.visible_name() == Some(name) {
                exact.push(import.path.to_string());
            }
        }
        exact.extend(wildcard);
        exact
    }

    /// Slot for a new import of `path`. With `sorted`, the import goes before
    /// the first existing one that orders after it; otherwise after the last.
    pub fn slot_for(&self, path: &str, sorted: bool) -> ImportSlot {
        if sorted {
            let next = self
                .entries
                .values()
                .filter(|i| !i.using && &*i.path > path)
                .min_by_key(|i| i.line);
            if let Some(next) = next {
                return ImportSlot::Before(next.line);
            }
        }
        match self.last_line() {
            Some(line) => ImportSlot::After(line),
            None => ImportSlot::Empty,
        }
    }

    pub fn last_line(&self) -> Option<u32> {
        self.entries.values().map(|i| i.line).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Import> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
