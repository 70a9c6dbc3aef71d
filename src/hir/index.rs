//! Symbol table — every known type across the workspace.
//!
//! Symbols live in one arena (`symbols`) and every other map stores indices
//! into it. Slots freed by `remove_file` are reused by later additions, so
//! re-indexing a file after every edit keeps the arena at the live size.
//! Hierarchy edges are names, resolved per query with
//! [`SymbolTable::resolve_type_ref`], so cyclic `extends` chains in broken
//! code are harmless: traversals carry a visited set.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::imports::ImportTable;
use super::lower::{FileSymbols, qualify};
use super::symbols::{Member, Symbol, TypeKind, TypeRef};
use crate::base::{FileId, LineIndex};
use crate::syntax::Language;

/// Index into the symbols vector.
pub type SymbolIdx = usize;

/// Lookup surface shared by the context provider and the resolver.
pub trait SymbolProvider {
    /// Resolve a type name as seen from `from`.
    fn lookup_symbol(&self, name: &str, from: FileId) -> Option<&Symbol>;

    /// Member by name, searching supertypes after the symbol itself.
    fn lookup_member<'a>(&'a self, symbol: &'a Symbol, name: &str) -> Option<(&'a Symbol, &'a Member)>;
}

// ============================================================================
// FILE INFO
// ============================================================================

/// Per-file data kept alongside the symbols: header declarations and the
/// source snapshot the symbols were built from.
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub path: Arc<str>,
    pub language: Language,
    pub package: Arc<str>,
    pub package_line: Option<u32>,
    pub imports: ImportTable,
    /// Module shared by every type in a Haxe file.
    pub module: Option<Arc<str>>,
    source: Arc<str>,
    line_index: LineIndex,
}

impl FileInfo {
    pub fn new(
        path: impl Into<Arc<str>>,
        language: Language,
        source: impl Into<Arc<str>>,
        lowered: &FileSymbols,
    ) -> Self {
        let source = source.into();
        let path: Arc<str> = path.into();
        let module = match language {
            Language::Haxe => Path::new(&*path)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
                .map(|stem| qualify(&lowered.package, stem)),
            Language::ActionScript => None,
        };
        Self {
            path,
            language,
            module,
            package: lowered.package.clone(),
            package_line: lowered.package_line,
            imports: lowered.imports.clone(),
            line_index: LineIndex::new(&source),
            source,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Text of a 0-indexed line, without its terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let range = self.line_index.line_range(line, &self.source)?;
        Some(&self.source[range])
    }

    pub fn line_count(&self) -> u32 {
        self.line_index.line_count()
    }
}

// ============================================================================
// SYMBOL TABLE
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    /// The single source of truth for all symbols. `None` marks a free slot.
    symbols: Vec<Option<Symbol>>,
    free: Vec<SymbolIdx>,
    by_qualified_name: FxHashMap<Arc<str>, SymbolIdx>,
    by_simple_name: FxHashMap<SmolStr, Vec<SymbolIdx>>,
    by_file: FxHashMap<FileId, Vec<SymbolIdx>>,
    by_package: FxHashMap<Arc<str>, Vec<SymbolIdx>>,
    files: FxHashMap<FileId, FileInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and its symbols, replacing anything previously recorded
    /// for the same file.
    pub fn add_file(&mut self, file: FileId, info: FileInfo, symbols: Vec<Symbol>) {
        self.remove_file(file);

        let mut file_indices = Vec::with_capacity(symbols.len());
        for mut symbol in symbols {
            if let Some(module) = &info.module {
                symbol.module = module.clone();
            }
            let idx = match self.free.pop() {
                Some(idx) => idx,
                None => {
                    self.symbols.push(None);
                    self.symbols.len() - 1
                }
            };

            if let Some(previous) = self
                .by_qualified_name
                .insert(symbol.qualified_name.clone(), idx)
            {
                tracing::debug!(
                    name = %symbol.qualified_name,
                    previous_file = ?self.get(previous).map(|s| s.file),
                    ?file,
                    "duplicate type definition, latest wins"
                );
            }
            self.by_simple_name
                .entry(symbol.name.clone())
                .or_default()
                .push(idx);
            self.by_package
                .entry(symbol.package.clone())
                .or_default()
                .push(idx);

            file_indices.push(idx);
            self.symbols[idx] = Some(symbol);
        }

        self.by_file.insert(file, file_indices);
        self.files.insert(file, info);
    }

    /// Remove all symbols from a file and free their slots.
    ///
    /// A qualified name that another file still declares falls back to that
    /// file's symbol.
    pub fn remove_file(&mut self, file: FileId) {
        self.files.remove(&file);
        let Some(indices) = self.by_file.remove(&file) else {
            return;
        };

        for &idx in &indices {
            let Some(symbol) = self.symbols.get_mut(idx).and_then(Option::take) else {
                continue;
            };
            self.free.push(idx);

            if let Some(list) = self.by_simple_name.get_mut(&symbol.name) {
                list.retain(|&i| i != idx);
                if list.is_empty() {
                    self.by_simple_name.remove(&symbol.name);
                }
            }
            if let Some(list) = self.by_package.get_mut(&symbol.package) {
                list.retain(|&i| i != idx);
                if list.is_empty() {
                    self.by_package.remove(&symbol.package);
                }
            }
            if self.by_qualified_name.get(&symbol.qualified_name) == Some(&idx) {
                match self.remaining_definition(&symbol) {
                    Some(other) => {
                        self.by_qualified_name.insert(symbol.qualified_name.clone(), other);
                    }
                    None => {
                        self.by_qualified_name.remove(&symbol.qualified_name);
                    }
                }
            }
        }
    }

    /// Latest live symbol with the same qualified name as `removed`.
    fn remaining_definition(&self, removed: &Symbol) -> Option<SymbolIdx> {
        self.by_simple_name
            .get(&removed.name)?
            .iter()
            .rev()
            .copied()
            .find(|&i| self.get(i).is_some_and(|s| s.qualified_name == removed.qualified_name))
    }

    fn get(&self, idx: SymbolIdx) -> Option<&Symbol> {
        self.symbols.get(idx).and_then(Option::as_ref)
    }

    pub fn file(&self, file: FileId) -> Option<&FileInfo> {
        self.files.get(&file)
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileInfo)> {
        self.files.iter().map(|(&id, info)| (id, info))
    }

    pub fn lookup_qualified(&self, name: &str) -> Option<&Symbol> {
        self.by_qualified_name
            .get(name)
            .and_then(|&idx| self.get(idx))
    }

    /// All symbols with a simple name, in insertion order.
    pub fn lookup_simple(&self, name: &str) -> Vec<&Symbol> {
        self.by_simple_name
            .get(name)
            .map(|indices| indices.iter().filter_map(|&idx| self.get(idx)).collect())
            .unwrap_or_default()
    }

    pub fn symbols_in_file(&self, file: FileId) -> Vec<&Symbol> {
        self.by_file
            .get(&file)
            .map(|indices| indices.iter().filter_map(|&idx| self.get(idx)).collect())
            .unwrap_or_default()
    }

    pub fn symbols_in_package(&self, package: &str) -> Vec<&Symbol> {
        self.by_package
            .get(package)
            .map(|indices| indices.iter().filter_map(|&idx| self.get(idx)).collect())
            .unwrap_or_default()
    }

    /// Type `name` declared in module `module`.
    pub fn lookup_in_module(&self, module: &str, name: &str) -> Option<&Symbol> {
        self.by_simple_name
            .get(name)?
            .iter()
            .filter_map(|&idx| self.get(idx))
            .find(|s| *s.module == *module)
    }

    /// Symbol named by an import path, either a qualified name or a
    /// `pack.Module.Type` path to a secondary type.
    pub fn lookup_import_path(&self, path: &str) -> Option<&Symbol> {
        self.lookup_qualified(path).or_else(|| {
            let (module, name) = path.rsplit_once('.')?;
            self.lookup_in_module(module, name)
        })
    }

    pub fn len(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    // ========================================================================
    // TYPE NAME RESOLUTION
    // ========================================================================

    /// Resolve a type name as written in `from`.
    ///
    /// Order: types declared in the same file, imports, the file's package,
    /// then the root package. A dotted name is first tried as a fully
    /// qualified path.
    pub fn resolve_type_name(&self, name: &str, from: FileId) -> Option<&Symbol> {
        if name.contains('.') {
            if let Some(symbol) = self.lookup_qualified(name) {
                return Some(symbol);
            }
        }

        if let Some(symbol) = self
            .symbols_in_file(from)
            .into_iter()
            .find(|s| s.name == name)
        {
            return Some(symbol);
        }

        let info = self.files.get(&from)?;
        for candidate in info.imports.candidates(name) {
            if let Some(symbol) = self.lookup_import_path(&candidate) {
                return Some(symbol);
            }
        }
        // `import lib.Shapes;` brings in every type of the module
        for import in info.imports.iter().filter(|i| !i.wildcard && i.alias.is_none()) {
            if let Some(symbol) = self.lookup_in_module(&import.path, name) {
                return Some(symbol);
            }
        }

        if !info.package.is_empty() {
            if let Some(symbol) = self.lookup_qualified(&format!("{}.{name}", info.package)) {
                return Some(symbol);
            }
        }

        self.lookup_qualified(name)
    }

    /// Resolve a type reference. Function and structural types resolve to
    /// nothing; `Null<T>` resolves to `T`.
    pub fn resolve_type_ref(&self, type_ref: &TypeRef, from: FileId) -> Option<&Symbol> {
        let stripped = type_ref.strip_null();
        let name = stripped.lookup_name()?;
        self.resolve_type_name(name, from)
    }

    // ========================================================================
    // HIERARCHY
    // ========================================================================

    /// Superclass of a class, resolved from the class's own file.
    pub fn superclass(&self, symbol: &Symbol) -> Option<&Symbol> {
        let parent = symbol.superclass_ref()?;
        self.resolve_type_ref(parent, symbol.file)
    }

    /// Superclass chain, nearest first. Stops at the first repeated class.
    pub fn ancestors(&self, symbol: &Symbol) -> Vec<&Symbol> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        seen.insert(&symbol.qualified_name);

        let mut chain = Vec::new();
        let mut current = self.superclass(symbol);
        while let Some(parent) = current {
            if !seen.insert(&parent.qualified_name) {
                tracing::warn!(class = %symbol.qualified_name, "cyclic class hierarchy");
                break;
            }
            chain.push(parent);
            current = self.superclass(parent);
        }
        chain
    }

    /// Direct supertypes whose members a symbol inherits.
    fn supertypes(&self, symbol: &Symbol) -> Vec<&Symbol> {
        match symbol.kind {
            TypeKind::Class => self.superclass(symbol).into_iter().collect(),
            TypeKind::Interface | TypeKind::TypeDef => symbol
                .extends
                .iter()
                .filter_map(|t| self.resolve_type_ref(t, symbol.file))
                .collect(),
            TypeKind::Enum | TypeKind::Abstract => Vec::new(),
        }
    }

    /// Find a member on a symbol or its supertypes, returning the owner.
    pub fn find_member<'a>(&'a self, symbol: &'a Symbol, name: &str) -> Option<(&'a Symbol, &'a Member)> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut queue = vec![symbol];
        while let Some(current) = queue.pop() {
            if !seen.insert(&current.qualified_name) {
                continue;
            }
            if let Some(member) = current.member(name) {
                return Some((current, member));
            }
            let mut parents = self.supertypes(current);
            parents.reverse();
            queue.extend(parents);
        }
        None
    }

    /// Interfaces extended by `interface`, including itself, transitively.
    pub fn interface_closure<'a>(&'a self, interface: &'a Symbol) -> Vec<&'a Symbol> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut result = Vec::new();
        let mut queue = vec![interface];
        while let Some(current) = queue.pop() {
            if !seen.insert(&current.qualified_name) {
                continue;
            }
            result.push(current);
            queue.extend(
                current
                    .extends
                    .iter()
                    .filter_map(|t| self.resolve_type_ref(t, current.file))
                    .filter(|s| s.kind == TypeKind::Interface),
            );
        }
        result
    }

    /// Every interface a class implements, directly, through its superclass
    /// chain, or through interface inheritance. Unresolvable names are
    /// skipped.
    pub fn all_interfaces<'a>(&'a self, class: &'a Symbol) -> Vec<&'a Symbol> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut result = Vec::new();
        let owners = std::iter::once(class).chain(self.ancestors(class));
        for owner in owners {
            for type_ref in &owner.implements {
                let Some(direct) = self.resolve_type_ref(type_ref, owner.file) else {
                    continue;
                };
                for interface in self.interface_closure(direct) {
                    if seen.insert(&interface.qualified_name) {
                        result.push(interface);
                    }
                }
            }
        }
        result
    }
}

impl SymbolProvider for SymbolTable {
    fn lookup_symbol(&self, name: &str, from: FileId) -> Option<&Symbol> {
        self.resolve_type_name(name, from)
    }

    fn lookup_member<'a>(&'a self, symbol: &'a Symbol, name: &str) -> Option<(&'a Symbol, &'a Member)> {
        self.find_member(symbol, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::lower::lower_file;
    use crate::syntax::parse;

    fn add(table: &mut SymbolTable, id: u32, path: &str, text: &str) {
        let file = FileId::new(id);
        let lowered = lower_file(file, &parse(text), Language::Haxe);
        let info = FileInfo::new(path, Language::Haxe, text, &lowered);
        table.add_file(file, info, lowered.symbols);
    }

    fn hierarchy() -> SymbolTable {
        let mut table = SymbolTable::new();
        add(
            &mut table,
            0,
            "a/Base.hx",
            "package a;\ninterface IRun { function run():Void; }\ninterface IFast extends IRun { function go():Void; }\nclass Base implements IFast {\n  public function tick():Void {}\n}\n",
        );
        add(
            &mut table,
            1,
            "b/Child.hx",
            "package b;\nimport a.Base;\nclass Child extends Base {\n  var speed:Int;\n}\n",
        );
        table
    }

    #[test]
    fn test_add_and_lookup() {
        let table = hierarchy();
        assert_eq!(table.len(), 4);
        assert_eq!(table.file_count(), 2);
        assert!(table.lookup_qualified("a.Base").is_some());
        assert_eq!(table.lookup_simple("Child").len(), 1);
        assert_eq!(table.symbols_in_package("a").len(), 3);
    }

    #[test]
    fn test_remove_file() {
        let mut table = hierarchy();
        table.remove_file(FileId::new(0));
        assert_eq!(table.len(), 1);
        assert!(table.lookup_qualified("a.Base").is_none());
        assert!(table.lookup_simple("IRun").is_empty());
        assert!(table.file(FileId::new(0)).is_none());
    }

    #[test]
    fn test_re_adding_a_file_replaces_it() {
        let mut table = hierarchy();
        add(&mut table, 1, "b/Child.hx", "package b;\nclass Renamed {}\n");
        assert!(table.lookup_qualified("b.Child").is_none());
        assert!(table.lookup_qualified("b.Renamed").is_some());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_resolve_type_name_through_import() {
        let table = hierarchy();
        let base = table.resolve_type_name("Base", FileId::new(1)).unwrap();
        assert_eq!(&*base.qualified_name, "a.Base");
        // same package, no import needed
        let run = table.resolve_type_name("IRun", FileId::new(0)).unwrap();
        assert_eq!(&*run.qualified_name, "a.IRun");
        // not visible from b without an import
        assert!(table.resolve_type_name("IRun", FileId::new(1)).is_none());
    }

    #[test]
    fn test_inherited_member_lookup() {
        let table = hierarchy();
        let child = table.lookup_qualified("b.Child").unwrap();
        let (owner, member) = table.find_member(child, "tick").unwrap();
        assert_eq!(&*owner.qualified_name, "a.Base");
        assert_eq!(member.name, "tick");
        assert!(table.find_member(child, "missing").is_none());
    }

    #[test]
    fn test_all_interfaces_through_superclass() {
        let table = hierarchy();
        let child = table.lookup_qualified("b.Child").unwrap();
        let names: Vec<_> = table
            .all_interfaces(child)
            .iter()
            .map(|s| s.qualified_name.to_string())
            .collect();
        assert_eq!(names, vec!["a.IFast", "a.IRun"]);
    }

    #[test]
    fn test_reindexing_reuses_freed_slots() {
        let mut table = SymbolTable::new();
        for _ in 0..1000 {
            add(&mut table, 0, "a/Foo.hx", "package a;\nclass Foo {}\n");
        }
        assert_eq!(table.len(), 1);
        assert_eq!(table.symbols.len(), 1);

        add(&mut table, 0, "a/Foo.hx", "package a;\nclass Foo {}\nclass Bar {}\n");
        add(&mut table, 0, "a/Foo.hx", "package a;\nclass Foo {}\n");
        assert_eq!(table.symbols.len(), 2);
        assert_eq!(table.free.len(), 1);
        assert!(table.lookup_qualified("a.Bar").is_none());
    }

    #[test]
    fn test_duplicate_definition_survives_removal_of_the_later_one() {
        let mut table = SymbolTable::new();
        add(&mut table, 0, "a/Foo.hx", "package a;\nclass Foo {}\n");
        add(&mut table, 1, "copy/a/Foo.hx", "package a;\nclass Foo {}\n");
        assert_eq!(table.lookup_qualified("a.Foo").map(|s| s.file), Some(FileId::new(1)));

        table.remove_file(FileId::new(1));
        assert_eq!(table.lookup_qualified("a.Foo").map(|s| s.file), Some(FileId::new(0)));

        table.remove_file(FileId::new(0));
        assert!(table.lookup_qualified("a.Foo").is_none());
    }

    #[test]
    fn test_module_types_share_the_file_module() {
        let mut table = SymbolTable::new();
        add(&mut table, 0, "lib/Shapes.hx", "package lib;\nclass Shapes {}\nclass Circle {}\n");
        add(&mut table, 1, "app/Main.hx", "package app;\nimport lib.Shapes;\nclass Main {}\n");

        let circle = table.lookup_qualified("lib.Circle").unwrap();
        assert_eq!(&*circle.module, "lib.Shapes");
        assert!(!circle.is_module_primary());
        assert_eq!(&*circle.import_path(), "lib.Shapes.Circle");
        let shapes = table.lookup_qualified("lib.Shapes").unwrap();
        assert_eq!(&*shapes.import_path(), "lib.Shapes");

        let seen = table.resolve_type_name("Circle", FileId::new(1)).unwrap();
        assert_eq!(&*seen.qualified_name, "lib.Circle");
        assert_eq!(
            table.lookup_import_path("lib.Shapes.Circle").map(|s| &*s.qualified_name),
            Some("lib.Circle")
        );
    }

    #[test]
    fn test_cyclic_hierarchy_terminates() {
        let mut table = SymbolTable::new();
        add(
            &mut table,
            0,
            "Cycle.hx",
            "class A extends B {}\nclass B extends A {}\n",
        );
        let a = table.lookup_qualified("A").unwrap();
        assert_eq!(table.ancestors(a).len(), 1);
        assert!(table.find_member(a, "x").is_none());
    }
}
