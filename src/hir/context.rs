//! Context provider — what encloses the caret in a file.

use std::sync::Arc;

use super::imports::ImportTable;
use super::index::{FileInfo, SymbolProvider, SymbolTable};
use super::symbols::{Member, Symbol};
use crate::base::{FileId, LineCol};
use crate::syntax::Language;

/// Read-only view of one file at one caret position.
///
/// Built from a consistent [`SymbolTable`] snapshot; nothing here mutates.
#[derive(Clone, Copy, Debug)]
pub struct FileContext<'a> {
    table: &'a SymbolTable,
    file: FileId,
    info: &'a FileInfo,
    caret: LineCol,
}

impl<'a> FileContext<'a> {
    /// `None` when the file is not in the table.
    pub fn new(table: &'a SymbolTable, file: FileId, caret: LineCol) -> Option<Self> {
        let info = table.file(file)?;
        Some(Self {
            table,
            file,
            info,
            caret,
        })
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    /// Name and member lookups used by the expression resolver.
    pub fn symbols(&self) -> &'a dyn SymbolProvider {
        self.table
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn info(&self) -> &'a FileInfo {
        self.info
    }

    pub fn caret(&self) -> LineCol {
        self.caret
    }

    pub fn language(&self) -> Language {
        self.info.language
    }

    pub fn package(&self) -> &'a Arc<str> {
        &self.info.package
    }

    pub fn imports(&self) -> &'a ImportTable {
        &self.info.imports
    }

    pub fn line_text(&self, line: u32) -> Option<&'a str> {
        self.info.line_text(line)
    }

    /// Innermost type declaration containing the caret line, or the void
    /// sentinel when the caret is outside every type.
    pub fn current_class(&self) -> &'a Symbol {
        let line = self.caret.line;
        self.table
            .symbols_in_file(self.file)
            .into_iter()
            .filter(|s| s.contains_line(line))
            .max_by_key(|s| s.start)
            .unwrap_or_else(|| Symbol::void())
    }

    /// Member of the current class whose range contains the caret line.
    pub fn current_member(&self) -> Option<&'a Member> {
        let class = self.current_class();
        if class.is_void() {
            return None;
        }
        class.member_at_line(self.caret.line)
    }

    /// Whether `symbol` can be named in this file at `at_line` without a new
    /// import: declared in this file, in the same package, in the root
    /// package, or covered by an import on or above that line. Importing a
    /// module covers every type declared in it.
    pub fn is_imported(&self, symbol: &Symbol, at_line: u32) -> bool {
        if symbol.is_void() {
            return false;
        }
        symbol.file == self.file
            || *symbol.package == **self.package()
            || symbol.package.is_empty()
            || self.imports().covers(&symbol.module, at_line)
            || self.imports().covers(&symbol.import_path(), at_line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::index::FileInfo;
    use crate::hir::lower::lower_file;
    use crate::syntax::parse;

    const MAIN: &str = "package app;\n\nimport lib.Shown;\n\nclass Main {\n  var count:Int;\n\n  public function run():Void {\n    count++;\n  }\n}\n";

    fn table() -> SymbolTable {
        let mut table = SymbolTable::new();
        for (id, path, text) in [
            (0, "app/Main.hx", MAIN),
            (1, "lib/Shown.hx", "package lib;\nclass Shown {}\nclass Extra {}\n"),
            (4, "lib/Hidden.hx", "package lib;\nclass Hidden {}\n"),
            (2, "app/Sibling.hx", "package app;\nclass Sibling {}\n"),
            (3, "Root.hx", "class Root {}\n"),
        ] {
            let file = FileId::new(id);
            let lowered = lower_file(file, &parse(text), Language::Haxe);
            let info = FileInfo::new(path, Language::Haxe, text, &lowered);
            table.add_file(file, info, lowered.symbols);
        }
        table
    }

    #[test]
    fn test_current_class_and_member() {
        let table = table();
        let ctx = FileContext::new(&table, FileId::new(0), LineCol::new(8, 4)).unwrap();
        assert_eq!(&*ctx.current_class().qualified_name, "app.Main");
        assert_eq!(ctx.current_member().map(|m| m.name.as_str()), Some("run"));

        let between = FileContext::new(&table, FileId::new(0), LineCol::new(6, 0)).unwrap();
        assert_eq!(&*between.current_class().qualified_name, "app.Main");
        assert!(between.current_member().is_none());
    }

    #[test]
    fn test_caret_outside_any_type_is_void() {
        let table = table();
        let ctx = FileContext::new(&table, FileId::new(0), LineCol::new(1, 0)).unwrap();
        assert!(ctx.current_class().is_void());
        assert!(ctx.current_member().is_none());
    }

    #[test]
    fn test_unknown_file() {
        let table = table();
        assert!(FileContext::new(&table, FileId::new(42), LineCol::new(0, 0)).is_none());
    }

    #[test]
    fn test_is_imported() {
        let table = table();
        let ctx = FileContext::new(&table, FileId::new(0), LineCol::new(8, 4)).unwrap();
        let get = |name: &str| table.lookup_qualified(name).unwrap();

        assert!(ctx.is_imported(get("lib.Shown"), 8));
        assert!(!ctx.is_imported(get("lib.Hidden"), 8));
        // secondary type of the imported module
        assert!(ctx.is_imported(get("lib.Extra"), 8));
        assert!(ctx.is_imported(get("app.Sibling"), 8));
        assert!(ctx.is_imported(get("Root"), 8));
        assert!(ctx.is_imported(get("app.Main"), 8));
        assert!(!ctx.is_imported(Symbol::void(), 8));
        // the import sits on line 2
        assert!(!ctx.is_imported(get("lib.Shown"), 1));
    }
}
