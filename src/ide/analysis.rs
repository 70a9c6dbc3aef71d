//! AnalysisHost and Analysis — state owner and query snapshots.
//!
//! The `AnalysisHost` owns the file set, the symbol table and the generator
//! configuration. Queries run against an `Analysis` snapshot borrowed from
//! the host, so every query in one request sees the same model.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new();
//! host.set_file_content("src/app/Main.hx", text);
//!
//! let file = host.file_id("src/app/Main.hx").unwrap();
//! let actions = host.analysis().actions_at(file, caret);
//! host.apply_action(&actions[0], &mut buffer)?;
//! ```

use std::path::Path;
use std::sync::Arc;

use super::actions::{ActionDescriptor, describe, list_actions};
use super::edit::{EditError, SourceChange, TextBuffer};
use super::generate;
use super::labels::{DefaultLabels, LabelProvider};
use super::options::GeneratorOptions;
use crate::base::{FileId, LineCol};
use crate::hir::{
    ExprQuery, FileContext, FileInfo, FileSet, ResolutionResult, SymbolTable, lower_file,
    resolve_expression,
};
use crate::syntax::{CharacterClass, CharacterClassTable, Language, ParseError, SourceFile, parse};

/// Name of the character class used to scan expression tokens.
pub const WORD_CLASS: &str = "word";

/// What [`AnalysisHost::apply_action`] did to the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Applied { caret: LineCol },
    /// Nothing to insert, e.g. the import is already present.
    Unchanged,
}

/// Owns all mutable state for the editor layer.
pub struct AnalysisHost {
    files: FileSet,
    table: SymbolTable,
    options: GeneratorOptions,
    word_class: CharacterClass,
    labels: Box<dyn LabelProvider>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            files: FileSet::new(),
            table: SymbolTable::new(),
            options,
            word_class: CharacterClass::default(),
            labels: Box::new(DefaultLabels),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GeneratorOptions) {
        self.options = options;
    }

    pub fn set_labels(&mut self, labels: Box<dyn LabelProvider>) {
        self.labels = labels;
    }

    /// Use the editor's character classes for token scanning. Falls back to
    /// the default word class when `word` is not in the table.
    pub fn set_character_classes(&mut self, classes: &CharacterClassTable) {
        self.word_class = match classes.resolve(WORD_CLASS) {
            Some(class) => class,
            None => {
                tracing::warn!(class = WORD_CLASS, "character class missing, using default");
                CharacterClass::default()
            }
        };
    }

    pub fn word_class(&self) -> &CharacterClass {
        &self.word_class
    }

    // ------------------------------------------------------------------
    // files
    // ------------------------------------------------------------------

    /// Parse `text` as the new contents of `path` and re-index it.
    ///
    /// Returns parse errors, if any. The file is indexed regardless.
    pub fn set_file_content(&mut self, path: &str, text: &str) -> Vec<ParseError> {
        let path = Path::new(path);
        let file = self.files.file_id(path);
        let language = self.language_for(path);
        let parsed = parse(text);
        self.set_parsed_file(file, language, Arc::from(text), &parsed);
        parsed.errors
    }

    /// Index a file parsed elsewhere. `file` must come from [`Self::files`].
    pub fn set_parsed_file(
        &mut self,
        file: FileId,
        language: Language,
        text: Arc<str>,
        parsed: &SourceFile,
    ) {
        let lowered = lower_file(file, parsed, language);
        let path = self
            .files
            .path(file)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.files.set_contents(file, text.clone());
        let info = FileInfo::new(path, language, text, &lowered);
        self.table.add_file(file, info, lowered.symbols);
        tracing::trace!(?file, "indexed file");
    }

    /// Drop a file and its symbols. Returns false for unknown paths.
    pub fn remove_file(&mut self, path: &str) -> bool {
        let Some(file) = self.files.find(Path::new(path)) else {
            return false;
        };
        self.table.remove_file(file);
        self.files.remove(file);
        true
    }

    pub fn file_id(&self, path: &str) -> Option<FileId> {
        self.files.find(Path::new(path))
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    fn language_for(&self, path: &Path) -> Language {
        Language::from_path(path).unwrap_or(self.options.default_language)
    }

    // ------------------------------------------------------------------
    // queries
    // ------------------------------------------------------------------

    /// A consistent snapshot for queries.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis {
            table: &self.table,
            options: &self.options,
            word_class: &self.word_class,
            labels: self.labels.as_ref(),
        }
    }

    /// Plan `action`, apply it to `buffer`, then re-index the file from the
    /// buffer so the next query sees the new text.
    pub fn apply_action(
        &mut self,
        action: &ActionDescriptor,
        buffer: &mut dyn TextBuffer,
    ) -> Result<EditOutcome, EditError> {
        let change = self.analysis().plan(action)?;
        if change.is_noop() {
            tracing::debug!(id = action.id, "action has nothing to insert");
            return Ok(EditOutcome::Unchanged);
        }

        let caret = change.apply(buffer)?;
        let text: Arc<str> = Arc::from(buffer.text().as_ref());
        let language = self
            .files
            .language(action.file)
            .unwrap_or(self.options.default_language);
        let parsed = parse(&text);
        self.set_parsed_file(action.file, language, text, &parsed);
        Ok(EditOutcome::Applied { caret })
    }
}

/// Read-only view over an [`AnalysisHost`].
#[derive(Clone, Copy)]
pub struct Analysis<'a> {
    table: &'a SymbolTable,
    options: &'a GeneratorOptions,
    word_class: &'a CharacterClass,
    labels: &'a dyn LabelProvider,
}

impl<'a> Analysis<'a> {
    pub fn symbol_table(&self) -> &'a SymbolTable {
        self.table
    }

    pub fn context(&self, file: FileId, caret: LineCol) -> Option<FileContext<'a>> {
        FileContext::new(self.table, file, caret)
    }

    /// Resolve the token left of the caret.
    pub fn resolve_at(&self, file: FileId, caret: LineCol) -> Option<ResolutionResult> {
        let ctx = self.context(file, caret)?;
        let line = ctx.line_text(caret.line).unwrap_or_default();
        let query = ExprQuery::at_column(line, caret.col as usize, self.word_class);
        Some(resolve_expression(&ctx, &query))
    }

    /// Resolve an explicit token that ends at the caret.
    pub fn resolve(&self, file: FileId, caret: LineCol, token: &str) -> Option<ResolutionResult> {
        let ctx = self.context(file, caret)?;
        let line = ctx.line_text(caret.line).unwrap_or_default();
        let mut end = (caret.col as usize).min(line.len());
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        let before = &line[..end];
        let prefix = before.strip_suffix(token).unwrap_or(before);
        Some(resolve_expression(&ctx, &ExprQuery::new(token, prefix)))
    }

    /// Actions for the token left of the caret. Unknown files have none.
    pub fn actions_at(&self, file: FileId, caret: LineCol) -> Vec<ActionDescriptor> {
        let Some(resolution) = self.resolve_at(file, caret) else {
            return Vec::new();
        };
        self.describe(file, caret, &resolution)
    }

    /// Actions for an explicit token.
    pub fn actions_for(&self, file: FileId, caret: LineCol, token: &str) -> Vec<ActionDescriptor> {
        let Some(resolution) = self.resolve(file, caret, token) else {
            return Vec::new();
        };
        self.describe(file, caret, &resolution)
    }

    fn describe(
        &self,
        file: FileId,
        caret: LineCol,
        resolution: &ResolutionResult,
    ) -> Vec<ActionDescriptor> {
        let Some(ctx) = self.context(file, caret) else {
            return Vec::new();
        };
        let kinds = list_actions(&ctx, resolution, self.options);
        describe(kinds, file, caret, self.labels)
    }

    /// Plan the edit for a listed action without touching any buffer.
    pub fn plan(&self, action: &ActionDescriptor) -> Result<SourceChange, EditError> {
        let ctx = self
            .context(action.file, action.caret)
            .ok_or(EditError::UnknownFile(action.file))?;
        generate::plan(&ctx, &action.kind, self.options)
    }
}
