//! # asgen-base
//!
//! Symbol resolution and contextual code generation for Haxe and
//! ActionScript sources.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide      → action catalog, edit planning, AnalysisHost
//!   ↓
//! hir      → symbol table, file context, expression resolver
//!   ↓
//! syntax   → lexer + declaration parser, character classes
//!   ↓
//! base     → primitives (FileId, LineCol, LineIndex)
//! ```
//!
//! `inspect` (property views) and `project` (loading source trees) sit on
//! top of `ide`.

/// Foundation types: FileId, LineCol, LineIndex
pub mod base;

/// Lexer, declaration parser and character classes
pub mod syntax;

/// Semantic model: symbols, imports, context and resolution
pub mod hir;

/// Editor features: actions, edits and the analysis host
pub mod ide;

/// Filtered property views
pub mod inspect;

/// Workspace loading
pub mod project;

pub use base::{FileId, LineCol, LineIndex, TextRange, TextSize};
pub use ide::{Analysis, AnalysisHost};
