//! Editor features — action catalog, edit planning and the analysis host.
//!
//! This module sits between the semantic model (HIR) and the editor. It
//! never talks to an editor directly: actions come out as plain
//! [`ActionDescriptor`]s and edits go into any [`TextBuffer`].
//!
//! ## Flow
//!
//! 1. [`Analysis::resolve_at`] resolves the token left of the caret.
//! 2. [`list_actions`] turns the resolution into applicable [`ActionKind`]s.
//! 3. [`plan`] computes a [`SourceChange`] for one action.
//! 4. [`SourceChange::apply`] verifies anchors and writes to the buffer.
//!
//! ```ignore
//! use asgen::ide::{AnalysisHost, SourceBuffer};
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("app/Main.hx", text);
//!
//! let file = host.file_id("app/Main.hx").unwrap();
//! let actions = host.analysis().actions_at(file, caret);
//! let mut buffer = SourceBuffer::new(text);
//! host.apply_action(&actions[0], &mut buffer)?;
//! ```

mod actions;
mod analysis;
mod edit;
mod generate;
mod labels;
mod options;

pub use actions::{ActionDescriptor, ActionKind, describe, list_actions};
pub use analysis::{Analysis, AnalysisHost, EditOutcome, WORD_CLASS};
pub use edit::{Anchor, EditError, SourceBuffer, SourceChange, TextBuffer, TextEdit};
pub use generate::plan;
pub use labels::{DefaultLabels, GENERATOR_DESCRIPTION_KEY, GENERATOR_ICON, LabelProvider};
pub use options::{BraceStyle, GeneratorOptions, IndentStyle};
