//! Text edit emitter — planned insertions and the buffer they apply to.
//!
//! A [`SourceChange`] is computed against the parsed snapshot of a file.
//! Each change records [`Anchor`]s, the snapshot text of the lines it
//! relies on. Before anything is written the anchors are compared with the
//! live buffer; any mismatch aborts the whole change with
//! [`EditError::StaleAnchor`] and the buffer is left untouched.

use std::borrow::Cow;

use thiserror::Error;

use crate::base::{FileId, LineCol, LineIndex, TextSize};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("line {line} changed since the file was parsed")]
    StaleAnchor { line: u32 },

    #[error("position {0:?} is outside the buffer")]
    InvalidPosition(LineCol),

    #[error("no insertion point: {0}")]
    MissingAnchor(String),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("file {0} is not loaded")]
    UnknownFile(FileId),

    #[error("action no longer applies: {0}")]
    NotApplicable(String),
}

// ============================================================================
// BUFFER
// ============================================================================

/// The editor buffer edits are applied to.
pub trait TextBuffer {
    fn line_count(&self) -> u32;

    /// Text of a 0-indexed line without its terminator.
    fn read_line(&self, line: u32) -> Option<Cow<'_, str>>;

    fn insert_text(&mut self, at: LineCol, text: &str) -> Result<(), EditError>;

    fn caret_position(&self) -> LineCol;

    fn set_caret_position(&mut self, position: LineCol);

    /// Full buffer contents.
    fn text(&self) -> Cow<'_, str>;
}

/// In-memory [`TextBuffer`] over a `String`.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    text: String,
    index: LineIndex,
    caret: LineCol,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index: LineIndex::new(&text),
            text,
            caret: LineCol::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl TextBuffer for SourceBuffer {
    fn line_count(&self) -> u32 {
        self.index.line_count()
    }

    fn read_line(&self, line: u32) -> Option<Cow<'_, str>> {
        let range = self.index.line_range(line, &self.text)?;
        Some(Cow::Borrowed(&self.text[range]))
    }

    fn insert_text(&mut self, at: LineCol, text: &str) -> Result<(), EditError> {
        let line = self
            .index
            .line_range(at.line, &self.text)
            .ok_or(EditError::InvalidPosition(at))?;
        if TextSize::from(at.col) > line.len() {
            return Err(EditError::InvalidPosition(at));
        }
        let offset = usize::from(line.start() + TextSize::from(at.col));
        if !self.text.is_char_boundary(offset) {
            return Err(EditError::InvalidPosition(at));
        }
        self.text.insert_str(offset, text);
        self.index = LineIndex::new(&self.text);
        Ok(())
    }

    fn caret_position(&self) -> LineCol {
        self.caret
    }

    fn set_caret_position(&mut self, position: LineCol) {
        self.caret = position;
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }
}

// ============================================================================
// CHANGES
// ============================================================================

/// Snapshot text of a line a change depends on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    pub line: u32,
    pub expected: String,
}

/// Insert `text` at `at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub at: LineCol,
    pub text: String,
}

/// A set of insertions into one file, planned against one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceChange {
    pub file: FileId,
    pub anchors: Vec<Anchor>,
    pub edits: Vec<TextEdit>,
    /// Edit the caret ends up after; the last one added unless set.
    pub primary: Option<usize>,
}

impl SourceChange {
    pub fn new(file: FileId) -> Self {
        Self {
            file,
            anchors: Vec::new(),
            edits: Vec::new(),
            primary: None,
        }
    }

    /// Record that `line` must still read `expected` when applied.
    pub fn anchor(&mut self, line: u32, expected: impl Into<String>) -> &mut Self {
        let expected = expected.into();
        if !self.anchors.iter().any(|a| a.line == line) {
            self.anchors.push(Anchor { line, expected });
        }
        self
    }

    pub fn insert(&mut self, at: LineCol, text: impl Into<String>) -> &mut Self {
        self.edits.push(TextEdit {
            at,
            text: text.into(),
        });
        self.primary = Some(self.edits.len() - 1);
        self
    }

    /// A change with nothing to insert.
    pub fn is_noop(&self) -> bool {
        self.edits.iter().all(|e| e.text.is_empty())
    }

    /// Check every anchor and edit position against `buffer`.
    pub fn verify(&self, buffer: &dyn TextBuffer) -> Result<(), EditError> {
        for anchor in &self.anchors {
            match buffer.read_line(anchor.line) {
                Some(current) if current == anchor.expected.as_str() => {}
                _ => return Err(EditError::StaleAnchor { line: anchor.line }),
            }
        }
        for edit in &self.edits {
            let fits = buffer
                .read_line(edit.at.line)
                .is_some_and(|line| edit.at.col as usize <= line.len());
            if !fits {
                return Err(EditError::InvalidPosition(edit.at));
            }
        }
        Ok(())
    }

    /// Verify, then insert every edit. Returns the caret position after the
    /// primary edit's text and moves the buffer caret there.
    pub fn apply(&self, buffer: &mut dyn TextBuffer) -> Result<LineCol, EditError> {
        self.verify(buffer)?;

        let mut order: Vec<usize> = (0..self.edits.len()).collect();
        order.sort_by_key(|&idx| (self.edits[idx].at, idx));

        // back to front so earlier positions stay valid
        for &idx in order.iter().rev() {
            let edit = &self.edits[idx];
            buffer.insert_text(edit.at, &edit.text)?;
        }

        let caret = self.caret_after(&order);
        buffer.set_caret_position(caret);
        tracing::debug!(file = ?self.file, edits = self.edits.len(), ?caret, "applied source change");
        Ok(caret)
    }

    fn caret_after(&self, order: &[usize]) -> LineCol {
        let Some(primary) = self.primary.or_else(|| order.last().copied()) else {
            return LineCol::default();
        };
        let rank = order.iter().position(|&idx| idx == primary).unwrap_or(0);
        let target = &self.edits[primary];

        let mut start = target.at;
        for &idx in order[..rank].iter().rev() {
            let earlier = &self.edits[idx];
            start = shift(start, earlier.at, &earlier.text);
        }
        start.advance(&target.text)
    }
}

/// Where `pos` moves to after inserting `text` at `at` (`at <= pos`).
fn shift(pos: LineCol, at: LineCol, text: &str) -> LineCol {
    if at > pos {
        return pos;
    }
    if at.line != pos.line {
        let added = text.matches('\n').count() as u32;
        return LineCol::new(pos.line + added, pos.col);
    }
    let end = at.advance(text);
    LineCol::new(end.line, end.col + (pos.col - at.col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_insert_and_read() {
        let mut buffer = SourceBuffer::new("class A {\n}\n");
        buffer.insert_text(LineCol::new(0, 9), "\n  var x:Int;").unwrap();
        assert_eq!(buffer.as_str(), "class A {\n  var x:Int;\n}\n");
        assert_eq!(buffer.read_line(1).as_deref(), Some("  var x:Int;"));
        assert_eq!(buffer.line_count(), 4);
    }

    #[test]
    fn test_buffer_rejects_out_of_range() {
        let mut buffer = SourceBuffer::new("ab\ncd");
        assert_eq!(
            buffer.insert_text(LineCol::new(0, 5), "x"),
            Err(EditError::InvalidPosition(LineCol::new(0, 5)))
        );
        assert!(buffer.insert_text(LineCol::new(7, 0), "x").is_err());
        assert_eq!(buffer.as_str(), "ab\ncd");
    }

    #[test]
    fn test_apply_multiple_edits_and_caret() {
        let mut buffer = SourceBuffer::new("a\nb\nc");
        let mut change = SourceChange::new(FileId::new(0));
        change
            .anchor(0, "a")
            .anchor(2, "c")
            .insert(LineCol::new(0, 1), "\nfirst")
            .insert(LineCol::new(2, 1), "\nsecond");

        let caret = change.apply(&mut buffer).unwrap();
        assert_eq!(buffer.as_str(), "a\nfirst\nb\nc\nsecond");
        assert_eq!(caret, LineCol::new(4, 6));
        assert_eq!(buffer.caret_position(), caret);
    }

    #[test]
    fn test_primary_edit_before_others() {
        let mut buffer = SourceBuffer::new("x\ny");
        let mut change = SourceChange::new(FileId::new(0));
        change.insert(LineCol::new(1, 1), "!");
        change.insert(LineCol::new(0, 0), "top\n");
        let caret = change.apply(&mut buffer).unwrap();
        assert_eq!(buffer.as_str(), "top\nx\ny!");
        assert_eq!(caret, LineCol::new(1, 0));
    }

    #[test]
    fn test_same_line_shift() {
        assert_eq!(shift(LineCol::new(0, 5), LineCol::new(0, 2), "ab"), LineCol::new(0, 7));
        assert_eq!(shift(LineCol::new(0, 5), LineCol::new(0, 2), "a\nbc"), LineCol::new(1, 5));
        assert_eq!(shift(LineCol::new(0, 1), LineCol::new(0, 2), "zz"), LineCol::new(0, 1));
    }

    #[test]
    fn test_stale_anchor_leaves_buffer_untouched() {
        let mut buffer = SourceBuffer::new("class A {\n  // edited\n}");
        let mut change = SourceChange::new(FileId::new(0));
        change
            .anchor(1, "  var x:Int;")
            .insert(LineCol::new(1, 0), "  var y:Int;\n");

        assert_eq!(
            change.apply(&mut buffer),
            Err(EditError::StaleAnchor { line: 1 })
        );
        assert_eq!(buffer.as_str(), "class A {\n  // edited\n}");
    }

    #[test]
    fn test_noop_change() {
        let change = SourceChange::new(FileId::new(3));
        assert!(change.is_noop());
    }
}
