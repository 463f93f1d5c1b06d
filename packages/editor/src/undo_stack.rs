//! # Undo/Redo Stack
//!
//! Local edit history for one document.
//!
//! ## Design
//!
//! - Each entry keeps the tree snapshots from before and after the edit
//! - Undo restores the `before` snapshot and moves the entry to redo
//! - Redo restores the `after` snapshot
//! - New edits clear the redo stack
//! - Batches group several edits into one undo step
//!
//! Snapshots are `Arc`s shared with the document, so keeping history
//! costs one pointer per unchanged tree. Restoring goes through
//! `Document::restore`, the same atomic swap every mutation uses.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = UndoStack::new();
//!
//! history.record(&mut doc, "Add text", |doc| doc.add_block(BlockType::Text));
//!
//! history.undo(&mut doc);
//! history.redo(&mut doc);
//! ```

use crate::{Document, EditorOptions, MutationResult};
use pagecraft_model::BlockTree;
use std::sync::Arc;

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub before: Arc<BlockTree>,
    pub after: Arc<BlockTree>,

    /// Number of edits folded into this step
    pub edits: usize,

    pub description: Option<String>,
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Applied steps (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone steps (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<HistoryEntry>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Stack sized by the configured `undoLevels`
    pub fn from_options(options: &EditorOptions) -> Self {
        Self::with_max_levels(options.undo_levels)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Run an edit and record it if it applied
    pub fn record<F>(&mut self, doc: &mut Document, description: &str, edit: F) -> Option<MutationResult>
    where
        F: FnOnce(&mut Document) -> Option<MutationResult>,
    {
        let before = doc.snapshot();
        let result = edit(doc)?;
        let after = doc.snapshot();

        match &mut self.current_batch {
            Some(batch) => {
                batch.after = after;
                batch.edits += 1;
            }
            None => self.push_entry(HistoryEntry {
                before,
                after,
                edits: 1,
                description: Some(description.to_string()),
            }),
        }

        Some(result)
    }

    /// Start a batch of edits (undone/redone together)
    pub fn begin_batch(&mut self, doc: &Document, description: impl Into<String>) {
        let snapshot = doc.snapshot();
        self.current_batch = Some(HistoryEntry {
            before: Arc::clone(&snapshot),
            after: snapshot,
            edits: 0,
            description: Some(description.into()),
        });
    }

    /// End the current batch and push it, unless it recorded nothing
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if batch.edits > 0 {
                self.push_entry(batch);
            }
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Undo the most recent step
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        match self.undo_stack.pop() {
            Some(entry) => {
                doc.restore(Arc::clone(&entry.before));
                self.redo_stack.push(entry);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone step
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(entry) => {
                doc.restore(Arc::clone(&entry.after));
                self.undo_stack.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::{Block, BlockPatch, BlockType};

    fn doc() -> Document {
        let tree = BlockTree::from_blocks(vec![Block::text("t", "Hello")]);
        Document::from_tree(tree, &EditorOptions::default()).unwrap()
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_record_undo_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();
        let original = doc.snapshot();

        stack
            .record(&mut doc, "Edit text", |doc| {
                doc.update_block("t", BlockPatch::content("World"))
            })
            .unwrap();
        let edited = doc.snapshot();
        assert_eq!(stack.undo_description(), Some("Edit text"));

        assert!(stack.undo(&mut doc));
        assert_eq!(doc.tree(), &*original);
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc));
        assert!(Arc::ptr_eq(&doc.snapshot(), &edited));
        assert!(!stack.redo(&mut doc));
    }

    #[test]
    fn test_failed_edit_is_not_recorded() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        assert!(stack
            .record(&mut doc, "Delete", |doc| doc.delete_block("missing"))
            .is_none());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_batched_edits_undo_together() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.begin_batch(&doc, "Build section");
        stack.record(&mut doc, "", |doc| doc.add_block(BlockType::Container));
        stack.record(&mut doc, "", |doc| doc.add_block(BlockType::Grid));
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Build section"));
        assert_eq!(doc.tree().blocks.len(), 3);

        stack.undo(&mut doc);
        assert_eq!(doc.tree().blocks.len(), 1);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut doc = doc();
        let mut stack = UndoStack::new();

        stack.record(&mut doc, "a", |doc| doc.add_block(BlockType::Text));
        stack.undo(&mut doc);
        assert_eq!(stack.redo_levels(), 1);

        stack.record(&mut doc, "b", |doc| doc.add_block(BlockType::Image));
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = doc();
        let mut stack = UndoStack::with_max_levels(2);

        for i in 0..3 {
            stack.record(&mut doc, &format!("Text {}", i), |doc| {
                doc.update_block("t", BlockPatch::content(format!("Text {}", i)))
            });
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo_description(), Some("Text 2"));
    }

    #[test]
    fn test_configured_undo_levels_are_honored() {
        let options: EditorOptions = serde_json::from_str(r#"{ "undoLevels": 1 }"#).unwrap();
        let mut doc = Document::from_tree(
            BlockTree::from_blocks(vec![Block::text("t", "Hello")]),
            &options,
        )
        .unwrap();
        let mut stack = UndoStack::from_options(&options);

        for i in 0..3 {
            stack.record(&mut doc, &format!("Text {}", i), |doc| {
                doc.update_block("t", BlockPatch::content(format!("Text {}", i)))
            });
        }

        assert_eq!(stack.undo_levels(), 1);
        assert!(stack.undo(&mut doc));
        assert!(!stack.can_undo());
        assert!(matches!(
            &doc.block("t").unwrap().kind,
            pagecraft_model::BlockKind::Text { content, .. } if content == "Text 1"
        ));

        assert_eq!(UndoStack::from_options(&EditorOptions::default()).max_levels, 100);
    }
}
