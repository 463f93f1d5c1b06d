//! # Pagecraft Editor
//!
//! Editing engine for Pagecraft pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ renderer: drag gestures, drop tokens        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - DragSession: classify source, resolve    │
//! │    the drop, run one operation              │
//! │  - Document: named operations → Mutation,   │
//! │    applied on a copy, swapped atomically    │
//! │  - EditSession: pending/remote/rebase       │
//! │  - UndoStack: snapshot history              │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: BlockTree, locator, patches, ids     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Mutations are values**: every change is a serializable `Mutation`
//! 2. **No partial edits**: a mutation applies completely or not at all
//! 3. **Misses are silent**: a drop or edit that can't apply does nothing
//! 4. **Same path for everyone**: remote edits use `Document::apply` too
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{Document, DragPayload, DragSession, EditorOptions, InMemoryCatalog};
//!
//! let mut doc = Document::load("page.json", &EditorOptions::default())?;
//!
//! let mut drag = DragSession::new();
//! drag.begin("new-block-text", &payload, &InMemoryCatalog::default());
//! drag.drop(Some("container-drop-zone-hero-0"), &mut doc);
//!
//! doc.save()?;
//! ```

mod document;
mod drag;
mod errors;
mod mutations;
mod operations;
mod options;
mod placement;
mod session;
mod undo_stack;

pub use document::{Document, DocumentStorage};
pub use drag::{DragPayload, DragSession, DragState, InMemoryCatalog, Template, TemplateCatalog};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use options::EditorOptions;
pub use placement::{resolve, DragSource, DropTarget, Placement, Resolution};
pub use session::{EditSession, OperationEnvelope};
pub use undo_stack::{HistoryEntry, UndoStack};
