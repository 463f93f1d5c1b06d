//! # Document Handle
//!
//! A Document is one page and its editing state: the current tree, a
//! version counter, the id generator and the selection.
//!
//! Documents can be:
//! - **Memory-backed**: Temporary, for tests or embedding
//! - **File-backed**: Persisted as pretty JSON, with a dirty flag
//!
//! ## Tree replacement
//!
//! The tree is held behind an `Arc` and never mutated in place. A mutation
//! runs against a private copy and the `Arc` is swapped once it succeeds,
//! so readers holding a snapshot never observe a half-applied change and
//! a failed mutation leaves the previous `Arc` untouched.

use crate::{EditorError, EditorOptions, Mutation, MutationError, MutationResult};
use pagecraft_model::{
    clone_all_with_fresh_ids, clone_with_fresh_ids, get_client_seed, is_reserved_id, locate,
    repair_grids, validate_tree, Block, BlockDefaults, BlockTree, BlockType, IdGenerator, Scope,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Editable page
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each applied change)
    version: u64,

    tree: Arc<BlockTree>,

    ids: IdGenerator,

    defaults: BlockDefaults,

    /// Selected block, or one of the reserved header/footer ids
    selection: Option<String>,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug)]
pub enum DocumentStorage {
    /// In-memory only
    Memory,

    /// File-backed (single-user editing)
    File { path: PathBuf, dirty: bool },
}

impl Document {
    /// Create an empty memory-backed page
    pub fn new(options: &EditorOptions) -> Self {
        Self {
            version: 0,
            tree: Arc::new(BlockTree::new()),
            ids: IdGenerator::new(&options.client_id),
            defaults: options.block_defaults.clone(),
            selection: None,
            storage: DocumentStorage::Memory,
        }
    }

    /// Create a memory-backed document from an existing tree.
    ///
    /// Grids whose cell array disagrees with their shape are repaired;
    /// any other invariant violation is an error.
    pub fn from_tree(mut tree: BlockTree, options: &EditorOptions) -> Result<Self, EditorError> {
        let repaired = repair_grids(&mut tree.blocks);
        if repaired > 0 {
            debug!(grids = repaired, "Repaired grid cell arrays");
        }
        validate_tree(&tree)?;

        let mut ids = IdGenerator::new(&options.client_id);
        ids.observe_blocks(&tree.blocks);

        Ok(Self {
            tree: Arc::new(tree),
            ids,
            ..Self::new(options)
        })
    }

    /// Parse a page from JSON (memory-backed)
    pub fn from_json(source: &str, options: &EditorOptions) -> Result<Self, EditorError> {
        let tree: BlockTree = serde_json::from_str(source)?;
        Self::from_tree(tree, options)
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl AsRef<Path>, options: &EditorOptions) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;
        let mut doc = Self::from_json(&source, options)?;

        info!(path = %path.display(), blocks = doc.tree.block_count(), "Loaded page");
        doc.storage = DocumentStorage::File { path, dirty: false };
        Ok(doc)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let json = self.to_json()?;
        match &mut self.storage {
            DocumentStorage::File { path, dirty } => {
                std::fs::write(&*path, json)?;
                *dirty = false;
                Ok(())
            }
            DocumentStorage::Memory => Err(EditorError::NotFileBacked),
        }
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&*self.tree)?)
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory => false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            DocumentStorage::File { path, .. } => Some(path),
            DocumentStorage::Memory => None,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    /// Shared handle to the current tree; stays valid across later edits
    pub fn snapshot(&self) -> Arc<BlockTree> {
        Arc::clone(&self.tree)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.locate(id).map(|(block, _)| block)
    }

    pub fn locate(&self, id: &str) -> Option<(&Block, Scope)> {
        locate(&self.tree.blocks, id)
    }

    pub fn defaults(&self) -> &BlockDefaults {
        &self.defaults
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Select a block (or the header/footer). Unknown ids are ignored.
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selection = None;
                true
            }
            Some(id) if is_reserved_id(id) || self.tree.contains(id) => {
                self.selection = Some(id.to_string());
                true
            }
            Some(id) => {
                debug!(id, "Ignoring selection of unknown block");
                false
            }
        }
    }

    /// Apply a mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, MutationError> {
        let mut next = BlockTree::clone(&self.tree);
        mutation.apply(&mut next)?;

        // Payloads built elsewhere may carry ids minted under our seed
        self.ids.observe_blocks(mutation.inserted_blocks());
        self.swap(Arc::new(next));
        info!(mutation = mutation.kind(), version = self.version, "Applied mutation");

        Ok(MutationResult {
            version: self.version,
            mutation,
        })
    }

    /// Swap in a previously taken snapshot (undo/redo)
    pub fn restore(&mut self, snapshot: Arc<BlockTree>) -> u64 {
        self.swap(snapshot);
        debug!(version = self.version, "Restored snapshot");
        self.version
    }

    /// Replace the whole page with an authoritative tree
    pub fn reset(&mut self, tree: BlockTree) -> Result<u64, EditorError> {
        let fresh = Self::from_tree(tree, &EditorOptions::default())?;
        self.ids.observe_blocks(&fresh.tree.blocks);
        self.swap(fresh.tree);
        Ok(self.version)
    }

    /// Seed of the ids this document mints
    pub fn id_seed(&self) -> &str {
        self.ids.seed()
    }

    /// Mint ids as `client_id` from now on, past every id already in the tree
    pub fn adopt_client(&mut self, client_id: &str) {
        if self.ids.seed() == get_client_seed(client_id) {
            return;
        }
        self.ids = IdGenerator::new(client_id);
        self.ids.observe_blocks(&self.tree.blocks);
        debug!(client_id, seed = self.ids.seed(), "Switched id seed");
    }

    fn swap(&mut self, tree: Arc<BlockTree>) {
        self.tree = tree;
        self.version += 1;

        if let DocumentStorage::File { dirty, .. } = &mut self.storage {
            *dirty = true;
        }

        // Deleting a block (or an ancestor) drops it from the selection
        if let Some(selected) = &self.selection {
            if !is_reserved_id(selected) && !self.tree.contains(selected) {
                debug!(id = %selected, "Selected block left the tree");
                self.selection = None;
            }
        }
    }

    /// Mint a default-initialized block with a fresh id
    pub(crate) fn mint(&mut self, block_type: BlockType) -> Block {
        let id = self.ids.new_id(block_type);
        Block::with_defaults(id, block_type, &self.defaults)
    }

    pub(crate) fn fresh_copy(&mut self, block: &Block) -> Block {
        clone_with_fresh_ids(block, &mut self.ids)
    }

    /// Deep-copy a template payload under fresh ids
    pub(crate) fn fresh_copies(&mut self, blocks: &[Block]) -> Vec<Block> {
        clone_all_with_fresh_ids(blocks, &mut self.ids)
    }

    /// Apply, absorbing failure into a logged no-op
    pub(crate) fn commit(&mut self, mutation: Mutation) -> Option<MutationResult> {
        let kind = mutation.kind();
        match self.apply(mutation) {
            Ok(result) => Some(result),
            Err(error) => {
                debug!(mutation = kind, %error, "Mutation skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::GridSettingsPatch;

    fn sample() -> BlockTree {
        BlockTree::from_blocks(vec![
            Block::text("a", "A"),
            Block::container("c", vec![Block::text("c-1", "")]),
        ])
    }

    #[test]
    fn test_create_memory_document() {
        let doc = Document::from_tree(sample(), &EditorOptions::default()).unwrap();

        assert_eq!(doc.version(), 0);
        assert!(!doc.is_dirty());
        assert!(doc.path().is_none());
        assert_eq!(doc.tree().block_count(), 3);
    }

    #[test]
    fn test_failed_mutation_keeps_tree_and_version() {
        let mut doc = Document::from_tree(sample(), &EditorOptions::default()).unwrap();
        let before = doc.snapshot();

        let result = doc.apply(Mutation::DeleteBlock {
            id: "missing".to_string(),
        });

        assert!(result.is_err());
        assert_eq!(doc.version(), 0);
        assert!(Arc::ptr_eq(&before, &doc.snapshot()));
    }

    #[test]
    fn test_snapshot_survives_later_edits() {
        let mut doc = Document::from_tree(sample(), &EditorOptions::default()).unwrap();
        let before = doc.snapshot();

        doc.apply(Mutation::DeleteBlock { id: "c".to_string() })
            .unwrap();

        assert_eq!(doc.version(), 1);
        assert_eq!(before.block_count(), 3);
        assert_eq!(doc.tree().block_count(), 1);
    }

    #[test]
    fn test_selection_cleared_when_ancestor_deleted() {
        let mut doc = Document::from_tree(sample(), &EditorOptions::default()).unwrap();
        assert!(doc.select(Some("c-1")));

        doc.apply(Mutation::DeleteBlock { id: "c".to_string() })
            .unwrap();
        assert_eq!(doc.selection(), None);
    }

    #[test]
    fn test_inserted_payload_ids_are_never_minted_again() {
        let mut doc = Document::new(&EditorOptions::for_client("alice"));
        let seed = get_client_seed("alice");
        let nested = Block::container(
            format!("container-{}-1", seed),
            vec![Block::text(format!("text-{}-4", seed), "")],
        );

        doc.apply(Mutation::InsertBlocks {
            index: None,
            blocks: vec![nested],
        })
        .unwrap();

        for _ in 0..5 {
            assert!(doc.add_block(BlockType::Text).is_some());
        }
        let mut ids = doc.tree().ids();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(total, 7);
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_adopt_client_skips_ids_already_in_tree() {
        let seed = get_client_seed("bob");
        let tree = BlockTree::from_blocks(vec![Block::text(format!("text-{}-3", seed), "")]);
        let mut doc = Document::from_tree(tree, &EditorOptions::default()).unwrap();

        doc.adopt_client("bob");
        assert_eq!(doc.id_seed(), seed);
        doc.add_block(BlockType::Text).unwrap();
        assert_eq!(doc.tree().blocks[1].id, format!("text-{}-4", seed));
    }

    #[test]
    fn test_oversized_grid_settings_leave_tree_untouched() {
        let tree = BlockTree::from_blocks(vec![Block::grid("g", 2, 1, vec![])]);
        let mut doc = Document::from_tree(tree, &EditorOptions::default()).unwrap();
        let before = doc.snapshot();

        let result = doc.update_grid_settings("g", GridSettingsPatch::shape(u32::MAX, u32::MAX));

        assert!(result.is_none());
        assert_eq!(doc.version(), 0);
        assert!(Arc::ptr_eq(&before, &doc.snapshot()));
    }

    #[test]
    fn test_reserved_selection_survives_edits() {
        let mut doc = Document::from_tree(sample(), &EditorOptions::default()).unwrap();
        assert!(doc.select(Some("footer")));
        assert!(!doc.select(Some("nope")));

        doc.apply(Mutation::DeleteBlock { id: "a".to_string() })
            .unwrap();
        assert_eq!(doc.selection(), Some("footer"));
    }

    #[test]
    fn test_from_tree_rejects_duplicate_ids() {
        let tree = BlockTree::from_blocks(vec![Block::text("a", ""), Block::text("a", "")]);
        assert!(matches!(
            Document::from_tree(tree, &EditorOptions::default()),
            Err(EditorError::Model(_))
        ));
    }

    #[test]
    fn test_save_requires_file_backing() {
        let mut doc = Document::new(&EditorOptions::default());
        assert!(matches!(doc.save(), Err(EditorError::NotFileBacked)));
    }
}
