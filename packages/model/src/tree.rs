use crate::block::Block;
use crate::visitor::{walk_blocks, Visitor};
use serde::{Deserialize, Serialize};

/// Reserved identifier of the header pseudo-block
pub const HEADER_ID: &str = "header";

/// Reserved identifier of the footer pseudo-block
pub const FOOTER_ID: &str = "footer";

pub fn is_reserved_id(id: &str) -> bool {
    id == HEADER_ID || id == FOOTER_ID
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// The page: header, the ordered top-level blocks, footer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTree {
    #[serde(default)]
    pub header: Header,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub footer: Footer,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..Self::default()
        }
    }

    /// Position of a top-level block
    pub fn top_level_index(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.iter().any(|b| b.contains_id(id))
    }

    /// Total number of blocks at every depth
    pub fn block_count(&self) -> usize {
        self.blocks.iter().map(Block::subtree_size).sum()
    }

    /// Every block id in locator order
    pub fn ids(&self) -> Vec<String> {
        let mut collector = IdCollector::default();
        walk_blocks(&mut collector, &self.blocks);
        collector.ids
    }
}

#[derive(Default)]
struct IdCollector {
    ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_block(&mut self, block: &Block) {
        self.ids.push(block.id.clone());
        crate::visitor::walk_block(self, block);
    }
}
