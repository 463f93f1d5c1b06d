use crate::block::{Block, BlockType};
use crate::visitor::{walk_block, walk_blocks, Visitor};
use crc32fast::Hasher;

/// Derive a stable id seed from a client identifier using CRC32
pub fn get_client_seed(client_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(client_id.as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Sequential id generator for blocks minted by one client.
///
/// Ids look like `{type}-{seed}-{count}`. The seed isolates clients from
/// each other; the counter only ever grows, so an id is never handed out
/// twice, even after the block carrying it is deleted.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new(client_id: &str) -> Self {
        Self {
            seed: get_client_seed(client_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self, block_type: BlockType) -> String {
        self.count += 1;
        format!("{}-{}-{}", block_type, self.seed, self.count)
    }

    /// Advance past an id minted earlier under this seed (e.g. one loaded
    /// from disk), so it can't be produced again.
    pub fn observe(&mut self, id: &str) {
        let Some((prefix, count)) = id.rsplit_once('-') else {
            return;
        };
        let Ok(count) = count.parse::<u64>() else {
            return;
        };
        let same_seed = prefix
            .rsplit_once('-')
            .is_some_and(|(_, seed)| seed == self.seed);
        if same_seed && count > self.count {
            self.count = count;
        }
    }

    /// Observe every id in `blocks` and their descendants
    pub fn observe_blocks(&mut self, blocks: &[Block]) {
        walk_blocks(&mut Observer { ids: self }, blocks);
    }

    /// Get the seed shared by every id from this generator
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

struct Observer<'a> {
    ids: &'a mut IdGenerator,
}

impl Visitor for Observer<'_> {
    fn visit_block(&mut self, block: &Block) {
        self.ids.observe(&block.id);
        walk_block(self, block);
    }
}
