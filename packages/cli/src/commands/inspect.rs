use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_model::visitor::{walk_block, walk_blocks, walk_cell};
use pagecraft_model::{validate_tree, Block, BlockTree, GridCell, Scope, Visitor};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Page file (defaults to pagePath from config)
    pub page: Option<String>,

    /// Print the outline as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineRow {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    pub depth: usize,
    #[serde(flatten)]
    pub scope: Scope,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub blocks: Vec<OutlineRow>,
    pub counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

enum Parent {
    Container { id: String, next_index: usize },
    Grid { id: String, cell_index: usize },
}

/// Depth-first outline with each block's scope
#[derive(Default)]
struct Outline {
    rows: Vec<OutlineRow>,
    parents: Vec<Parent>,
    next_top_level: usize,
}

impl Visitor for Outline {
    fn visit_block(&mut self, block: &Block) {
        let scope = match self.parents.last_mut() {
            None => {
                self.next_top_level += 1;
                Scope::TopLevel {
                    index: self.next_top_level - 1,
                }
            }
            Some(Parent::Container { id, next_index }) => {
                *next_index += 1;
                Scope::Container {
                    container_id: id.clone(),
                    index: *next_index - 1,
                }
            }
            Some(Parent::Grid { id, cell_index }) => Scope::GridCell {
                grid_id: id.clone(),
                cell_index: *cell_index,
            },
        };

        self.rows.push(OutlineRow {
            id: block.id.clone(),
            block_type: block.block_type().to_string(),
            depth: self.parents.len(),
            scope,
        });

        let parent = if block.is_container() {
            Parent::Container {
                id: block.id.clone(),
                next_index: 0,
            }
        } else if block.is_grid() {
            Parent::Grid {
                id: block.id.clone(),
                cell_index: 0,
            }
        } else {
            return;
        };

        self.parents.push(parent);
        walk_block(self, block);
        self.parents.pop();
    }

    fn visit_cell(&mut self, cell: &GridCell) {
        walk_cell(self, cell);
        if let Some(Parent::Grid { cell_index, .. }) = self.parents.last_mut() {
            *cell_index += 1;
        }
    }
}

/// Build the outline and validation report for a tree as stored
pub fn report(tree: &BlockTree) -> Report {
    let mut outline = Outline::default();
    walk_blocks(&mut outline, &tree.blocks);

    let mut counts = BTreeMap::new();
    for row in &outline.rows {
        *counts.entry(row.block_type.clone()).or_insert(0) += 1;
    }

    Report {
        blocks: outline.rows,
        counts,
        error: validate_tree(tree).err().map(|e| e.to_string()),
    }
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let page_path = config.page_path(cwd, args.page.as_deref());

    // Read the raw tree: a broken page should still be outlined
    let content = fs::read_to_string(&page_path)
        .with_context(|| format!("Cannot read {}", page_path.display()))?;
    let tree: BlockTree = serde_json::from_str(&content)?;
    let report = report(&tree);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", page_path.display().to_string().bright_white().bold());
        for row in &report.blocks {
            println!(
                "{}{} {} {}",
                "  ".repeat(row.depth + 1),
                row.block_type.cyan(),
                row.id,
                describe_scope(&row.scope).dimmed()
            );
        }
        println!();

        let summary: Vec<String> = report
            .counts
            .iter()
            .map(|(block_type, count)| format!("{} {}", count, block_type))
            .collect();
        println!("{} blocks ({})", report.blocks.len(), summary.join(", "));
    }

    match report.error {
        Some(error) => Err(anyhow!("Invalid page: {}", error)),
        None => {
            if !args.json {
                println!("{}", "✓ Page is valid".green());
            }
            Ok(())
        }
    }
}

fn describe_scope(scope: &Scope) -> String {
    match scope {
        Scope::TopLevel { index } => format!("[top {}]", index),
        Scope::Container {
            container_id,
            index,
        } => format!("[{} #{}]", container_id, index),
        Scope::GridCell {
            grid_id,
            cell_index,
        } => format!("[{} cell {}]", grid_id, cell_index),
    }
}
