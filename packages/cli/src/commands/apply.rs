use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Document, Mutation};
use std::fs;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// JSON file holding an array of mutations
    pub ops: String,

    /// Page file (defaults to pagePath from config)
    #[arg(short, long)]
    pub page: Option<String>,

    /// Apply without saving
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Apply mutations in order. One that doesn't apply is skipped, the rest
/// still run.
pub fn apply_all(doc: &mut Document, mutations: Vec<Mutation>) -> ApplySummary {
    let mut summary = ApplySummary::default();

    for (index, mutation) in mutations.into_iter().enumerate() {
        let kind = mutation.kind();
        match doc.apply(mutation) {
            Ok(_) => summary.applied += 1,
            Err(error) => {
                debug!(index, kind, %error, "Skipped mutation");
                println!("  {} #{} {} - {}", "–".yellow(), index, kind, error);
                summary.skipped += 1;
            }
        }
    }

    summary
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let page_path = config.page_path(cwd, args.page.as_deref());

    let ops_path = std::path::PathBuf::from(cwd).join(&args.ops);
    let content = fs::read_to_string(&ops_path)
        .with_context(|| format!("Cannot read {}", ops_path.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid mutations in {}", args.ops))?;

    let mut doc = Document::load(&page_path, &config.editor)?;

    println!("{}", "🔧 Applying mutations...".bright_blue().bold());
    let summary = apply_all(&mut doc, mutations);

    if !args.dry_run && doc.is_dirty() {
        doc.save()?;
    }

    println!();
    println!(
        "{} applied, {} no-op (version {})",
        summary.applied.to_string().green(),
        summary.skipped.to_string().yellow(),
        doc.version()
    );

    Ok(())
}
