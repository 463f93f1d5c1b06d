use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Document, DragPayload, DragSession, InMemoryCatalog};
use pagecraft_model::BlockType;

#[derive(Debug, Args)]
pub struct DropArgs {
    /// Id of the dragged item (new-block-*, template-*, nested-block-*, or a block id)
    #[arg(short, long)]
    pub source: String,

    /// Block type carried by a palette drag
    #[arg(long)]
    pub block_type: Option<BlockType>,

    /// Template id carried by a template drag
    #[arg(long)]
    pub template: Option<String>,

    /// Source grid of a nested grid item
    #[arg(long, requires = "cell")]
    pub grid: Option<String>,

    /// Source cell of a nested grid item
    #[arg(long, requires = "grid")]
    pub cell: Option<usize>,

    /// Drop target token; omit to drop outside any surface
    #[arg(short, long)]
    pub target: Option<String>,

    /// Page file (defaults to pagePath from config)
    #[arg(short, long)]
    pub page: Option<String>,
}

impl DropArgs {
    fn payload(&self) -> DragPayload {
        DragPayload {
            block_type: self.block_type,
            template_id: self.template.clone(),
            grid_id: self.grid.clone(),
            cell_index: self.cell,
        }
    }
}

/// Run one drag gesture. Returns whether the page changed.
pub fn perform(args: &DropArgs, doc: &mut Document, catalog: &InMemoryCatalog) -> bool {
    let mut drag = DragSession::new();
    if !drag.begin(&args.source, &args.payload(), catalog) {
        return false;
    }
    drag.drop(args.target.as_deref(), doc).is_some()
}

pub fn drop(args: DropArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let catalog = InMemoryCatalog::new(config.load_templates(cwd)?);
    let page_path = config.page_path(cwd, args.page.as_deref());
    let mut doc = Document::load(&page_path, &config.editor)?;

    if perform(&args, &mut doc, &catalog) {
        doc.save()?;
        println!(
            "  {} {} → {}",
            "✓".green(),
            args.source,
            args.target.as_deref().unwrap_or("-")
        );
    } else {
        println!("  {} Nothing to drop", "–".yellow());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG_NAME;
    use pagecraft_editor::EditorOptions;
    use std::fs;

    fn args(source: &str, target: Option<&str>) -> DropArgs {
        DropArgs {
            source: source.to_string(),
            block_type: None,
            template: None,
            grid: None,
            cell: None,
            target: target.map(str::to_string),
            page: None,
        }
    }

    #[test]
    fn test_drop_template_from_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "templatesPath": "templates.json", "editor": { "clientId": "cli" } }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("templates.json"),
            r##"[{ "id": "hero", "name": "Hero", "blocks": [
                { "id": "hero-title", "type": "text", "content": "Welcome" },
                { "id": "hero-cta", "type": "button", "text": "Go", "link": "#" }
            ] }]"##,
        )
        .unwrap();
        fs::write(dir.path().join("page.json"), r#"{ "blocks": [] }"#).unwrap();

        drop(args("template-hero", Some("workspace-drop-zone")), &cwd).unwrap();
        drop(args("template-hero", Some("workspace-drop-zone")), &cwd).unwrap();

        let doc = Document::load(dir.path().join("page.json"), &EditorOptions::default()).unwrap();
        let ids = doc.tree().ids();
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| !id.starts_with("hero-")));
    }

    #[test]
    fn test_drop_without_target_is_noop() {
        let mut doc = Document::new(&EditorOptions::default());
        let mut palette = args("new-block-text", None);
        palette.block_type = Some(BlockType::Text);

        assert!(!perform(&palette, &mut doc, &InMemoryCatalog::default()));

        palette.target = Some("workspace-drop-zone".to_string());
        assert!(perform(&palette, &mut doc, &InMemoryCatalog::default()));
        assert_eq!(doc.tree().blocks.len(), 1);
    }
}
