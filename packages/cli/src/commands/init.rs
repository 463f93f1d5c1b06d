use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_model::BlockTree;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Page file to create
    #[arg(short, long, default_value = "page.json")]
    pub page: String,

    /// Client id used to seed block ids
    #[arg(long)]
    pub client_id: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagecraft project...".bright_blue().bold());

    let mut config = Config {
        page_path: args.page.clone(),
        ..Config::default()
    };
    if let Some(client_id) = args.client_id {
        config.editor.client_id = client_id;
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    // Never clobber an existing page, even with --force
    let page_path = config.page_path(cwd, None);
    if !page_path.exists() {
        if let Some(parent) = page_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&page_path, serde_json::to_string_pretty(&BlockTree::new())?)?;
        println!("  {} Created {}", "✓".green(), args.page);
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagecraft drop --source new-block-text --block-type text");
    println!("  2. Run: pagecraft inspect");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_editor::{Document, EditorOptions};

    fn args(force: bool) -> InitArgs {
        InitArgs {
            page: "page.json".to_string(),
            client_id: Some("studio".to_string()),
            force,
        }
    }

    #[test]
    fn test_init_writes_config_and_empty_page() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();

        init(args(false), &cwd).unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.editor.client_id, "studio");
        let doc = Document::load(dir.path().join("page.json"), &EditorOptions::default()).unwrap();
        assert!(doc.tree().blocks.is_empty());
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().display().to_string();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "pagePath": "mine.json" }"#).unwrap();

        init(args(false), &cwd).unwrap();
        assert_eq!(Config::load(&cwd).unwrap().page_path, "mine.json");

        init(args(true), &cwd).unwrap();
        assert_eq!(Config::load(&cwd).unwrap().page_path, "page.json");
    }
}
