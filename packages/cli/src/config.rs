use anyhow::Context;
use pagecraft_editor::{EditorOptions, Template};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Pagecraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Page document edited by the CLI
    #[serde(default = "default_page_path")]
    pub page_path: String,

    /// JSON file holding an array of templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_path: Option<String>,

    #[serde(default)]
    pub editor: EditorOptions,
}

fn default_page_path() -> String {
    "page.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", DEFAULT_CONFIG_NAME))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the page path, preferring an explicit override
    pub fn page_path(&self, cwd: &str, page: Option<&str>) -> PathBuf {
        PathBuf::from(cwd).join(page.unwrap_or(&self.page_path))
    }

    /// Read the template catalog file, if one is configured
    pub fn load_templates(&self, cwd: &str) -> anyhow::Result<Vec<Template>> {
        let Some(templates_path) = &self.templates_path else {
            return Ok(vec![]);
        };

        let path = PathBuf::from(cwd).join(templates_path);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Cannot read templates from {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_path: default_page_path(),
            templates_path: None,
            editor: EditorOptions::default(),
        }
    }
}
