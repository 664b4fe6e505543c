use anyhow::{Context, Result};
use folio_parse::nav::NavConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the site configuration.
pub const CONFIG_FILE: &str = "folio.json";

/// Top-level folio.json schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolioConfig {
    #[serde(default = "default_posts_dir")]
    pub posts_dir: String,

    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,

    #[serde(default)]
    pub navigation: NavConfig,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            out_dir: default_out_dir(),
            site_title: None,
            navigation: NavConfig::default(),
        }
    }
}

fn default_posts_dir() -> String {
    "posts".to_string()
}
fn default_out_dir() -> String {
    "dist".to_string()
}

/// A config together with the directory its relative paths resolve against.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: FolioConfig,
    pub root: PathBuf,
}

impl LoadedConfig {
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join(&self.config.posts_dir)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join(&self.config.out_dir)
    }
}

/// Load config from a folio.json file, or return defaults if missing.
///
/// Relative directories in the config are resolved against the file's
/// parent directory.
pub fn load_config(config_path: &Path) -> Result<LoadedConfig> {
    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let config = if config_path.exists() {
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?
    } else {
        tracing::debug!(path = %config_path.display(), "No config file; using defaults");
        FolioConfig::default()
    };

    Ok(LoadedConfig { config, root })
}
