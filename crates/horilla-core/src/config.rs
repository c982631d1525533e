use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::hierarchy::ReparentPolicy;

/// Directory under the project root that holds config and the database.
pub const PROJECT_DIR: &str = ".horilla";

/// Config file name inside [`PROJECT_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Written by `init` when no config exists yet.
pub const DEFAULT_CONFIG_TOML: &str = r#"[store]
path = ".horilla/hierarchy.db"

[hierarchy]
# "reject": a child that already has a parent cannot be assigned again.
# "detach": the child is moved under the new parent.
reparent = "reject"
"#;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database path, relative to the project root unless absolute.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub reparent: ReparentPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub store_path: PathBuf,
    pub resolved_output: String,
}

/// Load `<root>/.horilla/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the default config unless one is already present.
///
/// Returns `true` if a file was written.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn write_default_config(project_root: &Path) -> Result<bool> {
    let path = config_path(project_root);
    if path.exists() {
        return Ok(false);
    }
    let dir = project_root.join(PROJECT_DIR);
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    std::fs::write(&path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join(CONFIG_FILE)
}

/// Absolute database path for `config`.
#[must_use]
pub fn store_path(project_root: &Path, config: &ProjectConfig) -> PathBuf {
    if config.store.path.is_absolute() {
        config.store.path.clone()
    } else {
        project_root.join(&config.store.path)
    }
}

/// # Errors
///
/// Returns an error if the project config cannot be loaded.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let store_path = store_path(project_root, &project);

    let env_format = env::var("HORILLA_FORMAT").ok();
    let resolved_output = resolve_output(cli_json, env_format, std::io::stdout().is_terminal());

    Ok(EffectiveConfig {
        project,
        store_path,
        resolved_output,
    })
}

fn resolve_output(cli_json: bool, env_format: Option<String>, is_tty: bool) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty { "pretty" } else { "text" }.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(PROJECT_DIR).join("hierarchy.db")
}
