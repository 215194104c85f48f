use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.sorry-checkr/config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Scan and publish settings.
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize)]
pub struct ScanConfig {
    /// Label applied to created issues.
    #[serde(default = "default_label")]
    pub label: String,
    /// Gemini model used for analysis.
    #[serde(default = "default_model")]
    pub model: String,
    /// Imports at or above this many bytes are excluded from the context.
    #[serde(default = "default_max_import_bytes")]
    pub max_import_bytes: usize,
    /// Directory names pruned during the tree walk.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

fn default_label() -> String {
    "proof wanted".to_string()
}

fn default_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_max_import_bytes() -> usize {
    25_000
}

fn default_exclude_dirs() -> Vec<String> {
    vec![".lake".to_string(), "build".to_string()]
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            model: default_model(),
            max_import_bytes: default_max_import_bytes(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
        }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<repo_path>/.sorry-checkr/config.toml`
/// 3. `~/.config/sorry-checkr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(repo_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = repo_path.join(".sorry-checkr").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("sorry-checkr")
            .join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.label, "proof wanted");
        assert_eq!(config.scan.model, "gemini-2.5-pro");
        assert_eq!(config.scan.max_import_bytes, 25_000);
        assert_eq!(config.scan.exclude_dirs, vec![".lake", "build"]);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let content = r#"
[scan]
label = "help wanted"
max_import_bytes = 1000
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.scan.label, "help wanted");
        assert_eq!(config.scan.max_import_bytes, 1000);
        assert_eq!(config.scan.model, "gemini-2.5-pro");
        assert_eq!(config.scan.exclude_dirs, vec![".lake", "build"]);
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scan.label, "proof wanted");
    }

    #[test]
    fn test_load_config_from_project_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join(".sorry-checkr");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "[scan]\nlabel = \"formal\"\n").unwrap();

        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.scan.label, "formal");
    }
}
