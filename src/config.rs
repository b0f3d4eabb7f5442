//! Configuration management for catpatch
//!
//! catpatch stores configuration in ~/.catpatch/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// catpatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target and matching settings
    #[serde(default)]
    pub patch: PatchConfig,

    /// Backup settings
    #[serde(default)]
    pub backup: BackupConfig,

    /// Output settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Debug log settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfig {
    /// Page to patch when none is given on the command line
    #[serde(default = "default_target")]
    pub target: Option<String>,

    /// Refuse to write when any step finds no anchor
    #[serde(default = "default_strict")]
    pub strict: Option<bool>,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            strict: default_strict(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Back up the page before overwriting it
    #[serde(default = "default_backup_enabled")]
    pub enabled: Option<bool>,

    /// Custom backup directory
    #[serde(default)]
    pub backup_dir: Option<String>,

    /// Number of backups kept before the oldest are removed
    #[serde(default = "default_max_backups")]
    pub max_backups: Option<usize>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: default_backup_enabled(),
            backup_dir: None,
            max_backups: default_max_backups(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of context lines to show
    #[serde(default = "default_context_lines")]
    pub context_lines: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a debug log to ~/.catpatch/catpatch.log
    #[serde(default = "default_debug")]
    pub debug: Option<bool>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: default_debug(),
        }
    }
}

// Default functions for serde
fn default_target() -> Option<String> { Some(crate::steps::DEFAULT_TARGET.to_string()) }
fn default_strict() -> Option<bool> { Some(false) }
fn default_backup_enabled() -> Option<bool> { Some(true) }
fn default_max_backups() -> Option<usize> { Some(50) }
fn default_context_lines() -> Option<usize> { Some(2) }
fn default_debug() -> Option<bool> { Some(false) }

/// Get the catpatch home directory (~/.catpatch), creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let config_dir = home_dir.join(".catpatch");
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Get the configuration file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# catpatch Configuration File
#
# Values set here can be overridden by command-line flags.
#
# For more information, run: catpatch config --help

[patch]
# Page patched when no file is given on the command line
target = "src/pages/Home.jsx"

# Refuse to write when a step finds no anchor (default: false)
# When false, missing anchors are reported and the step is skipped.
strict = false

[backup]
# Back up the page before overwriting it (default: true)
enabled = true

# Custom backup directory (optional)
# Uncomment to use a custom backup location instead of ~/.catpatch/backups/
#backup_dir = "/mnt/backups/catpatch"

# Number of backups kept before the oldest are removed (default: 50)
max_backups = 50

[display]
# Number of context lines to show around changes (default: 2, max: 10)
context_lines = 2

[logging]
# Write a debug log to ~/.catpatch/catpatch.log (default: false)
# RUST_LOG overrides the default "catpatch=info" filter.
debug = false
"#
}

/// Write the default commented configuration file to `path`
pub fn save_default_config_to(path: &Path) -> Result<()> {
    fs::write(path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

    Ok(())
}

/// Load configuration from `path`, creating default if needed
///
/// If the config file doesn't exist, creates it with defaults and returns them.
/// If the config file is malformed, recreates it with defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        save_default_config_to(path)?;
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    match toml::from_str::<Config>(&config_str) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "malformed config, restoring defaults"
            );
            save_default_config_to(path)?;
            Ok(Config::default())
        }
    }
}

/// Load configuration from ~/.catpatch/config.toml
pub fn load_config() -> Result<Config> {
    load_config_from(&config_file_path()?)
}

/// Parse and validate configuration text
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(target) = &config.patch.target {
        if target.trim().is_empty() {
            anyhow::bail!("Invalid target: must not be empty");
        }
    }

    if let Some(max_backups) = config.backup.max_backups {
        if max_backups == 0 {
            anyhow::bail!("Invalid max_backups: 0 (min 1)");
        }
    }

    if let Some(context) = config.display.context_lines {
        if context > 10 {
            anyhow::bail!("Invalid context_lines: {} (max 10)", context);
        }
    }

    Ok(())
}

/// Find the editor to open the config with
///
/// $VISUAL, then $EDITOR, then the first of nano or vi found on PATH.
fn resolve_editor() -> Result<PathBuf> {
    for var in ["VISUAL", "EDITOR"] {
        if let Ok(editor) = std::env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(PathBuf::from(editor));
            }
        }
    }

    ["nano", "vi"]
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| anyhow::anyhow!("No editor found. Set $EDITOR or install nano or vi"))
}

/// Open the config in an editor and keep the result only if it validates
///
/// The file is edited through a temporary copy, so an invalid edit leaves
/// the existing config untouched.
pub fn edit_config() -> Result<PathBuf> {
    let config_path = config_file_path()?;
    if !config_path.exists() {
        save_default_config_to(&config_path)?;
    }

    let original = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let draft = tempfile::Builder::new()
        .prefix("catpatch-config-")
        .suffix(".toml")
        .tempfile()
        .context("Failed to create temporary config file")?;
    fs::write(draft.path(), &original)
        .with_context(|| format!("Failed to write {}", draft.path().display()))?;

    let editor = resolve_editor()?;
    let status = Command::new(&editor)
        .arg(draft.path())
        .status()
        .with_context(|| format!("Failed to launch editor: {}", editor.display()))?;
    if !status.success() {
        anyhow::bail!("Editor exited with {}; config not updated", status);
    }

    let edited = fs::read_to_string(draft.path())
        .with_context(|| format!("Failed to read {}", draft.path().display()))?;
    parse_config(&edited).context("Config not updated")?;

    fs::write(&config_path, edited)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.patch.target, Some("src/pages/Home.jsx".to_string()));
        assert_eq!(config.patch.strict, Some(false));
        assert_eq!(config.backup.enabled, Some(true));
        assert_eq!(config.backup.max_backups, Some(50));
        assert_eq!(config.display.context_lines, Some(2));
        assert_eq!(config.logging.debug, Some(false));
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config = parse_config(get_default_config_content()).unwrap();
        assert_eq!(config.patch.target, Config::default().patch.target);
        assert_eq!(config.backup.backup_dir, None);
        assert_eq!(config.display.context_lines, Some(2));
    }

    #[test]
    fn test_validate_config_invalid_context() {
        let mut config = Config::default();
        config.display.context_lines = Some(11);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_invalid_max_backups() {
        let mut config = Config::default();
        config.backup.max_backups = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_empty_target() {
        let mut config = Config::default();
        config.patch.target = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = parse_config("[patch]\nstrict = true\n").unwrap();
        assert_eq!(config.patch.strict, Some(true));
        assert_eq!(config.patch.target, Some("src/pages/Home.jsx".to_string()));
        assert_eq!(config.backup.enabled, Some(true));
    }

    #[test]
    fn test_load_config_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.backup.max_backups, Some(50));
    }

    #[test]
    fn test_load_config_recreates_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[patch\nstrict = maybe").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.patch.strict, Some(false));
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.starts_with("# catpatch Configuration File"));
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[patch]"));
        assert!(toml_str.contains("[backup]"));
        assert!(toml_str.contains("[display]"));
        assert!(toml_str.contains("[logging]"));
    }
}
