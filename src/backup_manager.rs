use crate::error_helpers;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DEFAULT_MAX_BACKUPS: usize = 50;
const METADATA_FILE: &str = "operation.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub file: FileBackup,
    /// Steps that matched when the page was patched
    pub applied_steps: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileBackup {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
}

pub struct BackupManager {
    backups_dir: PathBuf,
    max_backups: usize,
}

impl BackupManager {
    /// Backups under ~/.catpatch/backups
    pub fn new() -> Result<Self> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
        Self::with_directory(home_dir.join(".catpatch").join("backups"))
    }

    /// Create a BackupManager with a custom backup directory
    pub fn with_directory(dir: impl Into<PathBuf>) -> Result<Self> {
        let backups_dir = dir.into();

        fs::create_dir_all(&backups_dir)
            .map_err(|e| anyhow::anyhow!(error_helpers::dir_create_error(&backups_dir, &e)))?;

        Ok(Self {
            backups_dir,
            max_backups: DEFAULT_MAX_BACKUPS,
        })
    }

    /// Keep at most `max_backups` backups; older ones are removed on the next backup
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups.max(1);
        self
    }

    /// Get the backup directory path
    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Copy `file` into a new backup and return the backup ID
    pub fn create_backup(&mut self, file: &Path, applied_steps: &[usize]) -> Result<String> {
        let original_path = fs::canonicalize(file)
            .with_context(|| format!("Failed to resolve path: {}", file.display()))?;

        // Millisecond precision keeps IDs sortable
        let id = format!(
            "{}-{}",
            Utc::now().format("%Y%m%d-%H%M%S%3f"),
            Uuid::new_v4().to_string().split_at(8).0
        );
        let backup_dir = self.backups_dir.join(&id);

        fs::create_dir_all(&backup_dir)
            .map_err(|e| anyhow::anyhow!(error_helpers::dir_create_error(&backup_dir, &e)))?;

        let file_name = original_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file.display()))?;
        let backup_path = backup_dir.join(file_name);

        fs::copy(&original_path, &backup_path)
            .with_context(|| format!("Failed to backup file: {}", original_path.display()))?;

        let metadata = BackupMetadata {
            id: id.clone(),
            timestamp: Utc::now(),
            file: FileBackup {
                original_path,
                backup_path,
            },
            applied_steps: applied_steps.to_vec(),
        };

        let metadata_path = backup_dir.join(METADATA_FILE);
        let metadata_json =
            serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;

        fs::write(&metadata_path, metadata_json)
            .with_context(|| format!("Failed to write metadata: {}", metadata_path.display()))?;

        tracing::info!(id = %id, file = %file.display(), "backup created");

        self.cleanup_old_backups()?;

        Ok(id)
    }

    /// Restore the backed-up file over its original path and remove the backup
    ///
    /// Returns the restored path.
    pub fn restore_backup(&self, id: &str) -> Result<PathBuf> {
        let backup_dir = self.backups_dir.join(id);
        let metadata_path = backup_dir.join(METADATA_FILE);

        if !backup_dir.exists() {
            anyhow::bail!("Backup not found: {}", id);
        }

        let metadata_json = fs::read_to_string(&metadata_path)
            .with_context(|| format!("Failed to read metadata: {}", metadata_path.display()))?;
        let metadata = Self::parse_backup_metadata(&metadata_json)?;

        let file = &metadata.file;
        if !file.backup_path.exists() {
            anyhow::bail!(
                "Backup {} is incomplete: {} is missing",
                id,
                file.backup_path.display()
            );
        }

        fs::copy(&file.backup_path, &file.original_path).with_context(|| {
            format!("Failed to restore file: {}", file.original_path.display())
        })?;

        fs::remove_dir_all(&backup_dir).with_context(|| {
            format!(
                "Failed to remove backup directory: {}",
                backup_dir.display()
            )
        })?;

        tracing::info!(id = %id, file = %file.original_path.display(), "backup restored");

        Ok(metadata.file.original_path)
    }

    pub fn get_last_backup_id(&self) -> Result<Option<String>> {
        let backups = self.list_backups()?;
        Ok(backups.last().map(|b| b.id.clone()))
    }

    /// All readable backups, oldest first
    pub fn list_backups(&self) -> Result<Vec<BackupMetadata>> {
        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backups_dir).with_context(|| {
            format!(
                "Failed to read backups directory: {}",
                self.backups_dir.display()
            )
        })? {
            let entry = entry?;
            let metadata_path = entry.path().join(METADATA_FILE);

            if !metadata_path.exists() {
                continue;
            }

            let metadata_json = fs::read_to_string(&metadata_path)?;
            if let Ok(metadata) = Self::parse_backup_metadata(&metadata_json) {
                backups.push(metadata);
            }
        }

        // Equal timestamps fall back to the ID
        backups.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(backups)
    }

    fn cleanup_old_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;

        if backups.len() > self.max_backups {
            for backup in backups.iter().take(backups.len() - self.max_backups) {
                self.remove_backup_by_id(&backup.id)?;
            }
        }

        Ok(())
    }

    /// Remove a backup by its ID (used when the write it guarded failed)
    pub fn remove_backup_by_id(&self, backup_id: &str) -> Result<()> {
        let backup_dir = self.backups_dir.join(backup_id);
        fs::remove_dir_all(&backup_dir)
            .with_context(|| format!("Failed to remove backup: {}", backup_dir.display()))?;
        Ok(())
    }

    /// Parse backup metadata from JSON string
    pub fn parse_backup_metadata(json: &str) -> Result<BackupMetadata> {
        let metadata: BackupMetadata =
            serde_json::from_str(json).context("Failed to parse backup metadata")?;
        Ok(metadata)
    }
}
