use crate::error_helpers;
use crate::patcher::{PatchOutcome, Patcher};
use anyhow::{Context, Result};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeType {
    Unchanged,    // Line kept as is
    Added,        // Line introduced by the patch
    Deleted,      // Line removed by the patch
}

#[derive(Debug, Clone)]
pub struct LineChange {
    /// Line number in the original file, if the line exists there
    pub old_line: Option<usize>,
    /// Line number in the patched file, if the line exists there
    pub new_line: Option<usize>,
    pub change_type: ChangeType,
    pub content: String,
}

impl LineChange {
    /// Line number to display: the patched position, or the original one for deletions
    pub fn display_line(&self) -> usize {
        self.new_line.or(self.old_line).unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct FileDiff {
    pub file_path: String,
    pub outcome: PatchOutcome,
    pub lines: Vec<LineChange>,
}

impl FileDiff {
    pub fn has_changes(&self) -> bool {
        self.outcome.changed()
    }

    pub fn changes(&self) -> impl Iterator<Item = &LineChange> {
        self.lines.iter().filter(|l| l.change_type != ChangeType::Unchanged)
    }

    pub fn added_count(&self) -> usize {
        self.lines.iter().filter(|l| l.change_type == ChangeType::Added).count()
    }

    pub fn deleted_count(&self) -> usize {
        self.lines.iter().filter(|l| l.change_type == ChangeType::Deleted).count()
    }
}

pub struct FileProcessor {
    patcher: Patcher,
}

impl FileProcessor {
    pub fn new(patcher: Patcher) -> Self {
        Self { patcher }
    }

    /// Run the patch against the file in memory, without writing anything
    pub fn preview(&self, file_path: &Path) -> Result<FileDiff> {
        let content = fs::read_to_string(file_path)
            .map_err(|e| error_helpers::read_error(file_path, e))?;

        let outcome = self.patcher.apply(&content);
        let lines = diff_lines(&content, outcome.text());

        tracing::info!(
            file = %file_path.display(),
            applied = outcome.applied_count(),
            skipped = outcome.skipped_steps().len(),
            "patch previewed"
        );

        Ok(FileDiff {
            file_path: file_path.display().to_string(),
            outcome,
            lines,
        })
    }

    /// Write a previewed patch back over the file
    ///
    /// Does nothing when the patch left the text unchanged.
    pub fn commit(&self, file_path: &Path, diff: &FileDiff) -> Result<()> {
        if !diff.has_changes() {
            return Ok(());
        }

        write_atomically(file_path, diff.outcome.text())?;
        tracing::info!(file = %file_path.display(), "page rewritten");
        Ok(())
    }

    /// Preview and commit in one go
    pub fn apply(&self, file_path: &Path) -> Result<FileDiff> {
        let diff = self.preview(file_path)?;
        self.commit(file_path, &diff)?;
        Ok(diff)
    }
}

/// Line-level diff between the original and patched text
fn diff_lines(old: &str, new: &str) -> Vec<LineChange> {
    let diff = TextDiff::from_lines(old, new);

    diff.iter_all_changes()
        .map(|change| {
            let change_type = match change.tag() {
                ChangeTag::Equal => ChangeType::Unchanged,
                ChangeTag::Insert => ChangeType::Added,
                ChangeTag::Delete => ChangeType::Deleted,
            };
            LineChange {
                old_line: change.old_index().map(|i| i + 1),
                new_line: change.new_index().map(|i| i + 1),
                change_type,
                content: change
                    .value()
                    .trim_end_matches(&['\n', '\r'][..])
                    .to_string(),
            }
        })
        .collect()
}

/// Replace the file's content through a temporary file in the same directory
///
/// The original permissions are carried over to the new file.
fn write_atomically(file_path: &Path, content: &str) -> Result<()> {
    let parent_dir = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| {
        if error_helpers::is_permission_denied(&e) {
            anyhow::anyhow!(error_helpers::permission_error(file_path, "writing"))
        } else {
            anyhow::Error::new(e).context(format!(
                "Failed to create temp file in {}",
                parent_dir.display()
            ))
        }
    })?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write patched content")?;
    temp_file.flush().context("Failed to flush patched content")?;

    if let Ok(metadata) = fs::metadata(file_path) {
        temp_file
            .as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", file_path.display()))?;
    }

    temp_file
        .persist(file_path)
        .with_context(|| format!("Failed to persist temp file to {}", file_path.display()))?;

    Ok(())
}
