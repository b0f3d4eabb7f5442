//! catpatch: adds category filtering to the tools home page
//!
//! The library holds the step catalogue and the literal substitution engine,
//! plus the file, backup, and config handling used by the binary in
//! src/main.rs.

pub mod backup_manager;
pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod error_helpers;
pub mod file_processor;
pub mod logger;
pub mod patcher;
pub mod steps;

// Re-export commonly used types for convenience
pub use backup_manager::{BackupManager, BackupMetadata, FileBackup};
pub use file_processor::{ChangeType, FileDiff, FileProcessor, LineChange};
pub use patcher::{Edit, PatchOutcome, Patcher, Step, StepReport, StepStatus};
pub use steps::{DEFAULT_TARGET, anchor_fixture, catalogue};
