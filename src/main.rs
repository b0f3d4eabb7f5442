use anyhow::{Context, Result};
use catpatch::backup_manager::BackupManager;
use catpatch::cli::{Args, parse_args};
use catpatch::config::{self, Config};
use catpatch::diff_formatter::DiffFormatter;
use catpatch::file_processor::FileProcessor;
use catpatch::patcher::Patcher;
use catpatch::{logger, steps};
use std::path::PathBuf;

fn main() -> Result<()> {
    let args = parse_args()?;

    let config = config::load_config()?;
    config::validate_config(&config)
        .context("Invalid config file (run 'catpatch config' to fix it)")?;

    let _debug_log = logger::init_debug_logging(
        config.logging.debug.unwrap_or(false),
        &config::config_dir()?,
    )?;

    match args {
        Args::Patch {
            file,
            dry_run,
            strict,
            context,
            no_backup,
            backup_dir,
        } => {
            let options = PatchOptions {
                target: PathBuf::from(
                    file.or_else(|| config.patch.target.clone())
                        .unwrap_or_else(|| steps::DEFAULT_TARGET.to_string()),
                ),
                dry_run,
                strict: strict || config.patch.strict.unwrap_or(false),
                context: context.or(config.display.context_lines).unwrap_or(2),
                backup: !no_backup && config.backup.enabled.unwrap_or(true),
                backup_dir,
            };
            run_patch(&options, &config)?;
        }
        Args::Steps => {
            let patcher = Patcher::default();
            print!(
                "{}",
                DiffFormatter::format_catalogue(patcher.steps(), DiffFormatter::should_use_color())
            );
        }
        Args::Rollback { id, backup_dir } => {
            rollback(id, &backup_manager(backup_dir, &config)?)?;
        }
        Args::History { backup_dir } => {
            let backups = backup_manager(backup_dir, &config)?.list_backups()?;
            print!(
                "{}",
                DiffFormatter::format_history(&backups, DiffFormatter::should_use_color())
            );
        }
        Args::Status { backup_dir } => {
            show_status(&backup_manager(backup_dir, &config)?)?;
        }
        Args::Config { show } => {
            if show {
                let path = config::config_file_path()?;
                println!("# {}\n", path.display());
                let rendered =
                    toml::to_string_pretty(&config).context("Failed to serialize config")?;
                print!("{}", rendered);
            } else {
                let path = config::edit_config()?;
                println!("Configuration saved: {}", path.display());
            }
        }
    }

    Ok(())
}

struct PatchOptions {
    target: PathBuf,
    dry_run: bool,
    strict: bool,
    context: usize,
    backup: bool,
    backup_dir: Option<String>,
}

/// Backup manager for the CLI flag, then the configured directory, then the default
fn backup_manager(backup_dir: Option<String>, config: &Config) -> Result<BackupManager> {
    let manager = match backup_dir.or_else(|| config.backup.backup_dir.clone()) {
        Some(dir) => BackupManager::with_directory(dir)?,
        None => BackupManager::new()?,
    };
    Ok(manager.with_max_backups(config.backup.max_backups.unwrap_or(50)))
}

fn run_patch(options: &PatchOptions, config: &Config) -> Result<()> {
    let use_color = DiffFormatter::should_use_color();
    let processor = FileProcessor::new(Patcher::default());

    let diff = processor.preview(&options.target)?;

    if options.dry_run {
        print!(
            "{}",
            DiffFormatter::format_dry_run_header(&diff.file_path, use_color)
        );
    }
    print!("{}", DiffFormatter::format_step_summary(&diff.outcome, use_color));

    let incomplete = diff.outcome.incomplete_steps();
    if options.strict && !incomplete.is_empty() {
        let steps = incomplete
            .iter()
            .map(|r| format!("{} ({})", r.number, r.title))
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!(
            "Strict mode: {} step(s) did not fully apply: {}\n{} was not modified",
            incomplete.len(),
            steps,
            options.target.display()
        );
    }

    if !diff.has_changes() {
        println!("\nNo changes would be made.");
        return Ok(());
    }

    println!();
    print!(
        "{}",
        DiffFormatter::format_diff_with_context(&diff, options.context, use_color)
    );

    if options.dry_run {
        return Ok(());
    }

    let backup = if options.backup {
        let mut manager = backup_manager(options.backup_dir.clone(), config)?;
        let id = manager.create_backup(&options.target, &diff.outcome.touched_steps())?;
        Some((manager, id))
    } else {
        None
    };

    if let Err(e) = processor.commit(&options.target, &diff) {
        if let Some((manager, id)) = &backup {
            // The page is unchanged, so the backup has nothing to undo
            if let Err(cleanup) = manager.remove_backup_by_id(id) {
                tracing::warn!(id = %id, error = %cleanup, "failed to remove unused backup");
            }
        }
        return Err(e);
    }

    println!();
    print!(
        "{}",
        DiffFormatter::format_execute_result(backup.as_ref().map(|(_, id)| id.as_str()), use_color)
    );

    Ok(())
}

fn rollback(id: Option<String>, manager: &BackupManager) -> Result<()> {
    let backup_id = match id {
        Some(id) => id,
        None => match manager.get_last_backup_id()? {
            Some(id) => {
                println!("Rolling back last operation: {}\n", id);
                id
            }
            None => {
                anyhow::bail!("No backups found to rollback");
            }
        },
    };

    let restored = manager.restore_backup(&backup_id)?;
    println!("Restored: {}", restored.display());
    println!("\n✅ Rollback complete");

    Ok(())
}

fn show_status(manager: &BackupManager) -> Result<()> {
    let backups = manager.list_backups()?;

    println!("Current backup status:\n");
    println!("Backup directory: {}", manager.backups_dir().display());
    println!("Total backups: {}\n", backups.len());

    if let Some(last) = backups.last() {
        println!("Last operation:");
        println!("  ID: {}", last.id);
        println!("  Time: {}", last.timestamp.format("%Y-%m-%d %H:%M:%S"));
        println!("  File: {}", last.file.original_path.display());
    }

    Ok(())
}
