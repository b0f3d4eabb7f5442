use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsString;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "catpatch")]
#[command(about = "Add category filtering to the tools home page, with preview and rollback")]
#[command(long_about = "catpatch rewrites the tools home page (src/pages/Home.jsx) to add
category filtering: category state, a fetchCategories loader, category-aware
fetchTools calls, pill-shaped filter buttons, and the modal props that use them.

Each of the thirteen steps is a literal find-and-replace. A step whose anchor
text is not found is skipped and reported; the other steps still apply.
Running catpatch on an already patched page changes nothing.

SAFETY:
  • The page is backed up before it is overwritten
  • --dry-run shows the diff without writing
  • --strict refuses to write when any step is skipped
  • catpatch rollback restores the last backup

EXAMPLES:
  catpatch                          Patch src/pages/Home.jsx
  catpatch --dry-run                Preview the changes
  catpatch web/src/pages/Home.jsx   Patch a page elsewhere
  catpatch --strict                 Fail unless every step applies
  catpatch steps                    List the steps
  catpatch rollback                 Undo the last patch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Page to patch (default: src/pages/Home.jsx, or [patch] target in config)
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Dry run mode (preview changes without applying)
    #[arg(short = 'd', long = "dry-run")]
    dry_run: bool,

    /// Refuse to write unless every step applies
    #[arg(long)]
    strict: bool,

    /// Number of context lines to show (default: 2)
    #[arg(
        short = 'n',
        long,
        value_name = "NUM",
        conflicts_with = "no_context",
        value_parser = clap::value_parser!(u64).range(..=10)
    )]
    #[arg(help = "Number of context lines to show around changes (max 10)\nUse 0 to show only changed lines")]
    context: Option<u64>,

    /// No context (show only changed lines)
    #[arg(long = "no-context")]
    no_context: bool,

    /// Skip backup creation (requires --force)
    #[arg(long = "no-backup", requires = "force")]
    #[arg(help = "Skip creating a backup (requires --force)\n⚠️  USE WITH CAUTION: the patch cannot be rolled back!")]
    no_backup: bool,

    /// Force dangerous operations (use with --no-backup)
    #[arg(long = "force", requires = "no_backup")]
    force: bool,

    /// Custom backup directory
    #[arg(long, value_name = "DIR")]
    #[arg(help = "Use custom directory for backups\nDefault: ~/.catpatch/backups/")]
    backup_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the patch steps
    Steps,

    /// Rollback a previous patch
    #[command(long_about = "Restore the page from a backup.

If no backup ID is specified, rolls back the most recent patch.
Use 'catpatch history' to see all available backups.

EXAMPLES:
  catpatch rollback                           Rollback last patch
  catpatch rollback 20260110-120000123-abc12345   Rollback specific backup")]
    Rollback {
        /// Backup ID to rollback (optional, defaults to last operation)
        #[arg(value_name = "ID")]
        id: Option<String>,

        /// Custom backup directory
        #[arg(long, value_name = "DIR")]
        backup_dir: Option<String>,
    },

    /// Show patch history
    History {
        /// Custom backup directory
        #[arg(long, value_name = "DIR")]
        backup_dir: Option<String>,
    },

    /// Show current backup status
    Status {
        /// Custom backup directory
        #[arg(long, value_name = "DIR")]
        backup_dir: Option<String>,
    },

    /// Edit configuration file
    #[command(long_about = "Open the configuration file (~/.catpatch/config.toml) in $EDITOR.

The edit is validated before it replaces the existing file.

CONFIGURATION OPTIONS:
  [patch]
    target = \"src/pages/Home.jsx\"  # Page patched by default
    strict = false                 # Refuse to write when a step is skipped

  [backup]
    enabled = true                 # Back up before writing
    backup_dir = \"/path\"           # Custom backup directory (optional)
    max_backups = 50               # Backups kept

  [display]
    context_lines = 2              # Context lines to show (max 10)

  [logging]
    debug = false                  # Log to ~/.catpatch/catpatch.log")]
    Config {
        /// Show current configuration without editing
        #[arg(long = "show")]
        show: bool,
    },
}

#[derive(Debug, PartialEq)]
pub enum Args {
    Patch {
        file: Option<String>,
        dry_run: bool,
        strict: bool,
        /// None when neither --context nor --no-context was given
        context: Option<usize>,
        no_backup: bool,
        backup_dir: Option<String>,
    },
    Steps,
    Rollback {
        id: Option<String>,
        backup_dir: Option<String>,
    },
    History {
        backup_dir: Option<String>,
    },
    Status {
        backup_dir: Option<String>,
    },
    Config {
        show: bool,
    },
}

pub fn parse_args() -> Result<Args> {
    Ok(into_args(Cli::parse()))
}

/// Parse an explicit argument list (the first item is the program name)
pub fn parse_args_from<I, T>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    Ok(into_args(cli))
}

fn into_args(cli: Cli) -> Args {
    match cli.command {
        Some(Commands::Steps) => Args::Steps,
        Some(Commands::Rollback { id, backup_dir }) => Args::Rollback {
            id,
            backup_dir: backup_dir.or(cli.backup_dir),
        },
        Some(Commands::History { backup_dir }) => Args::History {
            backup_dir: backup_dir.or(cli.backup_dir),
        },
        Some(Commands::Status { backup_dir }) => Args::Status {
            backup_dir: backup_dir.or(cli.backup_dir),
        },
        Some(Commands::Config { show }) => Args::Config { show },
        None => {
            let context = if cli.no_context {
                Some(0)
            } else {
                cli.context.map(|n| n as usize)
            };

            Args::Patch {
                file: cli.file,
                dry_run: cli.dry_run,
                strict: cli.strict,
                context,
                no_backup: cli.no_backup,
                backup_dir: cli.backup_dir,
            }
        }
    }
}
