use crate::backup_manager::BackupMetadata;
use crate::file_processor::{ChangeType, FileDiff, LineChange};
use crate::patcher::{PatchOutcome, Step, StepStatus};
use colored::*;
use std::io::IsTerminal;

pub struct DiffFormatter;

impl DiffFormatter {
    /// Auto-detect if we should use colors
    pub fn should_use_color() -> bool {
        // https://no-color.org/
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// One line per step with its status
    pub fn format_step_summary(outcome: &PatchOutcome, use_color: bool) -> String {
        let mut output = String::new();

        for report in outcome.reports() {
            let (label, colored_label) = match report.status() {
                StepStatus::Applied => ("applied", "applied".green().bold()),
                StepStatus::Partial => ("partial", "partial".yellow().bold()),
                StepStatus::Skipped => ("skipped", "skipped".red().bold()),
            };

            if use_color {
                output.push_str(&format!(
                    "  {:>2}. [{}] {}\n",
                    report.number, colored_label, report.title
                ));
            } else {
                output.push_str(&format!(
                    "  {:>2}. [{}] {}\n",
                    report.number, label, report.title
                ));
            }
        }

        let skipped = outcome.skipped_steps().len();
        let partial = outcome.incomplete_steps().len() - skipped;
        output.push_str(&format!(
            "\nSteps: {} applied, {} partial, {} skipped\n",
            outcome.applied_count(),
            partial,
            skipped
        ));

        output
    }

    /// Format file diff with context
    pub fn format_diff_with_context(
        diff: &FileDiff,
        context_size: usize,
        use_color: bool,
    ) -> String {
        let mut output = String::new();

        if use_color {
            output.push_str(&format!("{}\n", diff.file_path.bold().cyan()));
        } else {
            output.push_str(&format!("{}\n", diff.file_path));
        }

        for line in Self::filter_lines_with_context(&diff.lines, context_size) {
            let Some(line) = line else {
                if use_color {
                    output.push_str(&format!("{}\n", "...".dimmed()));
                } else {
                    output.push_str("...\n");
                }
                continue;
            };

            let indicator = match line.change_type {
                ChangeType::Unchanged => "=",
                ChangeType::Added => "+",
                ChangeType::Deleted => "-",
            };
            let line_num = line.display_line();

            if use_color {
                let colored_line = match line.change_type {
                    ChangeType::Unchanged => format!(
                        "L{}: {} {}\n",
                        line_num,
                        indicator.dimmed(),
                        line.content.dimmed()
                    ),
                    ChangeType::Added => format!(
                        "L{}: {} {}\n",
                        line_num,
                        indicator.green().bold(),
                        line.content.green().bold()
                    ),
                    ChangeType::Deleted => format!(
                        "L{}: {} {}\n",
                        line_num,
                        indicator.red().bold(),
                        line.content.red()
                    ),
                };
                output.push_str(&colored_line);
            } else {
                output.push_str(&format!("L{}: {} {}\n", line_num, indicator, line.content));
            }
        }

        let added = diff.added_count();
        let deleted = diff.deleted_count();
        if use_color {
            output.push_str(&format!(
                "\nTotal: {} added, {} deleted\n",
                added.to_string().green().bold(),
                deleted.to_string().red().bold()
            ));
        } else {
            output.push_str(&format!("\nTotal: {} added, {} deleted\n", added, deleted));
        }

        output
    }

    /// Keep changed lines plus `context_size` lines around them
    ///
    /// `None` marks a gap between two distant hunks.
    fn filter_lines_with_context(
        lines: &[LineChange],
        context_size: usize,
    ) -> Vec<Option<&LineChange>> {
        let changed_indices: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.change_type != ChangeType::Unchanged)
            .map(|(i, _)| i)
            .collect();

        if changed_indices.is_empty() {
            return Vec::new();
        }

        // Merge changes whose context windows touch or overlap
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for idx in changed_indices {
            let start = idx.saturating_sub(context_size);
            let end = idx.saturating_add(context_size).saturating_add(1).min(lines.len());
            if let Some(last) = ranges.last_mut() {
                if start <= last.1 {
                    last.1 = last.1.max(end);
                    continue;
                }
            }
            ranges.push((start, end));
        }

        let mut result = Vec::new();
        for (i, (start, end)) in ranges.iter().enumerate() {
            if i > 0 {
                result.push(None);
            }
            result.extend(lines[*start..*end].iter().map(Some));
        }

        result
    }

    /// The built-in catalogue, with edit counts
    pub fn format_catalogue(steps: &[Step], use_color: bool) -> String {
        let mut output = String::new();

        for step in steps {
            let edits = if step.edits.len() == 1 {
                "1 edit".to_string()
            } else {
                format!("{} edits", step.edits.len())
            };

            if use_color {
                output.push_str(&format!(
                    "{:>2}. {} {}\n",
                    step.number.to_string().bold(),
                    step.title,
                    format!("({})", edits).dimmed()
                ));
            } else {
                output.push_str(&format!("{:>2}. {} ({})\n", step.number, step.title, edits));
            }
        }

        output
    }

    /// Format operation history
    pub fn format_history(backups: &[BackupMetadata], use_color: bool) -> String {
        let mut output = String::new();

        if backups.is_empty() {
            output.push_str("No backup history found.\n");
            return output;
        }

        if use_color {
            output.push_str(&format!("{}", "Operation History:\n\n".bold().white()));
        } else {
            output.push_str("Operation History:\n\n");
        }

        // Newest first
        for backup in backups.iter().rev() {
            let steps = backup
                .applied_steps
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ");

            if use_color {
                output.push_str(&format!("ID: {}\n", backup.id.yellow()));
            } else {
                output.push_str(&format!("ID: {}\n", backup.id));
            }
            output.push_str(&format!("  Time: {}\n", backup.timestamp.format("%Y-%m-%d %H:%M:%S")));
            output.push_str(&format!("  File: {}\n", backup.file.original_path.display()));
            let steps = if steps.is_empty() { "none" } else { &steps };
            output.push_str(&format!("  Steps: {}\n", steps));
            output.push('\n');
        }

        output
    }

    /// Format dry run header
    pub fn format_dry_run_header(file_path: &str, use_color: bool) -> String {
        if use_color {
            format!("{} {}\n\n", "🔍 Dry run:".bold().cyan(), file_path.white().bold())
        } else {
            format!("Dry run: {}\n\n", file_path)
        }
    }

    /// Completion message with the rollback hint
    pub fn format_execute_result(backup_id: Option<&str>, use_color: bool) -> String {
        let mut output = String::new();

        if use_color {
            output.push_str(&format!("{}\n", "✅ File updated successfully!".bold().green()));
        } else {
            output.push_str("File updated successfully!\n");
        }

        if let Some(id) = backup_id {
            output.push_str(&format!("\nBackup ID: {}\n", id));
            if use_color {
                output.push_str(&format!(
                    "{}{}\n",
                    "Rollback with: ".white(),
                    format!("catpatch rollback {}", id).bold().yellow()
                ));
            } else {
                output.push_str(&format!("Rollback with: catpatch rollback {}\n", id));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patcher::{Edit, Patcher};
    use chrono::Utc;
    use std::path::PathBuf;

    fn line(n: usize, change_type: ChangeType) -> LineChange {
        LineChange {
            old_line: Some(n),
            new_line: Some(n),
            change_type,
            content: format!("line {}", n),
        }
    }

    #[test]
    fn test_filter_lines_groups_distant_changes() {
        let mut lines: Vec<LineChange> = (1..=20).map(|n| line(n, ChangeType::Unchanged)).collect();
        lines[2].change_type = ChangeType::Added;
        lines[15].change_type = ChangeType::Deleted;

        let filtered = DiffFormatter::filter_lines_with_context(&lines, 1);
        let gaps = filtered.iter().filter(|l| l.is_none()).count();
        assert_eq!(gaps, 1);
        assert_eq!(filtered.len(), 3 + 1 + 3);
    }

    #[test]
    fn test_filter_lines_merges_close_changes() {
        let mut lines: Vec<LineChange> = (1..=10).map(|n| line(n, ChangeType::Unchanged)).collect();
        lines[3].change_type = ChangeType::Added;
        lines[5].change_type = ChangeType::Added;

        let filtered = DiffFormatter::filter_lines_with_context(&lines, 1);
        assert!(filtered.iter().all(|l| l.is_some()));
        assert_eq!(filtered.len(), 5);
    }

    #[test]
    fn test_filter_lines_zero_context() {
        let mut lines: Vec<LineChange> = (1..=5).map(|n| line(n, ChangeType::Unchanged)).collect();
        lines[1].change_type = ChangeType::Added;
        lines[2].change_type = ChangeType::Added;

        let filtered = DiffFormatter::filter_lines_with_context(&lines, 0);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_lines_huge_context_shows_everything() {
        let mut lines: Vec<LineChange> = (1..=5).map(|n| line(n, ChangeType::Unchanged)).collect();
        lines[2].change_type = ChangeType::Added;

        let filtered = DiffFormatter::filter_lines_with_context(&lines, usize::MAX);
        assert_eq!(filtered.len(), 5);
        assert!(filtered.iter().all(|l| l.is_some()));
    }

    #[test]
    fn test_step_summary_plain() {
        let patcher = Patcher::new(vec![
            Step::new(1, "first", vec![Edit::replace("a", "b")]),
            Step::new(2, "second", vec![Edit::replace("zzz", "y")]),
        ]);
        let outcome = patcher.apply("a");

        let summary = DiffFormatter::format_step_summary(&outcome, false);
        assert!(summary.contains("   1. [applied] first"));
        assert!(summary.contains("   2. [skipped] second"));
        assert!(summary.contains("Steps: 1 applied, 0 partial, 1 skipped"));
    }

    #[test]
    fn test_catalogue_plain() {
        let steps = vec![
            Step::new(1, "one", vec![Edit::replace("a", "b")]),
            Step::new(2, "two", vec![Edit::replace("c", "d"), Edit::replace("e", "f")]),
        ];
        let output = DiffFormatter::format_catalogue(&steps, false);
        assert_eq!(output, " 1. one (1 edit)\n 2. two (2 edits)\n");
    }

    #[test]
    fn test_history_newest_first() {
        let backup = |id: &str| BackupMetadata {
            id: id.to_string(),
            timestamp: Utc::now(),
            file: crate::backup_manager::FileBackup {
                original_path: PathBuf::from("/srv/app/src/pages/Home.jsx"),
                backup_path: PathBuf::from("/tmp/Home.jsx"),
            },
            applied_steps: vec![1, 13],
        };

        let output = DiffFormatter::format_history(&[backup("older"), backup("newer")], false);
        assert!(output.find("ID: newer").unwrap() < output.find("ID: older").unwrap());
        assert!(output.contains("Steps: 1, 13"));
        assert_eq!(DiffFormatter::format_history(&[], false), "No backup history found.\n");
    }

    #[test]
    fn test_execute_result_plain() {
        let output = DiffFormatter::format_execute_result(Some("20260101-abc"), false);
        assert!(output.starts_with("File updated successfully!"));
        assert!(output.contains("Rollback with: catpatch rollback 20260101-abc"));

        let output = DiffFormatter::format_execute_result(None, false);
        assert_eq!(output, "File updated successfully!\n");
    }
}
