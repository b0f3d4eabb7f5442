//! Literal substitution engine
//!
//! A [`Patcher`] runs an ordered list of [`Step`]s over an in-memory buffer.
//! Every edit matches its anchor exactly; an anchor that is not present leaves
//! the buffer untouched and the remaining edits still run.

use tracing::{debug, warn};

/// One literal substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace every occurrence of `anchor` with `replacement`.
    ///
    /// When `replacement` contains `anchor` the edit is an insertion, and it
    /// is skipped entirely once `replacement` already appears in the buffer.
    Replace { anchor: String, replacement: String },
    /// Replace the first occurrence of `anchor`, but only when `guard` is
    /// found past the start of the buffer.
    Guarded {
        guard: String,
        anchor: String,
        replacement: String,
    },
}

impl Edit {
    pub fn replace(anchor: impl Into<String>, replacement: impl Into<String>) -> Self {
        Edit::Replace {
            anchor: anchor.into(),
            replacement: replacement.into(),
        }
    }

    pub fn guarded(
        guard: impl Into<String>,
        anchor: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Edit::Guarded {
            guard: guard.into(),
            anchor: anchor.into(),
            replacement: replacement.into(),
        }
    }

    pub fn anchor(&self) -> &str {
        match self {
            Edit::Replace { anchor, .. } | Edit::Guarded { anchor, .. } => anchor,
        }
    }

    pub fn replacement(&self) -> &str {
        match self {
            Edit::Replace { replacement, .. } | Edit::Guarded { replacement, .. } => replacement,
        }
    }

    /// Apply the edit to `buffer`, returning how many occurrences were replaced.
    pub fn apply(&self, buffer: &mut String) -> usize {
        match self {
            Edit::Replace { anchor, replacement } => {
                // An empty anchor would match between every character
                if anchor.is_empty() {
                    return 0;
                }
                // Insertions keep their anchor; once inserted they must not repeat
                if replacement.contains(anchor.as_str()) && buffer.contains(replacement.as_str()) {
                    return 0;
                }
                let occurrences = buffer.matches(anchor.as_str()).count();
                if occurrences > 0 {
                    *buffer = buffer.replace(anchor.as_str(), replacement);
                }
                occurrences
            }
            Edit::Guarded {
                guard,
                anchor,
                replacement,
            } => {
                if anchor.is_empty() || buffer.find(guard.as_str()) <= Some(0) {
                    return 0;
                }
                match buffer.find(anchor.as_str()) {
                    Some(start) => {
                        buffer.replace_range(start..start + anchor.len(), replacement);
                        1
                    }
                    None => 0,
                }
            }
        }
    }
}

/// A numbered group of edits applied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub number: usize,
    pub title: String,
    pub edits: Vec<Edit>,
}

impl Step {
    pub fn new(number: usize, title: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            number,
            title: title.into(),
            edits,
        }
    }

    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.edits.iter().map(Edit::anchor)
    }

    pub fn replacements(&self) -> impl Iterator<Item = &str> {
        self.edits.iter().map(Edit::replacement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Every edit of the step matched
    Applied,
    /// Some edits matched, others found no anchor
    Partial,
    /// No edit matched
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditReport {
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub number: usize,
    pub title: String,
    pub edits: Vec<EditReport>,
}

impl StepReport {
    pub fn status(&self) -> StepStatus {
        let matched = self.edits.iter().filter(|e| e.occurrences > 0).count();
        if matched == 0 {
            StepStatus::Skipped
        } else if matched == self.edits.len() {
            StepStatus::Applied
        } else {
            StepStatus::Partial
        }
    }

    pub fn occurrences(&self) -> usize {
        self.edits.iter().map(|e| e.occurrences).sum()
    }
}

/// Result of running a patcher over a buffer.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    text: String,
    changed: bool,
    reports: Vec<StepReport>,
}

impl PatchOutcome {
    /// The transformed text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// True when the transformed text differs from the input
    pub fn changed(&self) -> bool {
        self.changed
    }

    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    pub fn applied_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status() == StepStatus::Applied)
            .count()
    }

    pub fn skipped_steps(&self) -> Vec<&StepReport> {
        self.reports
            .iter()
            .filter(|r| r.status() == StepStatus::Skipped)
            .collect()
    }

    /// Steps that were skipped or only partially applied
    pub fn incomplete_steps(&self) -> Vec<&StepReport> {
        self.reports
            .iter()
            .filter(|r| r.status() != StepStatus::Applied)
            .collect()
    }

    /// Numbers of the steps where at least one edit matched
    pub fn touched_steps(&self) -> Vec<usize> {
        self.reports
            .iter()
            .filter(|r| r.status() != StepStatus::Skipped)
            .map(|r| r.number)
            .collect()
    }
}

pub struct Patcher {
    steps: Vec<Step>,
}

impl Default for Patcher {
    /// The built-in category-filtering catalogue
    fn default() -> Self {
        Self::new(crate::steps::catalogue())
    }
}

impl Patcher {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order over a copy of `text`.
    pub fn apply(&self, text: &str) -> PatchOutcome {
        let mut buffer = text.to_string();
        let mut reports = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let edits = step
                .edits
                .iter()
                .enumerate()
                .map(|(index, edit)| {
                    let occurrences = edit.apply(&mut buffer);
                    debug!(
                        step = step.number,
                        edit = index + 1,
                        occurrences,
                        "edit applied"
                    );
                    EditReport { occurrences }
                })
                .collect();

            let report = StepReport {
                number: step.number,
                title: step.title.clone(),
                edits,
            };

            match report.status() {
                StepStatus::Applied => {}
                StepStatus::Partial => {
                    warn!(step = step.number, title = %step.title, "step partially applied")
                }
                StepStatus::Skipped => {
                    warn!(step = step.number, title = %step.title, "anchor not found, step skipped")
                }
            }

            reports.push(report);
        }

        let changed = buffer != text;
        PatchOutcome {
            text: buffer,
            changed,
            reports,
        }
    }
}
