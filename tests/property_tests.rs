//! Property-based tests for catpatch
//!
//! These use proptest to check the invariants of the substitution sequence
//! over generated buffers: anchor-free text is never touched, a second run is
//! a no-op, and removing one anchor only disables the edit that needed it.

use std::fs;
use tempfile::TempDir;

use catpatch::{
    BackupManager, Edit, FileProcessor, Patcher, Step, StepStatus, anchor_fixture, catalogue,
};

use proptest::prelude::*;

/// Every literal edit of the catalogue, flattened with its step number
fn catalogue_edits() -> Vec<(usize, Edit)> {
    catalogue()
        .into_iter()
        .flat_map(|step| {
            let number = step.number;
            step.edits.into_iter().map(move |edit| (number, edit))
        })
        .collect()
}

// ============================================================================
// Property 1: Text without anchors passes through unchanged
// ============================================================================

proptest! {
    /// Lowercase words and spaces never contain a JSX anchor
    #[test]
    fn prop_anchor_free_text_is_untouched(text in "[a-z ]{0,200}") {
        let outcome = Patcher::default().apply(&text);

        prop_assert!(!outcome.changed());
        prop_assert_eq!(outcome.text(), text.as_str());
        prop_assert_eq!(outcome.skipped_steps().len(), 13);
    }

    /// Surrounding text survives the patch verbatim
    #[test]
    fn prop_surrounding_text_is_preserved(
        prefix in "[a-z]{0,40}",
        suffix in "[a-z]{0,40}",
    ) {
        let text = format!("{}\n{}{}", prefix, anchor_fixture(), suffix);
        let outcome = Patcher::default().apply(&text);

        let head = format!("{}\n", prefix);
        prop_assert!(outcome.text().starts_with(&head));
        prop_assert!(outcome.text().ends_with(&suffix));
        prop_assert_eq!(outcome.applied_count(), 13);
    }
}

// ============================================================================
// Property 2: Running the patch twice equals running it once
// ============================================================================

proptest! {
    #[test]
    fn prop_second_run_is_noop(
        keep in proptest::collection::vec(any::<bool>(), 17),
        filler in "[a-z]{0,20}",
    ) {
        // Random subset of the anchors, separated by filler text
        let blocks: Vec<String> = catalogue_edits()
            .iter()
            .zip(keep.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|((_, edit), _)| match edit {
                Edit::Guarded { guard, .. } => guard.clone(),
                Edit::Replace { anchor, .. } => anchor.clone(),
            })
            .collect();
        let text = blocks.join(&format!("\n{}\n", filler));

        let patcher = Patcher::default();
        let first = patcher.apply(&text);
        let second = patcher.apply(first.text());

        prop_assert!(!second.changed());
        prop_assert_eq!(second.text(), first.text());
    }
}

// ============================================================================
// Property 3: A missing anchor only disables its own edit
// ============================================================================

proptest! {
    #[test]
    fn prop_missing_anchor_is_isolated(index in 0usize..17) {
        let edits = catalogue_edits();
        prop_assume!(index < edits.len());
        let (missing_step, missing_edit) = &edits[index];

        let removed = match missing_edit {
            Edit::Guarded { guard, .. } => guard.as_str(),
            Edit::Replace { anchor, .. } => anchor.as_str(),
        };
        let text = anchor_fixture().replacen(removed, "", 1);
        let outcome = Patcher::default().apply(&text);

        for report in outcome.reports() {
            if report.number == *missing_step {
                prop_assert_ne!(report.status(), StepStatus::Applied);
            } else {
                prop_assert_eq!(report.status(), StepStatus::Applied);
            }
        }

        for (number, edit) in &edits {
            let present = outcome.text().contains(edit.replacement());
            if std::ptr::eq(edit, missing_edit) {
                prop_assert!(!present, "step {} should not have applied", number);
            } else {
                prop_assert!(present, "step {} should have applied", number);
            }
        }
    }
}

// ============================================================================
// Property 4: Replace-all semantics
// ============================================================================

proptest! {
    #[test]
    fn prop_every_occurrence_is_replaced(
        count in 1usize..10,
        separator in "[a-z]{1,5}",
    ) {
        let anchor = "      fetchTools(1, searchTerm);";
        let text = vec![anchor; count].join(&separator);

        let outcome = Patcher::default().apply(&text);

        prop_assert_eq!(outcome.reports()[6].occurrences(), count);
        prop_assert_eq!(
            outcome.text().matches("fetchTools(1, searchTerm, selectedCategory);").count(),
            count
        );
    }

    /// Custom steps follow the same contract as the built-in catalogue
    #[test]
    fn prop_custom_step_counts_occurrences(
        words in proptest::collection::vec("[a-c]{1,3}", 0..20),
    ) {
        let text = words.join(" ");
        let patcher = Patcher::new(vec![Step::new(1, "shout", vec![Edit::replace("abc", "ABC")])]);
        let expected = text.matches("abc").count();

        let outcome = patcher.apply(&text);

        prop_assert_eq!(outcome.reports()[0].occurrences(), expected);
        prop_assert_eq!(outcome.text(), text.replace("abc", "ABC"));
    }
}

// ============================================================================
// End-to-end: patch a page on disk, then roll it back
// ============================================================================

#[test]
fn patch_and_rollback_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let page_dir = temp_dir.path().join("src").join("pages");
    fs::create_dir_all(&page_dir).unwrap();
    let page = page_dir.join("Home.jsx");
    let original = anchor_fixture();
    fs::write(&page, &original).unwrap();

    let mut manager = BackupManager::with_directory(temp_dir.path().join("backups")).unwrap();
    let processor = FileProcessor::new(Patcher::default());

    let diff = processor.preview(&page).unwrap();
    assert!(diff.has_changes());
    let backup_id = manager
        .create_backup(&page, &diff.outcome.touched_steps())
        .unwrap();
    processor.commit(&page, &diff).unwrap();

    let patched = fs::read_to_string(&page).unwrap();
    assert!(patched.contains("const handleCategoryChange = (category) => {"));
    assert!(patched.contains("{/* Filtros de Categoría (Pill Shapes) */}"));

    // Second run finds nothing left to do
    let again = processor.apply(&page).unwrap();
    assert!(!again.has_changes());
    assert_eq!(fs::read_to_string(&page).unwrap(), patched);

    manager.restore_backup(&backup_id).unwrap();
    assert_eq!(fs::read_to_string(&page).unwrap(), original);
}

#[test]
fn minimal_state_fixture_gains_category_state() {
    let temp_dir = TempDir::new().unwrap();
    let page = temp_dir.path().join("Home.jsx");
    fs::write(
        &page,
        "  const [totalResults, setTotalResults] = useState(0);\n  const debounceTimer = useRef(null);",
    )
    .unwrap();

    let diff = FileProcessor::new(Patcher::default()).apply(&page).unwrap();
    assert_eq!(diff.outcome.touched_steps(), vec![1]);
    assert_eq!(
        fs::read_to_string(&page).unwrap(),
        concat!(
            "  const [totalResults, setTotalResults] = useState(0);\n",
            "  const [categories, setCategories] = useState([\"Todas\"]);\n",
            "  const [selectedCategory, setSelectedCategory] = useState(\"Todas\");\n",
            "  const debounceTimer = useRef(null);",
        )
    );
}
