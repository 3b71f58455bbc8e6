//! The four-stage name pipeline and per-file planning.

use super::plan::{DraftBatch, RenamePlan};
use super::rules::RenameRules;
use crate::core::facts::{normalize_path, path_key, FactProvider, FileFact};
use crate::core::stages::NameState;
use crate::error::{FileError, StageError};
use crate::events::{null_sender, Event, EventSender, PlanEvent, PlanProgress};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Derives destinations for source files.
///
/// Stage order is fixed: format, regex substitutions, extension remap,
/// case change. Stages without a rule pass the name through.
pub struct Renamer {
    rules: RenameRules,
    provider: Arc<dyn FactProvider>,
}

impl Renamer {
    pub fn new(rules: RenameRules, provider: Arc<dyn FactProvider>) -> Self {
        Self { rules, provider }
    }

    pub fn provider(&self) -> &dyn FactProvider {
        self.provider.as_ref()
    }

    /// Run every stage for one file
    pub fn derive_name(&self, fact: &FileFact<'_>) -> Result<NameState, FileError> {
        let mut name = NameState::new(fact.basename(), fact.extension());

        if let Some(format) = self.rules.format() {
            let formatted = format.expand(fact)?;
            debug!("format({:?}) {:?} -> {:?}", format.source(), fact.path(), formatted);
            name = NameState::from_file_name(&formatted);
        }

        for substitution in self.rules.substitutions() {
            let before = name.file_name();
            name = substitution.apply(name)?;
            debug!(
                "regex s/{}/{}/ {:?} -> {:?}",
                substitution.pattern(),
                substitution.replacement(),
                before,
                name.file_name()
            );
        }

        let map = self.rules.extension_map();
        if !map.is_empty() {
            let before = name.extension.clone();
            name = map.apply(name);
            if before != name.extension {
                debug!("map_ext {:?} -> {:?}", before, name.extension);
            }
        }

        name = self.rules.case().apply(name);

        validate_name(&name)?;
        Ok(name)
    }

    /// Compute the plan for one source path.
    ///
    /// `.` components are dropped from the source first.
    pub fn plan_file(&self, path: &Path) -> RenamePlan {
        let path = normalize_path(path);
        let path = path.as_path();
        let result = FileFact::extract(path, self.provider.as_ref())
            .map_err(FileError::from)
            .and_then(|fact| self.derive_name(&fact));

        match result {
            Ok(name) => {
                let destination = path.with_file_name(name.file_name());
                debug!("planning to rename {:?} to {:?}", path, destination);
                RenamePlan::Planned {
                    source: path.to_path_buf(),
                    name,
                    destination,
                }
            }
            Err(error) => {
                warn!("failed to plan {:?}: {}", path, error);
                RenamePlan::Failed {
                    source: path.to_path_buf(),
                    error,
                }
            }
        }
    }

    /// Plan every path without progress reporting
    pub fn plan_batch(&self, paths: &[PathBuf]) -> DraftBatch {
        self.plan_batch_with_events(paths, &null_sender())
    }

    /// Plan every path in parallel.
    ///
    /// Paths naming the same file, such as `a.txt` and `./a.txt`, are
    /// planned once; the draft keeps first-seen order.
    pub fn plan_batch_with_events(&self, paths: &[PathBuf], events: &EventSender) -> DraftBatch {
        let mut seen = HashSet::new();
        let unique: Vec<PathBuf> = paths
            .iter()
            .map(|p| normalize_path(p))
            .filter(|p| seen.insert(path_key(p)))
            .collect();
        let total = unique.len();
        debug!("Processing {} file(s)", total);

        events.send(Event::Plan(PlanEvent::Started { total_files: total }));

        let completed = AtomicUsize::new(0);
        let plans: Vec<RenamePlan> = unique
            .par_iter()
            .map(|path| {
                let plan = self.plan_file(path);
                let current = completed.fetch_add(1, Ordering::SeqCst) + 1;

                if let RenamePlan::Failed { error, .. } = &plan {
                    events.send(Event::Plan(PlanEvent::FileFailed {
                        path: path.to_path_buf(),
                        message: error.to_string(),
                    }));
                }
                events.send(Event::Plan(PlanEvent::Progress(PlanProgress {
                    completed: current,
                    total,
                    current_path: path.to_path_buf(),
                })));

                plan
            })
            .collect();

        let draft = DraftBatch::new(plans);
        events.send(Event::Plan(PlanEvent::Completed {
            planned: draft.len() - draft.failed_count(),
            failed: draft.failed_count(),
        }));

        draft
    }
}

/// The final name must be a single, non-empty path component
fn validate_name(name: &NameState) -> Result<(), StageError> {
    let file_name = name.file_name();

    if file_name.is_empty() {
        return Err(StageError::EmptyName);
    }
    if file_name.contains('/') || file_name.contains(MAIN_SEPARATOR) {
        return Err(StageError::PathSeparator { name: file_name });
    }
    if file_name == "." || file_name == ".." {
        return Err(StageError::ReservedName { name: file_name });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::facts::MemoryFacts;
    use crate::core::stages::CaseMode;
    use crate::error::FormatError;
    use std::time::UNIX_EPOCH;

    fn renamer(rules: RenameRules, facts: MemoryFacts) -> Renamer {
        Renamer::new(rules, Arc::new(facts))
    }

    fn planned_name(plan: &RenamePlan) -> String {
        match plan {
            RenamePlan::Planned { name, .. } => name.file_name(),
            RenamePlan::Failed { error, .. } => panic!("plan failed: {error}"),
        }
    }

    #[test]
    fn default_rule_uses_hash_and_extension() {
        let facts = MemoryFacts::new().with_file("/data/empty.txt", "", UNIX_EPOCH);
        let renamer = renamer(RenameRules::default(), facts);

        let plan = renamer.plan_file(Path::new("/data/empty.txt"));
        match &plan {
            RenamePlan::Planned {
                name, destination, ..
            } => {
                assert_eq!(name, &NameState::new("e3b0c442", "txt"));
                assert_eq!(destination, Path::new("/data/e3b0c442.txt"));
            }
            RenamePlan::Failed { error, .. } => panic!("plan failed: {error}"),
        }
    }

    #[test]
    fn stages_run_in_fixed_order() {
        // format -> regex -> map-ext -> case
        let rules = RenameRules::builder()
            .format("%(-=2)T_%B%.csv")
            .substitution("s/_/-/")
            .map_extension("csv=txt")
            .map_extension("txt=html")
            .case(CaseMode::Upper)
            .build()
            .unwrap();
        let facts = MemoryFacts::new().with_file("a-b.dat", "", UNIX_EPOCH);
        let renamer = renamer(rules, facts);

        let plan = renamer.plan_file(Path::new("a-b.dat"));
        assert_eq!(planned_name(&plan), "B-A-B.txt");
    }

    #[test]
    fn extension_map_applies_once_per_file() {
        let rules = RenameRules::builder()
            .map_extension("csv=txt")
            .map_extension("txt=html")
            .build()
            .unwrap();
        let facts = MemoryFacts::new()
            .with_file("rows.csv", "", UNIX_EPOCH)
            .with_file("text.txt", "", UNIX_EPOCH);
        let renamer = renamer(rules, facts);

        assert_eq!(planned_name(&renamer.plan_file(Path::new("rows.csv"))), "rows.txt");
        assert_eq!(planned_name(&renamer.plan_file(Path::new("text.txt"))), "text.html");
    }

    #[test]
    fn case_stage_keeps_extension() {
        let rules = RenameRules::builder().case(CaseMode::Upper).build().unwrap();
        let facts = MemoryFacts::new().with_file("Archive.gz", "", UNIX_EPOCH);
        let renamer = renamer(rules, facts);

        assert_eq!(planned_name(&renamer.plan_file(Path::new("Archive.gz"))), "ARCHIVE.gz");
    }

    #[test]
    fn field_index_error_fails_only_that_file() {
        let rules = RenameRules::builder().format("%(_=3)T").build().unwrap();
        let facts = MemoryFacts::new()
            .with_file("a_b", "", UNIX_EPOCH)
            .with_file("a_b_c", "", UNIX_EPOCH);
        let renamer = renamer(rules, facts);

        let draft = renamer.plan_batch(&[PathBuf::from("a_b"), PathBuf::from("a_b_c")]);
        assert_eq!(draft.failed_count(), 1);
        assert!(matches!(
            &draft.plans()[0],
            RenamePlan::Failed {
                error: FileError::Format(FormatError::FieldIndex { .. }),
                ..
            }
        ));
        assert_eq!(planned_name(&draft.plans()[1]), "c");
    }

    #[test]
    fn missing_source_fails_plan() {
        let renamer = renamer(RenameRules::default(), MemoryFacts::new());
        let plan = renamer.plan_file(Path::new("/data/missing.txt"));
        assert!(matches!(
            plan,
            RenamePlan::Failed {
                error: FileError::Facts(_),
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_and_nested_names() {
        let facts = MemoryFacts::new().with_file("x.txt", "", UNIX_EPOCH);
        let facts = Arc::new(facts);

        let empty = Renamer::new(RenameRules::builder().format("").build().unwrap(), facts.clone());
        assert!(matches!(
            empty.plan_file(Path::new("x.txt")),
            RenamePlan::Failed {
                error: FileError::Stage(StageError::EmptyName),
                ..
            }
        ));

        let nested = Renamer::new(RenameRules::builder().format("sub/%B").build().unwrap(), facts.clone());
        assert!(matches!(
            nested.plan_file(Path::new("x.txt")),
            RenamePlan::Failed {
                error: FileError::Stage(StageError::PathSeparator { .. }),
                ..
            }
        ));

        let dots = Renamer::new(RenameRules::builder().format("..").build().unwrap(), facts);
        assert!(matches!(
            dots.plan_file(Path::new("x.txt")),
            RenamePlan::Failed {
                error: FileError::Stage(StageError::ReservedName { .. }),
                ..
            }
        ));
    }

    #[test]
    fn batch_keeps_order_and_drops_duplicates() {
        let rules = RenameRules::builder().format("%B-new%.%E").build().unwrap();
        let facts = MemoryFacts::new()
            .with_file("b.txt", "", UNIX_EPOCH)
            .with_file("a.txt", "", UNIX_EPOCH);
        let renamer = renamer(rules, facts);

        let paths = vec![
            PathBuf::from("b.txt"),
            PathBuf::from("a.txt"),
            PathBuf::from("b.txt"),
        ];
        let draft = renamer.plan_batch(&paths);

        let sources: Vec<_> = draft.plans().iter().map(|p| p.source().to_path_buf()).collect();
        assert_eq!(sources, vec![PathBuf::from("b.txt"), PathBuf::from("a.txt")]);
    }

    #[test]
    fn current_dir_prefix_is_the_same_file() {
        let rules = RenameRules::builder().format("same.txt").build().unwrap();
        let facts = MemoryFacts::new().with_file("a.txt", "", UNIX_EPOCH);
        let renamer = renamer(rules, facts);

        let draft = renamer.plan_batch(&[PathBuf::from("a.txt"), PathBuf::from("./a.txt")]);
        assert_eq!(draft.len(), 1);
        match &draft.plans()[0] {
            RenamePlan::Planned {
                source, destination, ..
            } => {
                assert_eq!(source, Path::new("a.txt"));
                assert_eq!(destination, Path::new("same.txt"));
            }
            RenamePlan::Failed { error, .. } => panic!("plan failed: {error}"),
        }
    }

    #[test]
    fn nested_current_dir_is_dropped_from_paths() {
        let facts = MemoryFacts::new().with_file("dir/a.txt", "", UNIX_EPOCH);
        let renamer = renamer(RenameRules::builder().format("b.txt").build().unwrap(), facts);

        match renamer.plan_file(Path::new("./dir/./a.txt")) {
            RenamePlan::Planned {
                source, destination, ..
            } => {
                assert_eq!(source, Path::new("dir/a.txt"));
                assert_eq!(destination, Path::new("dir/b.txt"));
            }
            RenamePlan::Failed { error, .. } => panic!("plan failed: {error}"),
        }
    }

    #[test]
    fn hash_is_not_read_when_template_skips_it() {
        let facts = Arc::new(MemoryFacts::new().with_file("a.txt", "abc", UNIX_EPOCH));
        let renamer = Renamer::new(
            RenameRules::builder().format("%B-%S%.%E").build().unwrap(),
            facts.clone(),
        );

        assert_eq!(planned_name(&renamer.plan_file(Path::new("a.txt"))), "a-3.txt");
        assert_eq!(facts.opens(), 0);
    }
}
