//! Batch-wide conflict detection.

use super::batch::{BatchPlan, RenameOperation, SkippedFile};
use crate::core::facts::{path_key, FactProvider};
use crate::core::pipeline::{DraftBatch, RenamePlan};
use crate::error::ConflictError;
use crate::events::{null_sender, Event, EventSender, ResolveEvent};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What a failed per-file plan does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Any failed file fails the whole batch
    #[default]
    Abort,
    /// Skip failed files and record them; overwriting is implied
    Continue,
}

/// Resolver settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Allow replacing existing destinations
    pub overwrite: bool,
    pub policy: ErrorPolicy,
    /// Sources disappear when applied (moves). Links leave them in place.
    pub vacates_sources: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            policy: ErrorPolicy::Abort,
            vacates_sources: true,
        }
    }
}

impl ResolveOptions {
    fn allows_overwrite(&self) -> bool {
        self.overwrite || self.policy == ErrorPolicy::Continue
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Active,
    Done,
}

/// Validates a [`DraftBatch`] as a whole
pub struct ConflictResolver<'p> {
    options: ResolveOptions,
    provider: &'p dyn FactProvider,
}

impl<'p> ConflictResolver<'p> {
    /// `provider` answers whether a destination is already occupied
    pub fn new(options: ResolveOptions, provider: &'p dyn FactProvider) -> Self {
        Self { options, provider }
    }

    pub fn resolve(&self, draft: DraftBatch) -> Result<BatchPlan, Vec<ConflictError>> {
        self.resolve_with_events(draft, &null_sender())
    }

    /// Check the whole batch, reporting every conflict found
    pub fn resolve_with_events(
        &self,
        draft: DraftBatch,
        events: &EventSender,
    ) -> Result<BatchPlan, Vec<ConflictError>> {
        let mut conflicts = Vec::new();
        let mut skipped = Vec::new();
        let mut unchanged = Vec::new();
        let mut candidates = Vec::new();

        for plan in draft.into_plans() {
            match plan {
                RenamePlan::Failed { source, error } => match self.options.policy {
                    ErrorPolicy::Abort => conflicts.push(ConflictError::PlanFailed {
                        path: source,
                        error,
                    }),
                    ErrorPolicy::Continue => {
                        warn!("skipping {:?}: {}", source, error);
                        skipped.push(SkippedFile {
                            path: source,
                            error,
                        });
                    }
                },
                RenamePlan::Planned {
                    source,
                    destination,
                    ..
                } if path_key(&source) == path_key(&destination) => {
                    debug!("{:?}: filename unchanged", source);
                    unchanged.push(source);
                }
                RenamePlan::Planned {
                    source,
                    destination,
                    ..
                } => candidates.push((source, destination)),
            }
        }

        let colliding = find_collisions(&candidates, &unchanged, &mut conflicts);

        let vacated: HashSet<PathBuf> = if self.options.vacates_sources {
            candidates.iter().map(|(source, _)| path_key(source)).collect()
        } else {
            HashSet::new()
        };

        let mut operations = Vec::with_capacity(candidates.len());
        for (source, destination) in &candidates {
            let key = path_key(destination);
            if colliding.contains(&key) {
                continue;
            }

            let occupied = self.provider.exists(destination) && !vacated.contains(&key);
            if occupied && !self.options.allows_overwrite() {
                conflicts.push(ConflictError::DestinationExists {
                    path: source.clone(),
                    destination: destination.clone(),
                });
                continue;
            }
            if occupied {
                warn!("renaming {:?}: overwriting {:?}", source, destination);
            }

            operations.push(RenameOperation {
                source: source.clone(),
                destination: destination.clone(),
                overwrites: occupied,
            });
        }

        let operations = if self.options.vacates_sources {
            order_operations(operations, &mut conflicts)
        } else {
            operations
        };

        events.send(Event::Resolve(ResolveEvent::Completed {
            operations: operations.len(),
            unchanged: unchanged.len(),
            conflicts: conflicts.len(),
        }));

        if !conflicts.is_empty() {
            return Err(conflicts);
        }

        debug!(
            "planning to rename {} file{}",
            operations.len(),
            if operations.len() == 1 { "" } else { "s" }
        );
        Ok(BatchPlan::new(operations, unchanged, skipped))
    }
}

/// Report every destination claimed by more than one source.
///
/// Unchanged files claim their own name. Destinations are compared by
/// [`path_key`]; the keys of colliding destinations are returned.
fn find_collisions(
    candidates: &[(PathBuf, PathBuf)],
    unchanged: &[PathBuf],
    conflicts: &mut Vec<ConflictError>,
) -> HashSet<PathBuf> {
    let mut order: Vec<(PathBuf, &Path)> = Vec::new();
    let mut claims: HashMap<PathBuf, Vec<&Path>> = HashMap::new();

    let all = candidates
        .iter()
        .map(|(source, destination)| (source.as_path(), destination.as_path()))
        .chain(unchanged.iter().map(|path| (path.as_path(), path.as_path())));

    for (source, destination) in all {
        let key = path_key(destination);
        claims
            .entry(key.clone())
            .or_insert_with(|| {
                order.push((key, destination));
                Vec::new()
            })
            .push(source);
    }

    let mut colliding = HashSet::new();
    for (key, destination) in order {
        let sources = &claims[&key];
        if sources.len() > 1 {
            conflicts.push(ConflictError::Collision {
                destination: destination.to_path_buf(),
                sources: sources.iter().map(|s| s.to_path_buf()).collect(),
            });
            colliding.insert(key);
        }
    }

    colliding
}

/// Order moves so each runs after the move vacating its destination.
///
/// Destinations are unique here, so every operation waits on at most one
/// other and the dependencies form simple chains. Cycles are reported.
fn order_operations(
    operations: Vec<RenameOperation>,
    conflicts: &mut Vec<ConflictError>,
) -> Vec<RenameOperation> {
    let by_source: HashMap<PathBuf, usize> = operations
        .iter()
        .enumerate()
        .map(|(i, op)| (path_key(&op.source), i))
        .collect();
    let waits_on: Vec<Option<usize>> = operations
        .iter()
        .map(|op| by_source.get(&path_key(&op.destination)).copied())
        .collect();

    let mut state = vec![Visit::New; operations.len()];
    let mut order = Vec::with_capacity(operations.len());

    for start in 0..operations.len() {
        let mut chain: Vec<usize> = Vec::new();
        let mut current = Some(start);

        while let Some(i) = current {
            match state[i] {
                Visit::Done => break,
                Visit::Active => {
                    if let Some(pos) = chain.iter().position(|&c| c == i) {
                        conflicts.push(ConflictError::Cycle {
                            sources: chain[pos..]
                                .iter()
                                .map(|&c| operations[c].source.clone())
                                .collect(),
                        });
                    }
                    break;
                }
                Visit::New => {
                    state[i] = Visit::Active;
                    chain.push(i);
                    current = waits_on[i];
                }
            }
        }

        for &i in chain.iter().rev() {
            state[i] = Visit::Done;
            order.push(i);
        }
    }

    let mut slots: Vec<Option<RenameOperation>> = operations.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
