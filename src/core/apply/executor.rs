//! Executor for validated batches.

use super::ApplyMode;
use crate::core::resolver::{BatchPlan, RenameOperation};
use crate::error::ApplyError;
use crate::events::{null_sender, ApplyEvent, Event, EventSender};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of applying a batch
#[derive(Debug, Default)]
pub struct ApplyResult {
    /// Operations carried out, in execution order
    pub applied: Vec<RenameOperation>,
    pub errors: Vec<ApplyError>,
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Applies validated renames to the filesystem, one at a time
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameExecutor {
    mode: ApplyMode,
    overwrite: bool,
}

impl RenameExecutor {
    pub fn new(mode: ApplyMode, overwrite: bool) -> Self {
        Self { mode, overwrite }
    }

    pub fn execute(&self, plan: &BatchPlan) -> ApplyResult {
        self.execute_with_events(plan, &null_sender())
    }

    /// Apply every operation in resolved order.
    ///
    /// A failed operation is recorded and the rest still run; an operation
    /// waiting on it then finds its destination occupied and fails too.
    pub fn execute_with_events(&self, plan: &BatchPlan, events: &EventSender) -> ApplyResult {
        let start = Instant::now();
        let mut result = ApplyResult::default();

        events.send(Event::Apply(ApplyEvent::Started {
            total: plan.operations().len(),
        }));

        for op in plan.operations() {
            match self.apply_one(op) {
                Ok(()) => {
                    events.send(Event::Apply(ApplyEvent::Applied {
                        from: op.source.clone(),
                        to: op.destination.clone(),
                    }));
                    result.applied.push(op.clone());
                }
                Err(e) => {
                    warn!("{}", e);
                    events.send(Event::Apply(ApplyEvent::Failed {
                        path: op.source.clone(),
                        message: e.to_string(),
                    }));
                    result.errors.push(e);
                }
            }
        }

        events.send(Event::Apply(ApplyEvent::Completed {
            applied: result.applied.len(),
            failed: result.errors.len(),
        }));

        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    fn apply_one(&self, op: &RenameOperation) -> Result<(), ApplyError> {
        let from = op.source.as_path();
        let to = op.destination.as_path();

        // The batch was checked earlier; something else may have created
        // the destination since.
        let occupied = fs::symlink_metadata(to).is_ok();
        if occupied {
            if !self.overwrite {
                return Err(ApplyError::DestinationExists {
                    from: from.to_path_buf(),
                    to: to.to_path_buf(),
                });
            }
            warn!("overwriting {:?} with {:?}", to, from);
        }

        let io_error = |source: io::Error| ApplyError::Io {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        };

        match self.mode {
            ApplyMode::Move => {
                info!("Renaming {:?} to {:?}", from, to);
                fs::rename(from, to).map_err(io_error)
            }
            ApplyMode::Symlink => {
                if occupied {
                    fs::remove_file(to).map_err(io_error)?;
                }
                info!("Linking {:?} to {:?}", to, from);
                symlink(op.source_file_name(), to).map_err(io_error)
            }
            ApplyMode::Hardlink => {
                if occupied {
                    fs::remove_file(to).map_err(io_error)?;
                }
                info!("Hard linking {:?} to {:?}", to, from);
                fs::hard_link(from, to).map_err(io_error)
            }
        }
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
