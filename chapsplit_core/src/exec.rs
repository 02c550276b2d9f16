use std::ffi::OsString;
use std::process::Command;
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;

use log::{debug, warn};

use crate::command::cut_command;
use crate::plan::{Options, WorkItem};

/// Terminal state of one executed work item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Succeeded,
    /// The cut process exited nonzero or could not be launched; `detail`
    /// carries the captured diagnostic text.
    Failed { detail: String },
}

/// The result of executing one work item, reported in completion order.
#[derive(Clone, Debug)]
pub struct ItemOutcome {
    pub item: WorkItem,
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.status == ItemStatus::Succeeded
    }
}

/// Aggregate counts over one executor run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    /// A run counts as successful only when every single item succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Execute all work items with at most `max_concurrency` cuts in flight.
///
/// A fixed-size pool of worker threads draws items from a shared queue; each
/// worker blocks only on its own child process, so a slow cut never delays
/// the start of the others beyond the concurrency gate. `max_concurrency` is
/// clamped to at least 1.
///
/// `on_complete` is invoked on the calling thread once per item, in
/// completion order, with the outcome and any captured diagnostics. Item
/// failures are recorded and counted but never abort the remaining items;
/// there are no retries.
pub fn run_work_items<F>(
    items: Vec<WorkItem>,
    opts: &Options,
    max_concurrency: usize,
    mut on_complete: F,
) -> RunSummary
where
    F: FnMut(&ItemOutcome),
{
    let mut summary = RunSummary {
        submitted: items.len(),
        ..RunSummary::default()
    };
    if items.is_empty() {
        return summary;
    }

    let workers = max_concurrency.max(1).min(items.len());
    let queue = Mutex::new(items.into_iter());
    let (tx, rx) = mpsc::channel::<ItemOutcome>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let queue = &queue;
            scope.spawn(move || loop {
                let next = queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .next();
                let Some(item) = next else {
                    break;
                };
                if tx.send(cut_chapter(item, opts)).is_err() {
                    break;
                }
            });
        }
        // Only the worker clones may keep the channel open, otherwise the
        // drain below never finishes.
        drop(tx);

        for outcome in rx {
            match outcome.status {
                ItemStatus::Succeeded => summary.succeeded += 1,
                ItemStatus::Failed { .. } => summary.failed += 1,
            }
            on_complete(&outcome);
        }
    });

    summary
}

fn cut_chapter(item: WorkItem, opts: &Options) -> ItemOutcome {
    debug!("starting: '{}'", item.destination_path.display());

    let argv = cut_command(&item, opts);
    let status = run_command(&argv);

    match &status {
        ItemStatus::Succeeded => debug!("finished: '{}'", item.destination_path.display()),
        ItemStatus::Failed { detail } => {
            warn!("failed: '{}': {}", item.destination_path.display(), detail)
        }
    }

    ItemOutcome { item, status }
}

// The sole blocking operation of the executor: launch the external tool and
// wait for it, capturing both output streams.
fn run_command(argv: &[OsString]) -> ItemStatus {
    let Some((program, args)) = argv.split_first() else {
        return ItemStatus::Failed {
            detail: "empty command".to_owned(),
        };
    };

    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => ItemStatus::Succeeded,
        Ok(output) => ItemStatus::Failed {
            detail: format!(
                "ffmpeg exited with status {}: {}",
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        },
        Err(err) => ItemStatus::Failed {
            detail: format!("failed to launch ffmpeg: {err}"),
        },
    }
}
