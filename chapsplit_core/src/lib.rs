//! Split a chaptered audio file into one output file per chapter.
//!
//! The crate does not touch audio data itself. It parses the chapter table
//! reported by ffprobe, plans one deterministic output file per chapter and
//! drives one ffmpeg copy-cut process per plan entry with bounded
//! concurrency. Fatal errors (probe, metadata, planning) abort before any
//! cut process is launched; individual cut failures are collected into an
//! aggregate summary without disturbing their siblings.

mod command;
mod exec;
mod meta;
mod plan;
mod probe;

pub use command::cut_command;
pub use exec::{run_work_items, ItemOutcome, ItemStatus, RunSummary};
pub use meta::{parse_metadata, Chapter, Metadata, MetadataError};
pub use plan::{plan_chapters, sanitize_filename, Options, PlanError, WorkItem};
pub use probe::{probe_chapters, probe_chapters_with, ProbeError, FFPROBE};
