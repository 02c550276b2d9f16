use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::meta::Metadata;

/// Errors that can occur while planning chapter output files.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Error returned when the input file reports no chapters at all.
    #[error("input file has no chapters to split")]
    NoChapters,

    /// Error produced when a file name cannot be derived from the input path.
    #[error("failed to derive a base name for the input file")]
    InvalidInputName,
}

/// Naming and tagging policy for one splitting run.
///
/// Shared read-only by planning and command building; a given `Options`
/// value always yields the same plan for the same metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Use the chapter title as the output filename stem when available.
    pub use_title_in_name: bool,
    /// Stamp the chapter title into the output file's metadata.
    pub use_title_in_meta: bool,
    /// Stamp a `track=<n>/<max>` tag into the output file's metadata.
    pub use_track_num_in_meta: bool,
    /// Added to each chapter id to form the human-facing chapter number.
    pub track_enumeration_offset: i64,
    /// Let ffmpeg overwrite an existing destination instead of refusing.
    pub allow_overwriting_files: bool,
    /// The ffmpeg executable to invoke for cutting.
    pub ffmpeg_path: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_title_in_name: true,
            use_title_in_meta: true,
            use_track_num_in_meta: true,
            track_enumeration_offset: 1,
            allow_overwriting_files: true,
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}

/// A fully resolved plan to cut one chapter into one destination file.
///
/// Produced by [`plan_chapters`], consumed by the command builder and the
/// executor; never mutated after planning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub start_time: String,
    pub end_time: String,
    pub chapter_number: i64,
    pub max_chapter_number: i64,
    /// Raw chapter title for metadata stamping; `None` when empty or absent.
    pub chapter_title: Option<String>,
}

// Characters interpreted specially by common filesystems and shells.
const FILENAME_BLACKLIST: [char; 10] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Strip characters that are unsafe in filenames.
///
/// Applied to filename components only; the metadata tag value written into
/// the output file keeps the original string.
pub fn sanitize_filename(original: &str) -> String {
    original
        .chars()
        .filter(|c| !FILENAME_BLACKLIST.contains(c))
        .collect()
}

fn num_width(mut value: i64) -> usize {
    if value <= 0 {
        return 1;
    }

    let mut width = 0;
    while value > 0 {
        value /= 10;
        width += 1;
    }
    width
}

/// Compute one [`WorkItem`] per chapter, in source order.
///
/// Chapter numbers are zero padded to the width of the largest number in the
/// file, so lexicographic and numeric filename ordering agree. The filename
/// stem is the sanitized chapter title when present and enabled, otherwise
/// the stem of the input file.
///
/// Planning is deterministic and touches no filesystem state beyond
/// decomposing `source`. The planner does not detect destination collisions:
/// option combinations that map several chapters onto the same filename
/// (for example a file whose chapters share one flat title with
/// `use_title_in_name` enabled and no distinguishing numbers) are the
/// caller's responsibility to avoid.
pub fn plan_chapters(
    meta: &Metadata,
    source: &Path,
    outdir: &Path,
    opts: &Options,
) -> Result<Vec<WorkItem>, PlanError> {
    let max_id = meta.max_chapter_num().ok_or(PlanError::NoChapters)?;

    let source_stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or(PlanError::InvalidInputName)?;
    let extension = source
        .extension()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or(PlanError::InvalidInputName)?;

    let max_chapter_number = max_id as i64 + opts.track_enumeration_offset;
    let pad_width = num_width(max_chapter_number);

    let items = meta
        .chapters
        .iter()
        .map(|chapter| {
            let chapter_number = chapter.id as i64 + opts.track_enumeration_offset;

            let sanitized_title = chapter
                .title()
                .map(sanitize_filename)
                .filter(|t| !t.is_empty());
            let stem = match sanitized_title {
                Some(ref title) if opts.use_title_in_name => title.as_str(),
                _ => source_stem,
            };

            let file_name = format!("{chapter_number:0pad_width$} - {stem}.{extension}");

            WorkItem {
                source_path: source.to_path_buf(),
                destination_path: outdir.join(file_name),
                start_time: chapter.start_time.clone(),
                end_time: chapter.end_time.clone(),
                chapter_number,
                max_chapter_number,
                chapter_title: chapter
                    .title()
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned),
            }
        })
        .collect::<Vec<_>>();

    info!(
        "planned {} chapter(s) of '{}' into '{}'",
        items.len(),
        source.display(),
        outdir.display()
    );

    Ok(items)
}
