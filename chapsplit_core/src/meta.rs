use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while interpreting ffprobe chapter metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The probe output is not valid JSON, or a chapter entry is missing a
    /// required field or carries a field of the wrong type.
    #[error("malformed chapter metadata: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A chapter timestamp could not be read as a decimal number of seconds.
    #[error("chapter {id}: {field} is not a decimal timestamp: '{value}'")]
    BadTimestamp {
        id: u64,
        field: &'static str,
        value: String,
    },

    /// A chapter ends at or before its own start.
    #[error("chapter {id}: end time {end} is not after start time {start}")]
    InvalidRange { id: u64, start: String, end: String },
}

/// A single chapter as reported by the source file's embedded metadata.
///
/// The timestamps are kept as the exact decimal strings emitted by ffprobe.
/// They are handed to ffmpeg verbatim; converting them through a float would
/// risk reformatting the value the external tool receives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter index assigned by the source metadata, starting at 0.
    pub id: u64,
    /// Start of the chapter in decimal seconds, verbatim from the probe.
    pub start_time: String,
    /// End of the chapter in decimal seconds, verbatim from the probe.
    pub end_time: String,
    /// Free-form tag mapping; typically contains a `title` entry.
    pub tags: BTreeMap<String, String>,
}

impl Chapter {
    /// The chapter title, if the source metadata provides one.
    pub fn title(&self) -> Option<&str> {
        self.tags.get("title").map(String::as_str)
    }
}

/// Parsed chapter metadata of one input file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Chapters in their order of appearance in the probe output.
    pub chapters: Vec<Chapter>,
}

impl Metadata {
    /// The largest chapter id present, or `None` when there are no chapters.
    pub fn max_chapter_num(&self) -> Option<u64> {
        self.chapters.iter().map(|ch| ch.id).max()
    }
}

#[derive(Debug, Deserialize)]
struct RawProbeOutput {
    #[serde(default)]
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    id: u64,
    start_time: String,
    end_time: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Parse the JSON emitted by `ffprobe -print_format json -show_chapters`.
///
/// Every chapter entry must carry `id`, `start_time` and `end_time`; `tags`
/// defaults to an empty mapping. An output without a `chapters` list at all
/// parses as empty metadata, since a file without chapters is a valid probe
/// result that is rejected later, at planning time.
///
/// Chapter ranges are validated here: a chapter whose end does not lie
/// strictly after its start fails the whole parse, so a malformed file is
/// rejected before any ffmpeg process is launched.
pub fn parse_metadata(raw: &str) -> Result<Metadata, MetadataError> {
    let parsed: RawProbeOutput = serde_json::from_str(raw)?;

    let mut chapters = Vec::with_capacity(parsed.chapters.len());
    for raw_chapter in parsed.chapters {
        chapters.push(validate_chapter(raw_chapter)?);
    }

    Ok(Metadata { chapters })
}

fn validate_chapter(raw: RawChapter) -> Result<Chapter, MetadataError> {
    let start = parse_timestamp(raw.id, "start_time", &raw.start_time)?;
    let end = parse_timestamp(raw.id, "end_time", &raw.end_time)?;

    if end <= start {
        return Err(MetadataError::InvalidRange {
            id: raw.id,
            start: raw.start_time,
            end: raw.end_time,
        });
    }

    Ok(Chapter {
        id: raw.id,
        start_time: raw.start_time,
        end_time: raw.end_time,
        tags: raw.tags,
    })
}

// The float value is used for range validation only; the original string is
// what ends up on the ffmpeg command line.
fn parse_timestamp(id: u64, field: &'static str, value: &str) -> Result<f64, MetadataError> {
    match value.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => Ok(seconds),
        _ => Err(MetadataError::BadTimestamp {
            id,
            field,
            value: value.to_owned(),
        }),
    }
}
