use std::path::Path;
use std::process::Command;

use log::debug;
use thiserror::Error;

use crate::meta::{parse_metadata, Metadata, MetadataError};

/// The probe executable looked up on `PATH` by default.
pub const FFPROBE: &str = "ffprobe";

/// Errors produced while probing a file for chapter metadata.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe process could not be started at all.
    #[error("failed to launch ffprobe")]
    Launch {
        #[source]
        source: std::io::Error,
    },

    /// The probe process ran but exited with a nonzero status.
    #[error("ffprobe exited with status {code}: {stderr}")]
    Failed { code: i32, stderr: String },

    /// The probe output was not valid UTF-8.
    #[error("ffprobe output is not valid UTF-8")]
    InvalidEncoding,

    /// The probe output decoded but did not satisfy the chapter schema.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// Read chapter metadata of `infile` using the `ffprobe` found on `PATH`.
pub fn probe_chapters(infile: &Path) -> Result<Metadata, ProbeError> {
    probe_chapters_with(Path::new(FFPROBE), infile)
}

/// Read chapter metadata of `infile` using a specific probe executable.
///
/// Runs `ffprobe -i <infile> -v error -print_format json -show_chapters` and
/// parses its standard output. With `-print_format` the probe writes the
/// payload to stdout and keeps stderr for genuine errors, so a nonzero exit
/// surfaces the captured stderr text.
pub fn probe_chapters_with(ffprobe: &Path, infile: &Path) -> Result<Metadata, ProbeError> {
    debug!("probing chapters of '{}'", infile.display());

    let output = Command::new(ffprobe)
        .arg("-i")
        .arg(infile)
        .args(["-v", "error", "-print_format", "json", "-show_chapters"])
        .output()
        .map_err(|source| ProbeError::Launch { source })?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    let stdout = std::str::from_utf8(&output.stdout).map_err(|_| ProbeError::InvalidEncoding)?;
    Ok(parse_metadata(stdout)?)
}
