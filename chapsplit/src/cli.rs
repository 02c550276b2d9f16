use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

/// Number of concurrent ffmpeg workers when `--concurrency` is not given.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Split audiobook chapters into separate files using ffmpeg")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("Directory where the chapter files will be written (created if missing)")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("concurrency")
                .short('j')
                .long("concurrency")
                .value_name("N")
                .help("Number of concurrent ffmpeg worker processes (default: CPU count)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("no-title-in-name")
                .long("no-title-in-name")
                .help("Do not use chapter titles as output filename stems")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-title-in-meta")
                .long("no-title-in-meta")
                .help("Do not stamp the chapter title into output file metadata")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-track-in-meta")
                .long("no-track-in-meta")
                .help("Do not stamp a track number into output file metadata")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("track-offset")
                .long("track-offset")
                .value_name("N")
                .help("Offset added to chapter ids to form chapter numbers")
                .default_value("1")
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("no-overwrite")
                .long("no-overwrite")
                .help("Refuse to overwrite existing files in the output directory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ffmpeg")
                .long("ffmpeg")
                .value_name("PATH")
                .help("The ffmpeg executable to use for cutting")
                .default_value("ffmpeg")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ffprobe")
                .long("ffprobe")
                .value_name("PATH")
                .help("The ffprobe executable to use for reading chapter metadata")
                .default_value("ffprobe")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the planned ffmpeg commands without executing them")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dump-chapters-and-stop")
                .long("dump-chapters-and-stop")
                .help("Print the parsed chapter metadata and exit without cutting anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Show more output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file_path")
                .value_name("FILE_PATH")
                .help("Path to the input audio file; chapter markers must be present in its metadata")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}

/// Join an argument vector into a copy-pasteable shell line.
pub fn shell_join(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| shell_quote(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=+:,@%".contains(c));
    if safe {
        arg.to_owned()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
