use std::ffi::OsString;

use crate::plan::{Options, WorkItem};

/// Build the full ffmpeg argument vector for cutting one chapter.
///
/// Pure function of its inputs: the same item and options always produce the
/// identical vector. The command copies the audio stream without re-encoding,
/// drops any video/cover-art stream, strips the inherited chapter table and
/// restricts the cut to `[start_time, end_time)` using the chapter's exact
/// decimal timestamps.
pub fn cut_command(item: &WorkItem, opts: &Options) -> Vec<OsString> {
    // -nostdin keeps concurrent ffmpeg children from fighting over the
    // terminal; without it the shared tty can end up in a garbled state.
    let mut cmd: Vec<OsString> = vec![
        opts.ffmpeg_path.clone().into(),
        "-nostdin".into(),
        "-i".into(),
        item.source_path.clone().into(),
        "-v".into(),
        "error".into(),
        "-map_chapters".into(),
        "-1".into(),
        "-vn".into(),
        "-c".into(),
        "copy".into(),
        "-ss".into(),
        item.start_time.clone().into(),
        "-to".into(),
        item.end_time.clone().into(),
        if opts.allow_overwriting_files {
            "-y".into()
        } else {
            "-n".into()
        },
    ];

    if opts.use_title_in_meta {
        if let Some(title) = item.chapter_title.as_deref() {
            cmd.push("-metadata".into());
            cmd.push(format!("title={title}").into());
        }
    }

    if opts.use_track_num_in_meta {
        cmd.push("-metadata".into());
        cmd.push(format!("track={}/{}", item.chapter_number, item.max_chapter_number).into());
    }

    cmd.push(item.destination_path.clone().into());

    cmd
}
