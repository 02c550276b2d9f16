mod cli;

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use chapsplit_core::{
    cut_command, plan_chapters, probe_chapters_with, run_work_items, ItemStatus, Options,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::info;

use crate::cli::{build_cli, default_concurrency, shell_join};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    let input_path = matches
        .get_one::<PathBuf>("file_path")
        .expect("required argument");
    if !input_path.is_file() {
        return Err(anyhow!(
            "input file does not exist: {}",
            input_path.display()
        ));
    }

    let output_dir = matches
        .get_one::<PathBuf>("output")
        .expect("defaulted argument");
    let ffprobe = matches
        .get_one::<PathBuf>("ffprobe")
        .expect("defaulted argument");
    let concurrency = matches
        .get_one::<usize>("concurrency")
        .copied()
        .unwrap_or_else(default_concurrency);
    let verbose = matches.get_flag("verbose");

    let opts = Options {
        use_title_in_name: !matches.get_flag("no-title-in-name"),
        use_title_in_meta: !matches.get_flag("no-title-in-meta"),
        use_track_num_in_meta: !matches.get_flag("no-track-in-meta"),
        track_enumeration_offset: *matches
            .get_one::<i64>("track-offset")
            .expect("defaulted argument"),
        allow_overwriting_files: !matches.get_flag("no-overwrite"),
        ffmpeg_path: matches
            .get_one::<PathBuf>("ffmpeg")
            .expect("defaulted argument")
            .clone(),
    };

    let metadata = probe_chapters_with(ffprobe, input_path)
        .with_context(|| format!("failed to read chapters of '{}'", input_path.display()))?;

    if matches.get_flag("dump-chapters-and-stop") {
        for chapter in &metadata.chapters {
            println!(
                "chapter {}: [{} - {}] {}",
                chapter.id,
                chapter.start_time,
                chapter.end_time,
                chapter.title().unwrap_or("<untitled>")
            );
        }
        return Ok(());
    }

    let items = plan_chapters(&metadata, input_path, output_dir, &opts)
        .with_context(|| format!("failed to plan chapters of '{}'", input_path.display()))?;

    if verbose {
        println!("Found {} chapter(s) to be processed", items.len());
    }

    if matches.get_flag("dry-run") {
        println!("Dry run: would run {} command(s):", items.len());
        for item in &items {
            println!("  {}", shell_join(&cut_command(item, &opts)));
        }
        return Ok(());
    }

    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            output_dir.display()
        )
    })?;
    info!(
        "starting {} worker(s) for {} chapter(s), output directory '{}'",
        concurrency.max(1).min(items.len().max(1)),
        items.len(),
        output_dir.display()
    );

    let progress = ProgressBar::new(items.len() as u64);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let summary = run_work_items(items, &opts, concurrency, |outcome| {
        let destination = outcome.item.destination_path.display().to_string();
        match &outcome.status {
            ItemStatus::Succeeded => {
                if verbose {
                    progress.suspend(|| println!("SUCCESS: {destination}"));
                }
                progress.set_message(destination);
            }
            ItemStatus::Failed { detail } => {
                progress.suspend(|| eprintln!("FAILURE: {destination}: {detail}"));
            }
        }
        progress.inc(1);
    });

    progress.finish_and_clear();

    println!(
        "Total jobs: {}, Success: {}, Errors: {}",
        summary.submitted, summary.succeeded, summary.failed
    );

    if !summary.is_success() {
        bail!(
            "{} of {} chapter(s) failed; some output files may be missing",
            summary.failed,
            summary.submitted
        );
    }

    Ok(())
}
