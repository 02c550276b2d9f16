#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

const BEEP_CHAPTERS: &str = r#"{"chapters": [
    {"id": 0, "start_time": "0.000000", "end_time": "20.000000",
     "tags": {"title": "A"}},
    {"id": 1, "start_time": "20.000000", "end_time": "40.000000",
     "tags": {"title": "B"}},
    {"id": 2, "start_time": "40.000000", "end_time": "60.000000",
     "tags": {"title": "C"}}
]}"#;

fn write_script(path: &Path, body: &str) -> Result<(), Box<dyn Error>> {
    fs::write(path, body)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

/// A stand-in ffprobe that prints a canned chapter table on stdout.
fn write_fake_ffprobe(dir: &Path, json: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join("fake-ffprobe");
    write_script(&path, &format!("#!/bin/sh\ncat <<'EOF'\n{json}\nEOF\n"))?;
    Ok(path)
}

/// A stand-in ffmpeg that touches its destination, failing on `boom` names.
fn write_fake_ffmpeg(dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join("fake-ffmpeg");
    write_script(
        &path,
        "#!/bin/sh\n\
         for arg in \"$@\"; do dest=\"$arg\"; done\n\
         case \"$dest\" in\n\
         *boom*) echo 'simulated cut failure' >&2; exit 1 ;;\n\
         esac\n\
         : > \"$dest\"\n",
    )?;
    Ok(path)
}

#[test]
fn cli_reports_missing_input_file() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("chapsplit")?;
    cmd.arg("missing.m4a");
    cmd.assert()
        .failure()
        .stderr(contains("input file does not exist"));
    Ok(())
}

#[test]
fn cli_splits_every_chapter_and_prints_the_summary() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("beep.m4a");
    fs::write(&input_path, b"not really audio")?;

    let ffprobe = write_fake_ffprobe(work_dir.path(), BEEP_CHAPTERS)?;
    let ffmpeg = write_fake_ffmpeg(work_dir.path())?;
    let output_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("chapsplit")?;
    cmd.arg("--ffprobe")
        .arg(&ffprobe)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--output")
        .arg(output_dir.path())
        .arg(&input_path);
    cmd.assert()
        .success()
        .stdout(contains("Total jobs: 3, Success: 3, Errors: 0"));

    for name in ["1 - A.m4a", "2 - B.m4a", "3 - C.m4a"] {
        assert!(
            output_dir.path().join(name).is_file(),
            "missing output '{name}'"
        );
    }

    Ok(())
}

#[test]
fn cli_keeps_going_when_one_chapter_fails() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("beep.m4a");
    fs::write(&input_path, b"not really audio")?;

    let chapters = BEEP_CHAPTERS.replace("\"B\"", "\"boom\"");
    let ffprobe = write_fake_ffprobe(work_dir.path(), &chapters)?;
    let ffmpeg = write_fake_ffmpeg(work_dir.path())?;
    let output_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("chapsplit")?;
    cmd.arg("--ffprobe")
        .arg(&ffprobe)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .arg("--output")
        .arg(output_dir.path())
        .arg(&input_path);
    cmd.assert()
        .failure()
        .stdout(contains("Total jobs: 3, Success: 2, Errors: 1"))
        .stderr(contains("simulated cut failure"));

    assert!(output_dir.path().join("1 - A.m4a").is_file());
    assert!(output_dir.path().join("3 - C.m4a").is_file());
    assert!(!output_dir.path().join("2 - boom.m4a").exists());

    Ok(())
}

#[test]
fn cli_dry_run_prints_commands_without_creating_files() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("beep.m4a");
    fs::write(&input_path, b"not really audio")?;

    let ffprobe = write_fake_ffprobe(work_dir.path(), BEEP_CHAPTERS)?;
    let output_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("chapsplit")?;
    let assert = cmd
        .arg("--ffprobe")
        .arg(&ffprobe)
        .arg("--output")
        .arg(output_dir.path())
        .arg("--dry-run")
        .arg(&input_path)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert!(stdout.contains("Dry run: would run 3 command(s):"));
    for name in ["1 - A.m4a", "2 - B.m4a", "3 - C.m4a"] {
        let needle = format!("{}", output_dir.path().join(name).display());
        assert!(stdout.contains(&needle), "missing dry-run entry for {needle}");
    }
    assert!(stdout.contains("-map_chapters -1"));
    assert!(stdout.contains("-c copy"));

    let mut produced = fs::read_dir(output_dir.path())?;
    assert!(produced.next().is_none(), "dry run should not create files");

    Ok(())
}

#[test]
fn cli_dump_chapters_prints_parsed_chapters_and_stops() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("beep.m4a");
    fs::write(&input_path, b"not really audio")?;

    let ffprobe = write_fake_ffprobe(work_dir.path(), BEEP_CHAPTERS)?;
    let output_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("chapsplit")?;
    cmd.arg("--ffprobe")
        .arg(&ffprobe)
        .arg("--output")
        .arg(output_dir.path())
        .arg("--dump-chapters-and-stop")
        .arg(&input_path);
    cmd.assert()
        .success()
        .stdout(contains("chapter 0: [0.000000 - 20.000000] A"))
        .stdout(contains("chapter 1: [20.000000 - 40.000000] B"))
        .stdout(contains("chapter 2: [40.000000 - 60.000000] C"));

    let mut produced = fs::read_dir(output_dir.path())?;
    assert!(produced.next().is_none(), "chapter dump should not create files");

    Ok(())
}

#[test]
fn cli_rejects_files_without_chapters() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("beep.m4a");
    fs::write(&input_path, b"not really audio")?;

    let ffprobe = write_fake_ffprobe(work_dir.path(), "{}")?;

    let mut cmd = Command::cargo_bin("chapsplit")?;
    cmd.arg("--ffprobe").arg(&ffprobe).arg(&input_path);
    cmd.assert()
        .failure()
        .stderr(contains("no chapters"));

    Ok(())
}

#[test]
fn cli_surfaces_probe_failures() -> Result<(), Box<dyn Error>> {
    let work_dir = tempdir()?;
    let input_path = work_dir.path().join("beep.m4a");
    fs::write(&input_path, b"not really audio")?;

    let ffprobe = work_dir.path().join("fake-ffprobe");
    write_script(
        &ffprobe,
        "#!/bin/sh\necho 'Invalid data found when processing input' >&2\nexit 1\n",
    )?;

    let mut cmd = Command::cargo_bin("chapsplit")?;
    cmd.arg("--ffprobe").arg(&ffprobe).arg(&input_path);
    cmd.assert()
        .failure()
        .stderr(contains("failed to read chapters"));

    Ok(())
}
