use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn block_count(stdout: &str) -> usize {
    stdout.lines().filter(|l| l.starts_with('a')).count()
}

fn run_stream(args: &[&str]) -> anyhow::Result<String> {
    let mut cmd = Command::cargo_bin("mafstream")?;
    let output = cmd.arg("stream").args(args).output()?;
    assert!(output.status.success());
    Ok(String::from_utf8(output.stdout)?)
}

#[test]
fn command_stream_stages() -> anyhow::Result<()> {
    let stdout = run_stream(&["tests/maf/continuous.maf", "--stage", "raw"])?;
    assert!(stdout.starts_with("##maf version=1 scoring=mafstream\n"));
    assert_eq!(block_count(&stdout), 3);

    let stdout = run_stream(&["tests/maf/continuous.maf", "--stage", "trivial"])?;
    assert_eq!(block_count(&stdout), 2);
    assert!(stdout.contains("ACGTACGTTGCAACGTAGCTNNACGTACGTTGCAACGTAGCT"));
    assert!(stdout.contains("ACGCACGCCGCAACGCAGCCN-ACGCACGCCGCAACGCAGCC"));
    assert!(stdout.contains("GCGTGCGTTGCGGCGTGGCT--GCGTGCGTTGCGGCGTGGCT"));

    // default stage
    let stdout = run_stream(&["tests/maf/continuous.maf"])?;
    assert_eq!(block_count(&stdout), 2);
    assert!(stdout.contains("a score=11.0"));
    assert!(stdout.contains("a score=13.0"));
    assert!(!stdout.contains("a score=12.0"), "folded into the first block");

    Ok(())
}

#[test]
fn command_stream_gz() -> anyhow::Result<()> {
    let plain = run_stream(&["tests/maf/continuous.maf"])?;
    let gz = run_stream(&["tests/maf/continuous.maf.gz"])?;
    assert_eq!(plain, gz);

    Ok(())
}

#[test]
fn command_stream_split() -> anyhow::Result<()> {
    let stdout = run_stream(&["tests/maf/continuous.maf", "--max-width", "30"])?;
    assert_eq!(block_count(&stdout), 3);
    assert!(stdout.contains("s hg38.chr1-split-0 "));
    assert!(stdout.contains("s hg38.chr1-split-1 "));
    assert_eq!(stdout.matches("-split-").count(), 2);

    Ok(())
}

#[test]
fn command_stream_deletion() -> anyhow::Result<()> {
    let stdout = run_stream(&["tests/maf/deletion.maf", "--stage", "trivial"])?;
    assert_eq!(block_count(&stdout), 2);

    let stdout = run_stream(&["tests/maf/deletion.maf", "--stage", "deletion"])?;
    assert_eq!(block_count(&stdout), 1);
    assert_eq!(stdout.lines().filter(|l| l.starts_with("s ")).count(), 11);
    assert!(stdout.contains("CCGTACGTAA----------"));
    assert!(stdout.contains("ACGTACGTACACGTACGTAC"));

    // refuse any deletion
    let stdout = run_stream(&["tests/maf/deletion.maf", "--stage", "deletion", "--max-del", "0"])?;
    assert_eq!(block_count(&stdout), 2);

    Ok(())
}

#[test]
fn command_stream_ranges() -> anyhow::Result<()> {
    let stdout = run_stream(&["tests/maf/continuous.maf", "--stage", "raw", "--from", "1"])?;
    assert_eq!(block_count(&stdout), 2);
    assert!(stdout.contains("a score=12.0"));
    assert!(!stdout.contains("a score=11.0"));

    let stdout = run_stream(&[
        "tests/maf/continuous.maf",
        "--stage",
        "raw",
        "--from",
        "1",
        "--to",
        "1",
    ])?;
    assert_eq!(block_count(&stdout), 1);
    assert!(stdout.contains("a score=12.0"));

    let stdout = run_stream(&["tests/maf/continuous.maf", "--position", "300-310"])?;
    assert_eq!(block_count(&stdout), 1);
    assert!(stdout.contains("a score=13.0"));

    let stdout = run_stream(&["tests/maf/continuous.maf", "--position", "141-300"])?;
    assert_eq!(block_count(&stdout), 1);
    assert!(stdout.contains("a score=11.0"));

    Ok(())
}

#[test]
fn command_stream_errors() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream")
        .arg("tests/maf/continuous.maf")
        .arg("--from")
        .arg("5");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("beyond the last block"));

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream")
        .arg("tests/maf/continuous.maf")
        .arg("--stage")
        .arg("merged");
    cmd.assert().failure();

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream")
        .arg("tests/maf/continuous.maf")
        .arg("--position")
        .arg("300");
    cmd.assert().failure();

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream").arg("tests/maf/missing.maf");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("could not open"));

    Ok(())
}

#[test]
fn command_stream_ordering() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("reversed.maf");
    std::fs::write(
        &file,
        "a\ns hg38.chr1 200 4 + 1000 ACGT\ns mm10.chr4 0 4 + 1000 ACGT\n\n\
         a\ns hg38.chr1 100 4 + 1000 ACGT\ns mm10.chr4 4 4 + 1000 ACGT\n\n",
    )?;

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream")
        .arg(file.to_str().unwrap())
        .arg("--stage")
        .arg("trivial");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("was compared after"));

    // raw blocks are not compared
    let stdout = run_stream(&[file.to_str().unwrap(), "--stage", "raw"])?;
    assert_eq!(block_count(&stdout), 2);

    Ok(())
}

#[test]
fn command_stream_sort() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("unsorted.maf");
    std::fs::write(
        &file,
        "a\ns hg38.chr1 0 4 + 1000 ACGT\ns rn6.chr2 0 4 + 1000 ACGT\ns mm10.chr4 0 4 + 1000 ACGT\n",
    )?;
    let path = file.to_str().unwrap();

    let stdout = run_stream(&[path, "--stage", "raw"])?;
    assert!(stdout.find("rn6.chr2").unwrap() < stdout.find("mm10.chr4").unwrap());

    let stdout = run_stream(&[path, "--stage", "raw", "--sort"])?;
    assert!(stdout.find("hg38.chr1").unwrap() < stdout.find("mm10.chr4").unwrap());
    assert!(stdout.find("mm10.chr4").unwrap() < stdout.find("rn6.chr2").unwrap());

    Ok(())
}

#[test]
fn command_stream_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{"allowed_dist": 12, "min_block_rows": 3, "min_block_length": 30,
            "min_length_before_deletion": 60, "max_species_deletions": 1,
            "max_block_width_before_split": 3000}"#,
    )?;

    // the 20 nt block is dropped
    let stdout = run_stream(&["tests/maf/continuous.maf", "--config", config.to_str().unwrap()])?;
    assert_eq!(block_count(&stdout), 1);
    assert!(stdout.contains("a score=11.0"));

    std::fs::write(&config, r#"{"allowed_dist": 12}"#)?;
    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream")
        .arg("tests/maf/continuous.maf")
        .arg("--config")
        .arg(config.to_str().unwrap());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("missing field"));

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("stream")
        .arg("tests/maf/continuous.maf")
        .arg("--max-width")
        .arg("1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("max_block_width_before_split"));

    Ok(())
}
