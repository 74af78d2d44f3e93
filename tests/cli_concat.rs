use assert_cmd::prelude::*;
use std::path::Path;
use std::process::Command;

fn block_count(text: &str) -> usize {
    text.lines().filter(|l| l.starts_with('a')).count()
}

/// Copies the fixture into `dir` under the chromosome name `chr1`.
fn chromosome(dir: &Path) -> anyhow::Result<String> {
    let file = dir.join("chr1.maf");
    std::fs::copy("tests/maf/continuous.maf", &file)?;
    Ok(file.to_string_lossy().to_string())
}

#[test]
fn command_concat() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let infile = chromosome(dir.path())?;
    let outdir = dir.path().join("out");
    let index = dir.path().join("index.json");

    std::fs::create_dir_all(&outdir)?;
    std::fs::write(outdir.join("big_block_7.maf"), "stale")?;

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("concat")
        .arg(&infile)
        .arg("-o")
        .arg(outdir.to_str().unwrap())
        .arg("--index")
        .arg(index.to_str().unwrap())
        .assert()
        .success();

    assert!(!outdir.join("big_block_7.maf").exists());
    assert!(!outdir.join("big_block_2.maf").exists());

    let big_block = std::fs::read_to_string(outdir.join("big_block_1.maf"))?;
    assert_eq!(block_count(&big_block), 2);
    assert!(big_block.contains("s chr1_1_1 "));
    assert!(big_block.contains("s chr1_2_1 "));
    assert!(!big_block.contains("hg38.chr1"), "target renamed");
    assert!(big_block.contains("s mm10.chr4 "));

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&index)?)?;
    assert_eq!(json, serde_json::json!({"chr1_1_1": [0, 1], "chr1_2_1": [2]}));

    Ok(())
}

#[test]
fn command_concat_bb_size() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let infile = chromosome(dir.path())?;

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("concat")
        .arg(&infile)
        .arg("--bb-size")
        .arg("1")
        .assert()
        .success();

    // default locations beside the input
    let outdir = dir.path().join("big_blocks");
    let first = std::fs::read_to_string(outdir.join("big_block_1.maf"))?;
    let second = std::fs::read_to_string(outdir.join("big_block_2.maf"))?;
    assert_eq!(block_count(&first), 1);
    assert!(first.contains("s chr1_1_1 "));
    assert!(second.contains("s chr1_1_2 "));
    assert!(dir.path().join("block_dic.json").is_file());

    Ok(())
}

#[test]
fn command_concat_single() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let infile = chromosome(dir.path())?;
    let outdir = dir.path().join("single");

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("concat")
        .arg(&infile)
        .arg("--single")
        .arg("-o")
        .arg(outdir.to_str().unwrap())
        .assert()
        .success();

    assert!(outdir.join("chr1_1_1.maf").is_file());
    assert!(outdir.join("chr1_2_1.maf").is_file());
    assert!(!outdir.join("big_block_1.maf").exists());

    let block = std::fs::read_to_string(outdir.join("chr1_2_1.maf"))?;
    assert_eq!(block_count(&block), 1);
    assert!(block.contains("a score=13.0"));

    Ok(())
}

#[test]
fn command_concat_missing_input() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("concat").arg("tests/maf/chrZ.maf").assert().failure();

    Ok(())
}

#[test]
fn command_concat_into_input_dir() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let infile = chromosome(dir.path())?;
    std::fs::write(dir.path().join("big_block_4.maf"), "stale")?;
    std::fs::write(dir.path().join("notes.maf"), "kept")?;

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("concat")
        .arg(&infile)
        .arg("-o")
        .arg(dir.path().to_str().unwrap())
        .assert()
        .success();

    assert!(Path::new(&infile).is_file(), "input survives");
    assert!(dir.path().join("notes.maf").is_file());
    assert!(!dir.path().join("big_block_4.maf").exists());

    let big_block = std::fs::read_to_string(dir.path().join("big_block_1.maf"))?;
    assert_eq!(block_count(&big_block), 2);

    Ok(())
}

#[test]
fn command_concat_stage_counts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let infile = chromosome(dir.path())?;

    let mut cmd = Command::cargo_bin("mafstream")?;
    cmd.arg("concat")
        .arg(&infile)
        .arg("-v")
        .assert()
        .success()
        .stderr(predicates::str::contains(
            "chr1: 3 raw, 2 after trivial merge, 2 after deletion merge, 2 after split",
        ))
        .stderr(predicates::str::contains("chr1: 2 blocks written to"));

    Ok(())
}
