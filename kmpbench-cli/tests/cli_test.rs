use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn kmpbench() -> Result<Command> {
    Ok(Command::cargo_bin("kmpbench")?)
}

/// Pulls the `patterns found:` value out of every record
fn match_counts(text: &str) -> Vec<usize> {
    text.lines()
        .filter_map(|line| line.strip_prefix("patterns found:"))
        .map(|n| n.trim().parse().unwrap())
        .collect()
}

#[test]
fn test_local_writes_two_agreeing_records() -> Result<()> {
    let output = kmpbench()?
        .args(["local", "--count", "200", "--pattern-length", "2"])
        .args(["--text-length", "300", "--threads", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Single thread:"))
        .stdout(predicate::str::contains("Shared memory:"))
        .get_output()
        .stdout
        .clone();

    let counts = match_counts(&String::from_utf8(output)?);
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0], counts[1]);
    Ok(())
}

#[test]
fn test_local_to_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("res.out");

    kmpbench()?
        .args(["local", "--count", "20", "--text-length", "100", "--output"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Results written to"));

    let text = fs::read_to_string(&path)?;
    assert!(text.starts_with("Single thread:\npatterns found:"));
    assert!(text.contains("\n\nShared memory:\npatterns found:"));
    assert!(text.ends_with("\n\n"));
    Ok(())
}

#[test]
fn test_config_file_is_used() -> Result<()> {
    let dir = tempdir()?;
    let config = dir.path().join("bench.yaml");
    let path = dir.path().join("res.out");
    fs::write(
        &config,
        format!(
            "test_count: 10\npattern_length: 1\ntext_length: 40\noutput: {:?}\n",
            path
        ),
    )?;

    kmpbench()?
        .arg("--config")
        .arg(&config)
        .arg("local")
        .assert()
        .success();

    assert!(fs::read_to_string(&path)?.contains("Shared memory:"));
    Ok(())
}

#[test]
fn test_processes_coordinator_matches_local() -> Result<()> {
    let args = ["--count", "60", "--pattern-length", "1", "--text-length", "200"];

    let local = kmpbench()?.arg("local").args(args).output()?;
    assert!(local.status.success());
    let expected = match_counts(&String::from_utf8(local.stdout)?)[0];

    let distributed = kmpbench()?
        .args(["distributed", "--size", "4", "--mode", "coordinator"])
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Distributed:\n"))
        .get_output()
        .stdout
        .clone();

    assert_eq!(match_counts(&String::from_utf8(distributed)?), vec![expected]);
    Ok(())
}

#[test]
fn test_processes_simple_mode_writes_one_file_per_rank() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("res.out");
    let args = ["--count", "50", "--pattern-length", "1", "--text-length", "120"];

    let local = kmpbench()?.arg("local").args(args).output()?;
    let expected = match_counts(&String::from_utf8(local.stdout)?)[0];

    kmpbench()?
        .args(["distributed", "--size", "3"])
        .args(args)
        .arg("--output")
        .arg(&path)
        .assert()
        .success();

    let mut total = 0;
    for rank in 0..3 {
        let text = fs::read_to_string(dir.path().join(format!("res.out.rank{}", rank)))?;
        assert!(text.starts_with(&format!("Distributed (rank {}):\n", rank)));
        total += match_counts(&text)[0];
    }
    assert_eq!(total, expected);
    Ok(())
}

#[test]
fn test_processes_simple_mode_shared_stdout_keeps_records_whole() -> Result<()> {
    let size = 8;
    for _ in 0..5 {
        let output = kmpbench()?
            .args(["distributed", "--size", &size.to_string()])
            .args(["--count", "16", "--text-length", "10"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let text = String::from_utf8(output)?;
        assert!(text.ends_with("\n\n"));
        let records: Vec<&str> = text.split("\n\n").filter(|r| !r.is_empty()).collect();
        assert_eq!(records.len(), size);

        let mut ranks = Vec::new();
        for record in records {
            let lines: Vec<&str> = record.lines().collect();
            assert_eq!(lines.len(), 3, "torn record: {:?}", record);
            let rank: usize = lines[0]
                .strip_prefix("Distributed (rank ")
                .and_then(|rest| rest.strip_suffix("):"))
                .unwrap()
                .parse()?;
            assert!(lines[1].starts_with("patterns found:"));
            assert!(lines[2].starts_with("time (ms): "));
            ranks.push(rank);
        }
        ranks.sort_unstable();
        assert_eq!(ranks, (0..size).collect::<Vec<_>>());
    }
    Ok(())
}

#[test]
fn test_threads_transport_reports_total() -> Result<()> {
    let output = kmpbench()?
        .args(["distributed", "--size", "3", "--transport", "threads"])
        .args(["--count", "30", "--text-length", "80"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output)?;
    let counts = match_counts(&text);
    // three rank records followed by the total
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[..3].iter().sum::<usize>(), counts[3]);
    assert!(text.contains("Distributed:\n"));
    Ok(())
}

#[test]
fn test_coordinator_mode_rejects_single_process() -> Result<()> {
    kmpbench()?
        .args(["distributed", "--size", "1", "--mode", "coordinator"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 processes"));
    Ok(())
}

#[test]
fn test_unknown_mode_rejected() -> Result<()> {
    kmpbench()?
        .args(["distributed", "--size", "2", "--mode", "broadcast"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown distributed mode"));
    Ok(())
}
