use std::fs;
use std::path::Path;
use std::process::Command;
use sweep_core::command::GitCommandRunner;
use sweep_core::sync_engine::{RunReport, SyncOptions, SyncOutcome, fetch_and_pull_all};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=tester",
            "-c",
            "user.email=tester@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "-m", name]);
}

#[test]
fn pulls_clean_skips_dirty_and_current() {
    if !git_available() {
        eprintln!("git not on PATH; skipping");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let base = fs::canonicalize(tmp.path()).unwrap();
    let remote = base.join("remote.git");
    let seed = base.join("seed");
    let work = base.join("work");
    fs::create_dir_all(&work).unwrap();

    git(&base, &["init", "--bare", remote.to_str().unwrap()]);
    git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&base, &["clone", remote.to_str().unwrap(), seed.to_str().unwrap()]);
    git(&seed, &["checkout", "-B", "main"]);
    commit(&seed, "readme.txt", "one");
    git(&seed, &["push", "origin", "main"]);

    for name in ["clean", "dirty", "current"] {
        git(&work, &["clone", remote.to_str().unwrap(), name]);
    }

    commit(&seed, "second.txt", "two");
    git(&seed, &["push", "origin", "main"]);
    git(&work.join("current"), &["pull", "--ff-only"]);
    fs::write(work.join("dirty").join("readme.txt"), "local edit").unwrap();

    let report = fetch_and_pull_all(
        &work,
        &GitCommandRunner::default(),
        &SyncOptions::default(),
        None,
    )
    .unwrap();

    let RunReport::Completed(summary) = report else {
        panic!("expected repositories to be found");
    };
    let outcomes: Vec<(String, SyncOutcome)> = summary
        .reports
        .iter()
        .map(|report| {
            (
                report.path.file_name().unwrap().to_string_lossy().into_owned(),
                report.outcome.clone(),
            )
        })
        .collect();
    assert_eq!(
        outcomes,
        vec![
            ("clean".to_string(), SyncOutcome::Pulled),
            ("current".to_string(), SyncOutcome::UpToDate),
            ("dirty".to_string(), SyncOutcome::SkippedDirty),
        ]
    );
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.pulled, 1);
    assert_eq!(summary.skipped, 2);
    assert!(work.join("clean").join("second.txt").exists());
    assert!(!work.join("dirty").join("second.txt").exists());
    assert_eq!(
        fs::read_to_string(work.join("dirty").join("readme.txt")).unwrap(),
        "local edit"
    );
}

#[test]
fn branch_without_upstream_is_skipped() {
    if !git_available() {
        eprintln!("git not on PATH; skipping");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let work = fs::canonicalize(tmp.path()).unwrap();
    let repo = work.join("local-only");
    fs::create_dir_all(&repo).unwrap();
    git(&repo, &["init"]);
    commit(&repo, "file.txt", "data");

    let report = fetch_and_pull_all(
        &work,
        &GitCommandRunner::default(),
        &SyncOptions::default(),
        None,
    )
    .unwrap();

    let RunReport::Completed(summary) = report else {
        panic!("expected repositories to be found");
    };
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].outcome, SyncOutcome::SkippedUnknownState);
}
