use crate::command::{CommandOutput, CommandRunner, GitCommand};
use crate::error::ScanError;
use crate::repo_status::{BehindState, is_dirty, parse_behind_state};
use crate::scanner::discover;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub type SyncProgressReporter<'a> = dyn Fn(SyncProgress) + 'a;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SyncOutcome {
    FetchFailed { error: String },
    SkippedUnknownState,
    UpToDate,
    SkippedDirty,
    PullFailed { error: String },
    Pulled,
}

impl SyncOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOutcome::FetchFailed { .. } => "fetch_failed",
            SyncOutcome::SkippedUnknownState => "skipped_unknown_state",
            SyncOutcome::UpToDate => "up_to_date",
            SyncOutcome::SkippedDirty => "skipped_dirty",
            SyncOutcome::PullFailed { .. } => "pull_failed",
            SyncOutcome::Pulled => "pulled",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            SyncOutcome::SkippedUnknownState | SyncOutcome::UpToDate | SyncOutcome::SkippedDirty
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SyncOutcome::FetchFailed { .. } | SyncOutcome::PullFailed { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncStep {
    Fetch,
    BehindCheck,
    DirtyCheck,
    Pull,
    Done,
}

impl SyncStep {
    fn offset(self) -> f32 {
        match self {
            SyncStep::Fetch | SyncStep::Done => 0.0,
            SyncStep::BehindCheck => 0.25,
            SyncStep::DirtyCheck => 0.5,
            SyncStep::Pull => 0.75,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncStep::Fetch => "fetching",
            SyncStep::BehindCheck => "checking upstream",
            SyncStep::DirtyCheck => "checking working tree",
            SyncStep::Pull => "pulling",
            SyncStep::Done => "done",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SyncProgress {
    pub label: String,
    pub fraction: f32,
    pub step: SyncStep,
    pub repo: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoReport {
    pub path: PathBuf,
    pub outcome: SyncOutcome,
}

impl fmt::Display for RepoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.outcome {
            SyncOutcome::FetchFailed { error } => write!(f, "[Fetch Failed] {path}: {error}"),
            SyncOutcome::SkippedUnknownState => {
                write!(f, "[Skipped] {path} (unknown tracking state)")
            }
            SyncOutcome::UpToDate => write!(f, "[Up To Date] {path}"),
            SyncOutcome::SkippedDirty => write!(f, "[Skipped] {path} (uncommitted changes)"),
            SyncOutcome::PullFailed { error } => write!(f, "[Pull Failed] {path}: {error}"),
            SyncOutcome::Pulled => write!(f, "[Pulled] {path}"),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub found: usize,
    pub processed: usize,
    pub fetched: usize,
    pub pulled: usize,
    pub skipped: usize,
    pub failed: usize,
    pub reports: Vec<RepoReport>,
}

impl RunSummary {
    fn record(&mut self, path: &Path, outcome: SyncOutcome) {
        self.processed += 1;
        if !matches!(outcome, SyncOutcome::FetchFailed { .. }) {
            self.fetched += 1;
        }
        if outcome == SyncOutcome::Pulled {
            self.pulled += 1;
        }
        if outcome.is_skip() {
            self.skipped += 1;
        }
        if outcome.is_failure() {
            self.failed += 1;
        }
        self.reports.push(RepoReport {
            path: path.to_path_buf(),
            outcome,
        });
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Processed {} of {} repositories: fetched={} pulled={} skipped={} failed={}",
            self.processed, self.found, self.fetched, self.pulled, self.skipped, self.failed
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunReport {
    NothingFound { root: PathBuf },
    Completed(RunSummary),
}

#[derive(Clone, Debug)]
pub struct SyncOptions {
    pub token: Option<String>,
    pub include_untracked: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            token: None,
            include_untracked: true,
        }
    }
}

/// Discovers repositories under `root` and syncs each one.
pub fn fetch_and_pull_all(
    root: &Path,
    runner: &dyn CommandRunner,
    options: &SyncOptions,
    progress: Option<&SyncProgressReporter<'_>>,
) -> Result<RunReport, ScanError> {
    let repos = discover(root)?;
    if repos.is_empty() {
        info!(root = %root.display(), "no repositories found");
        return Ok(RunReport::NothingFound {
            root: root.to_path_buf(),
        });
    }
    info!(root = %root.display(), count = repos.len(), "discovered repositories");
    Ok(RunReport::Completed(run_all(&repos, runner, options, progress)))
}

/// Runs fetch → behind-check → dirty-check → pull over each repository in
/// order. A failing repository never stops the batch.
pub fn run_all(
    repos: &[PathBuf],
    runner: &dyn CommandRunner,
    options: &SyncOptions,
    progress: Option<&SyncProgressReporter<'_>>,
) -> RunSummary {
    let mut summary = RunSummary {
        found: repos.len(),
        ..RunSummary::default()
    };
    let mut tracker = ProgressTracker {
        reporter: progress,
        total: repos.len(),
        last: 0.0,
    };

    for (index, repo) in repos.iter().enumerate() {
        let outcome = sync_one(repo, index, runner, options, &mut tracker);
        match &outcome {
            SyncOutcome::Pulled => info!(path = %repo.display(), "pulled"),
            SyncOutcome::FetchFailed { .. } | SyncOutcome::PullFailed { .. } => {}
            other => info!(path = %repo.display(), outcome = other.as_str(), "skipped"),
        }
        summary.record(repo, outcome);
    }

    tracker.emit(repos.len(), SyncStep::Done, None);
    info!(
        processed = summary.processed,
        fetched = summary.fetched,
        pulled = summary.pulled,
        skipped = summary.skipped,
        failed = summary.failed,
        "sync run finished"
    );
    summary
}

fn sync_one(
    repo: &Path,
    index: usize,
    runner: &dyn CommandRunner,
    options: &SyncOptions,
    tracker: &mut ProgressTracker<'_, '_>,
) -> SyncOutcome {
    tracker.emit(index, SyncStep::Fetch, Some(repo));
    if let Err(error) = run_step(runner, repo, &GitCommand::Fetch) {
        return SyncOutcome::FetchFailed { error };
    }

    tracker.emit(index, SyncStep::BehindCheck, Some(repo));
    let behind = match run_step(runner, repo, &GitCommand::BranchStatus) {
        Ok(output) => parse_behind_state(&output.stdout),
        Err(_) => BehindState::Unknown,
    };
    match behind {
        BehindState::Unknown => return SyncOutcome::SkippedUnknownState,
        BehindState::NotBehind => return SyncOutcome::UpToDate,
        BehindState::Behind => {}
    }

    tracker.emit(index, SyncStep::DirtyCheck, Some(repo));
    let dirty_check = GitCommand::WorkingTreeStatus {
        include_untracked: options.include_untracked,
    };
    let dirty = match run_step(runner, repo, &dirty_check) {
        Ok(output) => is_dirty(&output.stdout),
        Err(_) => true,
    };
    if dirty {
        warn!(path = %repo.display(), "working tree dirty; skipping pull");
        return SyncOutcome::SkippedDirty;
    }

    tracker.emit(index, SyncStep::Pull, Some(repo));
    let pull = GitCommand::Pull {
        token: options.token.clone().filter(|token| !token.is_empty()),
    };
    match run_step(runner, repo, &pull) {
        Ok(_) => SyncOutcome::Pulled,
        Err(error) => SyncOutcome::PullFailed { error },
    }
}

/// Runs one command; on failure logs the full diagnostic and returns its
/// first line.
fn run_step(
    runner: &dyn CommandRunner,
    repo: &Path,
    command: &GitCommand,
) -> Result<CommandOutput, String> {
    let diagnostic = match runner.run(repo, command) {
        Ok(output) if output.success() => return Ok(output),
        Ok(output) => output.diagnostic(),
        Err(err) => format!("{err:#}"),
    };
    warn!(
        path = %repo.display(),
        command = command.label(),
        error = %diagnostic,
        "git command failed"
    );
    Err(first_line(&diagnostic))
}

pub(crate) fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("unknown error")
        .to_string()
}

struct ProgressTracker<'r, 'a> {
    reporter: Option<&'r SyncProgressReporter<'a>>,
    total: usize,
    last: f32,
}

impl ProgressTracker<'_, '_> {
    fn emit(&mut self, index: usize, step: SyncStep, repo: Option<&Path>) {
        let Some(reporter) = self.reporter else {
            return;
        };
        let fraction = progress_fraction(index, step, self.total).max(self.last);
        self.last = fraction;
        let label = match repo {
            Some(repo) => format!(
                "{} {} ({}/{})",
                step.as_str(),
                repo.display(),
                index + 1,
                self.total
            ),
            None => step.as_str().to_string(),
        };
        reporter(SyncProgress {
            label,
            fraction,
            step,
            repo: repo.map(Path::to_path_buf),
        });
    }
}

fn progress_fraction(index: usize, step: SyncStep, total: usize) -> f32 {
    if total == 0 {
        return 1.0;
    }
    ((index as f32 + step.offset()) / total as f32).clamp(0.0, 1.0)
}
