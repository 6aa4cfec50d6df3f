use super::render::{print_report, render_sync_progress};
use super::*;

pub(super) fn handle_sync(args: SyncArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let root = resolve_root(args.root, &config)?;
    let timeout = args
        .timeout_secs
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.timeout());
    let runner = GitCommandRunner::new(config.git_program(), timeout);
    let options = SyncOptions {
        token: resolve_token(args.token),
        include_untracked: config.include_untracked,
    };

    let last_len = Cell::new(0usize);
    let progress_fn = |progress: SyncProgress| render_sync_progress(&last_len, &progress);
    let progress: Option<&dyn Fn(SyncProgress)> = if args.status {
        Some(&progress_fn)
    } else {
        None
    };

    let report = fetch_and_pull_all(&root, &runner, &options, progress)
        .with_context(|| format!("scan {}", root.display()))?;
    print_report(&report);

    if let RunReport::Completed(summary) = &report {
        if !args.no_audit {
            record_audit(&root, summary);
        }
        if summary.failed > 0 {
            anyhow::bail!("{} of {} repositories failed", summary.failed, summary.found);
        }
    }
    Ok(())
}

pub(super) fn handle_list(args: ListArgs, config_path: &Path) -> anyhow::Result<()> {
    let config = AppConfig::load(config_path)?;
    let root = resolve_root(args.root, &config)?;
    let repos = discover(&root).with_context(|| format!("scan {}", root.display()))?;
    if repos.is_empty() {
        println!("No repositories found under {}", root.display());
        return Ok(());
    }
    for repo in repos {
        println!("{}", repo.display());
    }
    Ok(())
}

fn resolve_token(arg: Option<String>) -> Option<String> {
    if let Some(token) = arg.filter(|token| !token.is_empty()) {
        return Some(token);
    }
    match token_store::get_token() {
        Ok(token) => token.filter(|token| !token.is_empty()),
        Err(err) => {
            warn!(
                error = %format!("{err:#}"),
                "could not read stored token; continuing without one"
            );
            None
        }
    }
}

fn record_audit(root: &Path, summary: &RunSummary) {
    let result = AuditLogger::new().and_then(|audit| audit.record_run(root, summary));
    if let Err(err) = result {
        warn!(error = %format!("{err:#}"), "failed to write audit log");
    }
}
