use super::*;

pub(super) fn render_sync_progress(last_len: &Cell<usize>, progress: &SyncProgress) {
    let bar = render_progress_bar(progress.fraction, 20);
    let line = format!(
        "{} {:>3}% {}",
        bar,
        (progress.fraction * 100.0).round() as u32,
        progress.label
    );
    let prev_len = last_len.get();
    if line.len() < prev_len {
        print!("\r{line}{}", " ".repeat(prev_len - line.len()));
    } else {
        print!("\r{line}");
    }
    let _ = io::stdout().flush();
    last_len.set(line.len());
    if progress.step == SyncStep::Done {
        println!();
        last_len.set(0);
    }
}

pub(super) fn render_progress_bar(fraction: f32, width: usize) -> String {
    if width == 0 {
        return "[]".to_string();
    }
    let filled = (fraction.clamp(0.0, 1.0) * width as f32).round() as usize;
    let filled = filled.min(width);
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(empty))
}

pub(super) fn report_lines(report: &RunReport) -> Vec<String> {
    match report {
        RunReport::NothingFound { root } => {
            vec![format!("No repositories found under {}", root.display())]
        }
        RunReport::Completed(summary) => {
            let mut lines = Vec::with_capacity(summary.reports.len() + 1);
            lines.push(summary.summary_line());
            lines.extend(summary.reports.iter().map(ToString::to_string));
            lines
        }
    }
}

pub(super) fn print_report(report: &RunReport) {
    for line in report_lines(report) {
        println!("{line}");
    }
}
