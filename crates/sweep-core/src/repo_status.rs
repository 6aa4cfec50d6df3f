use serde::{Deserialize, Serialize};

/// How the current branch relates to its upstream after a fetch.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum BehindState {
    Unknown,
    NotBehind,
    Behind,
}

const UPSTREAM_SEPARATOR: &str = "...";
const BEHIND_MARKER: &str = "[behind";

/// Classifies the first line of `git status --porcelain --branch`.
///
/// No `...` means no upstream is configured (or git printed something
/// unexpected); both are `Unknown`. A line like
/// `## main...origin/main [ahead 1, behind 2]` is also `Behind`.
pub fn parse_behind_state(status_output: &str) -> BehindState {
    let Some(line) = status_output.lines().next() else {
        return BehindState::Unknown;
    };
    let line = line.trim();
    if line.is_empty() || !line.contains(UPSTREAM_SEPARATOR) {
        return BehindState::Unknown;
    }
    if line.contains(BEHIND_MARKER) || annotation(line).is_some_and(|text| text.contains("behind"))
    {
        BehindState::Behind
    } else {
        BehindState::NotBehind
    }
}

fn annotation(line: &str) -> Option<&str> {
    let start = line.rfind('[')?;
    let end = line[start..].find(']')?;
    Some(&line[start + 1..start + end])
}

/// True when porcelain status output lists any changed path.
pub fn is_dirty(porcelain_output: &str) -> bool {
    porcelain_output
        .lines()
        .any(|line| !line.trim().is_empty() && !line.starts_with("##"))
}
