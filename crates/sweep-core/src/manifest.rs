use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BumpResult {
    pub bumped: bool,
    pub old_version: Option<String>,
    pub new_version: Option<String>,
}

impl BumpResult {
    fn skipped(old_version: Option<String>) -> Self {
        Self {
            bumped: false,
            old_version,
            new_version: None,
        }
    }
}

/// Increments the patch component of the `version` field in the
/// repository's `package.json`.
///
/// Only a strict `major.minor.patch` value is touched; anything else is
/// left alone. Errors are logged and reported as not bumped.
pub fn try_bump_patch_version(repo_root: &Path) -> BumpResult {
    match bump_manifest(&repo_root.join(MANIFEST_FILE)) {
        Ok(result) => result,
        Err(err) => {
            warn!(
                path = %repo_root.display(),
                error = %format!("{err:#}"),
                "manifest bump failed"
            );
            BumpResult::default()
        }
    }
}

fn bump_manifest(path: &Path) -> anyhow::Result<BumpResult> {
    if !path.is_file() {
        info!(path = %path.display(), "no manifest; nothing to bump");
        return Ok(BumpResult::default());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let Some((updated, result)) = bump_contents(&contents)? else {
        return Ok(BumpResult::default());
    };
    if !result.bumped {
        warn!(
            path = %path.display(),
            version = result.old_version.as_deref().unwrap_or(""),
            "version is not plain major.minor.patch; leaving manifest untouched"
        );
        return Ok(result);
    }
    fs::write(path, updated).with_context(|| format!("write {}", path.display()))?;
    info!(
        path = %path.display(),
        old = result.old_version.as_deref().unwrap_or(""),
        new = result.new_version.as_deref().unwrap_or(""),
        "bumped manifest version"
    );
    Ok(result)
}

/// Rewrites the first `"version"` string value in `contents` that is a
/// strict `major.minor.patch`.
///
/// Returns `None` when the manifest has no version field. When every version
/// field is non-conforming, the first one is reported as skipped.
fn bump_contents(contents: &str) -> anyhow::Result<Option<(String, BumpResult)>> {
    let field =
        Regex::new(r#""version"\s*:\s*"([^"\\]*)""#).context("compile version field regex")?;
    let strict = Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").context("compile version regex")?;

    let values: Vec<_> = field
        .captures_iter(contents)
        .filter_map(|captures| captures.get(1))
        .collect();
    let Some(first) = values.first() else {
        return Ok(None);
    };
    let Some((value, parts)) = values
        .iter()
        .find_map(|value| strict.captures(value.as_str()).map(|parts| (value, parts)))
    else {
        let skipped = BumpResult::skipped(Some(first.as_str().to_string()));
        return Ok(Some((contents.to_string(), skipped)));
    };
    let old_version = value.as_str().to_string();

    let patch: u64 = match parts[3].parse() {
        Ok(patch) => patch,
        Err(_) => return Ok(Some((contents.to_string(), BumpResult::skipped(Some(old_version))))),
    };
    let Some(next) = patch.checked_add(1) else {
        return Ok(Some((contents.to_string(), BumpResult::skipped(Some(old_version)))));
    };
    let new_version = format!("{}.{}.{next}", &parts[1], &parts[2]);

    let mut updated = String::with_capacity(contents.len() + 1);
    updated.push_str(&contents[..value.start()]);
    updated.push_str(&new_version);
    updated.push_str(&contents[value.end()..]);
    Ok(Some((
        updated,
        BumpResult {
            bumped: true,
            old_version: Some(old_version),
            new_version: Some(new_version),
        },
    )))
}
