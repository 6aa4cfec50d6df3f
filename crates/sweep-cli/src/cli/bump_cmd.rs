use super::*;

pub(super) fn handle_bump(args: BumpArgs) -> anyhow::Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let result = try_bump_patch_version(&path);
    match (result.bumped, result.old_version, result.new_version) {
        (true, Some(old), Some(new)) => println!("Bumped {}: {old} -> {new}", path.display()),
        (_, Some(old), _) => println!(
            "Skipped {}: version {old} is not plain major.minor.patch",
            path.display()
        ),
        _ => println!("Skipped {}: no bumpable version found", path.display()),
    }
    Ok(())
}
