use super::*;

pub(super) fn handle_config(args: ConfigArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Init(args) => {
            let root = std::fs::canonicalize(&args.root)
                .with_context(|| format!("resolve root {}", args.root.display()))?;
            let config = AppConfig {
                root: Some(root),
                git_program: args.git_program,
                timeout_secs: args.timeout_secs,
                include_untracked: !args.ignore_untracked,
            };
            config.save(config_path)?;
            println!("Config written to {}", config_path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            let config = AppConfig::load(config_path)?;
            println!("Config path: {}", config_path.display());
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("serialize config")?
            );
            Ok(())
        }
    }
}
