use super::*;

#[derive(Parser)]
#[command(author, version, about = "Fetch and fast-forward every git repository under a directory")]
pub(super) struct Cli {
    #[arg(long, global = true, help = "Config file path (defaults to the platform config dir)")]
    pub(super) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(clap::Subcommand)]
pub(super) enum Commands {
    #[command(about = "Fetch & pull all changes for every repository under the root")]
    Sync(SyncArgs),
    #[command(about = "List discovered repositories in processing order")]
    List(ListArgs),
    #[command(about = "Bump the patch version in a repository's package.json")]
    Bump(BumpArgs),
    #[command(about = "Manage the stored pull token")]
    Token(TokenArgs),
    #[command(about = "Manage config")]
    Config(ConfigArgs),
}

#[derive(Parser)]
pub(super) struct SyncArgs {
    #[arg(long, help = "Directory to scan (defaults to config root, then the current dir)")]
    pub(super) root: Option<PathBuf>,
    #[arg(
        long,
        env = "REPO_SWEEP_TOKEN",
        hide_env_values = true,
        help = "Token for HTTPS pulls (falls back to the stored token)"
    )]
    pub(super) token: Option<String>,
    #[arg(long, help = "Kill a git command after this many seconds")]
    pub(super) timeout_secs: Option<u64>,
    #[arg(long, help = "Render a live progress line")]
    pub(super) status: bool,
    #[arg(long, help = "Do not write the audit log")]
    pub(super) no_audit: bool,
}

#[derive(Parser)]
pub(super) struct ListArgs {
    #[arg(long)]
    pub(super) root: Option<PathBuf>,
}

#[derive(Parser)]
pub(super) struct BumpArgs {
    #[arg(long, help = "Repository root containing package.json (defaults to the current dir)")]
    pub(super) path: Option<PathBuf>,
}

#[derive(Parser)]
pub(super) struct TokenArgs {
    #[command(subcommand)]
    pub(super) command: TokenCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum TokenCommands {
    #[command(about = "Store the pull token in the OS keyring")]
    Set(SetTokenArgs),
    #[command(about = "Report whether a pull token is stored")]
    Status,
    #[command(about = "Remove the stored pull token")]
    Clear,
}

#[derive(Parser)]
pub(super) struct SetTokenArgs {
    #[arg(long)]
    pub(super) token: String,
}

#[derive(Parser)]
pub(super) struct ConfigArgs {
    #[command(subcommand)]
    pub(super) command: ConfigCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum ConfigCommands {
    #[command(about = "Write a config file with a default scan root")]
    Init(InitArgs),
    #[command(about = "Print the effective config")]
    Show,
}

#[derive(Parser)]
pub(super) struct InitArgs {
    #[arg(long)]
    pub(super) root: PathBuf,
    #[arg(long)]
    pub(super) git_program: Option<String>,
    #[arg(long)]
    pub(super) timeout_secs: Option<u64>,
    #[arg(long, help = "Ignore untracked files when checking for local changes")]
    pub(super) ignore_untracked: bool,
}
