//! The seam between the sync engine and the `git` executable.
//!
//! The engine only speaks [`GitCommand`]; [`GitCommandRunner`] turns those
//! into child processes with a bounded wait. Tests swap in their own
//! [`CommandRunner`] with canned output.

use anyhow::{Context, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Account name used when presenting the token over HTTP basic auth.
const TOKEN_USERNAME: &str = "pat";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GitCommand {
    Fetch,
    /// Branch header of the porcelain status (`## local...remote [behind n]`).
    BranchStatus,
    WorkingTreeStatus { include_untracked: bool },
    Pull { token: Option<String> },
}

impl GitCommand {
    pub fn args(&self) -> Vec<&'static str> {
        match self {
            GitCommand::Fetch => vec!["fetch"],
            GitCommand::BranchStatus => {
                vec!["status", "--porcelain", "--branch", "--untracked-files=no"]
            }
            GitCommand::WorkingTreeStatus { include_untracked } => {
                if *include_untracked {
                    vec!["status", "--porcelain"]
                } else {
                    vec!["status", "--porcelain", "--untracked-files=no"]
                }
            }
            GitCommand::Pull { .. } => vec!["pull", "--ff-only"],
        }
    }

    /// Environment entries that accompany the command.
    ///
    /// The token travels as git config through the environment so it never
    /// shows up in the process argument list.
    pub fn env(&self) -> Vec<(String, String)> {
        let mut env = vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())];
        if let GitCommand::Pull { token: Some(token) } = self
            && !token.is_empty()
        {
            let credentials = STANDARD.encode(format!("{TOKEN_USERNAME}:{token}"));
            env.push(("GIT_CONFIG_COUNT".to_string(), "1".to_string()));
            env.push(("GIT_CONFIG_KEY_0".to_string(), "http.extraHeader".to_string()));
            env.push((
                "GIT_CONFIG_VALUE_0".to_string(),
                format!("Authorization: Basic {credentials}"),
            ));
        }
        env
    }

    pub fn label(&self) -> &'static str {
        match self {
            GitCommand::Fetch => "fetch",
            GitCommand::BranchStatus => "branch status",
            GitCommand::WorkingTreeStatus { .. } => "working tree status",
            GitCommand::Pull { .. } => "pull",
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    /// Full diagnostic text, stderr first.
    pub fn diagnostic(&self) -> String {
        if self.timed_out {
            return "command timed out".to_string();
        }
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        match (stderr.is_empty(), stdout.is_empty()) {
            (false, false) => format!("{stderr}\n{stdout}"),
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (true, true) => match self.exit_code {
                Some(code) => format!("exited with code {code}"),
                None => "terminated by signal".to_string(),
            },
        }
    }
}

pub trait CommandRunner {
    fn run(&self, working_dir: &Path, command: &GitCommand) -> anyhow::Result<CommandOutput>;
}

/// Runs the real `git` binary.
#[derive(Clone, Debug)]
pub struct GitCommandRunner {
    program: String,
    timeout: Duration,
}

impl Default for GitCommandRunner {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GitCommandRunner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl CommandRunner for GitCommandRunner {
    fn run(&self, working_dir: &Path, command: &GitCommand) -> anyhow::Result<CommandOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(command.args())
            .envs(command.env())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            path = %working_dir.display(),
            command = command.label(),
            "spawning git"
        );
        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn {} {}", self.program, command.label()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;
        let stdout_handle = thread::spawn(move || read_stream(stdout));
        let stderr_handle = thread::spawn(move || read_stream(stderr));

        let mut timed_out = false;
        let status = match child.wait_timeout(self.timeout).context("wait for git")? {
            Some(status) => status,
            None => {
                warn!(
                    path = %working_dir.display(),
                    command = command.label(),
                    timeout_secs = self.timeout.as_secs(),
                    "git timed out; killing"
                );
                timed_out = true;
                child.kill().context("kill git")?;
                child.wait().context("wait for git after kill")?
            }
        };

        let stdout = join_stream(stdout_handle).context("read git stdout")?;
        let stderr = join_stream(stderr_handle).context("read git stderr")?;
        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code: status.code(),
            timed_out,
        })
    }
}

fn read_stream(mut stream: impl Read) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).context("read stream")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn join_stream(handle: thread::JoinHandle<anyhow::Result<String>>) -> anyhow::Result<String> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}
