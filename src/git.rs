use crate::changeset::{ChangeScope, ChangeSet};
use crate::constants::GIT_METADATA_DIR;
use crate::error::{CommandError, UploadError};
use crate::retry::{RetryPolicy, run_with_retry};
use crate::ui;
use git2::{Repository, RepositoryState};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// text captured from a successful git invocation
#[derive(Debug, Default, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// first line git printed, preferring stdout
    pub fn summary(&self) -> Option<&str> {
        [&self.stdout, &self.stderr]
            .into_iter()
            .find_map(|text| text.lines().map(str::trim).find(|line| !line.is_empty()))
    }
}

/// the external version-control collaborator
pub trait Git {
    /// run `git <args>` inside `dir`
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, CommandError>;

    /// check the repository at `dir` is in a state that allows committing
    fn check_state(&self, dir: &Path) -> Result<(), UploadError>;
}

/// runs the system `git` binary
///
/// the binary is used rather than git2 so hooks, commit signing and
/// credential helpers behave exactly as they do for the user
pub struct SystemGit {
    timeout: Option<Duration>,
}

impl SystemGit {
    /// `timeout` of `None` waits for git indefinitely
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Git for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, CommandError> {
        // capture through files, a pipe could fill up while we wait on the child
        let mut stdout_file = tempfile::tempfile().map_err(CommandError::Io)?;
        let mut stderr_file = tempfile::tempfile().map_err(CommandError::Io)?;

        let mut child = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone().map_err(CommandError::Io)?))
            .stderr(Stdio::from(stderr_file.try_clone().map_err(CommandError::Io)?))
            .spawn()
            .map_err(CommandError::Spawn)?;

        let status = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout).map_err(CommandError::Io)? {
                Some(status) => status,
                None => {
                    if let Err(e) = child.kill() {
                        crate::warning!("failed to kill git process: {}", e);
                    }
                    if let Err(e) = child.wait() {
                        crate::warning!("failed to reap git process: {}", e);
                    }
                    return Err(CommandError::Timeout(timeout));
                }
            },
            None => child.wait().map_err(CommandError::Io)?,
        };

        let stdout = read_captured(&mut stdout_file)?;
        let stderr = read_captured(&mut stderr_file)?;

        if !status.success() {
            // git reports most failures on stderr, but `commit` uses stdout
            let output = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(CommandError::Failed {
                code: status.code(),
                output,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }

    fn check_state(&self, dir: &Path) -> Result<(), UploadError> {
        let repo = Repository::open(dir)
            .map_err(|e| UploadError::RepositoryState(format!("failed to open repository: {}", e.message())))?;

        // committing in the middle of a merge or rebase would mix in unrelated work
        if repo.state() != RepositoryState::Clean {
            return Err(UploadError::RepositoryState(
                "repository is in the middle of an operation (merge, rebase, etc)".to_string(),
            ));
        }

        // `git push` has nothing to push from a detached HEAD
        if repo.head_detached().unwrap_or(false) {
            return Err(UploadError::RepositoryState(
                "repository is in detached HEAD state".to_string(),
            ));
        }

        Ok(())
    }
}

fn read_captured(file: &mut std::fs::File) -> Result<String, CommandError> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0)).map_err(CommandError::Io)?;
    file.read_to_end(&mut bytes).map_err(CommandError::Io)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// list the changed files in the repository at `dir`
///
/// the directory and its `.git` marker are checked before git is invoked
pub fn discover_changes(
    git: &dyn Git,
    dir: &Path,
    scope: ChangeScope,
) -> Result<ChangeSet, UploadError> {
    if !dir.is_dir() {
        return Err(UploadError::DirectoryNotFound(dir.to_path_buf()));
    }
    if !dir.join(GIT_METADATA_DIR).exists() {
        return Err(UploadError::NotARepository(dir.to_path_buf()));
    }
    git.check_state(dir)?;

    let args = ["status", "--porcelain", "-u"];
    let output = run_with_retry(
        RetryPolicy::once(),
        &ui::describe_command(&args),
        &std::thread::sleep,
        || git.run(dir, &args),
    )?;

    Ok(ChangeSet::from_porcelain(&output.stdout, scope))
}
