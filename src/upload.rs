use crate::changeset::{ChangeScope, partition};
use crate::constants::{
    COMMIT_MESSAGE_PREFIX, DEFAULT_BATCH_DELAY_SECS, DEFAULT_BATCH_SIZE, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY_SECS,
};
use crate::error::{CommandError, UploadError};
use crate::git::{CommandOutput, Git, discover_changes};
use crate::retry::{RetryPolicy, run_with_retry};
use crate::{info, status, ui};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

/// tunables for one upload run
#[derive(Debug, Clone)]
pub struct Settings {
    pub batch_size: NonZeroUsize,
    pub retry: RetryPolicy,
    pub batch_delay: Duration,
    pub remote: Option<String>,
    pub scope: ChangeScope,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            retry: RetryPolicy::new(
                DEFAULT_MAX_ATTEMPTS,
                Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            ),
            batch_delay: Duration::from_secs(DEFAULT_BATCH_DELAY_SECS),
            remote: None,
            scope: ChangeScope::All,
        }
    }
}

/// how a successful run ended
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    NothingToDo,
    Uploaded { batches: usize, files: usize },
}

/// commit message for the 1-based batch `index`
pub fn commit_message(index: usize) -> String {
    format!("{COMMIT_MESSAGE_PREFIX} {index}")
}

/// stages, commits and pushes changed files in fixed-size batches
pub struct Uploader<'a> {
    git: &'a dyn Git,
    settings: Settings,
    sleep: &'a dyn Fn(Duration),
}

impl<'a> Uploader<'a> {
    pub fn new(git: &'a dyn Git, settings: Settings) -> Self {
        Self {
            git,
            settings,
            sleep: &std::thread::sleep,
        }
    }

    /// replace the function used to wait between retries and batches
    pub fn with_sleep(mut self, sleep: &'a dyn Fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    /// upload every change in `dir`
    ///
    /// the first unrecoverable failure aborts the run; batches already pushed
    /// stay pushed
    pub fn upload(&self, dir: &Path) -> Result<Outcome, UploadError> {
        let changeset = discover_changes(self.git, dir, self.settings.scope)?;
        if changeset.is_empty() {
            return Ok(Outcome::NothingToDo);
        }

        let batches = partition(&changeset.files, self.settings.batch_size);
        let batch_count = batches.len();
        status!(
            "found {} to upload in {}",
            ui::count(changeset.len(), "file"),
            ui::count(batch_count, "batch")
        );

        for (i, batch) in batches.iter().enumerate() {
            let index = i + 1;
            info!();
            status!(
                "uploading batch {}/{} ({})...",
                index,
                batch_count,
                ui::count(batch.len(), "file")
            );

            let mut add = vec!["add", "--"];
            add.extend(
                batch
                    .iter()
                    .filter(|file| file.needs_staging())
                    .map(|file| file.path.as_str()),
            );
            if add.len() > 2 {
                self.step(dir, "staging", &add)?;
            }

            // files staged before the run all land in the first commit, later
            // batches may have nothing left to commit
            if self.has_staged_changes(dir)? {
                let message = commit_message(index);
                let mut commit = vec!["commit", "-m", message.as_str()];
                if self.settings.scope == ChangeScope::UntrackedOnly {
                    commit.push("--");
                    commit.extend(batch.iter().map(|file| file.path.as_str()));
                }
                let committed = self.step(dir, "committing", &commit)?;
                if let Some(line) = committed.summary() {
                    info!("  {}", line);
                }
            } else {
                info!("  nothing left to commit, already included in an earlier batch");
            }

            let mut push = vec!["push"];
            if let Some(remote) = &self.settings.remote {
                push.push(remote.as_str());
            }
            let pushed = self.step(dir, "pushing", &push)?;
            if let Some(line) = pushed.summary() {
                info!("  {}", line);
            }

            status!("uploaded batch {}/{}", index, batch_count);

            if index < batch_count {
                (self.sleep)(self.settings.batch_delay);
            }
        }

        Ok(Outcome::Uploaded {
            batches: batch_count,
            files: changeset.len(),
        })
    }

    /// whether the index differs from HEAD
    fn has_staged_changes(&self, dir: &Path) -> Result<bool, UploadError> {
        let args = ["diff", "--cached", "--quiet"];
        let command = ui::describe_command(&args);
        run_with_retry(self.settings.retry, &command, self.sleep, || {
            match self.git.run(dir, &args) {
                Ok(_) => Ok(false),
                // --quiet exits 1 when there are differences
                Err(CommandError::Failed { code: Some(1), .. }) => Ok(true),
                Err(e) => Err(e),
            }
        })
    }

    /// run one git command with retries and a spinner
    fn step(&self, dir: &Path, label: &str, args: &[&str]) -> Result<CommandOutput, UploadError> {
        let command = ui::describe_command(args);
        run_with_retry(self.settings.retry, &command, self.sleep, || {
            let spinner = ui::spinner(&format!("{label}..."));
            let result = self.git.run(dir, args);
            spinner.finish_and_clear();
            result
        })
    }
}
