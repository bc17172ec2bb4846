use crate::changeset::ChangeScope;
use crate::constants::{
    DEFAULT_BATCH_DELAY_SECS, DEFAULT_BATCH_SIZE, DEFAULT_COMMAND_TIMEOUT_SECS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS,
};
use crate::retry::RetryPolicy;
use crate::upload::Settings;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

/// git-batch-upload: stage, commit and push uncommitted changes in fixed-size batches
#[derive(Parser, Debug)]
#[command(name = "git-batch-upload", about, long_about = None)]
pub struct Cli {
    /// repository to upload from
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// number of files per commit
    #[arg(short, long, default_value_t = NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN))]
    pub batch_size: NonZeroUsize,

    /// attempts per git command before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_retries: u32,

    /// seconds to wait before retrying a failed git command
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_SECS)]
    pub retry_delay: u64,

    /// seconds to wait between batches
    #[arg(long, default_value_t = DEFAULT_BATCH_DELAY_SECS)]
    pub batch_delay: u64,

    /// seconds before a git command is killed (0 waits forever)
    #[arg(long, default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS)]
    pub timeout: u64,

    /// remote to push to (defaults to the branch's upstream)
    #[arg(long)]
    pub remote: Option<String>,

    /// only upload untracked files
    #[arg(long)]
    pub untracked_only: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            batch_size: self.batch_size,
            retry: RetryPolicy::new(self.max_retries, Duration::from_secs(self.retry_delay)),
            batch_delay: Duration::from_secs(self.batch_delay),
            remote: self.remote.clone(),
            scope: if self.untracked_only {
                ChangeScope::UntrackedOnly
            } else {
                ChangeScope::All
            },
        }
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["git-batch-upload"]).unwrap();
        let settings = cli.settings();

        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(settings.batch_size.get(), 50);
        assert_eq!(settings.retry, RetryPolicy::new(3, Duration::from_secs(5)));
        assert_eq!(settings.batch_delay, Duration::from_secs(2));
        assert_eq!(settings.remote, None);
        assert_eq!(settings.scope, ChangeScope::All);
        assert_eq!(cli.command_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "git-batch-upload",
            "some/repo",
            "--batch-size",
            "10",
            "--max-retries",
            "5",
            "--retry-delay",
            "1",
            "--batch-delay",
            "0",
            "--timeout",
            "0",
            "--remote",
            "origin",
            "--untracked-only",
        ])
        .unwrap();
        let settings = cli.settings();

        assert_eq!(cli.dir, PathBuf::from("some/repo"));
        assert_eq!(settings.batch_size.get(), 10);
        assert_eq!(settings.retry, RetryPolicy::new(5, Duration::from_secs(1)));
        assert_eq!(settings.batch_delay, Duration::ZERO);
        assert_eq!(settings.remote.as_deref(), Some("origin"));
        assert_eq!(settings.scope, ChangeScope::UntrackedOnly);
        assert_eq!(cli.command_timeout(), None);
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        assert!(Cli::try_parse_from(["git-batch-upload", "--batch-size", "0"]).is_err());
    }

    #[test]
    fn test_rejects_zero_retries() {
        assert!(Cli::try_parse_from(["git-batch-upload", "--max-retries", "0"]).is_err());
    }
}
