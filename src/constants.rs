// batching
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_DELAY_SECS: u64 = 2;

// retry
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

// git
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;
pub const GIT_METADATA_DIR: &str = ".git";
pub const COMMIT_MESSAGE_PREFIX: &str = "Batch upload";

// ui
pub const MAX_ARGS_TO_SHOW: usize = 3;
pub const TROUBLESHOOTING_HINTS: &[&str] = &[
    "check your network connection",
    "check the remote configuration (git remote -v)",
    "if you are behind a proxy, configure it (git config --global http.proxy <url>)",
];
