use std::path::PathBuf;
use std::time::Duration;

/// errors that abort an upload run
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("repository is not ready for upload: {0}")]
    RepositoryState(String),

    #[error("`{command}` failed after {attempts} {}", attempts_word(.attempts))]
    CommandExecution {
        command: String,
        attempts: u32,
        #[source]
        source: CommandError,
    },
}

/// a single failed invocation of the git binary
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to run git: {0}")]
    Spawn(std::io::Error),

    #[error("failed to collect git output: {0}")]
    Io(std::io::Error),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("{}", describe_failure(.code, .output))]
    Failed { code: Option<i32>, output: String },
}

fn attempts_word(attempts: &u32) -> &'static str {
    if *attempts == 1 { "attempt" } else { "attempts" }
}

fn describe_failure(code: &Option<i32>, output: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {code}"),
        None => String::from("terminated by signal"),
    };
    let output = output.trim();
    if output.is_empty() {
        status
    } else {
        format!("{status}: {output}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_includes_output() {
        let err = CommandError::Failed {
            code: Some(128),
            output: "fatal: unable to access remote\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "exit code 128: fatal: unable to access remote"
        );
    }

    #[test]
    fn test_failed_without_output() {
        let err = CommandError::Failed {
            code: None,
            output: "  \n".to_string(),
        };
        assert_eq!(err.to_string(), "terminated by signal");
    }

    #[test]
    fn test_command_execution_chain() {
        let err = UploadError::CommandExecution {
            command: "git push".to_string(),
            attempts: 3,
            source: CommandError::Timeout(Duration::from_secs(30)),
        };
        assert_eq!(err.to_string(), "`git push` failed after 3 attempts");
        let chained = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chained, "`git push` failed after 3 attempts: timed out after 30s");
    }
}
