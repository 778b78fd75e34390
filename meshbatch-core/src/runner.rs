use std::io;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors raised before an external command produced an exit status
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("the '{program}' command was not found")]
    NotFound { program: String },

    #[error("failed to run '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Captured result of a finished external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Runs an external program to completion and captures its output
///
/// `envs` are set on the child in addition to the inherited environment.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<CommandOutput, RunnerError>;
}

/// Spawns real subprocesses, looking the program up on `PATH`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<CommandOutput, RunnerError> {
        debug!(
            "Spawning {program} {args} with {count} extra env var(s)",
            args = args.join(" "),
            count = envs.len()
        );

        let output = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(key, value)| (key, value)))
            .output()
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => RunnerError::NotFound {
                    program: program.to_string(),
                },
                _ => RunnerError::Io {
                    program: program.to_string(),
                    source,
                },
            })?;

        let output = CommandOutput::from(output);
        debug!("{program} exited with {code:?}", code = output.exit_code);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let result = SystemRunner
            .run("meshbatch-definitely-not-installed", &[], &[])
            .await;
        assert!(matches!(result, Err(RunnerError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_streams_and_exit_code() -> Result<()> {
        let args = vec![
            "-c".to_string(),
            "echo out; echo err >&2; exit 3".to_string(),
        ];
        let output = SystemRunner.run("sh", &args, &[]).await?;

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extra_env_reaches_child() -> Result<()> {
        let args = vec!["-c".to_string(), "echo \"FOO=$MESHBATCH_TEST_FOO\"".to_string()];
        let envs = vec![("MESHBATCH_TEST_FOO".to_string(), "from_dotenv".to_string())];
        let output = SystemRunner.run("sh", &args, &envs).await?;

        assert!(output.success());
        assert_eq!(output.stdout.trim(), "FOO=from_dotenv");
        Ok(())
    }
}
