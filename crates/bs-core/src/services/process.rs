use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{BuildServerError, Result};

/// What a finished external command left behind.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: i32,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

fn describe(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// Run `program` to completion under `timeout`, whatever its exit status.
///
/// The child is killed if the timeout fires.
pub async fn run(
    program: &str,
    args: &[&str],
    stdin: Option<Stdio>,
    timeout: Duration,
) -> Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(stdin.unwrap_or_else(Stdio::null))
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| BuildServerError::Timeout {
            command: describe(program, args),
            after: timeout,
        })?
        .map_err(|source| BuildServerError::Spawn {
            program: program.to_string(),
            source,
        })?;

    Ok(CommandOutput {
        code: output.status.code().unwrap_or(-1),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

/// Like [`run`], but a non-zero exit becomes [`BuildServerError::CommandFailed`].
pub async fn run_checked(
    program: &str,
    args: &[&str],
    stdin: Option<Stdio>,
    timeout: Duration,
) -> Result<String> {
    let output = run(program, args, stdin, timeout).await?;
    if !output.success {
        return Err(BuildServerError::CommandFailed {
            command: describe(program, args),
            code: output.code,
            stderr: output.stderr,
        });
    }
    Ok(output.stdout)
}
