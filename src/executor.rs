//! Command execution through the host shell.
//!
//! The shell is picked once at startup: `cmd /C` on Windows, `sh -c`
//! everywhere else. A failed command still produces a normal response;
//! the failure description goes into the result text and never tears
//! down a session.

use std::process::Stdio;
use tokio::process::Command;

/// The host's "run a string as a command line" capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostShell {
    /// Windows `cmd /C`
    Cmd,
    /// POSIX `sh -c`
    Sh,
}

impl HostShell {
    /// Pick the shell for the host OS. Called once at process start,
    /// never per command.
    pub fn detect() -> Self {
        if cfg!(windows) {
            HostShell::Cmd
        } else {
            HostShell::Sh
        }
    }

    fn invocation(self) -> (&'static str, &'static str) {
        match self {
            HostShell::Cmd => ("cmd", "/C"),
            HostShell::Sh => ("sh", "-c"),
        }
    }

    /// Run one command line and capture its combined output.
    ///
    /// Waits until the command finishes; there is no timeout. A hung
    /// command hangs only the session that issued it.
    pub async fn run(self, command: &str) -> ExecOutcome {
        let (program, flag) = self.invocation();
        let captured = Command::new(program)
            .arg(flag)
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await;

        match captured {
            Ok(output) if output.status.success() => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                ExecOutcome::Output(combined)
            }
            Ok(output) => ExecOutcome::Failed(output.status.to_string()),
            Err(e) => ExecOutcome::Failed(e.to_string()),
        }
    }
}

/// What one execution produced: captured output, or a failure
/// description kept separate so the session can log it before it is
/// folded into the wire payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Output(String),
    Failed(String),
}

impl ExecOutcome {
    /// Collapse into the single `result` field sent on the wire.
    pub fn into_result_text(self) -> String {
        match self {
            ExecOutcome::Output(text) => text,
            ExecOutcome::Failed(reason) => format!("Error: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_text_passes_output_through() {
        let outcome = ExecOutcome::Output("hello\n".to_string());
        assert_eq!(outcome.into_result_text(), "hello\n");
    }

    #[test]
    fn test_result_text_prefixes_failures() {
        let outcome = ExecOutcome::Failed("exit status: 1".to_string());
        assert_eq!(outcome.into_result_text(), "Error: exit status: 1");
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_picks_sh() {
        assert_eq!(HostShell::detect(), HostShell::Sh);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_stdout() {
        let outcome = HostShell::Sh.run("echo hello").await;
        assert_eq!(outcome, ExecOutcome::Output("hello\n".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_stderr() {
        let outcome = HostShell::Sh.run("echo oops 1>&2").await;
        assert_eq!(outcome, ExecOutcome::Output("oops\n".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_combines_both_streams() {
        let outcome = HostShell::Sh.run("echo out; echo err 1>&2").await;
        assert_eq!(outcome, ExecOutcome::Output("out\nerr\n".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_command_is_a_no_op() {
        let outcome = HostShell::Sh.run("").await;
        assert_eq!(outcome, ExecOutcome::Output(String::new()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_binary_is_a_failure() {
        match HostShell::Sh.run("no-such-binary-anywhere").await {
            ExecOutcome::Failed(reason) => {
                assert!(reason.contains("127"), "unexpected reason: {reason}");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
