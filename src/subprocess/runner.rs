use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout};

use super::error::ProcessError;

#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, OsString>,
}

impl ProcessCommand {
    /// Program and arguments joined for log lines
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            return ExitStatus::Success;
        }
        if let Some(code) = status.code() {
            return ExitStatus::Error(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }
        ExitStatus::Error(-1)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Success => f.write_str("exit code 0"),
            ExitStatus::Error(code) => write!(f, "exit code {}", code),
            ExitStatus::Signal(signal) => write!(f, "signal {}", signal),
        }
    }
}

/// A running child whose stdout is read line by line.
///
/// The child is killed if this handle is dropped before it exits.
pub struct SpawnedProcess {
    child: Child,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl SpawnedProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Next stdout line without its terminator, `None` once stdout closes
    pub async fn next_line(&mut self) -> Result<Option<String>, ProcessError> {
        Ok(self.stdout.next_line().await?)
    }

    /// Wait for the child to exit
    pub async fn wait(&mut self) -> Result<ExitStatus, ProcessError> {
        let status = self.child.wait().await?;
        Ok(status.into())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Spawn `command` with stdout piped, stderr inherited and stdin closed
    pub fn spawn(&self, command: &ProcessCommand) -> Result<SpawnedProcess, ProcessError> {
        Self::log_command_start(command);

        let mut cmd = Self::configure_command(command);
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessError::CommandNotFound(command.program.display().to_string())
            } else {
                ProcessError::Spawn {
                    command: command.display(),
                    source: e,
                }
            }
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or(ProcessError::StdoutUnavailable)?;

        Ok(SpawnedProcess {
            child,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Log command execution details
    fn log_command_start(command: &ProcessCommand) {
        tracing::debug!("Executing subprocess: {}", command.display());

        if !command.env.is_empty() {
            tracing::trace!("Environment overrides: {:?}", command.env);
        }
    }

    /// Configure the command with environment and stdio
    fn configure_command(command: &ProcessCommand) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args);

        // Inherited environment stays in place; explicit entries take precedence.
        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}
