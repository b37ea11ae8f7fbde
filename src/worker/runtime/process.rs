use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::WorkerRuntime;
use crate::config::CONFIG_ENV_VAR;
use crate::subprocess::{ProcessCommandBuilder, TokioProcessRunner};
use crate::worker::error::WorkerError;
use crate::worker::protocol::WorkUnit;

/// Runs each unit in a fresh OS process.
///
/// The child is invoked as `<program> worker <mapper|reducer> <job_id> <chunk_id>`
/// and must print the unit's completion line on stdout. Any other stdout
/// line is ignored.
pub struct ProcessWorkerRuntime {
    program: PathBuf,
    config_path: Option<PathBuf>,
    runner: TokioProcessRunner,
}

impl ProcessWorkerRuntime {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            config_path: None,
            runner: TokioProcessRunner,
        }
    }

    /// Export `path` to every worker through [`CONFIG_ENV_VAR`].
    ///
    /// This only pins which settings file the worker loads, so it reaches the
    /// same store as the coordinator. The unit itself is still described by
    /// the role, job id and chunk id arguments alone; its data travels through
    /// the store.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }
}

#[async_trait]
impl WorkerRuntime for ProcessWorkerRuntime {
    async fn execute(&self, unit: &WorkUnit) -> Result<(), WorkerError> {
        let mut builder = ProcessCommandBuilder::new(&self.program).args([
            "worker".to_string(),
            unit.phase.role().to_string(),
            unit.job_id.to_string(),
            unit.chunk_id.to_string(),
        ]);
        if let Some(path) = &self.config_path {
            builder = builder.env(CONFIG_ENV_VAR, path);
        }
        let command = builder.build();

        let mut child = self
            .runner
            .spawn(&command)
            .map_err(|source| WorkerError::Spawn {
                role: unit.phase.role(),
                program: self.program.clone(),
                source,
            })?;
        debug!("Spawned {} worker pid {:?} for {}", unit.phase, child.id(), unit);

        let expected = unit.completion_signal();
        while let Some(line) = child.next_line().await? {
            if expected.matches(&line) {
                // Reap the child; its results are already in the store.
                let status = child.wait().await?;
                if !status.success() {
                    warn!("Worker for {} signaled completion but exited with {}", unit, status);
                }
                return Ok(());
            }
            debug!("Ignoring worker output for {}: {}", unit, line);
        }

        let status = child.wait().await?;
        Err(WorkerError::ExitedWithoutSignal {
            unit: unit.to_string(),
            status,
        })
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::job::JobId;
    use crate::subprocess::ExitStatus;
    use crate::worker::protocol::{ChunkId, Phase};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("worker.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn unit() -> WorkUnit {
        WorkUnit::new(JobId(7), ChunkId::new("run", 2), Phase::Reduce)
    }

    #[tokio::test]
    async fn test_resolves_on_matching_signal() {
        let dir = TempDir::new().unwrap();
        // Echo the arguments back as the completion line: worker reducer 7 run-2
        let program = script(&dir, "echo \"$3:$4 COMPLETE\"");

        ProcessWorkerRuntime::new(program)
            .execute(&unit())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_ignores_other_output() {
        let dir = TempDir::new().unwrap();
        let program = script(
            &dir,
            "echo starting\necho \"7:run-9 COMPLETE\"\necho \"7:run-2 COMPLETE\"",
        );

        ProcessWorkerRuntime::new(program)
            .execute(&unit())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_exit_without_signal_is_an_error() {
        let dir = TempDir::new().unwrap();
        let program = script(&dir, "echo working\nexit 4");

        let result = ProcessWorkerRuntime::new(program).execute(&unit()).await;
        match result {
            Err(WorkerError::ExitedWithoutSignal { status, .. }) => {
                assert_eq!(status, ExitStatus::Error(4));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exports_config_path() {
        let dir = TempDir::new().unwrap();
        let program = script(
            &dir,
            "[ \"$MAPREDUCE_CONFIG\" = \"/etc/mr.toml\" ] && echo \"$3:$4 COMPLETE\"",
        );

        ProcessWorkerRuntime::new(program)
            .with_config_path("/etc/mr.toml")
            .execute(&unit())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result = ProcessWorkerRuntime::new("/nonexistent/worker-binary")
            .execute(&unit())
            .await;
        assert!(matches!(
            result,
            Err(WorkerError::Spawn { role: "reducer", .. })
        ));
    }
}
