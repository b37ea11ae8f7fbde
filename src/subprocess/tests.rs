use super::*;

#[tokio::test]
async fn test_spawn_reads_stdout_lines() {
    let runner = TokioProcessRunner;
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo first; echo second"])
        .build();

    let mut process = runner.spawn(&command).unwrap();
    assert_eq!(process.next_line().await.unwrap(), Some("first".to_string()));
    assert_eq!(process.next_line().await.unwrap(), Some("second".to_string()));
    assert_eq!(process.next_line().await.unwrap(), None);
    assert!(process.wait().await.unwrap().success());
}

#[tokio::test]
async fn test_spawn_passes_env_overrides() {
    let runner = TokioProcessRunner;
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo \"$WORKER_GREETING\""])
        .env("WORKER_GREETING", "hello")
        .build();

    let mut process = runner.spawn(&command).unwrap();
    assert_eq!(process.next_line().await.unwrap(), Some("hello".to_string()));
    process.wait().await.unwrap();
}

#[tokio::test]
async fn test_env_accepts_paths() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("with space.toml");
    let command = ProcessCommandBuilder::new("sh")
        .args(["-c", "echo \"$WORKER_CONFIG\""])
        .env("WORKER_CONFIG", &config)
        .build();

    let mut process = TokioProcessRunner.spawn(&command).unwrap();
    assert_eq!(
        process.next_line().await.unwrap(),
        Some(config.display().to_string())
    );
    process.wait().await.unwrap();
}

#[tokio::test]
async fn test_exit_code_is_reported() {
    let runner = TokioProcessRunner;
    let command = ProcessCommandBuilder::new("sh").args(["-c", "exit 3"]).build();

    let mut process = runner.spawn(&command).unwrap();
    assert_eq!(process.next_line().await.unwrap(), None);

    let status = process.wait().await.unwrap();
    assert!(!status.success());
    assert_eq!(status.code(), Some(3));
    assert_eq!(status.to_string(), "exit code 3");
}

#[tokio::test]
async fn test_command_not_found() {
    let runner = TokioProcessRunner;
    let command = ProcessCommandBuilder::new("nonexistent-command-12345").build();

    let result = runner.spawn(&command);
    assert!(matches!(result, Err(ProcessError::CommandNotFound(_))));
}

#[test]
fn test_command_display() {
    let command = ProcessCommandBuilder::new("/usr/bin/worker")
        .args(["worker", "mapper", "1", "abc-0"])
        .build();
    assert_eq!(command.display(), "/usr/bin/worker worker mapper 1 abc-0");
}
