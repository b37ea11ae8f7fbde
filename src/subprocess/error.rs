#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process stdout was not captured")]
    StdoutUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
