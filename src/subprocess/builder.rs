use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;

use crate::subprocess::ProcessCommand;

/// Fluent construction of a [`ProcessCommand`]
pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            command: ProcessCommand {
                program: program.as_ref().to_path_buf(),
                args: Vec::new(),
                env: HashMap::new(),
            },
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Set one variable on top of the inherited environment
    pub fn env(mut self, key: &str, value: impl AsRef<OsStr>) -> Self {
        self.command
            .env
            .insert(key.to_string(), value.as_ref().to_os_string());
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}
