//! Child process plumbing for worker processes

pub mod builder;
pub mod error;
pub mod runner;

#[cfg(test)]
mod tests;

pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use runner::{ExitStatus, ProcessCommand, SpawnedProcess, TokioProcessRunner};
