//! Engine ↔ worker protocol
//!
//! Both sides derive store keys and the completion message from a
//! [`WorkUnit`], so the formats below are defined exactly once.
//!
//! - payload key: `<namespace>:<jobId>:<chunkId>:payload`
//! - results key: `<namespace>:<jobId>:<chunkId>:results`
//! - completion:  `<jobId>:<chunkId> COMPLETE`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::job::JobId;

const COMPLETE_MARKER: &str = "COMPLETE";

/// Pipeline phase a chunk belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Map,
    Reduce,
}

impl Phase {
    /// Name of the worker role serving this phase
    pub fn role(&self) -> &'static str {
        match self {
            Phase::Map => "mapper",
            Phase::Reduce => "reducer",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid chunk id `{0}`: must be non-empty and contain no whitespace or ':'")]
pub struct InvalidChunkId(pub String);

/// Identifier of one chunk, unique among all chunks of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkId(String);

impl ChunkId {
    /// Chunk `sequence` of the run identified by `run_token`
    pub fn new(run_token: &str, sequence: u64) -> Self {
        Self(format!("{run_token}-{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChunkId {
    type Err = InvalidChunkId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.contains(':') || s.chars().any(char::is_whitespace) {
            return Err(InvalidChunkId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a store entry within a work unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRole {
    Payload,
    Results,
}

impl EntryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryRole::Payload => "payload",
            EntryRole::Results => "results",
        }
    }
}

/// One chunk of one phase of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub job_id: JobId,
    pub chunk_id: ChunkId,
    pub phase: Phase,
}

impl WorkUnit {
    pub fn new(job_id: JobId, chunk_id: ChunkId, phase: Phase) -> Self {
        Self {
            job_id,
            chunk_id,
            phase,
        }
    }

    /// Store key of this unit's entry for `role`
    pub fn store_key(&self, namespace: &str, role: EntryRole) -> String {
        format!(
            "{}:{}:{}:{}",
            namespace,
            self.job_id,
            self.chunk_id,
            role.as_str()
        )
    }

    pub fn payload_key(&self, namespace: &str) -> String {
        self.store_key(namespace, EntryRole::Payload)
    }

    pub fn results_key(&self, namespace: &str) -> String {
        self.store_key(namespace, EntryRole::Results)
    }

    /// The signal a worker emits once this unit's results are stored
    pub fn completion_signal(&self) -> CompletionSignal {
        CompletionSignal {
            job_id: self.job_id,
            chunk_id: self.chunk_id.clone(),
        }
    }
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "job {} chunk {} ({})",
            self.job_id, self.chunk_id, self.phase
        )
    }
}

/// Completion message a worker sends to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSignal {
    pub job_id: JobId,
    pub chunk_id: ChunkId,
}

impl CompletionSignal {
    /// The exact wire message, without line terminator
    pub fn message(&self) -> String {
        format!("{}:{} {}", self.job_id, self.chunk_id, COMPLETE_MARKER)
    }

    /// Whether `message` is this signal. Trailing line terminators are
    /// ignored; anything else must match exactly.
    pub fn matches(&self, message: &str) -> bool {
        message.trim_end_matches(['\r', '\n']) == self.message()
    }

    /// Parse a wire message, `None` for anything that is not a signal
    pub fn parse(message: &str) -> Option<Self> {
        let message = message.trim_end_matches(['\r', '\n']);
        let (unit, marker) = message.split_once(' ')?;
        if marker != COMPLETE_MARKER {
            return None;
        }
        let (job_id, chunk_id) = unit.split_once(':')?;
        Some(Self {
            job_id: job_id.parse().ok()?,
            chunk_id: chunk_id.parse().ok()?,
        })
    }
}

impl fmt::Display for CompletionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> WorkUnit {
        WorkUnit::new(JobId(1), ChunkId::new("5f0c", 3), Phase::Map)
    }

    #[test]
    fn test_store_keys() {
        let unit = unit();
        assert_eq!(unit.payload_key("mapreduce"), "mapreduce:1:5f0c-3:payload");
        assert_eq!(unit.results_key("mapreduce"), "mapreduce:1:5f0c-3:results");
    }

    #[test]
    fn test_keys_do_not_depend_on_phase() {
        let mut reduce_unit = unit();
        reduce_unit.phase = Phase::Reduce;
        assert_eq!(reduce_unit.payload_key("ns"), unit().payload_key("ns"));
    }

    #[test]
    fn test_completion_message() {
        let signal = unit().completion_signal();
        assert_eq!(signal.message(), "1:5f0c-3 COMPLETE");
        assert!(signal.matches("1:5f0c-3 COMPLETE\n"));
        assert!(signal.matches("1:5f0c-3 COMPLETE\r\n"));
    }

    #[test]
    fn test_other_messages_do_not_match() {
        let signal = unit().completion_signal();
        assert!(!signal.matches("1:5f0c-4 COMPLETE"));
        assert!(!signal.matches("2:5f0c-3 COMPLETE"));
        assert!(!signal.matches("1:5f0c-3 complete"));
        assert!(!signal.matches(" 1:5f0c-3 COMPLETE"));
        assert!(!signal.matches("progress 50%"));
    }

    #[test]
    fn test_parse_round_trips_message() {
        let signal = unit().completion_signal();
        assert_eq!(CompletionSignal::parse(&signal.message()), Some(signal));
        assert_eq!(CompletionSignal::parse("1:abc DONE"), None);
        assert_eq!(CompletionSignal::parse("x:abc COMPLETE"), None);
        assert_eq!(CompletionSignal::parse("hello"), None);
    }

    #[test]
    fn test_chunk_id_validation() {
        assert_eq!("abc-0".parse::<ChunkId>().unwrap().as_str(), "abc-0");
        assert!("".parse::<ChunkId>().is_err());
        assert!("a:b".parse::<ChunkId>().is_err());
        assert!("a b".parse::<ChunkId>().is_err());
    }

    #[test]
    fn test_phase_roles() {
        assert_eq!(Phase::Map.role(), "mapper");
        assert_eq!(Phase::Reduce.to_string(), "reducer");
    }
}
