use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::worker::ChunkId;

/// Hands out chunk ids for one run.
///
/// Ids combine a random per-run token with a counter shared by both phases,
/// so no two chunks of a run, or of concurrent runs, share store keys.
#[derive(Debug)]
pub struct ChunkIdGenerator {
    run_token: String,
    next: AtomicU64,
}

impl ChunkIdGenerator {
    pub fn new() -> Self {
        Self {
            run_token: Uuid::new_v4().simple().to_string(),
            next: AtomicU64::new(0),
        }
    }

    pub fn run_token(&self) -> &str {
        &self.run_token
    }

    pub fn next_id(&self) -> ChunkId {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed);
        ChunkId::new(&self.run_token, sequence)
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for ChunkIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
