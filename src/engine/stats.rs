use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Work performed by one phase of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    pub waves: usize,
    pub chunks: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub records: usize,
    pub map: PhaseStats,
    pub intermediate_pairs: usize,
    pub groups: usize,
    pub reduce: PhaseStats,
    pub results: usize,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

impl RunStats {
    /// Chunks dispatched across both phases
    pub fn total_chunks(&self) -> usize {
        self.map.chunks + self.reduce.chunks
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records -> {} pairs -> {} groups -> {} results; map {} chunks in {} waves, reduce {} chunks in {} waves, {:.2?}",
            self.records,
            self.intermediate_pairs,
            self.groups,
            self.results,
            self.map.chunks,
            self.map.waves,
            self.reduce.chunks,
            self.reduce.waves,
            self.elapsed
        )
    }
}
