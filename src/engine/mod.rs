//! Wave-scheduled map/reduce coordinator
//!
//! A run splits its payload into chunks, dispatches them to workers in waves of
//! at most `max_concurrent_workers` chunks, groups the map output by key and
//! repeats the same cycle over the groups for the reduce phase. Waves are
//! strictly sequential; within a wave results keep dispatch order.

mod chunk_id;
pub mod chunking;
pub mod config;
mod dispatch;
pub mod error;
pub mod grouping;
mod stats;


pub use chunk_id::ChunkIdGenerator;
pub use config::EngineConfig;
pub use dispatch::ChunkDispatcher;
pub use error::{EngineError, EngineResult};
pub use stats::{PhaseStats, RunStats};

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::job::{JobId, Pair};
use crate::store::KeyValueStore;
use crate::worker::{Phase, WorkUnit, WorkerRuntime};
use chunking::next_wave;
use grouping::group_pairs;

pub struct Engine {
    config: EngineConfig,
    dispatcher: ChunkDispatcher,
    runtime_name: &'static str,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn KeyValueStore>,
        runtime: Arc<dyn WorkerRuntime>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let runtime_name = runtime.name();
        let dispatcher =
            ChunkDispatcher::new(store, runtime, config.namespace.clone(), config.chunk_timeout);
        Ok(Self {
            config,
            dispatcher,
            runtime_name,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `job_id` over `payload` and return the reduced pairs
    pub async fn run(&self, job_id: JobId, payload: Vec<Value>) -> EngineResult<Vec<Pair>> {
        let (results, _) = self.run_with_stats(job_id, payload).await?;
        Ok(results)
    }

    /// Like [`Engine::run`], also reporting how the work was split
    #[instrument(skip(self, payload), fields(job = %job_id, records = payload.len()))]
    pub async fn run_with_stats(
        &self,
        job_id: JobId,
        payload: Vec<Value>,
    ) -> EngineResult<(Vec<Pair>, RunStats)> {
        let started = Instant::now();
        let mut stats = RunStats {
            records: payload.len(),
            ..Default::default()
        };

        if payload.is_empty() {
            info!("Empty payload, nothing to dispatch");
            return Ok((Vec::new(), stats));
        }

        let ids = ChunkIdGenerator::new();
        info!(
            "Starting run {} on {} runtime (chunk size {}, {} workers per wave)",
            ids.run_token(),
            self.runtime_name,
            self.config.chunk_size,
            self.config.max_concurrent_workers
        );

        let pairs = self
            .run_phase(job_id, Phase::Map, payload, &ids, &mut stats.map)
            .await?;
        stats.intermediate_pairs = pairs.len();

        let groups = group_pairs(pairs);
        stats.groups = groups.len();
        debug!("Grouped {} pairs into {} groups", stats.intermediate_pairs, stats.groups);

        let results = self
            .run_phase(job_id, Phase::Reduce, groups, &ids, &mut stats.reduce)
            .await?;
        stats.results = results.len();
        stats.elapsed = started.elapsed();

        info!("Run {} finished: {}", ids.run_token(), stats);
        Ok((results, stats))
    }

    async fn run_phase<T>(
        &self,
        job_id: JobId,
        phase: Phase,
        elements: Vec<T>,
        ids: &ChunkIdGenerator,
        stats: &mut PhaseStats,
    ) -> EngineResult<Vec<Pair>>
    where
        T: Serialize + Send + Sync,
    {
        let mut remaining: VecDeque<T> = elements.into();
        let mut collected = Vec::with_capacity(remaining.len());

        loop {
            let wave = next_wave(
                &mut remaining,
                self.config.chunk_size,
                self.config.max_concurrent_workers,
            );
            if wave.is_empty() {
                break;
            }

            stats.waves += 1;
            stats.chunks += wave.len();
            info!(
                "{} wave {}: {} chunks, {} elements left",
                phase,
                stats.waves,
                wave.len(),
                remaining.len()
            );

            let dispatches = wave.iter().map(|chunk| {
                let unit = WorkUnit::new(job_id, ids.next_id(), phase);
                async move { self.dispatcher.operate(&unit, chunk).await }
            });

            // join_all yields in input order, so results follow dispatch order.
            for outcome in join_all(dispatches).await {
                collected.extend(outcome?);
            }
        }

        Ok(collected)
    }
}
