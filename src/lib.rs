//! # mapreduce-server
//!
//! Wave-scheduled map/reduce over batches of JSON records.
//!
//! A run splits its payload into bounded chunks and hands each chunk to an
//! isolated worker. Workers exchange data with the coordinator only through a
//! shared key-value store and announce completion with a single
//! `"<jobId>:<chunkId> COMPLETE"` line.
//!
//! ## Modules
//!
//! - `app` - Component assembly, logging setup and fatal error reporting
//! - `config` - TOML configuration with environment overrides
//! - `engine` - The coordinator: chunking, wave dispatch, grouping
//! - `job` - Job descriptors, built-in jobs and the job registry
//! - `server` - HTTP routes, one per registered job
//! - `store` - Shared key-value store trait and backends
//! - `subprocess` - Child process spawning and stdout streaming
//! - `worker` - Worker protocol, chunk execution and worker runtimes
pub mod app;
pub mod config;
pub mod engine;
pub mod job;
pub mod server;
pub mod store;
pub mod subprocess;
pub mod worker;
