use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use mapreduce_server::app::{handle_fatal_error, init_logging, App, LogConfig, ProcessRole};
use mapreduce_server::config::load_settings;
use mapreduce_server::job::{JobId, JobRegistry};
use mapreduce_server::server;
use mapreduce_server::worker::{run_worker, ChunkId, Phase, WorkUnit};

/// Wave-scheduled map/reduce over JSON record batches
#[derive(Parser)]
#[command(name = "mapreduce-server", version)]
#[command(about = "Run map/reduce jobs over JSON batches with process-isolated workers", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one POST endpoint per registered job
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a single job over a JSON array and print the shaped output
    Run {
        /// Job id or name
        #[arg(short, long)]
        job: String,

        /// File holding the JSON array of records (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print a summary of the run to stderr
        #[arg(long)]
        stats: bool,
    },
    /// List registered jobs
    Jobs,
    /// Execute one chunk (spawned by the coordinator)
    #[command(hide = true)]
    Worker {
        #[command(subcommand)]
        role: WorkerRole,
    },
}

#[derive(Subcommand)]
enum WorkerRole {
    /// Apply the job's mapper to a stored chunk
    Mapper { job_id: JobId, chunk_id: ChunkId },
    /// Apply the job's reducer to a stored chunk
    Reducer { job_id: JobId, chunk_id: ChunkId },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let role = match cli.command {
        Commands::Worker { .. } => ProcessRole::Worker,
        _ => ProcessRole::Coordinator,
    };
    init_logging(&LogConfig::new(cli.verbose, role));

    let verbose = cli.verbose;
    if let Err(e) = run(cli).await {
        handle_fatal_error(e, verbose);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Serve { host, port } => run_serve(config, host, port).await,
        Commands::Run { job, input, stats } => run_job(config, &job, input, stats).await,
        Commands::Jobs => {
            list_jobs(&JobRegistry::with_builtin_jobs());
            Ok(())
        }
        Commands::Worker { role } => {
            let unit = match role {
                WorkerRole::Mapper { job_id, chunk_id } => {
                    WorkUnit::new(job_id, chunk_id, Phase::Map)
                }
                WorkerRole::Reducer { job_id, chunk_id } => {
                    WorkUnit::new(job_id, chunk_id, Phase::Reduce)
                }
            };
            run_worker_command(config, unit).await
        }
    }
}

async fn run_serve(config: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut loaded = load_settings(config).await?;
    if let Some(host) = host {
        loaded.settings.server.host = host;
    }
    if let Some(port) = port {
        loaded.settings.server.port = port;
    }

    let addr = format!(
        "{}:{}",
        loaded.settings.server.host, loaded.settings.server.port
    );
    let app = App::build(loaded, JobRegistry::with_builtin_jobs()).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::serve(listener, app.state(), shutdown_signal()).await
}

async fn run_job(config: Option<&Path>, job: &str, input: Option<PathBuf>, stats: bool) -> Result<()> {
    let loaded = load_settings(config).await?;
    let app = App::build(loaded, JobRegistry::with_builtin_jobs()).await?;
    let job = app.registry.find(job)?;

    let raw = match &input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            raw
        }
    };
    let payload: Vec<Value> =
        serde_json::from_str(&raw).context("Input must be a JSON array of records")?;

    let (results, run_stats) = app.engine.run_with_stats(job.id, payload).await?;
    if stats {
        eprintln!("{run_stats}");
    }

    println!("{}", serde_json::to_string_pretty(&job.shape_output(results))?);
    Ok(())
}

fn list_jobs(registry: &JobRegistry) {
    for job in registry.iter() {
        println!("{}\t{}\tPOST {}", job.id, job.name, job.endpoint);
    }
}

async fn run_worker_command(config: Option<&Path>, unit: WorkUnit) -> Result<()> {
    debug!("Worker started for {}", unit);
    let loaded = load_settings(config).await?;
    let settings = &loaded.settings;

    run_worker(
        &settings.store,
        &settings.engine.namespace,
        Arc::new(JobRegistry::with_builtin_jobs()),
        unit,
    )
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
