use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::task;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use memgrep::memory::DEFAULT_CHUNK_SIZE;
use memgrep::{
    list_processes, CancelToken, MemoryScanner, Needle, NeedlePolicy, ProcessId, ScanMode,
    ScanOptions,
};

#[derive(Parser)]
#[command(
    name = "memgrep",
    version,
    about = "Search another process's memory for named strings"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List candidate processes, largest resident set first
    List {
        /// Substring filter on command name or pid
        filter: Option<String>,
    },
    /// Scan a process's readable memory for named needles
    Scan {
        /// Target process id
        pid: ProcessId,
        /// Needle as LABEL=PATTERN; repeatable
        #[arg(long = "needle", value_name = "LABEL=PATTERN")]
        needles: Vec<String>,
        /// File of `label --- pattern` lines, one needle per line
        #[arg(long, value_name = "FILE")]
        needles_file: Option<PathBuf>,
        /// Stop the whole scan at the first hit of any needle
        #[arg(long)]
        first: bool,
        /// Report every occurrence per needle instead of one representative
        #[arg(long, conflicts_with = "first")]
        every: bool,
        /// Chunk size in bytes for region reads
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Emit matches as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List { filter } => run_list(filter.as_deref()),
        Command::Scan {
            pid,
            needles,
            needles_file,
            first,
            every,
            chunk_size,
            json,
        } => {
            run_scan(
                pid,
                needles,
                needles_file,
                first,
                every,
                chunk_size,
                json,
            )
            .await
        }
    }
}

fn run_list(filter: Option<&str>) -> Result<()> {
    let processes = list_processes(filter)?;
    for process in &processes {
        println!(
            "{:>8}  {:>9.1} MiB  {}",
            process.pid,
            process.rss_kib as f64 / 1024.0,
            process.name
        );
    }
    if processes.is_empty() {
        info!("no matching processes");
    }
    Ok(())
}

async fn run_scan(
    pid: ProcessId,
    needle_args: Vec<String>,
    needles_file: Option<PathBuf>,
    first: bool,
    every: bool,
    chunk_size: usize,
    json: bool,
) -> Result<()> {
    let mut needles = Vec::new();

    for arg in &needle_args {
        let Some((label, pattern)) = arg.split_once('=') else {
            bail!("--needle expects LABEL=PATTERN, got {arg:?}");
        };
        needles.push(Needle::new(label.trim(), pattern.as_bytes().to_vec())?);
    }

    if let Some(path) = &needles_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read needle file {}", path.display()))?;
        needles.extend(Needle::parse_lines(&text)?);
    }

    if needles.is_empty() {
        bail!("no needles given; use --needle or --needles-file");
    }

    let cancel = CancelToken::new();
    let options = ScanOptions {
        mode: if first {
            ScanMode::FirstMatchOnly
        } else {
            ScanMode::AllMatches
        },
        per_needle: if every {
            NeedlePolicy::EveryMatch
        } else {
            NeedlePolicy::FirstMatch
        },
        chunk_size,
        cancel: Some(cancel.clone()),
    };

    // keep the foreground responsive: the blocking scan runs on a worker
    // thread and Ctrl-C asks it to stop at the next chunk boundary
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing current chunk");
            ctrl_c_token.cancel();
        }
    });

    info!(pid, needles = needles.len(), "scanning");
    let scanner = MemoryScanner::new(options);
    let outcome =
        task::spawn_blocking(move || scanner.scan_process(pid, &needles)).await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.is_empty() {
        println!("Nothing found.");
        return Ok(());
    }

    for found in &outcome {
        println!(
            "{}  |  {}  |  {}",
            found.label,
            found.pattern_display(),
            found.context_lossy()
        );
    }
    Ok(())
}
