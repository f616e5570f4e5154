use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use kmpbench::{
    config::{BenchConfig, CliOverrides},
    coverage::CoverageVector,
    distributed::{
        rank_label, run_coordinator, run_in_threads, run_striped, run_worker, DistributedMode,
        PipeEndpoint, ProcessGroup, World, DISTRIBUTED_LABEL,
    },
    report::{rank_output_path, Reporter},
    results::RunReport,
    runner::run_local,
};
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    process::Command,
    time::Instant,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
struct BatchArgs {
    /// Number of (pattern, text) test cases
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Characters per pattern
    #[arg(long)]
    pattern_length: Option<usize>,

    /// Characters per text
    #[arg(long)]
    text_length: Option<usize>,

    /// Seed for the test case generator
    #[arg(long)]
    seed: Option<u64>,

    /// Write records to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Transport {
    /// One operating system process per rank
    Processes,
    /// One thread per rank inside this process
    Threads,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sequential and shared-memory strategies one after the other
    Local {
        #[command(flatten)]
        batch: BatchArgs,

        /// Number of threads in the shared-memory pool
        #[arg(short = 'j', long)]
        threads: Option<NonZeroUsize>,
    },

    /// Run the distributed strategy as rank 0 of a group of `size` ranks
    Distributed {
        /// Total number of ranks, including this process
        #[arg(short = 's', long)]
        size: usize,

        /// How ranks aggregate their work (simple|coordinator)
        #[arg(short, long, default_value = "simple")]
        mode: DistributedMode,

        /// How ranks are hosted
        #[arg(short, long, value_enum, default_value = "processes")]
        transport: Transport,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Worker rank of a distributed run, started by `distributed`
    #[command(hide = true)]
    Worker {
        #[arg(long)]
        rank: usize,

        #[arg(long)]
        size: usize,

        #[arg(long)]
        mode: DistributedMode,

        #[command(flatten)]
        batch: BatchArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (batch_args, threads) = match &cli.command {
        Commands::Local { batch, threads } => (batch.clone(), *threads),
        Commands::Distributed { batch, .. } | Commands::Worker { batch, .. } => {
            (batch.clone(), None)
        }
    };
    let config = BenchConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(CliOverrides {
            test_count: batch_args.count,
            pattern_length: batch_args.pattern_length,
            text_length: batch_args.text_length,
            seed: batch_args.seed,
            thread_count: threads,
            output: batch_args.output,
            log_level: cli.log_level.clone(),
        });

    init_logging(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Local { .. } => local(&config),
        Commands::Distributed {
            size,
            mode,
            transport: Transport::Processes,
            ..
        } => distributed_processes(&config, size, mode),
        Commands::Distributed {
            size,
            mode,
            transport: Transport::Threads,
            ..
        } => distributed_threads(&config, size, mode),
        Commands::Worker {
            rank, size, mode, ..
        } => worker(&config, rank, size, mode),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Logs must stay off stdout: workers use it as their message pipe
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn local(config: &BenchConfig) -> Result<()> {
    let batch = config.generate_batch();
    let reports = run_local(&batch, config.thread_count)?;
    write_reports(config.output.as_deref(), &reports)
}

fn distributed_threads(config: &BenchConfig, size: usize, mode: DistributedMode) -> Result<()> {
    let batch = config.generate_batch();
    let outcome = run_in_threads(&batch, size, mode)?;

    let mut reports = match mode {
        DistributedMode::Simple => outcome.ranks,
        DistributedMode::Coordinator => Vec::new(),
    };
    reports.push(outcome.total);
    write_reports(config.output.as_deref(), &reports)
}

/// Rank 0 of a multi-process run: spawns ranks `1..size` and then does its own share.
fn distributed_processes(config: &BenchConfig, size: usize, mode: DistributedMode) -> Result<()> {
    let world = World::init(0, size)?;
    world.position().require(mode)?;

    let exe = std::env::current_exe().context("cannot locate own executable")?;
    let batch = config.generate_batch();

    let start = Instant::now();
    let mut group = ProcessGroup::launch(size, mode, |rank| {
        worker_command(&exe, config, rank, size, mode)
    })?;

    match mode {
        DistributedMode::Simple => {
            let coverage = CoverageVector::new(batch.len());
            let report = run_striped(&batch, world.position(), &coverage);
            group.finish()?;
            let output = config.output.as_deref().map(|p| rank_output_path(p, 0));
            write_reports(output.as_deref(), &[report])
        }
        DistributedMode::Coordinator => {
            let mut report = run_coordinator(&mut group, batch.len())?;
            group.finish()?;
            report.label = DISTRIBUTED_LABEL.to_string();
            report.elapsed = start.elapsed();
            write_reports(config.output.as_deref(), &[report])
        }
    }
}

fn worker_command(
    exe: &Path,
    config: &BenchConfig,
    rank: usize,
    size: usize,
    mode: DistributedMode,
) -> Command {
    let mut command = Command::new(exe);
    command
        .arg("--log-level")
        .arg(&config.log_level)
        .arg("worker")
        .args(["--rank", &rank.to_string()])
        .args(["--size", &size.to_string()])
        .args(["--mode", &mode.to_string()])
        .args(["--count", &config.test_count.to_string()])
        .args(["--pattern-length", &config.pattern_length.to_string()])
        .args(["--text-length", &config.text_length.to_string()])
        .args(["--seed", &config.seed.to_string()]);
    if let Some(output) = &config.output {
        command.arg("--output").arg(rank_output_path(output, rank));
    }
    command
}

fn worker(config: &BenchConfig, rank: usize, size: usize, mode: DistributedMode) -> Result<()> {
    let world = World::init(rank, size)?;
    let batch = config.generate_batch();
    let coverage = CoverageVector::new(batch.len());

    match mode {
        DistributedMode::Simple => {
            let report = run_striped(&batch, world.position(), &coverage);
            // the launcher already suffixed the output path for this rank
            write_reports(config.output.as_deref(), &[report])
        }
        DistributedMode::Coordinator => {
            let mut endpoint = PipeEndpoint::stdout();
            let report = run_worker(&batch, world.position(), &mut endpoint, &coverage)?;
            info!(
                "{} processed {} test cases, {} matches",
                rank_label(rank),
                report.cases,
                report.matches
            );
            Ok(())
        }
    }
}

fn write_reports(output: Option<&Path>, reports: &[RunReport]) -> Result<()> {
    let mut reporter = Reporter::open(output)?;
    for report in reports {
        reporter.record(report)?;
    }

    if let Some(path) = output {
        for report in reports {
            eprintln!(
                "{} {} matches in {} ms",
                format!("{}:", report.label).blue(),
                report.matches.to_string().green(),
                report.elapsed_ms()
            );
        }
        eprintln!("Results written to {}", path.display());
    }
    Ok(())
}
