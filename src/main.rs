use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use unlock_bench::{Benchmark, Config, RunReport};

/// Sweep a provider across a concurrency ladder and report per-attempt results
#[derive(Parser, Debug)]
#[command(name = "unlock-bench", version, about)]
struct Cli {
    /// JSON configuration file (provider, ladder, datasets, thresholds)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target list to benchmark; repeatable, replaces the configured datasets
    #[arg(short, long = "dataset")]
    datasets: Vec<PathBuf>,

    /// Concurrency ladder, e.g. 1,5,10,20
    #[arg(short, long, value_delimiter = ',')]
    ladder: Option<Vec<usize>>,

    /// Parent directory for results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Keep undersized bodies on disk for inspection
    #[arg(long)]
    keep_soft_blocks: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Credentials referenced by `password_env` / `auth_env` may live in .env
    dotenvy::dotenv().ok();

    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install log subscriber: {e}");
    }

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let bench = match Benchmark::new(config) {
        Ok(bench) => bench,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("unlock-bench");
    println!("============");
    println!("Provider: {}", bench.provider_name());
    println!("Ladder:   {:?}", bench.config().sweep.ladder);
    println!("Output:   {}", bench.run_root().display());
    println!();

    match bench.run_all().await {
        Ok(reports) => {
            for report in &reports {
                print_summary(report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> unlock_bench::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if !cli.datasets.is_empty() {
        config.datasets = cli.datasets.clone();
    }
    if let Some(ladder) = &cli.ladder {
        config.sweep.ladder = ladder.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if cli.keep_soft_blocks {
        config.sweep.keep_soft_block_artifacts = true;
    }

    if config.datasets.is_empty() {
        return Err(unlock_bench::Error::config(
            "datasets",
            "no datasets configured; pass --dataset or list them in the config file",
        ));
    }
    Ok(config)
}

fn print_summary(report: &RunReport) {
    println!("Dataset: {}", report.dataset);
    println!(
        "{:>6} {:>7} {:>8} {:>6} {:>8} {:>9} {:>10} {:>9}",
        "level", "tasks", "success", "soft", "failed", "rate", "mean (s)", "wall (s)"
    );
    for level in &report.levels {
        println!(
            "{:>6} {:>7} {:>8} {:>6} {:>8} {:>8.1}% {:>10.2} {:>9.2}",
            level.level,
            level.tasks,
            level.successes,
            level.soft_blocks,
            level.failures,
            level.success_rate * 100.0,
            level.mean_elapsed_seconds,
            level.wall_seconds
        );
    }
    println!();
}
