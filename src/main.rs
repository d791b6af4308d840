//! uniqhash CLI
//!
//! A command-line front end for the unique hash generator.
//!
//! # Commands
//!
//! - `generate` - Print unique hashes
//! - `digest` - Hash text or stdin with the configured algorithm
//! - `stream` - Emit hashes over time with the background sweeper running
//! - `benchmark` - Generate concurrently from several threads and check uniqueness
//! - `init-config` - Write the default configuration file

use clap::{Parser, Subcommand};
use log::{debug, info};
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use uniqhash::config::{default_config_path, AppConfig, ConfigOverrides};
use uniqhash::{spawn_sweeper, DigestAlgorithm};

#[derive(Parser)]
#[command(name = "uniqhash")]
#[command(author = "lordly")]
#[command(version = "0.1.0")]
#[command(about = "Collision-avoiding unique hash generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom config file path (default: ~/.uniqhash/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Digest algorithm: sha256 or blake3
    #[arg(long, global = true)]
    algorithm: Option<DigestAlgorithm>,

    /// Uniqueness window in milliseconds
    #[arg(long, global = true)]
    window_ms: Option<u64>,

    /// Random suffix is drawn from [0, RANDOM_BOUND)
    #[arg(long, global = true)]
    random_bound: Option<u32>,

    /// Retry cap per hash (0 disables the cap)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print unique hashes
    Generate {
        /// Number of hashes to print
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Also print the token each hash was derived from
        #[arg(long)]
        raw: bool,
    },

    /// Hash text (or stdin) with the configured algorithm
    Digest {
        /// Text to hash (reads stdin if omitted)
        text: Option<String>,

        /// Treat the input as hex-encoded bytes
        #[arg(long)]
        hex: bool,
    },

    /// Emit hashes over time with the background sweeper running
    Stream {
        /// Number of hashes to emit
        #[arg(short = 'n', long, default_value = "10")]
        count: u32,

        /// Delay between hashes in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },

    /// Generate from several threads sharing one generator
    Benchmark {
        /// Total number of hashes to compute
        #[arg(short = 'n', long, default_value = "10000")]
        count: u32,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Generate { count, raw } => cmd_generate(&cli, *count, *raw),
        Commands::Digest { text, hex } => cmd_digest(&cli, text.clone(), *hex),
        Commands::Stream { count, interval_ms } => cmd_stream(&cli, *count, *interval_ms),
        Commands::Benchmark { count, threads } => cmd_benchmark(&cli, *count, *threads),
        Commands::InitConfig { force } => cmd_init_config(cli.config.clone(), *force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; RUST_LOG takes precedence over -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file (if any) and apply command-line overrides
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            AppConfig::load_from_file(path)?
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                info!("Loading config from {}", path.display());
                AppConfig::load_from_file(&path)?
            } else {
                debug!("No config file at {}, using defaults", path.display());
                AppConfig::default()
            }
        }
    };

    config.apply_overrides(&ConfigOverrides {
        algorithm: cli.algorithm,
        window_ms: cli.window_ms,
        random_bound: cli.random_bound,
        max_attempts: cli.max_attempts,
    })?;
    Ok(config)
}

fn cmd_generate(cli: &Cli, count: u32, raw: bool) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let generator = config.build_generator()?;

    for _ in 0..count {
        if raw {
            let token = generator.issue_token()?;
            println!("{}  {}", config.algorithm.digest_hex(&token), token);
        } else {
            println!("{}", generator.generate()?);
        }
    }

    Ok(())
}

fn cmd_digest(cli: &Cli, text: Option<String>, hex_input: bool) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    let input = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let bytes = if hex_input {
        hex::decode(input.trim()).map_err(|e| anyhow::anyhow!("Invalid hex input: {}", e))?
    } else {
        input.into_bytes()
    };

    println!("{}", config.algorithm.digest_hex(&bytes));
    Ok(())
}

fn cmd_stream(cli: &Cli, count: u32, interval_ms: u64) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let generator = Arc::new(config.build_generator()?);

    println!("=== uniqhash stream ===");
    println!("Algorithm: {}", config.algorithm);
    println!("Window:    {} ms", config.generator.window_ms);
    println!("Sweep:     every {} ms", config.sweep_interval_ms);
    println!("=======================\n");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let sweeper = spawn_sweeper(&generator, config.sweep_interval());
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));

        for _ in 0..count {
            ticker.tick().await;
            let hash = generator.generate()?;
            println!("{}  (held tokens: {})", hash, generator.held_count());
        }

        sweeper.abort();
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}

fn cmd_benchmark(cli: &Cli, count: u32, threads: Option<usize>) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let generator = Arc::new(config.build_generator()?);
    let num_threads = threads.unwrap_or_else(num_cpus::get).max(1);

    println!(
        "Running benchmark with {} hashes on {} threads...",
        count, num_threads
    );

    let total_hashes = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    // Spread `count` as evenly as possible across threads
    let mut handles = Vec::with_capacity(num_threads);
    for thread_id in 0..num_threads {
        let remainder = usize::from(thread_id < count as usize % num_threads);
        let share = count as usize / num_threads + remainder;
        let generator = Arc::clone(&generator);
        let total_hashes = Arc::clone(&total_hashes);

        let handle = std::thread::spawn(move || -> uniqhash::algorithm::Result<Vec<String>> {
            let mut hashes = Vec::with_capacity(share);
            for _ in 0..share {
                hashes.push(generator.generate()?);
                total_hashes.fetch_add(1, Ordering::Relaxed);
            }
            Ok(hashes)
        });
        handles.push(handle);
    }

    let mut unique = HashSet::with_capacity(count as usize);
    let mut duplicates = 0u64;
    for handle in handles {
        let hashes = handle
            .join()
            .map_err(|_| anyhow::anyhow!("Benchmark thread panicked"))??;
        for hash in hashes {
            if !unique.insert(hash) {
                duplicates += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    let hashes = total_hashes.load(Ordering::Relaxed);
    let hashrate = hashes as f64 / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Total hashes: {}", hashes);
    println!("  Unique:       {}", unique.len());
    println!("  Duplicates:   {}", duplicates);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate:     {:.2} H/s", hashrate);
    println!("  Held tokens:  {}", generator.held_count());

    println!("\nGenerator parameters:");
    println!("  Algorithm:    {}", config.algorithm);
    println!("  Window:       {} ms", config.generator.window_ms);
    println!("  Random bound: {}", config.generator.random_bound);
    match config.generator.max_attempts {
        Some(max) => println!("  Max attempts: {}", max),
        None => println!("  Max attempts: unbounded"),
    }

    if duplicates > 0 {
        anyhow::bail!("{} duplicate hashes within the window", duplicates);
    }

    Ok(())
}

fn cmd_init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(default_config_path);

    let config = AppConfig::write_default(&path, force)?;

    println!("Config written to {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
