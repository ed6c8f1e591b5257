//! Lyra2 Miner CLI
//!
//! # Commands
//!
//! - `hash` - Hash a password/salt pair with explicit or preset costs
//! - `scan` - Search a block header's nonce space for a share
//! - `benchmark` - Run performance benchmark

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use lyra2::algorithm::{BLOCK_LEN_BYTES, InputStride};
use lyra2::scan::{scan_parallel, ScanConfig, ScanControl, Share, Work, HEADER_NONCE_OFFSET};
use lyra2::{Lyra2, Params, Target};

#[derive(Parser)]
#[command(name = "lyra2")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Lyra2REv2 / Lyra2RE proof-of-work hashing and nonce scanning")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password and salt
    Hash {
        /// Password (UTF-8, or hex with --hex)
        password: String,

        /// Salt (defaults to the password, as in proof-of-work use)
        #[arg(long)]
        salt: Option<String>,

        /// Read password and salt as hex
        #[arg(long)]
        hex: bool,

        /// Output length in bytes
        #[arg(short, long, default_value = "32")]
        length: usize,

        #[command(flatten)]
        cost: CostArgs,
    },

    /// Scan a block header for a nonce meeting the target
    Scan {
        /// Block header in hex
        header: String,

        /// Byte offset of the little-endian u32 nonce
        #[arg(long, default_value_t = HEADER_NONCE_OFFSET)]
        nonce_offset: usize,

        /// Required leading zero bits of the little-endian hash
        #[arg(short, long, default_value = "16", conflicts_with = "nbits")]
        difficulty: u32,

        /// Compact target in hex (e.g. 1d00ffff)
        #[arg(long)]
        nbits: Option<String>,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,

        #[command(flatten)]
        cost: CostArgs,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of hashes to compute
        #[arg(short, long, default_value = "1000")]
        count: u32,

        #[command(flatten)]
        cost: CostArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Lyra2rev2,
    Lyra2re,
}

/// Cost parameters shared by every command
#[derive(Args)]
struct CostArgs {
    /// Named parameter set (overrides the explicit costs)
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Wandering passes
    #[arg(short = 'T', long, default_value = "1")]
    time_cost: u64,

    /// Matrix rows (power of two, at least 4)
    #[arg(short, long, default_value = "4")]
    rows: usize,

    /// Blocks per row
    #[arg(short = 'C', long, default_value = "4")]
    cols: usize,

    /// Read input blocks with the first-generation Lyra2RE stride
    #[arg(long)]
    legacy_stride: bool,
}

impl CostArgs {
    fn params(&self) -> Params {
        match self.preset {
            Some(Preset::Lyra2rev2) => Params::LYRA2REV2,
            Some(Preset::Lyra2re) => Params::LYRA2RE,
            None => {
                let stride = if self.legacy_stride {
                    InputStride::Legacy
                } else {
                    InputStride::Packed
                };
                Params::new(self.time_cost, self.rows, self.cols).with_input_stride(stride)
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Hash {
            password,
            salt,
            hex,
            length,
            cost,
        } => cmd_hash(&password, salt.as_deref(), hex, length, cost.params(), cli.json),
        Commands::Scan {
            header,
            nonce_offset,
            difficulty,
            nbits,
            threads,
            cost,
        } => cmd_scan(
            &header,
            nonce_offset,
            difficulty,
            nbits.as_deref(),
            threads,
            cost.params(),
            cli.json,
        ),
        Commands::Benchmark { count, cost } => cmd_benchmark(count, cost.params(), cli.json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn decode_input(value: &str, is_hex: bool) -> anyhow::Result<Vec<u8>> {
    if is_hex {
        hex::decode(value).with_context(|| format!("invalid hex input '{}'", value))
    } else {
        Ok(value.as_bytes().to_vec())
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct HashReport {
    params: Params,
    output_len: usize,
    hash: String,
}

fn cmd_hash(
    password: &str,
    salt: Option<&str>,
    is_hex: bool,
    length: usize,
    params: Params,
    json: bool,
) -> anyhow::Result<()> {
    let password = decode_input(password, is_hex)?;
    let salt = match salt {
        Some(salt) => decode_input(salt, is_hex)?,
        None => password.clone(),
    };

    let mut ctx = Lyra2::new(params)?;
    let mut out = vec![0u8; length];
    ctx.hash_into(&mut out, &password, &salt)?;

    if json {
        return print_json(&HashReport {
            params,
            output_len: length,
            hash: hex::encode(&out),
        });
    }
    println!("{}", hex::encode(&out));
    Ok(())
}

#[derive(Serialize)]
struct ScanReport {
    params: Params,
    target: String,
    threads: usize,
    found: bool,
    nonce: Option<u32>,
    hash: Option<String>,
    hashes: u64,
    seconds: f64,
}

#[allow(clippy::too_many_arguments)]
fn cmd_scan(
    header_hex: &str,
    nonce_offset: usize,
    difficulty: u32,
    nbits: Option<&str>,
    threads: Option<usize>,
    params: Params,
    json: bool,
) -> anyhow::Result<()> {
    let header = hex::decode(header_hex).context("invalid header hex")?;
    let target = match nbits {
        Some(nbits) => {
            let nbits = u32::from_str_radix(nbits.trim_start_matches("0x"), 16)
                .with_context(|| format!("invalid nbits '{}'", nbits))?;
            Target::from_compact(nbits)?
        }
        None => Target::from_difficulty_bits(difficulty),
    };
    let work = Work::new(header, nonce_offset, target)?;
    let config = ScanConfig {
        params,
        threads: threads.unwrap_or_else(num_cpus::get),
    };

    if !json {
        println!("\n=== Lyra2 Scanner ===");
        println!(
            "Params:  t={} rows={} cols={} stride={:?}",
            params.time_cost, params.rows, params.cols, params.input_stride
        );
        println!("Target:  {}", work.target());
        println!("Threads: {}", config.threads);
        println!("=====================\n");
    }

    let control = ScanControl::new();
    let start = Instant::now();

    let found = thread::scope(|scope| {
        let scanner = scope.spawn(|| scan_parallel(&work, &config, &control));

        // Monitor progress while the workers run
        let mut last_report = Instant::now();
        while !scanner.is_finished() {
            thread::sleep(Duration::from_millis(100));
            if json || last_report.elapsed() < Duration::from_secs(2) {
                continue;
            }
            last_report = Instant::now();

            let hashes = control.hashes();
            let elapsed = start.elapsed().as_secs_f64();
            print!(
                "\rHashrate: {:.0} H/s | Hashes: {} | Time: {:.0}s",
                hashes as f64 / elapsed,
                hashes,
                elapsed
            );
            std::io::stdout().flush().ok();
        }

        scanner
            .join()
            .map_err(|_| anyhow::anyhow!("scan thread panicked"))
    })??;

    let hashes = control.hashes();
    let elapsed = start.elapsed().as_secs_f64();

    if json {
        return print_json(&ScanReport {
            params,
            target: work.target().to_string(),
            threads: config.threads,
            found: found.is_some(),
            nonce: found.map(|share| share.nonce),
            hash: found.map(|share| hex::encode(share.hash)),
            hashes,
            seconds: elapsed,
        });
    }

    match found {
        Some(Share { nonce, hash }) => {
            println!("\n\nFound share!");
            println!("  Nonce:  {} ({:#010x})", nonce, nonce);
            println!("  Hash:   {}", hex::encode(hash));
            println!("  Hashes: {} ({:.0} H/s)", hashes, hashes as f64 / elapsed);
        }
        None => {
            println!("\n\nNonce space exhausted after {} hashes", hashes);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct BenchmarkReport {
    params: Params,
    matrix_bytes: usize,
    hashes: u32,
    seconds: f64,
    hashrate: f64,
}

fn cmd_benchmark(count: u32, params: Params, json: bool) -> anyhow::Result<()> {
    let matrix_bytes = params.matrix_bytes().context("matrix size overflows")?;
    let mut ctx = Lyra2::new(params)?;
    let mut header = [0u8; 80];
    let mut out = [0u8; 32];

    if !json {
        println!("Running benchmark with {} hashes...", count);
    }

    let start = Instant::now();
    for i in 0..count {
        header[HEADER_NONCE_OFFSET..].copy_from_slice(&i.to_le_bytes());
        ctx.hash_into(&mut out, &header, &header)?;
    }
    let elapsed = start.elapsed().as_secs_f64();
    let hashrate = count as f64 / elapsed;

    if json {
        return print_json(&BenchmarkReport {
            params,
            matrix_bytes,
            hashes: count,
            seconds: elapsed,
            hashrate,
        });
    }

    println!("\nResults:");
    println!("  Total hashes: {}", count);
    println!("  Time elapsed: {:.2}s", elapsed);
    println!("  Hashrate: {:.2} H/s", hashrate);

    println!("\nAlgorithm parameters:");
    println!("  Time cost: {}", params.time_cost);
    println!(
        "  Matrix: {} x {} blocks of {} bytes",
        params.rows, params.cols, BLOCK_LEN_BYTES
    );
    println!("  Memory: {} KB", matrix_bytes / 1024);
    println!("  Input stride: {:?}", params.input_stride);

    Ok(())
}
