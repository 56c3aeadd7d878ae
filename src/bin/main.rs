//! CLI tool for gpu-bench (gbench)

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};

use gbenchlib::config::Timezone;
use gbenchlib::error::BenchError;
use gbenchlib::record::{BenchmarkRecord, BenchmarkWriter};
use gbenchlib::{aggregate, provider, status, supervisor};

#[derive(Parser)]
#[command(name = "gbench")]
#[command(
    about = "Sample GPU load and VRAM while running any command and persist JSON benchmark records",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command under GPU sampling and write a benchmark record
    Run {
        /// Label for this benchmark
        #[arg(short, long)]
        label: String,

        /// Directory where benchmark JSON files are written
        #[arg(short, long, default_value = "benchmarks")]
        output_dir: PathBuf,

        /// GPU sampling interval in seconds
        #[arg(short, long, default_value_t = 0.5)]
        interval: f64,

        /// Extra metadata key=val (repeatable)
        #[arg(short, long)]
        extra: Vec<String>,

        /// Skip command execution and GPU sampling while still writing a benchmark record
        #[arg(long)]
        dry_run: bool,

        /// Command and args to execute (use -- to separate)
        #[arg(required = true, trailing_var_arg = true)]
        cmd: Vec<String>,
    },
    /// Summarize recent benchmark records
    Status {
        /// Directory containing benchmark JSON files
        #[arg(long, default_value = "benchmarks")]
        dir: PathBuf,

        /// Max records to show (newest first)
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            label,
            output_dir,
            interval,
            extra,
            dry_run,
            cmd,
        } => handle_run(&label, &output_dir, interval, &extra, dry_run, &cmd),
        Commands::Status { dir, limit } => handle_status(&dir, limit),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(exit_code(&e));
    }
}

/// Map an error to the scripting-facing exit code: launch and write
/// failures stay distinguishable, interrupts use the conventional 130.
fn exit_code(err: &BenchError) -> i32 {
    match err {
        BenchError::Launch { .. } => 2,
        BenchError::Write { .. } => 3,
        BenchError::Interrupted => 130,
        _ => 1,
    }
}

fn handle_run(
    label: &str,
    output_dir: &Path,
    interval: f64,
    extra_args: &[String],
    dry_run: bool,
    cmd: &[String],
) -> Result<(), BenchError> {
    let timezone = Timezone::from_env();
    let writer = BenchmarkWriter::new(output_dir, timezone);
    let mut extra = parse_extra(extra_args);

    if dry_run {
        extra.insert("dry_run".to_string(), Value::Bool(true));
        let record = BenchmarkRecord::new(label, cmd, 0.0, Some(0.0), None, extra, timezone);
        let path = writer.write(&record)?;
        println!("{} {}", "[gbench] wrote:".green(), path.display());
        return Ok(());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let outcome = supervisor::run(cmd, interval, provider::detect(), &cancel)?;

    let gpu_stats = aggregate(&outcome.samples, outcome.provider, interval);
    extra.insert(
        "exit_code".to_string(),
        outcome.exit_code.map(Value::from).unwrap_or(Value::Null),
    );

    let record = BenchmarkRecord::new(
        label,
        cmd,
        outcome.elapsed_seconds,
        None,
        gpu_stats,
        extra,
        timezone,
    );
    let path = writer.write(&record)?;
    println!("{} {}", "[gbench] wrote:".green(), path.display());
    Ok(())
}

fn handle_status(dir: &Path, limit: usize) -> Result<(), BenchError> {
    let entries = status::latest_records(dir, limit)?;
    if entries.is_empty() {
        println!("{}", "No records found.".yellow());
        return Ok(());
    }

    for entry in entries {
        let name = entry
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("?");
        match entry.record {
            Ok(record) => {
                let gpu = match record.gpu_stats.as_ref() {
                    Some(stats) => format!(
                        "avg={:.2}% max={:.2}%",
                        stats.avg_gpu_load_percent, stats.max_gpu_load_percent
                    ),
                    None => "no GPU data".to_string(),
                };
                println!(
                    "- {} | label={} total={:.2}s {}",
                    name.cyan(),
                    record.label.white().bold(),
                    record.total_time_seconds,
                    gpu
                );
            }
            Err(e) => {
                println!(
                    "- {} ({})",
                    name.cyan(),
                    format!("failed to parse: {}", e).red()
                );
            }
        }
    }
    Ok(())
}

/// Parse repeatable `key=val` metadata arguments; a token without `=` is
/// warned about and skipped.
fn parse_extra(args: &[String]) -> Map<String, Value> {
    let mut map = Map::new();
    for kv in args {
        match kv.split_once('=') {
            Some((key, value)) => {
                map.insert(key.to_string(), Value::String(value.to_string()));
            }
            None => {
                eprintln!(
                    "{} ignoring extra '{}', expected key=val",
                    "[warn]".yellow(),
                    kv
                );
            }
        }
    }
    map
}
