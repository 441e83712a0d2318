// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS Line Protocol CLI
//!
//! Convert JSON records into InfluxDB Line Protocol using a YAML schema.
//!
//! # Usage
//!
//! ```bash
//! # One JSON object per input line, one Line Protocol row per output line
//! hdds-lp encode --schema stats.yaml --input samples.jsonl
//!
//! # Read from stdin, keep going past bad records
//! tail -f samples.jsonl | hdds-lp encode --schema stats.yaml --skip-errors
//!
//! # Check a schema file
//! hdds-lp check --schema stats.yaml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hdds_influx_line::mapping::JsonRecord;
use hdds_influx_line::{LineProtocol, RecordSchema};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "hdds-lp")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert JSON records to InfluxDB Line Protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON records (one object per line)
    Encode {
        /// YAML record schema
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,

        /// Input file (use - for stdin)
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        input: PathBuf,

        /// Log and skip records that fail to encode
        #[arg(long)]
        skip_errors: bool,
    },

    /// Parse and validate a YAML record schema
    Check {
        /// YAML record schema
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,
    },
}

/// Counters reported after an `encode` run.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    written: u64,
    skipped: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries Line Protocol.
    let filter = if cli.verbose {
        EnvFilter::new("hdds_lp=debug,hdds_influx_line=debug")
    } else {
        EnvFilter::new("hdds_lp=info,hdds_influx_line=warn")
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            schema,
            input,
            skip_errors,
        } => cmd_encode(&schema, &input, skip_errors),
        Commands::Check { schema } => cmd_check(&schema),
    }
}

fn load_schema(path: &Path) -> Result<RecordSchema> {
    RecordSchema::from_file(path)
        .with_context(|| format!("Failed to load schema {}", path.display()))
}

fn cmd_encode(schema_path: &Path, input: &Path, skip_errors: bool) -> Result<()> {
    let schema = load_schema(schema_path)?;

    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(input)
            .with_context(|| format!("Failed to open {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = convert(&schema, reader, &mut out, skip_errors)?;
    out.flush()?;

    tracing::info!(
        written = summary.written,
        skipped = summary.skipped,
        "Encoding complete"
    );
    Ok(())
}

fn cmd_check(schema_path: &Path) -> Result<()> {
    let schema = load_schema(schema_path)?;

    println!("[OK] Schema valid: {}", schema_path.display());
    match (&schema.measurement, &schema.measurement_field) {
        (Some(name), _) => println!("  measurement: {}", name),
        (None, Some(path)) => println!("  measurement: <{}>", path),
        (None, None) => {}
    }
    println!(
        "  timestamp: <{}> ({:?})",
        schema.timestamp_field, schema.timestamp_unit
    );
    println!("  tags: {}", schema.tags.join(", "));
    println!("  fields: {}", schema.fields.join(", "));
    for (path, unit) in &schema.durations {
        println!("  duration: {} -> {:?}", path, unit);
    }
    Ok(())
}

/// Encode every non-blank input line as one output row.
fn convert<R: BufRead, W: Write>(
    schema: &RecordSchema,
    reader: R,
    out: &mut W,
    skip_errors: bool,
) -> Result<Summary> {
    let mut summary = Summary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        if matches!(&line, Ok(text) if text.trim().is_empty()) {
            continue;
        }

        // `lines()` has consumed the bad bytes, so a read error is per record.
        let encoded = line
            .with_context(|| format!("Failed to read line {}", line_no))
            .and_then(|text| {
                serde_json::from_str::<serde_json::Value>(&text)
                    .with_context(|| format!("line {}: invalid JSON", line_no))
            })
            .and_then(|sample| {
                JsonRecord::new(schema, &sample)
                    .to_line_protocol()
                    .with_context(|| format!("line {}: cannot encode record", line_no))
            });

        match encoded {
            Ok(row) => {
                writeln!(out, "{}", row)?;
                summary.written += 1;
            }
            Err(e) if skip_errors => {
                tracing::warn!("{:#}", e);
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}
