//! ingot-cast: Cast JSON records into fixed-schema rows
//!
//! Usage:
//!   # Table definition from a file, records from stdin
//!   echo '{"id":"a1","n":7}' | ingot-cast --table table.json
//!
//!   # Inline table definition, NDJSON input file
//!   ingot-cast --ndjson events.jsonl \
//!       --columns "id,count" --types "string,int" \
//!       --path id='$.id' --path count='$.n'
//!
//!   # Whole-file mode accepts a JSON array of records
//!   ingot-cast records.json --table table.json --output rows.jsonl

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ingot::{RowExtractor, RowWriter, TableConfig, TableSchema};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "ingot-cast")]
#[command(about = "Cast JSON records into fixed-schema rows", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Table definition file (JSON with "columns", "types", "paths")
    #[arg(long, short = 't')]
    table: Option<String>,

    /// Comma-separated column names (alternative to --table)
    #[arg(long)]
    columns: Option<String>,

    /// Comma-separated column type names, parallel to --columns
    #[arg(long)]
    types: Option<String>,

    /// Path expression for one column, as NAME=EXPR (repeatable)
    #[arg(long = "path", value_name = "NAME=EXPR")]
    paths: Vec<String>,

    /// Process newline-delimited JSON (one record per line)
    #[arg(long)]
    ndjson: bool,

    /// Output file for rows (stdout if omitted)
    #[arg(long, short = 'o')]
    output: Option<String>,
}

#[derive(Debug, Default)]
struct CastStats {
    rows: u64,
    dropped: u64,
    failed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    let schema = Arc::new(
        TableSchema::bind_config(&config).context("Failed to bind table schema")?,
    );

    let output: Box<dyn Write> = if let Some(path) = &args.output {
        Box::new(File::create(path).context("Failed to create output file")?)
    } else {
        Box::new(std::io::stdout())
    };
    let mut writer = RowWriter::new(schema.clone(), output);
    let extractor = RowExtractor::new(schema);

    let reader: Box<dyn Read> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path).context("Failed to open input file")?,
        ))
    } else {
        Box::new(std::io::stdin())
    };

    let mut stats = CastStats::default();
    if args.ndjson {
        process_lines(reader, &extractor, &mut writer, &mut stats)?;
    } else {
        process_batch(reader, &extractor, &mut writer, &mut stats)?;
    }
    writer.flush()?;

    if stats.dropped > 0 {
        eprintln!("⚠ Dropped {} unparseable record(s)", stats.dropped);
    }
    if stats.failed > 0 {
        eprintln!("⚠ Skipped {} record(s) with coercion failures", stats.failed);
    }
    eprintln!("Wrote {} row(s)", stats.rows);

    Ok(())
}

/// Build the table definition from --table or the inline flags.
fn load_config(args: &Args) -> Result<TableConfig> {
    if let Some(table_path) = &args.table {
        let file = File::open(table_path).context("Failed to open table definition")?;
        let config: TableConfig =
            serde_json::from_reader(file).context("Failed to parse table definition")?;
        return Ok(config);
    }

    let (Some(columns), Some(types)) = (&args.columns, &args.types) else {
        bail!("either --table or both --columns and --types are required");
    };

    let mut paths = HashMap::new();
    for entry in &args.paths {
        let Some((name, expr)) = entry.split_once('=') else {
            bail!("--path entries must look like NAME=EXPR, got '{}'", entry);
        };
        paths.insert(name.trim().to_string(), expr.trim().to_string());
    }

    Ok(TableConfig {
        columns: columns.clone(),
        types: types.clone(),
        paths,
    })
}

/// Process newline-delimited records, one extraction per line.
fn process_lines(
    reader: Box<dyn Read>,
    extractor: &RowExtractor,
    writer: &mut RowWriter<Box<dyn Write>>,
    stats: &mut CastStats,
) -> Result<()> {
    for line in BufReader::new(reader).lines() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match extractor.extract(line) {
            Ok(Some(row)) => {
                writer.write_row(&row)?;
                stats.rows += 1;
            }
            Ok(None) => stats.dropped += 1,
            Err(e) => {
                eprintln!("⚠ {}", e);
                stats.failed += 1;
            }
        }
    }

    Ok(())
}

/// Process a whole file using SIMD-accelerated JSON parsing when possible
fn process_batch(
    reader: Box<dyn Read>,
    extractor: &RowExtractor,
    writer: &mut RowWriter<Box<dyn Write>>,
    stats: &mut CastStats,
) -> Result<()> {
    // Read entire content into memory for SIMD parsing
    let mut content = Vec::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader.read_to_end(&mut content)?;

    // Try SIMD parsing first (faster) - use OwnedValue to avoid borrow issues
    match simd_json::to_owned_value(&mut content) {
        Ok(simd_json::OwnedValue::Array(arr)) => {
            // JSON array - each element is one record
            for elem in arr.iter() {
                let json_str = simd_json::to_string(elem)?;
                let value: Value = serde_json::from_str(&json_str)?;
                cast_one(extractor, value, writer, stats)?;
            }
        }
        Ok(elem) => {
            // Single JSON record
            let json_str = simd_json::to_string(&elem)?;
            let value: Value = serde_json::from_str(&json_str)?;
            cast_one(extractor, value, writer, stats)?;
        }
        Err(_) => {
            // Fallback to serde_json for NDJSON or malformed input
            let content_str = String::from_utf8_lossy(&content);
            for line in content_str.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(line) {
                    Ok(value) => cast_one(extractor, value, writer, stats)?,
                    Err(_) => stats.dropped += 1,
                }
            }
        }
    }

    Ok(())
}

fn cast_one(
    extractor: &RowExtractor,
    value: Value,
    writer: &mut RowWriter<Box<dyn Write>>,
    stats: &mut CastStats,
) -> Result<()> {
    match extractor.extract_value(value) {
        Ok(Some(row)) => {
            writer.write_row(&row)?;
            stats.rows += 1;
        }
        Ok(None) => stats.dropped += 1,
        Err(e) => {
            eprintln!("⚠ {}", e);
            stats.failed += 1;
        }
    }

    Ok(())
}
