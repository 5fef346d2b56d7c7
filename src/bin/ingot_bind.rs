//! ingot-bind: Validate a table definition and print the bound schema
//!
//! Binding fails fast on missing, invalid or ambiguous column paths,
//! so this doubles as a lint for table definitions before any data is
//! processed.
//!
//! Usage:
//!   # Validate a table definition file
//!   ingot-bind --table table.json
//!
//!   # Inline definition, compact output
//!   ingot-bind --columns "id,score" --types "string,double" \
//!       --path id='$.id' --path score='$.result.score' --compact

use anyhow::{bail, Context, Result};
use clap::Parser;
use ingot::{TableConfig, TableSchema};
use serde_json::json;
use std::collections::HashMap;
use std::fs::File;

#[derive(Parser, Debug)]
#[command(name = "ingot-bind")]
#[command(about = "Validate a table definition and print the bound schema", long_about = None)]
struct Args {
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

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    let schema = TableSchema::bind_config(&config).context("Failed to bind table schema")?;

    let columns: Vec<_> = schema
        .columns()
        .iter()
        .map(|column| {
            json!({
                "name": column.name(),
                "type": column.column_type().name(),
                "path": column.path().raw(),
            })
        })
        .collect();
    let bound = json!({ "columns": columns });

    let output = if args.compact {
        serde_json::to_string(&bound)?
    } else {
        serde_json::to_string_pretty(&bound)?
    };

    println!("{}", output);

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
