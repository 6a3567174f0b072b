//! CLI tool to rewrite an SA1 maincode column to 7-digit short codes.
//!
//! Usage:
//!   shorten-maincode --column <INT> [infile]
//!
//! If no input file is given, reads from stdin. Always writes to stdout.

use clap::Parser;
use shorten_maincode::{ShortenColumn, execute, open_input};
use std::io;
use std::path::PathBuf;
use std::process;

/// Alter a CSV file to rewrite one of the columns from ABS 11-digit SA1
/// maincode format to 7-digit short code format.
///
/// The first row is treated as a header and copied unchanged. Writes to
/// standard output.
#[derive(Parser)]
#[command(name = "shorten-maincode", version)]
struct Cli {
    /// Column to convert from SA1 maincode to SA1 7-digit format (0-indexed)
    #[arg(long, value_name = "INT")]
    column: usize,

    /// Input CSV file (default: stdin, also `-`)
    infile: Option<PathBuf>,

    /// Log input path, column and record counts on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::info!(
        "input: {}, column: {}",
        cli.infile
            .as_deref()
            .map_or_else(|| "(stdin)".to_string(), |p| p.display().to_string()),
        cli.column
    );

    let input = match open_input(cli.infile.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let mut stage = ShortenColumn::new(cli.column);
    if let Err(e) = execute(input, io::stdout().lock(), &mut stage) {
        if let Some(record) = e.offending_record() {
            eprintln!("{record}");
        }
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
