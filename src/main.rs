//! bytewin: inspect a window of a binary file from the command line
//!
//! Every result is printed as one JSON object per line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use bytewin::codec::Encoding;
use bytewin::editor::parse_hex_pattern;
use bytewin::settings::EngineSettings;
use bytewin::{formats, ByteWindow, Result};

#[derive(Parser, Debug)]
#[command(name = "bytewin")]
#[command(about = "Inspect a window of a binary file")]
#[command(version)]
struct Cli {
    /// File to open
    file: PathBuf,

    /// Absolute offset of the window
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Window length in bytes (0 reads to the end)
    #[arg(long)]
    length: Option<usize>,

    /// List printable text runs
    #[arg(long)]
    strings: bool,

    /// Encoding for --strings
    #[arg(long)]
    encoding: Option<Encoding>,

    /// Shortest run reported by --strings
    #[arg(long)]
    min_length: Option<usize>,

    /// Compare against the same window of another file
    #[arg(long, value_name = "OTHER")]
    diff: Option<PathBuf>,

    /// Describe the file structure
    #[arg(long)]
    analyze: bool,

    /// Hex pattern to search for, e.g. "50 4B 03 04"
    #[arg(long, value_name = "HEX")]
    find: Option<String>,
}

fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(e) => log::warn!("Failed to serialize output: {}", e),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = EngineSettings::load();
    let length = cli.length.unwrap_or(settings.default_window_length);

    let mut window = settings.new_window();
    window.open(&cli.file, cli.offset, length)?;
    if let Some(path) = window.source_path() {
        settings.add_recent_file(path.to_path_buf());
        settings.save();
    }

    let mut summary_only = true;

    if cli.strings {
        summary_only = false;
        let encoding = cli.encoding.unwrap_or(settings.default_encoding);
        let min_length = cli.min_length.unwrap_or(settings.min_string_length);
        for run in window.extract_strings(encoding, min_length)? {
            emit(&run);
        }
    }

    if let Some(pattern) = &cli.find {
        summary_only = false;
        let pattern = parse_hex_pattern(pattern)?;
        let mut from = window.window_offset();
        while let Some(address) = window.search(from, &pattern) {
            emit(&serde_json::json!({ "address": address }));
            from = address + 1;
        }
    }

    if let Some(other_path) = &cli.diff {
        summary_only = false;
        let mut other = ByteWindow::new();
        other.open(other_path, cli.offset, length)?;
        for entry in window.diff_against(&other) {
            emit(&entry);
        }
    }

    if cli.analyze {
        summary_only = false;
        for record in formats::analyze(&window)? {
            emit(&record);
        }
    }

    if summary_only {
        emit(&serde_json::json!({
            "path": window.source_path(),
            "offset": window.window_offset(),
            "size": window.size(),
            "format": formats::detect(&window).map(|analyzer| analyzer.name()),
        }));
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("bytewin: {}", e);
            ExitCode::FAILURE
        }
    }
}
