//! Command line front end: dissect a file and print its tree.
//!
//! ```bash
//! parslither trace.pcap
//! parslither --dissector "Plain Text" --format json notes.bin
//! parslither --list
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use parslither::export;
use parslither::io::load_file;
use parslither::logging::{init_tracing_json, init_tracing_with_level};
use parslither::{DissectConfig, DissectionOutcome, DissectionSession, DissectorRegistry};

#[derive(Parser)]
#[command(name = "parslither")]
#[command(version, about = "Dissect a binary file into a labeled tree")]
struct Cli {
    /// File to dissect
    file: Option<PathBuf>,

    /// Dissector to use instead of automatic selection
    #[arg(short, long)]
    dissector: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "text", value_enum)]
    format: OutputFormat,

    /// Write the tree to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List registered dissectors and exit
    #[arg(long)]
    list: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Guess a media type from the file extension when content sniffing fails
    #[arg(long)]
    extension_fallback: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn load_config(cli: &Cli) -> Result<DissectConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            DissectConfig::from_json_str(&text)?
        }
        None => DissectConfig::default(),
    };
    if cli.extension_fallback {
        config.sniff.extension_fallback = true;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let registry = Arc::new(DissectorRegistry::with_builtins());

    if cli.list {
        for dissector in registry.snapshot().iter() {
            println!("{}", dissector.descriptor());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(path) = cli.file.as_ref() else {
        bail!("no input file given (use --list to see dissectors)");
    };
    let loaded = load_file(path, config.io.limits())
        .with_context(|| format!("loading {}", path.display()))?;

    let mut session = DissectionSession::from_config(registry, &config);
    let mut outcome = session.load_file(loaded.bytes, &loaded.file_name);
    if let Some(name) = &cli.dissector {
        outcome = session.set_dissector(name)?;
    }
    info!(outcome = ?outcome, "Dissection finished");

    let nodes = match &outcome {
        DissectionOutcome::Dissected { .. } => session.tree().unwrap_or_default(),
        DissectionOutcome::Unassigned => {
            eprintln!("{}: no dissector matches this file", loaded.file_name);
            return Ok(ExitCode::from(2));
        }
        DissectionOutcome::Empty => {
            eprintln!("{}: file is empty", loaded.file_name);
            return Ok(ExitCode::from(2));
        }
        DissectionOutcome::Failed(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
        DissectionOutcome::NoFile | DissectionOutcome::Suppressed => {
            bail!("unexpected session outcome: {:?}", outcome)
        }
    };

    let rendered = match cli.format {
        OutputFormat::Text => export::to_readable_text(nodes),
        OutputFormat::Json => export::to_json_string(nodes)?,
    };
    match &cli.output {
        Some(out) => std::fs::write(out, rendered)
            .with_context(|| format!("writing {}", out.display()))?,
        None => print!("{}", rendered),
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.json_logs {
        init_tracing_json();
    } else {
        init_tracing_with_level(if cli.verbose { "debug" } else { "warn" });
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
