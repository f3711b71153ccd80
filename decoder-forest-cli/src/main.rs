//! Decoder Forest CLI Application
//!
//! This is the command-line front end for the decoder-forest library.
//! It adds everything the library leaves to its caller:
//! - Reading decoder definitions from TOML decoder files
//! - Application configuration (config.toml)
//! - Operator-facing load reports (TXT/JSON)

use anyhow::{bail, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, OutputFormat};
use decoder_forest::{load_definitions, DecoderCatalog};

/// Decoder Forest - Build and validate decoder trees from decoder files
#[derive(Parser, Debug)]
#[command(name = "decoder-forest-cli")]
#[command(about = "Build and validate decoder forests from decoder files", long_about = None)]
#[command(version)]
struct Args {
    /// Path to decoder file(s), loaded in the given order (can be repeated)
    #[arg(short, long, value_name = "FILE")]
    decoders: Vec<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep attaching decoders after a rejection (the load still fails)
    #[arg(long)]
    continue_on_error: bool,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Decoder Forest CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder-forest library v{}", decoder_forest::VERSION);

    let config = resolve_config(&args)?;

    if config.input.decoder_files.is_empty() {
        // No input - show help
        println!("Decoder Forest - No decoder files specified");
        println!("\nQuick Start:");
        println!("  decoder-forest-cli --decoders 0010-sshd.toml --decoders 0020-json.toml");
        println!("\nWith a configuration file:");
        println!("  decoder-forest-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    run(&config)
}

/// Merge the config file (if any) with command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    config.input.decoder_files.extend(args.decoders.iter().cloned());
    config.loader.continue_on_error |= args.continue_on_error;
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(output) = &args.output {
        config.output.output_file = Some(output.clone());
    }

    Ok(config)
}

/// Load every decoder file, build the catalog and write the report
fn run(config: &AppConfig) -> Result<()> {
    let mut definitions = Vec::new();
    for path in &config.input.decoder_files {
        definitions.extend(config::load_decoder_file(path)?);
    }

    let mut catalog = DecoderCatalog::new();
    let report = load_definitions(&mut catalog, definitions, &config.loader);

    let mut out: Box<dyn Write> = match &config.output.output_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    match config.output.format {
        OutputFormat::Txt => report::write_text(&mut out, &catalog, &report)?,
        OutputFormat::Json => report::write_json(&mut out, &catalog, &report)?,
    }
    out.flush()?;

    if !report.is_success() {
        bail!(
            "Decoder load failed: {} decoder(s) rejected",
            report.rejected.len()
        );
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
