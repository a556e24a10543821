//! CLI application for structuring Brazilian receipt OCR dumps.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use nfscan_core::{read_dump, save_receipt, structure_tokens, to_json};

/// Convert receipt OCR dumps into structured fiscal JSON records
#[derive(Parser)]
#[command(name = "nfscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OCR dump files to process (one receipt per file)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for the JSON output files
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// Print structured receipts to stdout instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Report receipts whose finalized aggregates are inconsistent
    #[arg(long)]
    validate: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    for input in &cli.inputs {
        let tokens = read_dump(input)
            .with_context(|| format!("failed to read {}", input.display()))?;

        // One classifier context per input file; state never carries
        // over between receipts.
        let receipt = structure_tokens(tokens);

        if cli.validate {
            for issue in receipt.validate() {
                warn!(input = %input.display(), issue = %issue, "validation issue");
            }
        }

        if cli.stdout {
            println!("{}", to_json(&receipt)?);
        } else {
            let name = input.file_stem().and_then(|s| s.to_str());
            let path = save_receipt(&receipt, &cli.output_dir, name)?;
            println!("{} -> {}", input.display(), path.display());
        }
    }

    Ok(())
}
