//! Pattern capture command line
//!
//! # Usage
//!
//! ```bash
//! # List the layer:datatype pairs of a layout
//! pattern_capture layers --layout-file chip.gds
//!
//! # Capture patterns under every polygon of layer 1:0 from layers 2:0 and 3:0
//! pattern_capture capture --layout-file chip.gds --mask-layer 1:0 \
//!     --input-layers "2:0,3:0" --output patterns.jsonl
//! ```
//!
//! Log level comes from `PATTERN_CAPTURE_LOG` (default `warn`).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pattern_capture::capture::{parse_layer_list, run_capture, CaptureRequest, JsonLinesStore};
use pattern_capture::geometry::LayerKey;
use pattern_capture::list_layer_datatype_pairs;

const LOG_ENV: &str = "PATTERN_CAPTURE_LOG";

/// Capture multi-layer patterns from GDSII/OASIS layouts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every layer:datatype pair present in a layout
    Layers {
        #[arg(long, value_name = "FILE")]
        layout_file: PathBuf,
    },
    /// Clip input layers against each polygon of a mask layer
    Capture {
        #[arg(long, value_name = "FILE")]
        layout_file: PathBuf,

        /// Mask layer as layer:datatype
        #[arg(long, value_name = "L:D")]
        mask_layer: LayerKey,

        /// Comma separated layer:datatype list
        #[arg(long, value_name = "L:D,...")]
        input_layers: String,

        /// JSON Lines output file
        #[arg(short, long, value_name = "FILE", default_value = "patterns.jsonl")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Layers { layout_file } => {
            let pairs = list_layer_datatype_pairs(&layout_file)
                .with_context(|| format!("failed to list layers of {}", layout_file.display()))?;
            for pair in pairs {
                println!("{}", pair);
            }
        }
        Command::Capture { layout_file, mask_layer, input_layers, output } => {
            let request = CaptureRequest {
                mask: mask_layer,
                inputs: parse_layer_list(&input_layers)?,
            };
            let mut store = JsonLinesStore::create(&output)?;
            let summary = run_capture(&layout_file, &request, &mut store)?;
            store.flush()?;

            println!(
                "Stored {} pattern(s), {} failed -> {}",
                summary.successful,
                summary.failed,
                output.display()
            );
        }
    }
    Ok(())
}
