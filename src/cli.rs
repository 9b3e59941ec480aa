//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use uncut_edges_core::{PageRanges, ParserKind, TransferStrategy};

/// Render a manuscript through the uncut-edges parsing service and save the result.
///
/// KIND selects the source: `manifest` takes a IIIF manifest URL, `penn` a
/// Colenda catalog ID (e.g. 81431-p3hk28), `shakespeare` a Folger catalog ID
/// (e.g. bib244741-309974-lb41).
#[derive(Parser, Debug)]
#[command(name = "uncut-edges")]
#[command(author, version, about)]
pub struct Args {
    /// Parser kind: manifest, penn or shakespeare
    #[arg(value_parser = clap::value_parser!(ParserKind))]
    pub kind: ParserKind,

    /// Manifest URL or catalog ID
    pub input: String,

    /// Pages to include, e.g. 1-3,5
    #[arg(short, long, value_parser = clap::value_parser!(PageRanges))]
    pub pages: Option<PageRanges>,

    /// Directory to save the generated file into (default: current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Parsing service origin (overrides UNCUT_EDGES_API_URL and config file)
    #[arg(long)]
    pub api_url: Option<String>,

    /// How bytes are moved to disk: auto, direct or pump
    #[arg(long, value_parser = clap::value_parser!(TransferStrategy))]
    pub strategy: Option<TransferStrategy>,

    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the transfer report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
