#![allow(clippy::all)]
use clap::{Parser, Subcommand};
use clap_markdown;

use segmask_cli::{extract, rasterize};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Rasterize(rasterize::RasterizeArgs),
    Extract(extract::ExtractArgs),
}

fn main() {
    clap_markdown::print_help_markdown::<Cli>();
}
