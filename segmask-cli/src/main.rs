// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use clap::{Parser, Subcommand};
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
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Rasterize(rasterize_args)) => rasterize::rasterize(rasterize_args),
        Some(Commands::Extract(extract_args)) => extract::extract(extract_args),
        None => {}
    }
}
