// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// segwerk: analyze the layout of a scanned page.
//
// Entry point. Initialises logging, loads the layout configuration, runs the
// page analyzer, and prints the segmented page as JSON. Optionally renders
// the page through the standard finishing plan.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use segwerk_core::error::Result;
use segwerk_core::{LayoutConfig, Resolution};
use segwerk_layout::{FinishingPlan, PageAnalyzer};

/// Segment a scanned page into text, photo, drawing and border regions.
#[derive(Parser, Debug)]
#[command(name = "segwerk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page image (PNG, JPEG, TIFF, ...)
    image: PathBuf,

    /// JSON file overriding parts of the default layout configuration
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Declared scan resolution, carried through to the report
    #[arg(long)]
    dpi: Option<u32>,

    /// Write the finished page (each region binarized for its type) here
    #[arg(short = 'r', long)]
    render: Option<PathBuf>,

    /// Write the JSON report to this file instead of stdout
    #[arg(short = 'o', long = "outfile", default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, image = %args.image.display(), "Analysis failed");
            eprintln!("segwerk: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let analyzer = PageAnalyzer::new(config)?;

    let resolution = args.dpi.map(Resolution::uniform);
    let page = analyzer.analyze_file(&args.image, resolution)?;
    tracing::info!(segments = page.len(), "Analysis complete");

    let json = serde_json::to_string_pretty(&page.report())?;
    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(&args.outfile)?))
    };
    writeln!(output, "{json}")?;
    output.flush()?;

    if let Some(path) = &args.render {
        let rendered = FinishingPlan::standard().render(&page)?;
        segwerk_layout::image::save(&rendered, path)?;
        tracing::info!(path = %path.display(), "Finished page written");
    }
    Ok(())
}
