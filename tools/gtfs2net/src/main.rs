use anyhow::{bail, Context, Result};
use clap::Parser;
use gtfs2net_transit::{FileNetworkWriter, RadiusSweep, RecordSource, SweepConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

mod feeds;
mod stats;

use feeds::{resolve_feeds, InputType};
use stats::BatchStats;

#[derive(Parser, Debug)]
#[command(
    name = "gtfs2net",
    author,
    version,
    about = "Build stop-connectivity networks from GTFS feeds",
    long_about = "Reads stops.txt and stop_times.txt from GTFS feed folders and writes \
                  the directed stop-to-stop network as an edge list.\n\n\
                  The network is rebuilt for every merge radius 0, step, 2*step, ... up to \
                  the maximum radius. At each radius, stops within that distance of each \
                  other are merged into a virtual station, and the number of remaining \
                  nodes is appended to a per-feed summary file."
)]
struct Args {
    /// Input folder: a GTFS feed, or a folder of GTFS feed folders
    #[arg(short, long)]
    input: PathBuf,

    /// Output folder for edge lists and node-count summaries
    #[arg(short, long, default_value = "./gtfs2netOutput")]
    output: PathBuf,

    /// Largest merge radius in meters
    #[arg(short, long, default_value_t = 150)]
    radius: u32,

    /// Radius increment in meters
    #[arg(short, long, default_value_t = 150)]
    step: u32,

    /// How to interpret the input folder
    #[arg(long, value_enum, default_value_t = InputType::Auto)]
    input_type: InputType,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== GTFS Network Builder ===");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output.display());

    if !args.input.exists() {
        bail!("Input path does not exist: {}", args.input.display());
    }

    let config = SweepConfig::new()
        .with_max_radius(args.radius)
        .with_step(args.step);
    let sweep = RadiusSweep::new(config).context("Invalid radius settings")?;
    log::info!(
        "Radii: 0..={} m in steps of {} m",
        config.max_radius(),
        config.step()
    );

    let feeds = resolve_feeds(&args.input, args.input_type)?;
    log::info!("Feeds to process: {}", feeds.len());

    let mut writer = FileNetworkWriter::new(&args.output);
    let mut stats = BatchStats::default();

    let pb = ProgressBar::new(feeds.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?,
    );

    for feed in &feeds {
        pb.set_message(feed.feed_id().to_string());
        log::info!("Processing: {}", feed.folder().display());

        let summary = sweep.run(feed, &mut writer);
        if summary.outcomes.is_empty() {
            log::warn!("Error while processing {}... Skipping to the next one.", feed.folder().display());
        }
        stats.add(&summary);
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Summary
    log::info!("");
    stats.log_summary();
    log::info!("");
    log::info!("Output written to: {}", writer.output_dir().display());
    log::info!("Done!");

    Ok(())
}
