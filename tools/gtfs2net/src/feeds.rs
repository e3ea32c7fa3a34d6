use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use gtfs2net_transit::GtfsFolderSource;
use std::path::Path;

/// How to interpret the input path
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputType {
    /// A single feed folder if it contains stops.txt, otherwise a folder of feeds
    Auto,
    /// The input path is one feed folder
    Feed,
    /// Every sub-folder of the input path is a feed folder
    Batch,
}

/// Resolve the input path to the feeds to process, in processing order.
pub fn resolve_feeds(input: &Path, input_type: InputType) -> Result<Vec<GtfsFolderSource>> {
    if !input.is_dir() {
        bail!("Input folder does not exist: {}", input.display());
    }

    let batch = match input_type {
        InputType::Feed => false,
        InputType::Batch => true,
        InputType::Auto => !GtfsFolderSource::is_feed_folder(input),
    };

    if !batch {
        return Ok(vec![GtfsFolderSource::new(input)]);
    }

    let feeds = GtfsFolderSource::discover(input)
        .with_context(|| format!("Failed to list feed folders in {}", input.display()))?;
    if feeds.is_empty() {
        bail!("No feed folders found in {}", input.display());
    }
    Ok(feeds)
}
