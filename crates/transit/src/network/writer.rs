//! Flat-file network output.
//!
//! Per feed and radius an edge list `<feed>_<radius>.txt`, one line per
//! directed edge:
//!
//! ```text
//! <fromIntId>,<toIntId>,<fromName>,<toName>
//! ```
//!
//! and an append-only summary `nodenum_<feed>.txt` with one
//! `<radius>, <nodeCount>` line per radius.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::identifiers::FeedIdentifier;
use crate::models::types::{Result, TransitError};
use crate::models::StopMap;
use crate::network::traits::NetworkSink;

/// Write the edge list of `stops` to `out`. Returns the number of lines.
///
/// Stops with a parent are never a `from` endpoint: their edges were folded
/// into the parent while building.
pub fn write_edge_list<W: Write>(stops: &StopMap, out: &mut W) -> std::io::Result<usize> {
    let mut lines = 0;
    for from in stops.iter().filter(|s| !s.has_parent()) {
        for to_id in &from.neighbors {
            let Some(to) = stops.get(to_id) else {
                continue;
            };
            writeln!(out, "{},{},{},{}", from.int_id, to.int_id, from.name, to.name)?;
            lines += 1;
        }
    }
    Ok(lines)
}

/// Writes networks under one output directory, creating it on demand.
#[derive(Clone, Debug)]
pub struct FileNetworkWriter {
    output_dir: PathBuf,
}

impl FileNetworkWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn network_path(&self, feed: &FeedIdentifier, radius: u32) -> PathBuf {
        self.output_dir.join(format!("{}_{}.txt", feed, radius))
    }

    pub fn node_count_path(&self, feed: &FeedIdentifier) -> PathBuf {
        self.output_dir.join(format!("nodenum_{}.txt", feed))
    }

    fn ensure_output_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| TransitError::io(&self.output_dir, e))
    }
}

impl NetworkSink for FileNetworkWriter {
    fn write_network(&mut self, feed: &FeedIdentifier, radius: u32, stops: &StopMap) -> Result<usize> {
        self.ensure_output_dir()?;

        let path = self.network_path(feed, radius);
        let file = File::create(&path).map_err(|e| TransitError::io(&path, e))?;
        let mut out = BufWriter::new(file);

        let lines = write_edge_list(stops, &mut out).map_err(|e| TransitError::io(&path, e))?;
        out.flush().map_err(|e| TransitError::io(&path, e))?;

        log::debug!("Wrote {} edges to {}", lines, path.display());
        Ok(lines)
    }

    fn record_node_count(&mut self, feed: &FeedIdentifier, radius: u32, count: usize) -> Result<()> {
        self.ensure_output_dir()?;

        let path = self.node_count_path(feed);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| TransitError::io(&path, e))?;

        writeln!(file, "{}, {}", radius, count).map_err(|e| TransitError::io(&path, e))
    }
}
