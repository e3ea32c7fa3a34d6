//! Pluggable input and output traits.
//!
//! External crates implement these to feed records in and take graphs out.

use crate::identifiers::FeedIdentifier;
use crate::models::types::{Result, Visit};
use crate::models::StopMap;

/// Producer of typed records for one feed.
///
/// Every call must return fresh state: clustering mutates the stop map, so
/// nothing loaded for one radius may be shared with another.
pub trait RecordSource {
    /// Name used to label outputs for this feed
    fn feed_id(&self) -> &FeedIdentifier;

    /// All stops, in load order
    fn load_stops(&self) -> Result<StopMap>;

    /// All visits, in the feed's native row order
    fn load_visits(&self) -> Result<Vec<Visit>>;
}

/// Consumer of built graphs.
pub trait NetworkSink {
    /// Persist the adjacency of `stops` built at `radius`.
    ///
    /// Returns the number of edges written.
    fn write_network(&mut self, feed: &FeedIdentifier, radius: u32, stops: &StopMap) -> Result<usize>;

    /// Record the top-level node count for `radius`.
    fn record_node_count(&mut self, feed: &FeedIdentifier, radius: u32, count: usize) -> Result<()>;
}
