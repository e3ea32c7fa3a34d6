//! In-memory record source.

use crate::identifiers::FeedIdentifier;
use crate::models::types::{Result, Stop, Visit};
use crate::models::StopMap;
use crate::network::traits::RecordSource;

/// Serves the same records on every load, each time as fresh state.
#[derive(Clone, Debug)]
pub struct MemorySource {
    feed_id: FeedIdentifier,
    stops: Vec<Stop>,
    visits: Vec<Visit>,
}

impl MemorySource {
    pub fn new(feed_id: impl Into<FeedIdentifier>, stops: Vec<Stop>, visits: Vec<Visit>) -> Self {
        Self {
            feed_id: feed_id.into(),
            stops,
            visits,
        }
    }
}

impl RecordSource for MemorySource {
    fn feed_id(&self) -> &FeedIdentifier {
        &self.feed_id
    }

    fn load_stops(&self) -> Result<StopMap> {
        Ok(StopMap::from_stops(self.stops.iter().cloned()))
    }

    fn load_visits(&self) -> Result<Vec<Visit>> {
        Ok(self.visits.clone())
    }
}
