//! Radius sweep: rebuild the network at a series of merge radii.
//!
//! Every radius starts from freshly loaded records. Virtual stations created
//! at one radius are never carried to the next, since a cluster at a smaller
//! radius is not guaranteed to be a subset of one at a larger radius.

use crate::identifiers::FeedIdentifier;
use crate::models::types::{Result, TransitError};
use crate::models::StopMap;
use crate::network::builder::{BuildReport, GraphBuilder};
use crate::network::traits::{NetworkSink, RecordSource};
use crate::spatial::cluster::{ClusterReport, ProximityClusterer};

/// Radii to sweep: `0, step, 2*step, ...` up to and including `max_radius`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepConfig {
    max_radius: u32,
    step: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_radius: 0,
            step: 1,
        }
    }
}

impl SweepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest radius in meters.
    pub fn with_max_radius(mut self, max_radius: u32) -> Self {
        self.max_radius = max_radius;
        self
    }

    /// Distance in meters between consecutive radii.
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    pub fn max_radius(&self) -> u32 {
        self.max_radius
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(TransitError::InvalidConfig(
                "radius step must be at least 1 meter".to_string(),
            ));
        }
        Ok(())
    }

    pub fn radii(&self) -> impl Iterator<Item = u32> {
        (0..=self.max_radius).step_by(self.step.max(1) as usize)
    }
}

/// Result of one successful radius iteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadiusOutcome {
    pub radius: u32,
    /// Stops without a parent
    pub node_count: usize,
    /// Lines written to the edge list
    pub edge_count: usize,
    pub cluster: ClusterReport,
    pub build: BuildReport,
}

#[derive(Debug)]
pub struct RadiusFailure {
    pub radius: u32,
    pub error: TransitError,
}

/// Per-feed results of a sweep.
#[derive(Debug)]
pub struct SweepSummary {
    pub feed: FeedIdentifier,
    pub outcomes: Vec<RadiusOutcome>,
    pub failures: Vec<RadiusFailure>,
}

impl SweepSummary {
    /// `(radius, node_count)` for every radius that succeeded.
    pub fn node_counts(&self) -> Vec<(u32, usize)> {
        self.outcomes.iter().map(|o| (o.radius, o.node_count)).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stops clustered at `radius` with adjacency built from the source's visits.
pub fn build_network<S>(source: &S, radius: u32) -> Result<(StopMap, ClusterReport, BuildReport)>
where
    S: RecordSource + ?Sized,
{
    let clusterer = ProximityClusterer::new(f64::from(radius))?;

    let mut stops = source.load_stops()?;
    let dangling = stops.clear_dangling_parents();
    if dangling > 0 {
        log::debug!("{}: cleared {} unknown parent references", source.feed_id(), dangling);
    }

    let cluster = clusterer.cluster(&mut stops);

    let visits = source.load_visits()?;
    let build = GraphBuilder::new().build(&mut stops, &visits);
    if build.dangling > 0 {
        log::debug!(
            "{}: dropped {} transitions with unknown stops",
            source.feed_id(),
            build.dangling
        );
    }

    Ok((stops, cluster, build))
}

/// Runs the full pipeline once per configured radius.
#[derive(Clone, Copy, Debug)]
pub struct RadiusSweep {
    config: SweepConfig,
}

impl RadiusSweep {
    pub fn new(config: SweepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Sweep every radius. A failing radius is logged and skipped.
    pub fn run<S, W>(&self, source: &S, sink: &mut W) -> SweepSummary
    where
        S: RecordSource + ?Sized,
        W: NetworkSink + ?Sized,
    {
        let mut summary = SweepSummary {
            feed: source.feed_id().clone(),
            outcomes: Vec::new(),
            failures: Vec::new(),
        };

        for radius in self.config.radii() {
            match self.run_radius(source, sink, radius) {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(error) => {
                    log::warn!(
                        "Error while processing {} at radius {}, skipping: {}",
                        summary.feed,
                        radius,
                        error
                    );
                    summary.failures.push(RadiusFailure { radius, error });
                }
            }
        }

        summary
    }

    /// Build, write and count the network for a single radius.
    pub fn run_radius<S, W>(&self, source: &S, sink: &mut W, radius: u32) -> Result<RadiusOutcome>
    where
        S: RecordSource + ?Sized,
        W: NetworkSink + ?Sized,
    {
        let feed = source.feed_id();
        let (stops, cluster, build) = build_network(source, radius)?;

        let edge_count = sink.write_network(feed, radius, &stops)?;
        let node_count = stops.top_level_count();
        sink.record_node_count(feed, radius, node_count)?;

        log::info!("{} r: {}, nodenum: {}, edges: {}", feed, radius, node_count, edge_count);

        Ok(RadiusOutcome {
            radius,
            node_count,
            edge_count,
            cluster,
            build,
        })
    }
}
