//! Derive directed stop adjacency from ordered visits.
//!
//! Visits carry no trip id. A run (one trip's stop order) continues while the
//! sequence number strictly increases; anything else starts a new run. A
//! visit without a sequence number ends the current run without starting one.
//! Each
//! step inside a run adds an edge between the endpoints' top-level stops, so
//! merged stops contribute their edges to their parent.

use std::borrow::Borrow;

use crate::identifiers::StopIdentifier;
use crate::models::{StopMap, Visit};

/// Outcome of one build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Runs started (a run is a maximal strictly increasing sequence)
    pub runs: usize,
    /// Consecutive visit pairs inside a run
    pub transitions: usize,
    /// Edges not already present
    pub edges_added: usize,
    /// Transitions dropped because an endpoint could not be resolved
    pub dangling: usize,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Add an edge for every consecutive pair of visits within a run.
    pub fn build<I>(&self, stops: &mut StopMap, visits: I) -> BuildReport
    where
        I: IntoIterator,
        I::Item: Borrow<Visit>,
    {
        let mut report = BuildReport::default();
        let mut previous: Option<(StopIdentifier, u32)> = None;

        for visit in visits {
            let visit: &Visit = visit.borrow();

            let Some(sequence) = visit.sequence else {
                previous = None;
                continue;
            };

            match &previous {
                Some((prev_stop, prev_seq)) if sequence > *prev_seq => {
                    report.transitions += 1;
                    match Self::resolve(stops, prev_stop, &visit.stop_id) {
                        Some((from, to)) => {
                            if let Some(stop) = stops.get_mut(&from) {
                                if stop.neighbors.insert(to) {
                                    report.edges_added += 1;
                                }
                            }
                        }
                        None => {
                            log::trace!(
                                "Dropping edge {} -> {}: unknown stop",
                                prev_stop,
                                visit.stop_id
                            );
                            report.dangling += 1;
                        }
                    }
                }
                _ => report.runs += 1,
            }

            previous = Some((visit.stop_id.clone(), sequence));
        }

        report
    }

    fn resolve(
        stops: &StopMap,
        from: &StopIdentifier,
        to: &StopIdentifier,
    ) -> Option<(StopIdentifier, StopIdentifier)> {
        let from = stops.top_level(from)?.clone();
        let to = stops.top_level(to)?.clone();
        Some((from, to))
    }
}
