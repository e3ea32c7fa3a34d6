//! # gtfs2net-transit
//!
//! Turn static GTFS feeds into directed stop-connectivity networks.
//!
//! ## Features
//!
//! - **Proximity clustering**: merge stops within a radius into virtual stations
//! - **Graph building**: directed adjacency from stop-visit sequences
//! - **Radius sweep**: rebuild the network at a range of merge radii
//! - **Pluggable IO**: implement your own record sources and network sinks
//!
//! ## Example
//!
//! ```
//! use gtfs2net_transit::prelude::*;
//!
//! // Two platforms ~10 m apart, served by one trip towards a third stop
//! let stops = vec![
//!     Stop::at("p1", "Platform 1", 47.53160, 21.6273),
//!     Stop::at("p2", "Platform 2", 47.53169, 21.6273),
//!     Stop::at("far", "Terminus", 47.54000, 21.6273),
//! ];
//! let visits = vec![Visit::new("p1", 1), Visit::new("far", 2)];
//! let source = MemorySource::new("demo", stops, visits);
//!
//! let (network, _, _) = build_network(&source, 150).unwrap();
//! assert_eq!(network.top_level_count(), 2);
//! assert_eq!(network.edge_count(), 1);
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;
pub mod sweep;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{Result, Stop, StopMap, TransitError, Visit};
    pub use crate::network::{
        write_edge_list, BuildReport, FileNetworkWriter, GraphBuilder, NetworkSink, RecordSource,
    };
    pub use crate::provider::{GtfsFolderSource, MemorySource};
    pub use crate::spatial::{distance, longitude_bound_distance, ClusterReport, ProximityClusterer};
    pub use crate::sweep::{build_network, RadiusSweep, SweepConfig, SweepSummary};
}

pub use prelude::*;
