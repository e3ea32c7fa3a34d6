//! Spatial indexing, distance queries and proximity clustering.

pub mod cluster;
pub mod disjoint_set;
pub mod index;
pub mod queries;

pub use cluster::{ClusterReport, ProximityClusterer};
pub use queries::{distance, longitude_bound_distance};
