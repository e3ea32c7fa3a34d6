//! Graph derivation and IO abstractions.

pub mod builder;
pub mod traits;
pub mod writer;

pub use builder::{BuildReport, GraphBuilder};
pub use traits::{NetworkSink, RecordSource};
pub use writer::{write_edge_list, FileNetworkWriter};
