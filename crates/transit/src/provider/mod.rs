//! Record sources.

pub mod gtfs_folder;
pub mod memory;

pub use gtfs_folder::GtfsFolderSource;
pub use memory::MemorySource;
