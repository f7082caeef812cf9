pub mod details;
pub mod service;
pub mod source;

pub use details::{ChangedFiles, CommitDetailsCache, DetailsFetcher};
pub use service::ReconstructionService;
pub use source::{GitDetailsFetcher, SnapshotSource};
