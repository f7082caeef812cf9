pub mod core;
pub mod input;
pub mod layout;
pub mod model;
pub mod order;
pub mod resolve;
pub mod topology;

#[cfg(test)]
pub(crate) mod testutil;

pub use self::core::{Branch, BranchKind, Commit, CommitArena, CommitGraphBuilder, NameSource};
pub use input::{BranchRef, HistorySnapshot, NameNote, NameOverride, RawCommit, TagRef};
pub use layout::{BranchSpan, Connector, ConnectorKind, ConnectorStyle, Layout, LayoutEngine};
pub use model::{
    reconstruct, BranchRecord, CommitRecord, ModelStats, ReconstructError, RepoModel,
    FORMAT_VERSION,
};
pub use order::{compare_branches, compare_names, order_branches};
pub use resolve::{BranchNameResolver, Resolution, MASTER};
pub use topology::BranchTopologyBuilder;
