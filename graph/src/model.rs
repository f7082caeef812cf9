use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::{Branch, CommitArena, CommitGraphBuilder};
use crate::input::HistorySnapshot;
use crate::layout::{BranchSpan, Connector, Layout, LayoutEngine};
use crate::order::order_branches;
use crate::resolve::BranchNameResolver;
use crate::topology::BranchTopologyBuilder;

/// Stamp for any externally persisted copy of a [`RepoModel`]. A reader
/// finding any other value must rebuild from scratch instead of
/// deserializing partially.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ReconstructError {
    /// Branch refs without any commits: the snapshot cannot be trusted and
    /// the caller should keep its previous model.
    #[error("inconsistent snapshot: {branches} branch refs but no commits")]
    InconsistentSnapshot { branches: usize },
}

/// A commit with its place in the rendered graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub row: usize,
    pub branch_id: String,
    pub column: usize,
}

/// A branch with its place in the rendered graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRecord {
    pub id: String,
    pub name: String,
    pub column: usize,
    pub tip_row: usize,
    pub first_row: usize,
    pub parent_branch_id: Option<String>,
    pub is_multi_branch: bool,
    pub candidate_names: Vec<String>,
}

/// The immutable result of one reconstruction pass. Owns every entity;
/// relations are id lookups, never embedded references.
#[derive(Debug, Default)]
pub struct RepoModel {
    pub arena: CommitArena,
    /// Branches in display order.
    pub branches: Vec<Branch>,
    /// Commits in row order.
    pub commit_records: Vec<CommitRecord>,
    /// Branches in display order, with layout coordinates.
    pub branch_records: Vec<BranchRecord>,
    pub connectors: Vec<Connector>,
    /// Total number of lanes.
    pub width: usize,
    /// Tag name to commit id.
    pub tags: HashMap<String, String>,
}

impl RepoModel {
    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    pub fn branch_of_commit(&self, commit_id: &str) -> Option<&Branch> {
        self.branches
            .iter()
            .find(|b| b.commit_ids.iter().any(|c| c == commit_id))
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            commits: self.arena.len(),
            branches: self.branches.len(),
            placeholders: self.branches.iter().filter(|b| b.is_multi_branch()).count(),
            connectors: self.connectors.len(),
            width: self.width,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelStats {
    pub commits: usize,
    pub branches: usize,
    pub placeholders: usize,
    pub connectors: usize,
    pub width: usize,
}

/// Runs the whole pass: DAG building, name resolution, topology grouping,
/// ordering and layout. Pure and deterministic: identical snapshots yield
/// identical models.
pub fn reconstruct(snapshot: &HistorySnapshot) -> Result<RepoModel, ReconstructError> {
    if snapshot.commits.is_empty() && !snapshot.branches.is_empty() {
        return Err(ReconstructError::InconsistentSnapshot {
            branches: snapshot.branches.len(),
        });
    }

    let mut arena = CommitGraphBuilder::build(&snapshot.commits);
    let resolution = BranchNameResolver::new(&mut arena, snapshot).resolve();
    let branches = BranchTopologyBuilder::build(&arena, &snapshot.branches, &resolution);
    let branches = order_branches(branches);
    let layout = LayoutEngine::new(&arena, &branches).compute();

    let model = assemble(arena, branches, layout, snapshot);
    debug!(
        commits = model.arena.len(),
        branches = model.branches.len(),
        width = model.width,
        "reconstruction pass finished"
    );
    Ok(model)
}

fn assemble(
    arena: CommitArena,
    branches: Vec<Branch>,
    layout: Layout,
    snapshot: &HistorySnapshot,
) -> RepoModel {
    let owner: HashMap<&str, &Branch> = branches
        .iter()
        .flat_map(|b| b.commit_ids.iter().map(move |id| (id.as_str(), b)))
        .collect();

    let commit_records = layout
        .row_order
        .iter()
        .enumerate()
        .filter_map(|(row, id)| {
            let branch = owner.get(id.as_str())?;
            let span = layout.spans.get(&branch.id)?;
            Some(CommitRecord {
                id: id.clone(),
                row,
                branch_id: branch.id.clone(),
                column: span.column,
            })
        })
        .collect();

    let branch_records = branches
        .iter()
        .filter_map(|b| {
            let span: &BranchSpan = layout.spans.get(&b.id)?;
            Some(BranchRecord {
                id: b.id.clone(),
                name: b.name.clone(),
                column: span.column,
                tip_row: span.tip_row,
                first_row: span.first_row,
                parent_branch_id: b.parent_branch_id.clone(),
                is_multi_branch: b.is_multi_branch(),
                candidate_names: b.candidate_names().to_vec(),
            })
        })
        .collect();

    let tags = snapshot
        .tags
        .iter()
        .map(|t| (t.name.clone(), t.commit_id.clone()))
        .collect();

    RepoModel {
        arena,
        branches,
        commit_records,
        branch_records,
        connectors: layout.connectors,
        width: layout.width,
        tags,
    }
}
