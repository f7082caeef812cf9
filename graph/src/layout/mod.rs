pub mod columns;
pub mod connectors;
pub mod rows;

pub use columns::{assign_columns, BranchSpan, SPAN_MARGIN};
pub use connectors::{collect_connectors, Connector, ConnectorKind, ConnectorStyle};
pub use rows::assign_rows;

use std::collections::HashMap;

use crate::core::{Branch, CommitArena};

/// Full geometry for one reconstruction: a row per commit, a lane per
/// branch, and the connector lines between them.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Commit ids in row order (row index = position).
    pub row_order: Vec<String>,
    pub row_of: HashMap<String, usize>,
    /// Branch id to its lane and row span.
    pub spans: HashMap<String, BranchSpan>,
    pub connectors: Vec<Connector>,
    /// Total number of lanes in use.
    pub width: usize,
}

/// Runs the three layout stages over branches already in display order.
pub struct LayoutEngine<'a> {
    arena: &'a CommitArena,
    branches: &'a [Branch],
}

impl<'a> LayoutEngine<'a> {
    pub fn new(arena: &'a CommitArena, branches: &'a [Branch]) -> Self {
        Self { arena, branches }
    }

    pub fn compute(&self) -> Layout {
        let row_order = assign_rows(self.arena, self.branches);
        let row_of: HashMap<String, usize> = row_order
            .iter()
            .enumerate()
            .map(|(row, id)| (id.clone(), row))
            .collect();

        let (spans, width) = assign_columns(self.branches, &row_of);

        let owner: HashMap<String, String> = self
            .branches
            .iter()
            .flat_map(|b| b.commit_ids.iter().map(|id| (id.clone(), b.id.clone())))
            .collect();
        let connectors =
            collect_connectors(self.arena, self.branches, &row_of, &spans, &owner);

        Layout {
            row_order,
            row_of,
            spans,
            connectors,
            width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommitGraphBuilder;
    use crate::order::order_branches;
    use crate::resolve::BranchNameResolver;
    use crate::testutil::{feature_merge_history, local_ref, raw, snapshot};
    use crate::topology::BranchTopologyBuilder;

    fn compute(snap: &crate::input::HistorySnapshot) -> (Vec<Branch>, Layout) {
        let mut arena = CommitGraphBuilder::build(&snap.commits);
        let resolution = BranchNameResolver::new(&mut arena, snap).resolve();
        let branches = BranchTopologyBuilder::build(&arena, &snap.branches, &resolution);
        let branches = order_branches(branches);
        let layout = LayoutEngine::new(&arena, &branches).compute();
        (branches, layout)
    }

    #[test]
    fn merge_connector_links_merge_commit_to_source_parent() {
        let (_, layout) = compute(&feature_merge_history());
        let merge = layout
            .connectors
            .iter()
            .find(|c| c.kind == ConnectorKind::MergeIn)
            .unwrap();
        assert_eq!(merge.from_id, "f");
        assert_eq!(merge.to_id, "e");
        assert!(merge.from_row < merge.to_row);
        assert_eq!(merge.style, ConnectorStyle::Solid);
    }

    #[test]
    fn branch_start_connector_reaches_parent_branch() {
        let (branches, layout) = compute(&feature_merge_history());
        let feature = branches.iter().find(|b| b.name == "feature1").unwrap();
        let start = layout
            .connectors
            .iter()
            .find(|c| c.is_branch_start())
            .unwrap();
        assert_eq!(start.from_id, feature.first_id);
        assert_eq!(start.to_id, "b");
        assert_eq!(start.column_delta(), -1);
    }

    #[test]
    fn pull_merge_connector_is_dashed() {
        // The fetched copy carries the same name on a second run, so its
        // merge line renders in the tracking style.
        let snap = snapshot(
            vec![
                raw("m", &["b", "s"], "Merge branch 'master' of github.com:acme/repo", 50),
                raw("s", &["a"], "remote work", 40),
                raw("b", &["a"], "local work", 30),
                raw("a", &[], "base", 10),
            ],
            vec![local_ref("master", "m")],
        );
        let (_, layout) = compute(&snap);
        let merge = layout
            .connectors
            .iter()
            .find(|c| c.kind == ConnectorKind::MergeIn)
            .unwrap();
        assert_eq!(merge.style, ConnectorStyle::Dashed);
    }
}
