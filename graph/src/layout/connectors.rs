use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Branch, CommitArena};

use super::columns::BranchSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorKind {
    /// A merge commit reaching over to its merge-source parent.
    MergeIn,
    /// A branch's first commit reaching down to its parent branch.
    BranchStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorStyle {
    Solid,
    /// The two endpoints sit on distinct branches with one display name:
    /// the local and remote sides of the same logical branch.
    Dashed,
}

/// Geometry for one line between two commits in the rendered graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub from_id: String,
    pub to_id: String,
    pub kind: ConnectorKind,
    pub style: ConnectorStyle,
    pub from_row: usize,
    pub from_column: usize,
    pub to_row: usize,
    pub to_column: usize,
}

impl Connector {
    pub fn is_branch_start(&self) -> bool {
        self.kind == ConnectorKind::BranchStart
    }

    /// Horizontal lane distance covered by this line.
    pub fn column_delta(&self) -> isize {
        self.to_column as isize - self.from_column as isize
    }

    pub fn row_span(&self) -> usize {
        self.to_row.saturating_sub(self.from_row)
    }
}

/// Connectors for every merge commit and every branch start, in row order
/// then branch order.
pub fn collect_connectors(
    arena: &CommitArena,
    branches: &[Branch],
    row_of: &HashMap<String, usize>,
    spans: &HashMap<String, BranchSpan>,
    owner: &HashMap<String, String>,
) -> Vec<Connector> {
    let by_id: HashMap<&str, &Branch> = branches.iter().map(|b| (b.id.as_str(), b)).collect();
    let column_of = |commit_id: &str| -> Option<usize> {
        owner
            .get(commit_id)
            .and_then(|bid| spans.get(bid))
            .map(|span| span.column)
    };
    let style_between = |a: &str, b: &str| -> ConnectorStyle {
        let owners = (owner.get(a), owner.get(b));
        if let (Some(oa), Some(ob)) = owners {
            if oa != ob {
                let same_name = match (by_id.get(oa.as_str()), by_id.get(ob.as_str())) {
                    (Some(ba), Some(bb)) => ba.name == bb.name,
                    _ => false,
                };
                if same_name {
                    return ConnectorStyle::Dashed;
                }
            }
        }
        ConnectorStyle::Solid
    };

    let mut connectors = Vec::new();

    let mut in_rows: Vec<(&String, &usize)> = row_of.iter().collect();
    in_rows.sort_by_key(|entry| *entry.1);
    for (id, &row) in in_rows {
        let Some(c) = arena.get(id) else { continue };
        let Some(second) = c.second_parent() else {
            continue;
        };
        let (Some(&to_row), Some(from_column), Some(to_column)) =
            (row_of.get(second), column_of(id), column_of(second))
        else {
            continue;
        };
        connectors.push(Connector {
            from_id: id.clone(),
            to_id: second.to_string(),
            kind: ConnectorKind::MergeIn,
            style: style_between(id, second),
            from_row: row,
            from_column,
            to_row,
            to_column,
        });
    }

    for branch in branches {
        let Some(parent_commit) = &branch.parent_commit_id else {
            continue;
        };
        if owner.get(parent_commit) == Some(&branch.id) {
            continue;
        }
        let (Some(&from_row), Some(&to_row)) =
            (row_of.get(&branch.first_id), row_of.get(parent_commit))
        else {
            continue;
        };
        let (Some(from_column), Some(to_column)) =
            (column_of(&branch.first_id), column_of(parent_commit))
        else {
            continue;
        };
        connectors.push(Connector {
            from_id: branch.first_id.clone(),
            to_id: parent_commit.clone(),
            kind: ConnectorKind::BranchStart,
            style: style_between(&branch.first_id, parent_commit),
            from_row,
            from_column,
            to_row,
            to_column,
        });
    }

    connectors
}
