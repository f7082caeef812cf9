use std::collections::HashMap;

use tracing::debug;

use crate::core::Branch;

/// Rows on each side a branch keeps clear so it never visually touches a
/// sibling sharing its column.
pub const SPAN_MARGIN: usize = 1;

/// A branch's placement: its lane and the rows its run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchSpan {
    pub column: usize,
    pub tip_row: usize,
    pub first_row: usize,
}

impl BranchSpan {
    fn padded_top(&self) -> usize {
        self.tip_row.saturating_sub(SPAN_MARGIN)
    }

    fn padded_bottom(&self) -> usize {
        self.first_row + SPAN_MARGIN
    }

    fn overlaps(&self, other: &BranchSpan) -> bool {
        self.padded_top() <= other.padded_bottom() && other.padded_top() <= self.padded_bottom()
    }
}

/// Assigns each branch the leftmost free lane, searching from one past its
/// parent branch's lane. Branches must already be in display order; the
/// result maps branch id to its span. Returns the spans and the total
/// column count.
pub fn assign_columns(
    branches: &[Branch],
    row_of: &HashMap<String, usize>,
) -> (HashMap<String, BranchSpan>, usize) {
    let mut spans: HashMap<String, BranchSpan> = HashMap::new();
    let mut placed: Vec<(String, BranchSpan)> = Vec::new();
    let mut max_column = 0usize;

    for branch in branches {
        let (Some(&tip_row), Some(&first_row)) =
            (row_of.get(&branch.tip_id), row_of.get(&branch.first_id))
        else {
            continue;
        };

        let start = branch
            .parent_branch_id
            .as_ref()
            .and_then(|pid| spans.get(pid))
            .map(|parent| parent.column + 1)
            .unwrap_or(0);

        let mut span = BranchSpan {
            column: start,
            tip_row,
            first_row,
        };
        while placed
            .iter()
            .any(|(_, other)| other.column == span.column && other.overlaps(&span))
        {
            span.column += 1;
        }

        max_column = max_column.max(span.column);
        spans.insert(branch.id.clone(), span);
        placed.push((branch.id.clone(), span));
    }

    let width = if branches.is_empty() { 0 } else { max_column + 1 };
    debug!(branches = branches.len(), width, "columns assigned");
    (spans, width)
}
