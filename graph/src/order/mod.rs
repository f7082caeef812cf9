use std::cmp::Ordering;

use crate::core::{Branch, BranchKind};
use crate::resolve::MASTER;

/// Deterministic display order over branches.
///
/// The comparator is deliberately partial: unrelated sibling names rank
/// equal, so a plain total-order sort does not apply. Each branch is
/// instead inserted before the first already-placed branch it must
/// precede, which keeps discovery order for unrelated pairs and is stable
/// across runs.
pub fn order_branches(branches: Vec<Branch>) -> Vec<Branch> {
    let mut ordered: Vec<Branch> = Vec::with_capacity(branches.len());
    for branch in branches {
        let at = ordered
            .iter()
            .position(|placed| compare_branches(&branch, placed) == Ordering::Less)
            .unwrap_or(ordered.len());
        ordered.insert(at, branch);
    }
    ordered
}

/// Branch precedence: master first, candidates before their multi-branch
/// placeholder, parents before children, then the hierarchical name
/// relation.
pub fn compare_branches(a: &Branch, b: &Branch) -> Ordering {
    match (a.name == MASTER, b.name == MASTER) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    if let BranchKind::MultiBranch { candidates } = &b.kind {
        if candidates.contains(&a.name) {
            return Ordering::Less;
        }
    }
    if let BranchKind::MultiBranch { candidates } = &a.kind {
        if candidates.contains(&b.name) {
            return Ordering::Greater;
        }
    }

    if b.parent_branch_id.as_deref() == Some(a.id.as_str()) {
        return Ordering::Less;
    }
    if a.parent_branch_id.as_deref() == Some(b.id.as_str()) {
        return Ordering::Greater;
    }

    compare_names(&a.name, &b.name)
}

/// Hierarchical name relation on `/`-separated branch names.
///
/// When both names share a deep prefix (more than 2 segments, secondarily
/// more than 1), the shared leading segments are dropped and the remainder
/// re-split on `_` before the positional comparison. A differing segment
/// means the names are siblings (no order); a name that is a strict prefix
/// of the other is its ancestor and sorts first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let pa: Vec<&str> = a.split('/').collect();
    let pb: Vec<&str> = b.split('/').collect();

    for shared in [2usize, 1] {
        if pa.len() > shared && pb.len() > shared && pa[..shared] == pb[..shared] {
            let ra: Vec<&str> = resplit(&pa[shared..]);
            let rb: Vec<&str> = resplit(&pb[shared..]);
            return compare_segments(&ra, &rb);
        }
    }

    compare_segments(&pa, &pb)
}

fn resplit<'a>(parts: &[&'a str]) -> Vec<&'a str> {
    parts.iter().flat_map(|p| p.split('_')).collect()
}

fn compare_segments(a: &[&str], b: &[&str]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        if x != y {
            // Siblings: no order implied.
            return Ordering::Equal;
        }
    }
    // One name is a prefix of the other; the shorter is the ancestor.
    a.len().cmp(&b.len())
}
