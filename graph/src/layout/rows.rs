use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::core::{Branch, CommitArena};

/// Time-ordered row for every branch member.
///
/// Not a plain date sort: a commit may only take a row once all of its
/// children have one, so every commit's row is strictly greater than each
/// of its parents' rows even when timestamps tie or run backwards. Among
/// the commits whose children are all placed, the newest commit date goes
/// first, then input order.
pub fn assign_rows(arena: &CommitArena, branches: &[Branch]) -> Vec<String> {
    let members: HashSet<&str> = branches
        .iter()
        .flat_map(|b| b.commit_ids.iter())
        .map(String::as_str)
        .collect();
    let seq: HashMap<&str, usize> = arena
        .ids()
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut waiting_children: HashMap<&str, usize> = HashMap::new();
    for &id in &members {
        let Some(c) = arena.get(id) else { continue };
        let count = c
            .children
            .iter()
            .filter(|child| members.contains(child.as_str()))
            .count();
        waiting_children.insert(id, count);
    }

    #[derive(PartialEq, Eq, PartialOrd, Ord)]
    struct Ready {
        date: DateTime<Utc>,
        seq: Reverse<usize>,
        id: String,
    }

    let mut ready: BinaryHeap<Ready> = BinaryHeap::new();
    for (&id, &count) in &waiting_children {
        if count != 0 {
            continue;
        }
        if let Some(c) = arena.get(id) {
            ready.push(Ready {
                date: c.commit_date,
                seq: Reverse(seq.get(id).copied().unwrap_or(usize::MAX)),
                id: id.to_string(),
            });
        }
    }

    let mut rows: Vec<String> = Vec::with_capacity(members.len());
    let mut placed: HashSet<String> = HashSet::new();
    while let Some(next) = ready.pop() {
        if !placed.insert(next.id.clone()) {
            continue;
        }
        if let Some(c) = arena.get(&next.id) {
            for parent in &c.parents {
                let Some(count) = waiting_children.get_mut(parent.as_str()) else {
                    continue;
                };
                *count = count.saturating_sub(1);
                if *count == 0 {
                    if let Some(p) = arena.get(parent) {
                        ready.push(Ready {
                            date: p.commit_date,
                            seq: Reverse(seq.get(parent.as_str()).copied().unwrap_or(usize::MAX)),
                            id: parent.clone(),
                        });
                    }
                }
            }
        }
        rows.push(next.id);
    }

    // A malformed snapshot could leave members unplaced; append them so
    // every member still gets a row.
    if rows.len() < members.len() {
        warn!(
            missing = members.len() - rows.len(),
            "row ordering left commits unplaced, appending in input order"
        );
        for id in arena.ids() {
            if members.contains(id.as_str()) && !placed.contains(id) {
                rows.push(id.clone());
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommitGraphBuilder;
    use crate::resolve::BranchNameResolver;
    use crate::testutil::{feature_merge_history, local_ref, raw, snapshot};
    use crate::topology::BranchTopologyBuilder;

    fn rows_for(snap: &crate::input::HistorySnapshot) -> (CommitArena, Vec<String>) {
        let mut arena = CommitGraphBuilder::build(&snap.commits);
        let resolution = BranchNameResolver::new(&mut arena, snap).resolve();
        let branches = BranchTopologyBuilder::build(&arena, &snap.branches, &resolution);
        let rows = assign_rows(&arena, &branches);
        (arena, rows)
    }

    fn assert_monotonic(arena: &CommitArena, rows: &[String]) {
        let row_of: HashMap<&str, usize> = rows
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        for id in rows {
            let c = arena.get(id).unwrap();
            for parent in &c.parents {
                assert!(
                    row_of[id.as_str()] < row_of[parent.as_str()],
                    "{id} must sit above its parent {parent}"
                );
            }
        }
    }

    #[test]
    fn rows_follow_commit_date_newest_first() {
        let (_, rows) = rows_for(&feature_merge_history());
        assert_eq!(rows, vec!["f", "e", "c", "d", "b", "a"]);
    }

    #[test]
    fn rows_are_strictly_above_parents() {
        let (arena, rows) = rows_for(&feature_merge_history());
        assert_monotonic(&arena, &rows);
    }

    #[test]
    fn equal_timestamps_still_keep_parents_below() {
        let snap = snapshot(
            vec![
                raw("c", &["b"], "three", 5),
                raw("b", &["a"], "two", 5),
                raw("a", &[], "one", 5),
            ],
            vec![local_ref("master", "c")],
        );
        let (arena, rows) = rows_for(&snap);
        assert_eq!(rows, vec!["c", "b", "a"]);
        assert_monotonic(&arena, &rows);
    }

    #[test]
    fn skewed_clock_cannot_place_parent_above_child() {
        // The parent claims a newer timestamp than its child.
        let snap = snapshot(
            vec![
                raw("tip", &["old"], "child", 10),
                raw("old", &[], "parent with future clock", 99),
            ],
            vec![local_ref("master", "tip")],
        );
        let (arena, rows) = rows_for(&snap);
        assert_eq!(rows, vec!["tip", "old"]);
        assert_monotonic(&arena, &rows);
    }
}
