use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::commit::Commit;
use crate::input::RawCommit;

/// All commits of one snapshot, indexed by id.
///
/// Entities hold ids, never references; every relation is looked up through
/// the arena. Iteration uses the preserved input order so the whole pass is
/// deterministic for identical input.
#[derive(Debug, Clone, Default)]
pub struct CommitArena {
    commits: HashMap<String, Commit>,
    order: Vec<String>,
}

impl CommitArena {
    pub fn get(&self, id: &str) -> Option<&Commit> {
        self.commits.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Commit> {
        self.commits.get_mut(id)
    }

    /// Commit ids in input order (newest first for a typical log).
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.order.iter().filter_map(|id| self.commits.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Root commits (no parents, or all parents missing from the snapshot).
    pub fn roots(&self) -> Vec<&Commit> {
        self.iter().filter(|c| c.is_root()).collect()
    }

    /// Structural branch tips: commits no child claims as first parent.
    pub fn structural_tips(&self) -> Vec<&Commit> {
        self.iter().filter(|c| c.first_children.is_empty()).collect()
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            total_commits: self.len(),
            merge_commits: self.iter().filter(|c| c.is_merge()).count(),
            root_commits: self.iter().filter(|c| c.is_root()).count(),
            tip_commits: self.structural_tips().len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArenaStats {
    pub total_commits: usize,
    pub merge_commits: usize,
    pub root_commits: usize,
    pub tip_commits: usize,
}

/// Turns a flat commit list into the arena with parent/child and
/// first-child adjacency. O(V+E).
pub struct CommitGraphBuilder;

impl CommitGraphBuilder {
    pub fn build(raws: &[RawCommit]) -> CommitArena {
        let known: HashSet<&str> = raws.iter().map(|r| r.id.as_str()).collect();

        let mut arena = CommitArena::default();
        for raw in raws {
            if arena.commits.contains_key(&raw.id) {
                warn!(commit = %raw.id, "duplicate commit id in snapshot, keeping first");
                continue;
            }
            let mut commit = Commit::from_raw(raw);
            commit.parents.retain(|p| {
                if known.contains(p.as_str()) {
                    true
                } else {
                    warn!(commit = %raw.id, parent = %p, "parent missing from snapshot, treating commit as root");
                    false
                }
            });
            arena.order.push(raw.id.clone());
            arena.commits.insert(raw.id.clone(), commit);
        }

        let ids = arena.order.clone();
        for id in &ids {
            let parents: Vec<(usize, String)> = arena.commits[id]
                .parents
                .iter()
                .cloned()
                .enumerate()
                .collect();
            for (idx, parent_id) in parents {
                let Some(parent) = arena.commits.get_mut(&parent_id) else {
                    continue;
                };
                if !parent.children.contains(id) {
                    parent.children.push(id.clone());
                }
                if idx == 0 && !parent.first_children.contains(id) {
                    parent.first_children.push(id.clone());
                }
            }
        }

        arena
    }
}
