pub mod subject;

pub use subject::{clean_name, parse_merge_subject, MergeNames};

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::core::{Commit, CommitArena, NameSource};
use crate::input::HistorySnapshot;

/// The one branch name with authority over every other heuristic.
pub const MASTER: &str = "master";

/// Byproducts of name resolution that the topology builder needs: which
/// commits became multi-branch placeholders (with their candidate names)
/// and which tips got synthetic anonymous names.
#[derive(Debug, Default)]
pub struct Resolution {
    pub multibranch: HashMap<String, Vec<String>>,
    pub anonymous_tips: HashSet<String>,
}

/// Assigns a branch name to every commit through layered passes, each pass
/// filling only still-unnamed commits unless the override table says
/// otherwise (master seeding may replace subject guesses; manual overrides
/// and notes are never replaced).
pub struct BranchNameResolver<'a> {
    arena: &'a mut CommitArena,
    snapshot: &'a HistorySnapshot,
    multibranch: HashMap<String, Vec<String>>,
    anonymous_tips: HashSet<String>,
}

impl<'a> BranchNameResolver<'a> {
    pub fn new(arena: &'a mut CommitArena, snapshot: &'a HistorySnapshot) -> Self {
        Self {
            arena,
            snapshot,
            multibranch: HashMap::new(),
            anonymous_tips: HashSet::new(),
        }
    }

    pub fn resolve(mut self) -> Resolution {
        self.apply_overrides();
        self.apply_notes();
        self.derive_subject_names();
        self.seed_master();
        self.seed_active_branches();
        self.seed_structural_tips();
        self.inherit_gaps();
        self.synthesize_placeholders();

        let unnamed = self.arena.iter().filter(|c| c.branch_name.is_none()).count();
        debug!(
            commits = self.arena.len(),
            unnamed,
            placeholders = self.multibranch.len(),
            "branch name resolution finished"
        );

        Resolution {
            multibranch: self.multibranch,
            anonymous_tips: self.anonymous_tips,
        }
    }

    /// User-entered names. Applied first, never overwritten.
    fn apply_overrides(&mut self) {
        for ov in &self.snapshot.overrides {
            let name = clean_name(&ov.name);
            if name.is_empty() {
                continue;
            }
            match self.arena.get_mut(&ov.commit_id) {
                Some(c) => {
                    c.branch_name = Some(name);
                    c.name_source = Some(NameSource::Manual);
                    c.manual_name = Some(ov.name.clone());
                }
                None => warn!(commit = %ov.commit_id, "manual branch override for unknown commit"),
            }
        }
    }

    /// Names recorded by an earlier run. Below manual, above everything else.
    fn apply_notes(&mut self) {
        for note in &self.snapshot.notes {
            let name = clean_name(&note.name);
            if name.is_empty() {
                continue;
            }
            if let Some(c) = self.arena.get_mut(&note.commit_id) {
                if c.branch_name.is_none() {
                    c.branch_name = Some(name);
                    c.name_source = Some(NameSource::Note);
                }
            }
        }
    }

    /// Parse every merge commit's subject once. The merge commit keeps the
    /// parsed source/target pair and claims the target name; the second
    /// parent gets the source name as its own likely branch.
    fn derive_subject_names(&mut self) {
        let ids: Vec<String> = self.arena.ids().to_vec();
        for id in &ids {
            let (subject, second) = match self.arena.get(id) {
                Some(c) if c.is_merge() => {
                    (c.subject.clone(), c.second_parent().map(str::to_string))
                }
                _ => continue,
            };
            let Some(names) = parse_merge_subject(&subject) else {
                continue;
            };

            if let Some(c) = self.arena.get_mut(id) {
                c.merge_source = Some(names.source.clone());
                c.merge_target = names.target.clone();
                if c.subject_hint.is_none() {
                    c.subject_hint = names.target.clone();
                }
            }
            if let Some(target) = &names.target {
                self.claim(id, target, NameSource::Subject, false);
            }

            if let Some(second) = second {
                if let Some(sc) = self.arena.get_mut(&second) {
                    if sc.subject_hint.is_none() {
                        sc.subject_hint = Some(names.source.clone());
                    }
                }
                self.claim(&second, &names.source, NameSource::Subject, false);
            }
        }
    }

    /// Local master tip first, then the remote one. Master walks its whole
    /// first-parent chain (branch points included) and may replace subject
    /// guesses; pull-merge side chains it folds in are walked with the
    /// normal branch-point blocking.
    fn seed_master(&mut self) {
        let mut tips: Vec<(String, bool)> = self
            .snapshot
            .branches
            .iter()
            .filter(|r| clean_name(&r.name) == MASTER)
            .map(|r| (r.tip_id.clone(), r.is_remote))
            .collect();
        tips.sort_by_key(|(_, is_remote)| *is_remote);

        for (tip, _) in tips {
            self.walk_from(&tip, MASTER, NameSource::Ref, true, false);
        }
    }

    /// Every live ref except master, locals before remotes. Remote name
    /// prefixes are stripped so a local branch and its remote counterpart
    /// claim the same logical name.
    fn seed_active_branches(&mut self) {
        let mut refs: Vec<(String, String, bool)> = self
            .snapshot
            .branches
            .iter()
            .map(|r| (clean_name(&r.name), r.tip_id.clone(), r.is_remote))
            .filter(|(name, _, _)| !name.is_empty() && name != MASTER)
            .collect();
        refs.sort_by_key(|(_, _, is_remote)| *is_remote);

        for (name, tip, _) in refs {
            self.walk_from(&tip, &name, NameSource::Ref, false, true);
        }
    }

    /// Structural tips without a live ref: merged or deleted branches. The
    /// subject-derived hint names them; otherwise they become anonymous
    /// `Branch_<shortid>` runs.
    fn seed_structural_tips(&mut self) {
        let active_tips: HashSet<String> = self
            .snapshot
            .branches
            .iter()
            .map(|r| r.tip_id.clone())
            .collect();

        let ids: Vec<String> = self.arena.ids().to_vec();
        for id in &ids {
            let (is_tip, hint, named, short_id) = match self.arena.get(id) {
                Some(c) => (
                    c.first_children.is_empty(),
                    c.subject_hint.clone(),
                    c.branch_name.is_some(),
                    c.short_id.clone(),
                ),
                None => continue,
            };
            if !is_tip || active_tips.contains(id) {
                continue;
            }
            let (name, source) = match hint {
                Some(h) => (h, NameSource::Ref),
                // A tip already owned by some walk and without a hint of its
                // own needs no synthetic branch.
                None if named => continue,
                None => {
                    self.anonymous_tips.insert(id.clone());
                    (format!("Branch_{}", short_id), NameSource::Synthetic)
                }
            };
            self.walk_from(id, &name, source, false, true);
        }
    }

    /// A named commit whose first parent is unnamed pulls its name up the
    /// unnamed run while the chain stays unambiguous (single first-child).
    fn inherit_gaps(&mut self) {
        let ids: Vec<String> = self.arena.ids().to_vec();
        for id in &ids {
            let (name, mut cur) = match self.arena.get(id) {
                Some(c) => match c.branch_name.clone() {
                    Some(name) => (name, c.first_parent().map(str::to_string)),
                    None => continue,
                },
                None => continue,
            };
            while let Some(pid) = cur {
                let inheritable = self
                    .arena
                    .get(&pid)
                    .map(|p| p.branch_name.is_none() && p.first_children.len() == 1)
                    .unwrap_or(false);
                if !inheritable {
                    break;
                }
                self.claim(&pid, &name, NameSource::Inherit, false);
                cur = self
                    .arena
                    .get(&pid)
                    .and_then(|p| p.first_parent().map(str::to_string));
            }
        }
    }

    /// Last resort. Unnamed branch points become `Multibranch_<shortid>`
    /// placeholders listing the names observed among their children; any
    /// commit still left over becomes (the tip of) an anonymous run. No
    /// reachable commit stays unnamed.
    fn synthesize_placeholders(&mut self) {
        let ids: Vec<String> = self.arena.ids().to_vec();

        for id in &ids {
            let is_branch_point = self
                .arena
                .get(id)
                .map(|c| c.branch_name.is_none() && c.first_children.len() > 1)
                .unwrap_or(false);
            if !is_branch_point {
                continue;
            }
            let (short_id, first_parent, candidates) = match self.arena.get(id) {
                Some(c) => (
                    c.short_id.clone(),
                    c.first_parent().map(str::to_string),
                    self.candidate_names(c),
                ),
                None => continue,
            };
            let name = format!("Multibranch_{}", short_id);
            self.claim(id, &name, NameSource::Synthetic, false);
            self.multibranch.insert(id.clone(), candidates);
            if let Some(parent) = first_parent {
                self.walk_from(&parent, &name, NameSource::Synthetic, false, true);
            }
        }

        for id in &ids {
            let info = match self.arena.get(id) {
                Some(c) if c.branch_name.is_none() => {
                    (c.subject_hint.clone(), c.short_id.clone(), c.first_parent().map(str::to_string))
                }
                _ => continue,
            };
            let (hint, short_id, first_parent) = info;
            let name = hint.unwrap_or_else(|| {
                self.anonymous_tips.insert(id.clone());
                format!("Branch_{}", short_id)
            });
            self.claim(id, &name, NameSource::Synthetic, false);
            if let Some(parent) = first_parent {
                self.walk_from(&parent, &name, NameSource::Synthetic, false, true);
            }
        }
    }

    /// Distinct names seen among a branch point's children, first-children
    /// first, in encounter order.
    fn candidate_names(&self, c: &Commit) -> Vec<String> {
        let mut seen = Vec::new();
        for child in c.first_children.iter().chain(&c.children) {
            if let Some(name) = self.arena.get(child).and_then(Commit::effective_name) {
                if !seen.iter().any(|s| s == name) {
                    seen.push(name.to_string());
                }
            }
        }
        seen
    }

    /// First-parent walk claiming `name` downwards from `tip`.
    ///
    /// Stops at a commit it may not rename, and (when `block_primary`, or
    /// always on pull-merge side chains) one commit short of a branch point
    /// whose first-children do not all agree with the walked name. A merge
    /// whose second parent resolves to the walked name continues the walk
    /// down that side too, so both halves of a pull merge stay one branch.
    fn walk_from(
        &mut self,
        tip: &str,
        name: &str,
        source: NameSource,
        override_subject: bool,
        block_primary: bool,
    ) {
        let mut stack: Vec<(String, bool)> = vec![(tip.to_string(), block_primary)];
        let mut visited: HashSet<String> = HashSet::new();

        while let Some((start, blocking)) = stack.pop() {
            let mut cur = start;
            loop {
                if !visited.insert(cur.clone()) {
                    break;
                }
                let (stopped, first_parent, pull_second) = {
                    let Some(c) = self.arena.get(&cur) else { break };
                    let named_other = match c.branch_name.as_deref() {
                        Some(existing) if existing != name => {
                            !(override_subject && c.name_source == Some(NameSource::Subject))
                        }
                        _ => false,
                    };
                    let blocked = blocking
                        && c.first_children.len() > 1
                        && !self.first_children_agree(c, name);
                    let pull_second = c
                        .second_parent()
                        .filter(|s| self.matches_name(s, name))
                        .map(str::to_string);
                    (
                        named_other || blocked,
                        c.first_parent().map(str::to_string),
                        pull_second,
                    )
                };
                if stopped {
                    break;
                }
                self.claim(&cur, name, source, override_subject);
                if let Some(second) = pull_second {
                    stack.push((second, true));
                }
                match first_parent {
                    Some(p) => cur = p,
                    None => break,
                }
            }
        }
    }

    fn matches_name(&self, id: &str, name: &str) -> bool {
        self.arena
            .get(id)
            .map(|c| c.effective_name() == Some(name))
            .unwrap_or(false)
    }

    fn first_children_agree(&self, c: &Commit, name: &str) -> bool {
        c.first_children.iter().all(|fc| self.matches_name(fc, name))
    }

    /// The override table: unnamed commits are always claimable, same-name
    /// claims are no-ops, and only master seeding replaces subject guesses.
    fn claim(&mut self, id: &str, name: &str, source: NameSource, override_subject: bool) -> bool {
        let Some(c) = self.arena.get_mut(id) else {
            return false;
        };
        match (&c.branch_name, c.name_source) {
            (None, _) => {}
            (Some(existing), _) if existing == name => return true,
            (Some(_), Some(NameSource::Subject)) if override_subject => {}
            _ => return false,
        }
        c.branch_name = Some(name.to_string());
        c.name_source = Some(source);
        true
    }
}
