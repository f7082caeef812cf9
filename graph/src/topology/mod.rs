use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::{Branch, BranchKind, CommitArena};
use crate::input::BranchRef;
use crate::resolve::{clean_name, Resolution};

/// Groups named commits into maximal first-parent runs and links runs into
/// a parent/child branch hierarchy.
pub struct BranchTopologyBuilder;

impl BranchTopologyBuilder {
    pub fn build(
        arena: &CommitArena,
        refs: &[BranchRef],
        resolution: &Resolution,
    ) -> Vec<Branch> {
        let mut owner: HashMap<String, String> = HashMap::new();
        let mut branches: Vec<Branch> = Vec::new();

        for id in arena.ids() {
            let Some(c) = arena.get(id) else { continue };
            let Some(name) = c.branch_name.as_deref() else {
                continue;
            };

            // A run tip is a commit none of whose first-children share its
            // name; everything below it with the same name joins the run.
            let mid_run = c.first_children.iter().any(|fc| {
                arena
                    .get(fc)
                    .map(|f| f.branch_name.as_deref() == Some(name))
                    .unwrap_or(false)
            });
            if mid_run {
                continue;
            }
            if owner.contains_key(id) {
                debug!(commit = %id, "commit already owned by another branch");
                continue;
            }

            let branch_id = Branch::branch_id(name, &c.short_id);
            let mut run: Vec<String> = Vec::new();
            let mut cur = Some(id.clone());
            while let Some(cid) = cur {
                if owner.contains_key(&cid) {
                    warn!(commit = %cid, branch = %branch_id, "commit already owned by another branch");
                    break;
                }
                let Some(cc) = arena.get(&cid) else { break };
                if cc.branch_name.as_deref() != Some(name) {
                    break;
                }
                owner.insert(cid.clone(), branch_id.clone());
                run.push(cid.clone());
                cur = cc.first_parent().map(str::to_string);
            }
            if run.is_empty() {
                continue;
            }

            let first_id = run[run.len() - 1].clone();
            let kind = match resolution.multibranch.get(id) {
                Some(candidates) => BranchKind::MultiBranch {
                    candidates: candidates.clone(),
                },
                None => BranchKind::Normal,
            };
            branches.push(Branch {
                id: branch_id,
                name: name.to_string(),
                tip_id: id.clone(),
                first_id,
                parent_commit_id: None,
                parent_branch_id: None,
                commit_ids: run,
                is_active: false,
                is_remote: false,
                is_anonymous: resolution.anonymous_tips.contains(id),
                kind,
            });
        }

        // Parent links and live-ref flags need the complete owner map: a
        // parent commit may belong to a run built later.
        for branch in &mut branches {
            branch.parent_commit_id = arena
                .get(&branch.first_id)
                .and_then(|c| c.first_parent())
                .map(str::to_string);
            branch.parent_branch_id = branch
                .parent_commit_id
                .as_ref()
                .and_then(|pid| owner.get(pid))
                .filter(|owning| **owning != branch.id)
                .cloned();

            for r in refs {
                if clean_name(&r.name) != branch.name {
                    continue;
                }
                let tip_owned = owner.get(&r.tip_id) == Some(&branch.id);
                if tip_owned && !r.is_remote {
                    branch.is_active = true;
                }
                if tip_owned && r.is_remote {
                    branch.is_remote = true;
                }
                // A local ref that tracks a remote tip inside this run also
                // marks the run as remote-backed.
                if let Some(tracking) = &r.tracking_tip_id {
                    if owner.get(tracking) == Some(&branch.id) {
                        branch.is_remote = true;
                    }
                }
            }
        }

        debug!(branches = branches.len(), "branch topology built");
        branches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CommitGraphBuilder;
    use crate::input::NameOverride;
    use crate::resolve::BranchNameResolver;
    use crate::testutil::{feature_merge_history, local_ref, raw, snapshot};

    fn build(snap: &crate::input::HistorySnapshot) -> Vec<Branch> {
        let mut arena = CommitGraphBuilder::build(&snap.commits);
        let resolution = BranchNameResolver::new(&mut arena, snap).resolve();
        BranchTopologyBuilder::build(&arena, &snap.branches, &resolution)
    }

    fn by_name<'a>(branches: &'a [Branch], name: &str) -> &'a Branch {
        branches.iter().find(|b| b.name == name).unwrap()
    }

    #[test]
    fn feature_branch_links_to_master() {
        let branches = build(&feature_merge_history());
        assert_eq!(branches.len(), 2);

        let master = by_name(&branches, "master");
        assert_eq!(master.tip_id, "f");
        assert_eq!(master.first_id, "a");
        assert_eq!(master.commit_ids, vec!["f", "c", "b", "a"]);
        assert!(master.is_active);
        assert!(master.parent_branch_id.is_none());

        let feature = by_name(&branches, "feature1");
        assert_eq!(feature.commit_ids, vec!["e", "d"]);
        assert_eq!(feature.parent_commit_id.as_deref(), Some("b"));
        assert_eq!(feature.parent_branch_id.as_deref(), Some(master.id.as_str()));
        assert!(!feature.is_active);
    }

    #[test]
    fn recreated_name_yields_two_branches() {
        let mut snap = snapshot(
            vec![
                raw("t2", &["m2"], "new incarnation", 50),
                raw("m2", &["m1"], "main 2", 40),
                raw("t1", &["m1"], "old incarnation", 30),
                raw("m1", &[], "main 1", 10),
            ],
            vec![local_ref("master", "m2")],
        );
        snap.overrides.push(NameOverride {
            commit_id: "t2".to_string(),
            name: "ephemeral".to_string(),
        });
        snap.overrides.push(NameOverride {
            commit_id: "t1".to_string(),
            name: "ephemeral".to_string(),
        });

        let branches = build(&snap);
        let incarnations: Vec<&Branch> =
            branches.iter().filter(|b| b.name == "ephemeral").collect();
        assert_eq!(incarnations.len(), 2);
        assert_ne!(incarnations[0].id, incarnations[1].id);
    }

    #[test]
    fn runs_are_contiguous_first_parent_chains() {
        let branches = build(&feature_merge_history());
        let arena = CommitGraphBuilder::build(&feature_merge_history().commits);
        for b in &branches {
            for pair in b.commit_ids.windows(2) {
                let newer = arena.get(&pair[0]).unwrap();
                assert_eq!(newer.first_parent(), Some(pair[1].as_str()));
            }
        }
    }

    #[test]
    fn multibranch_run_carries_candidates() {
        let snap = snapshot(
            vec![
                raw("m", &["bm", "s"], "Merge branch 'master' of github.com:acme/repo", 70),
                raw("s", &["ca"], "fetched", 60),
                raw("rt", &["cb"], "release work", 55),
                raw("bm", &["b0"], "main work", 50),
                raw("ca", &["x0000001"], "copied side", 40),
                raw("cb", &["x0000001"], "release side", 35),
                raw("b0", &[], "main root", 20),
                raw("x0000001", &[], "fork", 10),
            ],
            vec![local_ref("master", "m"), local_ref("release/2.0", "rt")],
        );
        let branches = build(&snap);
        let placeholder = branches.iter().find(|b| b.is_multi_branch()).unwrap();
        assert_eq!(placeholder.commit_ids, vec!["x0000001"]);
        assert!(placeholder
            .candidate_names()
            .contains(&"master".to_string()));
        assert!(placeholder
            .candidate_names()
            .contains(&"release/2.0".to_string()));
    }
}
