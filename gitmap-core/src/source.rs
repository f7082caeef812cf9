use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use git2::{BranchType, Repository, Sort};

use graph::{BranchRef, HistorySnapshot, RawCommit, TagRef};

use crate::details::DetailsFetcher;

/// Reads one immutable [`HistorySnapshot`] from a repository on disk. The
/// analysis crates never see this type; they only consume the snapshot.
pub struct SnapshotSource {
    repo: Repository,
}

impl SnapshotSource {
    /// Open an existing repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())?;
        Ok(Self { repo })
    }

    /// Up to `max_count` commits reachable from any branch tip, in
    /// topological-then-time order, plus every branch ref and tag.
    pub fn snapshot(&self, max_count: usize) -> Result<HistorySnapshot> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        if self.repo.head().is_ok() {
            revwalk.push_head()?;
        }
        for entry in self.repo.branches(None)? {
            let (branch, _) = entry?;
            if let Some(target) = branch.get().target() {
                revwalk.push(target)?;
            }
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            if commits.len() >= max_count {
                break;
            }
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(RawCommit {
                id: oid.to_string(),
                parents: commit.parent_ids().map(|p| p.to_string()).collect(),
                subject: commit.summary().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("").to_string(),
                author_date: to_utc(commit.author().when().seconds()),
                commit_date: to_utc(commit.time().seconds()),
            });
        }

        let mut branches = Vec::new();
        for entry in self.repo.branches(None)? {
            let (branch, btype) = entry?;
            let Some(name) = branch.name()? else { continue };
            let Some(tip) = branch.get().target() else { continue };
            let tracking_tip_id = branch
                .upstream()
                .ok()
                .and_then(|u| u.get().target())
                .map(|oid| oid.to_string());
            branches.push(BranchRef {
                name: name.to_string(),
                tip_id: tip.to_string(),
                is_remote: btype == BranchType::Remote,
                tracking_tip_id,
            });
        }

        let mut tags = Vec::new();
        self.repo.tag_foreach(|oid, name| {
            if let Ok(name) = std::str::from_utf8(name) {
                if let Some(tag) = name.strip_prefix("refs/tags/") {
                    tags.push(TagRef {
                        name: tag.to_string(),
                        commit_id: oid.to_string(),
                    });
                }
            }
            true
        })?;

        Ok(HistorySnapshot {
            commits,
            branches,
            tags,
            overrides: Vec::new(),
            notes: Vec::new(),
        })
    }
}

fn to_utc(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// [`DetailsFetcher`] backed by tree diffs of the repository. Only the
/// touched paths are collected; diff content stays with the diff viewer.
pub struct GitDetailsFetcher {
    repo: Mutex<Repository>,
}

impl GitDetailsFetcher {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path.as_ref())?;
        Ok(Self {
            repo: Mutex::new(repo),
        })
    }
}

#[async_trait]
impl DetailsFetcher for GitDetailsFetcher {
    async fn changed_files(&self, commit_id: &str) -> Result<Vec<String>> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
        let oid = git2::Oid::from_str(commit_id)?;
        let commit = repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) {
                files.push(path.to_string_lossy().into_owned());
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn sig() -> Signature<'static> {
        Signature::now("Alice", "alice@example.com").unwrap()
    }

    fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig(), &sig(), message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn snapshot_lists_commits_and_refs() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "1", "first");
        commit_file(&repo, "b.txt", "2", "second");

        let source = SnapshotSource::open(dir.path()).unwrap();
        let snapshot = source.snapshot(100).unwrap();
        assert_eq!(snapshot.commits.len(), 2);
        assert_eq!(snapshot.branches.len(), 1);
        assert!(!snapshot.branches[0].is_remote);
        // Newest first, with the parent link in place.
        assert_eq!(snapshot.commits[0].subject, "second");
        assert_eq!(snapshot.commits[0].parents.len(), 1);
    }

    #[tokio::test]
    async fn details_fetcher_reports_touched_paths() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_file(&repo, "a.txt", "1", "first");
        let second = commit_file(&repo, "b.txt", "2", "second");

        let fetcher = GitDetailsFetcher::open(dir.path()).unwrap();
        let files = fetcher.changed_files(&second.to_string()).await.unwrap();
        assert_eq!(files, vec!["b.txt".to_string()]);
    }
}
