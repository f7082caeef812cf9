use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A commit as reported by the VCS access layer, before any analysis.
///
/// Parent order is significant: index 0 is the mainline parent, index 1 the
/// merge-source parent. More than two parents are not modeled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCommit {
    pub id: String,
    pub parents: Vec<String>,
    pub subject: String,
    pub author: String,
    pub author_date: DateTime<Utc>,
    pub commit_date: DateTime<Utc>,
}

/// A live branch reference (local or remote tracking).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRef {
    pub name: String,
    pub tip_id: String,
    pub is_remote: bool,
    /// Tip of the tracking counterpart, when the VCS layer knows it.
    pub tracking_tip_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRef {
    pub name: String,
    pub commit_id: String,
}

/// A user-entered branch name for a single commit. Highest priority input:
/// no later resolution pass may overwrite it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameOverride {
    pub commit_id: String,
    pub name: String,
}

/// A previously-recorded branch name for a commit, e.g. restored from notes
/// kept by an earlier run. Below manual overrides, above subject parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameNote {
    pub commit_id: String,
    pub name: String,
}

/// One immutable input snapshot for a reconstruction pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub commits: Vec<RawCommit>,
    pub branches: Vec<BranchRef>,
    pub tags: Vec<TagRef>,
    pub overrides: Vec<NameOverride>,
    pub notes: Vec<NameNote>,
}

impl HistorySnapshot {
    pub fn new(commits: Vec<RawCommit>, branches: Vec<BranchRef>) -> Self {
        Self {
            commits,
            branches,
            ..Default::default()
        }
    }
}
