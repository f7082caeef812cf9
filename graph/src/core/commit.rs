use chrono::{DateTime, Utc};
use smallvec::SmallVec;

use crate::input::RawCommit;

/// Number of hex chars used for short ids and synthetic branch names.
pub const SHORT_ID_LEN: usize = 7;

/// Which resolution pass claimed a commit's branch name. Later passes may
/// only replace a claim according to the override table in `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// User-entered override, never replaced.
    Manual,
    /// Recorded branch-name note, never replaced.
    Note,
    /// Guessed from a merge subject; master seeding may replace it.
    Subject,
    /// Claimed by a first-parent walk from a branch tip.
    Ref,
    /// Inherited across an unnamed gap from a named first-child.
    Inherit,
    /// Synthesized placeholder (anonymous or multi-branch).
    Synthetic,
}

/// A commit in the arena.
///
/// `children` and `first_children` are derived adjacency: a child is a
/// "first child" of a parent P when P is the child's parent at index 0.
#[derive(Debug, Clone)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub parents: SmallVec<[String; 2]>,
    pub children: Vec<String>,
    pub first_children: Vec<String>,
    pub subject: String,
    pub author: String,
    pub author_date: DateTime<Utc>,
    pub commit_date: DateTime<Utc>,
    /// Resolved branch name; mutable during resolution, frozen afterwards.
    pub branch_name: Option<String>,
    pub name_source: Option<NameSource>,
    /// User-entered branch name, kept verbatim for display.
    pub manual_name: Option<String>,
    /// Source branch parsed from this commit's own merge subject.
    pub merge_source: Option<String>,
    /// Target branch parsed from this commit's own merge subject.
    pub merge_target: Option<String>,
    /// This commit's own likely branch, derived from subjects: the target of
    /// its own merge subject, or the source of a child's merge subject when
    /// this commit is the merged-in side.
    pub subject_hint: Option<String>,
}

impl Commit {
    pub fn from_raw(raw: &RawCommit) -> Self {
        let short_id = raw.id.chars().take(SHORT_ID_LEN).collect();
        Self {
            id: raw.id.clone(),
            short_id,
            parents: raw.parents.iter().cloned().collect(),
            children: Vec::new(),
            first_children: Vec::new(),
            subject: raw.subject.clone(),
            author: raw.author.clone(),
            author_date: raw.author_date,
            commit_date: raw.commit_date,
            branch_name: None,
            name_source: None,
            manual_name: None,
            merge_source: None,
            merge_target: None,
            subject_hint: None,
        }
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn second_parent(&self) -> Option<&str> {
        self.parents.get(1).map(String::as_str)
    }

    /// Resolved name, falling back to the subject-derived hint.
    pub fn effective_name(&self) -> Option<&str> {
        self.branch_name
            .as_deref()
            .or(self.subject_hint.as_deref())
    }
}
