/// Distinguishes real branches from synthetic placeholders standing in for
/// an unresolved branch point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchKind {
    Normal,
    /// Placeholder for a commit whose true owning branch is ambiguous.
    /// Candidates are the branch names observed among its first children.
    MultiBranch { candidates: Vec<String> },
}

/// A maximal first-parent run of commits sharing one resolved name.
///
/// Two branches may share a display name (a branch deleted and recreated,
/// or a fetched copy folded back by a pull merge) but never an id.
#[derive(Debug, Clone)]
pub struct Branch {
    /// Deterministic id: display name plus the tip's short id.
    pub id: String,
    pub name: String,
    pub tip_id: String,
    /// Oldest commit of the run.
    pub first_id: String,
    /// Mainline parent of the first commit, absent for a root.
    pub parent_commit_id: Option<String>,
    /// Branch owning the parent commit, resolved after all runs are built.
    pub parent_branch_id: Option<String>,
    /// Members of the run, newest first, contiguous along first-parent links.
    pub commit_ids: Vec<String>,
    /// Has a live local ref at its tip.
    pub is_active: bool,
    /// Has a remote tracking ref.
    pub is_remote: bool,
    /// Named `Branch_<shortid>` because no better name could be derived.
    pub is_anonymous: bool,
    pub kind: BranchKind,
}

impl Branch {
    pub fn branch_id(name: &str, tip_short_id: &str) -> String {
        format!("{}@{}", name, tip_short_id)
    }

    pub fn is_multi_branch(&self) -> bool {
        matches!(self.kind, BranchKind::MultiBranch { .. })
    }

    pub fn candidate_names(&self) -> &[String] {
        match &self.kind {
            BranchKind::MultiBranch { candidates } => candidates,
            BranchKind::Normal => &[],
        }
    }
}
