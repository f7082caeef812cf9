/// Merge-subject phrasings, most specific first so the generic
/// `"Merge "`/`"Merged "` forms cannot swallow the longer ones.
const MERGE_PREFIXES: [&str; 7] = [
    "Merge branch ",
    "Merge remote-tracking branch ",
    "Merge ",
    "[MERGED] from ",
    "MERGED from ",
    "Merged from ",
    "Merged ",
];

/// Remote ref prefixes, longest first.
const REMOTE_PREFIXES: [&str; 3] = ["refs/remotes/origin/", "remotes/origin/", "origin/"];

/// Branch names extracted from one merge subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeNames {
    /// The branch that was merged in (the second parent's likely branch).
    pub source: String,
    /// The branch merged into (the merge commit's likely branch), when the
    /// subject states one.
    pub target: Option<String>,
}

/// Best-effort parse of a merge commit subject. Returns `None` for any
/// phrasing outside the known set; callers fall through to later passes.
pub fn parse_merge_subject(subject: &str) -> Option<MergeNames> {
    let rest = MERGE_PREFIXES
        .iter()
        .find_map(|p| subject.strip_prefix(p))?;

    let (token, remainder) = match rest.find(' ') {
        Some(at) => (&rest[..at], &rest[at..]),
        None => (rest, ""),
    };
    let source = clean_name(token);
    if source.is_empty() {
        return None;
    }

    let target = if let Some(at) = remainder.find(" into ") {
        let name = clean_name(&remainder[at + " into ".len()..]);
        (!name.is_empty()).then_some(name)
    } else if remainder.contains(" of ") {
        // "Merge branch 'x' of <url>": a fetched copy of the same branch.
        Some(source.clone())
    } else {
        None
    };

    Some(MergeNames { source, target })
}

/// Normalize a branch token: trim quote/punctuation clutter, strip remote
/// ref prefixes (longest first), and fold the common `Master` misspelling.
pub fn clean_name(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c| matches!(c, '\'' | '"' | '.' | ',' | ' '));
    let stripped = REMOTE_PREFIXES
        .iter()
        .find_map(|p| trimmed.strip_prefix(p))
        .unwrap_or(trimmed);
    let name = stripped.trim_matches(|c| matches!(c, '\'' | '"' | '.' | ',' | ' '));
    if name == "Master" {
        "master".to_string()
    } else {
        name.to_string()
    }
}
