use chrono::{DateTime, TimeZone, Utc};

use crate::input::{BranchRef, HistorySnapshot, RawCommit};

pub fn ts(minutes: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + minutes * 60, 0).unwrap()
}

/// Raw commit with both dates at `minutes` past a fixed epoch.
pub fn raw(id: &str, parents: &[&str], subject: &str, minutes: i64) -> RawCommit {
    RawCommit {
        id: id.to_string(),
        parents: parents.iter().map(|p| p.to_string()).collect(),
        subject: subject.to_string(),
        author: "Alice".to_string(),
        author_date: ts(minutes),
        commit_date: ts(minutes),
    }
}

pub fn local_ref(name: &str, tip: &str) -> BranchRef {
    BranchRef {
        name: name.to_string(),
        tip_id: tip.to_string(),
        is_remote: false,
        tracking_tip_id: None,
    }
}

pub fn remote_ref(name: &str, tip: &str) -> BranchRef {
    BranchRef {
        name: name.to_string(),
        tip_id: tip.to_string(),
        is_remote: true,
        tracking_tip_id: None,
    }
}

pub fn snapshot(commits: Vec<RawCommit>, branches: Vec<BranchRef>) -> HistorySnapshot {
    HistorySnapshot::new(commits, branches)
}

/// Feature-merge history: master a→b→c with feature1 d→e forked at b and
/// merged back by f.
pub fn feature_merge_history() -> HistorySnapshot {
    snapshot(
        vec![
            raw("f", &["c", "e"], "Merge branch 'feature1'", 50),
            raw("e", &["d"], "feature work 2", 40),
            raw("c", &["b"], "mainline 3", 35),
            raw("d", &["b"], "feature work 1", 30),
            raw("b", &["a"], "mainline 2", 20),
            raw("a", &[], "mainline 1", 10),
        ],
        vec![local_ref("master", "f")],
    )
}
