use chrono::{DateTime, TimeZone, Utc};

use graph::{BranchRef, HistorySnapshot, RawCommit};

fn ts(minutes: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + minutes * 60, 0).unwrap()
}

fn commit(id: &str, parents: &[&str], subject: &str, minutes: i64) -> RawCommit {
    RawCommit {
        id: id.to_string(),
        parents: parents.iter().map(|p| p.to_string()).collect(),
        subject: subject.to_string(),
        author: "Demo".to_string(),
        author_date: ts(minutes),
        commit_date: ts(minutes),
    }
}

/// Synthetic history with a merged feature, a pull merge and a live topic
/// branch, so every reconstruction stage has something to show.
fn demo_snapshot() -> HistorySnapshot {
    let commits = vec![
        commit("m6", &["m5", "t2"], "Merge branch 'topic/ui' into master", 90),
        commit("t2", &["t1"], "polish widget layout", 80),
        commit("m5", &["m4", "r1"], "Merge branch 'master' of example.com:demo", 70),
        commit("r1", &["m3"], "fetched upstream fix", 60),
        commit("t1", &["m4"], "start widget work", 55),
        commit("m4", &["m3"], "local changes", 50),
        commit("m3", &["m2", "f2"], "Merge branch 'feature1'", 40),
        commit("f2", &["f1"], "finish feature", 30),
        commit("m2", &["m1"], "mainline work", 25),
        commit("f1", &["m1"], "begin feature", 20),
        commit("m1", &[], "initial import", 10),
    ];
    let branches = vec![BranchRef {
        name: "master".to_string(),
        tip_id: "m6".to_string(),
        is_remote: false,
        tracking_tip_id: None,
    }];
    HistorySnapshot::new(commits, branches)
}

fn main() {
    println!("GitMap Topology Demo");
    println!("====================\n");

    let model = match graph::reconstruct(&demo_snapshot()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error reconstructing topology: {}", e);
            return;
        }
    };

    let stats = model.stats();
    println!("Reconstruction statistics:");
    println!("  Commits:  {}", stats.commits);
    println!("  Branches: {}", stats.branches);
    println!("  Lanes:    {}", stats.width);
    println!();

    println!("Branches:");
    for record in &model.branch_records {
        println!(
            "  lane {}  {:<12} rows {}-{}",
            record.column, record.name, record.tip_row, record.first_row
        );
    }
    println!();

    println!("Commit graph:");
    println!("─────────────");
    for record in &model.commit_records {
        let mut lanes = String::new();
        for column in 0..model.width {
            lanes.push(if column == record.column { '●' } else { '│' });
            lanes.push(' ');
        }
        let subject = model
            .arena
            .get(&record.id)
            .map(|c| c.subject.as_str())
            .unwrap_or("");
        println!("{} {}", lanes, subject);
    }
    println!();

    println!("Connectors:");
    for connector in &model.connectors {
        println!(
            "  {} -> {} ({:?}, {:?})",
            connector.from_id, connector.to_id, connector.kind, connector.style
        );
    }
}
