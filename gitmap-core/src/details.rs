use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};
use tracing::warn;

/// Paths touched by one commit, shared between all waiters of a fetch.
pub type ChangedFiles = Arc<Vec<String>>;

/// Seam to whatever actually reads the VCS. Injected so the cache policy
/// stays testable without a repository.
#[async_trait]
pub trait DetailsFetcher: Send + Sync {
    async fn changed_files(&self, commit_id: &str) -> Result<Vec<String>>;
}

/// Lazily fetched per-commit changed-file lists.
///
/// Concurrent requests for one commit id coalesce onto a single underlying
/// fetch and every waiter receives the same result. A request whose id is
/// no longer the most recently requested one is stale: it resolves to an
/// empty list instead of making the caller wait for data it no longer
/// shows. Fetch errors degrade to empty the same way.
pub struct CommitDetailsCache {
    fetcher: Arc<dyn DetailsFetcher>,
    state: Mutex<DetailsState>,
}

#[derive(Default)]
struct DetailsState {
    latest: Option<String>,
    cache: HashMap<String, ChangedFiles>,
    in_flight: HashMap<String, Vec<oneshot::Sender<ChangedFiles>>>,
}

impl CommitDetailsCache {
    pub fn new(fetcher: Arc<dyn DetailsFetcher>) -> Self {
        Self {
            fetcher,
            state: Mutex::new(DetailsState::default()),
        }
    }

    pub async fn changed_files(&self, commit_id: &str) -> ChangedFiles {
        let waiter = {
            let mut st = self.state.lock().await;
            st.latest = Some(commit_id.to_string());
            if let Some(hit) = st.cache.get(commit_id) {
                return hit.clone();
            }
            match st.in_flight.get_mut(commit_id) {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    st.in_flight.insert(commit_id.to_string(), Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            let value = rx.await.unwrap_or_else(|_| Arc::new(Vec::new()));
            return self.unless_stale(commit_id, value).await;
        }

        let (value, fetched_ok) = match self.fetcher.changed_files(commit_id).await {
            Ok(files) => (Arc::new(files), true),
            Err(e) => {
                warn!(commit = %commit_id, error = %e, "changed-file fetch failed");
                (Arc::new(Vec::new()), false)
            }
        };

        let waiters = {
            let mut st = self.state.lock().await;
            if fetched_ok {
                st.cache.insert(commit_id.to_string(), value.clone());
            }
            st.in_flight.remove(commit_id).unwrap_or_default()
        };
        for tx in waiters {
            let _ = tx.send(value.clone());
        }

        self.unless_stale(commit_id, value).await
    }

    async fn unless_stale(&self, commit_id: &str, value: ChangedFiles) -> ChangedFiles {
        let st = self.state.lock().await;
        if st.latest.as_deref() == Some(commit_id) {
            value
        } else {
            Arc::new(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingFetcher {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl DetailsFetcher for CountingFetcher {
        async fn changed_files(&self, commit_id: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(vec![format!("{commit_id}.rs")])
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl DetailsFetcher for FailingFetcher {
        async fn changed_files(&self, _commit_id: &str) -> Result<Vec<String>> {
            anyhow::bail!("boom")
        }
    }

    #[tokio::test]
    async fn concurrent_requests_coalesce_into_one_fetch() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(30),
        });
        let cache = Arc::new(CommitDetailsCache::new(fetcher.clone()));

        let (a, b, c) = tokio::join!(
            cache.changed_files("abc"),
            cache.changed_files("abc"),
            cache.changed_files("abc"),
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(*a, vec!["abc.rs".to_string()]);
    }

    #[tokio::test]
    async fn cached_ids_do_not_refetch() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(1),
        });
        let cache = CommitDetailsCache::new(fetcher.clone());

        cache.changed_files("abc").await;
        cache.changed_files("abc").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn superseded_request_returns_empty() {
        let fetcher = Arc::new(CountingFetcher {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(80),
        });
        let cache = Arc::new(CommitDetailsCache::new(fetcher));

        let slow_cache = cache.clone();
        let slow = tokio::spawn(async move { slow_cache.changed_files("old").await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fresh = cache.changed_files("new").await;
        assert_eq!(*fresh, vec!["new.rs".to_string()]);

        let stale = slow.await.unwrap();
        assert!(stale.is_empty(), "superseded request must come back empty");
    }

    #[tokio::test]
    async fn fetch_errors_degrade_to_empty() {
        let cache = CommitDetailsCache::new(Arc::new(FailingFetcher));
        let files = cache.changed_files("abc").await;
        assert!(files.is_empty());
    }
}
