use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use graph::{reconstruct, HistorySnapshot, ReconstructError, RepoModel};

/// Serializes reconstruction passes: at most one runs at a time, and a
/// newer submission supersedes anything still in flight. The in-flight
/// pass is not hard-cancelled; its result is simply discarded once it
/// finishes (last request wins, no queue).
pub struct ReconstructionService {
    state: Mutex<ServiceState>,
}

#[derive(Default)]
struct ServiceState {
    pending: Option<HistorySnapshot>,
    running: bool,
    latest: Option<Arc<RepoModel>>,
    generation: u64,
}

impl ReconstructionService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServiceState::default()),
        }
    }

    /// Request a rebuild for `snapshot`.
    ///
    /// If another caller is mid-pass, the snapshot is parked for it to pick
    /// up and this call returns `Ok(None)` without blocking. Otherwise this
    /// caller runs passes until no newer snapshot has been parked, publishes
    /// the final model, and returns it. A failed pass keeps the previous
    /// model and reports the error to this caller.
    pub fn submit(
        &self,
        snapshot: HistorySnapshot,
    ) -> Result<Option<Arc<RepoModel>>, ReconstructError> {
        {
            let mut st = self.lock();
            st.pending = Some(snapshot);
            if st.running {
                return Ok(None);
            }
            st.running = true;
        }

        loop {
            let snapshot = {
                let mut st = self.lock();
                match st.pending.take() {
                    Some(s) => s,
                    None => {
                        st.running = false;
                        return Ok(None);
                    }
                }
            };

            let result = reconstruct(&snapshot);

            let mut st = self.lock();
            if st.pending.is_some() {
                debug!("discarding superseded reconstruction result");
                continue;
            }
            st.running = false;
            match result {
                Ok(model) => {
                    let model = Arc::new(model);
                    st.latest = Some(model.clone());
                    st.generation += 1;
                    return Ok(Some(model));
                }
                Err(e) => {
                    warn!(error = %e, "reconstruction failed, keeping previous model");
                    return Err(e);
                }
            }
        }
    }

    /// Most recently published model, if any pass has succeeded yet.
    pub fn latest(&self) -> Option<Arc<RepoModel>> {
        self.lock().latest.clone()
    }

    /// Bumped once per published model.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReconstructionService {
    fn default() -> Self {
        Self::new()
    }
}
