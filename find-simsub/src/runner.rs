//! Background execution of checking runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use hashbrown::HashMap;

use crate::errors::Result;
use crate::report::DocumentReport;
use crate::{Document, SimilarityChecker};

/// Lifecycle of a single checking run.
///
/// `Checked` and `Failed` are terminal; a failed run leaves no partial
/// state and re-running the same inputs reproduces identical reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The worker has not started processing yet.
    Unchecked,
    /// The worker is processing the corpus.
    Running,
    /// The run completed and produced reports.
    Checked,
    /// The run failed or was cancelled.
    Failed,
}

/// Handle to a checking run executing on a background worker thread,
/// keeping the run off the caller's synchronous path.
pub struct CheckRun {
    state: Arc<Mutex<RunState>>,
    cancel: Arc<AtomicBool>,
    handle: thread::JoinHandle<Result<HashMap<String, DocumentReport>>>,
}

impl CheckRun {
    /// Spawns a worker checking `documents` with `checker`.
    pub fn spawn(checker: SimilarityChecker, documents: Vec<Document>) -> Self {
        let state = Arc::new(Mutex::new(RunState::Unchecked));
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_state = Arc::clone(&state);
        let worker_cancel = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            set_state(&worker_state, RunState::Running);
            let result = checker.run(&documents, Some(&worker_cancel));
            let terminal = if result.is_ok() {
                RunState::Checked
            } else {
                RunState::Failed
            };
            set_state(&worker_state, terminal);
            result
        });
        Self {
            state,
            cancel,
            handle,
        }
    }

    /// Current state of the run.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Requests cooperative cancellation. The worker observes the flag at
    /// phase boundaries and between refinement chunks, then fails the run
    /// with a `Cancelled` error.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Waits for the worker and returns the final reports.
    pub fn join(self) -> Result<HashMap<String, DocumentReport>> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn set_state(state: &Mutex<RunState>, next: RunState) {
    *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}
