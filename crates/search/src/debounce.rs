//! Keystroke debouncing
//!
//! A [`Debouncer`] sits between the search bar and the orchestrator. Every
//! input restarts the quiet window; only input that stays unchanged for the
//! whole window is submitted. While waiting, the orchestrator reports
//! [`SearchPhase::Debouncing`](crate::session::SearchPhase::Debouncing).
//!
//! Clearing the bar takes effect immediately. Input that settles back to
//! the query already being shown is not submitted again.

use crate::orchestrator::SearchOrchestrator;
use nimbus_core::{Error, Result};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Debounced front door to a [`SearchOrchestrator`]
///
/// Dropping the debouncer stops its worker; pending input is discarded.
#[derive(Debug)]
pub struct Debouncer {
    input: watch::Sender<String>,
    worker: JoinHandle<()>,
}

impl Debouncer {
    /// Start a debouncer using the orchestrator's configured window
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub fn spawn(orchestrator: SearchOrchestrator) -> Result<Self> {
        let window = orchestrator.config().debounce();
        Self::with_window(orchestrator, window)
    }

    /// Start a debouncer with an explicit window
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a Tokio runtime.
    pub fn with_window(orchestrator: SearchOrchestrator, window: Duration) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::Runtime(e.to_string()))?;
        let (input, receiver) = watch::channel(String::new());
        let worker = runtime.spawn(run(orchestrator, receiver, window));
        Ok(Debouncer { input, worker })
    }

    /// Feed the current contents of the search bar
    pub fn input(&self, raw: impl Into<String>) {
        self.input.send_replace(raw.into());
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run(orchestrator: SearchOrchestrator, mut input: watch::Receiver<String>, window: Duration) {
    let mut last_submitted: Option<String> = None;

    while input.changed().await.is_ok() {
        let mut raw = input.borrow_and_update().clone();

        loop {
            if raw.trim().is_empty() {
                orchestrator.clear();
                last_submitted = None;
                break;
            }

            orchestrator.note_input(&raw);

            match tokio::time::timeout(window, input.changed()).await {
                Ok(Ok(())) => raw = input.borrow_and_update().clone(),
                Ok(Err(_)) => return,
                Err(_) => {
                    let settled = raw.trim().to_string();
                    if last_submitted.as_deref() == Some(settled.as_str()) {
                        debug!(target: "nimbus::search", query = %settled, "input unchanged");
                        orchestrator.cancel_input();
                    } else {
                        match orchestrator.submit(&settled) {
                            Ok(_) => last_submitted = Some(settled),
                            Err(err) => warn!(target: "nimbus::search", error = %err, "submit failed"),
                        }
                    }
                    break;
                }
            }
        }
    }
}
