//! View tracker - debounced, once-per-session view recording

use journey_core::{ItemId, ViewRecorder};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::signal::{EngineSignal, SignalSender};

/// What `mark_viewed` did with an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMark {
    /// Dwell timer started; the view is recorded if the item stays active
    Scheduled,
    /// Already recorded this session, nothing to do
    AlreadyRecorded,
}

/// Debounce task for the currently active item
#[derive(Debug)]
struct PendingView {
    item_id: ItemId,
    task: JoinHandle<()>,
}

/// Records views after a dwell threshold, at most once per item
pub struct ViewTracker {
    recorder: Arc<dyn ViewRecorder>,
    dwell: Duration,
    recorded: Arc<Mutex<HashSet<ItemId>>>,
    pending: Option<PendingView>,
    signals: SignalSender,
}

impl ViewTracker {
    pub fn new(recorder: Arc<dyn ViewRecorder>, dwell: Duration, signals: SignalSender) -> Self {
        Self {
            recorder,
            dwell,
            recorded: Arc::new(Mutex::new(HashSet::new())),
            pending: None,
            signals,
        }
    }

    /// Treat items as already recorded (e.g. the viewer is already listed)
    pub fn seed(&self, items: impl IntoIterator<Item = ItemId>) {
        self.recorded.lock().extend(items);
    }

    pub fn is_recorded(&self, item_id: &ItemId) -> bool {
        self.recorded.lock().contains(item_id)
    }

    /// Item whose dwell timer is currently running
    pub fn pending_item(&self) -> Option<&ItemId> {
        self.pending.as_ref().map(|pending| &pending.item_id)
    }

    /// Start the dwell timer for a newly activated item
    ///
    /// Any previous item's debounce is cancelled first, so flicking through
    /// items never records them. Once the dwell elapses the item is marked
    /// and the record call runs detached; leaving the item after that point
    /// does not abort it. The mark stays even if the call fails, so a failed
    /// view is never sent again in this session.
    pub fn mark_viewed(&mut self, item_id: ItemId) -> ViewMark {
        self.cancel();

        if self.is_recorded(&item_id) {
            tracing::trace!(item_id = %item_id, "View already recorded");
            return ViewMark::AlreadyRecorded;
        }

        let recorder = Arc::clone(&self.recorder);
        let recorded = Arc::clone(&self.recorded);
        let signals = self.signals.clone();
        let dwell = self.dwell;
        let id = item_id.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(dwell).await;

            if !recorded.lock().insert(id.clone()) {
                return;
            }

            tokio::spawn(async move {
                match recorder.record_view(&id).await {
                    Ok(()) => {
                        tracing::debug!(item_id = %id, "View recorded");
                        let _ = signals.send(EngineSignal::ViewRecorded(id));
                    }
                    Err(e) => {
                        tracing::warn!(item_id = %id, error = %e, "Failed to record view");
                    }
                }
            });
        });

        self.pending = Some(PendingView { item_id, task });
        ViewMark::Scheduled
    }

    /// Abort the pending debounce, if any
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            tracing::trace!(item_id = %pending.item_id, "View debounce cancelled");
        }
    }
}

impl Drop for ViewTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for ViewTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewTracker")
            .field("dwell", &self.dwell)
            .field("recorded", &self.recorded.lock().len())
            .field("pending", &self.pending_item())
            .finish()
    }
}
