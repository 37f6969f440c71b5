//! Sampling timer - the single repeating timer of the active item

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::signal::{Activation, EngineSignal, SignalSender};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Owned handle to the repeating sampling task
///
/// Dropping the handle aborts the task, so replacing the controller's
/// `Option<SamplingTimer>` is enough to guarantee only one is ever alive.
#[derive(Debug)]
pub struct SamplingTimer {
    activation: Activation,
    task: JoinHandle<()>,
}

impl SamplingTimer {
    /// Start posting `Tick(activation)` every `period`
    ///
    /// A zero period is raised to one millisecond.
    pub fn spawn(activation: Activation, period: Duration, signals: SignalSender) -> Self {
        let period = period.max(MIN_PERIOD);
        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // The first tick resolves immediately; progress 0 is already known.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if signals.send(EngineSignal::Tick(activation)).is_err() {
                    break;
                }
            }
        });

        tracing::trace!(activation = activation.get(), "Sampling timer started");

        Self { activation, task }
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Drop for SamplingTimer {
    fn drop(&mut self) {
        self.task.abort();
        tracing::trace!(activation = self.activation.get(), "Sampling timer stopped");
    }
}
