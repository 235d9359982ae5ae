use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        mpsc::{Receiver, Sender, TryRecvError},
    },
    thread,
};

use crate::classifier::{ClassificationService, ClientError, RawPrediction};
use crate::model::{DebugInfo, HistoryEntry, ServiceHealth};

use super::state::StatsSnapshot;

/// Operation categories that carry their own generation counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JobKind {
    Predict,
    Health,
    History,
    Stats,
    Debug,
}

/// Result of one background service call, tagged for staleness checks.
#[derive(Debug)]
pub(crate) enum JobMessage {
    HealthChecked {
        generation: u64,
        result: Result<ServiceHealth, ClientError>,
    },
    Predicted {
        generation: u64,
        result: Result<RawPrediction, ClientError>,
    },
    HistoryLoaded {
        generation: u64,
        result: Result<Vec<HistoryEntry>, ClientError>,
    },
    StatsLoaded {
        generation: u64,
        result: Result<StatsSnapshot, ClientError>,
    },
    DebugLoaded {
        generation: u64,
        result: Result<DebugInfo, ClientError>,
    },
    EntryDeleted {
        id: u64,
        result: Result<(), ClientError>,
    },
    HistoryCleared {
        result: Result<(), ClientError>,
    },
}

/// Monotonic counters; a response applies only if its tag is still current.
#[derive(Debug, Default)]
struct Generations {
    predict: u64,
    health: u64,
    history: u64,
    stats: u64,
    debug: u64,
}

impl Generations {
    fn current(&self, kind: JobKind) -> u64 {
        match kind {
            JobKind::Predict => self.predict,
            JobKind::Health => self.health,
            JobKind::History => self.history,
            JobKind::Stats => self.stats,
            JobKind::Debug => self.debug,
        }
    }

    fn slot(&mut self, kind: JobKind) -> &mut u64 {
        match kind {
            JobKind::Predict => &mut self.predict,
            JobKind::Health => &mut self.health,
            JobKind::History => &mut self.history,
            JobKind::Stats => &mut self.stats,
            JobKind::Debug => &mut self.debug,
        }
    }
}

/// Runs service calls on worker threads and queues their results for the owner.
pub(crate) struct SessionJobs {
    service: Arc<dyn ClassificationService>,
    message_tx: Sender<JobMessage>,
    message_rx: Receiver<JobMessage>,
    generations: Generations,
    outstanding: usize,
}

impl SessionJobs {
    pub(crate) fn new(service: Arc<dyn ClassificationService>) -> Self {
        let (message_tx, message_rx) = std::sync::mpsc::channel::<JobMessage>();
        Self {
            service,
            message_tx,
            message_rx,
            generations: Generations::default(),
            outstanding: 0,
        }
    }

    pub(crate) fn try_recv_message(&mut self) -> Option<JobMessage> {
        match self.message_rx.try_recv() {
            Ok(message) => {
                self.outstanding = self.outstanding.saturating_sub(1);
                Some(message)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Jobs started but not yet received, stale ones included.
    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Start a new generation for `kind`, superseding any in-flight response.
    pub(crate) fn invalidate(&mut self, kind: JobKind) -> u64 {
        let slot = self.generations.slot(kind);
        *slot = slot.wrapping_add(1);
        *slot
    }

    pub(crate) fn is_current(&self, kind: JobKind, generation: u64) -> bool {
        self.generations.current(kind) == generation
    }

    /// Run `job` on a worker thread. Every spawned job reports exactly once:
    /// a panicking call is turned into an error through `on_panic`.
    fn spawn<J, F>(&mut self, job: J, on_panic: F)
    where
        J: FnOnce(&dyn ClassificationService) -> JobMessage + Send + 'static,
        F: FnOnce(ClientError) -> JobMessage + Send + 'static,
    {
        self.outstanding += 1;
        let service = Arc::clone(&self.service);
        let tx = self.message_tx.clone();
        thread::spawn(move || {
            let message = catch_unwind(AssertUnwindSafe(|| job(service.as_ref())))
                .unwrap_or_else(|payload| {
                    let detail = panic_to_string(payload);
                    tracing::error!("Service call panicked: {detail}");
                    on_panic(ClientError::Transport(format!(
                        "Service call failed unexpectedly: {detail}"
                    )))
                });
            let _ = tx.send(message);
        });
    }

    pub(crate) fn begin_health_check(&mut self) {
        let generation = self.invalidate(JobKind::Health);
        self.spawn(
            move |service| JobMessage::HealthChecked {
                generation,
                result: service.check_health(),
            },
            move |err| JobMessage::HealthChecked {
                generation,
                result: Err(err),
            },
        );
    }

    /// Callers keep at most one prediction on the wire.
    pub(crate) fn begin_predict(&mut self, text: String) {
        let generation = self.invalidate(JobKind::Predict);
        self.spawn(
            move |service| JobMessage::Predicted {
                generation,
                result: service.predict(&text),
            },
            move |err| JobMessage::Predicted {
                generation,
                result: Err(err),
            },
        );
    }

    pub(crate) fn begin_history_load(&mut self) {
        let generation = self.invalidate(JobKind::History);
        self.spawn(
            move |service| JobMessage::HistoryLoaded {
                generation,
                result: service.fetch_history(),
            },
            move |err| JobMessage::HistoryLoaded {
                generation,
                result: Err(err),
            },
        );
    }

    /// Prefer the service's own stats; fall back to aggregating its history.
    pub(crate) fn begin_stats_load(&mut self) {
        let generation = self.invalidate(JobKind::Stats);
        self.spawn(
            move |service| {
                let result = match service.fetch_stats() {
                    Ok(Some(summary)) => Ok(StatsSnapshot::from_service(summary)),
                    Ok(None) => service
                        .fetch_history()
                        .map(|history| StatsSnapshot::aggregated(&history)),
                    Err(err) => Err(err),
                };
                JobMessage::StatsLoaded { generation, result }
            },
            move |err| JobMessage::StatsLoaded {
                generation,
                result: Err(err),
            },
        );
    }

    pub(crate) fn begin_debug_load(&mut self) {
        let generation = self.invalidate(JobKind::Debug);
        self.spawn(
            move |service| JobMessage::DebugLoaded {
                generation,
                result: service.fetch_debug_info(),
            },
            move |err| JobMessage::DebugLoaded {
                generation,
                result: Err(err),
            },
        );
    }

    pub(crate) fn begin_delete(&mut self, id: u64) {
        self.spawn(
            move |service| JobMessage::EntryDeleted {
                id,
                result: service.delete_history_entry(id),
            },
            move |err| JobMessage::EntryDeleted {
                id,
                result: Err(err),
            },
        );
    }

    pub(crate) fn begin_clear(&mut self) {
        self.spawn(
            |service| JobMessage::HistoryCleared {
                result: service.clear_history(),
            },
            |err| JobMessage::HistoryCleared { result: Err(err) },
        );
    }
}

fn panic_to_string(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
