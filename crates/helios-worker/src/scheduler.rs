//! Off-thread compute pipeline.
//!
//! Callers submit [`RequestEnvelope`]s and later collect
//! [`ResponseEnvelope`]s; nothing on the caller side ever waits on a
//! computation. Responses arrive in completion order, not submission order,
//! and carry the request `id` for correlation.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, trace, warn};

use crate::error::ComputeError;
use crate::protocol::{Request, RequestEnvelope, Response, ResponseEnvelope};
use crate::router::Router;

/// Lifecycle of one request, as reported in trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Received,
    Dispatched,
    /// Local computation.
    Computing,
    /// Remote lookup through the precision resolver.
    Fetching,
    Completed,
    Failed,
}

/// Counters shared between the scheduler and its workers.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    pub completed: AtomicU64,
    pub failed: AtomicU64,
}

/// Worker pool that routes protocol requests.
///
/// Dropping the scheduler closes the queue and joins every worker after
/// the queued requests have been answered.
pub struct ComputeScheduler {
    task_sender: Option<Sender<RequestEnvelope>>,
    result_receiver: Receiver<ResponseEnvelope>,
    worker_handles: Vec<JoinHandle<()>>,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    stats: Arc<SchedulerStats>,
}

/// Worker count for a configured value; `0` derives one from the CPU count
/// and leaves a core for the caller.
pub fn resolve_worker_count(configured: usize) -> usize {
    if configured > 0 {
        configured
    } else {
        num_cpus::get().saturating_sub(1).max(1)
    }
}

impl ComputeScheduler {
    /// Spawn `worker_count` named worker threads sharing one bounded queue
    /// of `capacity` pending requests.
    pub fn new(
        worker_count: usize,
        capacity: usize,
        router: Router,
    ) -> Result<Self, ComputeError> {
        let worker_count = worker_count.max(1);
        let capacity = capacity.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<RequestEnvelope>(capacity);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let stats = Arc::new(SchedulerStats::default());
        let router = Arc::new(router);

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let router = Arc::clone(&router);
            let flight = Arc::clone(&in_flight);
            let stats = Arc::clone(&stats);

            let handle = std::thread::Builder::new()
                .name(format!("helios-worker-{index}"))
                .spawn(move || {
                    while let Ok(envelope) = rx.recv() {
                        let response = process(&router, envelope, &stats);
                        // Publish before decrementing so a zero count means
                        // every response is already in the channel.
                        let delivered = tx.send(response).is_ok();
                        flight.fetch_sub(1, Ordering::Release);
                        if !delivered {
                            break;
                        }
                    }
                })?;
            handles.push(handle);
        }

        debug!(workers = worker_count, capacity, precision = router.precision_enabled(), "compute scheduler started");

        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            capacity,
            in_flight,
            stats,
        })
    }

    /// Queue a request without blocking.
    pub fn submit(&self, envelope: RequestEnvelope) -> Result<(), ComputeError> {
        let sender = self.task_sender.as_ref().ok_or(ComputeError::ShutDown)?;
        trace!(id = envelope.id, kind = envelope.request.kind(), phase = ?RequestPhase::Received);
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        match sender.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                match err {
                    TrySendError::Full(_) => Err(ComputeError::QueueFull(self.capacity)),
                    TrySendError::Disconnected(_) => Err(ComputeError::ShutDown),
                }
            }
        }
    }

    /// Every response completed so far.
    pub fn drain_results(&self) -> Vec<ResponseEnvelope> {
        self.result_receiver.try_iter().collect()
    }

    /// Wait up to `timeout` for the next response.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ResponseEnvelope> {
        self.result_receiver.recv_timeout(timeout).ok()
    }

    /// Handle for consuming responses on another thread.
    pub fn results(&self) -> Receiver<ResponseEnvelope> {
        self.result_receiver.clone()
    }

    /// Requests queued or being processed.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn completed_count(&self) -> u64 {
        self.stats.completed.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Stop accepting requests, let workers finish the queue, and join them.
    pub fn shutdown(&mut self) {
        if self.task_sender.take().is_none() {
            return;
        }
        for handle in self.worker_handles.drain(..) {
            if handle.join().is_err() {
                warn!("compute worker exited abnormally");
            }
        }
        debug!(
            completed = self.completed_count(),
            failed = self.failed_count(),
            "compute scheduler stopped"
        );
    }
}

impl Drop for ComputeScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Route one request, turning errors and panics into `ERROR` responses.
fn process(router: &Router, envelope: RequestEnvelope, stats: &SchedulerStats) -> ResponseEnvelope {
    let RequestEnvelope { id, request } = envelope;
    let kind = request.kind();
    let phase = match &request {
        Request::JplQuery { .. } if router.precision_enabled() => RequestPhase::Fetching,
        _ => RequestPhase::Computing,
    };
    trace!(id, kind, phase = ?RequestPhase::Dispatched);
    trace!(id, kind, phase = ?phase);

    let started = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| router.route(&request)))
        .unwrap_or_else(|payload| Err(ComputeError::Panicked(panic_message(payload.as_ref()))));

    let response = match outcome {
        Ok(response) => {
            stats.completed.fetch_add(1, Ordering::Relaxed);
            trace!(id, kind, phase = ?RequestPhase::Completed, elapsed_us = started.elapsed().as_micros() as u64);
            response
        }
        Err(err) => {
            stats.failed.fetch_add(1, Ordering::Relaxed);
            warn!(id, kind, phase = ?RequestPhase::Failed, error = %err, "request failed");
            Response::error(err.to_string())
        }
    };
    ResponseEnvelope::new(id, response)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
