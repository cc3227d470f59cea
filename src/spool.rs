//! # Print Queue
//!
//! Serializes print jobs onto the single physical printer.
//!
//! ```text
//! handler ─┐
//! handler ─┼─► mpsc (FIFO) ─► worker task ─► normalize ─► encode ─► DeviceSession
//! handler ─┘        ▲                                                    │
//!                   └──────────── oneshot reply per job ◄────────────────┘
//! ```
//!
//! Exactly one worker owns the device, so at most one [`DeviceSession`] is
//! ever open. A caller that stops waiting only drops its reply channel; the
//! job itself still runs to completion.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::InkslipError;
use crate::event::PrintEvent;
use crate::normalize::Normalizer;
use crate::session::DeviceSession;
use crate::transport::Device;

/// Jobs that may wait before `submit` applies backpressure.
pub const QUEUE_CAPACITY: usize = 32;

/// Summary of a printed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub id: Uuid,
    /// Blocks in the rendered receipt.
    pub blocks: usize,
    /// Bytes written to the device.
    pub bytes: usize,
}

type Reply = Result<JobReport, InkslipError>;

struct Job {
    id: Uuid,
    event: PrintEvent,
    respond_to: oneshot::Sender<Reply>,
}

/// A submitted job. Await [`JobHandle::wait`] for the outcome, or drop it.
#[derive(Debug)]
pub struct JobHandle {
    id: Uuid,
    rx: oneshot::Receiver<Reply>,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait until the job has printed (or failed).
    pub async fn wait(self) -> Result<JobReport, InkslipError> {
        self.rx.await.map_err(|_| InkslipError::QueueClosed)?
    }
}

/// Cloneable handle to the print worker.
#[derive(Clone)]
pub struct PrintQueue {
    tx: mpsc::Sender<Job>,
}

impl PrintQueue {
    /// Spawn the worker. It runs until every `PrintQueue` clone is dropped.
    pub fn start(normalizer: Normalizer, device: Arc<dyn Device>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let worker = tokio::spawn(run_worker(rx, normalizer, device));
        (Self { tx }, worker)
    }

    /// Enqueue `event`. Waits only if the queue is full.
    pub async fn submit(&self, event: PrintEvent) -> Result<JobHandle, InkslipError> {
        let id = Uuid::new_v4();
        let (respond_to, rx) = oneshot::channel();
        debug!(%id, kind = event.kind(), "job queued");

        self.tx
            .send(Job {
                id,
                event,
                respond_to,
            })
            .await
            .map_err(|_| InkslipError::QueueClosed)?;

        Ok(JobHandle { id, rx })
    }

    /// Enqueue `event` and wait for it to print.
    pub async fn print(&self, event: PrintEvent) -> Result<JobReport, InkslipError> {
        self.submit(event).await?.wait().await
    }
}

async fn run_worker(mut rx: mpsc::Receiver<Job>, normalizer: Normalizer, device: Arc<dyn Device>) {
    info!(device = %device.describe(), "print worker started");

    while let Some(job) = rx.recv().await {
        let span = info_span!("job", id = %job.id, kind = job.event.kind());
        let result = process(job.id, &job.event, &normalizer, &device)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match &result {
            Ok(report) => info!(blocks = report.blocks, bytes = report.bytes, "job printed"),
            Err(e) => warn!(error = %e, retryable = e.is_retryable(), "job failed"),
        });

        if job.respond_to.send(result).is_err() {
            debug!(id = %job.id, "caller stopped waiting");
        }
    }

    info!("print worker stopped");
}

async fn process(
    id: Uuid,
    event: &PrintEvent,
    normalizer: &Normalizer,
    device: &Arc<dyn Device>,
) -> Result<JobReport, InkslipError> {
    let program = normalizer.normalize(event).await?;
    let data = program.to_bytes(normalizer.config())?;
    debug!(blocks = program.len(), bytes = data.len(), "receipt encoded");

    let device = Arc::clone(device);
    let outcome = tokio::task::spawn_blocking(move || DeviceSession::new(device.as_ref()).run(&data))
        .await
        .map_err(|e| InkslipError::DeviceWriteFailed(format!("print thread failed: {}", e)))?;

    let bytes = outcome.into_result()?;
    Ok(JobReport {
        id,
        blocks: program.len(),
        bytes,
    })
}
