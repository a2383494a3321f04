//! Transactional email jobs and the queue that carries them.

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A booking lifecycle notification to deliver asynchronously.
///
/// Jobs carry only the rental id; the worker loads fresh data before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailJob {
    /// Payment recorded, rental is now active.
    RentalConfirmed { rental_id: i64 },
    /// Car returned, rental completed.
    RentalCompleted { rental_id: i64 },
    /// Rental cancelled by the customer or staff.
    RentalCancelled { rental_id: i64 },
}

impl EmailJob {
    pub fn rental_id(&self) -> i64 {
        match self {
            EmailJob::RentalConfirmed { rental_id }
            | EmailJob::RentalCompleted { rental_id }
            | EmailJob::RentalCancelled { rental_id } => *rental_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EmailJob::RentalConfirmed { .. } => "rental_confirmed",
            EmailJob::RentalCompleted { .. } => "rental_completed",
            EmailJob::RentalCancelled { .. } => "rental_cancelled",
        }
    }
}

/// Producer side of the email queue.
///
/// Enqueueing never blocks the request: when the queue is full or the worker
/// has stopped, the job is dropped and a warning is logged.
#[derive(Clone)]
pub struct EmailQueue {
    sender: mpsc::Sender<EmailJob>,
}

impl EmailQueue {
    pub fn new(sender: mpsc::Sender<EmailJob>) -> Self {
        Self { sender }
    }

    /// Creates a queue together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EmailJob>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Enqueues a job without waiting. Returns `false` if the job was dropped.
    pub fn enqueue(&self, job: EmailJob) -> bool {
        match self.sender.try_send(job) {
            Ok(()) => {
                debug!(kind = job.kind(), rental_id = job.rental_id(), "Email job queued");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(kind = job.kind(), rental_id = job.rental_id(), "Email queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(kind = job.kind(), rental_id = job.rental_id(), "Email queue closed, dropping job");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}
