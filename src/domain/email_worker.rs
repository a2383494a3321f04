//! Background worker delivering booking lifecycle emails.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{error, info, warn};

use crate::domain::email_job::EmailJob;
use crate::domain::repositories::RentalRepository;
use crate::error::AppError;
use crate::infrastructure::mail::{EmailComposer, MailError, Mailer};

/// Maximum number of delivery attempts per email.
const MAX_ATTEMPTS: usize = 3;

/// Why a job could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum EmailJobError {
    #[error("rental {0} not found")]
    RentalNotFound(i64),
    #[error("failed to load rental: {0}")]
    Repository(#[from] AppError),
    #[error("failed to render email: {0}")]
    Render(#[from] askama::Error),
    #[error("failed to deliver email: {0}")]
    Delivery(#[from] MailError),
}

/// Shared dependencies of the worker.
pub struct EmailWorker<R: RentalRepository> {
    rentals: Arc<R>,
    mailer: Arc<dyn Mailer>,
    composer: EmailComposer,
    retry_base: Duration,
}

impl<R: RentalRepository> EmailWorker<R> {
    pub fn new(rentals: Arc<R>, mailer: Arc<dyn Mailer>, composer: EmailComposer) -> Self {
        Self {
            rentals,
            mailer,
            composer,
            retry_base: Duration::from_millis(100),
        }
    }

    /// Overrides the retry base delay. Attempt `n` waits up to `base * 2^n`.
    pub fn with_retry_base(mut self, base: Duration) -> Self {
        self.retry_base = base;
        self
    }

    /// Loads, renders and delivers a single job, retrying delivery with
    /// exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns [`EmailJobError`] when the rental is gone, rendering fails or
    /// every delivery attempt fails.
    pub async fn process(&self, job: EmailJob) -> Result<(), EmailJobError> {
        let details = self
            .rentals
            .find_details(job.rental_id())
            .await?
            .ok_or(EmailJobError::RentalNotFound(job.rental_id()))?;

        if details.email.is_empty() {
            warn!(kind = job.kind(), rental_id = job.rental_id(), "User has no email address, skipping");
            return Ok(());
        }

        let message = self.composer.compose(&job, &details)?;

        let base_ms = self.retry_base.as_millis().max(1) as u64;
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(base_ms)
            .map(jitter)
            .take(MAX_ATTEMPTS - 1);

        let mailer: &dyn Mailer = self.mailer.as_ref();
        let message = &message;
        Retry::spawn(strategy, move || mailer.send(message)).await?;

        info!(
            kind = job.kind(),
            rental_id = job.rental_id(),
            transport = self.mailer.name(),
            "Email delivered"
        );
        Ok(())
    }
}

/// Consumes email jobs until the channel closes.
///
/// At most `concurrency` deliveries run at once. Failures are logged and the
/// job is dropped; the HTTP request that produced it has already completed.
pub async fn run_email_worker<R>(
    mut rx: mpsc::Receiver<EmailJob>,
    worker: Arc<EmailWorker<R>>,
    concurrency: usize,
) where
    R: RentalRepository + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    while let Some(job) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let worker = worker.clone();

        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = worker.process(job).await {
                error!(
                    kind = job.kind(),
                    rental_id = job.rental_id(),
                    error = %e,
                    "Email job failed"
                );
            }
        });
    }

    info!("Email worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Car, Rental, RentalDetails, RentalStatus};
    use crate::domain::repositories::MockRentalRepository;
    use crate::infrastructure::mail::{EmailMessage, MailResult};
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` sends, then records messages.
    struct FlakyMailer {
        failures: usize,
        attempts: AtomicUsize,
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl FlakyMailer {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                attempts: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send(&self, message: &EmailMessage) -> MailResult<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                return Err(MailError::Transport("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn rental_details(email: &str) -> RentalDetails {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        RentalDetails {
            rental: Rental {
                id: 5,
                user_id: 2,
                username: "bob".to_string(),
                car: Car {
                    id: 1,
                    name: "Golf".to_string(),
                    brand: "Volkswagen".to_string(),
                    model_year: 2021,
                    car_type: "Hatchback".to_string(),
                    transmission: "Manual".to_string(),
                    fuel_type: "Diesel".to_string(),
                    seats: 5,
                    price_per_day: Decimal::new(3000, 2),
                    is_available: true,
                    created_at: Utc::now(),
                    images: vec![],
                },
                start_date: start,
                end_date: start,
                total_price: Decimal::new(3000, 2),
                status: RentalStatus::Completed,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            email: email.to_string(),
            payment: None,
        }
    }

    fn worker(repo: MockRentalRepository, mailer: Arc<FlakyMailer>) -> EmailWorker<MockRentalRepository> {
        EmailWorker::new(
            Arc::new(repo),
            mailer,
            EmailComposer::new("noreply@carvo.test", "Carvo", "Carvo Garage"),
        )
        .with_retry_base(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_process_delivers_email() {
        let mut repo = MockRentalRepository::new();
        repo.expect_find_details()
            .withf(|id| *id == 5)
            .times(1)
            .returning(|_| Ok(Some(rental_details("bob@example.com"))));

        let mailer = Arc::new(FlakyMailer::new(0));
        let result = worker(repo, mailer.clone())
            .process(EmailJob::RentalCompleted { rental_id: 5 })
            .await;

        assert!(result.is_ok());
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "bob@example.com");
        assert_eq!(sent[0].subject, "Rental Completed – Thank You!");
    }

    #[tokio::test]
    async fn test_process_retries_transient_failures() {
        let mut repo = MockRentalRepository::new();
        repo.expect_find_details()
            .returning(|_| Ok(Some(rental_details("bob@example.com"))));

        let mailer = Arc::new(FlakyMailer::new(2));
        let result = worker(repo, mailer.clone())
            .process(EmailJob::RentalCompleted { rental_id: 5 })
            .await;

        assert!(result.is_ok());
        assert_eq!(mailer.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_process_gives_up_after_max_attempts() {
        let mut repo = MockRentalRepository::new();
        repo.expect_find_details()
            .returning(|_| Ok(Some(rental_details("bob@example.com"))));

        let mailer = Arc::new(FlakyMailer::new(10));
        let result = worker(repo, mailer.clone())
            .process(EmailJob::RentalCompleted { rental_id: 5 })
            .await;

        assert!(matches!(result, Err(EmailJobError::Delivery(_))));
        assert_eq!(mailer.attempts.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_process_missing_rental() {
        let mut repo = MockRentalRepository::new();
        repo.expect_find_details().returning(|_| Ok(None));

        let mailer = Arc::new(FlakyMailer::new(0));
        let result = worker(repo, mailer.clone())
            .process(EmailJob::RentalConfirmed { rental_id: 99 })
            .await;

        assert!(matches!(result, Err(EmailJobError::RentalNotFound(99))));
        assert_eq!(mailer.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_process_skips_users_without_email() {
        let mut repo = MockRentalRepository::new();
        repo.expect_find_details()
            .returning(|_| Ok(Some(rental_details(""))));

        let mailer = Arc::new(FlakyMailer::new(0));
        let result = worker(repo, mailer.clone())
            .process(EmailJob::RentalCompleted { rental_id: 5 })
            .await;

        assert!(result.is_ok());
        assert_eq!(mailer.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_worker_drains_queue() {
        let mut repo = MockRentalRepository::new();
        repo.expect_find_details()
            .times(2)
            .returning(|_| Ok(Some(rental_details("bob@example.com"))));

        let mailer = Arc::new(FlakyMailer::new(0));
        let worker = Arc::new(worker(repo, mailer.clone()));
        let (tx, rx) = mpsc::channel(8);

        tx.send(EmailJob::RentalCompleted { rental_id: 5 }).await.unwrap();
        tx.send(EmailJob::RentalCancelled { rental_id: 5 }).await.unwrap();
        drop(tx);

        run_email_worker(rx, worker, 2).await;

        // Spawned deliveries may still be in flight when the loop exits.
        for _ in 0..100 {
            if mailer.sent.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }
}
