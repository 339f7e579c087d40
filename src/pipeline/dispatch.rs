use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::core::report::{CandidateCredential, ValidationOutcome};
use crate::core::traits::{CredentialValidator, ScanObserver};
use crate::pipeline::aggregate::ResultAggregator;
use crate::utils::RateLimiter;

/// Bounded pool of concurrent validation tasks.
///
/// `submit` never blocks the caller: each candidate becomes a task that
/// waits for one of the pool's permits, paces itself through the shared
/// rate limiter, calls the authority once, and publishes its outcome to
/// the aggregator. A validator error is published as `Indeterminate` with
/// the error as reason. It is never conflated with a confirmed `Invalid`,
/// and it is not retried.
pub struct ValidationDispatcher {
    validator: Arc<dyn CredentialValidator>,
    aggregator: Arc<ResultAggregator>,
    observer: Arc<dyn ScanObserver>,
    permits: Arc<Semaphore>,
    limiter: Arc<RateLimiter>,
    tasks: JoinSet<()>,
}

impl ValidationDispatcher {
    pub fn new(
        validator: Arc<dyn CredentialValidator>,
        aggregator: Arc<ResultAggregator>,
        observer: Arc<dyn ScanObserver>,
        concurrency: usize,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            validator,
            aggregator,
            observer,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            limiter,
            tasks: JoinSet::new(),
        }
    }

    /// Enqueue one unique candidate for asynchronous validation. The
    /// candidate is owned by its task from here on.
    pub fn submit(&mut self, credential: CandidateCredential) {
        let validator = self.validator.clone();
        let aggregator = self.aggregator.clone();
        let observer = self.observer.clone();
        let permits = self.permits.clone();
        let limiter = self.limiter.clone();

        self.tasks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            limiter.wait().await;

            debug!("validating {}", credential.identifier);
            let outcome = match validator.validate(&credential).await {
                Ok(outcome) => outcome,
                Err(e) => ValidationOutcome::Indeterminate(e.to_string()),
            };

            aggregator.record_outcome(&credential.identifier, outcome.clone());
            observer.outcome_recorded(&credential.identifier, &outcome);
        });
    }

    /// Block until every submitted candidate has produced an outcome.
    pub async fn drain(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    /// Abandon in-flight validations. Identifiers without a settled
    /// outcome are resolved by the aggregator afterwards.
    pub async fn abort(&mut self) {
        self.tasks.abort_all();
        while self.tasks.join_next().await.is_some() {}
    }
}
