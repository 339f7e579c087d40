use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task;
use tracing::info;

use crate::core::config::Config;
use crate::core::error::{KeySweepError, Result};
use crate::core::report::{RevisionId, RevisionScan, ScanReport};
use crate::core::traits::{
    CredentialExtractor, CredentialValidator, NullObserver, RevisionSource, ScanObserver,
};
use crate::git::walker::{RevisionWalker, WalkControl, WalkEvent};
use crate::git::workspace::GitWorkspace;
use crate::pipeline::aggregate::ResultAggregator;
use crate::pipeline::dedup::CandidateDeduplicator;
use crate::pipeline::dispatch::ValidationDispatcher;
use crate::scan::RepoScanner;
use crate::utils::RateLimiter;

/// Cooperative cancellation flag for a sweep.
///
/// Cancellation is honored between revisions: the in-flight
/// materialize-and-scan always completes so the working tree is never left
/// in a mid-checkout state. In-flight validations are abandoned and their
/// identifiers reported indeterminate.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Messages from the blocking walker/scanner side to the async pipeline.
enum RevisionEvent {
    Scanned(RevisionScan),
    Skipped { revision: RevisionId, cause: String },
}

/// The whole sweep, wired together: acquire → walk/scan (sequential,
/// blocking task) → dedup → bounded validation → aggregate.
pub struct HistoryScanner {
    extractor: Arc<dyn CredentialExtractor>,
    validator: Arc<dyn CredentialValidator>,
    observer: Arc<dyn ScanObserver>,
    concurrency: usize,
    rate_limit: Duration,
    max_file_size: u64,
}

impl HistoryScanner {
    pub fn new(
        extractor: Arc<dyn CredentialExtractor>,
        validator: Arc<dyn CredentialValidator>,
        config: &Config,
    ) -> Self {
        Self {
            extractor,
            validator,
            observer: Arc::new(NullObserver),
            concurrency: config.validation.concurrency,
            rate_limit: Duration::from_millis(config.validation.rate_limit_ms),
            max_file_size: config.scan.max_file_size,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScanObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Clone `location` and sweep its full history.
    pub async fn run(&self, location: &str, cancel: CancelToken) -> Result<ScanReport> {
        let loc = location.to_string();
        let workspace = task::spawn_blocking(move || GitWorkspace::acquire(&loc))
            .await
            .map_err(|e| KeySweepError::Unknown(format!("acquisition task failed: {}", e)))??;
        self.run_source(location, workspace, cancel).await
    }

    /// Sweep an already-acquired revision source. `repository` labels the
    /// report.
    pub async fn run_source<S>(
        &self,
        repository: &str,
        source: S,
        cancel: CancelToken,
    ) -> Result<ScanReport>
    where
        S: RevisionSource + Send + 'static,
    {
        let revisions = source.revisions()?;
        let aggregator = Arc::new(ResultAggregator::new(repository));

        if revisions.is_empty() {
            info!("no revisions to walk");
            aggregator.mark_walk_complete();
            return Ok(aggregator.snapshot());
        }

        info!("walking {} revisions", revisions.len());
        self.observer.walk_started(revisions.len());

        let dedup = Arc::new(CandidateDeduplicator::new());
        let limiter = Arc::new(RateLimiter::with_interval(self.rate_limit));
        let mut dispatcher = ValidationDispatcher::new(
            self.validator.clone(),
            aggregator.clone(),
            self.observer.clone(),
            self.concurrency,
            limiter,
        );

        let scanner = RepoScanner::new(self.extractor.clone(), self.max_file_size);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let walk_cancel = cancel.clone();

        // The walker owns the working tree for the duration of the walk.
        // Scanning happens inside the visitor, so the next materialization
        // cannot start until this revision's file reads are all done; only
        // the immutable per-revision results cross the channel.
        let walk = task::spawn_blocking(move || {
            let walker = RevisionWalker::new(source, revisions);
            walker.walk(|event| {
                let sent = match event {
                    WalkEvent::Snapshot(snapshot) => {
                        let scan = scanner.scan(&snapshot);
                        tx.send(RevisionEvent::Scanned(scan))
                    }
                    WalkEvent::Skipped { revision, cause } => {
                        tx.send(RevisionEvent::Skipped { revision, cause })
                    }
                };
                if sent.is_err() || walk_cancel.is_cancelled() {
                    WalkControl::Stop
                } else {
                    WalkControl::Continue
                }
            });
        });

        while let Some(event) = rx.recv().await {
            match event {
                RevisionEvent::Scanned(scan) => {
                    aggregator.revision_scanned();
                    self.observer
                        .revision_scanned(&scan.revision, scan.findings.len());
                    for warning in scan.warnings {
                        aggregator.record_warning(warning);
                    }
                    for finding in scan.findings {
                        aggregator.record_finding(&finding);
                        if dedup.admit(&finding.credential.identifier) {
                            self.observer.candidate_admitted(&finding.credential.identifier);
                            dispatcher.submit(finding.credential);
                        }
                    }
                }
                RevisionEvent::Skipped { revision, cause } => {
                    self.observer.revision_skipped(&revision);
                    aggregator.record_revision_failure(revision, cause);
                }
            }
        }

        walk.await
            .map_err(|e| KeySweepError::Unknown(format!("walker task failed: {}", e)))?;
        self.observer.walk_finished();

        if cancel.is_cancelled() {
            // The walk may have stopped short, so the report stays
            // labeled partial; unsettled identifiers are still accounted
            // for rather than dropped.
            info!("run cancelled; abandoning in-flight validations");
            dispatcher.abort().await;
            aggregator.resolve_pending("run cancelled");
        } else {
            aggregator.mark_walk_complete();
            dispatcher.drain().await;
        }

        Ok(aggregator.snapshot())
    }
}
