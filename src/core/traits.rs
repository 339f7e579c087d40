use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

use super::error::Result;
use super::report::{CandidateCredential, RevisionId, ValidationOutcome};

/// Trait for extracting candidate credentials from raw file content.
///
/// Implementations are pure: no I/O, no state, and they never fail.
/// Binary or malformed content simply yields no candidates.
pub trait CredentialExtractor: Send + Sync {
    /// Name of the credential shape this extractor handles (e.g., "aws").
    fn name(&self) -> &str;

    /// Extract candidate pairs from file content. Callers must tolerate
    /// the identifier×secret fan-out and deduplicate downstream.
    fn extract(&self, content: &[u8]) -> Vec<CandidateCredential>;

    /// The regex patterns used for extraction.
    fn patterns(&self) -> &[Regex];
}

/// Trait for checking a candidate pair against its authority.
///
/// `Ok(Valid)` and `Ok(Invalid)` are definitive answers from the
/// authority. Any `Err` is a transient failure and is surfaced by the
/// dispatcher as `Indeterminate`, never as `Invalid`.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, credential: &CandidateCredential) -> Result<ValidationOutcome>;

    /// The credential shape this validator handles.
    fn key_type(&self) -> &str;

    /// Minimum spacing between authority calls.
    fn rate_limit(&self) -> Duration {
        Duration::from_secs(1)
    }
}

/// A local, browsable copy of a repository: a working tree plus the
/// ability to rewrite it to any enumerated revision.
///
/// `materialize` takes `&mut self` on purpose: the walker is the sole
/// writer of the working tree, and exclusive access is enforced by the
/// borrow rather than by convention.
pub trait RevisionSource {
    /// Root of the working tree.
    fn root(&self) -> &Path;

    /// Enumerate revision identifiers in deterministic order.
    fn revisions(&self) -> Result<Vec<RevisionId>>;

    /// Overwrite the working tree to match `revision` exactly. Idempotent.
    fn materialize(&mut self, revision: &RevisionId) -> Result<()>;
}

/// Progress callbacks for a sweep. All methods default to no-ops so the
/// pipeline can run headless; the CLI installs an indicatif-backed
/// implementation.
pub trait ScanObserver: Send + Sync {
    fn walk_started(&self, _total_revisions: usize) {}

    fn revision_scanned(&self, _revision: &RevisionId, _findings: usize) {}

    fn revision_skipped(&self, _revision: &RevisionId) {}

    fn candidate_admitted(&self, _identifier: &str) {}

    fn outcome_recorded(&self, _identifier: &str, _outcome: &ValidationOutcome) {}

    fn walk_finished(&self) {}
}

/// Observer that reports nothing.
pub struct NullObserver;

impl ScanObserver for NullObserver {}
