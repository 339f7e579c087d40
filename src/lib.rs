//! # KeySweep
//!
//! Sweeps the full commit history of a git repository for AWS
//! access-key / secret-key pairs and confirms which of them are still
//! live against AWS STS.
//!
//! A point-in-time scan of the latest checkout misses credentials that
//! were committed and later removed; KeySweep materializes every revision
//! in turn and scans the whole tree at each one.
//!
//! ## Architecture
//!
//! One sequential driver owns the working tree, a bounded pool validates:
//!
//! - `RevisionWalker` materializes revisions strictly one at a time and
//!   hands each snapshot to the scanner synchronously, so a scan can never
//!   race the next checkout.
//! - `RepoScanner` + `AwsExtractor` turn a materialized tree into
//!   candidate (identifier, secret) pairs.
//! - `CandidateDeduplicator` admits each identifier once per run.
//! - `ValidationDispatcher` checks admitted pairs against STS with
//!   bounded concurrency and rate limiting.
//! - `ResultAggregator` collects findings, outcomes, skips and warnings
//!   into the final `ScanReport`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use keysweep::core::CredentialExtractor;
//! use keysweep::extract::AwsExtractor;
//!
//! let extractor = AwsExtractor::new();
//! let content =
//!     b"AWS_ACCESS_KEY_ID=AKIA1234567890ABCD12\nAWS_SECRET_ACCESS_KEY=abcDEF1234567890+/==";
//! let candidates = extractor.extract(content);
//!
//! println!("found {} candidate pair(s)", candidates.len());
//! ```

pub mod cli;
pub mod core;
pub mod extract;
pub mod git;
pub mod pipeline;
pub mod scan;
pub mod utils;
pub mod validators;

// Re-export commonly used types
pub use crate::core::{
    CandidateCredential, Config, CredentialExtractor, CredentialValidator, KeySweepError,
    NullObserver, Occurrence, Result, RevisionId, RevisionSource, ScanFinding, ScanObserver,
    ScanReport, ValidationOutcome,
};

pub use crate::extract::AwsExtractor;
pub use crate::git::{GitWorkspace, RevisionWalker};
pub use crate::pipeline::{CancelToken, HistoryScanner};
pub use crate::scan::RepoScanner;
pub use crate::validators::AwsStsValidator;
