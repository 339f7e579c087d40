pub mod config;
pub mod error;
pub mod report;
pub mod traits;

pub use config::{Config, OutputSettings, ScanSettings, ValidationSettings};
pub use error::{KeySweepError, Result};
pub use report::{
    CandidateCredential, CredentialRecord, Occurrence, RevisionId, RevisionScan, ScanFinding,
    ScanReport, ScanSnapshot, ScanWarning, SkippedRevision, ValidationOutcome,
};
pub use traits::{
    CredentialExtractor, CredentialValidator, NullObserver, RevisionSource, ScanObserver,
};
