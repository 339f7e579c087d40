use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Opaque identifier for one historical state of the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for progress output.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An (access key id, secret key) pair extracted by pattern matching, not
/// yet confirmed live. Identity is the identifier alone; the first-seen
/// secret is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateCredential {
    pub identifier: String,
    pub secret: String,
}

/// One observation of a candidate credential at a specific revision.
#[derive(Debug, Clone)]
pub struct ScanFinding {
    pub revision: RevisionId,
    pub file_path: String,
    pub credential: CandidateCredential,
}

/// Handed from the walker to the scanner once a revision is materialized.
/// The working tree under `root` reflects exactly `revision` until the
/// scanner returns.
#[derive(Debug, Clone)]
pub struct ScanSnapshot {
    pub revision: RevisionId,
    pub root: PathBuf,
}

/// Non-fatal per-file failure while scanning a revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    pub revision: RevisionId,
    pub file_path: String,
    pub message: String,
}

/// Everything one revision's scan produced.
#[derive(Debug, Clone)]
pub struct RevisionScan {
    pub revision: RevisionId,
    pub findings: Vec<ScanFinding>,
    pub warnings: Vec<ScanWarning>,
}

/// Result of checking a candidate against the validation authority.
///
/// `Indeterminate` covers transient failures (network, throttling) and is
/// never conflated with a confirmed `Invalid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    Invalid,
    Indeterminate(String),
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Indeterminate(reason) => write!(f, "indeterminate ({})", reason),
        }
    }
}

/// Where a credential identifier was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub revision: RevisionId,
    pub file_path: String,
}

/// Per-identifier report entry: the settled outcome (if any) plus every
/// revision and file the identifier was seen in. Secrets are never stored
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub outcome: Option<ValidationOutcome>,
    pub occurrences: Vec<Occurrence>,
}

/// A revision that could not be materialized; contributes no findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRevision {
    pub revision: RevisionId,
    pub cause: String,
}

/// The terminal artifact of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub repository: String,
    pub revisions_walked: usize,
    pub revisions_skipped: usize,
    pub credentials: BTreeMap<String, CredentialRecord>,
    pub skipped_revisions: Vec<SkippedRevision>,
    pub warnings: Vec<ScanWarning>,
    /// False when the snapshot was taken before the walk finished and all
    /// in-flight validations drained.
    pub complete: bool,
}

impl ScanReport {
    pub fn live(&self) -> impl Iterator<Item = (&String, &CredentialRecord)> {
        self.credentials
            .iter()
            .filter(|(_, r)| r.outcome == Some(ValidationOutcome::Valid))
    }

    pub fn not_live(&self) -> impl Iterator<Item = (&String, &CredentialRecord)> {
        self.credentials
            .iter()
            .filter(|(_, r)| r.outcome == Some(ValidationOutcome::Invalid))
    }

    pub fn undetermined(&self) -> impl Iterator<Item = (&String, &CredentialRecord)> {
        self.credentials.iter().filter(|(_, r)| {
            !matches!(
                r.outcome,
                Some(ValidationOutcome::Valid) | Some(ValidationOutcome::Invalid)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serialization_distinguishes_indeterminate() {
        let valid = serde_json::to_string(&ValidationOutcome::Valid).unwrap();
        let invalid = serde_json::to_string(&ValidationOutcome::Invalid).unwrap();
        let indeterminate =
            serde_json::to_string(&ValidationOutcome::Indeterminate("timeout".into())).unwrap();

        assert!(valid.contains("valid"));
        assert_ne!(valid, invalid);
        assert!(indeterminate.contains("timeout"));

        let back: ValidationOutcome = serde_json::from_str(&indeterminate).unwrap();
        assert_eq!(back, ValidationOutcome::Indeterminate("timeout".into()));
    }

    #[test]
    fn revision_short_handles_small_ids() {
        assert_eq!(RevisionId::new("abc").short(), "abc");
        assert_eq!(RevisionId::new("0123456789abcdef").short(), "01234567");
    }
}
