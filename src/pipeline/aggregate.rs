use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::core::report::{
    CredentialRecord, Occurrence, RevisionId, ScanFinding, ScanReport, ScanWarning,
    SkippedRevision, ValidationOutcome,
};

#[derive(Default)]
struct AggregateState {
    credentials: BTreeMap<String, CredentialRecord>,
    skipped: Vec<SkippedRevision>,
    warnings: Vec<ScanWarning>,
    revisions_walked: usize,
    walk_complete: bool,
}

/// Thread-safe sink for everything the run produces: findings from the
/// walker/scanner side, outcomes from validation tasks, revision-level
/// failures and per-file warnings.
///
/// Every mutator may be called concurrently. `snapshot` may be taken at any
/// time; a snapshot taken before the walk has finished and every submitted
/// validation has settled is labeled incomplete rather than failing.
pub struct ResultAggregator {
    repository: String,
    state: Mutex<AggregateState>,
}

impl ResultAggregator {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            state: Mutex::new(AggregateState::default()),
        }
    }

    pub fn record_finding(&self, finding: &ScanFinding) {
        let mut state = self.state.lock().unwrap();
        let record = state
            .credentials
            .entry(finding.credential.identifier.clone())
            .or_insert_with(|| CredentialRecord {
                outcome: None,
                occurrences: Vec::new(),
            });
        record.occurrences.push(Occurrence {
            revision: finding.revision.clone(),
            file_path: finding.file_path.clone(),
        });
    }

    pub fn record_outcome(&self, identifier: &str, outcome: ValidationOutcome) {
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.credentials.get_mut(identifier) {
            record.outcome = Some(outcome);
        }
    }

    pub fn record_revision_failure(&self, revision: RevisionId, cause: String) {
        self.state
            .lock()
            .unwrap()
            .skipped
            .push(SkippedRevision { revision, cause });
    }

    pub fn record_warning(&self, warning: ScanWarning) {
        self.state.lock().unwrap().warnings.push(warning);
    }

    pub fn revision_scanned(&self) {
        self.state.lock().unwrap().revisions_walked += 1;
    }

    pub fn mark_walk_complete(&self) {
        self.state.lock().unwrap().walk_complete = true;
    }

    /// Settle every identifier still awaiting an outcome. Used when the run
    /// is cancelled and in-flight validations were abandoned.
    pub fn resolve_pending(&self, reason: &str) {
        let mut state = self.state.lock().unwrap();
        for record in state.credentials.values_mut() {
            if record.outcome.is_none() {
                record.outcome = Some(ValidationOutcome::Indeterminate(reason.to_string()));
            }
        }
    }

    pub fn snapshot(&self) -> ScanReport {
        let state = self.state.lock().unwrap();
        let settled = state.credentials.values().all(|r| r.outcome.is_some());
        ScanReport {
            generated_at: Utc::now(),
            repository: self.repository.clone(),
            revisions_walked: state.revisions_walked,
            revisions_skipped: state.skipped.len(),
            credentials: state.credentials.clone(),
            skipped_revisions: state.skipped.clone(),
            warnings: state.warnings.clone(),
            complete: state.walk_complete && settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::CandidateCredential;

    fn finding(identifier: &str, revision: &str, file_path: &str) -> ScanFinding {
        ScanFinding {
            revision: RevisionId::new(revision),
            file_path: file_path.to_string(),
            credential: CandidateCredential {
                identifier: identifier.to_string(),
                secret: "irrelevant-here".to_string(),
            },
        }
    }

    #[test]
    fn occurrences_accumulate_across_revisions() {
        let aggregator = ResultAggregator::new("repo");
        aggregator.record_finding(&finding("AKIA1234567890ABCD12", "abc123", "a.env"));
        aggregator.record_finding(&finding("AKIA1234567890ABCD12", "def456", "b.env"));
        aggregator.record_outcome("AKIA1234567890ABCD12", ValidationOutcome::Valid);
        aggregator.mark_walk_complete();

        let report = aggregator.snapshot();
        let record = &report.credentials["AKIA1234567890ABCD12"];
        assert_eq!(record.occurrences.len(), 2);
        assert_eq!(record.outcome, Some(ValidationOutcome::Valid));
        assert!(report.complete);
    }

    #[test]
    fn early_snapshot_is_labeled_incomplete() {
        let aggregator = ResultAggregator::new("repo");
        aggregator.record_finding(&finding("AKIA1234567890ABCD12", "abc123", "a.env"));

        let report = aggregator.snapshot();
        assert!(!report.complete);
        assert!(report.credentials["AKIA1234567890ABCD12"].outcome.is_none());
    }

    #[test]
    fn pending_outcomes_resolve_on_cancellation() {
        let aggregator = ResultAggregator::new("repo");
        aggregator.record_finding(&finding("AKIA1234567890ABCD12", "abc123", "a.env"));
        aggregator.record_finding(&finding("ASIA0000111122223333", "abc123", "b.env"));
        aggregator.record_outcome("ASIA0000111122223333", ValidationOutcome::Invalid);
        aggregator.mark_walk_complete();
        aggregator.resolve_pending("run cancelled");

        let report = aggregator.snapshot();
        assert_eq!(
            report.credentials["AKIA1234567890ABCD12"].outcome,
            Some(ValidationOutcome::Indeterminate("run cancelled".to_string()))
        );
        // Settled outcomes are left untouched.
        assert_eq!(
            report.credentials["ASIA0000111122223333"].outcome,
            Some(ValidationOutcome::Invalid)
        );
        assert!(report.complete);
    }

    #[test]
    fn skipped_revisions_are_reported_with_cause() {
        let aggregator = ResultAggregator::new("repo");
        aggregator.record_revision_failure(
            RevisionId::new("deadbeef"),
            "cannot check out: corrupt object".to_string(),
        );
        aggregator.mark_walk_complete();

        let report = aggregator.snapshot();
        assert_eq!(report.revisions_skipped, 1);
        assert_eq!(report.skipped_revisions[0].revision.as_str(), "deadbeef");
        assert!(report.skipped_revisions[0].cause.contains("corrupt"));
    }
}
