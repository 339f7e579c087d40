use tracing::warn;

use crate::core::report::{RevisionId, ScanSnapshot};
use crate::core::traits::RevisionSource;

/// What the walker hands to its visitor, one event per revision.
pub enum WalkEvent {
    /// The working tree now matches `snapshot.revision` and will not change
    /// until the visitor returns.
    Snapshot(ScanSnapshot),
    /// The revision could not be materialized; it contributes no findings
    /// and the walk continues.
    Skipped { revision: RevisionId, cause: String },
}

/// Visitor verdict after each revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    Stop,
}

/// Sequential driver of the shared working tree.
///
/// The walker is the only component that mutates the tree, and it does so
/// strictly one revision at a time: materialize, hand the snapshot to the
/// visitor, and only materialize the next revision after the visitor has
/// returned. The visitor's return is the scan-completion signal: the
/// handoff is a synchronous call, not a flag check, so a scan can never
/// race a later checkout.
pub struct RevisionWalker<S: RevisionSource> {
    source: S,
    revisions: Vec<RevisionId>,
}

impl<S: RevisionSource> RevisionWalker<S> {
    pub fn new(source: S, revisions: Vec<RevisionId>) -> Self {
        Self { source, revisions }
    }

    /// Walk every revision in order, invoking `visit` once per revision.
    /// Single-pass: each materialization overwrites the shared tree, so the
    /// walker consumes itself and returns the source when done.
    pub fn walk<F>(mut self, mut visit: F) -> S
    where
        F: FnMut(WalkEvent) -> WalkControl,
    {
        for revision in &self.revisions {
            let event = match self.source.materialize(revision) {
                Ok(()) => WalkEvent::Snapshot(ScanSnapshot {
                    revision: revision.clone(),
                    root: self.source.root().to_path_buf(),
                }),
                Err(e) => {
                    warn!("skipping revision {}: {}", revision.short(), e);
                    WalkEvent::Skipped {
                        revision: revision.clone(),
                        cause: e.to_string(),
                    }
                }
            };

            if visit(event) == WalkControl::Stop {
                break;
            }
        }
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{KeySweepError, Result};
    use std::path::{Path, PathBuf};

    /// Scripted revision source: materializing writes the revision id into
    /// a marker file, and revisions listed in `failing` refuse to
    /// materialize.
    struct ScriptedSource {
        root: PathBuf,
        revisions: Vec<RevisionId>,
        failing: Vec<RevisionId>,
        materialized: Vec<RevisionId>,
    }

    impl ScriptedSource {
        fn new(root: &Path, revisions: &[&str], failing: &[&str]) -> Self {
            Self {
                root: root.to_path_buf(),
                revisions: revisions.iter().map(|r| RevisionId::new(*r)).collect(),
                failing: failing.iter().map(|r| RevisionId::new(*r)).collect(),
                materialized: Vec::new(),
            }
        }
    }

    impl RevisionSource for ScriptedSource {
        fn root(&self) -> &Path {
            &self.root
        }

        fn revisions(&self) -> Result<Vec<RevisionId>> {
            Ok(self.revisions.clone())
        }

        fn materialize(&mut self, revision: &RevisionId) -> Result<()> {
            if self.failing.contains(revision) {
                return Err(KeySweepError::Unknown(format!(
                    "cannot check out {}",
                    revision
                )));
            }
            std::fs::write(self.root.join("marker"), revision.as_str()).unwrap();
            self.materialized.push(revision.clone());
            Ok(())
        }
    }

    fn marker(root: &Path) -> String {
        std::fs::read_to_string(root.join("marker")).unwrap()
    }

    #[test]
    fn scan_never_observes_the_next_revision() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(dir.path(), &["r1", "r2", "r3"], &[]);
        let walker = RevisionWalker::new(source, vec![
            RevisionId::new("r1"),
            RevisionId::new("r2"),
            RevisionId::new("r3"),
        ]);

        let mut observed = Vec::new();
        walker.walk(|event| {
            if let WalkEvent::Snapshot(snapshot) = event {
                // The marker on disk must belong to the snapshot being
                // scanned, never to a later revision.
                observed.push((snapshot.revision.clone(), marker(&snapshot.root)));
            }
            WalkControl::Continue
        });

        assert_eq!(observed.len(), 3);
        for (revision, seen) in observed {
            assert_eq!(revision.as_str(), seen);
        }
    }

    #[test]
    fn failed_materialization_skips_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(dir.path(), &[], &["bad"]);
        let walker = RevisionWalker::new(source, vec![
            RevisionId::new("good1"),
            RevisionId::new("bad"),
            RevisionId::new("good2"),
        ]);

        let mut snapshots = Vec::new();
        let mut skips = Vec::new();
        let source = walker.walk(|event| {
            match event {
                WalkEvent::Snapshot(s) => snapshots.push(s.revision),
                WalkEvent::Skipped { revision, cause } => skips.push((revision, cause)),
            }
            WalkControl::Continue
        });

        assert_eq!(
            snapshots,
            vec![RevisionId::new("good1"), RevisionId::new("good2")]
        );
        assert_eq!(skips.len(), 1);
        assert_eq!(skips[0].0.as_str(), "bad");
        assert!(skips[0].1.contains("cannot check out"));
        assert_eq!(source.materialized.len(), 2);
    }

    #[test]
    fn stop_ends_the_walk_after_the_current_revision() {
        let dir = tempfile::tempdir().unwrap();
        let source = ScriptedSource::new(dir.path(), &[], &[]);
        let walker = RevisionWalker::new(source, vec![
            RevisionId::new("r1"),
            RevisionId::new("r2"),
            RevisionId::new("r3"),
        ]);

        let mut seen = 0;
        let source = walker.walk(|_| {
            seen += 1;
            WalkControl::Stop
        });

        assert_eq!(seen, 1);
        // Only the first revision was ever materialized.
        assert_eq!(source.materialized, vec![RevisionId::new("r1")]);
    }
}
