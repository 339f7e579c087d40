use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::report::{RevisionScan, ScanFinding, ScanSnapshot, ScanWarning};
use crate::core::traits::CredentialExtractor;

/// Walks every regular file of a materialized revision and runs the
/// extractor over its contents.
///
/// One unreadable file never prevents scanning the rest of the revision;
/// read failures become warnings on the revision's scan result. `scan`
/// returns only after every file has been visited; that return is the
/// completion signal the walker waits on.
pub struct RepoScanner {
    extractor: Arc<dyn CredentialExtractor>,
    max_file_size: u64,
}

impl RepoScanner {
    pub fn new(extractor: Arc<dyn CredentialExtractor>, max_file_size: u64) -> Self {
        Self {
            extractor,
            max_file_size,
        }
    }

    pub fn scan(&self, snapshot: &ScanSnapshot) -> RevisionScan {
        let mut findings = Vec::new();
        let mut warnings = Vec::new();

        let walk = WalkDir::new(&snapshot.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warnings.push(ScanWarning {
                        revision: snapshot.revision.clone(),
                        file_path: e
                            .path()
                            .map(|p| self.relative(snapshot, p))
                            .unwrap_or_default(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.max_file_size {
                    debug!("skipping oversized file {}", entry.path().display());
                    continue;
                }
            }

            let file_path = self.relative(snapshot, entry.path());
            match fs::read(entry.path()) {
                Ok(content) => {
                    for credential in self.extractor.extract(&content) {
                        findings.push(ScanFinding {
                            revision: snapshot.revision.clone(),
                            file_path: file_path.clone(),
                            credential,
                        });
                    }
                }
                Err(e) => warnings.push(ScanWarning {
                    revision: snapshot.revision.clone(),
                    file_path,
                    message: e.to_string(),
                }),
            }
        }

        RevisionScan {
            revision: snapshot.revision.clone(),
            findings,
            warnings,
        }
    }

    fn relative(&self, snapshot: &ScanSnapshot, path: &Path) -> String {
        path.strip_prefix(&snapshot.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
