use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Oid, Repository, Sort};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::core::error::{KeySweepError, Result};
use crate::core::report::RevisionId;
use crate::core::traits::RevisionSource;

/// A local clone of the repository under sweep: the working tree the
/// walker mutates, plus the git plumbing to enumerate and materialize
/// revisions.
///
/// Acquired workspaces live in a temporary directory owned for the run;
/// the clone is deleted when the workspace is dropped.
pub struct GitWorkspace {
    repo: Repository,
    root: PathBuf,
    _clone_dir: Option<TempDir>,
}

impl GitWorkspace {
    /// Clone `location` (any scheme git2 supports, including local paths)
    /// into a fresh temporary directory.
    pub fn acquire(location: &str) -> Result<Self> {
        let clone_dir = tempfile::Builder::new()
            .prefix("keysweep-clone-")
            .tempdir()
            .map_err(|e| KeySweepError::Acquisition(format!("cannot create clone dir: {}", e)))?;

        info!("cloning {} into {}", location, clone_dir.path().display());
        let repo = RepoBuilder::new()
            .clone(location, clone_dir.path())
            .map_err(|e| KeySweepError::Acquisition(format!("cannot clone {}: {}", location, e)))?;

        let root = clone_dir.path().to_path_buf();
        Ok(Self {
            repo,
            root,
            _clone_dir: Some(clone_dir),
        })
    }

    /// Open an existing clone in place. The working tree at `path` will be
    /// rewritten by the walk; never point this at a checkout you care about.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)
            .map_err(|e| KeySweepError::Acquisition(format!("cannot open {}: {}", path.display(), e)))?;
        Ok(Self {
            repo,
            root: path.to_path_buf(),
            _clone_dir: None,
        })
    }
}

impl RevisionSource for GitWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    fn revisions(&self) -> Result<Vec<RevisionId>> {
        let enumeration = |e: git2::Error| KeySweepError::RevisionList(e.to_string());

        if self.repo.is_empty().map_err(enumeration)? {
            return Ok(Vec::new());
        }

        let mut revwalk = self.repo.revwalk().map_err(enumeration)?;
        revwalk.push_head().map_err(enumeration)?;
        revwalk
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .map_err(enumeration)?;

        let mut revisions = Vec::new();
        for oid in revwalk {
            revisions.push(RevisionId::new(oid.map_err(enumeration)?.to_string()));
        }
        debug!("enumerated {} revisions", revisions.len());
        Ok(revisions)
    }

    fn materialize(&mut self, revision: &RevisionId) -> Result<()> {
        let oid = Oid::from_str(revision.as_str())?;
        let commit = self.repo.find_commit(oid)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force().remove_untracked(true).remove_ignored(true);
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))?;
        self.repo.set_head_detached(oid)?;
        debug!("materialized {}", revision.short());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use git2::Signature;

    /// Write `files`, stage everything, and commit with a fixed, strictly
    /// increasing timestamp so revision ordering is deterministic.
    pub fn commit_files(
        repo: &Repository,
        files: &[(&str, &str)],
        removals: &[&str],
        message: &str,
        epoch: i64,
    ) -> Oid {
        let root = repo.workdir().unwrap();
        for (name, contents) in files {
            std::fs::write(root.join(name), contents).unwrap();
        }
        for name in removals {
            std::fs::remove_file(root.join(name)).unwrap();
        }

        let mut index = repo.index().unwrap();
        for (name, _) in files {
            index.add_path(Path::new(name)).unwrap();
        }
        for name in removals {
            index.remove_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let when = git2::Time::new(epoch, 0);
        let sig = Signature::new("keysweep-test", "test@example.com", &when).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }
}
