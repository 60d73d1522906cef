//! Tree scanning.
//!
//! Classifies paths without touching them: the manifest pass finds
//! missing files and digest candidates, the verification pass hashes
//! candidates in parallel, and the unlisted pass walks the real tree for
//! files the manifest never named. Deleting anything is the reconciler's
//! job.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use tracing::{debug, error, warn};

use crate::digest;
use crate::manifest::{DirectoryNode, Manifest, ManifestError};

use super::errors::SyncError;
use super::types::{DownloadJob, HashCandidate};

/// Outcome of the manifest pass.
#[derive(Debug, Default)]
pub struct ManifestScan {
    /// Every local path the manifest declares.
    pub named: HashSet<PathBuf>,
    /// Required or requested files that are absent.
    pub missing: Vec<DownloadJob>,
    /// Present files replaced because the manifest forces a redownload.
    pub forced: Vec<DownloadJob>,
    /// Present files whose digest must be checked.
    pub hash_candidates: Vec<HashCandidate>,
}

/// Walks a manifest and the matching local tree.
#[derive(Debug, Clone)]
pub struct TreeScanner {
    manifest: Arc<Manifest>,
    install_dir: PathBuf,
}

impl TreeScanner {
    /// Create a scanner for one installation root.
    pub const fn new(manifest: Arc<Manifest>, install_dir: PathBuf) -> Self {
        Self {
            manifest,
            install_dir,
        }
    }

    /// The manifest being scanned.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The installation root.
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Classify every manifest file against the local tree.
    ///
    /// `requested` holds paths relative to the installation root that the
    /// caller opted into; optional files outside it are skipped when
    /// absent. Fails on the first file whose path cannot be derived.
    pub fn scan_manifest(&self, requested: &HashSet<PathBuf>) -> Result<ManifestScan, ManifestError> {
        let force = self.manifest.meta().force_redownload;
        let mut scan = ManifestScan::default();

        for (id, file) in self.manifest.files() {
            let relative = self.manifest.relative_path(id)?;
            let dest = self.install_dir.join(&relative);

            if !scan.named.insert(dest.clone()) {
                warn!(path = %dest.display(), "Manifest declares the same file twice; ignoring duplicate");
                continue;
            }

            let wanted = file.required || requested.contains(&relative);

            if dest.is_file() {
                if force && wanted {
                    scan.forced
                        .push(DownloadJob::new(file.source_url.clone(), dest));
                } else if file.digest_required {
                    scan.hash_candidates.push(HashCandidate {
                        path: dest,
                        expected_digest: file.digest.clone(),
                        source_url: file.source_url.clone(),
                    });
                }
            } else if wanted {
                scan.missing
                    .push(DownloadJob::new(file.source_url.clone(), dest));
            } else {
                debug!(path = %dest.display(), "Optional file not requested; skipping");
            }
        }

        Ok(scan)
    }

    /// Async wrapper running [`scan_manifest`](Self::scan_manifest) on the blocking pool.
    pub async fn scan_manifest_blocking(
        &self,
        requested: HashSet<PathBuf>,
    ) -> Result<ManifestScan, SyncError> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.scan_manifest(&requested))
            .await
            .map_err(|e| SyncError::Task {
                message: e.to_string(),
            })?
            .map_err(SyncError::from)
    }

    /// Hash every candidate and return those that do not match.
    ///
    /// Runs up to `concurrency` checks at once on the blocking pool and
    /// reports percentage progress after each completed check. A file that
    /// cannot be read (vanished, permission denied) counts as a mismatch.
    /// The result is sorted by path.
    pub async fn verify_candidates<F>(
        &self,
        candidates: Vec<HashCandidate>,
        concurrency: usize,
        mut on_progress: F,
    ) -> Vec<HashCandidate>
    where
        F: FnMut(f32),
    {
        let total = candidates.len();
        if total == 0 {
            on_progress(100.0);
            return Vec::new();
        }

        let mut checks = stream::iter(candidates)
            .map(|candidate| async move {
                let path = candidate.path.clone();
                let expected = candidate.expected_digest.clone();
                let outcome =
                    tokio::task::spawn_blocking(move || digest::verify(&path, &expected)).await;
                (candidate, outcome)
            })
            .buffer_unordered(concurrency.max(1));

        let mut mismatched = Vec::new();
        let mut done = 0usize;

        while let Some((candidate, outcome)) = checks.next().await {
            let intact = match outcome {
                Ok(Ok(matches)) => matches,
                Ok(Err(e)) => {
                    warn!(path = %candidate.path.display(), error = %e, "Could not hash file; treating as modified");
                    false
                }
                Err(e) => {
                    error!(path = %candidate.path.display(), error = %e, "Hashing task failed; treating as modified");
                    false
                }
            };
            if !intact {
                mismatched.push(candidate);
            }

            done += 1;
            #[allow(clippy::cast_precision_loss)]
            on_progress(done as f32 / total as f32 * 100.0);
        }

        mismatched.sort_by(|a, b| a.path.cmp(&b.path));
        mismatched
    }

    /// Find local files that policy does not permit.
    ///
    /// `named` must already hold every manifest-declared path. A stray file
    /// is matched against the directory node whose name and full resolved
    /// path both equal its containing directory; if one exists its
    /// `allow_unlisted` flag decides, otherwise the manifest's
    /// `allow_custom_directories` flag does.
    pub fn find_unlisted(&self, named: &HashSet<PathBuf>) -> Result<Vec<PathBuf>, ManifestError> {
        let directories = self.directory_index()?;
        let allow_custom = self.manifest.meta().allow_custom_directories;

        let disallowed = list_files(&self.install_dir)
            .into_iter()
            .filter(|path| !named.contains(path))
            .filter(|path| {
                let allowed = match declared_directory(&directories, path) {
                    Some(dir) => dir.allow_unlisted,
                    None => allow_custom,
                };
                if allowed {
                    debug!(path = %path.display(), "Unlisted file permitted by policy");
                }
                !allowed
            })
            .collect();

        Ok(disallowed)
    }

    /// Async wrapper running [`find_unlisted`](Self::find_unlisted) on the blocking pool.
    pub async fn find_unlisted_blocking(
        &self,
        named: Arc<HashSet<PathBuf>>,
    ) -> Result<Vec<PathBuf>, ManifestError> {
        let scanner = self.clone();
        match tokio::task::spawn_blocking(move || scanner.find_unlisted(&named)).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Unlisted-file scan failed; no files policed");
                Ok(Vec::new())
            }
        }
    }

    fn directory_index(&self) -> Result<HashMap<PathBuf, &DirectoryNode>, ManifestError> {
        let mut index = HashMap::new();
        for (id, dir) in self.manifest.directories() {
            let path = self.manifest.local_path(id, &self.install_dir)?;
            index.entry(path).or_insert(dir);
        }
        Ok(index)
    }
}

/// Directory node that declares the file's containing directory, if any.
fn declared_directory<'a>(
    directories: &HashMap<PathBuf, &'a DirectoryNode>,
    file: &Path,
) -> Option<&'a DirectoryNode> {
    let parent = file.parent()?;
    let name = parent.file_name()?;
    directories
        .get(parent)
        .copied()
        .filter(|dir| OsStr::new(&dir.name) == name)
}

/// Every regular file under `root`, sorted. Unreadable directories are
/// logged and skipped; symlinked directories are not followed.
fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot read directory; skipping");
                continue;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Cannot read directory entry; skipping");
                    continue;
                }
            };
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => pending.push(entry.path()),
                Ok(_) => files.push(entry.path()),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Cannot stat entry; skipping");
                }
            }
        }
    }

    files.sort();
    files
}
