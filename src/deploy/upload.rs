//! Recursive directory-mirroring upload engine.
//!
//! Walks the build output tree and recreates it on the remote side over a
//! [`Transport`]. Entries are visited in lexicographic order per directory
//! level (not a global traversal order), so behavior across sibling
//! directories is independent and reproducible. Hidden entries (leading
//! `.`) are skipped unless their name is on the allow list.
//!
//! Remote directories are created lazily, parent-first, before any file
//! that needs them. Creation errors are deliberately swallowed: "already
//! exists" is the expected common case and the protocol reply does not
//! distinguish it from other failures. A genuine mkdir problem surfaces at
//! the subsequent store.

use std::fs::{self, DirEntry, File};
use std::path::Path;
use std::time::Instant;

use super::transport::{TransferError, Transport};

// =============================================================================
// Report
// =============================================================================

/// Counters from mirroring one tree.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// Number of files stored remotely.
    pub files_uploaded: u64,
    /// Total bytes stored remotely.
    pub bytes_uploaded: u64,
    /// Entries skipped by the hidden-file filter.
    pub entries_skipped: u64,
    /// Duration of the mirror operation.
    pub duration_ms: u64,
}

// =============================================================================
// Engine
// =============================================================================

/// Mirrors a local tree onto a remote tree over a [`Transport`].
pub struct Uploader<T: Transport> {
    transport: T,
    allowed_dotfiles: Vec<String>,
}

impl<T: Transport> Uploader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            allowed_dotfiles: vec![".htaccess".to_string()],
        }
    }

    /// Replace the dot-file allow list.
    pub fn with_allowed_dotfiles(mut self, names: Vec<String>) -> Self {
        self.allowed_dotfiles = names;
        self
    }

    /// Mirror `build_dir` under `remote_base` and return the counters.
    pub fn mirror_tree(
        &mut self,
        build_dir: &Path,
        remote_base: &str,
    ) -> Result<UploadReport, TransferError> {
        let start = Instant::now();
        let mut report = UploadReport::default();
        self.upload_dir(build_dir, remote_base.trim_matches('/'), &mut report)?;
        report.duration_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            files = report.files_uploaded,
            bytes = report.bytes_uploaded,
            skipped = report.entries_skipped,
            duration_ms = report.duration_ms,
            "mirror complete"
        );
        Ok(report)
    }

    /// Close the session. Call after a successful mirror.
    pub fn close(mut self) -> Result<(), TransferError> {
        self.transport.close()
    }

    /// Consume the uploader and return the transport.
    #[cfg(test)]
    fn into_inner(self) -> T {
        self.transport
    }

    /// Create a remote directory and its parents, tolerating failure.
    ///
    /// Each progressively-longer prefix gets its own MKD; every error is
    /// swallowed (already-exists is indistinguishable from real failures
    /// on the wire). No-op for empty or root-only paths.
    pub fn ensure_remote_dir(&mut self, remote_path: &str) {
        if remote_path.is_empty() || remote_path == "." || remote_path == "/" {
            return;
        }
        let mut prefix = String::new();
        for part in remote_path.split('/').filter(|p| !p.is_empty()) {
            if prefix.is_empty() {
                prefix = part.to_string();
            } else {
                prefix = format!("{prefix}/{part}");
            }
            if let Err(err) = self.transport.mkdir(&prefix) {
                tracing::trace!(path = %prefix, error = %err, "mkdir ignored");
            }
        }
    }

    /// Recursively upload a directory's entries in sorted order.
    fn upload_dir(
        &mut self,
        local_dir: &Path,
        remote_dir: &str,
        report: &mut UploadReport,
    ) -> Result<(), TransferError> {
        for entry in read_dir_sorted(local_dir)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_skipped(&name, &self.allowed_dotfiles) {
                tracing::debug!(name = %name, "skipping hidden entry");
                report.entries_skipped += 1;
                continue;
            }

            let local_path = entry.path();
            let remote_path = join_remote(remote_dir, &name);
            if local_path.is_dir() {
                self.ensure_remote_dir(&remote_path);
                self.upload_dir(&local_path, &remote_path, report)?;
            } else {
                self.ensure_remote_dir(remote_parent(&remote_path));
                self.upload_file(&local_path, &remote_path, report)?;
            }
        }
        Ok(())
    }

    fn upload_file(
        &mut self,
        local_path: &Path,
        remote_path: &str,
        report: &mut UploadReport,
    ) -> Result<(), TransferError> {
        let mut file = File::open(local_path)?;
        let bytes = self.transport.store(remote_path, &mut file)?;
        report.files_uploaded += 1;
        report.bytes_uploaded += bytes;
        println!("  uploaded {remote_path}");
        Ok(())
    }
}

// =============================================================================
// Dry-run planner
// =============================================================================

/// Walk the tree the same way [`Uploader::mirror_tree`] would and return
/// the remote file paths in upload order, without touching any transport.
pub fn plan_tree(
    build_dir: &Path,
    remote_base: &str,
    allowed_dotfiles: &[String],
) -> Result<Vec<String>, TransferError> {
    let mut planned = Vec::new();
    collect_plan(
        build_dir,
        remote_base.trim_matches('/'),
        allowed_dotfiles,
        &mut planned,
    )?;
    Ok(planned)
}

fn collect_plan(
    local_dir: &Path,
    remote_dir: &str,
    allowed_dotfiles: &[String],
    planned: &mut Vec<String>,
) -> Result<(), TransferError> {
    for entry in read_dir_sorted(local_dir)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_skipped(&name, allowed_dotfiles) {
            continue;
        }
        let local_path = entry.path();
        let remote_path = join_remote(remote_dir, &name);
        if local_path.is_dir() {
            collect_plan(&local_path, &remote_path, allowed_dotfiles, planned)?;
        } else {
            planned.push(remote_path);
        }
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Hidden-entry filter: leading dot, unless allow-listed by exact name.
fn is_skipped(name: &str, allowed_dotfiles: &[String]) -> bool {
    name.starts_with('.') && !allowed_dotfiles.iter().any(|allowed| allowed == name)
}

/// Join a remote base and an entry name with forward slashes.
///
/// Remote paths are built from entry names, never from OS paths, so the
/// separator is `/` on every platform. An empty base yields a bare
/// relative path with no leading slash.
pub fn join_remote(base: &str, name: &str) -> String {
    let base = base.trim_matches('/');
    let name = name.trim_start_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Remote parent directory of a path; empty for top-level paths.
fn remote_parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Directory entries sorted lexicographically by name.
fn read_dir_sorted(dir: &Path) -> Result<Vec<DirEntry>, TransferError> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

// =============================================================================
// Tests
// =============================================================================
