//! Ticket-scoped temporary workspaces.

use std::fs;
use std::path::{Path, PathBuf};

use super::WorkspaceError;

/// A scratch directory owned by exactly one request/job pair, keyed by
/// ticket under a namespace-specific temp root
/// (`{temp_root}/{namespace}/{ticket}`).
///
/// The workspace removes itself on drop. For deferred jobs, ownership is
/// handed to the background worker with [`TempWorkspace::keep`], which
/// disarms the drop cleanup; the publisher deletes the directory once the
/// result has been copied out.
#[derive(Debug)]
pub struct TempWorkspace {
    dir: PathBuf,
    armed: bool,
}

impl TempWorkspace {
    /// Create the workspace directory for a ticket.
    pub fn create(
        temp_root: &Path,
        namespace: &str,
        ticket: &str,
    ) -> Result<Self, WorkspaceError> {
        let dir = temp_root.join(namespace).join(ticket);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, armed: true })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write uploaded bytes into the workspace under a sanitized file name.
    pub fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, WorkspaceError> {
        let dst = self.dir.join(sanitize_filename(filename));
        fs::write(&dst, bytes)?;
        Ok(dst)
    }

    /// Copy a server-local file into the workspace.
    pub fn copy_local(&self, src: &Path) -> Result<PathBuf, WorkspaceError> {
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "input".to_string());
        let dst = self.dir.join(sanitize_filename(&name));
        fs::copy(src, &dst)?;
        Ok(dst)
    }

    /// Disarm the drop cleanup and hand the directory to the caller.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        self.dir.clone()
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_dir_all(&self.dir) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove workspace {:?}: {}", self.dir, e);
                }
            }
        }
    }
}

/// Strip path components and unsafe characters from a client-supplied
/// file name.
fn sanitize_filename(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Verify that a directory accepts new files, by creating and removing a
/// probe file.
pub fn check_directory_writable(dir: &Path) -> std::io::Result<()> {
    let probe = tempfile::NamedTempFile::new_in(dir)?;
    drop(probe);
    Ok(())
}
