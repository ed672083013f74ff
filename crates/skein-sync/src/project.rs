//! Full-project pull/push orchestration.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use skein_store::ContentStore;
use skein_tree::FileTree;
use tokio_util::sync::CancellationToken;

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncPhase, SyncResult};
use crate::transport::RemoteTransport;

/// Drives pull/push cycles for one local replica against a remote project,
/// materializing files to and from local disk.
///
/// The local tree is only marked as synced after a cycle fully succeeds,
/// including blob transfer, so every hash reachable from the tree always
/// has real bytes available somewhere the replica can reach.
pub struct ProjectSync {
    tree: FileTree,
    remote: Arc<dyn RemoteTransport>,
    cancel: CancellationToken,
}

impl ProjectSync {
    pub fn new(store: Arc<dyn ContentStore>, remote: Arc<dyn RemoteTransport>) -> Self {
        Self::with_tree(FileTree::new(store), remote)
    }

    /// Wrap an existing tree (e.g. one that already holds local writes).
    pub fn with_tree(tree: FileTree, remote: Arc<dyn RemoteTransport>) -> Self {
        Self {
            tree,
            remote,
            cancel: CancellationToken::new(),
        }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    /// Token callers can use to abort in-flight sync operations.
    ///
    /// Cancellation takes effect between atomic steps: a fetched delta is
    /// either fully merged or not applied at all.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch the remote project state, merge it, download missing blobs,
    /// and materialize every file under `out_dir`.
    pub async fn pull_all(&self, project: &str, out_dir: &Path) -> SyncResult<()> {
        let state = self
            .guarded(SyncPhase::Fetch, self.remote.fetch_state(project))
            .await?;

        self.checkpoint()?;
        SyncEngine::merge(&self.tree, &state)
            .map_err(|e| SyncError::from(e).in_phase(SyncPhase::Merge))?;

        let nodes = self.tree.file_nodes()?;
        for (path, node) in &nodes {
            self.checkpoint()?;
            if !self.tree.store().contains(&node.hash)? {
                let bytes = self
                    .guarded(
                        SyncPhase::BlobTransfer,
                        fetch_verified(self.remote.as_ref(), project, node.hash),
                    )
                    .await?;
                self.tree.store().put(&bytes)?;
            }
            let bytes = self.tree.store().get(&node.hash)?;
            materialize(out_dir, path, &bytes)
                .await
                .map_err(|e| e.in_phase(SyncPhase::BlobTransfer))?;
        }

        self.tree.mark_synced();
        tracing::info!(project, files = nodes.len(), "pull complete");
        Ok(())
    }

    /// Fetch a single file from the remote tree and write it to
    /// `out_path`.
    pub async fn pull_file(&self, project: &str, path: &str, out_path: &Path) -> SyncResult<()> {
        let state = self
            .guarded(SyncPhase::Fetch, self.remote.fetch_state(project))
            .await?;

        self.checkpoint()?;
        SyncEngine::merge(&self.tree, &state)
            .map_err(|e| SyncError::from(e).in_phase(SyncPhase::Merge))?;

        let node = match self.tree.file_node(path) {
            Ok(node) => node,
            Err(skein_tree::TreeError::PathNotFound(_)) => {
                return Err(SyncError::FileNotFound {
                    project: project.to_string(),
                    path: path.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if !self.tree.store().contains(&node.hash)? {
            let bytes = self
                .guarded(
                    SyncPhase::BlobTransfer,
                    fetch_verified(self.remote.as_ref(), project, node.hash),
                )
                .await?;
            self.tree.store().put(&bytes)?;
        }
        let bytes = self.tree.store().get(&node.hash)?;
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out_path, &bytes).await?;
        tracing::info!(project, path, out = %out_path.display(), "pulled file");
        Ok(())
    }

    /// Scan `src_dir`, fold its contents into the local tree, upload any
    /// blobs the remote lacks, then transmit the delta.
    ///
    /// The delta is computed against the state vector of what the remote
    /// actually holds, not the local sync baseline, so changes that were
    /// staged during an earlier failed push are still transmitted even if
    /// a pull has advanced the baseline in between.
    pub async fn push_all(&self, project: &str, src_dir: &Path) -> SyncResult<()> {
        self.stage_directory(src_dir)
            .map_err(|e| e.in_phase(SyncPhase::Diff))?;

        let remote_state = self
            .guarded(SyncPhase::Diff, self.remote.fetch_state(project))
            .await?;
        let remote_sv = skein_tree::update_state_vector(&remote_state)
            .map_err(|e| SyncError::from(e).in_phase(SyncPhase::Diff))?;
        let delta = SyncEngine::delta_since(&self.tree, &remote_sv)
            .map_err(|e| SyncError::from(e).in_phase(SyncPhase::Diff))?;
        if SyncEngine::is_noop(&delta) {
            tracing::debug!(project, "nothing to push");
            return Ok(());
        }

        // Blobs first: the remote tree must never reference bytes its
        // blob store cannot serve.
        for (_, node) in self.tree.file_nodes()? {
            self.checkpoint()?;
            let exists = self
                .guarded(
                    SyncPhase::BlobUpload,
                    self.remote.blob_exists(project, &node.hash),
                )
                .await?;
            if !exists {
                let bytes = self.tree.store().get(&node.hash)?;
                self.guarded(
                    SyncPhase::BlobUpload,
                    self.remote.upload_blob(project, &node.hash, &bytes),
                )
                .await?;
            }
        }

        self.guarded(SyncPhase::Push, self.remote.push_update(project, &delta))
            .await?;

        self.tree.mark_synced();
        tracing::info!(project, delta_bytes = delta.len(), "push complete");
        Ok(())
    }

    /// Write every regular file under `src_dir` into the tree and drop
    /// tree entries whose files vanished from disk.
    fn stage_directory(&self, src_dir: &Path) -> SyncResult<()> {
        let mut seen = Vec::new();
        for entry in walkdir::WalkDir::new(src_dir) {
            let entry = entry.map_err(|e| {
                SyncError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "walkdir loop")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(src_dir)
                .map_err(|e| SyncError::Validation(e.to_string()))?;
            let path = tree_path(rel)?;
            let bytes = std::fs::read(entry.path())?;

            // Skip unchanged files so mtimes only advance on real edits.
            let unchanged = self
                .tree
                .file_node(&path)
                .map(|node| node.hash.verify(&bytes))
                .unwrap_or(false);
            if !unchanged {
                self.tree.write_file(&path, &bytes)?;
            }
            seen.push(path);
        }

        for path in self.tree.list_files() {
            if !seen.contains(&path) {
                self.tree.delete_file(&path)?;
            }
        }
        Ok(())
    }

    fn checkpoint(&self) -> SyncResult<()> {
        if self.cancel.is_cancelled() {
            Err(SyncError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run one remote call under the cancellation token, tagging failures
    /// with `phase`.
    async fn guarded<T>(
        &self,
        phase: SyncPhase,
        fut: impl Future<Output = SyncResult<T>>,
    ) -> SyncResult<T> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(SyncError::Cancelled),
            result = fut => result.map_err(|e| e.in_phase(phase)),
        }
    }
}

/// Fetch a blob and verify the bytes hash to what the tree references.
async fn fetch_verified(
    remote: &dyn RemoteTransport,
    project: &str,
    hash: skein_types::BlobHash,
) -> SyncResult<Vec<u8>> {
    let bytes = remote.fetch_blob(project, &hash).await?;
    if !hash.verify(&bytes) {
        return Err(SyncError::Validation(format!(
            "blob {} failed hash verification",
            hash.short_hex()
        )));
    }
    Ok(bytes)
}

/// Convert a tree path (`/a/b.txt`) into a location under `out_dir`,
/// rejecting anything that would escape it.
fn target_path(out_dir: &Path, tree_path: &str) -> SyncResult<PathBuf> {
    let rel = Path::new(tree_path.trim_start_matches('/'));
    for component in rel.components() {
        match component {
            Component::Normal(_) => {}
            _ => {
                return Err(SyncError::Validation(format!(
                    "refusing to materialize suspicious path: {tree_path}"
                )))
            }
        }
    }
    Ok(out_dir.join(rel))
}

/// Canonical tree path for a file relative to the scanned root.
fn tree_path(rel: &Path) -> SyncResult<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(s) => parts.push(s),
                None => {
                    return Err(SyncError::Validation(format!(
                        "non-UTF-8 file name: {}",
                        rel.display()
                    )))
                }
            },
            _ => {
                return Err(SyncError::Validation(format!(
                    "unexpected path component in {}",
                    rel.display()
                )))
            }
        }
    }
    Ok(format!("/{}", parts.join("/")))
}

async fn materialize(out_dir: &Path, path: &str, bytes: &[u8]) -> SyncResult<()> {
    let target = target_path(out_dir, path)?;
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, bytes).await?;
    Ok(())
}
