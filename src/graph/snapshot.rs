use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info};

use super::DiscourseNode;
use crate::config::SnapshotConfig;
use crate::error::{SnapshotError, SnapshotResult};

/// Persistence bridge: durable snapshot/restore of the discourse graph.
///
/// The on-disk format is a flat JSON document mapping node id to node
/// record, loaded wholesale at startup and rewritten wholesale after each
/// mutation. Scheduled writes are stamped with a version at schedule time
/// and serialized behind a write gate; a write whose version is older
/// than what already landed is skipped, so the final document always
/// reflects the newest scheduled state. The interaction reply never
/// blocks on the disk write, but `flush` waits until every scheduled
/// write has landed, which is what makes shutdown safe.
pub struct SnapshotBridge {
    path: PathBuf,
    write_gate: Mutex<()>,
    version: AtomicU64,
    last_written: AtomicU64,
    pending: AtomicUsize,
    drained: Notify,
}

impl SnapshotBridge {
    /// Create a bridge for the configured snapshot path
    pub fn new(config: &SnapshotConfig) -> Self {
        Self {
            path: config.path.clone(),
            write_gate: Mutex::new(()),
            version: AtomicU64::new(0),
            last_written: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    /// Load the snapshot document. A missing file yields an empty graph.
    pub async fn load(&self) -> SnapshotResult<BTreeMap<String, DiscourseNode>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let nodes: BTreeMap<String, DiscourseNode> = serde_json::from_slice(&bytes)?;
                info!(
                    path = %self.path.display(),
                    nodes = nodes.len(),
                    "Graph snapshot restored"
                );
                Ok(nodes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No snapshot found, starting with empty graph");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(SnapshotError::from(e)),
        }
    }

    /// Write the snapshot document now, outside the scheduled pipeline.
    pub async fn save(&self, nodes: &BTreeMap<String, DiscourseNode>) -> SnapshotResult<()> {
        let version = self.next_version();
        self.write_version(version, nodes).await
    }

    /// Write one stamped version. Temp file plus rename so a crash
    /// mid-write never truncates the previous snapshot; stale versions
    /// are dropped under the gate so writes cannot regress the document.
    async fn write_version(
        &self,
        version: u64,
        nodes: &BTreeMap<String, DiscourseNode>,
    ) -> SnapshotResult<()> {
        let _gate = self.write_gate.lock().await;

        if version <= self.last_written.load(Ordering::SeqCst) {
            debug!(version, "Skipping superseded snapshot write");
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(nodes)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        self.last_written.store(version, Ordering::SeqCst);
        debug!(
            path = %self.path.display(),
            nodes = nodes.len(),
            version,
            "Graph snapshot written"
        );
        Ok(())
    }

    /// Schedule a snapshot write without blocking the caller. The write
    /// is registered before this returns, so a `flush` issued afterwards
    /// always waits for it. Failures are logged; the next mutation
    /// rewrites the full document anyway.
    pub fn schedule_save(self: &Arc<Self>, nodes: BTreeMap<String, DiscourseNode>) {
        let version = self.next_version();
        self.pending.fetch_add(1, Ordering::SeqCst);

        let bridge = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = bridge.write_version(version, &nodes).await {
                error!(error = %e, "Scheduled snapshot write failed");
            }
            if bridge.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                bridge.drained.notify_waiters();
            }
        });
    }

    /// Wait until every scheduled write has completed.
    pub async fn flush(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register with the notifier before checking, so a wakeup
            // between the check and the await is never lost.
            notified.as_mut().enable();
            if self.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }

    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// The snapshot file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
