#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use remarker::config::SnapshotConfig;
use remarker::content::StanceClassifier;
use remarker::error::{OracleError, OracleResult, TransportError, TransportResult};
use remarker::graph::{GraphStore, SnapshotBridge};
use remarker::oracle::TextOracle;
use remarker::transport::{ThreadHandle, ThreadTransport};

/// Oracle that replays a fixed sequence of outcomes, then keeps
/// answering "question".
pub struct ScriptedOracle {
    script: Mutex<VecDeque<OracleResult<String>>>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<OracleResult<String>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    /// Convenience: a script of plain successful responses.
    pub fn answering(labels: &[&str]) -> Self {
        Self::new(labels.iter().map(|l| Ok(l.to_string())).collect())
    }

    pub fn failing() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl TextOracle for ScriptedOracle {
    async fn generate(&self, _prompt: &str) -> OracleResult<String> {
        let mut script = self.script.lock().unwrap();
        script.pop_front().unwrap_or_else(|| {
            Err(OracleError::Unavailable {
                message: "script exhausted".to_string(),
                retries: 0,
            })
        })
    }
}

/// In-memory transport double. Hands out sequential thread ids and
/// records every call.
pub struct FakeTransport {
    fail: AtomicBool,
    counter: AtomicU64,
    pub posted: Mutex<Vec<(String, String)>>,
    pub reactions: Mutex<Vec<(String, String, String)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            counter: AtomicU64::new(0),
            posted: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let transport = Self::new();
        transport.fail.store(true, Ordering::SeqCst);
        transport
    }
}

#[async_trait]
impl ThreadTransport for FakeTransport {
    async fn create_thread(
        &self,
        _channel_id: &str,
        _title: &str,
        content: &str,
    ) -> TransportResult<ThreadHandle> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Api {
                status: 500,
                message: "thread creation refused".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.posted
            .lock()
            .unwrap()
            .push((format!("thread-{}", n), content.to_string()));
        Ok(ThreadHandle {
            thread_id: format!("thread-{}", n),
            message_id: Some(format!("msg-{}", n)),
        })
    }

    async fn post_message(&self, thread_id: &str, content: &str) -> TransportResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Api {
                status: 500,
                message: "message refused".to_string(),
            });
        }
        self.posted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), content.to_string()));
        Ok(format!("posted-{}", self.counter.fetch_add(1, Ordering::SeqCst)))
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> TransportResult<()> {
        self.reactions.lock().unwrap().push((
            channel_id.to_string(),
            message_id.to_string(),
            emoji.to_string(),
        ));
        Ok(())
    }
}

pub fn snapshot_in(dir: &TempDir) -> Arc<SnapshotBridge> {
    Arc::new(SnapshotBridge::new(&SnapshotConfig {
        path: dir.path().join("graph.json"),
    }))
}

/// A graph store whose classifier replays the given stance labels.
pub async fn store_answering(dir: &TempDir, labels: &[&str]) -> Arc<GraphStore> {
    let oracle = Arc::new(ScriptedOracle::answering(labels));
    let classifier = StanceClassifier::new(oracle);
    Arc::new(
        GraphStore::restore(snapshot_in(dir), classifier)
            .await
            .expect("store should restore from empty dir"),
    )
}

/// Wait for the fire-and-forget snapshot writes to land on disk.
pub async fn settle(store: &GraphStore) {
    store.flush().await;
}
