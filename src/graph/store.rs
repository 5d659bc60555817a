use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{DiscourseNode, NodeKind, SnapshotBridge, Stance};
use crate::content::StanceClassifier;
use crate::error::{AppResult, GraphError, GraphResult};

/// In-memory graph state. Mutated only under the state mutex, and only
/// from code that never suspends while holding it.
struct GraphState {
    nodes: BTreeMap<String, DiscourseNode>,
    next_seq: u64,
}

impl GraphState {
    fn allocate_local_id(&mut self) -> String {
        // Collision-checked against existing keys; seq only grows, so ids
        // of deleted nodes are never handed out again.
        loop {
            let candidate = format!("local-{}", self.next_seq);
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
            self.next_seq += 1;
        }
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// The discourse graph store.
///
/// Exclusively owns all [`DiscourseNode`] instances; callers hold node ids
/// and go through the store's operations to read or mutate. Mutations are
/// serialized per thread: the per-thread guard is held across
/// validate → classify → mutate, so two near-simultaneous replies in the
/// same thread cannot both read a parent's `child_ids` before either
/// write. Operations on different threads proceed in parallel.
pub struct GraphStore {
    state: StdMutex<GraphState>,
    thread_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    snapshots: Arc<SnapshotBridge>,
    classifier: StanceClassifier,
}

impl GraphStore {
    /// Restore the store from its snapshot (empty graph if none exists).
    pub async fn restore(
        snapshots: Arc<SnapshotBridge>,
        classifier: StanceClassifier,
    ) -> AppResult<Self> {
        let nodes = snapshots.load().await?;
        let next_seq = nodes.values().map(|n| n.seq + 1).max().unwrap_or(0);

        let store = Self {
            state: StdMutex::new(GraphState { nodes, next_seq }),
            thread_locks: Mutex::new(HashMap::new()),
            snapshots,
            classifier,
        };
        store.check_consistency()?;

        info!(next_seq, "Discourse graph store ready");
        Ok(store)
    }

    /// Create a root claim node for a thread.
    ///
    /// `external_id` is the platform-assigned message id when the
    /// transport supplies one; otherwise a collision-checked local id is
    /// generated. Fails with [`GraphError::DuplicateRoot`] if the thread
    /// already has a root.
    pub async fn create_root(
        &self,
        thread_id: &str,
        content: &str,
        kind: NodeKind,
        external_id: Option<String>,
    ) -> GraphResult<DiscourseNode> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        let node = {
            let mut state = self.state.lock().expect("graph state poisoned");

            let has_root = state
                .nodes
                .values()
                .any(|n| n.thread_id == thread_id && n.is_root());
            if has_root {
                return Err(GraphError::DuplicateRoot {
                    thread_id: thread_id.to_string(),
                });
            }

            let id = match external_id {
                Some(id) if state.nodes.contains_key(&id) => {
                    return Err(GraphError::Inconsistent {
                        message: format!("External id already present: {}", id),
                    });
                }
                Some(id) => id,
                None => state.allocate_local_id(),
            };

            let seq = state.take_seq();
            let node = DiscourseNode::root(id, thread_id, content, kind, seq);
            state.nodes.insert(node.id.clone(), node.clone());
            node
        };

        self.persist();
        info!(node_id = %node.id, thread_id = %thread_id, "Root claim created");
        Ok(node)
    }

    /// Create a reply node under an existing parent.
    ///
    /// Validates parent existence and thread membership before the
    /// classifier is consulted, so an invalid call leaves the store
    /// untouched and costs no oracle round-trip. The stance is assigned by
    /// the classifier collaborator, which fails open to question.
    pub async fn create_reply(
        &self,
        parent_id: &str,
        thread_id: &str,
        author_tag: &str,
        content: &str,
        external_id: Option<String>,
    ) -> GraphResult<DiscourseNode> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        let parent_content = {
            let state = self.state.lock().expect("graph state poisoned");
            let parent = state
                .nodes
                .get(parent_id)
                .ok_or_else(|| GraphError::UnknownParent {
                    parent_id: parent_id.to_string(),
                })?;
            if parent.thread_id != thread_id {
                return Err(GraphError::ThreadMismatch {
                    parent_thread: parent.thread_id.clone(),
                    thread_id: thread_id.to_string(),
                });
            }
            parent.content.clone()
        };

        // Oracle suspension happens here, before the mutation; the thread
        // guard stays held so same-thread arrivals serialize.
        let stance = self.classifier.classify(content, &parent_content).await;

        let node = self.commit_reply(parent_id, thread_id, author_tag, content, stance, external_id)?;

        self.persist();
        info!(
            node_id = %node.id,
            parent_id = %parent_id,
            stance = %node.stance,
            "Reply recorded"
        );
        Ok(node)
    }

    /// Create a reply whose stance was already resolved by the caller
    /// (modal submissions carry a user-picked stance hint).
    pub async fn create_reply_with_stance(
        &self,
        parent_id: &str,
        thread_id: &str,
        author_tag: &str,
        content: &str,
        stance: Stance,
        external_id: Option<String>,
    ) -> GraphResult<DiscourseNode> {
        let lock = self.thread_lock(thread_id).await;
        let _guard = lock.lock().await;

        {
            let state = self.state.lock().expect("graph state poisoned");
            let parent = state
                .nodes
                .get(parent_id)
                .ok_or_else(|| GraphError::UnknownParent {
                    parent_id: parent_id.to_string(),
                })?;
            if parent.thread_id != thread_id {
                return Err(GraphError::ThreadMismatch {
                    parent_thread: parent.thread_id.clone(),
                    thread_id: thread_id.to_string(),
                });
            }
        }

        let node = self.commit_reply(parent_id, thread_id, author_tag, content, stance, external_id)?;

        self.persist();
        info!(node_id = %node.id, parent_id = %parent_id, stance = %stance, "Reply recorded");
        Ok(node)
    }

    /// Insert a validated reply and append it to the parent's children.
    /// Callers hold the thread guard; the parent was validated under it.
    fn commit_reply(
        &self,
        parent_id: &str,
        thread_id: &str,
        author_tag: &str,
        content: &str,
        stance: Stance,
        external_id: Option<String>,
    ) -> GraphResult<DiscourseNode> {
        let mut state = self.state.lock().expect("graph state poisoned");

        if !state.nodes.contains_key(parent_id) {
            return Err(GraphError::UnknownParent {
                parent_id: parent_id.to_string(),
            });
        }

        let id = match external_id {
            Some(id) if state.nodes.contains_key(&id) => {
                return Err(GraphError::Inconsistent {
                    message: format!("External id already present: {}", id),
                });
            }
            Some(id) => id,
            None => state.allocate_local_id(),
        };

        let seq = state.take_seq();
        let node = DiscourseNode::reply(id, parent_id, thread_id, author_tag, content, stance, seq);

        state.nodes.insert(node.id.clone(), node.clone());
        if let Some(parent) = state.nodes.get_mut(parent_id) {
            parent.child_ids.push(node.id.clone());
        }

        Ok(node)
    }

    /// Replace a node's content in place. Id, parent, stance, and
    /// relationships are untouched; repeating the same edit is a no-op.
    pub async fn edit_content(&self, node_id: &str, new_content: &str) -> GraphResult<()> {
        let thread_id = self.thread_of(node_id)?;
        let lock = self.thread_lock(&thread_id).await;
        let _guard = lock.lock().await;

        {
            let mut state = self.state.lock().expect("graph state poisoned");
            let node = state
                .nodes
                .get_mut(node_id)
                .ok_or_else(|| GraphError::UnknownNode {
                    node_id: node_id.to_string(),
                })?;
            node.content = new_content.to_string();
        }

        self.persist();
        debug!(node_id = %node_id, "Node content edited");
        Ok(())
    }

    /// Delete a node and its entire subtree (cascade policy).
    ///
    /// The node is removed from its parent's `child_ids`; every
    /// descendant is removed with it. Returns how many nodes were
    /// deleted. Freed ids are never reused.
    pub async fn delete_subtree(&self, node_id: &str) -> GraphResult<usize> {
        let thread_id = self.thread_of(node_id)?;
        let lock = self.thread_lock(&thread_id).await;
        let _guard = lock.lock().await;

        let removed = {
            let mut state = self.state.lock().expect("graph state poisoned");

            let node = state
                .nodes
                .get(node_id)
                .ok_or_else(|| GraphError::UnknownNode {
                    node_id: node_id.to_string(),
                })?;
            let parent_id = node.parent_id.clone();

            // Collect the subtree breadth-first before touching anything.
            let mut doomed = vec![node_id.to_string()];
            let mut cursor = 0;
            while cursor < doomed.len() {
                if let Some(n) = state.nodes.get(&doomed[cursor]) {
                    doomed.extend(n.child_ids.iter().cloned());
                }
                cursor += 1;
            }

            for id in &doomed {
                state.nodes.remove(id);
            }
            if let Some(parent_id) = parent_id {
                if let Some(parent) = state.nodes.get_mut(&parent_id) {
                    parent.child_ids.retain(|c| c != node_id);
                }
            }

            doomed.len()
        };

        self.persist();
        info!(node_id = %node_id, removed, "Subtree deleted");
        Ok(removed)
    }

    /// All nodes in a thread, in creation order. Empty if the thread is
    /// unknown.
    pub fn nodes_for_thread(&self, thread_id: &str) -> Vec<DiscourseNode> {
        let state = self.state.lock().expect("graph state poisoned");
        let mut nodes: Vec<DiscourseNode> = state
            .nodes
            .values()
            .filter(|n| n.thread_id == thread_id)
            .cloned()
            .collect();
        nodes.sort_by_key(|n| n.seq);
        nodes
    }

    /// The first root node created for a thread, if any.
    pub fn root_for_thread(&self, thread_id: &str) -> Option<DiscourseNode> {
        self.nodes_for_thread(thread_id)
            .into_iter()
            .find(|n| n.is_root())
    }

    /// Look up a single node by id.
    pub fn get_node(&self, node_id: &str) -> Option<DiscourseNode> {
        let state = self.state.lock().expect("graph state poisoned");
        state.nodes.get(node_id).cloned()
    }

    /// Total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.state.lock().expect("graph state poisoned").nodes.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verify the structural invariants of the whole graph:
    /// bidirectional parent/child consistency, root stance, thread
    /// agreement, and parent-before-child creation order.
    pub fn check_consistency(&self) -> GraphResult<()> {
        let state = self.state.lock().expect("graph state poisoned");

        let mut seen_seqs = std::collections::HashSet::new();
        for node in state.nodes.values() {
            if !seen_seqs.insert(node.seq) {
                return Err(GraphError::Inconsistent {
                    message: format!("Duplicate creation ordinal {}", node.seq),
                });
            }

            match &node.parent_id {
                None => {
                    if node.stance != Stance::Claim {
                        return Err(GraphError::Inconsistent {
                            message: format!("Root {} has stance {}", node.id, node.stance),
                        });
                    }
                }
                Some(parent_id) => {
                    let parent =
                        state
                            .nodes
                            .get(parent_id)
                            .ok_or_else(|| GraphError::Inconsistent {
                                message: format!("Node {} has dangling parent {}", node.id, parent_id),
                            })?;
                    if parent.thread_id != node.thread_id {
                        return Err(GraphError::Inconsistent {
                            message: format!("Node {} crosses threads", node.id),
                        });
                    }
                    if parent.seq >= node.seq {
                        return Err(GraphError::Inconsistent {
                            message: format!("Node {} created before its parent", node.id),
                        });
                    }
                    if !parent.child_ids.contains(&node.id) {
                        return Err(GraphError::Inconsistent {
                            message: format!("Parent {} missing child {}", parent_id, node.id),
                        });
                    }
                }
            }

            for child_id in &node.child_ids {
                let child = state
                    .nodes
                    .get(child_id)
                    .ok_or_else(|| GraphError::Inconsistent {
                        message: format!("Node {} lists dangling child {}", node.id, child_id),
                    })?;
                if child.parent_id.as_deref() != Some(node.id.as_str()) {
                    return Err(GraphError::Inconsistent {
                        message: format!("Child {} does not point back to {}", child_id, node.id),
                    });
                }
            }
        }

        Ok(())
    }

    /// Wait for any scheduled snapshot write to land. Called on shutdown.
    pub async fn flush(&self) {
        self.snapshots.flush().await;
    }

    /// Schedule a full snapshot rewrite. Fire-and-forget relative to the
    /// caller; the bridge serializes writes.
    fn persist(&self) {
        let nodes = {
            let state = self.state.lock().expect("graph state poisoned");
            state.nodes.clone()
        };
        self.snapshots.schedule_save(nodes);
    }

    fn thread_of(&self, node_id: &str) -> GraphResult<String> {
        let state = self.state.lock().expect("graph state poisoned");
        state
            .nodes
            .get(node_id)
            .map(|n| n.thread_id.clone())
            .ok_or_else(|| GraphError::UnknownNode {
                node_id: node_id.to_string(),
            })
    }

    async fn thread_lock(&self, thread_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.thread_locks.lock().await;
        locks
            .entry(thread_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
