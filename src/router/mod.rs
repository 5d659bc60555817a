//! Interaction routing.
//!
//! A pure dispatcher: every inbound platform event produces exactly one
//! outbound [`Response`] descriptor and zero or more graph store
//! mutations. Failures from the oracle, the transport, or the store are
//! rendered as user-visible descriptors, never propagated as crashes.

mod events;

pub use events::{
    Control, EventType, Field, InboundEvent, Response, ResponseBody, ResponseKind, TextInput,
    Visibility,
};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::content::ClaimDrafter;
use crate::graph::{GraphStore, NodeKind, Stance};
use crate::transport::ThreadTransport;

const MAP_CONTENT_PREVIEW: usize = 80;

/// Routes inbound events to graph operations and formats responses.
pub struct Router {
    graph: Arc<GraphStore>,
    drafter: ClaimDrafter,
    transport: Arc<dyn ThreadTransport>,
}

impl Router {
    pub fn new(
        graph: Arc<GraphStore>,
        drafter: ClaimDrafter,
        transport: Arc<dyn ThreadTransport>,
    ) -> Self {
        Self {
            graph,
            drafter,
            transport,
        }
    }

    /// Handle one inbound event to completion.
    pub async fn handle_event(&self, event: InboundEvent) -> Response {
        debug!(event_type = ?event.event_type, name = %event.name(), "Dispatching event");

        match event.event_type {
            EventType::Handshake => Response::private("Remarker is listening."),
            EventType::Command => match event.name() {
                "propose" => self.handle_propose(&event).await,
                "draft" => self.handle_draft(&event).await,
                "stanza" => self.handle_stanza(&event).await,
                "map" => self.handle_map(&event),
                other => {
                    warn!(command = %other, "Unknown command");
                    Response::private("Unknown command.")
                }
            },
            EventType::Component => self.handle_component(&event).await,
            EventType::Modal => self.handle_modal(&event).await,
            EventType::Message => self.handle_organic_message(&event).await,
        }
    }

    /// `/propose <text>`: create a thread on the platform, then record
    /// its root claim. The transport call goes first so a transport
    /// failure leaves the graph untouched.
    async fn handle_propose(&self, event: &InboundEvent) -> Response {
        let text = event.payload_str("text");
        if text.is_empty() {
            return Response::private("Nothing to propose: the claim text is empty.");
        }
        let Some(channel_id) = event.channel_id.as_deref() else {
            return Response::private("This command only works inside a channel.");
        };

        self.open_claim_thread(channel_id, text, NodeKind::Flat, Vec::new())
            .await
    }

    /// `/draft <topic>`: preview candidate claims. Never mutates the
    /// graph.
    async fn handle_draft(&self, event: &InboundEvent) -> Response {
        let topic = event.payload_str("topic");
        if topic.is_empty() {
            return Response::private("Give me a topic to draft claims about.");
        }

        match self.drafter.draft_claims(topic).await {
            Ok(claims) => {
                let listing = claims
                    .iter()
                    .enumerate()
                    .map(|(i, claim)| format!("{}. {}", i + 1, claim))
                    .collect::<Vec<_>>()
                    .join("\n");
                Response::private(format!("Draft claims for **{}**:\n{}", topic, listing))
            }
            Err(e) => {
                warn!(error = %e, "Claim drafting failed");
                Response::private("The text oracle is unavailable right now, try again shortly.")
            }
        }
    }

    /// `/stanza <topic>`: expand the topic into a structured stanza,
    /// then create a thread rooted on it.
    async fn handle_stanza(&self, event: &InboundEvent) -> Response {
        let topic = event.payload_str("topic");
        if topic.is_empty() {
            return Response::private("Give me a topic to build a stanza from.");
        }
        let Some(channel_id) = event.channel_id.as_deref() else {
            return Response::private("This command only works inside a channel.");
        };

        let stanza = match self.drafter.draft_stanza(topic).await {
            Ok(stanza) => stanza,
            Err(e) => {
                warn!(error = %e, "Stanza drafting failed");
                return Response::private(
                    "The text oracle is unavailable right now, try again shortly.",
                );
            }
        };

        let mut fields = vec![Field {
            name: "Claim".to_string(),
            value: stanza.claim.clone(),
        }];
        for (i, support) in stanza.supports.iter().enumerate() {
            fields.push(Field {
                name: format!("Support {}", i + 1),
                value: support.clone(),
            });
        }
        fields.push(Field {
            name: "Counter".to_string(),
            value: stanza.counter.clone(),
        });
        fields.push(Field {
            name: "Question".to_string(),
            value: stanza.question.clone(),
        });

        self.open_claim_thread(channel_id, &stanza.render(), NodeKind::Stanza, fields)
            .await
    }

    /// `/map`: render the current thread's discourse graph in creation
    /// order.
    fn handle_map(&self, event: &InboundEvent) -> Response {
        let Some(thread_id) = event.thread_id.as_deref() else {
            return Response::private("Run /map inside a discourse thread.");
        };

        let nodes = self.graph.nodes_for_thread(thread_id);
        if nodes.is_empty() {
            return Response::private("No discourse recorded for this thread yet.");
        }

        let mut lines = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let indent = if node.is_root() { "" } else { "  " };
            lines.push(format!(
                "{}{} **{}** ({}): {}",
                indent,
                node.stance.emoji(),
                node.stance,
                node.author_tag,
                truncate(&node.content, MAP_CONTENT_PREVIEW)
            ));
        }
        Response::immediate(format!("Discourse map:\n{}", lines.join("\n")))
    }

    async fn handle_component(&self, event: &InboundEvent) -> Response {
        let (action, node_id) = split_custom_id(event.name());
        match action {
            "edit_claim" => {
                let Some(node) = self.graph.get_node(node_id) else {
                    return Response::private("That claim no longer exists.");
                };
                Response::modal(
                    format!("edit_modal:{}", node.id),
                    "Edit claim",
                    vec![TextInput {
                        custom_id: "content".to_string(),
                        label: "Claim text".to_string(),
                        paragraph: true,
                        prefill: Some(node.content),
                    }],
                )
            }
            "add_response" => {
                if self.graph.get_node(node_id).is_none() {
                    return Response::private("That claim no longer exists.");
                }
                Response::modal(
                    format!("response_modal:{}", node_id),
                    "Add a response",
                    vec![
                        TextInput {
                            custom_id: "stance".to_string(),
                            label: "Stance (support / challenge / question / comment)".to_string(),
                            paragraph: false,
                            prefill: None,
                        },
                        TextInput {
                            custom_id: "content".to_string(),
                            label: "Your response".to_string(),
                            paragraph: true,
                            prefill: None,
                        },
                    ],
                )
            }
            "fork_claim" => {
                let Some(node) = self.graph.get_node(node_id) else {
                    return Response::private("That claim no longer exists.");
                };
                Response::modal(
                    "fork_modal".to_string(),
                    "Fork into a new thread",
                    vec![TextInput {
                        custom_id: "text".to_string(),
                        label: "Claim for the new thread".to_string(),
                        paragraph: true,
                        prefill: Some(node.content),
                    }],
                )
            }
            "delete_claim" => match self.graph.delete_subtree(node_id).await {
                Ok(removed) => {
                    info!(node_id = %node_id, removed, "Claim deleted via component");
                    Response::update(format!(
                        "Claim deleted ({} node{} removed).",
                        removed,
                        if removed == 1 { "" } else { "s" }
                    ))
                }
                Err(e) => {
                    warn!(node_id = %node_id, error = %e, "Delete failed");
                    Response::private(format!("Could not delete: {}", e))
                }
            },
            other => {
                warn!(component = %other, "Unknown component");
                Response::private("Unknown interaction.")
            }
        }
    }

    async fn handle_modal(&self, event: &InboundEvent) -> Response {
        let (modal, node_id) = split_custom_id(event.name());
        match modal {
            "edit_modal" => {
                let new_content = event.payload_str("content");
                match self.graph.edit_content(node_id, new_content).await {
                    Ok(()) => Response::update(format!("**Claim (edited):** {}", new_content))
                        .with_controls(claim_controls(node_id)),
                    Err(e) => Response::private(format!("Edit failed: {}", e)),
                }
            }
            "response_modal" => {
                let Some(thread_id) = event.thread_id.as_deref() else {
                    return Response::private("Responses can only be added inside a thread.");
                };
                let stance = Stance::from_label(event.payload_str("stance"))
                    .filter(|s| *s != Stance::Claim)
                    .unwrap_or(Stance::Comment);
                let author = event.author.as_deref().unwrap_or("unknown");
                let content = event.payload_str("content");

                match self
                    .graph
                    .create_reply_with_stance(node_id, thread_id, author, content, stance, None)
                    .await
                {
                    Ok(node) => Response::immediate(format!(
                        "{} **{}** from {}: {}",
                        node.stance.emoji(),
                        node.stance,
                        node.author_tag,
                        node.content
                    )),
                    Err(e) => Response::private(format!("Could not record response: {}", e)),
                }
            }
            "fork_modal" => {
                let text = event.payload_str("text");
                if text.is_empty() {
                    return Response::private("Nothing to fork: the claim text is empty.");
                }
                let Some(channel_id) = event.channel_id.as_deref() else {
                    return Response::private("Forking needs a host channel.");
                };
                self.open_claim_thread(channel_id, text, NodeKind::Flat, Vec::new())
                    .await
            }
            other => {
                warn!(modal = %other, "Unknown modal");
                Response::private("Unknown interaction.")
            }
        }
    }

    /// Organic message in a thread that has a root claim: classify it as
    /// a reply to the root and react on the message with the stance
    /// emoji.
    async fn handle_organic_message(&self, event: &InboundEvent) -> Response {
        let Some(thread_id) = event.thread_id.as_deref() else {
            return silent_ack();
        };
        let Some(root) = self.graph.root_for_thread(thread_id) else {
            return silent_ack();
        };

        let author = event.author.as_deref().unwrap_or("unknown");
        let content = event.payload_str("content");
        if content.is_empty() {
            return silent_ack();
        }

        match self
            .graph
            .create_reply(&root.id, thread_id, author, content, event.message_id.clone())
            .await
        {
            Ok(node) => {
                // Reacting is best-effort; the reply is already recorded.
                if let Some(message_id) = event.message_id.as_deref() {
                    if let Err(e) = self
                        .transport
                        .add_reaction(thread_id, message_id, node.stance.emoji())
                        .await
                    {
                        warn!(thread_id = %thread_id, error = %e, "Stance reaction failed");
                    }
                }
                silent_ack()
            }
            Err(e) => {
                warn!(thread_id = %thread_id, error = %e, "Organic reply rejected");
                silent_ack()
            }
        }
    }

    /// Shared propose/stanza/fork path: thread first, root second.
    async fn open_claim_thread(
        &self,
        channel_id: &str,
        content: &str,
        kind: NodeKind,
        fields: Vec<Field>,
    ) -> Response {
        let title = truncate(content, 90);
        let handle = match self.transport.create_thread(channel_id, &title, content).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "Thread creation failed");
                return Response::private(format!("Could not create the thread: {}", e));
            }
        };

        match self
            .graph
            .create_root(&handle.thread_id, content, kind, handle.message_id.clone())
            .await
        {
            Ok(node) => {
                info!(node_id = %node.id, thread_id = %handle.thread_id, "Claim thread opened");
                Response::immediate(format!("**Claim:** {}", content))
                    .with_fields(fields)
                    .with_controls(claim_controls(&node.id))
            }
            Err(e) => {
                warn!(thread_id = %handle.thread_id, error = %e, "Root creation failed");
                Response::private(format!("The thread was created but the claim was not recorded: {}", e))
            }
        }
    }
}

/// Buttons attached to every rendered claim.
fn claim_controls(node_id: &str) -> Vec<Control> {
    vec![
        Control {
            custom_id: format!("edit_claim:{}", node_id),
            label: "Edit".to_string(),
        },
        Control {
            custom_id: format!("add_response:{}", node_id),
            label: "Respond".to_string(),
        },
        Control {
            custom_id: format!("fork_claim:{}", node_id),
            label: "Fork".to_string(),
        },
        Control {
            custom_id: format!("delete_claim:{}", node_id),
            label: "Delete".to_string(),
        },
    ]
}

/// Gateway messages have no interaction to answer; an empty deferred
/// descriptor tells the transport there is nothing to send.
fn silent_ack() -> Response {
    Response {
        kind: ResponseKind::Deferred,
        visibility: Visibility::Private,
        body: ResponseBody::default(),
    }
}

fn split_custom_id(custom_id: &str) -> (&str, &str) {
    match custom_id.split_once(':') {
        Some((action, rest)) => (action, rest),
        None => (custom_id, ""),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
