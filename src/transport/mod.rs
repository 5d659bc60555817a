//! Chat-platform transport.
//!
//! The orchestrator's only outward surface besides response descriptors:
//! creating threads, posting messages into them, and reacting to
//! messages. Everything goes through the [`ThreadTransport`] trait so the
//! router can be exercised against a mock.

mod discord;

pub use discord::DiscordTransport;

use async_trait::async_trait;

use crate::error::TransportResult;

/// Identifiers returned by a successful thread creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHandle {
    /// Platform id of the newly created thread.
    pub thread_id: String,
    /// Platform id of the starter message posted into it, when the
    /// platform reports one.
    pub message_id: Option<String>,
}

/// Operations the orchestrator needs from the chat platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThreadTransport: Send + Sync {
    /// Create a public thread under a channel, post `content` as its
    /// starter message, and pin that message.
    async fn create_thread(
        &self,
        channel_id: &str,
        title: &str,
        content: &str,
    ) -> TransportResult<ThreadHandle>;

    /// Post a message into an existing thread.
    async fn post_message(&self, thread_id: &str, content: &str) -> TransportResult<String>;

    /// Add an emoji reaction to a message.
    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> TransportResult<()>;
}
