//! # Remarker
//!
//! A conversational-discourse orchestrator: it receives chat-platform
//! interaction events, uses a generative-text oracle to produce
//! argumentative content (claims, structured stanzas, stance
//! classifications), and maintains a persisted graph of discourse nodes
//! per discussion thread.
//!
//! ## Features
//!
//! - **Claim Threads**: `/propose` opens a thread rooted on a claim
//! - **Structured Stanzas**: `/stanza` expands a topic into claim,
//!   supports, counter and question
//! - **Claim Drafting**: `/draft` previews candidate claims without
//!   touching the graph
//! - **Stance Classification**: organic replies are classified as
//!   support, challenge, or question against the thread's root claim
//! - **Discourse Maps**: `/map` renders a thread's graph in creation
//!   order
//! - **Edit / Fork / Delete**: interactive controls rewrite, branch, or
//!   cascade-remove claims
//!
//! ## Architecture
//!
//! ```text
//! Platform adapter → Event Server (stdio) → Router
//!                         ↓                    ↓
//!                   Graph Store ← Gemini (HTTP) / Discord REST
//!                         ↓
//!                  JSON snapshot (disk)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use remarker::{Config, EventServer, Router};
//! use remarker::content::{ClaimDrafter, StanceClassifier};
//! use remarker::graph::{GraphStore, SnapshotBridge};
//! use remarker::oracle::GeminiClient;
//! use remarker::transport::DiscordTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let oracle = Arc::new(GeminiClient::new(&config.oracle, config.request.clone())?);
//!     let snapshots = Arc::new(SnapshotBridge::new(&config.snapshot));
//!     let classifier = StanceClassifier::new(oracle.clone());
//!     let graph = Arc::new(GraphStore::restore(snapshots, classifier).await?);
//!     let transport = Arc::new(DiscordTransport::new(&config.discord, &config.request)?);
//!     let router = Router::new(graph.clone(), ClaimDrafter::new(oracle), transport);
//!     EventServer::new(router).run().await?;
//!     graph.flush().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management for the orchestrator.
pub mod config;
/// Generative content adapter and stance classifier.
pub mod content;
/// Error types and result aliases for the application.
pub mod error;
/// Discourse graph store, node model, and snapshot persistence.
pub mod graph;
/// Generative-text oracle client and types.
pub mod oracle;
/// Prompt templates for the text oracle.
pub mod prompts;
/// Inbound event routing and response descriptors.
pub mod router;
/// Stdio event server.
pub mod server;
/// Chat-platform transport adapters.
pub mod transport;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use graph::{DiscourseNode, GraphStore, NodeKind, SnapshotBridge, Stance};
pub use router::{InboundEvent, Response, Router};
pub use server::EventServer;
