//! Generative-text oracle: the single text-in/text-out capability the
//! content adapter and stance classifier are polymorphic over, plus the
//! Gemini HTTP client implementing it.

mod client;
mod types;

pub use client::GeminiClient;
pub use types::{Candidate, Content, GenerateRequest, GenerateResponse, Part};

use async_trait::async_trait;

use crate::error::OracleResult;

/// A text completion oracle. One prompt in, one completion out, no
/// streaming contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Submit a prompt and return the completion text.
    async fn generate(&self, prompt: &str) -> OracleResult<String>;
}
