//! Stdio event server.
//!
//! Reads line-delimited JSON inbound events on stdin and writes one
//! line-delimited JSON response descriptor per event on stdout. The
//! platform adapter sitting on the other side of the pipe owns signature
//! verification and wire-format rendering; this loop only dispatches.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::router::{InboundEvent, Response, Router};

/// Line-oriented stdin/stdout event server.
pub struct EventServer {
    router: Router,
}

impl EventServer {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Run until stdin reaches EOF. Each parsed event is dispatched to
    /// completion before the next line is read; the per-thread
    /// serialization inside the graph store makes concurrent dispatch
    /// unnecessary at this scale.
    pub async fn run(&self) -> std::io::Result<()> {
        info!("Remarker event server starting");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF reached
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!(event = %trimmed, "Received event");

            let response = match serde_json::from_str::<InboundEvent>(trimmed) {
                Ok(event) => self.router.handle_event(event).await,
                Err(e) => {
                    error!(error = %e, "Failed to parse event");
                    Response::private(format!("Malformed event: {}", e))
                }
            };

            let response_json = serde_json::to_string(&response)?;
            debug!(response = %response_json, "Sending response");

            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}
