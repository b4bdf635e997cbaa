/// Mail transports
///
/// The digest scheduler only sees the [`Mailer`] trait. Which transport is
/// used is decided once at startup from [`MailConfig`](crate::config::MailConfig).
///
/// # Transports
///
/// - **HttpRelay**: POSTs the message as JSON to a relay endpoint
/// - **Log**: Writes the message to the log (development)
/// - **Memory**: Keeps messages in an outbox (tests)

pub mod http_relay;
pub mod log;
pub mod memory;

pub use http_relay::HttpRelayMailer;
pub use log::LogMailer;
pub use memory::MemoryMailer;

use crate::config::{MailConfig, MailTransport};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Mail delivery errors
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Relay unreachable or the request could not be sent
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Relay answered with a non-success status
    #[error("Mail relay rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Recipient refused by the transport
    #[error("Recipient refused: {0}")]
    Refused(String),
}

/// A plain-text message ready to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    /// Sender address
    pub from: String,

    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub text: String,
}

/// A mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport name, for logs
    fn name(&self) -> &str;

    /// Delivers one message
    ///
    /// # Errors
    ///
    /// Returns an error if the message was not accepted. The caller treats
    /// the message as unsent.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Builds the configured transport
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    let mailer: Arc<dyn Mailer> = match &config.transport {
        MailTransport::Log => Arc::new(LogMailer::new()),
        MailTransport::Http { relay_url, api_key } => {
            Arc::new(HttpRelayMailer::new(relay_url.clone(), api_key.clone())?)
        }
    };

    tracing::info!(transport = mailer.name(), "Mail transport ready");
    Ok(mailer)
}
