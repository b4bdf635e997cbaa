/// Log-only transport for development

use super::{MailError, Mailer, OutgoingMail};
use async_trait::async_trait;

/// Writes every message to the tracing log instead of sending it
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            "Mail (not sent):\n{}",
            mail.text
        );
        Ok(())
    }
}
