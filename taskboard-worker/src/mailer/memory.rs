/// In-memory transport
///
/// Keeps accepted messages in an outbox. Recipients registered with
/// [`MemoryMailer::failing_for`] are refused, which lets tests exercise the
/// scheduler's failure path.
///
/// # Example
///
/// ```
/// use taskboard_worker::mailer::{Mailer, MemoryMailer, OutgoingMail};
///
/// # async fn example() {
/// let mailer = MemoryMailer::failing_for(["bounce@example.org"]);
/// let mail = OutgoingMail {
///     from: "noreply@taskboard.local".into(),
///     to: "bounce@example.org".into(),
///     subject: "Hi".into(),
///     text: "Hi".into(),
/// };
///
/// assert!(mailer.send(&mail).await.is_err());
/// assert!(mailer.sent().is_empty());
/// # }
/// ```

use super::{MailError, Mailer, OutgoingMail};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Outbox-backed transport
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutgoingMail>>,
    failing: HashSet<String>,
}

impl MemoryMailer {
    /// Mailer that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Mailer that refuses the given recipients
    pub fn failing_for<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outbox: Mutex::new(Vec::new()),
            failing: recipients.into_iter().map(Into::into).collect(),
        }
    }

    /// Snapshot of accepted messages, in send order
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// Accepted messages for one recipient
    pub fn sent_to(&self, recipient: &str) -> Vec<OutgoingMail> {
        self.sent()
            .into_iter()
            .filter(|mail| mail.to == recipient)
            .collect()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.failing.contains(&mail.to) {
            return Err(MailError::Refused(mail.to.clone()));
        }

        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(mail.clone());
        }
        Ok(())
    }
}
