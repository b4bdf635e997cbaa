/// HTTP relay transport
///
/// Delivers each message with one request:
///
/// ```text
/// POST <relay_url>
/// Authorization: Bearer <api_key>
/// Content-Type: application/json
///
/// {"from": "...", "to": "...", "subject": "...", "text": "..."}
/// ```
///
/// Any 2xx answer counts as accepted.

use super::{MailError, Mailer, OutgoingMail};
use async_trait::async_trait;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest relay error body kept in [`MailError::Rejected`]
const MAX_ERROR_BODY: usize = 512;

/// Sends mail through an HTTP relay
#[derive(Debug, Clone)]
pub struct HttpRelayMailer {
    client: reqwest::Client,
    relay_url: String,
    api_key: String,
}

impl HttpRelayMailer {
    /// Creates a relay transport
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be built.
    pub fn new(relay_url: String, api_key: String) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("taskboard-worker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            relay_url,
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    fn name(&self) -> &str {
        "http_relay"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(mail)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %mail.to, status = status.as_u16(), "Relay accepted mail");
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            body.truncate(cut);
        }

        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
