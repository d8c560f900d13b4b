use crate::domain::model::Email;
use crate::domain::ports::MailTransport;
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Connection parameters for the mail relay.
#[derive(Debug, Clone)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub path: String,
}

impl MailSettings {
    pub fn endpoint(&self) -> Result<Url> {
        let scheme = if self.use_tls { "https" } else { "http" };
        let path = self.path.trim_start_matches('/');
        let raw = format!("{}://{}:{}/{}", scheme, self.host, self.port, path);

        Url::parse(&raw).map_err(|e| CatalogError::InvalidConfigValueError {
            field: "mail.host".to_string(),
            value: raw.clone(),
            reason: format!("Invalid relay URL: {}", e),
        })
    }
}

/// Posts each email as JSON to an HTTP mail relay.
pub struct HttpMailTransport {
    client: Client,
    endpoint: Url,
    username: Option<String>,
    password: Option<String>,
}

impl HttpMailTransport {
    pub fn new(settings: MailSettings) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            endpoint: settings.endpoint()?,
            username: settings.username,
            password: settings.password,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &Email) -> Result<()> {
        tracing::debug!("Posting email for {} to {}", email.to, self.endpoint);

        let mut request = self.client.post(self.endpoint.clone()).json(email);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CatalogError::Transport {
                recipient: email.to.clone(),
                message: format!("relay responded with {}: {}", status, detail.trim()),
            });
        }

        Ok(())
    }
}

/// Dry-run transport: logs what would have been sent.
#[derive(Debug, Clone, Default)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, email: &Email) -> Result<()> {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "Email not sent (mail disabled)"
        );
        Ok(())
    }
}
