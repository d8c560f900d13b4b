use crate::core::{
    CatalogEvent, DeliveryFailure, DispatchReport, Email, MailTransport, NotificationRequest,
    NotificationType, Rating, Whisky,
};
use crate::utils::error::{CatalogError, Result};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SENDER: &str = "notifications@whiskyapi.com";
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub sender_address: String,
    /// Upper bound for a single send; a slow relay cannot stall the batch.
    pub send_timeout: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            sender_address: DEFAULT_SENDER.to_string(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

/// Subscriptions interested in `event`, paired with the category they matched on.
///
/// For an added whisky every `NEW_WHISKY` match comes first, then the
/// `NEW_WHISKY_IN_REGION` matches; within a category, list order is kept.
pub fn matching_subscribers<'a>(
    subscriptions: &'a [NotificationRequest],
    event: &CatalogEvent,
) -> Vec<(NotificationType, &'a NotificationRequest)> {
    let of_type = move |kind: NotificationType| {
        subscriptions
            .iter()
            .filter(move |s| s.notification_type == kind)
    };

    match event {
        CatalogEvent::WhiskyAdded { whisky } => of_type(NotificationType::NewWhisky)
            .map(|s| (NotificationType::NewWhisky, s))
            .chain(
                of_type(NotificationType::NewWhiskyInRegion)
                    .filter(|s| s.matches_region(&whisky.region_style))
                    .map(|s| (NotificationType::NewWhiskyInRegion, s)),
            )
            .collect(),
        CatalogEvent::RatingAdded { .. } => of_type(NotificationType::NewRating)
            .map(|s| (NotificationType::NewRating, s))
            .collect(),
    }
}

pub fn compose_emails(
    subscriptions: &[NotificationRequest],
    event: &CatalogEvent,
    sender_address: &str,
) -> Vec<Email> {
    matching_subscribers(subscriptions, event)
        .into_iter()
        .map(|(kind, subscription)| {
            let (subject, body) = message_for(kind, event);
            Email {
                from: sender_address.to_string(),
                to: subscription.email_address.clone(),
                subject,
                body,
            }
        })
        .collect()
}

fn message_for(kind: NotificationType, event: &CatalogEvent) -> (String, String) {
    match event {
        CatalogEvent::WhiskyAdded { whisky } => {
            let subject = match kind {
                NotificationType::NewWhiskyInRegion => format!(
                    "[Whisky API] New Whisky Added in {} Region",
                    whisky.region_style
                ),
                _ => "[Whisky API] New Whisky Added".to_string(),
            };
            let body = format!(
                "Hey there!  We thought you'd like to know a new whisky has been added!\n\
                 It is named {} and is from the {} region.",
                whisky.name, whisky.region_style
            );
            (subject, body)
        }
        CatalogEvent::RatingAdded { whisky, rating } => (
            "[Whisky API] New Rating Added".to_string(),
            format!(
                "Hey there!  We thought you'd like to know a new rating has been added for {}!\n\n\
                 It was given a {} star rating with the following message: {}",
                whisky.name, rating.stars, rating.message
            ),
        ),
    }
}

/// Sends catalog events to the subscribers that asked for them.
pub struct NotificationDispatcher {
    subscriptions: Vec<NotificationRequest>,
    transport: Arc<dyn MailTransport>,
    settings: DispatchSettings,
}

impl NotificationDispatcher {
    pub fn new(
        subscriptions: Vec<NotificationRequest>,
        transport: Arc<dyn MailTransport>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            subscriptions,
            transport,
            settings,
        }
    }

    /// Loads subscriptions from a JSON document; a missing document means no subscribers.
    pub async fn from_file(
        path: impl AsRef<Path>,
        transport: Arc<dyn MailTransport>,
        settings: DispatchSettings,
    ) -> Result<Self> {
        let path = path.as_ref();

        let subscriptions = match tokio::fs::read(path).await {
            Ok(data) => {
                let parsed: Option<Vec<NotificationRequest>> = serde_json::from_slice(&data)?;
                parsed.unwrap_or_default()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("No subscription document at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("Loaded {} subscriptions", subscriptions.len());
        Ok(Self::new(subscriptions, transport, settings))
    }

    pub fn subscriptions(&self) -> &[NotificationRequest] {
        &self.subscriptions
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn plan(&self, event: &CatalogEvent) -> Vec<Email> {
        compose_emails(&self.subscriptions, event, &self.settings.sender_address)
    }

    pub async fn on_whisky_added(&self, whisky: &Whisky) -> DispatchReport {
        self.dispatch(&CatalogEvent::WhiskyAdded {
            whisky: whisky.clone(),
        })
        .await
    }

    pub async fn on_rating_added(&self, whisky: &Whisky, rating: &Rating) -> DispatchReport {
        self.dispatch(&CatalogEvent::RatingAdded {
            whisky: whisky.clone(),
            rating: rating.clone(),
        })
        .await
    }

    /// Sends one email per match, in order. Failures are recorded, not propagated.
    pub async fn dispatch(&self, event: &CatalogEvent) -> DispatchReport {
        let mut report = DispatchReport::default();

        for email in self.plan(event) {
            match self.deliver(&email).await {
                Ok(()) => {
                    tracing::debug!("Notified {} ({})", email.to, email.subject);
                    report.delivered.push(email.to);
                }
                Err(e) => {
                    tracing::warn!("Failed to notify {}: {}", email.to, e);
                    report.failed.push(DeliveryFailure {
                        recipient: email.to,
                        subject: email.subject,
                        error: e.to_string(),
                    });
                }
            }
        }

        if report.attempted() > 0 {
            tracing::info!(
                "Dispatch finished: {} delivered, {} failed",
                report.delivered.len(),
                report.failed.len()
            );
        }
        report
    }

    async fn deliver(&self, email: &Email) -> Result<()> {
        match tokio::time::timeout(self.settings.send_timeout, self.transport.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(CatalogError::Transport {
                recipient: email.to.clone(),
                message: format!("timed out after {:?}", self.settings.send_timeout),
            }),
        }
    }
}
