use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "Stars")]
    pub stars: i16,
    #[serde(rename = "Message")]
    pub message: String,
}

impl Rating {
    pub fn new(stars: i16, message: impl Into<String>) -> Self {
        Self {
            stars,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whisky {
    #[serde(rename = "Id")]
    pub id: Uuid,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RegionStyle")]
    pub region_style: String,
    #[serde(rename = "Ratings", default)]
    pub ratings: Vec<Rating>,
}

impl Whisky {
    /// Builds an unsaved whisky. The nil id is replaced when the repository stores it.
    pub fn new(name: impl Into<String>, region_style: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            region_style: region_style.into(),
            ratings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewRating,
    NewWhisky,
    NewWhiskyInRegion,
}

/// A subscription loaded from the notifications document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "EmailAddress")]
    pub email_address: String,
    #[serde(rename = "NotificationType")]
    pub notification_type: NotificationType,
    /// Only consulted for `NEW_WHISKY_IN_REGION`.
    #[serde(rename = "Region", default)]
    pub region: Option<String>,
}

impl NotificationRequest {
    pub fn new(email_address: impl Into<String>, notification_type: NotificationType) -> Self {
        Self {
            email_address: email_address.into(),
            notification_type,
            region: None,
        }
    }

    pub fn for_region(email_address: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            notification_type: NotificationType::NewWhiskyInRegion,
            region: Some(region.into()),
        }
    }

    pub fn matches_region(&self, region_style: &str) -> bool {
        self.region
            .as_deref()
            .is_some_and(|region| region.to_lowercase() == region_style.to_lowercase())
    }
}

/// Something that happened in the catalog that subscribers may care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    WhiskyAdded { whisky: Whisky },
    RatingAdded { whisky: Whisky, rating: Rating },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub subject: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    pub failed: Vec<DeliveryFailure>,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_json_field_names() {
        let json = serde_json::to_string(&vec![Rating::new(5, "Peaty")]).unwrap();
        assert_eq!(json, r#"[{"Stars":5,"Message":"Peaty"}]"#);
    }

    #[test]
    fn test_notification_request_parsing() {
        let json = r#"[
            {"EmailAddress": "a@example.com", "NotificationType": "NEW_WHISKY_IN_REGION", "Region": "Islay"},
            {"EmailAddress": "b@example.com", "NotificationType": "NEW_RATING"},
            {"EmailAddress": "c@example.com", "NotificationType": "NEW_WHISKY", "Region": null}
        ]"#;

        let requests: Vec<NotificationRequest> = serde_json::from_str(json).unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], NotificationRequest::for_region("a@example.com", "Islay"));
        assert_eq!(requests[1].notification_type, NotificationType::NewRating);
        assert_eq!(requests[2].region, None);
    }

    #[test]
    fn test_unknown_notification_type_is_rejected() {
        let json = r#"[{"EmailAddress": "a@example.com", "NotificationType": "NEW_DISTILLERY"}]"#;
        assert!(serde_json::from_str::<Vec<NotificationRequest>>(json).is_err());
    }

    #[test]
    fn test_region_match_ignores_case() {
        let request = NotificationRequest::for_region("a@example.com", "islay");
        assert!(request.matches_region("Islay"));
        assert!(request.matches_region("ISLAY"));
        assert!(!request.matches_region("Speyside"));

        let no_region = NotificationRequest::new("b@example.com", NotificationType::NewWhiskyInRegion);
        assert!(!no_region.matches_region("Islay"));
    }
}
