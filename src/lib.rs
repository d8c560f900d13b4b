pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::mail::{HttpMailTransport, LogMailTransport, MailSettings};
pub use crate::adapters::storage::LocalStorage;
pub use crate::config::toml_config::AppConfig;
pub use crate::core::notification::{DispatchSettings, NotificationDispatcher};
pub use crate::core::repository::{SharedRepository, WhiskyRepository, ALL_PAGES, DEFAULT_PAGE_SIZE};
pub use crate::domain::model::{CatalogEvent, NotificationRequest, NotificationType, Rating, Whisky};
pub use crate::utils::error::{CatalogError, Result};
