pub mod notification;
pub mod rating_store;
pub mod repository;

pub use crate::domain::model::{
    CatalogEvent, DeliveryFailure, DispatchReport, Email, NotificationRequest, NotificationType,
    Rating, Whisky,
};
pub use crate::domain::ports::{MailTransport, Storage};
pub use crate::utils::error::Result;
