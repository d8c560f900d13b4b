use crate::domain::model::Email;
use crate::utils::error::Result;
use async_trait::async_trait;

/// File access relative to a storage root.
pub trait Storage: Send + Sync {
    /// `Ok(None)` when the file does not exist.
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Replaces the whole file, creating parent directories as needed.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Returns `false` when there was nothing to remove.
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}
