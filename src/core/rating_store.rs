use crate::core::{Rating, Storage};
use crate::utils::error::Result;
use uuid::Uuid;

pub const RATINGS_DIR: &str = "ratings";

/// One JSON document per whisky under `ratings/<id>.json`.
pub struct RatingStore<S: Storage> {
    storage: S,
}

impl<S: Storage> RatingStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn document_path(whisky_id: &Uuid) -> String {
        format!("{}/{}.json", RATINGS_DIR, whisky_id)
    }

    /// A whisky without a document simply has no ratings yet.
    pub async fn load(&self, whisky_id: &Uuid) -> Result<Vec<Rating>> {
        let path = Self::document_path(whisky_id);

        match self.storage.read_file(&path).await? {
            Some(data) => {
                let ratings: Option<Vec<Rating>> = serde_json::from_slice(&data)?;
                Ok(ratings.unwrap_or_default())
            }
            None => Ok(Vec::new()),
        }
    }

    pub async fn save(&self, whisky_id: &Uuid, ratings: &[Rating]) -> Result<()> {
        let data = serde_json::to_vec(ratings)?;
        self.storage
            .write_file(&Self::document_path(whisky_id), &data)
            .await
    }

    pub async fn remove(&self, whisky_id: &Uuid) -> Result<bool> {
        self.storage
            .remove_file(&Self::document_path(whisky_id))
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::utils::error::CatalogError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    pub(crate) struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_writes: Arc<Mutex<bool>>,
    }

    impl MockStorage {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        pub(crate) async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        pub(crate) async fn get_text(&self, path: &str) -> Option<String> {
            self.get_file(path)
                .await
                .map(|data| String::from_utf8(data).unwrap())
        }

        pub(crate) async fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().await = fail;
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.files.lock().await.get(path).cloned())
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if *self.fail_writes.lock().await {
                return Err(CatalogError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("disk full writing {}", path),
                )));
            }
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn remove_file(&self, path: &str) -> Result<bool> {
            Ok(self.files.lock().await.remove(path).is_some())
        }
    }

    #[tokio::test]
    async fn test_missing_document_is_empty() {
        let store = RatingStore::new(MockStorage::new());
        assert!(store.load(&Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = MockStorage::new();
        let store = RatingStore::new(storage.clone());
        let id = Uuid::new_v4();
        let ratings = vec![Rating::new(5, "Smoky"), Rating::new(3, "Too sweet")];

        store.save(&id, &ratings).await.unwrap();

        let path = format!("ratings/{}.json", id);
        assert_eq!(
            storage.get_text(&path).await.unwrap(),
            r#"[{"Stars":5,"Message":"Smoky"},{"Stars":3,"Message":"Too sweet"}]"#
        );
        assert_eq!(store.load(&id).await.unwrap(), ratings);
    }

    #[tokio::test]
    async fn test_null_document_is_empty() {
        let storage = MockStorage::new();
        let id = Uuid::new_v4();
        storage.put(&RatingStore::<MockStorage>::document_path(&id), b"null").await;

        let store = RatingStore::new(storage);
        assert!(store.load(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_document_fails() {
        let storage = MockStorage::new();
        let id = Uuid::new_v4();
        storage
            .put(&RatingStore::<MockStorage>::document_path(&id), b"[{\"Stars\":")
            .await;

        let store = RatingStore::new(storage);
        let err = store.load(&id).await.unwrap_err();
        assert!(matches!(err, CatalogError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = MockStorage::new();
        let store = RatingStore::new(storage.clone());
        let id = Uuid::new_v4();

        store.save(&id, &[]).await.unwrap();
        assert!(store.remove(&id).await.unwrap());
        assert!(!store.remove(&id).await.unwrap());
        assert!(storage.get_file(&format!("ratings/{}.json", id)).await.is_none());
    }
}
