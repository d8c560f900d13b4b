use crate::adapters::storage::LocalStorage;
use crate::core::rating_store::RatingStore;
use crate::core::{Rating, Storage, Whisky};
use crate::utils::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Passing this as both page number and page size returns the whole catalog.
pub const ALL_PAGES: i32 = -1;
pub const DEFAULT_PAGE_SIZE: i32 = 100;

const CSV_HEADER: [&str; 3] = ["Id", "Name", "RegionStyle"];

pub type SharedRepository<S> = Arc<RwLock<WhiskyRepository<S>>>;

#[derive(Debug, Deserialize)]
struct WhiskyRow {
    // Older catalogs carry no id column; those rows get an id on load.
    #[serde(rename = "Id", default, deserialize_with = "csv::invalid_option")]
    id: Option<Uuid>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "RegionStyle", default)]
    region_style: String,
}

#[derive(Debug, Serialize)]
struct WhiskyRecord<'a> {
    id: &'a Uuid,
    name: &'a str,
    region_style: &'a str,
}

/// In-memory catalog backed by a CSV file and per-whisky rating documents.
///
/// Reads borrow `&self` and mutations borrow `&mut self`, so a single owner is
/// the only writer. Every mutation rewrites the CSV and all rating documents;
/// if that write fails the in-memory change is kept and the error returned.
pub struct WhiskyRepository<S: Storage> {
    whiskies: Vec<Whisky>,
    csv_file: String,
    ratings: RatingStore<S>,
}

impl WhiskyRepository<LocalStorage> {
    /// Opens the catalog at `csv_path`; rating documents live in `ratings/` next to it.
    pub async fn open(csv_path: impl AsRef<Path>) -> Result<Self> {
        let csv_path = csv_path.as_ref();
        let base_path = csv_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = csv_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CatalogError::InvalidConfigValueError {
                field: "catalog.csv_path".to_string(),
                value: csv_path.display().to_string(),
                reason: "Path does not name a file".to_string(),
            })?;

        match Self::load(LocalStorage::new(base_path), file_name).await {
            Err(CatalogError::FileNotFound { .. }) => Err(CatalogError::FileNotFound {
                path: csv_path.display().to_string(),
            }),
            other => other,
        }
    }
}

impl<S: Storage> WhiskyRepository<S> {
    pub async fn load(storage: S, csv_file: impl Into<String>) -> Result<Self> {
        let mut repository = Self {
            whiskies: Vec::new(),
            csv_file: csv_file.into(),
            ratings: RatingStore::new(storage),
        };
        repository.reload().await?;
        Ok(repository)
    }

    /// Discards the in-memory catalog and reads it again from storage.
    pub async fn reload(&mut self) -> Result<()> {
        let data = self
            .ratings
            .storage()
            .read_file(&self.csv_file)
            .await?
            .ok_or_else(|| CatalogError::FileNotFound {
                path: self.csv_file.clone(),
            })?;

        let (mut whiskies, assigned_ids) = parse_catalog(&data)?;
        for whisky in whiskies.iter_mut() {
            whisky.ratings = self.ratings.load(&whisky.id).await?;
        }

        tracing::info!("Loaded {} whiskies from {}", whiskies.len(), self.csv_file);
        self.whiskies = whiskies;

        // Generated ids must reach disk now, or the next load hands out different ones.
        if assigned_ids > 0 {
            tracing::info!("Assigned ids to {} whiskies, saving catalog", assigned_ids);
            self.persist().await?;
        }
        Ok(())
    }

    pub fn csv_file(&self) -> &str {
        &self.csv_file
    }

    pub fn len(&self) -> usize {
        self.whiskies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.whiskies.is_empty()
    }

    pub fn into_shared(self) -> SharedRepository<S> {
        Arc::new(RwLock::new(self))
    }

    /// Returns the window `[page_number * page_size, page_number * page_size + page_size)`.
    pub fn get_all(&self, page_number: i32, page_size: i32) -> &[Whisky] {
        if page_number == ALL_PAGES && page_size == ALL_PAGES {
            return &self.whiskies;
        }
        if page_size <= 0 {
            return &[];
        }

        let len = self.whiskies.len();
        let start = (i64::from(page_number) * i64::from(page_size)).max(0);
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(page_size as usize).min(len);

        &self.whiskies[start..end]
    }

    pub fn get_by_id(&self, id: &Uuid) -> Option<&Whisky> {
        self.whiskies.iter().find(|w| &w.id == id)
    }

    /// Stores a copy of `whisky` under a fresh id with no ratings.
    ///
    /// Name and region are trimmed, matching what the CSV holds.
    pub async fn add(&mut self, whisky: Whisky) -> Result<Whisky> {
        let mut id = Uuid::new_v4();
        while self.get_by_id(&id).is_some() {
            id = Uuid::new_v4();
        }

        let stored = Whisky {
            id,
            name: whisky.name.trim().to_string(),
            region_style: whisky.region_style.trim().to_string(),
            ratings: Vec::new(),
        };
        if self.whiskies.iter().any(|w| w.name == stored.name) {
            tracing::warn!(
                "Whisky named {} already exists; the new entry is dropped on the next load",
                stored.name
            );
        }
        self.whiskies.push(stored.clone());
        self.persist().await?;

        tracing::info!("Added whisky {} ({})", stored.name, stored.id);
        Ok(stored)
    }

    pub async fn delete(&mut self, id: &Uuid) -> Result<()> {
        let before = self.whiskies.len();
        self.whiskies.retain(|w| &w.id != id);
        if self.whiskies.len() == before {
            return Err(CatalogError::not_found(id.to_string()));
        }

        self.persist().await?;
        if self.ratings.remove(id).await? {
            tracing::debug!("Removed rating document for {}", id);
        }

        tracing::info!("Deleted whisky {}", id);
        Ok(())
    }

    /// Changes the region of the whisky with the same *name*; the id on `whisky` is not consulted.
    pub async fn update(&mut self, whisky: &Whisky) -> Result<()> {
        let name = whisky.name.trim();
        let region_style = whisky.region_style.trim();

        let existing = self
            .whiskies
            .iter_mut()
            .find(|w| w.name == name)
            .ok_or_else(|| CatalogError::not_found(name))?;

        existing.region_style = region_style.to_string();
        self.persist().await?;

        tracing::info!("Updated region of {} to {}", name, region_style);
        Ok(())
    }

    /// Appends a rating to the whisky whose name equals `message`.
    ///
    /// `id` is only used in the not-found error. Returns a snapshot of the
    /// rated whisky together with the new rating.
    pub async fn add_rating(
        &mut self,
        id: &Uuid,
        stars: i16,
        message: &str,
    ) -> Result<(Whisky, Rating)> {
        let whisky = self
            .whiskies
            .iter_mut()
            .find(|w| w.name == message)
            .ok_or_else(|| CatalogError::not_found(id.to_string()))?;

        let rating = Rating::new(stars, message);
        whisky.ratings.push(rating.clone());
        let snapshot = whisky.clone();

        self.persist().await?;

        tracing::info!(
            "Added {} star rating to {} ({} ratings)",
            stars,
            snapshot.name,
            snapshot.ratings.len()
        );
        Ok((snapshot, rating))
    }

    /// Rewrites the CSV file and every rating document from memory.
    async fn persist(&self) -> Result<()> {
        let data = render_catalog(&self.whiskies)?;
        self.ratings
            .storage()
            .write_file(&self.csv_file, &data)
            .await?;

        for whisky in &self.whiskies {
            self.ratings.save(&whisky.id, &whisky.ratings).await?;
        }

        tracing::debug!(
            "Persisted {} whiskies to {}",
            self.whiskies.len(),
            self.csv_file
        );
        Ok(())
    }
}

/// Parsed whiskies plus how many of them needed a generated id.
fn parse_catalog(data: &[u8]) -> Result<(Vec<Whisky>, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut seen = HashSet::new();
    let mut whiskies = Vec::new();
    let mut assigned_ids = 0;

    for row in reader.deserialize::<WhiskyRow>() {
        let row = row?;
        if !seen.insert(row.name.clone()) {
            tracing::debug!("Skipping duplicate whisky name: {}", row.name);
            continue;
        }

        let id = row.id.unwrap_or_else(|| {
            assigned_ids += 1;
            Uuid::new_v4()
        });

        whiskies.push(Whisky {
            id,
            name: row.name,
            region_style: row.region_style,
            ratings: Vec::new(),
        });
    }

    Ok((whiskies, assigned_ids))
}

fn render_catalog(whiskies: &[Whisky]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for whisky in whiskies {
        writer.serialize(WhiskyRecord {
            id: &whisky.id,
            name: &whisky.name,
            region_style: &whisky.region_style,
        })?;
    }

    writer
        .into_inner()
        .map_err(|e| CatalogError::Io(e.into_error()))
}
