use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::Offer;
use crate::storage::{JsonStore, OFFERS_TO_ADD_FILE};

/// Persisted list of ADD ME offers awaiting republication.
///
/// Each call is a whole read-modify-write of the list and is serialized
/// against other calls on the same backlog.
#[async_trait]
pub trait Backlog: Send + Sync {
    async fn load(&self) -> Result<Vec<Offer>>;

    /// Remove the first entry whose `offer_link` equals `offer_link` exactly.
    /// Returns whether an entry was removed.
    async fn remove(&self, offer_link: &str) -> Result<bool>;

    async fn replace(&self, offers: Vec<Offer>) -> Result<()>;
}

fn remove_first(offers: &mut Vec<Offer>, offer_link: &str) -> bool {
    match offers.iter().position(|o| o.offer_link == offer_link) {
        Some(idx) => {
            offers.remove(idx);
            true
        }
        None => false,
    }
}

/// Backlog kept in `offers_to_add.json`.
pub struct JsonBacklog {
    store: JsonStore,
    file_name: String,
    lock: Mutex<()>,
}

impl JsonBacklog {
    pub fn new(store: JsonStore) -> Self {
        Self::with_file(store, OFFERS_TO_ADD_FILE)
    }

    pub fn with_file(store: JsonStore, file_name: impl Into<String>) -> Self {
        Self {
            store,
            file_name: file_name.into(),
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl Backlog for JsonBacklog {
    async fn load(&self) -> Result<Vec<Offer>> {
        let _guard = self.lock.lock().await;
        self.store.read_or_default(&self.file_name).await
    }

    async fn remove(&self, offer_link: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut offers: Vec<Offer> = self.store.read_or_default(&self.file_name).await?;

        if !remove_first(&mut offers, offer_link) {
            return Ok(false);
        }
        self.store.write(&self.file_name, &offers).await?;
        info!("Removed {} from backlog, {} left", offer_link, offers.len());
        Ok(true)
    }

    async fn replace(&self, offers: Vec<Offer>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store.write(&self.file_name, &offers).await
    }
}

/// In-memory backlog, for tests and dry runs.
#[derive(Default)]
pub struct MemoryBacklog {
    offers: Mutex<Vec<Offer>>,
}

impl MemoryBacklog {
    pub fn new(offers: Vec<Offer>) -> Self {
        Self {
            offers: Mutex::new(offers),
        }
    }
}

#[async_trait]
impl Backlog for MemoryBacklog {
    async fn load(&self) -> Result<Vec<Offer>> {
        Ok(self.offers.lock().await.clone())
    }

    async fn remove(&self, offer_link: &str) -> Result<bool> {
        Ok(remove_first(&mut *self.offers.lock().await, offer_link))
    }

    async fn replace(&self, offers: Vec<Offer>) -> Result<()> {
        *self.offers.lock().await = offers;
        Ok(())
    }
}
