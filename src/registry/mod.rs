//! Clan registry - the in-memory snapshot, its refresh protocol, and the
//! query surface.
//!
//! The registry owns a read-optimized snapshot of the clan collection. It is
//! populated wholesale by [`ClanRegistry::load`], replaced wholesale by each
//! periodic refresh (the shadow list is built off to the side and installed
//! with a single assignment under the write lock), and mutated in place by
//! `add` and `delete`. Cloning a registry creates another handle to the same
//! snapshot.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use clan_registry::{ClanRegistry, RegistryConfig};
//!
//! let registry = Arc::new(ClanRegistry::new(store, RegistryConfig::default()));
//!
//! // Load the snapshot before serving; a failure here is fatal to startup.
//! registry.load().await?;
//!
//! // Serve the HTTP surface (requires the "http" feature)
//! clan_registry::serve(registry, "0.0.0.0:16098").await?;
//! ```

mod search;

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{info, warn};

use crate::clan::{ClanRecord, RawClanDocument};
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::store::ClanStore;

pub use search::SearchCriteria;

/// Field projection requested from the store on every bulk read.
const PROJECTION: [&str; 8] = [
    "clanId",
    "clanName",
    "clanLevel",
    "clanTrophy",
    "clanLogo",
    "clanType",
    "requiredTrophy",
    "members",
];

/// In-memory registry of clans, periodically rebuilt from a document store.
pub struct ClanRegistry<S> {
    store: Arc<S>,
    config: RegistryConfig,
    clans: Arc<RwLock<Vec<ClanRecord>>>,
    refresher: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<S> Clone for ClanRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            clans: Arc::clone(&self.clans),
            refresher: Arc::clone(&self.refresher),
        }
    }
}

impl<S: ClanStore> ClanRegistry<S> {
    /// Create a registry over the given store.
    ///
    /// The snapshot starts empty; call [`ClanRegistry::load`] before serving.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
            clans: Arc::new(RwLock::new(Vec::new())),
            refresher: Arc::new(Mutex::new(None)),
        }
    }

    /// The configuration this registry was built with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of records in the live snapshot.
    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.read_snapshot()?.len())
    }

    /// Whether the live snapshot is empty.
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.read_snapshot()?.is_empty())
    }

    /// Clone the live snapshot, in order.
    pub fn snapshot(&self) -> Result<Vec<ClanRecord>, RegistryError> {
        Ok(self.read_snapshot()?.clone())
    }

    /// Load the full collection from the store and arm the periodic
    /// refresher.
    ///
    /// A store failure here is fatal to startup: the snapshot stays as it
    /// was, the refresher is not armed, and the caller must not begin
    /// serving. Returns the number of records loaded.
    pub async fn load(&self) -> Result<usize, RegistryError> {
        let clans = self.fetch_all(None).await?;
        let count = clans.len();
        *self.write_snapshot()? = clans;
        info!(count, "clan snapshot loaded");
        self.start_refresher();
        Ok(count)
    }

    /// Rebuild the snapshot from the store and swap it in.
    ///
    /// The shadow list is built entirely outside the lock, throttled by the
    /// configured inter-batch pause. Readers see the old snapshot until the
    /// single assignment below; on failure the shadow is discarded and the
    /// live snapshot stays untouched.
    ///
    /// Mutations made through `add`/`delete` while a refresh is in flight
    /// are lost at swap time: the swap replaces whatever snapshot is live.
    pub async fn refresh(&self) -> Result<usize, RegistryError> {
        let pause = Duration::from_millis(self.config.batch_pause_ms);
        let shadow = self.fetch_all(Some(pause)).await?;
        let count = shadow.len();
        *self.write_snapshot()? = shadow;
        Ok(count)
    }

    /// Arm the periodic refresher, cancelling any previous ticker first.
    ///
    /// Each tick runs the refresh as a detached task, so a slow refresh
    /// never delays the schedule and [`ClanRegistry::stop_refresher`] never
    /// interrupts one in flight. Called by `load` once the initial snapshot
    /// is installed.
    pub fn start_refresher(&self) {
        let period = Duration::from_millis(self.config.refresh_interval_ms);
        let registry = self.clone();
        let ticker = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let registry = registry.clone();
                tokio::spawn(async move {
                    match registry.refresh().await {
                        Ok(count) => info!(count, "clan snapshot refreshed"),
                        Err(err) => warn!(
                            error = %err,
                            "scheduled refresh failed, keeping previous snapshot"
                        ),
                    }
                });
            }
        });

        if let Some(previous) = self.lock_refresher().replace(ticker) {
            previous.abort();
        }
    }

    /// Stop the periodic refresher.
    ///
    /// Only the ticker is cancelled; a refresh already in flight runs to
    /// completion.
    pub fn stop_refresher(&self) {
        if let Some(ticker) = self.lock_refresher().take() {
            ticker.abort();
        }
    }

    /// Append a clan to the snapshot tail.
    ///
    /// No uniqueness check: a record with an existing id becomes a
    /// duplicate.
    pub fn add(&self, clan: ClanRecord) -> Result<(), RegistryError> {
        self.write_snapshot()?.push(clan);
        Ok(())
    }

    /// Remove the first record with the given id.
    ///
    /// Returns `false` when no record matches; that is a normal negative
    /// result and the snapshot is left untouched.
    pub fn delete(&self, clan_id: &str) -> Result<bool, RegistryError> {
        let mut clans = self.write_snapshot()?;
        match clans.iter().position(|clan| clan.clan_id == clan_id) {
            Some(index) => {
                clans.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run a search against the live snapshot.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<ClanRecord>, RegistryError> {
        let clans = self.read_snapshot()?;
        search::run(&clans, criteria, self.config.sample_attempt_budget)
    }

    /// Fetch and transform the full collection, batch by batch.
    ///
    /// `pause` is the inter-batch throttle used by `refresh`; `load` passes
    /// `None` and fetches at full speed. Records survive the transform only
    /// with at least one member, and land in batch order.
    async fn fetch_all(&self, pause: Option<Duration>) -> Result<Vec<ClanRecord>, RegistryError> {
        let ids = self
            .store
            .list_document_ids(&self.config.collection, &self.config.parent_path)
            .await?;

        let batch_size = self.config.batch_size.max(1);
        let mut clans = Vec::with_capacity(ids.len());
        let mut batches = ids.chunks(batch_size).peekable();
        while let Some(batch) = batches.next() {
            let documents = self
                .store
                .bulk_read(
                    &self.config.collection,
                    &self.config.parent_path,
                    batch,
                    &PROJECTION,
                )
                .await?;
            clans.extend(documents.into_iter().filter_map(RawClanDocument::into_record));

            if let Some(pause) = pause {
                if batches.peek().is_some() {
                    time::sleep(pause).await;
                }
            }
        }
        Ok(clans)
    }

    fn read_snapshot(&self) -> Result<RwLockReadGuard<'_, Vec<ClanRecord>>, RegistryError> {
        self.clans
            .read()
            .map_err(|_| RegistryError::LockPoisoned("snapshot read"))
    }

    fn write_snapshot(&self) -> Result<RwLockWriteGuard<'_, Vec<ClanRecord>>, RegistryError> {
        self.clans
            .write()
            .map_err(|_| RegistryError::LockPoisoned("snapshot write"))
    }

    fn lock_refresher(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.refresher.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
