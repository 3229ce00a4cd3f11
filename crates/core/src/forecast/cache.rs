use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use crate::domain::forecast::ForecastPayload;

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub payload: Arc<ForecastPayload>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheOutcome {
    /// A fresh entry was already in the slot.
    Hit,
    /// Another caller refreshed the slot while this one waited on the gate.
    Coalesced,
    /// This caller recomputed the payload and replaced the slot.
    Refreshed,
}

/// Single-slot, time-bounded memo for the forecast payload.
///
/// The payload is swapped in as a whole `Arc`, so readers only ever observe a
/// complete previous or complete new payload. Refreshes are serialized behind a
/// gate; callers that miss while a refresh is running wait for it and reuse its
/// result.
#[derive(Debug)]
pub struct ForecastCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
    refresh_gate: Mutex<()>,
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: RwLock::new(None), refresh_gate: Mutex::new(()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached payload when its age at `now` is below the TTL.
    pub async fn fresh(&self, now: DateTime<Utc>) -> Option<Arc<ForecastPayload>> {
        let slot = self.slot.read().await;
        slot.as_ref().filter(|entry| self.is_fresh(entry, now)).map(|entry| entry.payload.clone())
    }

    pub async fn entry(&self) -> Option<CacheEntry> {
        self.slot.read().await.clone()
    }

    /// Replaces the slot, stamping the entry with the payload's generation time.
    pub async fn store(&self, payload: ForecastPayload) -> Arc<ForecastPayload> {
        let entry = CacheEntry { timestamp: payload.generated_at, payload: Arc::new(payload) };
        let stored = entry.payload.clone();
        *self.slot.write().await = Some(entry);
        stored
    }

    /// Serves a fresh entry or runs `refresh` once and stores its result.
    ///
    /// Errors from `refresh` are returned without touching the slot.
    pub async fn get_or_refresh<F, Fut, E>(
        &self,
        now: impl Fn() -> DateTime<Utc>,
        refresh: F,
    ) -> Result<(Arc<ForecastPayload>, CacheOutcome), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ForecastPayload, E>>,
    {
        if let Some(payload) = self.fresh(now()).await {
            return Ok((payload, CacheOutcome::Hit));
        }

        let _gate = self.refresh_gate.lock().await;
        if let Some(payload) = self.fresh(now()).await {
            return Ok((payload, CacheOutcome::Coalesced));
        }

        let payload = refresh().await?;
        Ok((self.store(payload).await, CacheOutcome::Refreshed))
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match (now - entry.timestamp).to_std() {
            Ok(age) => age < self.ttl,
            // Entry stamped ahead of `now`; the clock stepped backwards.
            Err(_) => true,
        }
    }
}
