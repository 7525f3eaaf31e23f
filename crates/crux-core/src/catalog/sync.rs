//! Fetch-once catalog synchronizer
//!
//! A [`CatalogSync`] fetches its catalog at most once per instance. The
//! first caller runs the fetch; concurrent callers wait on a completion
//! signal and every later caller receives a clone of the memoized outcome.
//!
//! Fallback order is fresh remote, then disk cache, then the embedded
//! baseline. Only an empty-but-successful remote answer is reported as an
//! error, and even then the returned value is usable.

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};

use super::client::{CatalogClient, FetchError};
use super::disk_cache::DiskCache;
use super::embedded::{embedded_premium_provider, embedded_providers};
use super::types::{CatalogPayload, ProviderDescriptor};
use crate::error::CruxError;

/// Result of the single fetch: always a usable value, maybe an error next to it
#[derive(Debug, Clone)]
pub struct SyncOutcome<T> {
    pub value: T,
    pub error: Option<CruxError>,
}

impl<T> SyncOutcome<T> {
    fn ok(value: T) -> Self {
        Self { value, error: None }
    }
}

struct SyncSettings<T> {
    client: Arc<dyn CatalogClient<T>>,
    cache: DiskCache<T>,
    auto_update: bool,
}

enum SyncPhase<T> {
    Uninitialized,
    Configured(SyncSettings<T>),
    Fetching,
    Done(SyncOutcome<T>),
}

/// Memoizing synchronizer for one catalog
pub struct CatalogSync<T> {
    name: &'static str,
    baseline: fn() -> T,
    phase: Mutex<SyncPhase<T>>,
    done: watch::Sender<bool>,
}

impl CatalogSync<Vec<ProviderDescriptor>> {
    /// Synchronizer for the multi-provider catalog
    pub fn providers() -> Self {
        Self::new("providers", embedded_providers)
    }
}

impl CatalogSync<ProviderDescriptor> {
    /// Synchronizer for the hosted provider entry
    pub fn premium() -> Self {
        Self::new("premium", embedded_premium_provider)
    }
}

impl<T: CatalogPayload> CatalogSync<T> {
    pub fn new(name: &'static str, baseline: fn() -> T) -> Self {
        let (done, _) = watch::channel(false);
        Self {
            name,
            baseline,
            phase: Mutex::new(SyncPhase::Uninitialized),
            done,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Configure the client and cache location.
    ///
    /// Has no effect once a fetch has started.
    pub fn init(
        &self,
        client: Arc<dyn CatalogClient<T>>,
        cache_path: impl Into<PathBuf>,
        auto_update: bool,
    ) {
        let mut phase = self.phase.lock();
        match *phase {
            SyncPhase::Uninitialized | SyncPhase::Configured(_) => {
                *phase = SyncPhase::Configured(SyncSettings {
                    client,
                    cache: DiskCache::new(cache_path),
                    auto_update,
                });
            }
            SyncPhase::Fetching | SyncPhase::Done(_) => {
                warn!("Catalog sync `{}` already started, ignoring init", self.name);
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(*self.phase.lock(), SyncPhase::Uninitialized)
    }

    /// Get the catalog, fetching it on the first call.
    ///
    /// # Panics
    ///
    /// Panics when called before [`CatalogSync::init`].
    pub async fn get(&self, deadline: Instant) -> SyncOutcome<T> {
        let settings = {
            let mut phase = self.phase.lock();
            if let SyncPhase::Done(outcome) = &*phase {
                return outcome.clone();
            }
            match std::mem::replace(&mut *phase, SyncPhase::Fetching) {
                SyncPhase::Uninitialized => {
                    *phase = SyncPhase::Uninitialized;
                    drop(phase);
                    panic!("catalog sync `{}` used before init", self.name)
                }
                SyncPhase::Configured(settings) => Some(settings),
                SyncPhase::Fetching | SyncPhase::Done(_) => None,
            }
        };

        match settings {
            Some(settings) => {
                let mut guard = CompletionGuard {
                    sync: self,
                    fallback: None,
                };
                let outcome = self.fetch(settings, deadline, &mut guard).await;
                guard.complete(outcome.clone());
                outcome
            }
            None => self.wait_for_fetch().await,
        }
    }

    async fn wait_for_fetch(&self) -> SyncOutcome<T> {
        let mut rx = self.done.subscribe();
        // Err only if the sender is gone, which cannot happen while &self lives
        let _ = rx.wait_for(|done| *done).await;

        match &*self.phase.lock() {
            SyncPhase::Done(outcome) => outcome.clone(),
            _ => SyncOutcome::ok((self.baseline)()),
        }
    }

    async fn fetch(
        &self,
        settings: SyncSettings<T>,
        deadline: Instant,
        guard: &mut CompletionGuard<'_, T>,
    ) -> SyncOutcome<T> {
        if !settings.auto_update {
            debug!("Auto-update disabled, using embedded {} catalog", self.name);
            return SyncOutcome::ok((self.baseline)());
        }

        let (cached, validator) = match settings.cache.get() {
            Ok((value, validator)) if !value.is_empty_catalog() => (value, validator),
            Ok(_) => {
                debug!("Cached {} catalog is empty, using embedded", self.name);
                ((self.baseline)(), String::new())
            }
            Err(e) => {
                debug!("No usable cached {} catalog: {}", self.name, e);
                ((self.baseline)(), String::new())
            }
        };

        guard.fallback = Some(cached.clone());

        let result = timeout_at(deadline, settings.client.fetch(&validator))
            .await
            .unwrap_or(Err(FetchError::DeadlineExceeded));

        match result {
            Err(FetchError::NotModified) => {
                debug!("{} catalog not modified", self.name);
                SyncOutcome::ok(cached)
            }
            Err(FetchError::DeadlineExceeded) => {
                warn!("Timed out fetching {} catalog, using cached copy", self.name);
                SyncOutcome::ok(cached)
            }
            Err(FetchError::Transport(message)) => {
                warn!("Failed to fetch {} catalog: {}", self.name, message);
                SyncOutcome::ok(cached)
            }
            Ok(fresh) if fresh.is_empty_catalog() => SyncOutcome {
                value: cached,
                error: Some(CruxError::catalog("empty catalog from remote", self.name)),
            },
            Ok(fresh) => {
                let error = settings.cache.store(&fresh).err();
                if let Some(e) = &error {
                    warn!("Failed to store {} catalog cache: {}", self.name, e);
                }
                SyncOutcome { value: fresh, error }
            }
        }
    }
}

/// Marks the sync done even when the fetching future is dropped mid-flight.
///
/// An abandoned fetch settles on `fallback` (the cached copy once it has
/// been read) the same way an expired deadline does.
struct CompletionGuard<'a, T: CatalogPayload> {
    sync: &'a CatalogSync<T>,
    fallback: Option<T>,
}

impl<T: CatalogPayload> CompletionGuard<'_, T> {
    fn complete(self, outcome: SyncOutcome<T>) {
        *self.sync.phase.lock() = SyncPhase::Done(outcome);
        // Drop publishes the completion signal
    }
}

impl<T: CatalogPayload> Drop for CompletionGuard<'_, T> {
    fn drop(&mut self) {
        let mut phase = self.sync.phase.lock();
        if matches!(*phase, SyncPhase::Fetching) {
            warn!(
                "Fetch of {} catalog was cancelled, using cached copy",
                self.sync.name
            );
            let value = self
                .fallback
                .take()
                .unwrap_or_else(|| (self.sync.baseline)());
            *phase = SyncPhase::Done(SyncOutcome::ok(value));
        }
        drop(phase);
        self.sync.done.send_replace(true);
    }
}

#[cfg(test)]
mod tests;
