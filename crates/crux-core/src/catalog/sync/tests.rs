use super::*;
use crate::catalog::types::ModelDescriptor;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

#[derive(Clone, Copy, Debug)]
enum Remote {
    Fresh,
    Timeout,
    NotModified,
    Transport,
    Empty,
}

struct StubClient {
    remote: Remote,
    calls: AtomicUsize,
    seen_validator: parking_lot::Mutex<Option<String>>,
    delay: Duration,
}

impl StubClient {
    fn new(remote: Remote) -> Arc<Self> {
        Arc::new(Self {
            remote,
            calls: AtomicUsize::new(0),
            seen_validator: parking_lot::Mutex::new(None),
            delay: Duration::ZERO,
        })
    }

    fn slow(remote: Remote, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            remote,
            calls: AtomicUsize::new(0),
            seen_validator: parking_lot::Mutex::new(None),
            delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogClient<Vec<ProviderDescriptor>> for StubClient {
    async fn fetch(&self, validator: &str) -> Result<Vec<ProviderDescriptor>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_validator.lock() = Some(validator.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.remote {
            Remote::Fresh => Ok(vec![descriptor("fresh")]),
            Remote::Timeout => Err(FetchError::DeadlineExceeded),
            Remote::NotModified => Err(FetchError::NotModified),
            Remote::Transport => Err(FetchError::Transport("connection refused".into())),
            Remote::Empty => Ok(Vec::new()),
        }
    }
}

fn descriptor(id: &str) -> ProviderDescriptor {
    ProviderDescriptor {
        id: id.to_string(),
        name: id.to_string(),
        models: vec![ModelDescriptor::named("m", "M")],
        ..Default::default()
    }
}

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

fn ids(providers: &[ProviderDescriptor]) -> Vec<String> {
    providers.iter().map(|p| p.id.clone()).collect()
}

fn embedded_ids() -> Vec<String> {
    ids(&embedded_providers())
}

#[tokio::test]
async fn test_repeated_get_fetches_once() {
    let dir = tempdir().unwrap();
    let client = StubClient::new(Remote::Fresh);
    let sync = CatalogSync::providers();
    assert!(!sync.is_initialized());
    sync.init(client.clone(), dir.path().join("providers.json"), true);
    assert!(sync.is_initialized());

    let first = sync.get(deadline()).await;
    let second = sync.get(deadline()).await;
    let third = sync.get(deadline()).await;

    assert_eq!(client.calls(), 1);
    assert_eq!(first.value, second.value);
    assert_eq!(second.value, third.value);
    assert_eq!(ids(&first.value), vec!["fresh"]);
}

#[tokio::test]
async fn test_concurrent_get_fetches_once() {
    let dir = tempdir().unwrap();
    let client = StubClient::slow(Remote::Fresh, Duration::from_millis(50));
    let sync = CatalogSync::providers();
    sync.init(client.clone(), dir.path().join("providers.json"), true);

    let outcomes = futures::future::join_all((0..8).map(|_| sync.get(deadline()))).await;

    assert_eq!(client.calls(), 1);
    for outcome in &outcomes {
        assert_eq!(outcome.value, outcomes[0].value);
        assert!(outcome.error.is_none());
    }
}

#[tokio::test]
#[should_panic(expected = "used before init")]
async fn test_get_before_init_panics() {
    let sync = CatalogSync::providers();
    let _ = sync.get(deadline()).await;
}

#[tokio::test]
async fn test_auto_update_disabled_skips_io() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("providers.json");
    DiskCache::new(&cache_path)
        .store(&vec![descriptor("cached")])
        .unwrap();

    let client = StubClient::new(Remote::Fresh);
    let sync = CatalogSync::providers();
    sync.init(client.clone(), &cache_path, false);

    let outcome = sync.get(deadline()).await;
    assert_eq!(client.calls(), 0);
    assert_eq!(ids(&outcome.value), embedded_ids());
    assert!(outcome.error.is_none());
}

/// fresh remote > cached > embedded; error only for an empty remote answer
#[tokio::test]
async fn test_fallback_precedence() {
    let remotes = [
        Remote::Fresh,
        Remote::Timeout,
        Remote::NotModified,
        Remote::Transport,
        Remote::Empty,
    ];

    for cache_present in [true, false] {
        for remote in remotes {
            let dir = tempdir().unwrap();
            let cache_path = dir.path().join("providers.json");
            if cache_present {
                DiskCache::new(&cache_path)
                    .store(&vec![descriptor("cached")])
                    .unwrap();
            }

            let sync = CatalogSync::providers();
            sync.init(StubClient::new(remote), &cache_path, true);
            let outcome = sync.get(deadline()).await;

            let expected = match (remote, cache_present) {
                (Remote::Fresh, _) => vec!["fresh".to_string()],
                (_, true) => vec!["cached".to_string()],
                (_, false) => embedded_ids(),
            };
            assert_eq!(
                ids(&outcome.value),
                expected,
                "remote {remote:?}, cache present {cache_present}"
            );
            assert_eq!(
                outcome.error.is_some(),
                matches!(remote, Remote::Empty),
                "remote {remote:?}, cache present {cache_present}"
            );
        }
    }
}

#[tokio::test]
async fn test_fresh_result_is_cached() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("nested/providers.json");
    let sync = CatalogSync::providers();
    sync.init(StubClient::new(Remote::Fresh), &cache_path, true);

    sync.get(deadline()).await;

    let (stored, validator): (Vec<ProviderDescriptor>, String) =
        DiskCache::new(&cache_path).get().unwrap();
    assert_eq!(ids(&stored), vec!["fresh"]);
    assert!(!validator.is_empty());
}

#[tokio::test]
async fn test_validator_sent_from_cache() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("providers.json");
    let cache = DiskCache::new(&cache_path);
    cache.store(&vec![descriptor("cached")]).unwrap();
    let (_, expected): (Vec<ProviderDescriptor>, String) = cache.get().unwrap();

    let client = StubClient::new(Remote::NotModified);
    let sync = CatalogSync::providers();
    sync.init(client.clone(), &cache_path, true);
    sync.get(deadline()).await;

    assert_eq!(client.seen_validator.lock().as_deref(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_corrupt_cache_falls_back_to_embedded() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("providers.json");
    std::fs::write(&cache_path, "{ broken").unwrap();

    let client = StubClient::new(Remote::Transport);
    let sync = CatalogSync::providers();
    sync.init(client.clone(), &cache_path, true);
    let outcome = sync.get(deadline()).await;

    assert_eq!(ids(&outcome.value), embedded_ids());
    assert!(outcome.error.is_none());
    assert_eq!(client.seen_validator.lock().as_deref(), Some(""));
}

#[tokio::test]
async fn test_store_failure_reported_with_fresh_value() {
    let dir = tempdir().unwrap();
    // A directory where the cache file should be makes the write fail
    let cache_path = dir.path().join("providers.json");
    std::fs::create_dir_all(&cache_path).unwrap();

    let sync = CatalogSync::providers();
    sync.init(StubClient::new(Remote::Fresh), &cache_path, true);
    let outcome = sync.get(deadline()).await;

    assert_eq!(ids(&outcome.value), vec!["fresh"]);
    assert!(matches!(outcome.error, Some(CruxError::Cache { .. })));
}

#[tokio::test]
async fn test_deadline_applies_to_slow_remote() {
    let dir = tempdir().unwrap();
    let client = StubClient::slow(Remote::Fresh, Duration::from_secs(10));
    let sync = CatalogSync::providers();
    sync.init(client, dir.path().join("providers.json"), true);

    let outcome = sync
        .get(Instant::now() + Duration::from_millis(20))
        .await;

    assert_eq!(ids(&outcome.value), embedded_ids());
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn test_cancelled_first_fetch_keeps_cached_copy() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("providers.json");
    DiskCache::new(&cache_path)
        .store(&vec![descriptor("cached")])
        .unwrap();
    let client = StubClient::slow(Remote::Fresh, Duration::from_secs(10));
    let sync = CatalogSync::providers();
    sync.init(client.clone(), &cache_path, true);

    let cancelled = tokio::time::timeout(Duration::from_millis(50), sync.get(deadline())).await;
    assert!(cancelled.is_err());

    let outcome = sync.get(deadline()).await;
    assert_eq!(ids(&outcome.value), vec!["cached"]);
    assert!(outcome.error.is_none());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_empty_error_is_memoized() {
    let dir = tempdir().unwrap();
    let client = StubClient::new(Remote::Empty);
    let sync = CatalogSync::providers();
    sync.init(client.clone(), dir.path().join("providers.json"), true);

    let first = sync.get(deadline()).await;
    let second = sync.get(deadline()).await;

    assert_eq!(client.calls(), 1);
    assert!(first.error.is_some());
    assert!(second.error.is_some());
}

#[tokio::test]
async fn test_init_after_fetch_is_ignored() {
    let dir = tempdir().unwrap();
    let first_client = StubClient::new(Remote::Fresh);
    let sync = CatalogSync::providers();
    sync.init(first_client.clone(), dir.path().join("a.json"), true);
    sync.get(deadline()).await;

    let second_client = StubClient::new(Remote::Fresh);
    sync.init(second_client.clone(), dir.path().join("b.json"), true);
    sync.get(deadline()).await;

    assert_eq!(first_client.calls(), 1);
    assert_eq!(second_client.calls(), 0);
}
