mod common;

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use halte::directory::{CACHE_FORMAT_VERSION, Clock, DirectoryBuilder, DirectoryCache};

#[derive(Clone)]
struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    fn at(value: &str) -> Self {
        Self {
            now: Arc::new(Mutex::new(value.parse().unwrap())),
        }
    }

    fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn valid_builder(name: &str) -> DirectoryBuilder {
    let zip_path = common::temp_path(name);
    common::write_stops_zip(&zip_path, common::STOPS_CSV);
    DirectoryBuilder::new(zip_path)
}

fn broken_builder(name: &str) -> DirectoryBuilder {
    DirectoryBuilder::new(common::temp_path(name))
}

fn stale_envelope(version: u32, built_at: &str) -> String {
    format!(
        r#"{{"format_version": {version}, "built_at": "{built_at}", "stops": [
            {{"id": "stale-only", "code": "00000001", "name": "Stale Stop",
              "normalized_name": "stale stop", "latitude": 0.0, "longitude": 0.0, "routes": []}}
        ]}}"#
    )
}

#[tokio::test]
async fn rebuild_persists_envelope_for_next_start() {
    let cache_file = common::temp_path("persist.json");
    let cache = DirectoryCache::new(valid_builder("persist.zip"), cache_file.clone());
    let directory = cache.ensure_fresh().await.unwrap();
    assert_eq!(directory.len(), 4);
    assert!(cache_file.exists());

    // A second process with an unreadable archive can still serve from disk.
    let restarted = DirectoryCache::new(broken_builder("persist-missing.zip"), cache_file);
    let directory = restarted.ensure_fresh().await.unwrap();
    assert_eq!(directory.len(), 4);
    assert!(directory.get("2503199").is_some());
}

#[tokio::test]
async fn version_mismatch_forces_full_rebuild() {
    let cache_file = common::temp_path("version.json");
    std::fs::write(
        &cache_file,
        stale_envelope(CACHE_FORMAT_VERSION - 1, "2025-12-01T00:00:00Z"),
    )
    .unwrap();

    let clock = ManualClock::at("2025-12-01T00:05:00Z");
    let cache = DirectoryCache::new(valid_builder("version.zip"), cache_file)
        .with_clock(Box::new(clock));
    let directory = cache.ensure_fresh().await.unwrap();
    // Rebuilt from the archive, not merged with the stale envelope.
    assert_eq!(directory.len(), 4);
    assert!(directory.get("stale-only").is_none());
}

#[tokio::test]
async fn fresh_envelope_is_served_without_rebuilding() {
    let cache_file = common::temp_path("fresh.json");
    std::fs::write(
        &cache_file,
        stale_envelope(CACHE_FORMAT_VERSION, "2025-12-01T00:00:00Z"),
    )
    .unwrap();

    let clock = ManualClock::at("2025-12-01T12:00:00Z");
    // The builder would fail, proving the envelope alone served the call.
    let cache = DirectoryCache::new(broken_builder("fresh-missing.zip"), cache_file)
        .with_clock(Box::new(clock));
    let directory = cache.ensure_fresh().await.unwrap();
    assert_eq!(directory.len(), 1);
    assert!(directory.get("stale-only").is_some());
}

#[tokio::test]
async fn expired_envelope_triggers_rebuild() {
    let cache_file = common::temp_path("expired.json");
    std::fs::write(
        &cache_file,
        stale_envelope(CACHE_FORMAT_VERSION, "2025-12-01T00:00:00Z"),
    )
    .unwrap();

    let clock = ManualClock::at("2025-12-03T00:00:00Z");
    let cache = DirectoryCache::new(valid_builder("expired.zip"), cache_file)
        .with_clock(Box::new(clock));
    let directory = cache.ensure_fresh().await.unwrap();
    assert_eq!(directory.len(), 4);
    assert!(directory.get("stale-only").is_none());
}

#[tokio::test]
async fn custom_ttl_shortens_the_expiry_window() {
    let cache_file = common::temp_path("ttl.json");
    std::fs::write(
        &cache_file,
        stale_envelope(CACHE_FORMAT_VERSION, "2025-12-01T00:00:00Z"),
    )
    .unwrap();

    // Two hours old: fresh under the default window, expired under one hour.
    let clock = ManualClock::at("2025-12-01T02:00:00Z");
    let cache = DirectoryCache::new(valid_builder("ttl.zip"), cache_file)
        .with_ttl(Duration::hours(1))
        .with_clock(Box::new(clock));
    let directory = cache.ensure_fresh().await.unwrap();
    assert_eq!(directory.len(), 4);
    assert!(directory.get("stale-only").is_none());
}

#[tokio::test]
async fn concurrent_callers_share_one_rebuild() {
    let cache_file = common::temp_path("singleflight.json");
    let cache = Arc::new(DirectoryCache::new(
        valid_builder("singleflight.zip"),
        cache_file,
    ));

    let a = cache.clone();
    let b = cache.clone();
    let (first, second) = tokio::join!(a.ensure_fresh(), b.ensure_fresh());
    let first = first.unwrap();
    let second = second.unwrap();
    // Both callers end up holding the same snapshot, not two parallel builds.
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn rebuild_failure_falls_back_to_previous_snapshot() {
    let zip_path = common::temp_path("fallback.zip");
    common::write_stops_zip(&zip_path, common::STOPS_CSV);
    let clock = ManualClock::at("2025-12-01T00:00:00Z");
    let cache = DirectoryCache::new(
        DirectoryBuilder::new(zip_path.clone()),
        common::temp_path("fallback.json"),
    )
    .with_clock(Box::new(clock.clone()));

    let first = cache.ensure_fresh().await.unwrap();
    assert_eq!(first.len(), 4);

    // The archive disappears and the snapshot expires; the old snapshot is
    // still better than nothing.
    std::fs::remove_file(&zip_path).unwrap();
    clock.advance(Duration::days(2));
    let second = cache.ensure_fresh().await.unwrap();
    assert_eq!(second.len(), 4);
}

#[tokio::test]
async fn rebuild_failure_without_fallback_propagates() {
    let cache = DirectoryCache::new(
        broken_builder("hard-fail.zip"),
        common::temp_path("hard-fail.json"),
    );
    assert!(cache.ensure_fresh().await.is_err());
}

#[tokio::test]
async fn persist_failure_is_not_fatal() {
    // The cache path's parent is a regular file, so the write-through fails.
    let blocker = common::temp_path("blocker");
    std::fs::write(&blocker, "file, not a directory").unwrap();
    let cache_file = blocker.join("cache.json");

    let cache = DirectoryCache::new(valid_builder("nopersist.zip"), cache_file);
    let directory = cache.ensure_fresh().await.unwrap();
    assert_eq!(directory.len(), 4);
}
