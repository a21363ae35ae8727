//! Read-Through Cache - Time-boxed Memoization of Lookups
//!
//! Replaces method decoration with explicit calls: the caller renders a
//! key from a fixed template, picks a TTL, and hands over the fetch.
//! Values of any `Clone + Send + Sync` type share one map; a lookup
//! with the wrong type is treated as a miss.
//!
//! Failed fetches are never cached.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Cache entry with its expiry deadline.
#[derive(Clone)]
struct CachedValue {
  value: Arc<dyn Any + Send + Sync>,
  expires_at: Instant,
}

impl CachedValue {
  fn is_stale(&self, now: Instant) -> bool {
    now >= self.expires_at
  }
}

/// Shared TTL cache keyed by rendered template strings.
#[derive(Default)]
pub struct ReadThroughCache {
  entries: RwLock<HashMap<String, CachedValue>>,
}

impl ReadThroughCache {
  /// Create an empty cache.
  pub fn new() -> Self {
    Self::default()
  }

  /// Return the cached value for `key`, or run `fetch` and cache its
  /// success for `ttl`.
  pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T, E>
  where
    T: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if let Some(hit) = self.get::<T>(key).await {
      debug!(key, "Cache hit");
      return Ok(hit);
    }

    debug!(key, "Cache miss");
    let value = fetch().await?;
    self.insert(key, value.clone(), ttl).await;
    Ok(value)
  }

  /// Fresh cached value for `key`, if any.
  pub async fn get<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Option<T> {
    let cache = self.entries.read().await;
    let entry = cache.get(key)?;
    if entry.is_stale(Instant::now()) {
      return None;
    }
    entry.value.downcast_ref::<T>().cloned()
  }

  /// Store `value` under `key` for `ttl`.
  pub async fn insert<T: Send + Sync + 'static>(&self, key: &str, value: T, ttl: Duration) {
    let mut cache = self.entries.write().await;
    cache.insert(
      key.to_string(),
      CachedValue {
        value: Arc::new(value),
        expires_at: Instant::now() + ttl,
      },
    );
  }

  /// Drop everything (e.g. after a network switch).
  pub async fn clear(&self) {
    self.entries.write().await.clear();
  }
}

/// Fill `{name}` placeholders in a key template.
///
/// `render_key("filled:{network_id}:{hash}", &[("network_id", "1"), ("hash", "0xab")])`
/// yields `"filled:1:0xab"`. Unknown placeholders are left as-is.
pub fn render_key(template: &str, args: &[(&str, &str)]) -> String {
  args.iter().fold(template.to_string(), |key, (name, value)| {
    key.replace(&format!("{{{name}}}"), value)
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[test]
  fn test_render_key() {
    let key = render_key(
      "filled_taker_amount:{network_id}:{order_hash}",
      &[("network_id", "42"), ("order_hash", "0xabc")],
    );
    assert_eq!(key, "filled_taker_amount:42:0xabc");
  }

  #[test]
  fn test_render_key_leaves_unknown_placeholders() {
    assert_eq!(render_key("a:{x}:{y}", &[("x", "1")]), "a:1:{y}");
  }

  #[tokio::test]
  async fn test_second_lookup_is_served_from_cache() {
    let cache = ReadThroughCache::new();
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
      let v: Result<u64, anyhow::Error> = cache
        .get_or_fetch("k", Duration::from_secs(60), || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok(7)
        })
        .await;
      assert_eq!(v.unwrap(), 7);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn test_entry_expires_after_ttl() {
    let cache = ReadThroughCache::new();
    cache.insert("k", 1u8, Duration::from_secs(60)).await;
    assert_eq!(cache.get::<u8>("k").await, Some(1));

    tokio::time::advance(Duration::from_secs(61)).await;

    assert_eq!(cache.get::<u8>("k").await, None);
  }

  #[tokio::test]
  async fn test_errors_are_not_cached() {
    let cache = ReadThroughCache::new();

    let first: Result<u8, &str> = cache
      .get_or_fetch("k", Duration::from_secs(60), || async { Err("boom") })
      .await;
    assert!(first.is_err());

    let second: Result<u8, &str> = cache
      .get_or_fetch("k", Duration::from_secs(60), || async { Ok(3) })
      .await;
    assert_eq!(second, Ok(3));
  }

  #[tokio::test]
  async fn test_type_mismatch_is_a_miss() {
    let cache = ReadThroughCache::new();
    cache.insert("k", 5u32, Duration::from_secs(60)).await;
    assert_eq!(cache.get::<String>("k").await, None);
  }

  #[tokio::test]
  async fn test_clear_drops_every_entry() {
    let cache = ReadThroughCache::new();
    cache.insert("a", 1u8, Duration::from_secs(60)).await;
    cache.insert("b", 2u8, Duration::from_secs(60)).await;

    cache.clear().await;
    assert_eq!(cache.get::<u8>("a").await, None);
    assert!(cache.entries.read().await.is_empty());
  }
}
