//! Result cache for encode and decode output.
//!
//! A [`ResultCache`] wraps one injected [`CacheStore`] and splits it into two
//! logical namespaces. Logical keys are hashed with SHA-256, so the store
//! only ever sees fixed-length `"<namespace>/<hex digest>"` keys.
//!
//! Store failures never fail a request: reads degrade to a miss and writes
//! are dropped, both with a `warn!`.
//!
//! Concurrent callers asking for the same missing key share one computation:
//! the first caller computes while the others block until its result is
//! published.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};

use crate::error::{CacheError, PlaceholderError};

/// A byte-oriented key-value store supplied by the host.
pub trait CacheStore: Send + Sync {
    /// Fetch a value, `Ok(None)` on a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Insert or overwrite a value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        (**self).remove(key)
    }
}

/// In-process [`CacheStore`] backed by a `HashMap`. No eviction.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of the stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Logical partition of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Hashes keyed by image identity and aspect ratio.
    Encode,
    /// PNG rasters keyed by hash and target size.
    Decode,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Encode => "encode",
            Namespace::Decode => "decode",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the store key for a logical key.
///
/// ```
/// use blurhash_placeholder::cache::{store_key, Namespace};
/// let key = store_key(Namespace::Decode, "LEHV6nWB2yk8pyo0adR*.7kCMdnj|13|8");
/// assert!(key.starts_with("decode/"));
/// assert_eq!(key.len(), "decode/".len() + 64);
/// ```
pub fn store_key(namespace: Namespace, logical_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(logical_key.as_bytes());
    format!("{}/{:x}", namespace, hasher.finalize())
}

type SharedResult = Result<Vec<u8>, PlaceholderError>;

#[derive(Clone)]
enum Outcome {
    Done(SharedResult),
    /// The computing caller unwound before publishing a result.
    Abandoned,
}

struct InFlight {
    slot: Mutex<Option<Outcome>>,
    cv: Condvar,
}

impl InFlight {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            cv: Condvar::new(),
        }
    }

    fn publish(&self, outcome: Outcome) {
        *self.slot.lock() = Some(outcome);
        self.cv.notify_all();
    }

    fn wait(&self) -> Outcome {
        let mut slot = self.slot.lock();
        loop {
            if let Some(outcome) = slot.as_ref() {
                return outcome.clone();
            }
            self.cv.wait(&mut slot);
        }
    }
}

enum Role {
    Leader(Arc<InFlight>),
    Follower(Arc<InFlight>),
}

/// Publishes `Abandoned` and releases the in-flight slot if the leader
/// unwinds without finishing.
struct FlightGuard<'a> {
    in_flight: &'a Mutex<HashMap<String, Arc<InFlight>>>,
    key: &'a str,
    flight: Arc<InFlight>,
    finished: bool,
}

impl FlightGuard<'_> {
    fn finish(mut self, result: &SharedResult) {
        self.flight.publish(Outcome::Done(result.clone()));
        self.release();
        self.finished = true;
    }

    fn release(&self) {
        let mut map = self.in_flight.lock();
        if map
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, &self.flight))
        {
            map.remove(self.key);
        }
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.flight.publish(Outcome::Abandoned);
            self.release();
        }
    }
}

/// Two-namespace cache over a [`CacheStore`], with per-key in-flight
/// deduplication.
pub struct ResultCache<S> {
    store: S,
    encode_enabled: bool,
    decode_enabled: bool,
    in_flight: Mutex<HashMap<String, Arc<InFlight>>>,
    index_lock: Mutex<()>,
}

impl<S: CacheStore> ResultCache<S> {
    /// Cache with both namespaces enabled.
    pub fn new(store: S) -> Self {
        Self::with_namespaces(store, true, true)
    }

    /// Cache with each namespace switched on or off. A disabled namespace
    /// never reads or writes the store, but still deduplicates concurrent
    /// computations.
    pub fn with_namespaces(store: S, encode_enabled: bool, decode_enabled: bool) -> Self {
        Self {
            store,
            encode_enabled,
            decode_enabled,
            in_flight: Mutex::new(HashMap::new()),
            index_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_enabled(&self, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Encode => self.encode_enabled,
            Namespace::Decode => self.decode_enabled,
        }
    }

    /// Read a logical key. Store failures are logged and reported as a miss.
    pub fn get(&self, namespace: Namespace, logical_key: &str) -> Option<Vec<u8>> {
        self.read(namespace, &store_key(namespace, logical_key))
    }

    /// Write a logical key. Store failures are logged and dropped.
    pub fn set(&self, namespace: Namespace, logical_key: &str, value: &[u8]) {
        self.write(namespace, &store_key(namespace, logical_key), value);
    }

    /// Remove a logical key, regardless of whether the namespace is enabled.
    pub fn remove(&self, namespace: Namespace, logical_key: &str) {
        self.delete(&store_key(namespace, logical_key));
    }

    /// Return the cached value for `logical_key`, computing and storing it on
    /// a miss.
    ///
    /// If another caller is already computing the same key, block until it
    /// finishes and return its result (including its error). If that caller
    /// unwinds instead, compute locally.
    pub fn get_or_compute<F>(
        &self,
        namespace: Namespace,
        logical_key: &str,
        compute: F,
    ) -> Result<Vec<u8>, PlaceholderError>
    where
        F: FnOnce() -> Result<Vec<u8>, PlaceholderError>,
    {
        let key = store_key(namespace, logical_key);
        if let Some(hit) = self.read(namespace, &key) {
            debug!(%namespace, %key, "cache hit");
            return Ok(hit);
        }

        let flight = match self.join(&key) {
            Role::Leader(flight) => flight,
            Role::Follower(flight) => {
                trace!(%namespace, %key, "waiting on in-flight computation");
                match flight.wait() {
                    Outcome::Done(result) => return result,
                    Outcome::Abandoned => {
                        warn!(%namespace, %key, "in-flight computation abandoned, recomputing");
                        return self.compute_and_store(namespace, &key, compute);
                    }
                }
            }
        };

        let guard = FlightGuard {
            in_flight: &self.in_flight,
            key: &key,
            flight,
            finished: false,
        };
        // A leader that finished between our read and join may have stored it.
        let result = match self.read(namespace, &key) {
            Some(hit) => Ok(hit),
            None => self.compute_and_store(namespace, &key, compute),
        };
        guard.finish(&result);
        result
    }

    /// Record `member_key` under the index `index_key`, so that
    /// [`remove_indexed`](Self::remove_indexed) can later delete it.
    pub fn index(&self, namespace: Namespace, index_key: &str, member_key: &str) {
        if !self.is_enabled(namespace) {
            return;
        }
        let index = store_key(namespace, index_key);
        let member = store_key(namespace, member_key);

        let _guard = self.index_lock.lock();
        let mut members = self.index_members(namespace, &index);
        if members.iter().any(|m| *m == member) {
            return;
        }
        members.push(member);
        self.write(namespace, &index, members.join("\n").as_bytes());
    }

    /// Delete every member recorded under `index_key`, then the index itself.
    /// Returns the number of members removed.
    pub fn remove_indexed(&self, namespace: Namespace, index_key: &str) -> usize {
        let index = store_key(namespace, index_key);

        let _guard = self.index_lock.lock();
        let members = match self.store.get(&index) {
            Ok(Some(raw)) => parse_index(&raw),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%namespace, key = %index, error = %err, "cache index read failed");
                Vec::new()
            }
        };
        for member in &members {
            self.delete(member);
        }
        self.delete(&index);
        debug!(%namespace, removed = members.len(), "cache entries invalidated");
        members.len()
    }

    fn compute_and_store<F>(
        &self,
        namespace: Namespace,
        key: &str,
        compute: F,
    ) -> Result<Vec<u8>, PlaceholderError>
    where
        F: FnOnce() -> Result<Vec<u8>, PlaceholderError>,
    {
        debug!(%namespace, %key, "cache miss");
        let value = compute()?;
        self.write(namespace, key, &value);
        Ok(value)
    }

    fn join(&self, key: &str) -> Role {
        let mut map = self.in_flight.lock();
        if let Some(existing) = map.get(key) {
            return Role::Follower(Arc::clone(existing));
        }
        let flight = Arc::new(InFlight::new());
        map.insert(key.to_string(), Arc::clone(&flight));
        Role::Leader(flight)
    }

    fn index_members(&self, namespace: Namespace, index: &str) -> Vec<String> {
        self.read(namespace, index)
            .map(|raw| parse_index(&raw))
            .unwrap_or_default()
    }

    fn read(&self, namespace: Namespace, key: &str) -> Option<Vec<u8>> {
        if !self.is_enabled(namespace) {
            return None;
        }
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(%namespace, %key, error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    fn write(&self, namespace: Namespace, key: &str, value: &[u8]) {
        if !self.is_enabled(namespace) {
            return;
        }
        if let Err(err) = self.store.set(key, value) {
            warn!(%namespace, %key, error = %err, "cache write failed");
        }
    }

    fn delete(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(%key, error = %err, "cache remove failed");
        }
    }
}

fn parse_index(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    /// A store whose every operation fails.
    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError("connection refused".to_string()))
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), CacheError> {
            Err(CacheError("connection refused".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_store_key_is_namespaced_and_stable() {
        let a = store_key(Namespace::Encode, "image-1|1.5");
        let b = store_key(Namespace::Encode, "image-1|1.5");
        let c = store_key(Namespace::Decode, "image-1|1.5");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("encode/"));
    }

    #[test]
    fn test_get_or_compute_caches() {
        let cache = ResultCache::new(MemoryStore::new());
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(b"value".to_vec())
        };
        assert_eq!(cache.get_or_compute(Namespace::Decode, "k", compute).unwrap(), b"value");
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(b"other".to_vec())
        };
        assert_eq!(cache.get_or_compute(Namespace::Decode, "k", compute).unwrap(), b"value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = ResultCache::new(MemoryStore::new());
        let err = cache
            .get_or_compute(Namespace::Encode, "k", || {
                Err(PlaceholderError::Config("boom".to_string()))
            })
            .unwrap_err();
        assert_eq!(err, PlaceholderError::Config("boom".to_string()));
        assert!(cache.store().is_empty());
        assert!(cache.get_or_compute(Namespace::Encode, "k", || Ok(vec![1])).is_ok());
    }

    #[test]
    fn test_disabled_namespace_skips_store() {
        let cache = ResultCache::with_namespaces(MemoryStore::new(), true, false);
        cache.get_or_compute(Namespace::Decode, "k", || Ok(vec![1])).unwrap();
        assert!(cache.store().is_empty());
        assert_eq!(cache.get(Namespace::Decode, "k"), None);
        cache.set(Namespace::Encode, "k", b"x");
        assert_eq!(cache.get(Namespace::Encode, "k"), Some(b"x".to_vec()));
    }

    #[test]
    fn test_broken_store_degrades_to_compute() {
        let cache = ResultCache::new(BrokenStore);
        let value = cache
            .get_or_compute(Namespace::Encode, "k", || Ok(b"fresh".to_vec()))
            .unwrap();
        assert_eq!(value, b"fresh");
        assert_eq!(cache.get(Namespace::Encode, "k"), None);
        cache.remove(Namespace::Encode, "k");
        assert_eq!(cache.remove_indexed(Namespace::Encode, "idx"), 0);
    }

    #[test]
    fn test_index_and_remove_indexed() {
        let cache = ResultCache::new(MemoryStore::new());
        cache.set(Namespace::Encode, "a|1", b"one");
        cache.set(Namespace::Encode, "a|2", b"two");
        cache.set(Namespace::Encode, "b|1", b"three");
        cache.index(Namespace::Encode, "a", "a|1");
        cache.index(Namespace::Encode, "a", "a|2");
        cache.index(Namespace::Encode, "a", "a|2");

        assert_eq!(cache.remove_indexed(Namespace::Encode, "a"), 2);
        assert_eq!(cache.get(Namespace::Encode, "a|1"), None);
        assert_eq!(cache.get(Namespace::Encode, "a|2"), None);
        assert_eq!(cache.get(Namespace::Encode, "b|1"), Some(b"three".to_vec()));
        assert_eq!(cache.store().len(), 1);
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let cache = ResultCache::new(MemoryStore::new());
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(4);

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    barrier.wait();
                    let value = cache
                        .get_or_compute(Namespace::Decode, "shared", || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(50));
                            Ok(b"done".to_vec())
                        })
                        .unwrap();
                    assert_eq!(value, b"done");
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_callers_share_errors_when_uncached() {
        let cache = ResultCache::with_namespaces(MemoryStore::new(), false, false);
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(3);

        thread::scope(|scope| {
            for _ in 0..3 {
                scope.spawn(|| {
                    barrier.wait();
                    let result = cache.get_or_compute(Namespace::Decode, "fails", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(50));
                        Err(PlaceholderError::Config("nope".to_string()))
                    });
                    assert!(result.is_err());
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_abandoned_leader_releases_slot() {
        let cache = ResultCache::new(MemoryStore::new());
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = cache.get_or_compute(Namespace::Decode, "k", || panic!("compute blew up"));
        }));
        assert!(panicked.is_err());
        assert!(cache.in_flight.lock().is_empty());
        assert_eq!(
            cache.get_or_compute(Namespace::Decode, "k", || Ok(vec![7])).unwrap(),
            vec![7]
        );
    }
}
