//! In-memory object store for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{ObjectStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<FxHashMap<String, (Vec<u8>, String)>>,
    heads: AtomicUsize,
    puts: AtomicUsize,
    fail_probes: AtomicBool,
    fail_puts: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object as if uploaded by an earlier run.
    pub fn insert(&self, key: &str, bytes: &[u8]) {
        self.objects
            .lock()
            .insert(key.to_string(), (bytes.to_vec(), String::new()));
    }

    pub fn fail_probes(&self) {
        self.fail_probes.store(true, Ordering::Relaxed);
    }

    pub fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::Relaxed);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().get(key).map(|(bytes, _)| bytes.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.lock().get(key).map(|(_, ct)| ct.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn head_count(&self) -> usize {
        self.heads.load(Ordering::Relaxed)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::Relaxed)
    }
}

impl ObjectStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.heads.fetch_add(1, Ordering::Relaxed);
        if self.fail_probes.load(Ordering::Relaxed) {
            return Err(StoreError::Status {
                status: 403,
                key: key.to_string(),
                body: String::new(),
            });
        }
        Ok(self.objects.lock().contains_key(key))
    }

    fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::Relaxed);
        if self.fail_puts.load(Ordering::Relaxed) {
            return Err(StoreError::Status {
                status: 500,
                key: key.to_string(),
                body: "internal error".to_string(),
            });
        }
        self.objects
            .lock()
            .insert(key.to_string(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }
}
