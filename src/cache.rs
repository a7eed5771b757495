use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::config::AnalysisConfig;
use crate::data::model::Dataset;

/// Identity of one input: where it came from, what it contained, and the
/// settings it was built with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub path: PathBuf,
    pub digest: u64,
}

impl SourceKey {
    pub fn new(path: &Path, bytes: &[u8], config: &AnalysisConfig) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        config.hash(&mut hasher);
        SourceKey {
            path: path.to_path_buf(),
            digest: hasher.finish(),
        }
    }
}

/// Storage for built datasets, owned by whoever composes the application.
pub trait DatasetCache: Send + Sync {
    fn get(&self, key: &SourceKey) -> Option<Arc<Dataset>>;
    fn put(&self, key: SourceKey, dataset: Arc<Dataset>);
}

/// Process-lifetime cache; readers share the same `Arc<Dataset>`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<SourceKey, Arc<Dataset>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DatasetCache for MemoryCache {
    fn get(&self, key: &SourceKey) -> Option<Arc<Dataset>> {
        // A poisoned lock only means a writer panicked; the map is still valid.
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn put(&self, key: SourceKey, dataset: Arc<Dataset>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, dataset);
    }
}

/// A cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl DatasetCache for NoCache {
    fn get(&self, _key: &SourceKey) -> Option<Arc<Dataset>> {
        None
    }

    fn put(&self, _key: SourceKey, _dataset: Arc<Dataset>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poisoned_lock_still_reports_entries() {
        let cache = Arc::new(MemoryCache::new());
        let cfg = AnalysisConfig::default();
        let ds = crate::data::pipeline::dataset_from_bytes("C,2022\n,수출\nX,1\n".as_bytes(), &cfg)
            .unwrap();
        let key = SourceKey::new(Path::new("a.csv"), b"x", &cfg);
        cache.put(key.clone(), Arc::new(ds));

        let poisoner = Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(cache.entries.is_poisoned());
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
        assert!(cache.get(&key).is_some());
    }
}
