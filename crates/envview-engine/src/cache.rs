//! Parsed-model cache using moka
//!
//! Re-parses are triggered after every save, and most of them see content
//! that was already parsed (the engine's own edit echoing back). Results are
//! cached by the document's content hash.

use crate::engine::Loaded;
use envview_document::ContentHash;
use moka::sync::Cache;

/// Content-addressed cache of load results
#[derive(Debug, Clone)]
pub struct ModelCache {
    inner: Cache<ContentHash, Loaded>,
}

impl ModelCache {
    /// Create cache holding at most `max_capacity` models
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Cached result for a document hash
    #[inline]
    #[must_use]
    pub fn get(&self, hash: &ContentHash) -> Option<Loaded> {
        self.inner.get(hash)
    }

    /// Store a result
    #[inline]
    pub fn insert(&self, hash: ContentHash, loaded: Loaded) {
        self.inner.insert(hash, loaded);
    }

    /// Whether a hash is cached
    #[inline]
    #[must_use]
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.inner.contains_key(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parse_document;
    use crate::LoadOptions;
    use envview_document::LineDocument;

    #[test]
    fn insert_and_get() {
        let cache = ModelCache::new(8);
        let doc = LineDocument::from_text("// @env-template\nA=1\n");
        let hash = *doc.hash();
        let loaded = parse_document(doc, &LoadOptions::default());

        assert!(cache.get(&hash).is_none());
        cache.insert(hash, loaded.clone());
        assert!(cache.contains(&hash));
        assert_eq!(cache.get(&hash).unwrap().model, loaded.model);
    }
}
