// SPDX-License-Identifier: Apache-2.0

//! A bounded, concurrent cache of compiled regex patterns (spec.md §4.3,
//! §5): "compiles regex patterns lazily and caches them keyed by pattern
//! source; cache is process-scoped and bounded".
//!
//! Patterns are untrusted (spec.md §9), so the compiled engine itself
//! ([`regress::Regex`]) is required to be linear-time; this cache only
//! bounds *how many* compiled patterns are retained, via an LRU recency
//! list guarding a [`DashMap`] of the actual compiled regexes.

use dashmap::DashMap;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

pub(super) struct RegexCache {
    compiled: DashMap<String, Arc<regress::Regex>>,
    recency: Mutex<LruCache<String, ()>>,
}

impl RegexCache {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        RegexCache {
            compiled: DashMap::new(),
            recency: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// `true` iff `pattern` matches anywhere in `haystack`. Returns an
    /// error string (never panics) if `pattern` itself fails to compile
    /// as a regex — callers treat that as "does not match".
    pub(super) fn is_match(&self, pattern: &str, haystack: &str) -> Result<bool, String> {
        let compiled = self.get_or_compile(pattern)?;
        Ok(compiled.find(haystack).is_some())
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Arc<regress::Regex>, String> {
        if let Some(hit) = self.compiled.get(pattern) {
            self.touch(pattern);
            return Ok(hit.clone());
        }

        let compiled = Arc::new(regress::Regex::new(pattern).map_err(|e| {
            error!(pattern, error = %e, "failed to compile regex pattern");
            format!("invalid regex {pattern:?}: {e}")
        })?);
        self.insert(pattern, compiled.clone());
        Ok(compiled)
    }

    fn touch(&self, pattern: &str) {
        let mut recency = self.recency.lock().unwrap_or_else(|e| e.into_inner());
        recency.get(pattern);
    }

    fn insert(&self, pattern: &str, compiled: Arc<regress::Regex>) {
        self.compiled.insert(pattern.to_string(), compiled);
        let mut recency = self.recency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((evicted, _)) = recency.push(pattern.to_string(), ()) {
            if evicted != pattern {
                debug!(evicted, "evicting compiled regex pattern from cache");
                self.compiled.remove(&evicted);
            }
        }
    }
}
