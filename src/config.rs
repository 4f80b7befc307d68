// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Configuration parameters affecting the behaviour of this library.
//!

use dotenvy::var;
use std::sync::OnceLock;

/// Default capacity of the evaluator's regex cache when
/// `LQL_REGEX_CACHE_SIZE` is unset or unparsable.
const DEFAULT_REGEX_CACHE_SIZE: usize = 1024;

#[derive(Debug)]
pub struct Config {
    regex_cache_size: usize,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// This library's configuration singleton.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

impl Default for Config {
    fn default() -> Self {
        let regex_cache_size = var("LQL_REGEX_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_REGEX_CACHE_SIZE);

        Self { regex_cache_size }
    }
}

impl Config {
    /// Maximum number of compiled regex patterns the evaluator's process-
    /// scoped cache will retain before evicting the least recently used.
    pub fn regex_cache_size(&self) -> usize {
        self.regex_cache_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_regex_cache_size() {
        let cfg = Config::default();
        assert_eq!(cfg.regex_cache_size(), DEFAULT_REGEX_CACHE_SIZE);
    }

    #[test]
    fn test_singleton_is_reachable() {
        let cfg = config();
        assert!(cfg.regex_cache_size() > 0);
    }
}
