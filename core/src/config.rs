//! Configuration persistence
//!
//! Shared config types live in bosswatch-types; this module adds loading and
//! saving through confy plus path resolution for the cache directory.

use std::path::PathBuf;

pub use bosswatch_types::AppConfig;

use crate::cache::FileStore;

/// Extension trait for AppConfig persistence
pub trait AppConfigExt {
    fn load() -> Self;
    fn save(self);
    fn resolved_cache_dir(&self) -> PathBuf;
}

impl AppConfigExt for AppConfig {
    /// Defaults apply when no config file exists or it fails to parse.
    fn load() -> Self {
        confy::load("bosswatch", "config").unwrap_or_default()
    }

    fn save(self) {
        confy::store("bosswatch", "config", self).expect("Failed to save configuration");
    }

    /// Config override when set, platform data dir otherwise.
    fn resolved_cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => PathBuf::from(dir),
            None => FileStore::default_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_dir_override_wins() {
        let config = AppConfig {
            cache_dir: Some("/tmp/bosswatch-test".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolved_cache_dir(),
            PathBuf::from("/tmp/bosswatch-test")
        );

        let default_config = AppConfig::default();
        assert_eq!(default_config.resolved_cache_dir(), FileStore::default_dir());
    }
}
