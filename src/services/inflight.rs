//! Double-submission guard
//!
//! Tracks mutating requests that are currently in flight so a second,
//! identical submission (a double-tap on "Book") fails fast instead of
//! reaching the backend twice. Reads are not tracked; repeated GETs are
//! governed by the rate limiter.

use crate::utils::error::{ApiError, ApiResult};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Registry of in-flight mutation keys, owned by the client instance
#[derive(Debug, Default)]
pub struct InflightRegistry {
    keys: Mutex<HashSet<String>>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a mutation as in flight, failing when an identical one is
    /// already running. The returned guard releases the key on drop, on
    /// every exit path of the call chain.
    pub fn begin(self: &Arc<Self>, endpoint: &str, key: String) -> ApiResult<InflightGuard> {
        let mut keys = self.keys.lock().unwrap();
        if !keys.insert(key.clone()) {
            return Err(ApiError::DuplicateRequest {
                endpoint: endpoint.to_string(),
            });
        }
        Ok(InflightGuard {
            registry: Arc::clone(self),
            key,
        })
    }

    /// Forget all in-flight keys; test isolation hook
    pub fn clear(&self) {
        self.keys.lock().unwrap().clear();
    }

    fn release(&self, key: &str) {
        self.keys.lock().unwrap().remove(key);
    }
}

/// Releases the in-flight key when the call chain finishes
#[derive(Debug)]
pub struct InflightGuard {
    registry: Arc<InflightRegistry>,
    key: String,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_is_rejected_while_held() {
        let registry = Arc::new(InflightRegistry::new());

        let guard = registry.begin("/tour-booking/", "POST /tour-booking/ {}".to_string());
        assert!(guard.is_ok());

        let duplicate = registry.begin("/tour-booking/", "POST /tour-booking/ {}".to_string());
        assert!(matches!(
            duplicate.unwrap_err(),
            ApiError::DuplicateRequest { .. }
        ));

        drop(guard);
        assert!(registry
            .begin("/tour-booking/", "POST /tour-booking/ {}".to_string())
            .is_ok());
    }

    #[test]
    fn test_distinct_keys_coexist() {
        let registry = Arc::new(InflightRegistry::new());
        let _a = registry.begin("/a", "POST /a {\"seat\":1}".to_string()).unwrap();
        let _b = registry.begin("/a", "POST /a {\"seat\":2}".to_string()).unwrap();
    }

    #[test]
    fn test_clear_releases_everything() {
        let registry = Arc::new(InflightRegistry::new());
        let guard = registry.begin("/a", "k".to_string()).unwrap();
        registry.clear();
        assert!(registry.begin("/a", "k".to_string()).is_ok());
        // Dropping the stale guard must not panic even though its key is
        // already gone
        drop(guard);
    }
}
