//! Registry of summary generations currently running.
//!
//! A key is held for the lifetime of an [`InFlightGuard`]; a second request
//! for the same key is refused until the first finishes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

/// Releases its key on drop, including when the handler future is cancelled.
#[derive(Debug)]
pub struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl InFlight {
    /// Claim `key`, or `None` if another request already holds it.
    pub fn try_acquire(&self, key: String) -> Option<InFlightGuard> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Key for one generation: flow, area, and window identity.
pub fn generation_key(flow: &str, area_code: &str, window_key: &str) -> String {
    format!("{flow}:{area_code}:{window_key}")
}
