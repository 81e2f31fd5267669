use std::collections::HashMap;

use parking_lot::RwLock;

use account_tenancy_sdk::SessionStore;

/// Process-local session storage for one client session.
///
/// Suitable for tests and single-process hosts; a web host would back
/// [`SessionStore`] with its own session layer instead.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn read(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.read().get(key).cloned()
    }

    fn write(&self, key: &str, value: serde_json::Value) {
        self.entries.write().insert(key.to_owned(), value);
    }

    fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }
}
