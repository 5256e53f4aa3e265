use std::collections::HashMap;
use std::sync::Arc;

/// Encoded image bytes remembered by source (URL or path).
///
/// Switching back to a source that was shown before reuses the bytes
/// instead of fetching them again.
#[derive(Debug, Default, Clone)]
pub struct SourceCache {
    entries: HashMap<String, Arc<[u8]>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &str) -> Option<Arc<[u8]>> {
        self.entries.get(source).cloned()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    /// Store bytes for `source`, replacing any previous entry, and return a
    /// shared handle to them.
    pub fn insert(&mut self, source: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Arc<[u8]> {
        let bytes = bytes.into();
        self.entries.insert(source.into(), Arc::clone(&bytes));
        bytes
    }

    /// Cached bytes for `source`, or the result of `fetch` (cached on
    /// success).
    pub fn get_or_try_insert_with<E>(
        &mut self,
        source: &str,
        fetch: impl FnOnce() -> Result<Vec<u8>, E>,
    ) -> Result<Arc<[u8]>, E> {
        if let Some(bytes) = self.get(source) {
            return Ok(bytes);
        }
        let bytes = fetch()?;
        Ok(self.insert(source, bytes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
