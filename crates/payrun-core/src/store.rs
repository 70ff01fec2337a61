/// Insertion-ordered key/value record of command outputs for one run.
///
/// Keys are composite `"{command}_{field}"` strings. Writes are
/// append-or-overwrite with last-write-wins semantics; entries are never
/// deleted. The store is owned by the runner and passed by reference into
/// whatever needs it - there is no process-wide state.
#[derive(Debug, Default)]
pub struct OutputStore {
    entries: Vec<(String, String)>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an output field under `"{command}_{field}"`.
    ///
    /// Overwrites in place when the key already exists, preserving the
    /// original insertion position.
    pub fn set(&mut self, command: &str, field: &str, value: impl Into<String>) {
        let key = format!("{}_{}", command, field);
        self.set_key(key, value.into());
    }

    /// Store a value under an already-composed key.
    pub fn set_key(&mut self, key: String, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a value by its composite key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut store = OutputStore::new();
        store.set("dep1", "amount", "100");

        assert_eq!(store.get("dep1_amount"), Some("100"));
        assert_eq!(store.get("dep1_missing"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = OutputStore::new();
        store.set("dep1", "amount", "100");
        store.set("dep1", "amount", "250");

        assert_eq!(store.get("dep1_amount"), Some("250"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = OutputStore::new();
        store.set("dep1", "amount", "100");
        store.set("dep1", "status", "success");
        store.set("tr1", "id", "tx-42");
        // Overwrite must not move the entry
        store.set("dep1", "amount", "200");

        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["dep1_amount", "dep1_status", "tr1_id"]);
    }

    #[test]
    fn test_empty_store() {
        let store = OutputStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("anything"), None);
    }
}
