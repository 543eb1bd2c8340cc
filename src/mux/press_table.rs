//! Press Table: keys currently held, with the event that started each press.
//!
//! Only a handful of keys are ever held at once, so entries live in a vector
//! kept in press order, which is also the order streams are ticked and
//! released in.

use crate::key::{KeyId, RawKeyEvent};
use tracing::warn;

/// Set of currently-down keys.
#[derive(Debug, Clone, Default)]
pub struct PressTable {
    entries: Vec<(KeyId, RawKeyEvent)>,
}

impl PressTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a press.
    ///
    /// Returns `None` if the key is already held: input sources repeat
    /// key-down while a key is held and those repeats are suppressed here.
    pub fn on_key_down(&mut self, key: KeyId, raw: RawKeyEvent) -> Option<KeyId> {
        if self.contains(key.as_str()) {
            return None;
        }
        self.entries.push((key.clone(), raw));
        Some(key)
    }

    /// Record a release, returning the event that started the press.
    ///
    /// A release for a key that is not held means the input source missed or
    /// duplicated a notification. It is logged and otherwise ignored.
    pub fn on_key_up(&mut self, key: &str) -> Option<RawKeyEvent> {
        match self.position(key) {
            Some(index) => Some(self.entries.remove(index).1),
            None => {
                warn!(key, "key up without matching key down");
                None
            }
        }
    }

    /// Whether `key` is held.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// The event that started the press of `key`.
    pub fn get(&self, key: &str) -> Option<&RawKeyEvent> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    /// Held keys in press order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyId, &RawKeyEvent)> {
        self.entries.iter().map(|(key, raw)| (key, raw))
    }

    /// Held keys in press order.
    pub fn keys(&self) -> impl Iterator<Item = &KeyId> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every press.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.as_str() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut table = PressTable::new();
        let raw = RawKeyEvent::new(65, 10.0);

        assert_eq!(table.on_key_down(KeyId::new("A"), raw), Some(KeyId::new("A")));
        assert!(table.contains("A"));
        assert_eq!(table.get("A"), Some(&raw));
        assert_eq!(table.len(), 1);

        assert_eq!(table.on_key_up("A"), Some(raw));
        assert!(!table.contains("A"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_press_suppressed() {
        let mut table = PressTable::new();
        let first = RawKeyEvent::new(65, 10.0);
        let repeat = RawKeyEvent::new(65, 40.0);

        table.on_key_down(KeyId::new("A"), first);
        assert_eq!(table.on_key_down(KeyId::new("A"), repeat), None);
        assert_eq!(table.get("A"), Some(&first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_release_without_press() {
        let mut table = PressTable::new();
        assert_eq!(table.on_key_up("A"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_press_order() {
        let mut table = PressTable::new();
        table.on_key_down(KeyId::new("A"), RawKeyEvent::new(65, 0.0));
        table.on_key_down(KeyId::new("B"), RawKeyEvent::new(66, 1.0));
        table.on_key_down(KeyId::new("C"), RawKeyEvent::new(67, 2.0));
        table.on_key_up("B");

        let keys: Vec<_> = table.keys().map(KeyId::as_str).collect();
        assert_eq!(keys, vec!["A", "C"]);
    }

    #[test]
    fn test_clear() {
        let mut table = PressTable::new();
        table.on_key_down(KeyId::new("A"), RawKeyEvent::new(65, 0.0));
        table.on_key_down(KeyId::new("B"), RawKeyEvent::new(66, 1.0));
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.keys().count(), 0);
    }
}
