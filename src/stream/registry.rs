//! Stream Registry: at most one [`TimedKeyStream`] per key, plus the wildcard.

use super::timed::TimedKeyStream;
use crate::error::StreamError;
use crate::key::{KeyId, RawKeyEvent};
use crate::mux::PressTable;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::trace;

/// Owner of every per-key stream and of the shared any-key stream.
#[derive(Debug)]
pub struct StreamRegistry {
    streams: HashMap<KeyId, TimedKeyStream>,
    wildcard: TimedKeyStream,
    /// Most recent key-down, timed by the wildcard while any key is held.
    last_down: Option<(KeyId, RawKeyEvent)>,
}

impl StreamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            streams: HashMap::new(),
            wildcard: TimedKeyStream::new(KeyId::wildcard()),
            last_down: None,
        }
    }

    /// Register a stream for `key`.
    ///
    /// The wildcard always resolves to the shared any-key stream.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyExists`] if `key` already has a stream.
    pub fn get_or_create(&mut self, key: KeyId) -> Result<&mut TimedKeyStream, StreamError> {
        if key.is_wildcard() {
            return Ok(&mut self.wildcard);
        }

        match self.streams.entry(key) {
            Entry::Occupied(entry) => Err(StreamError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                let stream = TimedKeyStream::new(entry.key().clone());
                Ok(entry.insert(stream))
            }
        }
    }

    /// Destroy and unregister the stream for `key`.
    ///
    /// The wildcard stream is never unregistered: removing it detaches its
    /// listeners, and the result tells whether it had any.
    pub fn remove(&mut self, key: &str) -> bool {
        if key == crate::key::WILDCARD {
            let had_listeners = self.wildcard.listener_count() > 0;
            self.wildcard.destroy();
            return had_listeners;
        }

        match self.streams.remove(key) {
            Some(mut stream) => {
                stream.destroy();
                true
            }
            None => false,
        }
    }

    /// The stream registered for `key`, if any.
    pub fn lookup(&self, key: &str) -> Option<&TimedKeyStream> {
        if key == crate::key::WILDCARD {
            return Some(&self.wildcard);
        }
        self.streams.get(key)
    }

    /// Mutable access to the stream registered for `key`.
    pub fn lookup_mut(&mut self, key: &str) -> Option<&mut TimedKeyStream> {
        if key == crate::key::WILDCARD {
            return Some(&mut self.wildcard);
        }
        self.streams.get_mut(key)
    }

    /// Whether a per-key stream exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.streams.contains_key(key)
    }

    /// Number of per-key streams (the wildcard is not counted).
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Whether no per-key stream is registered.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// The shared any-key stream.
    pub const fn wildcard(&self) -> &TimedKeyStream {
        &self.wildcard
    }

    /// Forward a key-down to the key's stream and to the wildcard.
    pub fn dispatch_key_down(&mut self, key: &KeyId, raw: &RawKeyEvent) {
        self.wildcard.on_key_down(raw);
        self.last_down = Some((key.clone(), *raw));
        if let Some(stream) = self.streams.get_mut(key) {
            trace!(%key, "key down dispatched to stream");
            stream.on_key_down(raw);
        }
    }

    /// Forward a key-up to the key's stream and to the wildcard.
    ///
    /// `pressed` is the table after the release: the wildcard only goes Idle
    /// once it is empty.
    pub fn dispatch_key_up(&mut self, key: &KeyId, raw: &RawKeyEvent, pressed: &PressTable) {
        self.release_wildcard(raw, pressed.is_empty());
        if let Some(stream) = self.streams.get_mut(key) {
            trace!(%key, "key up dispatched to stream");
            stream.on_key_up(raw);
        }
    }

    /// Release every key in `pressed` without a key-up from the input source.
    ///
    /// Each stream sees a key-up carrying the event that started its press.
    pub fn release_all(&mut self, pressed: &PressTable) {
        let held = pressed.len();
        for (index, (key, raw)) in pressed.iter().enumerate() {
            self.release_wildcard(raw, index + 1 == held);
            if let Some(stream) = self.streams.get_mut(key) {
                stream.on_key_up(raw);
            }
        }
    }

    fn release_wildcard(&mut self, raw: &RawKeyEvent, last: bool) {
        if last {
            self.wildcard.on_key_up(raw);
            self.last_down = None;
        } else {
            self.wildcard.relay_key_up(raw);
        }
    }

    /// Tick the wildcard and the stream of every pressed key.
    ///
    /// The wildcard times the most recent key-down, even after that key
    /// came up, so `since` and `delta` always describe the same press.
    /// One-shot streams that delivered during this tick are unregistered
    /// before returning.
    pub fn tick_all(&mut self, pressed: &PressTable, frame_delta: f64) {
        if !pressed.is_empty() {
            if let Some((key, raw)) = &self.last_down {
                self.wildcard.tick(key, raw, frame_delta);
            }
        }

        for (key, raw) in pressed.iter() {
            let spent = match self.streams.get_mut(key) {
                Some(stream) => {
                    stream.tick(key, raw, frame_delta);
                    stream.is_spent()
                }
                None => false,
            };

            if spent {
                trace!(%key, "one-shot stream delivered, unregistering");
                self.remove(key.as_str());
            }
        }
    }

    /// Destroy every stream, including the wildcard's listeners.
    pub fn clear(&mut self) {
        for stream in self.streams.values_mut() {
            stream.destroy();
        }
        self.streams.clear();
        self.remove(crate::key::WILDCARD);
        self.last_down = None;
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StreamRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::stream::KeyTransition;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn counter(stream: &mut TimedKeyStream) -> Rc<RefCell<usize>> {
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        stream.subscribe(move |_| *c.borrow_mut() += 1);
        count
    }

    #[test]
    fn test_get_or_create_rejects_duplicate() {
        let mut registry = StreamRegistry::new();
        assert!(registry.get_or_create(KeyId::new("A")).is_ok());

        let err = registry.get_or_create(KeyId::new("A")).unwrap_err();
        assert_eq!(err, StreamError::AlreadyExists(KeyId::new("A")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_wildcard_is_shared() {
        let mut registry = StreamRegistry::new();
        registry.get_or_create(KeyId::wildcard()).unwrap().subscribe(|_| {});
        registry.get_or_create(KeyId::wildcard()).unwrap().subscribe(|_| {});

        assert_eq!(registry.wildcard().listener_count(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut registry = StreamRegistry::new();
        registry.get_or_create(KeyId::new("A")).unwrap();

        assert!(registry.remove("A"));
        assert!(!registry.remove("A"));
        assert!(registry.lookup("A").is_none());
    }

    #[test]
    fn test_remove_wildcard_detaches_listeners() {
        let mut registry = StreamRegistry::new();
        assert!(!registry.remove("*"));

        registry.get_or_create(KeyId::wildcard()).unwrap().subscribe(|_| {});
        assert!(registry.remove("*"));
        assert_eq!(registry.wildcard().listener_count(), 0);
        assert!(registry.lookup("*").is_some());
    }

    #[test]
    fn test_tick_all_only_pressed_keys() {
        let mut registry = StreamRegistry::new();
        let a = counter(registry.get_or_create(KeyId::new("A")).unwrap());
        let b = counter(registry.get_or_create(KeyId::new("B")).unwrap());
        let any = counter(registry.get_or_create(KeyId::wildcard()).unwrap());

        let mut pressed = PressTable::new();
        let raw = RawKeyEvent::new(65, 0.0);
        let key = pressed.on_key_down(KeyId::new("A"), raw).unwrap();
        registry.dispatch_key_down(&key, &raw);

        registry.tick_all(&pressed, 16.0);
        registry.tick_all(&pressed, 16.0);

        assert_eq!(*a.borrow(), 2);
        assert_eq!(*b.borrow(), 0);
        assert_eq!(*any.borrow(), 2);
    }

    #[test]
    fn test_tick_all_with_nothing_pressed() {
        let mut registry = StreamRegistry::new();
        let any = counter(registry.get_or_create(KeyId::wildcard()).unwrap());

        registry.tick_all(&PressTable::new(), 16.0);
        assert_eq!(*any.borrow(), 0);
    }

    fn press(registry: &mut StreamRegistry, pressed: &mut PressTable, name: &str, code: u32, at: f64) {
        let raw = RawKeyEvent::new(code, at);
        let key = pressed.on_key_down(KeyId::new(name), raw).unwrap();
        registry.dispatch_key_down(&key, &raw);
    }

    fn release(registry: &mut StreamRegistry, pressed: &mut PressTable, name: &str, code: u32, at: f64) {
        pressed.on_key_up(name).unwrap();
        registry.dispatch_key_up(&KeyId::new(name), &RawKeyEvent::new(code, at), pressed);
    }

    #[test]
    fn test_wildcard_keeps_most_recent_key_down() {
        let mut registry = StreamRegistry::new();
        let rx = registry.get_or_create(KeyId::wildcard()).unwrap().subscribe_channel();
        let mut pressed = PressTable::new();

        press(&mut registry, &mut pressed, "A", 65, 0.0);
        press(&mut registry, &mut pressed, "B", 66, 10.0);
        registry.tick_all(&pressed, 16.0);
        let data = rx.try_recv().unwrap();
        assert_eq!(data.key, KeyId::new("B"));
        assert_eq!(data.since, Some(10.0));

        release(&mut registry, &mut pressed, "B", 66, 30.0);
        assert!(registry.wildcard().is_pressed());
        registry.tick_all(&pressed, 16.0);
        let data = rx.try_recv().unwrap();
        assert_eq!(data.key, KeyId::new("B"));
        assert_eq!(data.since, Some(10.0));
        assert_eq!(data.delta, 17.0);

        release(&mut registry, &mut pressed, "A", 65, 40.0);
        assert!(!registry.wildcard().is_pressed());
        registry.tick_all(&pressed, 16.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_release_all() {
        let mut registry = StreamRegistry::new();
        registry.get_or_create(KeyId::new("A")).unwrap();
        let ups = Rc::new(RefCell::new(Vec::new()));
        let sink = ups.clone();
        registry
            .get_or_create(KeyId::new("B"))
            .unwrap()
            .on_transition(move |t| sink.borrow_mut().push(*t));
        let mut pressed = PressTable::new();

        press(&mut registry, &mut pressed, "A", 65, 0.0);
        press(&mut registry, &mut pressed, "B", 66, 10.0);
        registry.release_all(&pressed);

        assert!(!registry.lookup("A").unwrap().is_pressed());
        assert!(!registry.lookup("B").unwrap().is_pressed());
        assert!(!registry.wildcard().is_pressed());
        assert_eq!(ups.borrow().last(), Some(&KeyTransition::Up(RawKeyEvent::new(66, 10.0))));
    }

    #[test]
    fn test_one_shot_removed_during_tick() {
        let mut registry = StreamRegistry::new();
        let stream = registry.get_or_create(KeyId::new("A")).unwrap();
        let count = counter(stream);
        stream.set_one_shot();

        let mut pressed = PressTable::new();
        pressed.on_key_down(KeyId::new("A"), RawKeyEvent::new(65, 0.0));
        registry.tick_all(&pressed, 16.0);
        registry.tick_all(&pressed, 16.0);

        assert_eq!(*count.borrow(), 1);
        assert!(!registry.contains("A"));
    }

    #[test]
    fn test_clear() {
        let mut registry = StreamRegistry::new();
        registry.get_or_create(KeyId::new("A")).unwrap();
        registry.get_or_create(KeyId::wildcard()).unwrap().subscribe(|_| {});

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.wildcard().listener_count(), 0);
    }
}
