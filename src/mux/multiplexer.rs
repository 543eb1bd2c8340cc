//! Multiplexer: the facade receiving raw input and serving streams.
//!
//! ```text
//!  key_down / key_up ──▶ PressTable ──▶ StreamRegistry ──▶ per-key streams
//!                            │                       └──▶ wildcard stream
//!                            ▼
//!                      TickScheduler ──resume/pause──▶ TickSource
//!                                                          │
//!  tick(frame_delta) ◀─────────────────────────────────────┘
//! ```

use super::press_table::PressTable;
use super::scheduler::{TickScheduler, TickSource};
use crate::actor::InputEvent;
use crate::error::StreamError;
use crate::key::{KeyId, KeyMap, RawKeyEvent};
use crate::stream::{KeyData, StreamRegistry, TimedKeyStream};
use tracing::{debug, trace, warn};

/// Tracks held keys and fans out timed per-key streams.
///
/// Starts Detached: key notifications are ignored until [`attach`] (or a
/// focus gain). Detaching releases every held key and pauses ticking.
///
/// [`attach`]: Multiplexer::attach
#[derive(Debug)]
pub struct Multiplexer<M, S> {
    keymap: M,
    pressed: PressTable,
    registry: StreamRegistry,
    scheduler: TickScheduler<S>,
    attached: bool,
}

impl<M: KeyMap, S: TickSource> Multiplexer<M, S> {
    /// Create a detached multiplexer.
    pub fn new(keymap: M, ticks: S) -> Self {
        Self {
            keymap,
            pressed: PressTable::new(),
            registry: StreamRegistry::new(),
            scheduler: TickScheduler::new(ticks),
            attached: false,
        }
    }

    /// Create a multiplexer that is already attached.
    pub fn attached(keymap: M, ticks: S) -> Self {
        let mut mux = Self::new(keymap, ticks);
        mux.attach();
        mux
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start accepting key notifications.
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        debug!("multiplexer attached");
        self.attached = true;
    }

    /// Stop accepting key notifications and release held keys.
    ///
    /// Streams of held keys receive a key-up carrying the event that started
    /// their press.
    pub fn detach(&mut self) {
        if self.attached {
            debug!(held = self.pressed.len(), "multiplexer detached");
        }
        self.attached = false;
        self.registry.release_all(&self.pressed);
        self.pressed.clear();
        self.scheduler.pause();
    }

    /// The input surface gained focus.
    pub fn focus_gained(&mut self) {
        self.attach();
    }

    /// The input surface lost focus. Key-ups for held keys will never
    /// arrive, so every held key is released.
    pub fn focus_lost(&mut self) {
        self.detach();
    }

    /// Whether key notifications are accepted.
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle a key-down. Returns the key if it started a new press.
    pub fn key_down(&mut self, raw: RawKeyEvent) -> Option<KeyId> {
        if !self.attached {
            return None;
        }
        let key = self.identify(raw.code)?;

        // Repeats while held are dropped here
        let key = self.pressed.on_key_down(key, raw)?;
        trace!(%key, timestamp = raw.timestamp, "key down");

        self.registry.dispatch_key_down(&key, &raw);
        self.scheduler.update(self.pressed.len());
        Some(key)
    }

    /// Handle a key-up. Returns the key if it ended a press.
    pub fn key_up(&mut self, raw: RawKeyEvent) -> Option<KeyId> {
        if !self.attached {
            return None;
        }
        let key = self.identify(raw.code)?;

        self.pressed.on_key_up(key.as_str())?;
        trace!(%key, timestamp = raw.timestamp, "key up");

        self.registry.dispatch_key_up(&key, &raw, &self.pressed);
        self.scheduler.update(self.pressed.len());
        Some(key)
    }

    /// Handle one frame from the tick source.
    ///
    /// Ticks arriving while the scheduler is paused (queued before a pause)
    /// are discarded.
    pub fn tick(&mut self, frame_delta: f64) {
        if !self.scheduler.is_running() {
            return;
        }
        self.registry.tick_all(&self.pressed, frame_delta);
    }

    /// Route a message from the input actor.
    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(raw) => {
                self.key_down(*raw);
            }
            InputEvent::KeyUp(raw) => {
                self.key_up(*raw);
            }
            InputEvent::FocusGained => self.focus_gained(),
            InputEvent::FocusLost | InputEvent::Shutdown => self.focus_lost(),
            InputEvent::Error(message) => warn!(%message, "input source error"),
        }
    }

    fn identify(&self, code: u32) -> Option<KeyId> {
        let key = self.keymap.identify(code).filter(|key| !key.is_wildcard());
        if key.is_none() {
            trace!(code, "unmapped key code ignored");
        }
        key
    }

    // =========================================================================
    // Streams
    // =========================================================================

    /// Register a stream for `key` (`"*"` selects the any-key stream).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyExists`] if `key` already has a stream.
    pub fn stream(&mut self, key: impl Into<KeyId>) -> Result<&mut TimedKeyStream, StreamError> {
        self.registry.get_or_create(key.into())
    }

    /// Register a stream for `key` with a data callback attached.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyExists`] if `key` already has a stream.
    pub fn stream_with<F>(
        &mut self,
        key: impl Into<KeyId>,
        callback: F,
    ) -> Result<&mut TimedKeyStream, StreamError>
    where
        F: FnMut(&KeyData) + 'static,
    {
        let stream = self.stream(key)?;
        stream.subscribe(callback);
        Ok(stream)
    }

    /// Alias for [`stream_with`](Self::stream_with).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyExists`] if `key` already has a stream.
    pub fn on<F>(&mut self, key: impl Into<KeyId>, callback: F) -> Result<&mut TimedKeyStream, StreamError>
    where
        F: FnMut(&KeyData) + 'static,
    {
        self.stream_with(key, callback)
    }

    /// Alias for [`on`](Self::on).
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyExists`] if `key` already has a stream.
    pub fn add_event_listener<F>(
        &mut self,
        key: impl Into<KeyId>,
        callback: F,
    ) -> Result<&mut TimedKeyStream, StreamError>
    where
        F: FnMut(&KeyData) + 'static,
    {
        self.on(key, callback)
    }

    /// Register a stream that delivers one data event to `callback`, then
    /// unregisters itself before any later tick.
    ///
    /// On `"*"` only `callback` is detached after delivering; other
    /// any-key listeners keep receiving.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::AlreadyExists`] if `key` already has a stream.
    pub fn once<F>(&mut self, key: impl Into<KeyId>, callback: F) -> Result<&mut TimedKeyStream, StreamError>
    where
        F: FnOnce(&KeyData) + 'static,
    {
        let key = key.into();
        let shared = key.is_wildcard();
        let stream = self.stream(key)?;
        stream.subscribe_once(callback);
        if !shared {
            stream.set_one_shot();
        }
        Ok(stream)
    }

    /// Destroy and unregister the stream for `key`.
    ///
    /// For `"*"` the any-key stream stays available but loses its listeners;
    /// the result tells whether it had any.
    pub fn remove_stream(&mut self, key: &str) -> bool {
        self.registry.remove(key)
    }

    /// Alias for [`remove_stream`](Self::remove_stream).
    pub fn off(&mut self, key: &str) -> bool {
        self.remove_stream(key)
    }

    /// Alias for [`off`](Self::off).
    pub fn remove_event_listener(&mut self, key: &str) -> bool {
        self.off(key)
    }

    /// The stream registered for `key`.
    pub fn get_stream(&self, key: &str) -> Option<&TimedKeyStream> {
        self.registry.lookup(key)
    }

    /// Mutable access to the stream registered for `key`.
    pub fn get_stream_mut(&mut self, key: &str) -> Option<&mut TimedKeyStream> {
        self.registry.lookup_mut(key)
    }

    /// Whether `key` has a per-key stream.
    pub fn has_stream(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Number of per-key streams.
    pub fn stream_count(&self) -> usize {
        self.registry.len()
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Whether `key` is held.
    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }

    /// Held keys in press order.
    pub fn pressed_keys(&self) -> impl Iterator<Item = &KeyId> {
        self.pressed.keys()
    }

    /// Number of held keys.
    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    /// Whether the tick source is running.
    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The tick source.
    pub const fn tick_source(&self) -> &S {
        self.scheduler.source()
    }

    /// The key map.
    pub const fn keymap(&self) -> &M {
        &self.keymap
    }

    /// Mutable access to the key map.
    pub fn keymap_mut(&mut self) -> &mut M {
        &mut self.keymap
    }
}
