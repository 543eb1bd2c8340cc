//! Timed Key Stream: per-key emitter of press duration and inter-press timing.
//!
//! A stream is Idle until its key goes down, Active while the key is held,
//! and Idle again after the key-up. Every tick delivered while Active emits a
//! [`KeyData`] to all data listeners.
//!
//! # Timing
//!
//! `delta` accumulates frame deltas for the current press. The first tick of
//! a press contributes [`FIRST_TICK_DELTA`] instead of the frame delta: that
//! delta was measured from whatever tick preceded the press (possibly long
//! before it, while the tick source was paused) and would otherwise inflate
//! the duration.
//!
//! `since` is the time between the start of the previous press and the
//! current press, or `None` when there was no previous press.

use crate::key::{KeyId, RawKeyEvent};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;

/// Contribution of the first tick of a press to the accumulated delta.
pub const FIRST_TICK_DELTA: f64 = 1.0;

/// Timing data emitted on every tick while a key is held.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyData {
    /// Key the data concerns. For the wildcard stream, the key of the most
    /// recent key-down while any key is held.
    pub key: KeyId,
    /// The key-down event that started the press.
    pub raw: RawKeyEvent,
    /// Milliseconds since the previous press started, `None` on a first press.
    pub since: Option<f64>,
    /// Running duration of the current press, in frame-delta units.
    pub delta: f64,
}

/// Raw transition relayed to transition listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyTransition {
    /// The key went down.
    Down(RawKeyEvent),
    /// The key came up.
    Up(RawKeyEvent),
}

/// Handle identifying one listener on one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Listener {
    Callback(Box<dyn FnMut(&KeyData)>),
    Channel(Sender<KeyData>),
}

impl Listener {
    /// Deliver one event. Returns false once the listener is gone for good.
    fn deliver(&mut self, data: &KeyData) -> bool {
        match self {
            Self::Callback(cb) => {
                cb(data);
                true
            }
            Self::Channel(tx) => tx.send(data.clone()).is_ok(),
        }
    }
}

struct Subscriber {
    id: SubscriptionId,
    listener: Listener,
    /// Detach after the first delivery.
    once: bool,
}

/// Per-key timed event stream.
pub struct TimedKeyStream {
    /// Key this stream was registered for.
    key: KeyId,
    /// Timestamp of the current (or most recent) press start.
    press_start: Option<f64>,
    /// Timestamp of the press start before that.
    last_press_start: Option<f64>,
    /// Duration of the current press.
    accumulated_delta: f64,
    /// Whether the key is currently down.
    active: bool,
    /// Data listeners.
    listeners: Vec<Subscriber>,
    /// Raw down/up relay listeners.
    transition_listeners: Vec<(SubscriptionId, Box<dyn FnMut(&KeyTransition)>)>,
    next_id: u64,
    /// Deliver one data event, then ask to be unregistered.
    one_shot: bool,
    /// A one-shot stream that has delivered.
    spent: bool,
}

impl TimedKeyStream {
    /// Create an idle stream with no listeners.
    pub fn new(key: KeyId) -> Self {
        Self {
            key,
            press_start: None,
            last_press_start: None,
            accumulated_delta: 0.0,
            active: false,
            listeners: Vec::new(),
            transition_listeners: Vec::new(),
            next_id: 0,
            one_shot: false,
            spent: false,
        }
    }

    /// Key this stream was registered for.
    pub const fn key(&self) -> &KeyId {
        &self.key
    }

    /// Whether the key is currently held.
    pub const fn is_pressed(&self) -> bool {
        self.active
    }

    /// Start of the current or most recent press.
    pub const fn press_start(&self) -> Option<f64> {
        self.press_start
    }

    /// Start of the press before the current one.
    pub const fn last_press_start(&self) -> Option<f64> {
        self.last_press_start
    }

    /// Running duration of the current press.
    pub const fn accumulated_delta(&self) -> f64 {
        self.accumulated_delta
    }

    /// Number of attached data listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Attach a callback to the data channel.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&KeyData) + 'static,
    {
        self.attach(Listener::Callback(Box::new(callback)), false)
    }

    /// Attach a callback that receives one data event and is then detached.
    ///
    /// Other listeners on the stream are unaffected.
    pub fn subscribe_once<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnOnce(&KeyData) + 'static,
    {
        let mut callback = Some(callback);
        let listener = Listener::Callback(Box::new(move |data: &KeyData| {
            if let Some(cb) = callback.take() {
                cb(data);
            }
        }));
        self.attach(listener, true)
    }

    /// Attach a channel to the data channel.
    ///
    /// The listener is dropped on the first emit after the receiver is gone.
    pub fn subscribe_channel(&mut self) -> Receiver<KeyData> {
        let (tx, rx) = unbounded();
        self.attach(Listener::Channel(tx), false);
        rx
    }

    /// Attach a callback receiving raw key-down/key-up relays.
    pub fn on_transition<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&KeyTransition) + 'static,
    {
        let id = self.next_subscription();
        self.transition_listeners.push((id, Box::new(callback)));
        id
    }

    /// Detach one listener. Returns false if it was not attached.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len() + self.transition_listeners.len();
        self.listeners.retain(|sub| sub.id != id);
        self.transition_listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len() + self.transition_listeners.len()
    }

    /// Idle → Active.
    pub fn on_key_down(&mut self, raw: &RawKeyEvent) {
        self.accumulated_delta = 0.0;
        self.last_press_start = self.press_start;
        self.press_start = Some(raw.timestamp);
        self.active = true;
        self.relay(&KeyTransition::Down(*raw));
    }

    /// Active → Idle. `press_start` is kept until the next key-down.
    pub fn on_key_up(&mut self, raw: &RawKeyEvent) {
        self.active = false;
        self.relay(&KeyTransition::Up(*raw));
    }

    /// Relay a key-up without leaving Active. The wildcard stream stays
    /// pressed until the last held key comes up.
    pub(crate) fn relay_key_up(&mut self, raw: &RawKeyEvent) {
        self.relay(&KeyTransition::Up(*raw));
    }

    /// Advance the current press by one frame and emit to every listener.
    ///
    /// `key` and `raw` describe the press being timed; for a per-key stream
    /// they are its own key and key-down event.
    #[allow(clippy::float_cmp)]
    pub fn tick(&mut self, key: &KeyId, raw: &RawKeyEvent, frame_delta: f64) {
        if self.spent {
            return;
        }

        self.accumulated_delta += if self.accumulated_delta == 0.0 {
            FIRST_TICK_DELTA
        } else {
            frame_delta
        };

        let data = KeyData {
            key: key.clone(),
            raw: *raw,
            since: self.last_press_start.map(|last| raw.timestamp - last),
            delta: self.accumulated_delta,
        };
        self.emit(&data);

        if self.one_shot {
            self.spent = true;
        }
    }

    /// Detach every listener. Idempotent.
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.transition_listeners.clear();
    }

    /// Mark as one-shot: the first emitted event spends the stream.
    pub(crate) fn set_one_shot(&mut self) {
        self.one_shot = true;
    }

    /// A one-shot stream that has already delivered its event.
    pub(crate) const fn is_spent(&self) -> bool {
        self.spent
    }

    fn emit(&mut self, data: &KeyData) {
        self.listeners
            .retain_mut(|sub| sub.listener.deliver(data) && !sub.once);
    }

    fn relay(&mut self, transition: &KeyTransition) {
        for (_, cb) in &mut self.transition_listeners {
            cb(transition);
        }
    }

    fn attach(&mut self, listener: Listener, once: bool) -> SubscriptionId {
        let id = self.next_subscription();
        self.listeners.push(Subscriber { id, listener, once });
        id
    }

    fn next_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl fmt::Debug for TimedKeyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedKeyStream")
            .field("key", &self.key)
            .field("press_start", &self.press_start)
            .field("last_press_start", &self.last_press_start)
            .field("accumulated_delta", &self.accumulated_delta)
            .field("active", &self.active)
            .field("listeners", &self.listeners.len())
            .field("one_shot", &self.one_shot)
            .finish_non_exhaustive()
    }
}
