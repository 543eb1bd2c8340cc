//! Raw key events and key identifiers.

use bitflags::bitflags;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Reserved identifier selecting the aggregate any-key stream.
pub const WILDCARD: &str = "*";

/// Stable identifier naming a physical key, e.g. `"A"` or `"<space>"`.
///
/// Cheap to clone: the name is shared behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(Arc<str>);

impl KeyId {
    /// Create an identifier from a key name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The wildcard identifier (`"*"`).
    pub fn wildcard() -> Self {
        Self::new(WILDCARD)
    }

    /// Whether this is the reserved wildcard identifier.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        &*self.0 == WILDCARD
    }

    /// The key name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({:?})", &*self.0)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for KeyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KeyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeyId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for KeyId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&KeyId> for KeyId {
    fn from(id: &KeyId) -> Self {
        id.clone()
    }
}

bitflags! {
    /// Modifier keys held when a raw event was produced.
    ///
    /// Carried through for subscribers; the multiplexer itself never
    /// interprets them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// Shift key held.
        const SHIFT = 0b0000_0001;
        /// Control key held.
        const CONTROL = 0b0000_0010;
        /// Alt/Option key held.
        const ALT = 0b0000_0100;
        /// Super/Command/Windows key held.
        const SUPER = 0b0000_1000;
    }
}

/// A key-down or key-up notification as delivered by the input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKeyEvent {
    /// Virtual key code (DOM `keyCode` numbering).
    pub code: u32,
    /// Milliseconds on the input source's clock.
    pub timestamp: f64,
    /// Modifiers held at the time of the event.
    pub modifiers: KeyModifiers,
}

impl RawKeyEvent {
    /// Create an event with no modifiers.
    #[inline]
    pub const fn new(code: u32, timestamp: f64) -> Self {
        Self {
            code,
            timestamp,
            modifiers: KeyModifiers::empty(),
        }
    }

    /// Builder: set the modifier state.
    #[inline]
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
