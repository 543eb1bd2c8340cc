//! Key identity: raw events, stable identifiers and the mapping between them.
//!
//! The input source speaks in raw virtual key codes; everything above this
//! module speaks in [`KeyId`]s. A [`KeyMap`] sits in between and decides which
//! codes are recognised at all.

mod event;
mod map;

pub use event::{KeyId, KeyModifiers, RawKeyEvent, WILDCARD};
pub use map::{KeyMap, VirtualKeyMap};
