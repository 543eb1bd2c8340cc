//! # Quay
//!
//! Timed per-key event streams multiplexed from raw keyboard input.
//!
//! Quay tracks which keys are held and, once per frame while any key is
//! held, emits how long each key has been down and how long ago it was
//! last pressed.
//!
//! ## Core Concepts
//!
//! - **Press table**: held keys, with repeat key-downs suppressed
//! - **Timed streams**: at most one stream per key, plus the `"*"` any-key stream
//! - **Paused ticking**: the tick source only runs while a key is held
//! - **Actors**: optional terminal input and ticker threads feeding the core
//!
//! ## Example
//!
//! ```rust
//! use quay::{ManualTicks, Multiplexer, RawKeyEvent, VirtualKeyMap};
//!
//! let mut mux = Multiplexer::attached(VirtualKeyMap::new(), ManualTicks::new());
//! let held = mux.stream("A").unwrap().subscribe_channel();
//!
//! mux.key_down(RawKeyEvent::new(65, 0.0));
//! mux.tick(16.0);
//! mux.tick(16.0);
//!
//! assert_eq!(held.try_iter().last().unwrap().delta, 17.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod error;
pub mod key;
pub mod mux;
pub mod stream;

// Re-exports for convenience
pub use actor::{Engine, EngineConfig, InputEvent, Tick, TickerActor, TickerControl};
pub use error::{Error, Result, StreamError};
pub use key::{KeyId, KeyMap, KeyModifiers, RawKeyEvent, VirtualKeyMap, WILDCARD};
pub use mux::{ManualTicks, Multiplexer, PressTable, TickScheduler, TickSource};
pub use stream::{KeyData, KeyTransition, StreamRegistry, SubscriptionId, TimedKeyStream};
