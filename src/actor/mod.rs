//! Actor Model: threads feeding the single-threaded core.
//!
//! - **Input Actor**: Polls terminal key events, forwards them as raw events
//! - **Ticker Actor**: Emits frame ticks while resumed, parks while paused
//! - **Engine**: Drains both channels on one thread into a [`Multiplexer`]
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     InputEvent      ┌──────────────┐
//! │ Input Thread │ ─────────────────▶  │              │
//! └──────────────┘                     │    Engine    │
//!                                      │ (Multiplexer)│
//! ┌──────────────┐        Tick         │              │
//! │Ticker Thread │ ─────────────────▶  │              │
//! └──────────────┘ ◀── pause/resume ── └──────────────┘
//! ```
//!
//! [`Multiplexer`]: crate::Multiplexer

mod engine;
mod input;
mod messages;
mod ticker;

pub use engine::{Engine, EngineConfig};
pub use input::{convert_event, virtual_key_code, InputActor};
pub use messages::{InputEvent, Tick};
pub use ticker::{TickerActor, TickerControl};
