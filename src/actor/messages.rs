//! Message types for actor communication.

use crate::key::RawKeyEvent;

/// Events from the input thread.
///
/// These are sent from the input actor to the engine loop.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key went down (or repeated while held).
    KeyDown(RawKeyEvent),

    /// A key came up.
    KeyUp(RawKeyEvent),

    /// Focus gained.
    FocusGained,

    /// Focus lost.
    FocusLost,

    /// Input thread encountered an error.
    Error(String),

    /// Input thread is shutting down.
    Shutdown,
}

/// A tick event sent at regular intervals while the ticker runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Frame number (monotonically increasing, counts emitted ticks only).
    pub frame: u64,
    /// Milliseconds since the previously emitted tick.
    pub delta: f64,
}
