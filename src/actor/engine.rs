//! Engine: Main coordinator that ties actors to a multiplexer.
//!
//! The Engine puts the terminal in raw mode, spawns the input and ticker
//! actors, and drives a [`Multiplexer`] from their channels on the calling
//! thread. The multiplexer pauses the ticker whenever no key is held.
//!
//! ```ignore
//! let mut engine = Engine::new()?;
//! engine.mux_mut().on("<space>", |data| println!("held for {}", data.delta))?;
//!
//! while engine.is_running() {
//!     engine.step(Duration::from_millis(100));
//! }
//! ```

use super::input::InputActor;
use super::messages::InputEvent;
use super::ticker::{TickerActor, TickerControl};
use crate::error::Result;
use crate::key::{KeyMap, VirtualKeyMap};
use crate::mux::Multiplexer;
use crossbeam_channel::{bounded, select, Receiver};
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tick frequency while a key is held.
    pub target_fps: u32,
    /// Input poll timeout.
    pub input_poll_timeout: Duration,
    /// Ask the terminal to report key releases and repeats.
    pub keyboard_enhancement: bool,
    /// Ask the terminal to report focus changes.
    pub focus_events: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            input_poll_timeout: Duration::from_millis(10),
            keyboard_enhancement: true,
            focus_events: true,
        }
    }
}

impl EngineConfig {
    /// Interval between ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }
}

/// Terminal modes switched on by the engine, undone on drop.
///
/// Created before any mode is switched on, so a setup step failing halfway
/// still leaves the terminal as it was found.
#[derive(Debug, Default)]
struct TerminalGuard {
    raw: bool,
    enhanced: bool,
    focus: bool,
}

impl TerminalGuard {
    fn raw_mode() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self {
            raw: true,
            enhanced: false,
            focus: false,
        })
    }

    /// Write the sequences undoing the enabled modes, most recent first.
    ///
    /// Each mode is forgotten once undone, so a second call writes nothing.
    fn restore(&mut self, out: &mut impl Write) -> io::Result<()> {
        if std::mem::take(&mut self.focus) {
            execute!(out, DisableFocusChange)?;
        }
        if std::mem::take(&mut self.enhanced) {
            execute!(out, PopKeyboardEnhancementFlags)?;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore(&mut io::stdout()) {
            warn!(%err, "failed to restore terminal modes");
        }
        if self.raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// Terminal-backed key stream engine.
pub struct Engine<M = VirtualKeyMap> {
    /// Configuration.
    config: EngineConfig,
    /// Input event receiver.
    input_rx: Receiver<InputEvent>,
    /// Input actor handle.
    input_actor: InputActor,
    /// Ticker actor handle.
    ticker: TickerActor,
    /// The multiplexing core.
    mux: Multiplexer<M, TickerControl>,
    /// Whether the engine is running.
    running: bool,
    /// Terminal modes to restore.
    terminal: TerminalGuard,
}

impl Engine<VirtualKeyMap> {
    /// Create a new engine with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup or thread spawning fails.
    pub fn new() -> Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new engine with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup or thread spawning fails.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Self::with_keymap(VirtualKeyMap::new(), config)
    }
}

impl<M: KeyMap> Engine<M> {
    /// Create an engine using a custom key map.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup or thread spawning fails.
    pub fn with_keymap(keymap: M, config: EngineConfig) -> Result<Self> {
        let mut guard = TerminalGuard::raw_mode()?;

        let mut stdout = io::stdout();
        let enhanced = config.keyboard_enhancement && terminal::supports_keyboard_enhancement()?;
        if enhanced {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                )
            )?;
            guard.enhanced = true;
        } else if config.keyboard_enhancement {
            warn!("terminal does not report key releases; keys will stay held");
        }
        if config.focus_events {
            execute!(stdout, EnableFocusChange)?;
            guard.focus = true;
        }

        let (input_tx, input_rx) = bounded::<InputEvent>(64);
        let input_actor = InputActor::spawn(input_tx, config.input_poll_timeout)?;
        let ticker = TickerActor::spawn(config.frame_interval())?;

        let mux = Multiplexer::attached(keymap, ticker.control());
        debug!(fps = config.target_fps, enhanced, "engine started");

        Ok(Self {
            config,
            input_rx,
            input_actor,
            ticker,
            mux,
            running: true,
            terminal: guard,
        })
    }

    /// Process at most one input or tick message, waiting up to `timeout`.
    ///
    /// Returns whether the engine is still running.
    pub fn step(&mut self, timeout: Duration) -> bool {
        select! {
            recv(self.input_rx) -> event => match event {
                Ok(InputEvent::Shutdown) | Err(_) => {
                    self.mux.detach();
                    self.running = false;
                }
                Ok(event) => self.mux.handle(&event),
            },
            recv(self.ticker.receiver()) -> tick => {
                if let Ok(tick) = tick {
                    self.mux.tick(tick.delta);
                }
            },
            default(timeout) => {},
        }
        self.running
    }

    /// Get a reference to the multiplexer.
    pub const fn mux(&self) -> &Multiplexer<M, TickerControl> {
        &self.mux
    }

    /// Get a mutable reference to the multiplexer.
    pub fn mux_mut(&mut self) -> &mut Multiplexer<M, TickerControl> {
        &mut self.mux
    }

    /// Get the configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<M> Engine<M> {
    /// Check if the engine is still running.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the engine.
    pub fn stop(&mut self) {
        self.running = false;
        self.input_actor.shutdown();
        self.ticker.shutdown();
    }
}

impl<M> Drop for Engine<M> {
    fn drop(&mut self) {
        // Terminal modes are restored when `terminal` drops, after this
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.target_fps, 60);
        assert!(config.keyboard_enhancement);
        assert_eq!(config.frame_interval(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn test_frame_interval_zero_fps() {
        let config = EngineConfig {
            target_fps: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_guard_restores_enabled_modes() {
        let mut guard = TerminalGuard {
            raw: false,
            enhanced: true,
            focus: true,
        };
        let mut out = Vec::new();
        guard.restore(&mut out).unwrap();

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?1004l"));
        assert!(written.contains("\x1b[<1u"));

        let mut again = Vec::new();
        guard.restore(&mut again).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_guard_without_modes_writes_nothing() {
        let mut guard = TerminalGuard::default();
        let mut out = Vec::new();
        guard.restore(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
