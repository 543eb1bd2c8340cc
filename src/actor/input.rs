//! Input Actor: Dedicated thread for polling terminal key events.
//!
//! This actor runs in its own thread and uses crossterm's event polling to
//! turn key presses, releases and focus changes into [`InputEvent`]s.
//!
//! Terminals only report key releases when keyboard enhancement is enabled
//! (`REPORT_EVENT_TYPES`); the [`Engine`](super::Engine) turns it on when the
//! terminal supports it.

use super::messages::InputEvent;
use crate::key::{KeyModifiers, RawKeyEvent};
use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyEventKind, ModifierKeyCode};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Input actor that polls terminal events.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send input events to the engine loop.
    /// * `poll_timeout` - How long to wait for events before checking shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn the input thread.
    pub fn spawn(sender: Sender<InputEvent>, poll_timeout: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("quay-input".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &shutdown_clone, poll_timeout);
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main input polling loop.
    fn run_loop(sender: &Sender<InputEvent>, shutdown: &AtomicBool, poll_timeout: Duration) {
        let start = Instant::now();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                let _ = sender.send(InputEvent::Shutdown);
                break;
            }

            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        let timestamp = start.elapsed().as_secs_f64() * 1000.0;
                        if let Some(input_event) = convert_event(&event, timestamp) {
                            if sender.send(input_event).is_err() {
                                // Receiver dropped, exit
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = sender.send(InputEvent::Error(e.to_string()));
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    let _ = sender.send(InputEvent::Error(e.to_string()));
                }
            }
        }
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Convert a crossterm event observed at `timestamp` (ms) to an [`InputEvent`].
///
/// Repeats are reported as key-downs; the press table drops them.
pub fn convert_event(event: &Event, timestamp: f64) -> Option<InputEvent> {
    match event {
        Event::Key(key_event) => {
            let code = virtual_key_code(key_event.code)?;
            let raw = RawKeyEvent::new(code, timestamp)
                .with_modifiers(convert_modifiers(key_event.modifiers));

            Some(match key_event.kind {
                KeyEventKind::Press | KeyEventKind::Repeat => InputEvent::KeyDown(raw),
                KeyEventKind::Release => InputEvent::KeyUp(raw),
            })
        }
        Event::FocusGained => Some(InputEvent::FocusGained),
        Event::FocusLost => Some(InputEvent::FocusLost),
        _ => None,
    }
}

/// Map a crossterm key code to a DOM virtual key code.
///
/// Characters map to the physical key producing them on a US layout, so
/// `'a'`, `'A'` and shifted `'!'` land on keys `65`, `65` and `49`.
pub fn virtual_key_code(code: event::KeyCode) -> Option<u32> {
    use event::KeyCode;

    Some(match code {
        KeyCode::Char(c) => return char_key_code(c),
        KeyCode::F(n @ 1..=24) => 111 + u32::from(n),
        KeyCode::Backspace => 8,
        KeyCode::Tab | KeyCode::BackTab => 9,
        KeyCode::Enter => 13,
        KeyCode::Pause => 19,
        KeyCode::CapsLock => 20,
        KeyCode::Esc => 27,
        KeyCode::PageUp => 33,
        KeyCode::PageDown => 34,
        KeyCode::End => 35,
        KeyCode::Home => 36,
        KeyCode::Left => 37,
        KeyCode::Up => 38,
        KeyCode::Right => 39,
        KeyCode::Down => 40,
        KeyCode::PrintScreen => 44,
        KeyCode::Insert => 45,
        KeyCode::Delete => 46,
        KeyCode::Menu => 93,
        KeyCode::NumLock => 144,
        KeyCode::ScrollLock => 145,
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => 16,
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => 17,
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => 18,
            ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => 91,
            ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => 92,
            _ => return None,
        },
        _ => return None,
    })
}

fn char_key_code(c: char) -> Option<u32> {
    let c = c.to_ascii_uppercase();
    Some(match c {
        'A'..='Z' | '0'..='9' => c as u32,
        ' ' => 32,
        ')' => 48,
        '!' => 49,
        '@' => 50,
        '#' => 51,
        '$' => 52,
        '%' => 53,
        '^' => 54,
        '&' => 55,
        '*' => 56,
        '(' => 57,
        ';' | ':' => 186,
        '=' | '+' => 187,
        ',' | '<' => 188,
        '-' | '_' => 189,
        '.' | '>' => 190,
        '/' | '?' => 191,
        '`' | '~' => 192,
        '[' | '{' => 219,
        '\\' | '|' => 220,
        ']' | '}' => 221,
        '\'' | '"' => 222,
        _ => return None,
    })
}

/// Convert crossterm KeyModifiers to ours.
fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    out.set(KeyModifiers::SHIFT, mods.contains(event::KeyModifiers::SHIFT));
    out.set(KeyModifiers::CONTROL, mods.contains(event::KeyModifiers::CONTROL));
    out.set(KeyModifiers::ALT, mods.contains(event::KeyModifiers::ALT));
    out.set(KeyModifiers::SUPER, mods.contains(event::KeyModifiers::SUPER));
    out
}
