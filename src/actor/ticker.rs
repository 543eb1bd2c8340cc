//! Ticker Actor: Dedicated thread generating frame ticks.
//!
//! The ticker is the default [`TickSource`] for the multiplexer. It starts
//! paused and parks its thread while paused, so an idle keyboard costs
//! nothing.
//!
//! Each [`Tick`] carries the milliseconds since the previous emitted tick.
//! The first tick after a resume therefore spans the whole paused gap; the
//! streams discard that value on the first tick of a press.

use super::messages::Tick;
use crate::mux::TickSource;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};

/// Pause/resume handle for a running ticker.
///
/// Cheap to clone; every clone controls the same thread.
#[derive(Debug, Clone)]
pub struct TickerControl {
    paused: Arc<AtomicBool>,
    thread: Thread,
}

impl TickSource for TickerControl {
    fn pause(&mut self) {
        self.paused.store(true, Ordering::Release);
    }

    fn resume(&mut self) {
        self.paused.store(false, Ordering::Release);
        self.thread.unpark();
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }
}

/// Ticker actor that generates regular timing events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
    /// Pause/resume handle.
    control: TickerControl,
    /// Receiver for tick events.
    tick_rx: Receiver<Tick>,
}

impl TickerActor {
    /// Spawn a paused ticker with the given interval.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between ticks (e.g., 16ms for ~60 FPS).
    ///
    /// # Errors
    ///
    /// Returns an error if the OS fails to spawn the ticker thread.
    pub fn spawn(interval: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(true));

        // Bounded channel with small buffer - we don't want ticks to queue up
        let (tick_tx, tick_rx) = bounded(2);

        let handle = {
            let shutdown = shutdown.clone();
            let paused = paused.clone();
            thread::Builder::new()
                .name("quay-ticker".to_string())
                .spawn(move || {
                    Self::run_loop(&tick_tx, &shutdown, &paused, interval);
                })?
        };

        let control = TickerControl {
            paused,
            thread: handle.thread().clone(),
        };

        Ok(Self {
            handle: Some(handle),
            shutdown,
            control,
            tick_rx,
        })
    }

    /// Get a reference to the tick receiver.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Tick> {
        &self.tick_rx
    }

    /// A pause/resume handle, to hand to the multiplexer.
    pub fn control(&self) -> TickerControl {
        self.control.clone()
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.control.thread.unpark();
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(tick_tx: &Sender<Tick>, shutdown: &AtomicBool, paused: &AtomicBool, interval: Duration) {
        let mut last_emit = Instant::now();
        let mut frame = 0u64;
        let mut next_tick = last_emit + interval;

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            if paused.load(Ordering::Acquire) {
                // Spurious wakeups just go around the loop again
                thread::park();
                next_tick = Instant::now() + interval;
                continue;
            }

            let now = Instant::now();
            if now >= next_tick {
                let tick = Tick {
                    frame,
                    delta: (now - last_emit).as_secs_f64() * 1000.0,
                };

                // Non-blocking send - if buffer is full, skip this tick
                if tick_tx.try_send(tick).is_ok() {
                    last_emit = now;
                    frame += 1;
                }
                next_tick += interval;

                // Handle case where we're behind (catch up without queuing)
                if next_tick < now {
                    next_tick = now + interval;
                }
            } else {
                let sleep_duration = next_tick - now;
                thread::sleep(sleep_duration.min(Duration::from_millis(1)));
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_starts_paused() {
        let ticker = TickerActor::spawn(Duration::from_millis(5)).unwrap();
        assert!(ticker.control().is_paused());

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(50));
        assert!(tick.is_err());

        ticker.join();
    }

    #[test]
    fn test_ticker_resume_and_pause() {
        let ticker = TickerActor::spawn(Duration::from_millis(5)).unwrap();
        let mut control = ticker.control();

        control.resume();
        let tick = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert_eq!(tick.unwrap().frame, 0);
        let tick2 = ticker.receiver().recv_timeout(Duration::from_millis(200));
        assert!(tick2.unwrap().delta > 0.0);

        control.pause();
        thread::sleep(Duration::from_millis(20));
        while ticker.receiver().try_recv().is_ok() {}

        let tick = ticker.receiver().recv_timeout(Duration::from_millis(50));
        assert!(tick.is_err());

        ticker.join();
    }

    #[test]
    fn test_first_tick_after_resume_spans_gap() {
        let ticker = TickerActor::spawn(Duration::from_millis(5)).unwrap();
        let mut control = ticker.control();

        thread::sleep(Duration::from_millis(40));
        control.resume();
        let tick = ticker.receiver().recv_timeout(Duration::from_millis(200)).unwrap();
        assert!(tick.delta >= 40.0);

        ticker.join();
    }

    #[test]
    fn test_ticker_shutdown() {
        let ticker = TickerActor::spawn(Duration::from_millis(100)).unwrap();
        ticker.shutdown();
        ticker.join();
    }
}
