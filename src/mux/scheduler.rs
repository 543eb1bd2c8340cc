//! Tick Scheduler: runs the tick source only while a key is held.

use tracing::debug;

/// A periodic tick source that can be paused.
///
/// While resumed, the source delivers one tick per frame to the
/// multiplexer's [`tick`](crate::Multiplexer::tick); while paused it delivers
/// none.
pub trait TickSource {
    /// Stop delivering ticks.
    fn pause(&mut self);
    /// Start delivering ticks again.
    fn resume(&mut self);
    /// Whether the source is currently paused.
    fn is_paused(&self) -> bool;
}

/// Tick source for hosts that drive frames themselves.
///
/// It only records the requested state; the host checks
/// [`is_paused`](TickSource::is_paused) before calling
/// [`Multiplexer::tick`](crate::Multiplexer::tick). Transition counts make it
/// handy in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualTicks {
    paused: bool,
    resumes: usize,
    pauses: usize,
}

impl ManualTicks {
    /// A paused source.
    pub const fn new() -> Self {
        Self {
            paused: true,
            resumes: 0,
            pauses: 0,
        }
    }

    /// Number of times the source was resumed.
    pub const fn resumes(&self) -> usize {
        self.resumes
    }

    /// Number of times the source was paused.
    pub const fn pauses(&self) -> usize {
        self.pauses
    }
}

impl Default for ManualTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ManualTicks {
    fn pause(&mut self) {
        self.paused = true;
        self.pauses += 1;
    }

    fn resume(&mut self) {
        self.paused = false;
        self.resumes += 1;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No ticks are delivered.
    Paused,
    /// One tick per frame is delivered.
    Running,
}

/// Pause/resume state machine over a [`TickSource`].
///
/// The source is only told about actual transitions; redundant requests are
/// absorbed here.
#[derive(Debug)]
pub struct TickScheduler<S> {
    source: S,
    state: SchedulerState,
}

impl<S: TickSource> TickScheduler<S> {
    /// Wrap a source, pausing it if it is running.
    pub fn new(mut source: S) -> Self {
        if !source.is_paused() {
            source.pause();
        }
        Self {
            source,
            state: SchedulerState::Paused,
        }
    }

    /// Current state.
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether ticks are being delivered.
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Follow the number of held keys: run while it is non-zero.
    pub fn update(&mut self, held: usize) {
        if held == 0 {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Paused → Running. No-op when already running.
    pub fn resume(&mut self) {
        if self.state == SchedulerState::Running {
            return;
        }
        debug!("tick scheduler resumed");
        self.source.resume();
        self.state = SchedulerState::Running;
    }

    /// Running → Paused. No-op when already paused.
    pub fn pause(&mut self) {
        if self.state == SchedulerState::Paused {
            return;
        }
        debug!("tick scheduler paused");
        self.source.pause();
        self.state = SchedulerState::Paused;
    }

    /// The wrapped source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the wrapped source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
