//! The multiplexing core: press state, tick scheduling and the facade.
//!
//! Everything here is single-threaded and synchronous. Each call runs to
//! completion on the caller's thread, so the press table and the registry
//! need no locking.

mod multiplexer;
mod press_table;
mod scheduler;

pub use multiplexer::Multiplexer;
pub use press_table::PressTable;
pub use scheduler::{ManualTicks, SchedulerState, TickScheduler, TickSource};
