//! Keystream demo: print timed key streams from the terminal.
//!
//! Hold `<space>` or the arrow keys to watch durations grow. Any key feeds
//! the `*` stream. Press Escape to quit.
//!
//! Key releases need a terminal with keyboard enhancement support (kitty,
//! foot, WezTerm, recent Alacritty). Set `RUST_LOG=quay=trace` to log to
//! stderr.

use quay::{Engine, KeyData};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn report(label: &'static str) -> impl FnMut(&KeyData) + 'static {
    move |data: &KeyData| {
        let since = data
            .since
            .map_or_else(|| "first press".to_string(), |ms| format!("{ms:.0}ms since last"));
        print!("{label:>8} {:<10} held {:>7.1} ({since})\r\n", data.key.as_str(), data.delta);
    }
}

fn main() -> quay::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut engine = Engine::new()?;
    let quit = Rc::new(Cell::new(false));

    {
        let mux = engine.mux_mut();
        mux.on("<space>", report("space"))?;
        for arrow in ["<left>", "<right>", "<up>", "<down>"] {
            mux.on(arrow, report("arrow"))?;
        }
        mux.on("*", report("any"))?;

        let quit = quit.clone();
        mux.once("<escape>", move |_| quit.set(true))?;
    }

    print!("Quay keystream demo. Hold keys; Escape quits.\r\n");
    while engine.is_running() && !quit.get() {
        engine.step(Duration::from_millis(100));
    }

    Ok(())
}
