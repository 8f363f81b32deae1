use std::io;
use std::thread;

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::session::StopHandle;

/// Stop the session on the first SIGINT or SIGTERM.
pub fn listen_for_interrupt(stop: StopHandle) -> io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    thread::Builder::new()
        .name("krring-signal".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::debug!(signal, "interrupt received");
                stop.stop();
            }
        })?;

    Ok(())
}
