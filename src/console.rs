use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::session::StopHandle;

/// Line writer shared by the session hooks. The first failed write is
/// kept for the caller and stops the session.
pub struct Console<W> {
    state: Arc<Mutex<State<W>>>,
    stop: StopHandle,
}

struct State<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W> Clone for Console<W> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            stop: self.stop.clone(),
        }
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, stop: StopHandle) -> Self {
        Self {
            state: Arc::new(Mutex::new(State { out, error: None })),
            stop,
        }
    }

    pub fn line(&self, text: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.error.is_some() {
            return;
        }

        let written = writeln!(state.out, "{text}").and_then(|()| state.out.flush());
        if let Err(e) = written {
            tracing::debug!(error = %e, "console write failed, stopping");
            state.error = Some(e);
            self.stop.stop();
        }
    }

    /// The first write error, if any.
    pub fn finish(&self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
