use std::io;

use surge_ping::SurgeError;
use thiserror::Error;

/// Failures raised while resolving the target or exchanging echoes.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("cannot resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("no address found for {0}")]
    NoAddress(String),

    #[error("cannot open ICMP socket: {0}")]
    Socket(#[source] io::Error),

    #[error("echo request failed: {0}")]
    Echo(#[from] SurgeError),
}

/// Top-level error, one variant per exit code class.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Args(String),

    #[error("an error occurred while initializing pinger: {0}")]
    Init(#[source] ProbeError),

    #[error("an error occurred when running ping: {0}")]
    Run(#[source] ProbeError),

    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    pub const EXIT_ARGS: u8 = 1;
    pub const EXIT_PING: u8 = 2;

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Args(_) => Self::EXIT_ARGS,
            AppError::Init(_) | AppError::Run(_) | AppError::Io(_) => Self::EXIT_PING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(AppError::Args("too many arguments".into()).exit_code(), 1);
        assert_eq!(
            AppError::Init(ProbeError::NoAddress("example.invalid".into())).exit_code(),
            2
        );
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(AppError::Run(ProbeError::Socket(io)).exit_code(), 2);
    }

    #[test]
    fn init_error_reports_cause_verbatim() {
        let err = AppError::Init(ProbeError::NoAddress("example.invalid".into()));
        assert_eq!(
            err.to_string(),
            "an error occurred while initializing pinger: no address found for example.invalid"
        );
    }
}
