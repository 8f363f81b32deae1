use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::Parser;

use crate::error::AppError;

pub const APP_NAME: &str = "krring";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const REVISION: &str = env!("KRRING_REVISION");

pub const DEFAULT_COUNT: u32 = 32;

#[derive(Parser, Debug)]
#[command(
    name = APP_NAME,
    about = "`ping` command but with krrg",
    override_usage = "krring [OPTIONS] HOST",
    disable_version_flag = true
)]
struct Cli {
    /// Stop after sending <count> echoes (0 runs until interrupted)
    #[arg(short = 'c', long, value_name = "count", default_value_t = DEFAULT_COUNT)]
    count: u32,

    /// Enable privileged mode
    #[arg(short = 'P', long)]
    privilege: bool,

    /// Show version
    #[arg(short = 'V', long)]
    version: bool,

    /// Host name or IP address to ping
    #[arg(value_name = "HOST")]
    hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub host: String,
    pub count: u32,
    pub privileged: bool,
}

#[derive(Debug)]
pub enum Invocation {
    /// Help was requested; the rendered text is ready to print.
    Help(clap::Error),
    Version,
    Ping(Options),
}

pub fn version_line() -> String {
    format!("{APP_NAME}: v{VERSION}-rev{REVISION}")
}

pub fn parse<I, T>(args: I) -> Result<Invocation, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayHelp => return Ok(Invocation::Help(e)),
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            return Err(AppError::Args(format!("parse error: {message}")));
        }
    };

    if cli.version {
        return Ok(Invocation::Version);
    }

    let mut hosts = cli.hosts.into_iter();
    let host = match (hosts.next(), hosts.next()) {
        (None, _) => return Err(AppError::Args("must requires an argument".to_string())),
        (Some(_), Some(_)) => return Err(AppError::Args("too many arguments".to_string())),
        (Some(host), None) => host,
    };

    Ok(Invocation::Ping(Options {
        host,
        count: cli.count,
        privileged: cli.privilege,
    }))
}
