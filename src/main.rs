use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use colored::Colorize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Invocation, Options};
use crate::console::Console;
use crate::error::AppError;
use crate::probe::SurgeProbe;
use crate::session::{Session, SessionConfig, Target};

const LOG_ENV: &str = "KRRING_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run(std::env::args_os(), &mut io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(io::stderr(), "{}", report(&e));
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn report(err: &AppError) -> String {
    format!("[ {} ] {}", "ERROR".red().bold(), err)
}

async fn run<I, W>(args: I, out: &mut W) -> Result<(), AppError>
where
    I: IntoIterator<Item = OsString>,
    W: Write,
{
    match cli::parse(args)? {
        Invocation::Help(help) => write!(out, "{help}")?,
        Invocation::Version => writeln!(out, "{}", cli::version_line())?,
        Invocation::Ping(opts) => ping(opts).await?,
    }
    out.flush()?;
    Ok(())
}

async fn ping(opts: Options) -> Result<(), AppError> {
    let config = SessionConfig::from(&opts);

    let addr = probe::resolve(&opts.host).await.map_err(AppError::Init)?;
    tracing::info!(host = %opts.host, %addr, "resolved target");

    let probe = SurgeProbe::connect(addr, config.privileged, config.reply_timeout)
        .await
        .map_err(AppError::Init)?;

    let target = Target {
        host: opts.host,
        addr,
    };
    let mut session = Session::new(probe, target, config);
    signal::listen_for_interrupt(session.stop_handle())?;

    let console = Console::new(io::stdout(), session.stop_handle());
    console.line(&display::banner(&session.target().host, session.target().addr));
    console.finish()?;

    let recv_console = console.clone();
    let finish_console = console.clone();
    session
        .on_recv(move |packet| recv_console.line(&display::reply_line(packet)))
        .on_finish(move |stats| finish_console.line(&display::statistics(stats)));

    session.run().await.map_err(AppError::Run)?;
    console.finish()?;
    Ok(())
}

mod art;
mod cli;
mod common;
mod console;
mod display;
mod error;
mod probe;
mod session;
mod signal;
