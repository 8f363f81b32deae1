//! One probe session against a single target.
//!
//! The session sends one echo per interval until `count` echoes went out
//! or a stop is requested, feeding replies to `on_recv` and the final
//! summary to `on_finish`.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use crate::cli::Options;
use crate::common::{Packet, Statistics, Tally};
use crate::error::ProbeError;
use crate::probe::Probe;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Replies slower than the interval are still awaited up to this long.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

type RecvHook = Box<dyn FnMut(&Packet) + Send>;
type FinishHook = Box<dyn FnOnce(&Statistics) + Send>;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Echoes to send; 0 runs until stopped.
    pub count: u32,
    pub interval: Duration,
    pub reply_timeout: Duration,
    pub privileged: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            count: 0,
            interval: DEFAULT_INTERVAL,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            privileged: false,
        }
    }
}

impl From<&Options> for SessionConfig {
    fn from(opts: &Options) -> Self {
        Self {
            count: opts.count,
            privileged: opts.privileged,
            ..Self::default()
        }
    }
}

/// The host as typed plus the address it resolved to.
#[derive(Debug, Clone)]
pub struct Target {
    pub host: String,
    pub addr: IpAddr,
}

/// Cloneable stop switch, usable from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<StopState>);

#[derive(Debug, Default)]
struct StopState {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopHandle {
    pub fn stop(&self) {
        if !self.0.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!("stop requested");
            self.0.notify.notify_waiters();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.0.stopped.load(Ordering::SeqCst)
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        let notified = self.0.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

pub struct Session<P> {
    probe: P,
    target: Target,
    config: SessionConfig,
    stop: StopHandle,
    on_recv: Option<RecvHook>,
    on_finish: Option<FinishHook>,
}

impl<P: Probe> Session<P> {
    pub fn new(probe: P, target: Target, config: SessionConfig) -> Self {
        Self {
            probe,
            target,
            config,
            stop: StopHandle::default(),
            on_recv: None,
            on_finish: None,
        }
    }

    pub fn on_recv(&mut self, hook: impl FnMut(&Packet) + Send + 'static) -> &mut Self {
        self.on_recv = Some(Box::new(hook));
        self
    }

    pub fn on_finish(&mut self, hook: impl FnOnce(&Statistics) + Send + 'static) -> &mut Self {
        self.on_finish = Some(Box::new(hook));
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Run to completion. `on_finish` fires exactly once, even when the
    /// probe fails part way.
    pub async fn run(mut self) -> Result<Statistics, ProbeError> {
        let mut tally = Tally::default();
        let outcome = self.drive(&mut tally).await;

        let stats = tally.finish(&self.target.host, self.target.addr);
        tracing::debug!(
            addr = %stats.addr,
            samples = stats.rtts.len(),
            loss = stats.packet_loss,
            "session finished"
        );
        if let Some(hook) = self.on_finish.take() {
            hook(&stats);
        }

        outcome.map(|()| stats)
    }

    async fn drive(&mut self, tally: &mut Tally) -> Result<(), ProbeError> {
        let mut seq: u16 = 0;

        loop {
            if self.stop.is_stopped() || self.count_reached(tally) {
                return Ok(());
            }

            let started = Instant::now();
            tally.record_sent();

            let reply = tokio::select! {
                biased;
                _ = self.stop.stopped() => return Ok(()),
                reply = self.probe.echo(seq) => reply?,
            };

            match reply {
                Some(packet) => {
                    tally.record_reply(packet.rtt);
                    if let Some(hook) = self.on_recv.as_mut() {
                        hook(&packet);
                    }
                }
                None => tracing::debug!(seq, addr = %self.target.addr, "request timed out"),
            }

            seq = seq.wrapping_add(1);
            if self.count_reached(tally) {
                return Ok(());
            }

            let pause = self.config.interval.saturating_sub(started.elapsed());
            if pause.is_zero() {
                continue;
            }
            tokio::select! {
                biased;
                _ = self.stop.stopped() => return Ok(()),
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    fn count_reached(&self, tally: &Tally) -> bool {
        self.config.count > 0 && tally.sent() >= self.config.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io;
    use std::net::Ipv4Addr;
    use std::sync::Mutex;

    const ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));

    enum Step {
        Reply(Duration),
        Timeout,
        Fail,
        Hang,
    }

    /// Plays back a fixed script; replies forever once the script runs out.
    struct ScriptedProbe {
        steps: VecDeque<Step>,
        seen: Arc<Mutex<Vec<u16>>>,
        stop_at: Option<(u16, StopHandle)>,
    }

    impl ScriptedProbe {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
                seen: Arc::default(),
                stop_at: None,
            }
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        async fn echo(&mut self, seq: u16) -> Result<Option<Packet>, ProbeError> {
            self.seen.lock().unwrap().push(seq);
            if let Some((at, stop)) = &self.stop_at {
                if *at == seq {
                    stop.stop();
                }
            }
            let packet = |rtt| Packet {
                seq,
                nbytes: 32,
                addr: ADDR,
                ttl: Some(64),
                rtt,
            };
            match self.steps.pop_front() {
                Some(Step::Reply(rtt)) => Ok(Some(packet(rtt))),
                Some(Step::Timeout) => Ok(None),
                Some(Step::Fail) => Err(ProbeError::Socket(io::Error::new(
                    io::ErrorKind::Other,
                    "network is unreachable",
                ))),
                Some(Step::Hang) => std::future::pending().await,
                None => Ok(Some(packet(Duration::from_millis(1)))),
            }
        }
    }

    fn target() -> Target {
        Target {
            host: "example.org".into(),
            addr: ADDR,
        }
    }

    fn config(count: u32) -> SessionConfig {
        SessionConfig {
            count,
            interval: Duration::ZERO,
            ..SessionConfig::default()
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[tokio::test]
    async fn sends_exactly_count_echoes() {
        let probe = ScriptedProbe::new(vec![]);
        let seen = probe.seen.clone();
        let stats = Session::new(probe, target(), config(5)).run().await.unwrap();

        assert_eq!(stats.packets_sent, 5);
        assert_eq!(stats.packets_recv, 5);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn timeouts_count_as_loss() {
        let probe = ScriptedProbe::new(vec![
            Step::Reply(ms(2)),
            Step::Timeout,
            Step::Reply(ms(4)),
            Step::Timeout,
        ]);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        let mut session = Session::new(probe, target(), config(4));
        session.on_recv(move |p| sink.lock().unwrap().push(p.seq));
        let stats = session.run().await.unwrap();

        assert_eq!(*received.lock().unwrap(), vec![0, 2]);
        assert_eq!(stats.packets_sent, 4);
        assert_eq!(stats.packets_recv, 2);
        assert_eq!(stats.packet_loss, 50.0);
        assert_eq!(stats.avg_rtt, ms(3));
    }

    #[tokio::test]
    async fn finish_hook_runs_once_with_final_statistics() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = finished.clone();

        let mut session = Session::new(ScriptedProbe::new(vec![]), target(), config(3));
        session.on_finish(move |s| sink.lock().unwrap().push(s.clone()));
        let stats = session.run().await.unwrap();

        let finished = finished.lock().unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0], stats);
        assert_eq!(finished[0].host, "example.org");
    }

    #[tokio::test]
    async fn stop_before_run_sends_nothing() {
        let probe = ScriptedProbe::new(vec![]);
        let seen = probe.seen.clone();
        let session = Session::new(probe, target(), config(0));
        session.stop_handle().stop();

        let stats = session.run().await.unwrap();
        assert_eq!(stats.packets_sent, 0);
        assert_eq!(stats.packet_loss, 0.0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stop_ends_an_unbounded_run() {
        let mut probe = ScriptedProbe::new(vec![]);
        let session_stop = StopHandle::default();
        probe.stop_at = Some((3, session_stop.clone()));

        let mut session = Session::new(probe, target(), config(0));
        session.stop = session_stop;
        let stats = session.run().await.unwrap();

        assert_eq!(stats.packets_sent, 4);
        assert_eq!(stats.packets_recv, 4);
    }

    #[tokio::test]
    async fn stop_interrupts_a_pending_reply() {
        let probe = ScriptedProbe::new(vec![Step::Reply(ms(1)), Step::Hang]);
        let session = Session::new(probe, target(), config(0));
        let stop = session.stop_handle();

        let run = tokio::spawn(session.run());
        tokio::time::sleep(ms(20)).await;
        stop.stop();

        let stats = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("session did not stop")
            .unwrap()
            .unwrap();
        assert_eq!(stats.packets_sent, 2);
        assert_eq!(stats.packets_recv, 1);
        assert_eq!(stats.packet_loss, 50.0);
    }

    #[tokio::test]
    async fn stop_interrupts_the_interval_sleep() {
        let probe = ScriptedProbe::new(vec![]);
        let session = Session::new(
            probe,
            target(),
            SessionConfig {
                count: 0,
                interval: Duration::from_secs(3600),
                ..SessionConfig::default()
            },
        );
        let stop = session.stop_handle();

        let run = tokio::spawn(session.run());
        tokio::time::sleep(ms(20)).await;
        stop.stop();

        let stats = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("session did not stop")
            .unwrap()
            .unwrap();
        assert_eq!(stats.packets_sent, 1);
    }

    #[tokio::test]
    async fn probe_failure_still_reports_statistics() {
        let probe = ScriptedProbe::new(vec![Step::Reply(ms(1)), Step::Fail]);
        let finished = Arc::new(Mutex::new(None));
        let sink = finished.clone();

        let mut session = Session::new(probe, target(), config(10));
        session.on_finish(move |s| *sink.lock().unwrap() = Some(s.packets_sent));
        let err = session.run().await.unwrap_err();

        assert!(matches!(err, ProbeError::Socket(_)));
        assert_eq!(*finished.lock().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn sequence_numbers_wrap() {
        let probe = ScriptedProbe::new(vec![]);
        let seen = probe.seen.clone();
        let count = u32::from(u16::MAX) + 3;
        let stats = Session::new(probe, target(), config(count)).run().await.unwrap();

        assert_eq!(stats.packets_sent, count);
        let seen = seen.lock().unwrap();
        assert_eq!(&seen[seen.len() - 3..], &[u16::MAX, 0, 1]);
    }

    #[test]
    fn options_map_onto_config() {
        let opts = Options {
            host: "example.org".into(),
            count: 7,
            privileged: true,
        };
        let config = SessionConfig::from(&opts);
        assert_eq!(config.count, 7);
        assert!(config.privileged);
        assert_eq!(config.interval, DEFAULT_INTERVAL);
    }

    #[test]
    fn replies_slower_than_the_interval_are_still_awaited() {
        let config = SessionConfig::default();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert!(config.reply_timeout > config.interval);
    }
}
