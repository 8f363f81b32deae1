use std::net::IpAddr;
use std::time::Duration;

/// A received echo reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub seq: u16,
    /// Size of the ICMP message, header included.
    pub nbytes: usize,
    pub addr: IpAddr,
    /// Unknown on datagram sockets that strip the IP header.
    pub ttl: Option<u8>,
    pub rtt: Duration,
}

/// Summary handed to the finish hook once a session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub host: String,
    pub addr: IpAddr,
    pub packets_sent: u32,
    pub packets_recv: u32,
    /// Percentage of sent echoes that never got a reply.
    pub packet_loss: f64,
    pub rtts: Vec<Duration>,
    pub min_rtt: Duration,
    pub avg_rtt: Duration,
    pub max_rtt: Duration,
    pub stddev_rtt: Duration,
}

/// Running counters for a session.
#[derive(Debug, Default)]
pub struct Tally {
    sent: u32,
    rtts: Vec<Duration>,
}

impl Tally {
    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn record_sent(&mut self) {
        self.sent = self.sent.saturating_add(1);
    }

    pub fn record_reply(&mut self, rtt: Duration) {
        self.rtts.push(rtt);
    }

    pub fn finish(self, host: &str, addr: IpAddr) -> Statistics {
        let recv = self.rtts.len() as u32;
        let packet_loss = if self.sent == 0 {
            0.0
        } else {
            f64::from(self.sent.saturating_sub(recv)) / f64::from(self.sent) * 100.0
        };

        let (min_rtt, avg_rtt, max_rtt, stddev_rtt) = rtt_summary(&self.rtts);

        Statistics {
            host: host.to_string(),
            addr,
            packets_sent: self.sent,
            packets_recv: recv,
            packet_loss,
            rtts: self.rtts,
            min_rtt,
            avg_rtt,
            max_rtt,
            stddev_rtt,
        }
    }
}

// min, avg, max, population stddev
fn rtt_summary(rtts: &[Duration]) -> (Duration, Duration, Duration, Duration) {
    if rtts.is_empty() {
        return (Duration::ZERO, Duration::ZERO, Duration::ZERO, Duration::ZERO);
    }

    let min = rtts.iter().copied().min().unwrap_or_default();
    let max = rtts.iter().copied().max().unwrap_or_default();
    let total: Duration = rtts.iter().sum();
    let avg = total / rtts.len() as u32;

    let n = rtts.len() as f64;
    let mean = total.as_nanos() as f64 / n;
    let variance = rtts
        .iter()
        .map(|rtt| {
            let delta = rtt.as_nanos() as f64 - mean;
            delta * delta
        })
        .sum::<f64>()
        / n;
    let stddev = Duration::from_nanos(variance.sqrt().round() as u64);

    (min, avg, max, stddev)
}
