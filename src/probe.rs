//! ICMP echo probing.
//!
//! Packet construction, the socket and reply matching belong to
//! `surge-ping`; this module only resolves the target and adapts replies
//! into [`Packet`]s.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use pnet_packet::icmp::IcmpTypes;
use pnet_packet::icmpv6::Icmpv6Types;
use socket2::Type;
use surge_ping::{
    Client, Config, IcmpPacket, PingIdentifier, PingSequence, Pinger, SurgeError, ICMP,
};

use crate::common::Packet;
use crate::error::ProbeError;

/// Echo payload length in bytes.
pub const PAYLOAD_SIZE: usize = 24;

/// Sends one echo request per call.
#[async_trait]
pub trait Probe: Send {
    /// Returns `Ok(None)` when no reply arrived in time.
    async fn echo(&mut self, seq: u16) -> Result<Option<Packet>, ProbeError>;
}

/// Resolve a host name or literal address to a single IP.
pub async fn resolve(host: &str) -> Result<IpAddr, ProbeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let mut addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|source| ProbeError::Resolve {
            host: host.to_string(),
            source,
        })?;
    addrs
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| ProbeError::NoAddress(host.to_string()))
}

pub struct SurgeProbe {
    // keeps the socket and its receive task alive
    _client: Client,
    pinger: Pinger,
    payload: [u8; PAYLOAD_SIZE],
}

impl SurgeProbe {
    /// Open an ICMP client for `addr`'s family. Privileged mode uses a raw
    /// socket, otherwise an unprivileged datagram ICMP socket.
    pub async fn connect(
        addr: IpAddr,
        privileged: bool,
        reply_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let kind = match addr {
            IpAddr::V4(_) => ICMP::V4,
            IpAddr::V6(_) => ICMP::V6,
        };
        let sock_type = if privileged { Type::RAW } else { Type::DGRAM };
        tracing::debug!(%addr, privileged, "opening ICMP socket");

        let config = Config::builder().kind(kind).sock_type_hint(sock_type).build();
        let client = Client::new(&config).map_err(ProbeError::Socket)?;

        let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
        pinger.timeout(reply_timeout);

        Ok(Self {
            _client: client,
            pinger,
            payload: [0; PAYLOAD_SIZE],
        })
    }
}

#[async_trait]
impl Probe for SurgeProbe {
    async fn echo(&mut self, seq: u16) -> Result<Option<Packet>, ProbeError> {
        match self.pinger.ping(PingSequence(seq), &self.payload).await {
            Ok((reply, rtt)) => Ok(to_packet(reply, rtt)),
            Err(SurgeError::Timeout { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Only echo replies count; errors such as Destination Unreachable that
/// match our identifier and sequence are treated as no reply.
fn to_packet(reply: IcmpPacket, rtt: Duration) -> Option<Packet> {
    match reply {
        IcmpPacket::V4(pkt) => {
            if pkt.get_icmp_type() != IcmpTypes::EchoReply {
                tracing::debug!(
                    seq = pkt.get_sequence().0,
                    icmp_type = pkt.get_icmp_type().0,
                    addr = %pkt.get_source(),
                    "ignoring non echo reply"
                );
                return None;
            }
            Some(Packet {
                seq: pkt.get_sequence().0,
                nbytes: pkt.get_size(),
                addr: IpAddr::V4(pkt.get_source()),
                ttl: pkt.get_ttl(),
                rtt,
            })
        }
        IcmpPacket::V6(pkt) => {
            if pkt.get_icmpv6_type() != Icmpv6Types::EchoReply {
                tracing::debug!(
                    seq = pkt.get_sequence().0,
                    icmp_type = pkt.get_icmpv6_type().0,
                    addr = %pkt.get_source(),
                    "ignoring non echo reply"
                );
                return None;
            }
            // the kernel strips the IPv6 header, so the hop limit is unknown
            Some(Packet {
                seq: pkt.get_sequence().0,
                nbytes: pkt.get_size(),
                addr: IpAddr::V6(pkt.get_source()),
                ttl: None,
                rtt,
            })
        }
    }
}
