//! Console lines for the banner, each reply and the closing summary.

use std::net::IpAddr;

use colored::Colorize;

use crate::art;
use crate::common::{Packet, Statistics};

pub fn banner(host: &str, addr: IpAddr) -> String {
    format!("PING {host} ({addr}) type `Ctrl-C` to abort")
        .white()
        .bold()
        .to_string()
}

pub fn reply_line(packet: &Packet) -> String {
    let ttl = match packet.ttl {
        Some(ttl) => format!(" ttl={}", ttl.to_string().cyan().bold()),
        None => String::new(),
    };

    format!(
        "{} seq={} {}bytes from {}:{} time={}",
        art::render_row(usize::from(packet.seq)),
        packet.seq.to_string().yellow().bold(),
        packet.nbytes.to_string().blue().bold(),
        packet.addr.to_string().white().bold(),
        ttl,
        format!("{:?}", packet.rtt).magenta().bold(),
    )
}

pub fn statistics(stats: &Statistics) -> String {
    let title = format!("───────── {} ping statistics ─────────", stats.host)
        .white()
        .bold();
    let packets = format!(
        "{}: {} transmitted => {} received ({} loss)",
        "PACKET STATISTICS".white().bold(),
        stats.packets_sent.to_string().blue().bold(),
        stats.packets_recv.to_string().green().bold(),
        format!("{}%", stats.packet_loss).red().bold(),
    );
    let round_trip = format!(
        "{}: min={} avg={} max={} stddev={}",
        "ROUND TRIP".white().bold(),
        format!("{:?}", stats.min_rtt).blue().bold(),
        format!("{:?}", stats.avg_rtt).cyan().bold(),
        format!("{:?}", stats.max_rtt).green().bold(),
        format!("{:?}", stats.stddev_rtt).magenta().bold(),
    );

    format!("\n{title}\n{packets}\n{round_trip}")
}
