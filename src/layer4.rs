use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tokio::net::UdpSocket;

use crate::common::{MAGIC_PACKET_LEN, WOL_PORT};
use crate::error::WolError;
use crate::packet::MagicPacket;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// IPv4 broadcast address the magic packet is sent to, always on port 9.
///
/// Unlike `inet_addr`, whose `INADDR_NONE` result makes `255.255.255.255` unusable, the limited
/// broadcast address is accepted and `0.0.0.0` is rejected as "no address".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct BroadcastTarget(Ipv4Addr);

impl BroadcastTarget {
    pub fn addr(&self) -> Ipv4Addr {
        self.0
    }

    pub fn socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.0, WOL_PORT)
    }
}

impl FromStr for BroadcastTarget {
    type Err = WolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Ipv4Addr>() {
            Ok(addr) if !addr.is_unspecified() => Ok(BroadcastTarget(addr)),
            _ => Err(WolError::InvalidBroadcastAddress(s.to_string())),
        }
    }
}

impl TryFrom<String> for BroadcastTarget {
    type Error = WolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Ipv4Addr> for BroadcastTarget {
    fn from(addr: Ipv4Addr) -> Self {
        BroadcastTarget(addr)
    }
}

impl fmt::Display for BroadcastTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}

#[derive(Debug, Clone)]
pub struct SendOptions {
    pub bind_addr: Ipv4Addr,
    pub timeout: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            bind_addr: Ipv4Addr::UNSPECIFIED,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Sends `packet` as a single broadcast datagram to `target` and returns the number of bytes sent.
///
/// The socket lives only for the duration of this call and is closed on every return path.
pub async fn send_magic_packet(target: &BroadcastTarget, packet: &MagicPacket, opts: &SendOptions) -> Result<usize, WolError> {
    transmit(SocketAddr::V4(target.socket_addr()), packet, opts).await
}

async fn transmit(dest: SocketAddr, packet: &MagicPacket, opts: &SendOptions) -> Result<usize, WolError> {
    let sock = UdpSocket::bind((opts.bind_addr, 0)).await
        .map_err(WolError::SocketCreate)?;
    sock.set_broadcast(true)
        .map_err(WolError::EnableBroadcast)?;

    if let Ok(local) = sock.local_addr() {
        log::debug!("[sender] sending magic packet for {} from {} to {}", packet.target(), local, dest);
    }

    let sent = match tokio::time::timeout(opts.timeout, sock.send_to(packet.as_bytes(), dest)).await {
        Ok(res) => res.map_err(WolError::Send)?,
        Err(_) => return Err(WolError::Timeout(opts.timeout)),
    };
    log::trace!("[sender] sendto returned {}", sent);

    if sent != MAGIC_PACKET_LEN {
        return Err(WolError::ShortSend { sent, expected: MAGIC_PACKET_LEN });
    }

    Ok(sent)
}
