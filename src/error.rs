use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WolError {
    #[error("invalid MAC address format '{0}', expected e.g. 'AA-BB-CC-DD-EE-FF'")]
    InvalidAddressFormat(String),
    #[error("invalid broadcast address '{0}'")]
    InvalidBroadcastAddress(String),
    #[error("socket creation failed")]
    SocketCreate(#[source] io::Error),
    #[error("enabling broadcast mode (SO_BROADCAST) failed")]
    EnableBroadcast(#[source] io::Error),
    #[error("sendto failed")]
    Send(#[source] io::Error),
    #[error("short send: {sent} of {expected} bytes sent")]
    ShortSend { sent: usize, expected: usize },
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
    #[error("no network interface named '{0}'")]
    UnknownInterface(String),
    #[error("interface '{0}' has no IPv4 network")]
    NoIpv4Network(String),
}

impl WolError {
    /// Raw OS error code of the underlying socket failure, if there is one.
    pub fn os_error(&self) -> Option<i32> {
        match self {
            WolError::SocketCreate(e) | WolError::EnableBroadcast(e) | WolError::Send(e) => e.raw_os_error(),
            _ => None,
        }
    }
}
