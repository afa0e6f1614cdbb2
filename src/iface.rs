use std::net::{IpAddr, Ipv4Addr};

use pnet::datalink::{self, NetworkInterface};

use crate::error::WolError;

fn ipv4_broadcast(iface: &NetworkInterface) -> Option<Ipv4Addr> {
    iface.ips.iter()
        .filter(|net| net.is_ipv4())
        .find_map(|net| match net.broadcast() {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
}

/// Broadcast address of the first IPv4 network configured on interface `name`.
pub fn interface_broadcast(name: &str) -> Result<Ipv4Addr, WolError> {
    let iface = datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
        .ok_or_else(|| WolError::UnknownInterface(name.to_string()))?;

    let addr = ipv4_broadcast(&iface)
        .ok_or_else(|| WolError::NoIpv4Network(name.to_string()))?;
    log::debug!("interface '{}' broadcast address is {}", iface.name, addr);

    Ok(addr)
}
