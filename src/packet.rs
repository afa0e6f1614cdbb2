use crate::common::{MAC_REPETITIONS, MAGIC_PACKET_LEN, SYNC_STREAM};
use crate::hwaddr::HardwareAddress;

/// Wake-on-LAN payload: the sync stream followed by 16 copies of the target address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(mac: &HardwareAddress) -> Self {
        let mut buf = [0u8; MAGIC_PACKET_LEN];
        buf[..SYNC_STREAM.len()].copy_from_slice(&SYNC_STREAM);

        for i in 0..MAC_REPETITIONS {
            let offset = SYNC_STREAM.len() + i * HardwareAddress::LENGTH;
            buf[offset..offset + HardwareAddress::LENGTH].copy_from_slice(mac.as_bytes());
        }

        MagicPacket(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn target(&self) -> HardwareAddress {
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&self.0[6..12]);
        HardwareAddress::from(bytes)
    }

    /// Hex dump, one 6-byte block per line.
    pub fn to_hex(&self) -> String {
        self.0.chunks(6)
            .map(|block| block.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
