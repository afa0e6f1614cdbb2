use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::WolError;

/// 48-bit hardware (MAC) address of the machine to wake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct HardwareAddress([u8; 6]);

impl HardwareAddress {
    pub const LENGTH: usize = 6;

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

/// Value of a single ASCII hex digit, `None` for anything else.
fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl FromStr for HardwareAddress {
    type Err = WolError;

    /// Accepts `AA-BB-CC-DD-EE-FF`, `aa:bb:cc:dd:ee:ff` or `AABBCCDDEEFF`.
    ///
    /// Only ':' and '-' are stripped, any other separator is a format error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WolError::InvalidAddressFormat(s.to_string());

        let clean: Vec<u8> = s.bytes()
            .filter(|&b| b != b':' && b != b'-')
            .collect();
        if clean.len() != Self::LENGTH * 2 {
            return Err(invalid());
        }

        let mut bytes = [0u8; 6];
        for (byte, pair) in bytes.iter_mut().zip(clean.chunks(2)) {
            let hi = hex_nibble(pair[0]).ok_or_else(invalid)?;
            let lo = hex_nibble(pair[1]).ok_or_else(invalid)?;
            *byte = hi << 4 | lo;
        }

        Ok(HardwareAddress(bytes))
    }
}

impl TryFrom<String> for HardwareAddress {
    type Error = WolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<[u8; 6]> for HardwareAddress {
    fn from(bytes: [u8; 6]) -> Self {
        HardwareAddress(bytes)
    }
}

impl fmt::Display for HardwareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", b[0], b[1], b[2], b[3], b[4], b[5])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: [u8; 6] = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];

    #[test]
    fn parses_any_separator_and_case() {
        for s in ["AA-BB-CC-DD-EE-FF", "aa:bb:cc:dd:ee:ff", "AABBCCDDEEFF", "aA:Bb-cC:dD-Ee:fF"] {
            let mac: HardwareAddress = s.parse().unwrap();
            assert_eq!(mac.as_bytes(), &EXPECTED, "input {s}");
        }
    }

    #[test]
    fn decodes_high_nibble_first() {
        let mac: HardwareAddress = "01-23-45-67-89-ab".parse().unwrap();
        assert_eq!(mac.as_bytes(), &[0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]);
    }

    #[test]
    fn rejects_wrong_length() {
        for s in ["AA-BB-CC-DD-EE", "AA-BB-CC-DD-EE-FF-00", "", "::--"] {
            assert!(matches!(s.parse::<HardwareAddress>(), Err(WolError::InvalidAddressFormat(_))), "input {s}");
        }
    }

    #[test]
    fn rejects_non_hex() {
        for s in ["ZZ-BB-CC-DD-EE-FF", "AA BB CC DD EE FF", "AA.BB.CC.DD.EE.FF", "AABBCCDDEEFG"] {
            assert!(matches!(s.parse::<HardwareAddress>(), Err(WolError::InvalidAddressFormat(_))), "input {s}");
        }
    }

    #[test]
    fn rejects_multibyte_chars() {
        assert!("AABBCCDDEEé".parse::<HardwareAddress>().is_err());
    }

    #[test]
    fn error_keeps_input() {
        match "nope".parse::<HardwareAddress>() {
            Err(WolError::InvalidAddressFormat(s)) => assert_eq!(s, "nope"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn display_is_colon_separated_upper() {
        let mac = HardwareAddress::from([0x0a, 0x1b, 0x2c, 0x3d, 0x4e, 0x5f]);
        assert_eq!(mac.to_string(), "0A:1B:2C:3D:4E:5F");
    }
}
