//! Ethernet hardware address

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 48-bit Ethernet address
///
/// # Examples
///
/// ```
/// use ethphy_core::EthAddr;
///
/// let addr: EthAddr = "00:1c:73:01:02:03".parse().unwrap();
/// assert_eq!(addr.to_string(), "00:1c:73:01:02:03");
///
/// let same: EthAddr = "00-1C-73-01-02-03".parse().unwrap();
/// assert_eq!(addr, same);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EthAddr([u8; 6]);

impl EthAddr {
    /// The all-zero address
    pub const ZERO: EthAddr = EthAddr([0; 6]);

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the address
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// True for the all-zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    /// True if the group bit of the first octet is set
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for EthAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl FromStr for EthAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let separator = if s.contains(':') { ':' } else { '-' };

        let mut bytes = [0u8; 6];
        let mut parts = s.split(separator);
        for byte in bytes.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| crate::Error::invalid_input(format!("invalid Ethernet address: {}", s)))?;
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::invalid_input(format!("invalid Ethernet address: {}", s)))?;
        }
        if parts.next().is_some() {
            return Err(crate::Error::invalid_input(format!("invalid Ethernet address: {}", s)));
        }

        Ok(Self(bytes))
    }
}

impl TryFrom<String> for EthAddr {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EthAddr> for String {
    fn from(addr: EthAddr) -> String {
        addr.to_string()
    }
}

impl From<[u8; 6]> for EthAddr {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let addr: EthAddr = "de:ad:be:ef:00:01".parse().unwrap();
        assert_eq!(addr.as_bytes(), &[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(addr.to_string(), "de:ad:be:ef:00:01");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("de:ad:be:ef:00".parse::<EthAddr>().is_err());
        assert!("de:ad:be:ef:00:01:02".parse::<EthAddr>().is_err());
        assert!("zz:ad:be:ef:00:01".parse::<EthAddr>().is_err());
    }

    #[test]
    fn test_flags() {
        assert!(EthAddr::ZERO.is_zero());
        assert!(EthAddr::new([0x01, 0, 0x5e, 0, 0, 1]).is_multicast());
        assert!(!EthAddr::new([0x00, 0x1c, 0x73, 0, 0, 1]).is_multicast());
    }
}
