//! Steam account identity.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 64-bit Steam account identifier.
///
/// Serialized as a decimal string on the wire: the full 64-bit range does not
/// survive a round-trip through a JSON number in every consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    /// Wrap a raw 64-bit identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SteamId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl Serialize for SteamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u64>()
            .map(SteamId)
            .map_err(|_| D::Error::custom(format!("invalid Steam ID: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_decimal() {
        let id = SteamId::new(76_561_197_960_287_930);
        assert_eq!(id.to_string(), "76561197960287930");
    }

    #[test]
    fn serializes_as_string() {
        let id = SteamId::new(76_561_197_960_287_930);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"76561197960287930\"");
    }

    #[test]
    fn deserializes_from_string() {
        let id: SteamId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(id.as_u64(), 42);
    }

    #[test]
    fn rejects_non_numeric_string() {
        let result = serde_json::from_str::<SteamId>("\"not-an-id\"");
        assert!(result.is_err());
    }

    #[test]
    fn roundtrip_preserves_full_range() {
        let id = SteamId::new(u64::MAX);
        let json = serde_json::to_string(&id).unwrap();
        let back: SteamId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
