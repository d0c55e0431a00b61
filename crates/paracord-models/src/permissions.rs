use bitflags::bitflags;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Permission bitmask as carried on the wire.
    ///
    /// Bits outside the named flags are kept as-is so payloads from newer
    /// servers survive a decode/encode round trip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1 << 0;
        const KICK_MEMBERS         = 1 << 1;
        const BAN_MEMBERS          = 1 << 2;
        const ADMINISTRATOR        = 1 << 3;
        const MANAGE_CHANNELS      = 1 << 4;
        const MANAGE_GUILD         = 1 << 5;
        const ADD_REACTIONS        = 1 << 6;
        const VIEW_AUDIT_LOG       = 1 << 7;
        const PRIORITY_SPEAKER     = 1 << 8;
        const STREAM               = 1 << 9;
        const VIEW_CHANNEL         = 1 << 10;
        const SEND_MESSAGES        = 1 << 11;
        const SEND_TTS_MESSAGES    = 1 << 12;
        const MANAGE_MESSAGES      = 1 << 13;
        const EMBED_LINKS          = 1 << 14;
        const ATTACH_FILES         = 1 << 15;
        const READ_MESSAGE_HISTORY = 1 << 16;
        const MENTION_EVERYONE     = 1 << 17;
        const USE_EXTERNAL_EMOJIS  = 1 << 18;
        const VIEW_GUILD_INSIGHTS  = 1 << 19;
        const CONNECT              = 1 << 20;
        const SPEAK                = 1 << 21;
        const MUTE_MEMBERS         = 1 << 22;
        const DEAFEN_MEMBERS       = 1 << 23;
        const MOVE_MEMBERS         = 1 << 24;
        const USE_VAD              = 1 << 25;
        const CHANGE_NICKNAME      = 1 << 26;
        const MANAGE_NICKNAMES     = 1 << 27;
        const MANAGE_ROLES         = 1 << 28;
        const MANAGE_WEBHOOKS      = 1 << 29;
        const MANAGE_EMOJIS        = 1 << 30;
    }
}

impl Permissions {
    /// OR a list of flags together. An empty list encodes to zero.
    pub fn encode(flags: &[Permissions]) -> Self {
        flags
            .iter()
            .fold(Self::empty(), |acc, flag| acc | *flag)
    }

    /// Split a mask into single-bit sets, lowest bit first.
    pub fn decode(self) -> Vec<Permissions> {
        let bits = self.bits();
        (0..u64::BITS)
            .map(|shift| 1u64 << shift)
            .filter(|bit| bits & bit != 0)
            .map(Self::from_bits_retain)
            .collect()
    }

    /// True if any bit of `flag` is set in this mask.
    pub fn has(self, flag: Permissions) -> bool {
        self.intersects(flag)
    }

    /// Canonical name of a single named flag, e.g. `"VIEW_CHANNEL"`.
    pub fn name(self) -> Option<&'static str> {
        let mut names = self.iter_names();
        match (names.next(), names.next()) {
            (Some((name, flag)), None) if flag == self => Some(name),
            _ => None,
        }
    }

    /// Re-derive a mask by passing it through `decode` then `encode`.
    pub fn normalize(self) -> Self {
        Self::encode(&self.decode())
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.bits().to_string())
    }
}

struct PermissionsVisitor;

impl<'de> Visitor<'de> for PermissionsVisitor {
    type Value = Permissions;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative integer or decimal string bitmask")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Permissions, E> {
        Ok(Permissions::from_bits_retain(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Permissions, E> {
        u64::try_from(value)
            .map(Permissions::from_bits_retain)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Permissions, E> {
        value
            .trim()
            .parse::<u64>()
            .map(Permissions::from_bits_retain)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PermissionsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &[Permissions] = &[
        Permissions::VIEW_CHANNEL,
        Permissions::SEND_MESSAGES,
        Permissions::MANAGE_WEBHOOKS,
    ];

    #[test]
    fn encode_empty_is_zero() {
        assert_eq!(Permissions::encode(&[]).bits(), 0);
    }

    #[test]
    fn encode_ors_flags() {
        let set = Permissions::encode(KNOWN);
        assert_eq!(set.bits(), (1 << 10) | (1 << 11) | (1 << 29));
    }

    #[test]
    fn decode_encode_preserves_membership() {
        let set = Permissions::encode(KNOWN).normalize();
        for flag in Permissions::all().iter() {
            assert_eq!(set.has(flag), KNOWN.contains(&flag), "{:?}", flag.name());
        }
    }

    #[test]
    fn unknown_bits_survive_round_trip() {
        let raw = (1u64 << 40) | Permissions::VIEW_CHANNEL.bits();
        let set = Permissions::from_bits_retain(raw);
        assert_eq!(set.decode().len(), 2);
        assert_eq!(set.normalize().bits(), raw);
    }

    #[test]
    fn name_of_single_flag() {
        assert_eq!(Permissions::VIEW_CHANNEL.name(), Some("VIEW_CHANNEL"));
        assert_eq!(
            (Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES).name(),
            None
        );
    }

    #[test]
    fn deserializes_from_integer_or_string() {
        let from_int: Permissions = serde_json::from_str("1024").unwrap();
        let from_str: Permissions = serde_json::from_str("\"1024\"").unwrap();
        assert_eq!(from_int, Permissions::VIEW_CHANNEL);
        assert_eq!(from_str, Permissions::VIEW_CHANNEL);
        assert!(serde_json::from_str::<Permissions>("-1").is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Permissions::SEND_MESSAGES).unwrap();
        assert_eq!(json, "\"2048\"");
    }
}
