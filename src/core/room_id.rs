use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ROOM_ID_ALPHABET, ROOM_ID_LEN};

/// Short room code shared between the two players (6 lowercase base-36 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Parse and validate a room code
    ///
    /// # Errors
    ///
    /// Returns an error if the length or alphabet is wrong
    pub fn parse(value: &str) -> Result<Self, String> {
        if value.len() != ROOM_ID_LEN {
            return Err(format!(
                "room id must be {} characters, got {}",
                ROOM_ID_LEN,
                value.len()
            ));
        }

        if let Some(ch) = value.chars().find(|ch| !ROOM_ID_ALPHABET.contains(*ch)) {
            return Err(format!("invalid character '{}' in room id", ch));
        }

        Ok(Self(value.to_string()))
    }

    /// Draw a fresh random room code
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let alphabet = ROOM_ID_ALPHABET.as_bytes();
        let code = (0..ROOM_ID_LEN)
            .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for RoomId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}
