use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque token naming one interactive terminal session.
///
/// Generated when a connection is accepted and sent to the client in the
/// `connected` frame. On the wire it is the hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

/// Parses the string a client received in its `connected` frame.
impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_v4() {
        assert_eq!(SessionId::new().as_uuid().get_version_num(), 4);
    }

    #[test]
    fn session_ids_differ() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn display_is_hyphenated_uuid() {
        let sid = SessionId::new();
        let shown = sid.to_string();
        assert_eq!(shown.len(), 36);
        assert_eq!(shown.matches('-').count(), 4);
    }

    #[test]
    fn parse_round_trips_display() {
        let sid = SessionId::new();
        let parsed: SessionId = sid.to_string().parse().unwrap();
        assert_eq!(parsed, sid);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[test]
    fn wire_form_is_a_plain_string() {
        let sid = SessionId::new();
        let json = serde_json::to_value(sid).unwrap();
        assert_eq!(json, serde_json::Value::String(sid.to_string()));
    }

    #[test]
    fn usable_as_map_key() {
        use std::collections::HashMap;
        let sid = SessionId::new();
        let mut map = HashMap::new();
        map.insert(sid, "shell");
        map.insert(sid, "shell again");
        assert_eq!(map.len(), 1);
    }
}
