//! Snowflake ID Generator
//!
//! Time-ordered 64-bit IDs: 41 bits of milliseconds since the configured
//! epoch, 5 bits machine, 5 bits node, 12 bits sequence.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const SEQUENCE_MASK: u64 = 0xFFF;

/// Snowflake ID generator
pub struct SnowflakeGenerator {
    epoch: u64,
    machine_id: u64,
    node_id: u64,
    state: Mutex<GeneratorState>,
}

#[derive(Default)]
struct GeneratorState {
    last_timestamp: u64,
    sequence: u64,
}

impl SnowflakeGenerator {
    /// Create a new snowflake generator
    pub fn new(epoch: u64, machine_id: u64, node_id: u64) -> Self {
        Self {
            epoch,
            machine_id: machine_id & 0x1F, // 5 bits
            node_id: node_id & 0x1F,       // 5 bits
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Generate a new snowflake ID
    pub fn generate(&self) -> i64 {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut timestamp = current_timestamp().max(state.last_timestamp);

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond
                while timestamp <= state.last_timestamp {
                    std::hint::spin_loop();
                    timestamp = current_timestamp();
                }
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = timestamp;

        let id = (timestamp.saturating_sub(self.epoch) << 22)
            | (self.machine_id << 17)
            | (self.node_id << 12)
            | state.sequence;

        id as i64
    }

    /// Extract the creation timestamp (Unix milliseconds) from an ID
    pub fn extract_timestamp(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> 22) + self.epoch
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Parse a snowflake from its string form
pub fn parse_id(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Serde helpers: snowflakes travel as JSON strings.
///
/// Deserialization also accepts JSON numbers.
pub mod serde_id {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum RawId {
        Text(String),
        Number(i64),
    }

    impl RawId {
        pub(super) fn into_id(self) -> Option<i64> {
            match self {
                RawId::Text(s) => super::parse_id(&s),
                RawId::Number(n) => Some(n).filter(|id| *id > 0),
            }
        }
    }

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        RawId::deserialize(deserializer)?
            .into_id()
            .ok_or_else(|| D::Error::custom("invalid id"))
    }
}

/// Optional snowflake, see [`serde_id`].
pub mod serde_opt_id {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::serde_id::RawId;

    pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_str(&id.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<RawId>::deserialize(deserializer)? {
            Some(raw) => raw
                .into_id()
                .map(Some)
                .ok_or_else(|| D::Error::custom("invalid id")),
            None => Ok(None),
        }
    }
}

/// List of snowflakes, see [`serde_id`].
pub mod serde_ids {
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    use super::serde_id::RawId;

    pub fn serialize<S: Serializer>(ids: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(ids.len()))?;
        for id in ids {
            seq.serialize_element(&id.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        Vec::<RawId>::deserialize(deserializer)?
            .into_iter()
            .map(|raw| raw.into_id().ok_or_else(|| D::Error::custom("invalid id")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const EPOCH: u64 = 1_577_836_800_000;

    #[test]
    fn test_generate_unique() {
        let gen = SnowflakeGenerator::new(EPOCH, 1, 1);
        let ids: HashSet<i64> = (0..10_000).map(|_| gen.generate()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_ids_are_increasing() {
        let gen = SnowflakeGenerator::new(EPOCH, 3, 0);
        let first = gen.generate();
        let second = gen.generate();
        assert!(second > first);
    }

    #[test]
    fn test_extract_timestamp() {
        let gen = SnowflakeGenerator::new(EPOCH, 1, 1);
        let id = gen.generate();
        let ts = gen.extract_timestamp(id);
        let now = current_timestamp();
        assert!(ts <= now);
        assert!(ts > now - 1000);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Payload {
        #[serde(with = "serde_id")]
        id: i64,
        #[serde(with = "serde_opt_id", default)]
        parent: Option<i64>,
        #[serde(with = "serde_ids")]
        children: Vec<i64>,
    }

    #[test]
    fn test_ids_serialize_as_strings() {
        let payload = Payload {
            id: 1,
            parent: None,
            children: vec![2, 3],
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"id": "1", "parent": null, "children": ["2", "3"]})
        );
    }

    #[test]
    fn test_ids_deserialize_from_strings_and_numbers() {
        let payload: Payload =
            serde_json::from_str(r#"{"id": 1, "parent": "9", "children": ["2", 3]}"#).unwrap();
        assert_eq!(payload.id, 1);
        assert_eq!(payload.parent, Some(9));
        assert_eq!(payload.children, vec![2, 3]);

        let missing: Payload = serde_json::from_str(r#"{"id": "1", "children": []}"#).unwrap();
        assert_eq!(missing.parent, None);
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        assert!(serde_json::from_str::<Payload>(r#"{"id": "x", "children": []}"#).is_err());
        assert!(serde_json::from_str::<Payload>(r#"{"id": -1, "children": []}"#).is_err());
    }
}
