//! Serde helpers for human-readable durations in configuration.

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Serialize a `Duration` as a humantime string, accept either seconds or a
/// humantime string when deserializing (`30`, `"30s"`, `"1m 30s"`).
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as seconds (number) or human-readable string (e.g., '30s', '2m')",
                )
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| de::Error::custom(format!("Negative duration: {seconds}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(with = "super::duration")]
        timeout: Duration,
    }

    #[test]
    fn test_parse_human_readable() {
        let holder: Holder = toml::from_str("timeout = \"1m 30s\"").unwrap();
        assert_eq!(holder.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_parse_seconds() {
        let holder: Holder = toml::from_str("timeout = 45").unwrap();
        assert_eq!(holder.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(toml::from_str::<Holder>("timeout = \"soon\"").is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let holder = Holder {
            timeout: Duration::from_secs(30),
        };
        let text = toml::to_string(&holder).unwrap();
        assert!(text.contains("30s"));
        assert_eq!(toml::from_str::<Holder>(&text).unwrap(), holder);
    }
}
