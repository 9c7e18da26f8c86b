//! Snowflake ID - the platform's 64-bit unique identifier
//!
//! Structure:
//! - Bits 63-22: Timestamp (milliseconds since [`Snowflake::EPOCH`])
//! - Bits 21-17: Internal worker ID
//! - Bits 16-12: Internal process ID
//! - Bits 11-0:  Increment, bumped for every ID generated on that process

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Time-ordered 64-bit identifier, the lookup key for every entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Platform epoch: 2015-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: u64 = 1_420_070_400_000;

    /// Bits below the timestamp
    const TIMESTAMP_SHIFT: u32 = 22;

    /// Create a new Snowflake from a raw u64 value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Check if the Snowflake is zero (uninitialized)
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Extract timestamp (milliseconds since Unix epoch)
    #[inline]
    pub const fn timestamp(&self) -> u64 {
        (self.0 >> Self::TIMESTAMP_SHIFT) + Self::EPOCH
    }

    /// Extract internal worker ID (0-31)
    #[inline]
    pub const fn worker_id(&self) -> u8 {
        ((self.0 >> 17) & 0x1F) as u8
    }

    /// Extract internal process ID (0-31)
    #[inline]
    pub const fn process_id(&self) -> u8 {
        ((self.0 >> 12) & 0x1F) as u8
    }

    /// Extract the per-process increment (0-4095)
    #[inline]
    pub const fn increment(&self) -> u16 {
        (self.0 & 0xFFF) as u16
    }

    /// Convert timestamp to `DateTime<Utc>`
    pub fn created_at(&self) -> DateTime<Utc> {
        let millis = i64::try_from(self.timestamp()).unwrap_or(i64::MAX);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }

    /// Build a pseudo-ID for a point in time, for use as a range bound
    ///
    /// The low 22 bits are zero, or all ones when `high` is set so the bound
    /// includes every ID generated in that millisecond. Times before the epoch
    /// clamp to the epoch.
    pub fn from_datetime(at: DateTime<Utc>, high: bool) -> Self {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        let since_epoch = millis.saturating_sub(Self::EPOCH);
        let low = if high { (1 << Self::TIMESTAMP_SHIFT) - 1 } else { 0 };
        Self((since_epoch << Self::TIMESTAMP_SHIFT) | low)
    }

    /// Index of the shard that owns this ID when used as a guild ID
    ///
    /// A shard count of zero is treated as one.
    #[inline]
    pub const fn shard_id(&self, shard_count: u32) -> u32 {
        let count = if shard_count == 0 { 1 } else { shard_count as u64 };
        ((self.0 >> Self::TIMESTAMP_SHIFT) % count) as u32
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a snowflake ID")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("negative snowflake"))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                value
                    .parse::<u64>()
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("invalid snowflake string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Real ID from the platform's API documentation
    const DOC_ID: u64 = 175_928_847_299_117_063;

    #[test]
    fn test_snowflake_creation() {
        let sf = Snowflake::new(123_456_789);
        assert_eq!(sf.into_inner(), 123_456_789);
        assert!(!sf.is_zero());
        assert!(Snowflake::default().is_zero());
    }

    #[test]
    fn test_snowflake_parse() {
        let sf = Snowflake::parse("123456789").unwrap();
        assert_eq!(sf.into_inner(), 123_456_789);

        assert!(Snowflake::parse("invalid").is_err());
        assert!(Snowflake::parse("-1").is_err());
    }

    #[test]
    fn test_snowflake_fields() {
        let sf = Snowflake::new(DOC_ID);
        assert_eq!(sf.timestamp(), 1_462_015_105_796);
        assert_eq!(sf.worker_id(), 1);
        assert_eq!(sf.process_id(), 0);
        assert_eq!(sf.increment(), 7);
    }

    #[test]
    fn test_created_at() {
        let sf = Snowflake::new(DOC_ID);
        assert_eq!(sf.created_at().timestamp_millis(), 1_462_015_105_796);
        assert_eq!(Snowflake::new(0).created_at().timestamp_millis(), 1_420_070_400_000);
    }

    #[test]
    fn test_from_datetime_bounds() {
        let at = Snowflake::new(DOC_ID).created_at();
        let low = Snowflake::from_datetime(at, false);
        let high = Snowflake::from_datetime(at, true);

        assert_eq!(low.timestamp(), 1_462_015_105_796);
        assert_eq!(low.into_inner() & 0x3F_FFFF, 0);
        assert_eq!(high.into_inner() & 0x3F_FFFF, 0x3F_FFFF);
        assert!(low <= Snowflake::new(DOC_ID));
        assert!(Snowflake::new(DOC_ID) <= high);
    }

    #[test]
    fn test_from_datetime_before_epoch_clamps() {
        let sf = Snowflake::from_datetime(DateTime::<Utc>::default(), false);
        assert!(sf.is_zero());
    }

    #[test]
    fn test_shard_id() {
        let sf = Snowflake::new(DOC_ID);
        let expected = ((DOC_ID >> 22) % 4) as u32;
        assert_eq!(sf.shard_id(4), expected);
        assert_eq!(sf.shard_id(1), 0);
        assert_eq!(sf.shard_id(0), 0);
    }

    #[test]
    fn test_snowflake_display() {
        let sf = Snowflake::new(123_456_789);
        assert_eq!(sf.to_string(), "123456789");
    }

    #[test]
    fn test_snowflake_serialize_json() {
        let sf = Snowflake::new(DOC_ID);
        let json = serde_json::to_string(&sf).unwrap();
        assert_eq!(json, "\"175928847299117063\"");
    }

    #[test]
    fn test_snowflake_deserialize_string_and_number() {
        let sf: Snowflake = serde_json::from_str("\"175928847299117063\"").unwrap();
        assert_eq!(sf.into_inner(), DOC_ID);

        let sf: Snowflake = serde_json::from_str("12345").unwrap();
        assert_eq!(sf.into_inner(), 12345);

        assert!(serde_json::from_str::<Snowflake>("-5").is_err());
        assert!(serde_json::from_str::<Snowflake>("\"abc\"").is_err());
    }

    #[test]
    fn test_snowflake_ordering_follows_time() {
        let earlier = Snowflake::from_datetime(Utc.timestamp_millis_opt(1_500_000_000_000).unwrap(), true);
        let later = Snowflake::from_datetime(Utc.timestamp_millis_opt(1_500_000_000_001).unwrap(), false);
        assert!(earlier < later);
    }
}
