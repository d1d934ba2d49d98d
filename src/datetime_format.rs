//! Serde helpers for the two datetime formats used in API responses.

/// Specifies how to serialize a [time::OffsetDateTime] as an RFC 3339 string, e.g.
/// "2024-06-01T09:30:00Z".
pub mod rfc3339 {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
    }
}

/// Like [rfc3339] but for an optional datetime, which is serialized as `null` when absent.
pub mod rfc3339_option {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(dt: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match dt {
            Some(dt) => super::rfc3339::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Specifies how to serialize a wall clock [time::PrimitiveDateTime] in the layout clients
/// use for transaction dates, e.g. "2024-06-01 09:30:00".
pub mod wall_clock {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// The transaction date layout, e.g. "2024-06-01 09:30:00".
    pub const DATE_TIME_FORMAT: &[BorrowedFormatItem] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    /// Parse `text` with [DATE_TIME_FORMAT], returning `None` if it does not match.
    pub fn parse(text: &str) -> Option<PrimitiveDateTime> {
        PrimitiveDateTime::parse(text.trim(), DATE_TIME_FORMAT).ok()
    }

    pub fn serialize<S>(dt: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PrimitiveDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod wall_clock_tests {
    use time::macros::datetime;

    use super::wall_clock;

    #[test]
    fn parses_layout() {
        assert_eq!(
            wall_clock::parse("2024-06-01 00:00:00"),
            Some(datetime!(2024-06-01 00:00:00))
        );
    }

    #[test]
    fn rejects_other_layouts() {
        assert_eq!(wall_clock::parse("2024-06-01T00:00:00Z"), None);
        assert_eq!(wall_clock::parse("01/06/2024"), None);
        assert_eq!(wall_clock::parse(""), None);
    }
}
