// Module name shadows the `serde` crate; use `::serde` for the external crate.
use ::serde::de::Error as _;
use ::serde::{Deserialize, Deserializer, Serializer};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Serialize `DateTime<Utc>` as RFC 3339 with 3-digit fractional seconds and a
/// trailing `Z`, the timestamp shape the table API stores for `enrolled_at`.
pub fn to_rfc3339_ms<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Deserialize a timestamp with or without a UTC offset.
///
/// `timestamptz` columns come back as RFC 3339; plain `timestamp` columns
/// carry no offset and are read as UTC.
pub fn from_timestamp<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(d)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
}
