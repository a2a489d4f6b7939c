//! Twitter timestamp codec.
//!
//! The REST API renders `created_at` as `Thu May 13 14:24:37 +0000 2010`;
//! the legacy search API used `Mon, 21 Jun 2010 18:56:18 +0000`. Responses
//! can mix both, so [`parse`] accepts either. [`format`] always produces the
//! REST shape in UTC.
//!
//! The module doubles as a serde adapter for `#[serde(with = "crate::date")]`.

use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// `EEE MMM d HH:mm:ss Z yyyy`
pub const API_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:none] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute] [year]"
);

/// `EEE, d MMM yyyy HH:mm:ss Z`
pub const SEARCH_API_FORMAT: &[BorrowedFormatItem<'_>] = format_description!(
    "[weekday repr:short], [day padding:none] [month repr:short] [year] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
);

#[derive(Debug, Error)]
#[error("failed to parse Twitter date: {input:?}")]
pub struct DateParseError {
    pub input: String,
    #[source]
    source: time::error::Parse,
}

/// Render `date` in the REST API shape, converted to UTC.
///
/// ```
/// use time::macros::datetime;
///
/// let date = datetime!(2010-05-13 16:24:37 +02:00);
/// assert_eq!(chirp_twitter::date::format(date), "Thu May 13 14:24:37 +0000 2010");
/// ```
pub fn format(date: OffsetDateTime) -> String {
    date.to_offset(UtcOffset::UTC)
        .format(API_FORMAT)
        .expect("OffsetDateTime carries every component of the API format")
}

/// Parse the REST API shape, falling back to the legacy search API shape.
pub fn parse(input: &str) -> Result<OffsetDateTime, DateParseError> {
    let input = input.trim();
    OffsetDateTime::parse(input, API_FORMAT)
        .or_else(|_| OffsetDateTime::parse(input, SEARCH_API_FORMAT))
        .map_err(|source| DateParseError {
            input: input.to_string(),
            source,
        })
}

/// [`parse`], plus RFC 3339 for values that went through another serializer.
fn parse_lenient(input: &str) -> Result<OffsetDateTime, DateParseError> {
    parse(input).or_else(|err| OffsetDateTime::parse(input.trim(), &Rfc3339).map_err(|_| err))
}

pub fn serialize<S>(date: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(*date))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_lenient(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_rest_api_shape() {
        assert_eq!(
            parse("Thu May 13 14:24:37 +0000 2010").unwrap(),
            datetime!(2010-05-13 14:24:37 UTC)
        );
        assert_eq!(
            parse("Wed May 12 22:32:30 +0000 2010").unwrap(),
            datetime!(2010-05-12 22:32:30 UTC)
        );
    }

    #[test]
    fn accepts_zero_padded_days() {
        assert_eq!(
            parse("Fri Jun 03 09:00:00 +0000 2011").unwrap(),
            datetime!(2011-06-03 09:00:00 UTC)
        );
    }

    #[test]
    fn falls_back_to_search_api_shape() {
        assert_eq!(
            parse("Mon, 21 Jun 2010 18:56:18 +0000").unwrap(),
            datetime!(2010-06-21 18:56:18 UTC)
        );
    }

    #[test]
    fn rest_shape_round_trips() {
        for raw in [
            "Thu May 13 14:24:37 +0000 2010",
            "Sat Jan 1 00:00:00 +0000 2011",
            "Tue Dec 31 23:59:59 +0000 2013",
        ] {
            assert_eq!(format(parse(raw).unwrap()), raw);
        }
    }

    #[test]
    fn search_shape_formats_as_rest_shape() {
        let parsed = parse("Mon, 21 Jun 2010 18:56:18 +0000").unwrap();
        assert_eq!(format(parsed), "Mon Jun 21 18:56:18 +0000 2010");
    }

    #[test]
    fn non_utc_offsets_are_normalised() {
        let parsed = parse("Thu May 13 16:24:37 +0200 2010").unwrap();
        assert_eq!(parsed, datetime!(2010-05-13 14:24:37 UTC));
        assert_eq!(format(parsed), "Thu May 13 14:24:37 +0000 2010");
    }

    #[test]
    fn rejects_other_shapes() {
        for raw in ["2010-05-13T14:24:37Z", "yesterday", "", "Thu May 13 2010"] {
            let err = parse(raw).unwrap_err();
            assert_eq!(err.input, raw);
        }
    }

    #[test]
    fn serde_adapter_accepts_rfc3339() {
        #[derive(Debug, serde::Deserialize)]
        struct Stamp {
            #[serde(with = "crate::date")]
            at: OffsetDateTime,
        }
        let stamp: Stamp = serde_json::from_str(r#"{"at":"2010-05-13T14:24:37Z"}"#).unwrap();
        assert_eq!(stamp.at, datetime!(2010-05-13 14:24:37 UTC));

        let err = serde_json::from_str::<Stamp>(r#"{"at":"nope"}"#).unwrap_err();
        assert!(err.to_string().contains("failed to parse Twitter date"));
    }
}
