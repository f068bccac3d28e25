//! Frontmatter date parsing.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::Value;
use time::format_description::OwnedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Formats tried (after RFC 3339) when no date format is configured.
const FALLBACK_FORMATS: &[&str] = &[
    "[year]-[month]-[day]T[hour]:[minute]:[second]",
    "[year]-[month]-[day] [hour]:[minute]:[second]",
    "[year]-[month]-[day]T[hour]:[minute]",
    "[year]-[month]-[day] [hour]:[minute]",
    "[year]-[month]-[day]",
];

#[derive(Debug, Clone)]
enum DateFormat {
    Rfc3339,
    Custom(OwnedFormatItem),
}

/// Parses frontmatter date values into epoch milliseconds.
///
/// Formats use the `time` format description syntax, e.g.
/// `[year]-[month]-[day]`. Values without an offset are taken as UTC, and a
/// format with no time component yields midnight.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<DateFormat>,
}

impl DateParser {
    /// Build a parser for `format`; an empty format accepts RFC 3339 and a
    /// handful of ISO-like layouts.
    pub fn new(format: &str) -> Result<Self> {
        let format = format.trim();
        let formats = match format.is_empty() {
            true => {
                let mut formats = vec![DateFormat::Rfc3339];
                for fallback in FALLBACK_FORMATS {
                    formats.push(DateFormat::Custom(compile(fallback)?));
                }
                formats
            },
            false => vec![DateFormat::Custom(compile(format)?)],
        };
        Ok(Self { formats })
    }

    /// Parse a raw frontmatter value. Integers (and finite floats) are epoch
    /// milliseconds already; strings go through the configured formats.
    pub fn parse_value(&self, value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
            Value::String(s) => self.parse(s),
            _ => None,
        }
    }

    pub fn parse(&self, input: &str) -> Option<i64> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        self.formats.iter().find_map(|format| parse_with(format, input)).and_then(to_millis)
    }
}

fn compile(format: &str) -> Result<OwnedFormatItem> {
    time::format_description::parse_owned::<2>(format).or_raise(|| ErrorKind::InvalidDateFormat(format.to_string()))
}

fn parse_with(format: &DateFormat, input: &str) -> Option<OffsetDateTime> {
    match format {
        DateFormat::Rfc3339 => OffsetDateTime::parse(input, &Rfc3339).ok(),
        DateFormat::Custom(item) => OffsetDateTime::parse(input, item)
            .or_else(|_| PrimitiveDateTime::parse(input, item).map(PrimitiveDateTime::assume_utc))
            .or_else(|_| Date::parse(input, item).map(|date| date.midnight().assume_utc()))
            .ok(),
    }
}

fn to_millis(datetime: OffsetDateTime) -> Option<i64> {
    i64::try_from(datetime.unix_timestamp_nanos() / 1_000_000).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const JAN_15_2024: i64 = 1_705_276_800_000;

    #[rstest]
    #[case("2024-01-15", Some(JAN_15_2024))]
    #[case("2024-01-15 10:30", Some(JAN_15_2024 + (10 * 60 + 30) * 60_000))]
    #[case("2024-01-15T10:30:00", Some(JAN_15_2024 + (10 * 60 + 30) * 60_000))]
    #[case("2024-01-15T10:30:00Z", Some(JAN_15_2024 + (10 * 60 + 30) * 60_000))]
    #[case("2024-01-15T10:30:00+02:00", Some(JAN_15_2024 + (8 * 60 + 30) * 60_000))]
    #[case("15/01/2024", None)]
    #[case("yesterday", None)]
    #[case("", None)]
    fn default_formats(#[case] input: &str, #[case] expected: Option<i64>) {
        let parser = DateParser::new("").unwrap();
        assert_eq!(parser.parse(input), expected);
    }

    #[rstest]
    #[case("[day]/[month]/[year]", "15/01/2024", Some(JAN_15_2024))]
    #[case("[day]/[month]/[year]", "2024-01-15", None)]
    #[case("[year]-[month]-[day] [hour]:[minute]", "2024-01-15 00:01", Some(JAN_15_2024 + 60_000))]
    fn custom_format(#[case] format: &str, #[case] input: &str, #[case] expected: Option<i64>) {
        let parser = DateParser::new(format).unwrap();
        assert_eq!(parser.parse(input), expected);
    }

    #[test]
    fn numbers_are_epoch_millis() {
        let parser = DateParser::new("").unwrap();
        assert_eq!(parser.parse_value(&json!(JAN_15_2024)), Some(JAN_15_2024));
        assert_eq!(parser.parse_value(&json!(1.5e12)), Some(1_500_000_000_000));
        assert_eq!(parser.parse_value(&json!(true)), None);
        assert_eq!(parser.parse_value(&json!(["2024-01-15"])), None);
    }

    #[test]
    fn invalid_format_is_rejected() {
        let err = DateParser::new("[year]-[nonsense]").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidDateFormat(f) if f == "[year]-[nonsense]"));
    }
}
