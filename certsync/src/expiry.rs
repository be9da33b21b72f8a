use thiserror::Error;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

const NOT_AFTER: &str = "notAfter=";

#[derive(Debug, Error)]
pub enum ExpiryError {
    #[error("no line starting with `notAfter=` in the certificate dates")]
    MissingNotAfter,
    #[error("expected `<month> <day> <hh:mm:ss> <year> <zone>` got {0} fields")]
    FieldCount(usize),
    #[error("expiry is not given in GMT but in: {0}")]
    TimeZone(String),
    #[error("malformed expiry timestamp")]
    Timestamp(#[from] time::error::Parse),
}

/// Parses the `notAfter` line printed by `openssl x509 -noout -dates`:
///
/// ```text
/// notBefore=Jan  1 00:00:00 2024 GMT
/// notAfter=Apr  1 00:00:00 2024 GMT
/// ```
///
/// Openssl pads single digit days with a space, a zero padded day is
/// accepted too.
pub fn parse_not_after(dates: &str) -> Result<OffsetDateTime, ExpiryError> {
    let stamp = dates
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(NOT_AFTER))
        .ok_or(ExpiryError::MissingNotAfter)?;

    let fields: Vec<&str> = stamp.split_whitespace().collect();
    let [month, day, clock, year, zone] = fields.as_slice() else {
        return Err(ExpiryError::FieldCount(fields.len()));
    };

    if !matches!(*zone, "GMT" | "UTC") {
        return Err(ExpiryError::TimeZone((*zone).to_owned()));
    }

    let normalized = format!("{month} {day:0>2} {clock} {year}");
    let format = format_description!("[month repr:short] [day] [hour]:[minute]:[second] [year]");
    Ok(PrimitiveDateTime::parse(&normalized, &format)?.assume_utc())
}
