//! Currency and date formatting

use jiff::{Timestamp, tz::TimeZone};
use rust_decimal::Decimal;
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

/// Errors raised while resolving display settings.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The ISO 4217 code is not known.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The IANA time zone name could not be resolved.
    #[error("unknown time zone: {name}")]
    UnknownTimeZone {
        /// Requested zone name
        name: String,

        /// Lookup failure
        #[source]
        source: jiff::Error,
    },
}

/// Resolve an ISO 4217 currency code such as `KRW`, ignoring case.
///
/// # Errors
///
/// Returns [`FormatError::UnknownCurrency`] if the code is not recognised.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, FormatError> {
    Currency::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| FormatError::UnknownCurrency(code.to_string()))
}

/// Resolve an IANA time zone name. `UTC` never touches the zone database.
///
/// # Errors
///
/// Returns [`FormatError::UnknownTimeZone`] if the zone is not in the database.
pub fn time_zone_from_name(name: &str) -> Result<TimeZone, FormatError> {
    if name.eq_ignore_ascii_case("utc") {
        return Ok(TimeZone::UTC);
    }

    TimeZone::get(name).map_err(|source| FormatError::UnknownTimeZone {
        name: name.to_string(),
        source,
    })
}

/// Render a whole-unit amount in the currency's display form, e.g. `₩15,000`.
///
/// Amounts are major units of `currency`; every `u64` is representable.
pub fn format_price(amount: u64, currency: &Currency) -> String {
    Money::from_decimal(Decimal::from(amount), currency).to_string()
}

/// Render a discount as a negative line amount, e.g. `-₩1,500`.
pub fn format_discount(amount: u64, currency: &Currency) -> String {
    format!("-{}", format_price(amount, currency))
}

/// Render the calendar date of `timestamp` in `tz`, e.g. `2026-10-16`.
pub fn format_date(timestamp: Timestamp, tz: &TimeZone) -> String {
    timestamp.to_zoned(tz.clone()).strftime("%Y-%m-%d").to_string()
}

/// Render the date and minute of `timestamp` in `tz`, e.g. `2026-10-16 09:30`.
pub fn format_date_time(timestamp: Timestamp, tz: &TimeZone) -> String {
    timestamp
        .to_zoned(tz.clone())
        .strftime("%Y-%m-%d %H:%M")
        .to_string()
}
