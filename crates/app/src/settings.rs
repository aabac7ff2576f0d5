//! Store settings

use jiff::tz::TimeZone;
use rusty_money::iso::{self, Currency};

use satchel::format::{self, FormatError};

/// Display and navigation settings shared by the storefront services.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Currency every price is quoted in.
    pub currency: &'static Currency,

    /// Zone dates are displayed in.
    pub time_zone: TimeZone,

    /// Purchased-materials page the buyer lands on after checkout.
    pub library_path: String,

    /// Sign-in page for deferred actions.
    pub login_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            currency: iso::KRW,
            time_zone: TimeZone::UTC,
            library_path: "/my-materials".to_string(),
            login_path: "/login".to_string(),
        }
    }
}

impl StoreSettings {
    /// Resolve settings from configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency code or time zone is unknown.
    pub fn resolve(
        currency: &str,
        time_zone: &str,
        library_path: impl Into<String>,
        login_path: impl Into<String>,
    ) -> Result<Self, FormatError> {
        Ok(Self {
            currency: format::currency_from_code(currency)?,
            time_zone: format::time_zone_from_name(time_zone)?,
            library_path: library_path.into(),
            login_path: login_path.into(),
        })
    }

    /// ISO 4217 code of the store currency.
    pub fn currency_code(&self) -> &'static str {
        self.currency.iso_alpha_code
    }

    /// Sign-in location that returns the user to `return_to` afterwards.
    pub fn login_url(&self, return_to: &str) -> String {
        format!("{}?redirect={}", self.login_path, encode_query_value(return_to))
    }

    /// Render a whole-unit amount, e.g. `₩15,000`.
    pub fn format_price(&self, amount: u64) -> String {
        format::format_price(amount, self.currency)
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set, keeping
/// `/` so paths stay readable.
fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());

    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }

    encoded
}
