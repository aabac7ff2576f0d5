//! Store Config

use clap::Args;

use satchel::format::FormatError;
use satchel_app::settings::StoreSettings;

/// Storefront display and navigation settings.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// ISO 4217 code prices are quoted in
    #[arg(long, env = "STORE_CURRENCY", default_value = "KRW")]
    pub currency: String,

    /// IANA time zone dates are shown in
    #[arg(long, env = "STORE_TIMEZONE", default_value = "Asia/Seoul")]
    pub time_zone: String,

    /// Purchased-materials page shown after checkout
    #[arg(long, env = "LIBRARY_PATH", default_value = "/my-materials")]
    pub library_path: String,

    /// Sign-in page for deferred actions
    #[arg(long, env = "LOGIN_PATH", default_value = "/login")]
    pub login_path: String,
}

impl StoreConfig {
    /// Resolve the configured values.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency or time zone is unknown.
    pub fn settings(&self) -> Result<StoreSettings, FormatError> {
        StoreSettings::resolve(
            &self.currency,
            &self.time_zone,
            self.library_path.as_str(),
            self.login_path.as_str(),
        )
    }
}
