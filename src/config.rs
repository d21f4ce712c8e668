//! Environment configuration.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::RetryPolicy;
use crate::domain::totals::FeeSchedule;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Currency and fees applied at checkout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub currency: String,
    pub fees: FeeSchedule,
}

impl Default for CheckoutSettings {
    fn default() -> Self { Self { currency: "INR".to_string(), fees: FeeSchedule::default() } }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub nats_url: Option<String>,
    pub checkout: CheckoutSettings,
    pub retry: RetryPolicy,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL").filter(|v| !v.is_empty()).ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let retry_attempts: u32 = parse_or(&get, "DB_RETRY_ATTEMPTS", 3)?;
        let retry_delay_ms: u64 = parse_or(&get, "DB_RETRY_BASE_DELAY_MS", 100)?;
        if retry_attempts == 0 {
            return Err(ConfigError::Invalid { key: "DB_RETRY_ATTEMPTS", value: "0".into() });
        }
        let fees = FeeSchedule {
            shipping_fee: non_negative(parse_or(&get, "SHIPPING_FEE", Decimal::ZERO)?, "SHIPPING_FEE")?,
            free_shipping_threshold: parse_opt(&get, "FREE_SHIPPING_THRESHOLD")?
                .map(|t| non_negative(t, "FREE_SHIPPING_THRESHOLD")).transpose()?,
            tax_rate_percent: non_negative(parse_or(&get, "TAX_RATE_PERCENT", Decimal::ZERO)?, "TAX_RATE_PERCENT")?,
        };
        Ok(Self {
            database_url,
            port: parse_or(&get, "PORT", 8083)?,
            max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            nats_url: get("NATS_URL").filter(|v| !v.is_empty()),
            checkout: CheckoutSettings { currency: get("CURRENCY").unwrap_or_else(|| "INR".to_string()).to_uppercase(), fees },
            retry: RetryPolicy { max_attempts: retry_attempts, base_delay: Duration::from_millis(retry_delay_ms) },
        })
    }
}

fn parse_opt<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError> {
    match get(key) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => v.trim().parse().map(Some).map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

fn non_negative(value: Decimal, key: &'static str) -> Result<Decimal, ConfigError> {
    if value < Decimal::ZERO { return Err(ConfigError::Invalid { key, value: value.to_string() }); }
    Ok(value)
}

fn parse_or<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(parse_opt(get, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply() {
        let c = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/print")])).unwrap();
        assert_eq!(c.port, 8083);
        assert_eq!(c.max_connections, 10);
        assert_eq!(c.nats_url, None);
        assert_eq!(c.checkout, CheckoutSettings::default());
        assert_eq!(c.retry.max_attempts, 3);
        assert_eq!(c.retry.base_delay, Duration::from_millis(100));
    }

    #[test]
    fn fees_are_parsed() {
        let c = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("SHIPPING_FEE", "49.00"),
            ("FREE_SHIPPING_THRESHOLD", "999"),
            ("TAX_RATE_PERCENT", "18"),
            ("CURRENCY", "inr"),
        ])).unwrap();
        assert_eq!(c.checkout.fees.shipping_fee, dec!(49));
        assert_eq!(c.checkout.fees.free_shipping_threshold, Some(dec!(999)));
        assert_eq!(c.checkout.fees.tax_rate_percent, dec!(18));
        assert_eq!(c.checkout.currency, "INR");
    }

    #[test]
    fn negative_fees_are_refused() {
        for key in ["TAX_RATE_PERCENT", "SHIPPING_FEE", "FREE_SHIPPING_THRESHOLD"] {
            let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), (key, "-150")])).unwrap_err();
            assert_eq!(err, ConfigError::Invalid { key, value: "-150".into() });
        }
    }

    #[test]
    fn missing_database_url() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn malformed_value_names_the_key() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
    }
}
