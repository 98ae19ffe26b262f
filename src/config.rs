//! Process configuration, read from the environment (after `.env` loading).

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

use crate::domain::analytics::DateRangeCatalog;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3003;
const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub analytics: AnalyticsSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSettings {
    pub date_ranges: DateRangeCatalog,
    /// Offset applied before taking an order's hour of day.
    pub utc_offset: FixedOffset,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            date_ranges: DateRangeCatalog::default(),
            utc_offset: Utc.fix(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;

        let date_ranges = match lookup("ANALYTICS_DATE_RANGES") {
            Some(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                key: "ANALYTICS_DATE_RANGES",
                reason: format!("{e}"),
            })?,
            None => DateRangeCatalog::default(),
        };

        let offset_minutes: i32 = parse_or(
            "ANALYTICS_UTC_OFFSET_MINUTES",
            lookup("ANALYTICS_UTC_OFFSET_MINUTES"),
            0,
        )?;
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::Invalid {
                key: "ANALYTICS_UTC_OFFSET_MINUTES",
                reason: format!("{offset_minutes} minutes is out of range"),
            })?;

        Ok(Settings {
            database_url,
            host,
            port,
            analytics: AnalyticsSettings {
                date_ranges,
                utc_offset,
            },
        })
    }
}

/// libpq keyword/value connection string from the discrete `DB_*` keys.
/// Values are quoted, so credentials may contain any character.
fn database_url_from_parts<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL or DB_HOST"))?;
    let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
    let port = parse_or("DB_PORT", lookup("DB_PORT"), DEFAULT_DB_PORT)?;
    Ok(format!(
        "host={} port={port} user={} password={} dbname={}",
        conninfo_value(&host),
        conninfo_value(&user),
        conninfo_value(&password),
        conninfo_value(&name),
    ))
}

fn conninfo_value(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("'{value}': {e}"),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/orders")]).expect("valid");
        assert_eq!(s.database_url, "postgres://localhost/orders");
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 3003);
        assert_eq!(s.analytics, AnalyticsSettings::default());
    }

    #[test]
    fn database_url_is_composed_from_parts() {
        let s = settings(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "orders"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "shop"),
        ])
        .expect("valid");
        assert_eq!(
            s.database_url,
            "host='db.internal' port=5432 user='orders' password='secret' dbname='shop'"
        );
    }

    #[test]
    fn composed_credentials_keep_reserved_characters() {
        let s = settings(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "6543"),
            ("DB_USER", "ord@rs"),
            ("DB_PASSWORD", r"p@ss/w#rd?x:%'q\z"),
            ("DB_NAME", "shop"),
        ])
        .expect("valid");
        assert_eq!(
            s.database_url,
            r"host='db.internal' port=6543 user='ord@rs' password='p@ss/w#rd?x:%\'q\\z' dbname='shop'"
        );
    }

    #[test]
    fn missing_database_settings_are_reported() {
        assert!(matches!(settings(&[]), Err(ConfigError::Missing(_))));
        assert!(matches!(
            settings(&[("DB_HOST", "db"), ("DB_USER", "u")]),
            Err(ConfigError::Missing("DB_NAME"))
        ));
    }

    #[test]
    fn analytics_settings_are_parsed() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://localhost/orders"),
            (
                "ANALYTICS_DATE_RANGES",
                "opening=2024-10-01T00:00:00+08:00..2024-10-08T00:00:00+08:00",
            ),
            ("ANALYTICS_UTC_OFFSET_MINUTES", "480"),
        ])
        .expect("valid");
        assert_eq!(s.analytics.date_ranges.tokens().collect::<Vec<_>>(), vec!["opening"]);
        assert_eq!(s.analytics.utc_offset.local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn invalid_values_name_their_key() {
        let err = settings(&[("DATABASE_URL", "x"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = settings(&[("DATABASE_URL", "x"), ("ANALYTICS_UTC_OFFSET_MINUTES", "100000")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "ANALYTICS_UTC_OFFSET_MINUTES",
                ..
            }
        ));

        let err = settings(&[("DATABASE_URL", "x"), ("ANALYTICS_DATE_RANGES", "broken")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "ANALYTICS_DATE_RANGES",
                ..
            }
        ));
    }
}
