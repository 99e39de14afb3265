//! Date expression and URL rewrite configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Date expression evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionConfig {
    /// Offset deciding what "today" is, e.g. "+08:00". "UTC" and "Z" are accepted.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

impl ExpressionConfig {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        let raw = self.utc_offset.trim();
        if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
            return Ok(Utc.fix());
        }
        parse_offset(raw).ok_or_else(|| ConfigError::InvalidValue {
            field: "expression.utc_offset".to_string(),
            message: format!("'{}' is not of the form +HH:MM", raw),
        })
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `+HHMM`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

/// Proxy rewrite for job URLs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewriteConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the fetch proxy.
    #[serde(default)]
    pub proxy: String,
}

impl RewriteConfig {
    /// Parsed proxy URL. `None` when rewrite is disabled.
    pub fn proxy_url(&self) -> Result<Option<Url>, ConfigError> {
        if !self.enabled {
            return Ok(None);
        }
        if self.proxy.trim().is_empty() {
            return Err(ConfigError::MissingField("rewrite.proxy".to_string()));
        }
        let url = Url::parse(&self.proxy).map_err(|e| ConfigError::InvalidValue {
            field: "rewrite.proxy".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "rewrite.proxy".to_string(),
                message: "proxy must start with http:// or https://".to_string(),
            });
        }
        Ok(Some(url))
    }
}
