//! Relative-date placeholder evaluator.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Days, FixedOffset, Months, NaiveDate, Offset, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::ExprError;
use crate::pattern::to_strftime;
use crate::protocol::{ApiFormat, ApiProtocol};

/// Key under which [`DateExpressionEvaluator::evaluate`] stores the fully
/// substituted input.
pub const RESULT_KEY: &str = "result";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\{(\(?\s*[a-z]+\s*(?:[-+]\s*\d+\w\s*)*\)?(?:\s*:\s*[\w\-./]+)?)\}")
        .unwrap()
});

static OPERATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([-+])(\d+)(\w)").unwrap());

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap());

/// Base date named by a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Yesterday,
    Today,
    Month,
    Year,
}

impl DateToken {
    /// Case-insensitive lookup. Unrecognized names evaluate as [`DateToken::Today`].
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "YESTERDAY" => DateToken::Yesterday,
            "MONTH" => DateToken::Month,
            "YEAR" => DateToken::Year,
            _ => DateToken::Today,
        }
    }

    fn default_pattern(self) -> &'static str {
        match self {
            DateToken::Year => "yyyy",
            DateToken::Month => "yyyy-MM",
            DateToken::Yesterday | DateToken::Today => "yyyy-MM-dd",
        }
    }
}

/// Proxy rewrite settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRewrite {
    pub enabled: bool,
    pub proxy: String,
}

impl ProxyRewrite {
    pub fn enabled(proxy: impl Into<String>) -> Self {
        Self {
            enabled: true,
            proxy: proxy.into(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Evaluates `${...}` date placeholders and rewrites job URLs.
#[derive(Clone)]
pub struct DateExpressionEvaluator {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    rewrite: ProxyRewrite,
}

impl Default for DateExpressionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DateExpressionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateExpressionEvaluator")
            .field("offset", &self.offset)
            .field("rewrite", &self.rewrite)
            .finish()
    }
}

impl DateExpressionEvaluator {
    /// UTC dates from the system clock, proxy rewrite disabled.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            offset: Utc.fix(),
            rewrite: ProxyRewrite::disabled(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Offset used to decide what "today" is.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rewrite(mut self, rewrite: ProxyRewrite) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// Current date in the configured offset.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.offset).date_naive()
    }

    /// Evaluate every placeholder in `input`.
    ///
    /// Returns a map from each literal placeholder (`${...}`) to its value.
    /// With `include_result`, the fully substituted input is added under
    /// [`RESULT_KEY`].
    pub fn evaluate(
        &self,
        input: &str,
        include_result: bool,
    ) -> Result<HashMap<String, String>, ExprError> {
        let today = self.today();
        let mut values = HashMap::new();
        let mut result = input.to_string();

        for caps in PLACEHOLDER.captures_iter(input) {
            let placeholder = &caps[0];
            if values.contains_key(placeholder) {
                continue;
            }
            let value = evaluate_placeholder(&caps[1], today)?;
            result = result.replace(placeholder, &value);
            values.insert(placeholder.to_string(), value);
        }

        debug!("Evaluated {} date placeholder(s) in '{}'", values.len(), input);

        if include_result {
            values.insert(RESULT_KEY.to_string(), result);
        }
        Ok(values)
    }

    /// Strip a leading resource prefix and substitute all placeholders.
    pub fn normalize(&self, url: &str) -> Result<String, ExprError> {
        let mut values = self.evaluate(ApiProtocol::strip(url), true)?;
        Ok(values.remove(RESULT_KEY).unwrap_or_default())
    }

    /// Route `url` through the fetch proxy when rewrite is enabled and the
    /// host is a domain name. IP-literal URLs are returned unchanged.
    pub fn rewrite(&self, url: &str, format: ApiFormat) -> String {
        if self.rewrite.enabled && !IPV4.is_match(url) {
            let encoded = URL_SAFE_NO_PAD.encode(url.as_bytes());
            return format!(
                "{}/api/{}/fetchApi/{}",
                self.rewrite.proxy.trim_end_matches('/'),
                format.name().to_ascii_lowercase(),
                encoded
            );
        }
        url.to_string()
    }

    pub fn normalize_and_rewrite(&self, url: &str, format: ApiFormat) -> Result<String, ExprError> {
        Ok(self.rewrite(&self.normalize(url)?, format))
    }

    /// Classify the resource prefix of `url`; defaults to `uri://`.
    pub fn protocol(&self, url: &str) -> ApiProtocol {
        ApiProtocol::of(url)
    }
}

/// Evaluate the inner text of one placeholder against `today`.
fn evaluate_placeholder(inner: &str, today: NaiveDate) -> Result<String, ExprError> {
    let compact: String = inner
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
        .collect();

    let (head, pattern) = match compact.split_once(':') {
        Some((head, pattern)) => (head, Some(pattern)),
        None => (compact.as_str(), None),
    };

    let name_end = head.find(['+', '-']).unwrap_or(head.len());
    let token = DateToken::from_name(&head[..name_end]);

    let mut date = match token {
        DateToken::Yesterday => today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| ExprError::OutOfRange(inner.to_string()))?,
        _ => today,
    };

    for op in OPERATION.captures_iter(&head[name_end..]) {
        let negative = &op[1] == "-";
        let amount: u32 = op[2]
            .parse()
            .map_err(|_| ExprError::InvalidOffset(op[0].to_string()))?;
        let unit = op[3].chars().next().unwrap_or_default();
        date = apply_offset(date, negative, amount, unit, inner)?;
    }

    let format = to_strftime(pattern.unwrap_or(token.default_pattern()))?;
    Ok(date.format(&format).to_string())
}

/// Shift `date` by `amount` units. Month arithmetic clamps to the last day
/// of the target month.
fn apply_offset(
    date: NaiveDate,
    negative: bool,
    amount: u32,
    unit: char,
    expr: &str,
) -> Result<NaiveDate, ExprError> {
    let shifted = match unit.to_ascii_uppercase() {
        'D' => shift_days(date, negative, u64::from(amount)),
        'W' => shift_days(date, negative, u64::from(amount) * 7),
        'M' => shift_months(date, negative, amount),
        'Y' => amount
            .checked_mul(12)
            .and_then(|months| shift_months(date, negative, months)),
        other => return Err(ExprError::UnknownUnit(other)),
    };
    shifted.ok_or_else(|| ExprError::OutOfRange(expr.to_string()))
}

fn shift_days(date: NaiveDate, negative: bool, days: u64) -> Option<NaiveDate> {
    if negative {
        date.checked_sub_days(Days::new(days))
    } else {
        date.checked_add_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, negative: bool, months: u32) -> Option<NaiveDate> {
    if negative {
        date.checked_sub_months(Months::new(months))
    } else {
        date.checked_add_months(Months::new(months))
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
