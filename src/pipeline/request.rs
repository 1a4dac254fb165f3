//! Insight request validation

use super::error::ValidationError;
use crate::assembler::Mode;
use crate::config::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Characters removed from queries
const STRIPPED_CHARS: [char; 4] = ['<', '>', '"', '\''];

/// Raw request as received from a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightRequest {
    pub query: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub days: Option<i64>,
}

fn default_mode() -> String {
    Mode::Longevity.as_str().to_string()
}

impl InsightRequest {
    pub fn new(query: impl Into<String>, mode: Mode) -> Self {
        Self {
            query: query.into(),
            mode: mode.as_str().to_string(),
            days: None,
        }
    }

    /// Builder: set the window size
    pub fn with_days(mut self, days: i64) -> Self {
        self.days = Some(days);
        self
    }

    /// Check and normalize every field
    pub fn validate(&self, config: &PipelineConfig) -> Result<ValidatedRequest, ValidationError> {
        let mode: Mode = self
            .mode
            .parse()
            .map_err(|_| ValidationError::UnknownMode(self.mode.clone()))?;

        let query = validate_query(&self.query, config.max_query_chars)?;

        let requested = self.days.unwrap_or(i64::from(config.default_days));
        if requested < 1 {
            return Err(ValidationError::InvalidDays(requested));
        }
        let max = i64::from(config.max_days);
        let days = requested.min(max) as u32;

        Ok(ValidatedRequest {
            query,
            mode,
            days,
            days_clamped: requested > max,
        })
    }
}

/// Request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Sanitized query text
    pub query: String,
    pub mode: Mode,
    pub days: u32,
    /// Requested window exceeded the maximum
    pub days_clamped: bool,
}

/// Reject blank or oversized queries, then sanitize
pub fn validate_query(query: &str, max_chars: usize) -> Result<String, ValidationError> {
    if query.trim().is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    let len = query.chars().count();
    if len > max_chars {
        return Err(ValidationError::QueryTooLong { len, max: max_chars });
    }

    let sanitized = sanitize_input(query);
    if sanitized.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(sanitized)
}

/// Strip markup-significant characters and surrounding whitespace
pub fn sanitize_input(text: &str) -> String {
    text.chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_defaults() {
        let req: InsightRequest = serde_json::from_str(r#"{"query":"How is my HRV?"}"#).unwrap();
        let valid = req.validate(&config()).unwrap();

        assert_eq!(valid.mode, Mode::Longevity);
        assert_eq!(valid.days, 7);
        assert!(!valid.days_clamped);
    }

    #[test]
    fn test_unknown_mode() {
        let req = InsightRequest {
            query: "q".to_string(),
            mode: "zen".to_string(),
            days: None,
        };
        assert_eq!(
            req.validate(&config()),
            Err(ValidationError::UnknownMode("zen".to_string()))
        );
    }

    #[test]
    fn test_days_policy() {
        let req = InsightRequest::new("q", Mode::Energy);

        assert_eq!(
            req.clone().with_days(0).validate(&config()),
            Err(ValidationError::InvalidDays(0))
        );
        assert_eq!(
            req.clone().with_days(-3).validate(&config()),
            Err(ValidationError::InvalidDays(-3))
        );

        let clamped = req.clone().with_days(90).validate(&config()).unwrap();
        assert_eq!(clamped.days, 30);
        assert!(clamped.days_clamped);

        let exact = req.with_days(30).validate(&config()).unwrap();
        assert_eq!(exact.days, 30);
        assert!(!exact.days_clamped);
    }

    #[test]
    fn test_query_validation() {
        assert_eq!(validate_query("   ", 100), Err(ValidationError::EmptyQuery));
        assert_eq!(validate_query("<>\"'", 100), Err(ValidationError::EmptyQuery));
        assert_eq!(
            validate_query(&"a".repeat(11), 10),
            Err(ValidationError::QueryTooLong { len: 11, max: 10 })
        );
        assert_eq!(validate_query(&"a".repeat(10), 10).unwrap(), "a".repeat(10));
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("  <b>\"hi\"</b> it's "), "bhi/b its");
        assert_eq!(sanitize_input("plain"), "plain");
    }
}
