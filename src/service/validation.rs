//! Request validation from schema rules.

use crate::config::ValidationRule;
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, OnceLock, PoisonError};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body against every rule.
    pub fn validate(
        body: &Map<String, Value>,
        rules: &BTreeMap<&'static str, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, rule) in rules {
            if let Some(v) = body.get(*col) {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }

    /// Validate only the fields present in a patch.
    pub fn validate_partial(
        body: &Map<String, Value>,
        rules: &BTreeMap<&'static str, ValidationRule>,
    ) -> Result<(), AppError> {
        for (col, v) in body {
            if let Some(rule) = rules.get(col.as_str()) {
                validate_field(col, v, rule)?;
            }
        }
        Ok(())
    }
}

/// Compiled rule patterns, keyed by pattern text.
static PATTERNS: OnceLock<Mutex<HashMap<&'static str, Regex>>> = OnceLock::new();

/// Rule patterns are `'static`, so each is compiled once per process.
fn compiled(pattern: &'static str) -> Result<Regex, regex::Error> {
    let mut patterns = PATTERNS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = patterns.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    patterns.insert(pattern, re.clone());
    Ok(re)
}

fn validate_field(col: &str, v: &Value, rule: &ValidationRule) -> Result<(), AppError> {
    if v.is_null() {
        return Ok(());
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at most {} characters",
                    col, max
                )));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Err(AppError::Validation(format!(
                    "{} must be at least {} characters",
                    col, min
                )));
            }
        }
        if let Some(pattern) = rule.pattern {
            let re = compiled(pattern).map_err(|_| AppError::Validation(format!("invalid pattern for {}", col)))?;
            if !re.is_match(s) {
                return Err(AppError::Validation(format!("{} does not match required pattern", col)));
            }
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Err(AppError::Validation(format!("{} must be at least {}", col, min)));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Err(AppError::Validation(format!("{} must be at most {}", col, max)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn rules() -> BTreeMap<&'static str, ValidationRule> {
        [
            ("name", ValidationRule::name()),
            ("locale", ValidationRule::locale()),
            ("size", ValidationRule::non_negative()),
        ]
        .into()
    }

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn accepts_well_formed_values() {
        let b = body(json!({ "name": "基本セット", "locale": "ja", "size": 0 }));
        assert!(RequestValidator::validate(&b, &rules()).is_ok());
        let b = body(json!({ "locale": "pt-BR" }));
        assert!(RequestValidator::validate(&b, &rules()).is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let b = body(json!({ "name": "" }));
        assert_matches!(RequestValidator::validate(&b, &rules()), Err(AppError::Validation(m)) if m.contains("name"));
    }

    #[test]
    fn rejects_malformed_locale() {
        let b = body(json!({ "locale": "english please" }));
        assert_matches!(RequestValidator::validate(&b, &rules()), Err(AppError::Validation(_)));
    }

    #[test]
    fn rejects_negative_size() {
        let b = body(json!({ "size": -1 }));
        assert_matches!(RequestValidator::validate_partial(&b, &rules()), Err(AppError::Validation(_)));
    }

    #[test]
    fn patterns_are_compiled_once() {
        let pattern = ValidationRule::locale().pattern.unwrap();
        let first = compiled(pattern).unwrap();
        let second = compiled(pattern).unwrap();
        assert_eq!(first.as_str(), second.as_str());
        let patterns = PATTERNS.get().unwrap().lock().unwrap();
        assert!(patterns.contains_key(pattern));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        assert!(compiled("(unclosed").is_err());
    }

    #[test]
    fn partial_ignores_absent_fields() {
        let b = body(json!({ "size": 3 }));
        assert!(RequestValidator::validate_partial(&b, &rules()).is_ok());
    }
}
