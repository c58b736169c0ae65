//! Field schema: turns raw control values into a [`SubmissionRequest`] and
//! runs the local validation predicates.

use std::sync::LazyLock;

use regex::Regex;
use shared::domain::{FieldValue, RawFields, SubmissionRequest};

use crate::error::ValidationError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed text, kept even when empty.
    Text,
    /// Untrimmed text (passwords).
    Secret,
    /// Trimmed text; empty becomes absent.
    OptionalText,
    /// Decimal number; empty becomes absent.
    Number,
    /// Checkbox-style flag.
    Flag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    PositiveNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            rules: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    fn collect(&self, raw: Option<&str>) -> Result<FieldValue, ValidationError> {
        let raw = raw.unwrap_or_default();
        let value = match self.kind {
            FieldKind::Text => FieldValue::Text(raw.trim().to_string()),
            FieldKind::Secret => FieldValue::Text(raw.to_string()),
            FieldKind::OptionalText => match raw.trim() {
                "" => FieldValue::Absent,
                trimmed => FieldValue::Text(trimmed.to_string()),
            },
            FieldKind::Number => match raw.trim() {
                "" => FieldValue::Absent,
                trimmed => match trimmed.parse::<f64>() {
                    Ok(number) if number.is_finite() => FieldValue::Number(number),
                    _ => return Err(self.error("must be a number")),
                },
            },
            FieldKind::Flag => FieldValue::Flag(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "yes" | "1"
            )),
        };

        for rule in &self.rules {
            self.check(*rule, &value)?;
        }
        Ok(value)
    }

    fn check(&self, rule: Rule, value: &FieldValue) -> Result<(), ValidationError> {
        match rule {
            Rule::Required => {
                let missing = match value {
                    FieldValue::Absent => true,
                    FieldValue::Text(text) => text.trim().is_empty(),
                    _ => false,
                };
                if missing {
                    return Err(self.error("is required"));
                }
            }
            Rule::Email => {
                if let Some(email) = value.as_text() {
                    if !is_valid_email(email) {
                        return Err(ValidationError::new(
                            self.name,
                            "Please enter a valid email address",
                        ));
                    }
                }
            }
            Rule::PositiveNumber => {
                if let Some(number) = value.as_number() {
                    if number <= 0.0 {
                        return Err(self.error("must be a positive number"));
                    }
                }
            }
        }
        Ok(())
    }

    fn error(&self, what: &str) -> ValidationError {
        ValidationError::new(self.name, format!("{} {what}", self.label))
    }
}

/// Collects every field in schema order, stopping at the first failing predicate.
pub fn collect_fields(
    specs: &[FieldSpec],
    raw: &RawFields,
) -> Result<SubmissionRequest, ValidationError> {
    let mut request = SubmissionRequest::new();
    for spec in specs {
        let value = spec.collect(raw.get(spec.name).map(String::as_str))?;
        request.insert(spec.name, value);
    }
    Ok(request)
}
