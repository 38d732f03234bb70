use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};
use volley_core::ValidationResult;

pub mod application;
pub mod match_result;
pub mod player;
mod rules;
pub mod team;
pub mod tournament;
pub mod user;

/// One failed rule, addressed by the camelCase path of the offending field.
/// The empty path refers to the payload as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid payload: {}", join_issues(.issues))]
pub struct SchemaError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaError {
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    pub fn at<T>(path: impl Into<String>, message: impl Into<String>) -> Result<T, Self> {
        Err(Self::new(vec![FieldIssue::new(path, message)]))
    }

    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }

    pub fn messages_at(&self, path: &str) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|i| i.path == path)
            .map(|i| i.message.as_str())
            .collect()
    }

    pub fn to_validation_result(&self) -> ValidationResult {
        ValidationResult::from_errors(self.issues.iter().map(|i| i.to_string()).collect())
    }
}

impl From<ValidationErrors> for SchemaError {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues = Vec::new();
        collect_issues("", &errors, &mut issues);
        // Field errors come out of a map; order them by path so output is stable.
        issues.sort_by(|a, b| a.path.cmp(&b.path));
        SchemaError::new(issues)
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn collect_issues(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldIssue>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, &camel_case(field));
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    out.push(FieldIssue::new(path.clone(), describe(error)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_issues(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_issues(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    let param = |key: &str| error.params.get(key).map(|v| v.to_string());
    match &*error.code {
        "range" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("must be between {} and {}", min, max),
            (Some(min), None) => format!("must be at least {}", min),
            (None, Some(max)) => format!("must be at most {}", max),
            (None, None) => "is out of range".to_string(),
        },
        "length" => match (param("min"), param("max")) {
            (Some(min), Some(max)) => format!("length must be between {} and {}", min, max),
            (Some(min), None) => format!("length must be at least {}", min),
            (None, Some(max)) => format!("length must be at most {}", max),
            (None, None) => "has an invalid length".to_string(),
        },
        code => format!("is invalid ({})", code),
    }
}

/// A payload shape: per-field constraints come from `Validate`, cross-field
/// rules from `refine`, which only runs once every field check has passed.
pub trait Schema: Validate + DeserializeOwned {
    /// Serialized names of the fields that must be present and non-null.
    const REQUIRED: &'static [&'static str] = &[];

    fn refine(&self, _issues: &mut Vec<FieldIssue>) {}
}

pub fn check<S: Schema>(payload: &S) -> Result<(), SchemaError> {
    payload.validate()?;
    let mut issues = Vec::new();
    payload.refine(&mut issues);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::new(issues))
    }
}

/// Builds a payload from untyped JSON: reports every missing required field at
/// once, then type errors, then field constraints, then refinements.
pub fn parse<S: Schema>(value: &serde_json::Value) -> Result<S, SchemaError> {
    let Some(object) = value.as_object() else {
        return SchemaError::at("", "Expected a JSON object");
    };
    let missing: Vec<FieldIssue> = S::REQUIRED
        .iter()
        .filter(|field| object.get(**field).is_none_or(|v| v.is_null()))
        .map(|field| FieldIssue::new(*field, "Required"))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::new(missing));
    }
    let payload: S = match serde_json::from_value(value.clone()) {
        Ok(payload) => payload,
        Err(e) => return SchemaError::at("", e.to_string()),
    };
    check(&payload)?;
    Ok(payload)
}

pub fn parse_str<S: Schema>(input: &str) -> Result<S, SchemaError> {
    let value: serde_json::Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(e) => return SchemaError::at("", format!("Malformed JSON: {}", e)),
    };
    parse(&value)
}
