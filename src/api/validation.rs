use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::types::Patch;

/// Field-level validation failures, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Boundary validation for typed request payloads
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

// Small rule helpers shared by the model validators

pub(crate) fn require_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "field required");
    }
}

pub(crate) fn check_email(errors: &mut FieldErrors, field: &str, value: Option<&String>) {
    if let Some(email) = value {
        if !is_valid_email(email) {
            errors.add(field, "value is not a valid email address");
        }
    }
}

pub(crate) fn check_non_negative(errors: &mut FieldErrors, field: &str, value: Option<&Decimal>) {
    if let Some(v) = value {
        if v.is_sign_negative() && !v.is_zero() {
            errors.add(field, "must be greater than or equal to 0");
        }
    }
}

/// A patch may clear optional columns but not required ones
pub(crate) fn patch_not_null<T>(errors: &mut FieldErrors, field: &str, value: &Patch<T>) {
    if value.is_null() {
        errors.add(field, "cannot be null");
    }
}
