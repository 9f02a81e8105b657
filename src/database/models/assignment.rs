use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::validation::{check_non_negative, patch_not_null, require_text, FieldErrors, Validate};
use crate::database::repository::{Creatable, Patchable, Table};
use crate::types::Patch;

fn default_status() -> String {
    "Planned".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_code: String,
    pub client_code: String,
    pub proposal_id: Option<i64>,
    pub title: String,
    pub service_line: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub partner_lead: Option<Uuid>,
    pub director: Option<Uuid>,
    pub manager: Option<Uuid>,
    #[serde(default)]
    pub contracted_fee: Decimal,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentCreate {
    pub assignment_code: String,
    pub client_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<i64>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_lead: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<Uuid>,
    #[serde(default)]
    pub contracted_fee: Decimal,
    #[serde(default = "default_status")]
    pub status: String,
}

/// `end_date` may not precede `start_date`; equal dates are fine
fn check_date_range(errors: &mut FieldErrors, start: Option<&NaiveDate>, end: Option<&NaiveDate>) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            errors.add("end_date", "end_date must be >= start_date");
        }
    }
}

impl Validate for AssignmentCreate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "assignment_code", &self.assignment_code);
        require_text(&mut errors, "client_code", &self.client_code);
        require_text(&mut errors, "title", &self.title);
        check_non_negative(&mut errors, "contracted_fee", Some(&self.contracted_fee));
        check_date_range(&mut errors, self.start_date.as_ref(), self.end_date.as_ref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub service_line: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub start_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub end_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub partner_lead: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub director: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub manager: Patch<Uuid>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub contracted_fee: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub status: Patch<String>,
}

impl Validate for AssignmentUpdate {
    // Dates supplied together are checked here; a lone date is checked
    // against the stored row in `check_against_current`
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        patch_not_null(&mut errors, "title", &self.title);
        patch_not_null(&mut errors, "status", &self.status);
        patch_not_null(&mut errors, "contracted_fee", &self.contracted_fee);
        if let Some(title) = self.title.as_value() {
            require_text(&mut errors, "title", title);
        }
        check_non_negative(&mut errors, "contracted_fee", self.contracted_fee.as_value());
        check_date_range(&mut errors, self.start_date.as_value(), self.end_date.as_value());
        errors.into_result()
    }
}

impl Table for Assignment {
    const TABLE: &'static str = "assignments";
    const ENTITY_TYPE: &'static str = "assignment";
    const KEY_COLUMN: &'static str = "assignment_code";

    type Row = Assignment;

    fn natural_key(row: &Assignment) -> String {
        row.assignment_code.clone()
    }
}

impl Creatable for Assignment {
    type Create = AssignmentCreate;

    fn created_summary(row: &Assignment) -> String {
        format!("Created assignment: {}", row.title)
    }
}

/// The value a column ends up with once `patch` is applied over `current`
fn merged<T: Clone>(patch: &Patch<T>, current: Option<&T>) -> Option<T> {
    match patch {
        Patch::Missing => current.cloned(),
        Patch::Null => None,
        Patch::Value(v) => Some(v.clone()),
    }
}

impl Patchable for Assignment {
    type Update = AssignmentUpdate;

    fn needs_current(patch: &AssignmentUpdate) -> bool {
        patch.start_date.is_missing() != patch.end_date.is_missing()
    }

    fn check_against_current(current: &Assignment, patch: &AssignmentUpdate) -> Result<(), FieldErrors> {
        let start = merged(&patch.start_date, current.start_date.as_ref());
        let end = merged(&patch.end_date, current.end_date.as_ref());
        let mut errors = FieldErrors::default();
        check_date_range(&mut errors, start.as_ref(), end.as_ref());
        errors.into_result()
    }
}
