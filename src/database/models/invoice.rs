use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::validation::{check_non_negative, patch_not_null, require_text, FieldErrors, Validate};
use crate::database::repository::{Creatable, Patchable, Table};
use crate::types::Patch;

/// Status of an invoice awaiting payment; the aging report only looks at these
pub const STATUS_ISSUED: &str = "Issued";

fn default_status() -> String {
    STATUS_ISSUED.to_string()
}

fn default_gst_pct() -> Decimal {
    Decimal::new(1800, 2)
}

/// An invoice row. `amount_with_tax` is computed by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_no: String,
    pub assignment_code: String,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub amount_before_tax: Decimal,
    #[serde(default = "default_gst_pct")]
    pub gst_pct: Decimal,
    #[serde(default)]
    pub amount_with_tax: Decimal,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreate {
    pub invoice_no: String,
    pub assignment_code: String,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub amount_before_tax: Decimal,
    #[serde(default = "default_gst_pct")]
    pub gst_pct: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn check_gst(errors: &mut FieldErrors, gst: Option<&Decimal>) {
    if let Some(gst) = gst {
        if *gst < Decimal::ZERO || *gst > Decimal::ONE_HUNDRED {
            errors.add("gst_pct", "must be between 0 and 100");
        }
    }
}

impl Validate for InvoiceCreate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "invoice_no", &self.invoice_no);
        require_text(&mut errors, "assignment_code", &self.assignment_code);
        check_non_negative(&mut errors, "amount_before_tax", Some(&self.amount_before_tax));
        check_gst(&mut errors, Some(&self.gst_pct));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub invoice_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub amount_before_tax: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub gst_pct: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub due_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub status: Patch<String>,
}

impl Validate for InvoiceUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        patch_not_null(&mut errors, "invoice_date", &self.invoice_date);
        patch_not_null(&mut errors, "amount_before_tax", &self.amount_before_tax);
        patch_not_null(&mut errors, "gst_pct", &self.gst_pct);
        patch_not_null(&mut errors, "status", &self.status);
        check_non_negative(&mut errors, "amount_before_tax", self.amount_before_tax.as_value());
        check_gst(&mut errors, self.gst_pct.as_value());
        errors.into_result()
    }
}

impl Table for Invoice {
    const TABLE: &'static str = "invoices";
    const ENTITY_TYPE: &'static str = "invoice";
    const KEY_COLUMN: &'static str = "invoice_no";

    type Row = Invoice;

    fn natural_key(row: &Invoice) -> String {
        row.invoice_no.clone()
    }
}

impl Creatable for Invoice {
    type Create = InvoiceCreate;

    fn created_summary(row: &Invoice) -> String {
        format!("Generated invoice for assignment: {}", row.assignment_code)
    }
}

impl Patchable for Invoice {
    type Update = InvoiceUpdate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn invoice_date_is_required() {
        let result: Result<InvoiceCreate, _> = serde_json::from_value(json!({
            "invoice_no": "INV-1",
            "assignment_code": "ASG-1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn gst_out_of_range_rejected() {
        let inv: InvoiceCreate = serde_json::from_value(json!({
            "invoice_no": "INV-1",
            "assignment_code": "ASG-1",
            "invoice_date": "2025-01-31",
            "gst_pct": 118
        }))
        .unwrap();
        assert!(inv.validate().unwrap_err().get("gst_pct").is_some());
    }

    #[test]
    fn default_gst_is_eighteen_percent() {
        let inv: InvoiceCreate = serde_json::from_value(json!({
            "invoice_no": "INV-1",
            "assignment_code": "ASG-1",
            "invoice_date": "2025-01-31",
            "amount_before_tax": 1000
        }))
        .unwrap();
        assert_eq!(inv.gst_pct, Decimal::from(18));
        assert_eq!(inv.status, "Issued");
        assert!(inv.validate().is_ok());
    }
}
