use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::validation::{check_non_negative, require_text, FieldErrors, Validate};
use crate::database::repository::{Creatable, Table};

/// A collection against an invoice. Receipts are create-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: i64,
    pub invoice_no: String,
    #[serde(default)]
    pub amount_received: Decimal,
    /// Tax deducted at source by the payer; counts as collected
    #[serde(default)]
    pub tds_amount: Decimal,
    pub receipt_date: NaiveDate,
    pub mode: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptCreate {
    pub invoice_no: String,
    #[serde(default)]
    pub amount_received: Decimal,
    #[serde(default)]
    pub tds_amount: Decimal,
    pub receipt_date: NaiveDate,
    pub mode: String,
}

impl Validate for ReceiptCreate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "invoice_no", &self.invoice_no);
        require_text(&mut errors, "mode", &self.mode);
        check_non_negative(&mut errors, "amount_received", Some(&self.amount_received));
        check_non_negative(&mut errors, "tds_amount", Some(&self.tds_amount));
        errors.into_result()
    }
}

impl Table for Receipt {
    const TABLE: &'static str = "receipts";
    const ENTITY_TYPE: &'static str = "receipt";
    const KEY_COLUMN: &'static str = "receipt_id";

    type Row = Receipt;

    fn natural_key(row: &Receipt) -> String {
        row.receipt_id.to_string()
    }
}

impl Creatable for Receipt {
    type Create = ReceiptCreate;

    fn created_summary(row: &Receipt) -> String {
        format!("Recorded receipt for invoice: {}", row.invoice_no)
    }
}
