use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::validation::{check_non_negative, patch_not_null, require_text, FieldErrors, Validate};
use crate::database::repository::{Creatable, Patchable, Table};
use crate::types::Patch;

fn default_status() -> String {
    "Draft".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub proposal_id: i64,
    pub client_code: String,
    pub service_line: Option<String>,
    pub scope_summary: Option<String>,
    #[serde(default)]
    pub estimated_fees: Decimal,
    pub issued_date: Option<NaiveDate>,
    pub status: String,
    pub outcome_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalCreate {
    pub client_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_summary: Option<String>,
    #[serde(default)]
    pub estimated_fees: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_date: Option<NaiveDate>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_reason: Option<String>,
}

impl Validate for ProposalCreate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require_text(&mut errors, "client_code", &self.client_code);
        require_text(&mut errors, "status", &self.status);
        check_non_negative(&mut errors, "estimated_fees", Some(&self.estimated_fees));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalUpdate {
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub service_line: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub scope_summary: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub estimated_fees: Patch<Decimal>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub issued_date: Patch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub status: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub outcome_reason: Patch<String>,
}

impl Validate for ProposalUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        patch_not_null(&mut errors, "status", &self.status);
        patch_not_null(&mut errors, "estimated_fees", &self.estimated_fees);
        check_non_negative(&mut errors, "estimated_fees", self.estimated_fees.as_value());
        errors.into_result()
    }
}

impl Table for Proposal {
    const TABLE: &'static str = "proposals";
    const ENTITY_TYPE: &'static str = "proposal";
    const KEY_COLUMN: &'static str = "proposal_id";

    type Row = Proposal;

    fn natural_key(row: &Proposal) -> String {
        row.proposal_id.to_string()
    }
}

impl Creatable for Proposal {
    type Create = ProposalCreate;

    fn created_summary(row: &Proposal) -> String {
        format!("Created proposal for client: {}", row.client_code)
    }
}

impl Patchable for Proposal {
    type Update = ProposalUpdate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_row_with_numeric_fee_decodes() {
        let p: Proposal = serde_json::from_value(json!({
            "proposal_id": 12,
            "client_code": "CL0001",
            "service_line": "Assurance",
            "scope_summary": null,
            "estimated_fees": 150000.50,
            "issued_date": "2025-03-01",
            "status": "Won",
            "outcome_reason": null,
            "created_at": "2025-03-01T09:30:00.123456+00:00",
            "created_by": "0d6c1c7e-3a52-4c61-9d6b-9e5c7a0b1f22"
        }))
        .unwrap();
        assert_eq!(p.estimated_fees, Decimal::new(15000050, 2));
        assert_eq!(Proposal::natural_key(&p), "12");
        assert_eq!(p.issued_date, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn defaults_to_draft() {
        let p: ProposalCreate = serde_json::from_value(json!({ "client_code": "CL0001" })).unwrap();
        assert_eq!(p.status, "Draft");
        assert_eq!(p.estimated_fees, Decimal::ZERO);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn negative_fee_rejected() {
        let p: ProposalCreate =
            serde_json::from_value(json!({ "client_code": "CL0001", "estimated_fees": -5 })).unwrap();
        assert!(p.validate().unwrap_err().get("estimated_fees").is_some());
    }
}
