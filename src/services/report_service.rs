//! Read-then-reduce reports over rows already fetched from the store.
//!
//! Nothing here touches the store; handlers load the rows and pass them in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::invoice::STATUS_ISSUED;
use crate::database::models::{Invoice, Proposal, Receipt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    pub total_billed: Decimal,
    pub total_collected: Decimal,
    pub outstanding: Decimal,
}

/// Outstanding amounts of issued invoices by age in days
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgingBuckets {
    #[serde(rename = "0-30")]
    pub days_0_30: Decimal,
    #[serde(rename = "31-60")]
    pub days_31_60: Decimal,
    #[serde(rename = "61-90")]
    pub days_61_90: Decimal,
    #[serde(rename = "90+")]
    pub days_over_90: Decimal,
}

impl AgingBuckets {
    fn slot(&mut self, days: i64) -> &mut Decimal {
        if days <= 30 {
            &mut self.days_0_30
        } else if days <= 60 {
            &mut self.days_31_60
        } else if days <= 90 {
            &mut self.days_61_90
        } else {
            &mut self.days_over_90
        }
    }
}

/// Billed is the tax-inclusive invoice total; TDS withheld by the payer counts as collected.
pub fn billing_summary(invoices: &[Invoice], receipts: &[Receipt]) -> BillingSummary {
    let total_billed: Decimal = invoices.iter().map(|i| i.amount_with_tax).sum();
    let total_collected: Decimal = receipts
        .iter()
        .map(|r| r.amount_received + r.tds_amount)
        .sum();

    BillingSummary {
        total_billed,
        total_collected,
        outstanding: total_billed - total_collected,
    }
}

/// Bucket issued invoices by `today - invoice_date`. Future-dated invoices land in 0-30.
pub fn aging_buckets(invoices: &[Invoice], today: NaiveDate) -> AgingBuckets {
    let mut buckets = AgingBuckets::default();
    for invoice in invoices.iter().filter(|i| i.status == STATUS_ISSUED) {
        let days = (today - invoice.invoice_date).num_days();
        *buckets.slot(days) += invoice.amount_with_tax;
    }
    buckets
}

/// Count proposals per status; only statuses that occur appear
pub fn proposal_status_counts(proposals: &[Proposal]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for proposal in proposals {
        *counts.entry(proposal.status.clone()).or_insert(0) += 1;
    }
    counts
}
