use axum::extract::State;
use chrono::Utc;
use std::collections::BTreeMap;

use crate::app::AppState;
use crate::database::models::invoice::STATUS_ISSUED;
use crate::database::models::{Invoice, Proposal, Receipt};
use crate::database::store::SelectQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::report_service::{self, AgingBuckets, BillingSummary};

/// GET /api/reports/billing - Billed, collected and outstanding totals
pub async fn billing(State(state): State<AppState>) -> ApiResult<BillingSummary> {
    let invoices = state.repository::<Invoice>()?.list().await?;
    let receipts = state.repository::<Receipt>()?.list().await?;
    Ok(ApiResponse::success(report_service::billing_summary(&invoices, &receipts)))
}

/// GET /api/reports/aging - Issued invoices bucketed by age
pub async fn aging(State(state): State<AppState>) -> ApiResult<AgingBuckets> {
    let issued = state
        .repository::<Invoice>()?
        .select(&SelectQuery::all().eq("status", STATUS_ISSUED))
        .await?;
    let today = Utc::now().date_naive();
    Ok(ApiResponse::success(report_service::aging_buckets(&issued, today)))
}

/// GET /api/reports/proposals - Proposal count per status
pub async fn proposals(State(state): State<AppState>) -> ApiResult<BTreeMap<String, u64>> {
    let proposals = state.repository::<Proposal>()?.list().await?;
    Ok(ApiResponse::success(report_service::proposal_status_counts(&proposals)))
}
