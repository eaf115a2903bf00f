//! Derived dashboard metrics.

use serde::{Deserialize, Serialize};

use crate::domain::Claim;

/// Placeholder workflow accuracy shown on the dashboard. This is a
/// fixed display value, not a computed statistic.
pub const WORKFLOW_ACCURACY: u32 = 99;

/// Aggregate exposure/recovery numbers for a claim collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Fixed placeholder, always [`WORKFLOW_ACCURACY`].
    pub workflow_accuracy: u32,
    /// Sum of estimated payouts over still-open claims. "Approved"
    /// counts as open exposure here even though approved claims already
    /// carry a payout; that inconsistency is the observed rule and is
    /// preserved, not resolved.
    pub open_claims_exposure: f64,
    /// Sum of approved payouts over Closed/Paid claims.
    pub closed_claims_recovered: f64,
}

/// Compute metrics from a claim collection.
///
/// Pure and order-independent: permuting the input does not change the
/// result, and the empty slice yields zero exposure/recovery.
pub fn derive_metrics(claims: &[Claim]) -> Metrics {
    let open_claims_exposure = claims
        .iter()
        .filter(|c| c.status.is_open_exposure())
        .map(|c| c.estimated_payout)
        .sum();

    let closed_claims_recovered = claims
        .iter()
        .filter(|c| c.status.is_terminal())
        .map(|c| c.approved_payout)
        .sum();

    Metrics {
        workflow_accuracy: WORKFLOW_ACCURACY,
        open_claims_exposure,
        closed_claims_recovered,
    }
}
