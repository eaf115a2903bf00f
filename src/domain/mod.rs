//! Domain model for the Rex claims workspace.
//!
//! Entities mirror the persisted JSON document: users, policies, claims,
//! and call requests, plus the single-session state. All records carry
//! opaque ids prefixed by entity kind (`user_...`, `policy_...`,
//! `claim_...`, `call_...`) and serialize with camelCase field names to
//! stay wire-compatible with the persisted document layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ids::create_id;

/// Open key-value bag of wizard answers, retained verbatim for audit.
///
/// Structured entity fields are derived from this bag at creation time
/// and never resynchronized with it afterwards.
pub type Answers = serde_json::Map<String, Value>;

/// Share of the damage estimate offered as the initial payout estimate.
pub const ESTIMATED_PAYOUT_RATE: f64 = 0.85;

/// Currency fallback defaults applied when a wizard answer fails to parse.
pub const DEFAULT_COVERAGE_LIMIT: f64 = 50000.0;
pub const DEFAULT_DEDUCTIBLE: f64 = 1000.0;
pub const DEFAULT_MONTHLY_PREMIUM: f64 = 120.0;
pub const DEFAULT_DAMAGE_ESTIMATE: f64 = 1500.0;

/// A workspace account.
///
/// Passwords are stored and compared in plain text, faithfully to the
/// system this models. Known deficiency; do not reuse this store for
/// anything that needs real authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: String,
    /// Display name.
    pub full_name: String,
    /// Normalized (trimmed, lowercased) email; unique per store.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user from already-normalized credentials.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: create_id("user"),
            full_name: full_name.into(),
            email: email.into(),
            password: password.into(),
            created_at: Utc::now(),
        }
    }
}

/// The single active session for a store instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Currently signed-in user, if any.
    pub current_user_id: Option<String>,
}

/// Lifecycle status of a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    #[default]
    Active,
    #[serde(rename = "Pending review")]
    PendingReview,
    Quoted,
    Expired,
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyStatus::Active => write!(f, "Active"),
            PolicyStatus::PendingReview => write!(f, "Pending review"),
            PolicyStatus::Quoted => write!(f, "Quoted"),
            PolicyStatus::Expired => write!(f, "Expired"),
        }
    }
}

impl std::str::FromStr for PolicyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PolicyStatus::Active),
            "pending review" => Ok(PolicyStatus::PendingReview),
            "quoted" => Ok(PolicyStatus::Quoted),
            "expired" => Ok(PolicyStatus::Expired),
            _ => Err(format!("Unknown policy status: {}", s)),
        }
    }
}

/// An underwritten (or quoted) policy. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Unique policy identifier.
    pub id: String,
    /// Owning user; must reference an existing user.
    pub user_id: String,
    /// Lifecycle status.
    pub status: PolicyStatus,
    /// Human-readable policy number; NOT guaranteed globally unique.
    pub policy_number: String,
    pub use_case: String,
    pub coverage_type: String,
    pub protected_asset: String,
    pub operation_state: String,
    /// Per-claim liability cap, currency, >= 0.
    pub coverage_limit: f64,
    /// Deductible per claim, currency, >= 0.
    pub deductible: f64,
    /// Monthly premium, currency, >= 0.
    pub monthly_premium: f64,
    /// Calendar date as captured from the wizard (e.g. "2026-09-01").
    pub effective_date: String,
    pub notes: String,
    pub proof_of_insurance_id: String,
    /// When the policy record was created.
    pub created_at: DateTime<Utc>,
    /// Raw wizard answers, retained for audit/replay.
    pub answers: Answers,
}

impl Policy {
    /// Build a policy record for `user_id` from a wizard answer bag.
    ///
    /// Currency fields apply the parse-with-fallback rule; everything
    /// else is copied from the bag as captured. The bag itself is kept
    /// verbatim on the record.
    pub fn from_answers(user_id: &str, answers: Answers) -> Self {
        let id = create_id("policy");
        let policy_number = reference_number("PL");
        Self {
            id,
            user_id: user_id.to_string(),
            status: PolicyStatus::Active,
            proof_of_insurance_id: reference_number("POI"),
            policy_number,
            use_case: answer_string(&answers, "useCase"),
            coverage_type: answer_string(&answers, "coverageType"),
            protected_asset: answer_string(&answers, "protectedAsset"),
            operation_state: answer_string(&answers, "operationState"),
            coverage_limit: parse_currency(answers.get("coverageLimit"), DEFAULT_COVERAGE_LIMIT),
            deductible: parse_currency(answers.get("deductible"), DEFAULT_DEDUCTIBLE),
            monthly_premium: parse_currency(answers.get("monthlyBudget"), DEFAULT_MONTHLY_PREMIUM),
            effective_date: answer_string(&answers, "effectiveDate"),
            notes: answer_string(&answers, "notes"),
            created_at: Utc::now(),
            answers,
        }
    }
}

/// Lifecycle status of a claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Legacy value still accepted from older documents.
    Open,
    #[default]
    #[serde(rename = "In review")]
    InReview,
    #[serde(rename = "Needs info")]
    NeedsInfo,
    Approved,
    Denied,
    Closed,
    Paid,
}

impl ClaimStatus {
    /// Whether this status still counts toward open exposure.
    ///
    /// "Approved" is included here on purpose: the observed metrics rule
    /// treats approved-but-unpaid claims as open exposure even though
    /// the status-update path already lets them carry an approved
    /// payout. Preserved as-is, not resolved.
    pub fn is_open_exposure(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Open | ClaimStatus::InReview | ClaimStatus::NeedsInfo | ClaimStatus::Approved
        )
    }

    /// Whether this status carries an approved payout.
    pub fn is_payout_bearing(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Paid | ClaimStatus::Closed)
    }

    /// Whether this status terminates the claim (sets `closed_at`).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Closed | ClaimStatus::Paid)
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Open => write!(f, "Open"),
            ClaimStatus::InReview => write!(f, "In review"),
            ClaimStatus::NeedsInfo => write!(f, "Needs info"),
            ClaimStatus::Approved => write!(f, "Approved"),
            ClaimStatus::Denied => write!(f, "Denied"),
            ClaimStatus::Closed => write!(f, "Closed"),
            ClaimStatus::Paid => write!(f, "Paid"),
        }
    }
}

impl std::str::FromStr for ClaimStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(ClaimStatus::Open),
            "in review" => Ok(ClaimStatus::InReview),
            "needs info" => Ok(ClaimStatus::NeedsInfo),
            "approved" => Ok(ClaimStatus::Approved),
            "denied" => Ok(ClaimStatus::Denied),
            "closed" => Ok(ClaimStatus::Closed),
            "paid" => Ok(ClaimStatus::Paid),
            _ => Err(format!("Unknown claim status: {}", s)),
        }
    }
}

/// A filed claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// Unique claim identifier.
    pub id: String,
    /// Claimant (owning user).
    pub user_id: String,
    /// Lifecycle status; initial = "In review".
    pub status: ClaimStatus,
    /// Human-readable claim number; NOT guaranteed globally unique.
    pub claim_number: String,
    /// Policy this claim was filed against, when one was selected.
    pub policy_id: Option<String>,
    pub workflow_name: String,
    pub incident_type: String,
    pub severity: String,
    /// Incident date/time/location as captured from the wizard.
    pub incident_date: String,
    pub incident_time: String,
    pub incident_location: String,
    pub summary: String,
    pub impact_details: String,
    /// Requested amount, currency, >= 0.
    pub damage_estimate: f64,
    /// Fixed at creation as round(0.85 * damage_estimate); never recomputed.
    pub estimated_payout: f64,
    /// Meaningful only once status is Approved/Paid/Closed. Default 0.
    pub approved_payout: f64,
    /// Ordered file references attached as evidence.
    pub evidence_files: Vec<String>,
    /// When the claim was filed.
    pub created_at: DateTime<Utc>,
    /// Advanced on every mutation; always >= `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Set only on transition to Closed/Paid.
    pub closed_at: Option<DateTime<Utc>>,
    /// Raw wizard answers, retained for audit/replay.
    pub answers: Answers,
}

impl Claim {
    /// Build a claim record for `user_id` from a wizard answer bag.
    pub fn from_answers(user_id: &str, answers: Answers) -> Self {
        let damage_estimate =
            parse_currency(answers.get("damageEstimate"), DEFAULT_DAMAGE_ESTIMATE);
        let now = Utc::now();
        Self {
            id: create_id("claim"),
            user_id: user_id.to_string(),
            status: ClaimStatus::InReview,
            claim_number: reference_number("CL"),
            policy_id: answers
                .get("policyId")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
            workflow_name: answer_string(&answers, "workflowName"),
            incident_type: answer_string(&answers, "incidentType"),
            severity: answer_string(&answers, "severity"),
            incident_date: answer_string(&answers, "incidentDate"),
            incident_time: answer_string(&answers, "incidentTime"),
            incident_location: answer_string(&answers, "incidentLocation"),
            summary: answer_string(&answers, "summary"),
            impact_details: answer_string(&answers, "impactDetails"),
            damage_estimate,
            estimated_payout: (ESTIMATED_PAYOUT_RATE * damage_estimate).round(),
            approved_payout: 0.0,
            evidence_files: answers
                .get("evidenceFiles")
                .and_then(Value::as_array)
                .map(|files| {
                    files
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            created_at: now,
            updated_at: now,
            closed_at: None,
            answers,
        }
    }
}

/// Submission state of a call request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallRequestStatus {
    /// Recorded locally, not yet accepted by the remote intake service.
    #[default]
    Queued,
    /// Accepted by the remote intake service.
    Submitted,
}

impl std::fmt::Display for CallRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallRequestStatus::Queued => write!(f, "Queued"),
            CallRequestStatus::Submitted => write!(f, "Submitted"),
        }
    }
}

/// Where the authoritative copy of a call request lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallRequestSource {
    #[default]
    Local,
    Remote,
}

impl std::fmt::Display for CallRequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallRequestSource::Local => write!(f, "local"),
            CallRequestSource::Remote => write!(f, "remote"),
        }
    }
}

/// A callback request, recorded locally first and relayed best-effort.
///
/// Once flipped to remote/Submitted it is never rolled back; if the
/// relay fails it stays local/Queued forever (no retry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Unique call-request identifier.
    pub id: String,
    pub user_id: String,
    pub phone: String,
    pub topic: String,
    pub status: CallRequestStatus,
    /// Intake endpoint path this request targets.
    pub endpoint: String,
    pub created_at: DateTime<Utc>,
    pub source: CallRequestSource,
    /// Server-assigned id, present once submitted remotely.
    pub remote_request_id: Option<String>,
}

impl CallRequest {
    /// Record a new local/Queued call request.
    pub fn new_local(user_id: &str, phone: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: create_id("call"),
            user_id: user_id.to_string(),
            phone: phone.into(),
            topic: topic.into(),
            status: CallRequestStatus::Queued,
            endpoint: "/api/rexy/calls".to_string(),
            created_at: Utc::now(),
            source: CallRequestSource::Local,
            remote_request_id: None,
        }
    }

    /// Flip this request to remote/Submitted with the relay's id.
    pub fn mark_submitted(&mut self, remote_request_id: impl Into<String>) {
        self.status = CallRequestStatus::Submitted;
        self.source = CallRequestSource::Remote;
        self.remote_request_id = Some(remote_request_id.into());
    }
}

/// Parse a monetary answer value, falling back on anything unparsable.
///
/// Numbers pass through as-is. Any other value is stringified, stripped
/// to digits and `.`, and parsed as f64; a non-finite or failed parse
/// yields the fallback. This never errors.
pub fn parse_currency(value: Option<&Value>, fallback: f64) -> f64 {
    let value = match value {
        Some(v) => v,
        None => return fallback,
    };
    if let Some(n) = value.as_f64() {
        return if n.is_finite() { n } else { fallback };
    }
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    match digits.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => fallback,
    }
}

/// Fetch a string answer by key; missing/null values become "".
pub fn answer_string(answers: &Answers, key: &str) -> String {
    match answers.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Generate a human-readable reference number (policy/claim/proof).
///
/// Same weak-uniqueness stance as `create_id`: readable and distinct in
/// practice, not a global uniqueness guarantee.
fn reference_number(tag: &str) -> String {
    let millis = Utc::now().timestamp_millis() % 1_000_000;
    let fragment = Uuid::new_v4().simple().to_string()[..4].to_uppercase();
    format!("RX-{}-{}-{}", tag, millis, fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answers_from(value: Value) -> Answers {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn test_parse_currency_passthrough_number() {
        assert_eq!(parse_currency(Some(&json!(1234.5)), 0.0), 1234.5);
        assert_eq!(parse_currency(Some(&json!(0)), 99.0), 0.0);
    }

    #[test]
    fn test_parse_currency_strips_formatting() {
        assert_eq!(parse_currency(Some(&json!("$1,500")), 0.0), 1500.0);
        assert_eq!(parse_currency(Some(&json!("about 2500 usd")), 0.0), 2500.0);
        assert_eq!(parse_currency(Some(&json!("12.50")), 0.0), 12.5);
    }

    #[test]
    fn test_parse_currency_fallback() {
        assert_eq!(parse_currency(Some(&json!("no digits here")), 42.0), 42.0);
        assert_eq!(parse_currency(Some(&json!("")), 42.0), 42.0);
        assert_eq!(parse_currency(None, 42.0), 42.0);
        assert_eq!(parse_currency(Some(&json!(null)), 42.0), 42.0);
        // Multiple dots parse to nothing sensible
        assert_eq!(parse_currency(Some(&json!("1.2.3")), 42.0), 42.0);
    }

    #[test]
    fn test_claim_from_answers_derives_payout() {
        let answers = answers_from(json!({
            "damageEstimate": 1000,
            "incidentType": "misroute",
            "summary": "Shipment sent to the wrong hub",
        }));
        let claim = Claim::from_answers("user_1_a", answers);
        assert_eq!(claim.estimated_payout, 850.0);
        assert_eq!(claim.status, ClaimStatus::InReview);
        assert_eq!(claim.approved_payout, 0.0);
        assert!(claim.closed_at.is_none());
        assert_eq!(claim.incident_type, "misroute");
        // Raw bag retained for audit
        assert_eq!(claim.answers.get("damageEstimate"), Some(&json!(1000)));
    }

    #[test]
    fn test_claim_from_answers_currency_default() {
        let claim = Claim::from_answers("user_1_a", answers_from(json!({})));
        assert_eq!(claim.damage_estimate, DEFAULT_DAMAGE_ESTIMATE);
        assert_eq!(claim.estimated_payout, (0.85f64 * 1500.0).round());
        assert!(claim.policy_id.is_none());
    }

    #[test]
    fn test_policy_from_answers_defaults() {
        let policy = Policy::from_answers("user_1_a", answers_from(json!({})));
        assert_eq!(policy.coverage_limit, DEFAULT_COVERAGE_LIMIT);
        assert_eq!(policy.deductible, DEFAULT_DEDUCTIBLE);
        assert_eq!(policy.monthly_premium, DEFAULT_MONTHLY_PREMIUM);
        assert_eq!(policy.status, PolicyStatus::Active);
        assert!(policy.policy_number.starts_with("RX-PL-"));
    }

    #[test]
    fn test_claim_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ClaimStatus::InReview).unwrap(),
            json!("In review")
        );
        assert_eq!(
            serde_json::to_value(ClaimStatus::NeedsInfo).unwrap(),
            json!("Needs info")
        );
        let parsed: ClaimStatus = serde_json::from_value(json!("Paid")).unwrap();
        assert_eq!(parsed, ClaimStatus::Paid);
    }

    #[test]
    fn test_claim_status_classification() {
        assert!(ClaimStatus::Approved.is_open_exposure());
        assert!(ClaimStatus::Approved.is_payout_bearing());
        assert!(!ClaimStatus::Approved.is_terminal());
        assert!(ClaimStatus::Paid.is_terminal());
        assert!(!ClaimStatus::NeedsInfo.is_payout_bearing());
        assert!(!ClaimStatus::Denied.is_open_exposure());
    }

    #[test]
    fn test_claim_status_from_str() {
        assert_eq!("in review".parse::<ClaimStatus>().unwrap(), ClaimStatus::InReview);
        assert_eq!("Needs info".parse::<ClaimStatus>().unwrap(), ClaimStatus::NeedsInfo);
        assert!("unknown".parse::<ClaimStatus>().is_err());
    }

    #[test]
    fn test_call_request_lifecycle() {
        let mut call = CallRequest::new_local("user_1_a", "+1 555 0100", "billing");
        assert_eq!(call.status, CallRequestStatus::Queued);
        assert_eq!(call.source, CallRequestSource::Local);
        assert_eq!(call.endpoint, "/api/rexy/calls");

        call.mark_submitted("req-42");
        assert_eq!(call.status, CallRequestStatus::Submitted);
        assert_eq!(call.source, CallRequestSource::Remote);
        assert_eq!(call.remote_request_id.as_deref(), Some("req-42"));
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let user = User::new("Ada Lovelace", "ada@example.com", "pw");
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("fullName").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("full_name").is_none());
    }
}
