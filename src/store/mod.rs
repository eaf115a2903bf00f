//! Application domain store.
//!
//! [`DomainStore`] owns the whole in-memory object graph (users,
//! policies, claims, call requests, session) and flushes the entire
//! document through the persistence adapter after every mutation.
//! It is an explicitly constructed value, not a process-wide singleton;
//! one live instance per persisted document is assumed (two instances
//! racing on the same file is last-write-wins).

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{
    parse_currency, Answers, CallRequest, Claim, ClaimStatus, Policy, User,
};
use crate::error::{StoreError, StoreResult};
use crate::metrics::{derive_metrics, Metrics};
use crate::persistence::{Document, JsonStore};
use crate::relay::{CallRelay, CallSubmission};

/// Sign-up input.
#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Login input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Outcome of a call-request creation.
///
/// Relay failure is not an error at this boundary: the request is
/// recorded locally either way, and callers that care can tell the two
/// apart through this tag.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The relay failed; the request stays local/Queued (no retry).
    QueuedLocally(CallRequest),
    /// The relay accepted the request; the same record was flipped in
    /// place to remote/Submitted.
    SubmittedRemotely(CallRequest),
}

impl CallOutcome {
    /// The recorded call request regardless of outcome.
    pub fn call_request(&self) -> &CallRequest {
        match self {
            CallOutcome::QueuedLocally(call) | CallOutcome::SubmittedRemotely(call) => call,
        }
    }
}

/// In-memory object graph with load-modify-save persistence.
pub struct DomainStore {
    doc: Document,
    persistence: JsonStore,
    relay: Arc<dyn CallRelay>,
}

impl DomainStore {
    /// Open a store over the given persistence adapter and relay.
    ///
    /// The document is loaded once here and kept current in memory;
    /// every mutation rewrites the whole file.
    pub fn open(persistence: JsonStore, relay: Arc<dyn CallRelay>) -> Self {
        let doc = persistence.load();
        Self {
            doc,
            persistence,
            relay,
        }
    }

    /// The full document (read-only).
    pub fn document(&self) -> &Document {
        &self.doc
    }

    // --- auth -----------------------------------------------------------

    /// Create an account and sign it in.
    pub fn sign_up(&mut self, input: SignUpInput) -> StoreResult<User> {
        let email = normalize_email(&input.email);
        if self
            .doc
            .users
            .iter()
            .any(|u| normalize_email(&u.email) == email)
        {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User::new(input.full_name.trim(), email, input.password);
        self.doc.session.current_user_id = Some(user.id.clone());
        self.doc.users.insert(0, user.clone());
        self.persist();

        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Sign in with email and password (exact, plaintext comparison).
    pub fn login(&mut self, credentials: Credentials) -> StoreResult<User> {
        let email = normalize_email(&credentials.email);
        let user = self
            .doc
            .users
            .iter()
            .find(|u| normalize_email(&u.email) == email)
            .filter(|u| u.password == credentials.password)
            .cloned()
            .ok_or(StoreError::InvalidCredentials)?;

        self.doc.session.current_user_id = Some(user.id.clone());
        self.persist();

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Clear the session.
    pub fn logout(&mut self) {
        self.doc.session.current_user_id = None;
        self.persist();
    }

    // --- mutations ------------------------------------------------------

    /// Materialize a policy from wizard answers. Newest first.
    pub fn create_policy(&mut self, answers: Answers) -> StoreResult<Policy> {
        let user_id = self.require_user()?;
        let policy = Policy::from_answers(&user_id, answers);
        self.doc.policies.insert(0, policy.clone());
        self.persist();

        info!(policy_id = %policy.id, policy_number = %policy.policy_number, "Policy created");
        Ok(policy)
    }

    /// Materialize a claim from wizard answers. Newest first; the
    /// estimated payout is fixed here and never recomputed.
    pub fn create_claim(&mut self, answers: Answers) -> StoreResult<Claim> {
        let user_id = self.require_user()?;
        let claim = Claim::from_answers(&user_id, answers);
        self.doc.claims.insert(0, claim.clone());
        self.persist();

        info!(
            claim_id = %claim.id,
            estimated_payout = claim.estimated_payout,
            "Claim created"
        );
        Ok(claim)
    }

    /// Transition a claim to a new status.
    ///
    /// The approved payout is set only when the new status bears one
    /// (Approved/Paid/Closed), falling back to the claim's existing
    /// estimated payout when the supplied value is unparsable;
    /// `closed_at` is set only on terminal transitions (Closed/Paid).
    /// `updated_at` always advances.
    pub fn update_claim_status(
        &mut self,
        claim_id: &str,
        status: ClaimStatus,
        approved_payout: Option<Value>,
    ) -> StoreResult<Claim> {
        self.require_user()?;
        let claim = self
            .doc
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or_else(|| StoreError::ClaimNotFound {
                claim_id: claim_id.to_string(),
            })?;

        claim.status = status;
        claim.updated_at = chrono::Utc::now();
        if status.is_payout_bearing() {
            claim.approved_payout =
                parse_currency(approved_payout.as_ref(), claim.estimated_payout);
        }
        if status.is_terminal() {
            claim.closed_at = Some(claim.updated_at);
        }

        let updated = claim.clone();
        self.persist();

        info!(claim_id = %updated.id, status = %updated.status, "Claim status updated");
        Ok(updated)
    }

    /// Close a claim with an approved payout.
    ///
    /// No-op when not authenticated or the claim does not exist.
    pub fn close_claim(&mut self, claim_id: &str, approved_payout: Option<Value>) {
        let _ = self.update_claim_status(claim_id, ClaimStatus::Closed, approved_payout);
    }

    /// Record a call request locally, then relay it best-effort.
    ///
    /// The local record is persisted before the relay attempt. On relay
    /// success the same record is flipped in place to remote/Submitted
    /// and persisted again; on failure it stays local/Queued and the
    /// operation still succeeds. One attempt, no retry.
    pub async fn create_call_request(
        &mut self,
        phone: impl Into<String>,
        topic: impl Into<String>,
    ) -> StoreResult<CallOutcome> {
        let user_id = self.require_user()?;
        let call = CallRequest::new_local(&user_id, phone, topic);
        self.doc.call_requests.insert(0, call.clone());
        self.persist();

        let submission = CallSubmission {
            user_id,
            phone: call.phone.clone(),
            topic: call.topic.clone(),
        };

        match self.relay.submit(&submission).await {
            Ok(receipt) => {
                let call = self
                    .doc
                    .call_requests
                    .iter_mut()
                    .find(|c| c.id == call.id)
                    .map(|c| {
                        c.mark_submitted(&receipt.request_id);
                        c.clone()
                    })
                    .unwrap_or(call);
                self.persist();

                info!(call_id = %call.id, remote_id = %receipt.request_id, "Call request submitted");
                Ok(CallOutcome::SubmittedRemotely(call))
            }
            Err(e) => {
                // Best-effort by contract: the caller still gets the
                // locally queued record back.
                warn!(call_id = %call.id, error = %e, "Relay failed; call request stays queued locally");
                Ok(CallOutcome::QueuedLocally(call))
            }
        }
    }

    // --- read views -----------------------------------------------------

    /// Currently signed-in user.
    pub fn current_user(&self) -> Option<&User> {
        let id = self.doc.session.current_user_id.as_deref()?;
        self.doc.users.iter().find(|u| u.id == id)
    }

    /// Policies owned by the current user, newest first.
    pub fn user_policies(&self) -> Vec<Policy> {
        match self.doc.session.current_user_id.as_deref() {
            Some(id) => self
                .doc
                .policies
                .iter()
                .filter(|p| p.user_id == id)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Claims filed by the current user, newest first.
    pub fn user_claims(&self) -> Vec<Claim> {
        match self.doc.session.current_user_id.as_deref() {
            Some(id) => self
                .doc
                .claims
                .iter()
                .filter(|c| c.user_id == id)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Dashboard metrics over the current user's claims.
    pub fn metrics(&self) -> Metrics {
        derive_metrics(&self.user_claims())
    }

    // --- internals ------------------------------------------------------

    fn require_user(&self) -> StoreResult<String> {
        self.current_user()
            .map(|u| u.id.clone())
            .ok_or(StoreError::NotAuthenticated)
    }

    /// Flush the whole document. Failures degrade to a log line: no
    /// store operation is fatal to the process.
    fn persist(&self) {
        if let Err(e) = self.persistence.save(&self.doc) {
            warn!(error = %e, "Failed to persist document");
        }
    }
}

/// Email normalization used for uniqueness and lookup.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
