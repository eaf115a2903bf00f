//! Claim-assistant service boundary.
//!
//! The chat-based intake assistant is an external collaborator; only
//! its wire contract lives here. A chat turn carries free text plus
//! optional image references and a session id, and comes back with a
//! reply, a structured partial claim, an optional policy issue, and a
//! completeness flag. A separate submit call turns a completed session
//! into a final claim id.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::{AssistantConfig, RequestConfig};
use crate::domain::Answers;
use crate::error::{AssistantError, AssistantResult};
use crate::flow::{FlowAssistant, Suggestion, SuggestionContext};

/// One chat turn sent to the assistant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    /// Free-text user message.
    pub message: String,
    /// Session to continue, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// References to attached images/log files.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_refs: Vec<String>,
}

impl ChatTurnRequest {
    /// Create a turn with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            image_refs: Vec::new(),
        }
    }

    /// Continue an existing session.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Attach image references.
    pub fn with_images(mut self, image_refs: Vec<String>) -> Self {
        self.image_refs = image_refs;
        self
    }
}

/// Structured partial claim the assistant has extracted so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDraft {
    pub claimant_name: Option<String>,
    pub policy_number: Option<String>,
    pub incident_type: Option<String>,
    pub incident_description: Option<String>,
    pub estimated_cost: Option<f64>,
}

/// Problem the assistant found while resolving the stated policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyIssue {
    PolicyNotFound,
    NameMismatch,
}

/// Assistant response to one chat turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    /// Assistant free-text reply.
    pub reply: String,
    /// Session id to continue with.
    pub session_id: String,
    /// Partial claim extracted so far.
    #[serde(default)]
    pub claim: ClaimDraft,
    /// Policy lookup problem, if the assistant hit one.
    #[serde(default)]
    pub policy_issue: Option<PolicyIssue>,
    /// Whether the assistant considers the intake complete.
    pub is_complete: bool,
}

/// Confirmation returned for a completed intake session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimResponse {
    pub claim_id: String,
    pub message: String,
}

/// HTTP client for the claim-assistant service.
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AssistantClient {
    /// Create a new assistant client.
    pub fn new(config: &AssistantConfig, request_config: &RequestConfig) -> AssistantResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(AssistantError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat turn.
    pub async fn chat_turn(&self, request: &ChatTurnRequest) -> AssistantResult<ChatTurnResponse> {
        let url = format!("{}/api/chat", self.base_url);

        debug!(
            session = request.session_id.as_deref().unwrap_or("new"),
            images = request.image_refs.len(),
            "Sending chat turn to assistant"
        );

        let mut builder = self.client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(AssistantError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<ChatTurnResponse>()
            .await
            .map_err(|e| AssistantError::InvalidResponse {
                message: format!("Failed to parse chat response: {}", e),
            })
    }

    /// Submit a completed intake session as a final claim.
    pub async fn submit_claim(&self, session_id: &str) -> AssistantResult<SubmitClaimResponse> {
        let url = format!("{}/api/submit-claim", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .json(&json!({ "sessionId": session_id }));
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(AssistantError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let confirmation: SubmitClaimResponse =
            response
                .json()
                .await
                .map_err(|e| AssistantError::InvalidResponse {
                    message: format!("Failed to parse submit-claim response: {}", e),
                })?;

        info!(claim_id = %confirmation.claim_id, "Assistant session submitted as claim");

        Ok(confirmation)
    }
}

/// Map a partial claim onto wizard answer keys.
///
/// Only populated fields are emitted, so the result can feed the flow
/// engine's draft merge directly.
pub fn draft_answers(draft: &ClaimDraft) -> Answers {
    let mut answers = Answers::new();
    if let Some(name) = &draft.claimant_name {
        answers.insert("claimantName".to_string(), json!(name));
    }
    if let Some(policy) = &draft.policy_number {
        answers.insert("policyId".to_string(), json!(policy));
    }
    if let Some(kind) = &draft.incident_type {
        answers.insert("incidentType".to_string(), json!(kind));
    }
    if let Some(description) = &draft.incident_description {
        answers.insert("summary".to_string(), json!(description));
    }
    if let Some(cost) = draft.estimated_cost {
        answers.insert("damageEstimate".to_string(), json!(cost));
    }
    answers
}

/// Flow-engine assistant backed by a captured [`ClaimDraft`].
///
/// Suggests the drafted value for whichever question is current and
/// surfaces policy-lookup problems as a notice. Pure over the captured
/// draft; the engine still controls when values are applied.
pub struct ClaimDraftAssistant {
    draft: ClaimDraft,
    policy_issue: Option<PolicyIssue>,
}

impl ClaimDraftAssistant {
    pub fn new(draft: ClaimDraft, policy_issue: Option<PolicyIssue>) -> Self {
        Self {
            draft,
            policy_issue,
        }
    }
}

impl FlowAssistant for ClaimDraftAssistant {
    fn suggestion(&self, ctx: SuggestionContext<'_>) -> Option<Suggestion> {
        let prefill = draft_answers(&self.draft);
        let value = prefill.get(ctx.question.id.as_str()).cloned();

        let notice = match (self.policy_issue, ctx.question.id.as_str()) {
            (Some(PolicyIssue::PolicyNotFound), "policyId") => {
                Some("We could not find that policy number.".to_string())
            }
            (Some(PolicyIssue::NameMismatch), "policyId") => {
                Some("The policyholder name does not match this account.".to_string())
            }
            _ => None,
        };

        if value.is_none() && notice.is_none() {
            return None;
        }

        Some(Suggestion {
            tip: value
                .is_some()
                .then(|| "Suggested from your chat with the assistant.".to_string()),
            value,
            notice,
        })
    }

    fn draft(&self, _answers: &Answers) -> Answers {
        draft_answers(&self.draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Answers;
    use crate::flow::{claim_intake_questions, FlowEngine};

    fn sample_draft() -> ClaimDraft {
        ClaimDraft {
            claimant_name: Some("Acme Corp".to_string()),
            policy_number: Some("RX-PL-123456-AB12".to_string()),
            incident_type: Some("misroute".to_string()),
            incident_description: Some("Shipment routed to the wrong hub".to_string()),
            estimated_cost: Some(2500.0),
        }
    }

    #[test]
    fn test_draft_answers_only_populated_fields() {
        let draft = ClaimDraft {
            incident_type: Some("delay".to_string()),
            ..ClaimDraft::default()
        };
        let answers = draft_answers(&draft);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get("incidentType"), Some(&json!("delay")));
    }

    #[test]
    fn test_draft_prefills_claim_flow() {
        let mut engine = FlowEngine::new(claim_intake_questions(), Answers::new())
            .with_assistant(Box::new(ClaimDraftAssistant::new(sample_draft(), None)));

        let merged = engine.apply_draft();
        assert!(merged >= 3);
        assert_eq!(engine.answers().get("incidentType"), Some(&json!("misroute")));
        assert_eq!(engine.answers().get("damageEstimate"), Some(&json!(2500.0)));
    }

    #[test]
    fn test_policy_issue_surfaces_as_notice() {
        let questions = claim_intake_questions();
        let policy_step = questions.iter().position(|q| q.id == "policyId").unwrap();

        let mut engine = FlowEngine::new(questions, Answers::new()).with_assistant(Box::new(
            ClaimDraftAssistant::new(sample_draft(), Some(PolicyIssue::PolicyNotFound)),
        ));
        // Walk to the policy step without validation by answering everything
        engine.apply_draft();
        for _ in 0..policy_step {
            let id = engine.current_question().id.clone();
            if engine.answers().get(&id).is_none() {
                engine.set_answer(&id, json!("filled"));
            }
            engine.next();
        }
        assert_eq!(engine.step_index(), policy_step);

        let suggestion = engine.suggestion().unwrap();
        assert!(suggestion.notice.unwrap().contains("could not find"));
    }

    #[test]
    fn test_policy_issue_wire_names() {
        assert_eq!(
            serde_json::to_value(PolicyIssue::PolicyNotFound).unwrap(),
            json!("policy_not_found")
        );
        assert_eq!(
            serde_json::to_value(PolicyIssue::NameMismatch).unwrap(),
            json!("name_mismatch")
        );
    }
}
