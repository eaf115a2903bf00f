//! Question catalogs for the two built-in wizards.
//!
//! Answer-bag keys line up with the fields `Claim::from_answers` and
//! `Policy::from_answers` derive their structured records from.

use serde_json::json;

use super::{Question, QuestionKind, QuestionOption};

/// Covered incident causes for AI-in-logistics operational liability.
fn incident_type_options() -> Vec<QuestionOption> {
    vec![
        QuestionOption::new("misroute", "Misroute - shipment sent to the wrong destination"),
        QuestionOption::new("delay", "Delay - delivery or operation late beyond agreed time"),
        QuestionOption::new("loss", "Loss - physical goods or data lost to a system error"),
        QuestionOption::new("prediction_failure", "Prediction failure - model error drove a wrong decision"),
        QuestionOption::new("pricing_error", "Pricing error - negotiated price below cost"),
        QuestionOption::new("system_outage", "System outage - automated service downtime"),
        QuestionOption::new("data_error", "Data error - wrong or corrupted data caused liability"),
    ]
}

/// Question sequence for the claim-filing wizard.
pub fn claim_intake_questions() -> Vec<Question> {
    vec![
        Question::new("workflowName", "Which workflow or system was involved?", QuestionKind::Text, "Incident")
            .required(),
        Question::new("incidentType", "What kind of incident was it?", QuestionKind::Select, "Incident")
            .required()
            .with_options(incident_type_options()),
        Question::new("severity", "How severe was the impact?", QuestionKind::Select, "Incident")
            .required()
            .with_options(vec![
                QuestionOption::new("low", "Low - minor disruption"),
                QuestionOption::new("medium", "Medium - noticeable operational impact"),
                QuestionOption::new("high", "High - significant loss or downtime"),
                QuestionOption::new("critical", "Critical - major outage or loss"),
            ]),
        Question::new("incidentDate", "When did the incident happen?", QuestionKind::Date, "Incident")
            .required(),
        Question::new("incidentTime", "Around what time?", QuestionKind::Time, "Incident"),
        Question::new("incidentLocation", "Where did it happen (hub, node, or system id)?", QuestionKind::Text, "Incident")
            .required(),
        Question::new("summary", "Describe what happened in a few sentences.", QuestionKind::Textarea, "Impact")
            .required(),
        Question::new("impactDetails", "What was the operational or financial impact?", QuestionKind::Textarea, "Impact")
            .required(),
        Question::new("damageEstimate", "Estimated damage amount (USD)?", QuestionKind::Number, "Impact")
            .required(),
        Question::new("policyId", "Policy to file against (leave blank if unsure)", QuestionKind::Text, "Review"),
        Question::new("confirmAccuracy", "I confirm the information above is accurate.", QuestionKind::Checkbox, "Review")
            .required(),
    ]
}

/// Question sequence for the policy-underwriting wizard.
pub fn policy_underwriting_questions() -> Vec<Question> {
    vec![
        Question::new("useCase", "What do you use AI or automation for?", QuestionKind::Select, "Operation")
            .required()
            .with_options(vec![
                QuestionOption::new("routing", "Routing and dispatch decisions"),
                QuestionOption::new("forecasting", "Demand or ETA forecasting"),
                QuestionOption::new("pricing", "Automated pricing and bidding"),
                QuestionOption::new("tracking", "Track & trace operations"),
                QuestionOption::new("other", "Something else"),
            ]),
        Question::new("coverageType", "What coverage are you looking for?", QuestionKind::Select, "Operation")
            .required()
            .with_options(vec![
                QuestionOption::new("operational_liability", "Operational liability"),
                QuestionOption::new("errors_omissions", "Errors & omissions"),
                QuestionOption::new("business_interruption", "Business interruption"),
            ]),
        Question::new("protectedAsset", "What asset or operation should be protected?", QuestionKind::Text, "Operation")
            .required(),
        Question::new("operationState", "Which state do you primarily operate in?", QuestionKind::Text, "Operation")
            .required(),
        Question::new("coverageLimit", "Desired per-claim coverage limit (USD)?", QuestionKind::Number, "Coverage")
            .required()
            .with_default(json!(50000)),
        Question::new("deductible", "Deductible you are comfortable with (USD)?", QuestionKind::Number, "Coverage")
            .with_default(json!(1000)),
        Question::new("monthlyBudget", "Monthly premium budget (USD)?", QuestionKind::Number, "Coverage")
            .with_default(json!(120)),
        Question::new("effectiveDate", "When should coverage start?", QuestionKind::Date, "Coverage")
            .required(),
        Question::new("notes", "Anything else the underwriter should know?", QuestionKind::Textarea, "Review"),
        Question::new("agreeTerms", "I agree to the quote terms.", QuestionKind::Checkbox, "Review")
            .required(),
    ]
}
