//! Multi-step intake flow engine.
//!
//! A generic one-question-at-a-time wizard state machine. Both the
//! claim-filing and the policy-underwriting wizards run on this engine;
//! the question sequences themselves live in [`catalog`].
//!
//! State is `(step_index, answers, error, is_submitting)` with the
//! initial state `(0, seeded answers, None, false)`. The engine has no
//! explicit terminal state: once the caller's submit callback resolves,
//! control returns to the host.

mod catalog;

pub use catalog::{claim_intake_questions, policy_underwriting_questions};

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::Answers;

/// Input kind of a wizard question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Textarea,
    Select,
    Checkbox,
    Date,
    Time,
    Tel,
    Number,
    Email,
}

/// One choice for a select question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub value: String,
    pub label: String,
}

impl QuestionOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Descriptor for a single wizard question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Answer-bag key this question writes.
    pub id: String,
    /// Prompt shown to the user.
    pub label: String,
    /// Input kind.
    pub kind: QuestionKind,
    /// Whether an answer is required to advance past this step.
    pub required: bool,
    /// Section grouping for progress display.
    pub section: String,
    /// Choices for select questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<QuestionOption>,
    /// Initial answer seeded before any caller-supplied answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl Question {
    /// Create an optional question.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: QuestionKind,
        section: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            section: section.into(),
            options: Vec::new(),
            default_value: None,
        }
    }

    /// Mark the question as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach select options.
    pub fn with_options(mut self, options: Vec<QuestionOption>) -> Self {
        self.options = options;
        self
    }

    /// Seed a default answer.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A hint produced by the assistant extension for one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Proposed answer value; applied only via [`FlowEngine::apply_suggestion`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Short inline tip for the current question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    /// Prominent notice (e.g. a policy lookup problem).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Read-only context handed to the assistant extension.
pub struct SuggestionContext<'a> {
    pub question: &'a Question,
    pub answers: &'a Answers,
    pub step_index: usize,
    pub questions: &'a [Question],
}

/// Optional assistant extension point for a flow.
///
/// Implementations must be pure: the engine only reads the returned
/// hints and never lets them mutate state except through the explicit
/// apply/merge operations.
pub trait FlowAssistant {
    /// Hint for the given step, if any.
    fn suggestion(&self, ctx: SuggestionContext<'_>) -> Option<Suggestion>;

    /// Bulk prefill derived from the answers gathered so far.
    fn draft(&self, answers: &Answers) -> Answers {
        let _ = answers;
        Answers::new()
    }
}

/// Per-section progress entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProgress {
    pub label: String,
    /// Questions in this section with a present answer.
    pub answered: usize,
    pub total: usize,
    /// Whether the current step falls inside this section's index range.
    pub is_current: bool,
    /// Whether every question in this section has an answer.
    pub is_done: bool,
}

/// Derived progress view over the whole flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowProgress {
    pub percent_complete: f64,
    pub sections: Vec<SectionProgress>,
}

/// Sequential question-answering state machine.
pub struct FlowEngine {
    questions: Vec<Question>,
    step_index: usize,
    answers: Answers,
    error: Option<String>,
    is_submitting: bool,
    assistant: Option<Box<dyn FlowAssistant + Send + Sync>>,
}

impl FlowEngine {
    /// Create an engine over an ordered question sequence.
    ///
    /// Answers are seeded from each question's default value, then
    /// overridden by any caller-supplied initial answers.
    pub fn new(questions: Vec<Question>, initial_answers: Answers) -> Self {
        let mut answers = Answers::new();
        for question in &questions {
            if let Some(default) = &question.default_value {
                answers.insert(question.id.clone(), default.clone());
            }
        }
        for (key, value) in initial_answers {
            answers.insert(key, value);
        }
        Self {
            questions,
            step_index: 0,
            answers,
            error: None,
            is_submitting: false,
            assistant: None,
        }
    }

    /// Attach an assistant extension.
    pub fn with_assistant(mut self, assistant: Box<dyn FlowAssistant + Send + Sync>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Current 0-based step position.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Number of questions in the flow.
    pub fn total_steps(&self) -> usize {
        self.questions.len()
    }

    /// The question at the current step.
    pub fn current_question(&self) -> &Question {
        &self.questions[self.step_index]
    }

    /// All questions in order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The answer bag as gathered so far.
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Current validation error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a submit callback is in flight (or has resolved).
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Record an answer for a question and clear any current-step error.
    pub fn set_answer(&mut self, question_id: &str, value: Value) {
        self.answers.insert(question_id.to_string(), value);
        self.error = None;
    }

    /// Validation rule for a single question/value pair.
    ///
    /// Optional questions always pass. Checkboxes require a truthy
    /// value; everything else requires a non-empty trimmed string form.
    pub fn is_valid(question: &Question, value: Option<&Value>) -> bool {
        if !question.required {
            return true;
        }
        match question.kind {
            QuestionKind::Checkbox => is_truthy(value),
            _ => !value_text(value).trim().is_empty(),
        }
    }

    /// Advance one step, clamped to the last question.
    ///
    /// Blocked (returns false, sets the error) when the current required
    /// question has no valid answer. Advancing past the last step is a
    /// no-op, not an error.
    pub fn next(&mut self) -> bool {
        if !self.validate_current() {
            return false;
        }
        if self.step_index + 1 < self.questions.len() {
            self.step_index += 1;
        }
        debug!(step = self.step_index, "Flow advanced");
        true
    }

    /// Step back one question, clamped to 0. Clears the error.
    pub fn back(&mut self) {
        self.step_index = self.step_index.saturating_sub(1);
        self.error = None;
    }

    /// Submit the flow through the caller's completion callback.
    ///
    /// Validation failure on the current step aborts before the callback
    /// runs. On callback failure the error message is surfaced and
    /// `is_submitting` is cleared; on success `is_submitting` stays set,
    /// since the host is expected to navigate away.
    pub async fn submit<T, E, F, Fut>(&mut self, on_submit: F) -> Option<T>
    where
        F: FnOnce(Answers) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        if !self.validate_current() {
            return None;
        }
        self.is_submitting = true;
        match on_submit(self.answers.clone()).await {
            Ok(result) => Some(result),
            Err(e) => {
                self.error = Some(e.to_string());
                self.is_submitting = false;
                None
            }
        }
    }

    /// Derived progress/section view.
    pub fn progress(&self) -> FlowProgress {
        let total = self.questions.len().max(1);
        let percent_complete = 100.0 * (self.step_index + 1) as f64 / total as f64;

        let mut sections: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, question) in self.questions.iter().enumerate() {
            match sections.iter_mut().find(|(label, _)| *label == question.section) {
                Some((_, indices)) => indices.push(index),
                None => sections.push((question.section.clone(), vec![index])),
            }
        }

        let sections = sections
            .into_iter()
            .map(|(label, indices)| {
                let answered = indices
                    .iter()
                    .filter(|&&i| self.has_answer(&self.questions[i]))
                    .count();
                let first = *indices.first().unwrap_or(&0);
                let last = *indices.last().unwrap_or(&0);
                SectionProgress {
                    label,
                    answered,
                    total: indices.len(),
                    is_current: (first..=last).contains(&self.step_index),
                    is_done: answered == indices.len(),
                }
            })
            .collect();

        FlowProgress {
            percent_complete,
            sections,
        }
    }

    /// Assistant hint for the current step, if an assistant is attached.
    pub fn suggestion(&self) -> Option<Suggestion> {
        let assistant = self.assistant.as_ref()?;
        assistant.suggestion(SuggestionContext {
            question: self.current_question(),
            answers: &self.answers,
            step_index: self.step_index,
            questions: &self.questions,
        })
    }

    /// Apply the assistant's suggested value to the current question.
    ///
    /// Suggestion values never flow into answers except through this
    /// explicit action. Returns true when a value was applied.
    pub fn apply_suggestion(&mut self) -> bool {
        let value = match self.suggestion().and_then(|s| s.value) {
            Some(v) => v,
            None => return false,
        };
        let id = self.current_question().id.clone();
        self.set_answer(&id, value);
        true
    }

    /// Bulk-prefill from the assistant's draft, if an assistant is attached.
    pub fn apply_draft(&mut self) -> usize {
        let draft = match self.assistant.as_ref() {
            Some(a) => a.draft(&self.answers),
            None => return 0,
        };
        self.merge_draft(draft)
    }

    /// Merge a draft answer map into the answer bag.
    ///
    /// Only keys whose value is defined, non-null, and non-empty after
    /// trimming are merged; empty values never overwrite anything.
    /// Returns the number of keys merged.
    pub fn merge_draft(&mut self, draft: Answers) -> usize {
        let mut merged = 0;
        for (key, value) in draft {
            if value.is_null() {
                continue;
            }
            if value_text(Some(&value)).trim().is_empty() && !matches!(value, Value::Bool(_)) {
                continue;
            }
            self.answers.insert(key, value);
            merged += 1;
        }
        merged
    }

    /// Presence check used by section progress: same rule as the
    /// required-field validation but ignoring the `required` flag.
    fn has_answer(&self, question: &Question) -> bool {
        let value = self.answers.get(&question.id);
        match question.kind {
            QuestionKind::Checkbox => is_truthy(value),
            _ => !value_text(value).trim().is_empty(),
        }
    }

    fn validate_current(&mut self) -> bool {
        let question = &self.questions[self.step_index];
        let value = self.answers.get(&question.id);
        if Self::is_valid(question, value) {
            true
        } else {
            self.error = Some(format!("{} is required.", question.label));
            false
        }
    }
}

/// String form of an answer value; missing and null become "".
fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Loose truthiness for checkbox answers.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty() && s != "false",
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn three_questions() -> Vec<Question> {
        vec![
            Question::new("name", "Your name", QuestionKind::Text, "Basics").required(),
            Question::new("email", "Your email", QuestionKind::Email, "Basics").required(),
            Question::new("notes", "Anything else?", QuestionKind::Textarea, "Details"),
        ]
    }

    #[test]
    fn test_defaults_seed_then_initial_answers_override() {
        let questions = vec![
            Question::new("state", "State", QuestionKind::Select, "Basics")
                .with_default(json!("CA")),
            Question::new("agree", "Agree?", QuestionKind::Checkbox, "Basics")
                .with_default(json!(false)),
        ];
        let mut initial = Answers::new();
        initial.insert("state".to_string(), json!("NY"));

        let engine = FlowEngine::new(questions, initial);
        assert_eq!(engine.answers().get("state"), Some(&json!("NY")));
        assert_eq!(engine.answers().get("agree"), Some(&json!(false)));
    }

    #[test]
    fn test_next_blocked_until_required_answer() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        engine.set_answer("name", json!("Ada"));
        assert!(engine.next());
        assert_eq!(engine.step_index(), 1);

        // Question 2 is required and unanswered: repeated next() stays put
        assert!(!engine.next());
        assert!(!engine.next());
        assert_eq!(engine.step_index(), 1);
        assert_eq!(engine.error(), Some("Your email is required."));

        engine.set_answer("email", json!("ada@example.com"));
        assert!(engine.error().is_none(), "set_answer clears the error");
        assert!(engine.next());
        assert_eq!(engine.step_index(), 2);
    }

    #[test]
    fn test_next_clamps_at_last_step() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        engine.set_answer("name", json!("Ada"));
        engine.next();
        engine.set_answer("email", json!("ada@example.com"));
        engine.next();
        // Last question is optional; advancing past it is a no-op
        assert!(engine.next());
        assert_eq!(engine.step_index(), 2);
    }

    #[test]
    fn test_back_clamps_at_zero_and_clears_error() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        assert!(!engine.next());
        assert!(engine.error().is_some());
        engine.back();
        assert_eq!(engine.step_index(), 0);
        assert!(engine.error().is_none());
        engine.back();
        assert_eq!(engine.step_index(), 0);
    }

    #[test]
    fn test_whitespace_answer_is_invalid() {
        let q = Question::new("name", "Name", QuestionKind::Text, "Basics").required();
        assert!(!FlowEngine::is_valid(&q, Some(&json!("   "))));
        assert!(FlowEngine::is_valid(&q, Some(&json!("Ada"))));
    }

    #[test]
    fn test_checkbox_requires_truthy() {
        let q = Question::new("agree", "Agree", QuestionKind::Checkbox, "T").required();
        assert!(!FlowEngine::is_valid(&q, None));
        assert!(!FlowEngine::is_valid(&q, Some(&json!(false))));
        assert!(FlowEngine::is_valid(&q, Some(&json!(true))));
    }

    #[test]
    fn test_optional_question_always_valid() {
        let q = Question::new("notes", "Notes", QuestionKind::Textarea, "T");
        assert!(FlowEngine::is_valid(&q, None));
        assert!(FlowEngine::is_valid(&q, Some(&json!(""))));
    }

    #[test]
    fn test_progress_sections() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        engine.set_answer("name", json!("Ada"));
        engine.next();

        let progress = engine.progress();
        assert!((progress.percent_complete - 100.0 * 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(progress.sections.len(), 2);

        let basics = &progress.sections[0];
        assert_eq!(basics.label, "Basics");
        assert_eq!(basics.answered, 1);
        assert_eq!(basics.total, 2);
        assert!(basics.is_current);
        assert!(!basics.is_done);

        let details = &progress.sections[1];
        assert_eq!(details.label, "Details");
        assert!(!details.is_current);
        assert!(!details.is_done);
    }

    #[test]
    fn test_progress_section_done_is_presence_based() {
        // Optional question with an answer still counts toward done
        let questions = vec![
            Question::new("a", "A", QuestionKind::Text, "S1").required(),
            Question::new("b", "B", QuestionKind::Text, "S1"),
        ];
        let mut engine = FlowEngine::new(questions, Answers::new());
        engine.set_answer("a", json!("x"));
        engine.set_answer("b", json!("y"));
        let progress = engine.progress();
        assert!(progress.sections[0].is_done);
    }

    #[tokio::test]
    async fn test_submit_blocked_on_invalid_step() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        let result = engine
            .submit(|_answers| async { Ok::<_, String>("done") })
            .await;
        assert!(result.is_none());
        assert!(engine.error().is_some());
        assert!(!engine.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_success_leaves_submitting_set() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        engine.set_answer("name", json!("Ada"));
        engine.next();
        engine.set_answer("email", json!("ada@example.com"));
        engine.next();

        let result = engine
            .submit(|answers| async move {
                Ok::<_, String>(answers.get("name").cloned())
            })
            .await;
        assert_eq!(result, Some(Some(json!("Ada"))));
        assert!(engine.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_failure_surfaces_message() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        engine.set_answer("name", json!("Ada"));

        let result: Option<()> = engine
            .submit(|_answers| async { Err("service unavailable".to_string()) })
            .await;
        assert!(result.is_none());
        assert_eq!(engine.error(), Some("service unavailable"));
        assert!(!engine.is_submitting());
    }

    struct FixedAssistant;

    impl FlowAssistant for FixedAssistant {
        fn suggestion(&self, ctx: SuggestionContext<'_>) -> Option<Suggestion> {
            if ctx.question.id == "name" {
                Some(Suggestion {
                    value: Some(json!("Suggested Name")),
                    tip: Some("From your last claim".to_string()),
                    notice: None,
                })
            } else {
                None
            }
        }

        fn draft(&self, _answers: &Answers) -> Answers {
            let mut draft = Answers::new();
            draft.insert("email".to_string(), json!("drafted@example.com"));
            draft.insert("notes".to_string(), json!("   "));
            draft.insert("name".to_string(), Value::Null);
            draft
        }
    }

    #[test]
    fn test_suggestion_only_applied_explicitly() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new())
            .with_assistant(Box::new(FixedAssistant));

        let suggestion = engine.suggestion().unwrap();
        assert_eq!(suggestion.value, Some(json!("Suggested Name")));
        // Not applied yet
        assert!(engine.answers().get("name").is_none());

        assert!(engine.apply_suggestion());
        assert_eq!(engine.answers().get("name"), Some(&json!("Suggested Name")));
    }

    #[test]
    fn test_draft_merge_skips_empty_and_null() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new())
            .with_assistant(Box::new(FixedAssistant));

        let merged = engine.apply_draft();
        assert_eq!(merged, 1);
        assert_eq!(engine.answers().get("email"), Some(&json!("drafted@example.com")));
        assert!(engine.answers().get("notes").is_none(), "whitespace draft skipped");
        assert!(engine.answers().get("name").is_none(), "null draft skipped");
    }

    #[test]
    fn test_draft_merge_never_overwrites_with_empty() {
        let mut engine = FlowEngine::new(three_questions(), Answers::new());
        engine.set_answer("email", json!("kept@example.com"));

        let mut draft = Answers::new();
        draft.insert("email".to_string(), json!(""));
        let merged = engine.merge_draft(draft);
        assert_eq!(merged, 0);
        assert_eq!(engine.answers().get("email"), Some(&json!("kept@example.com")));
    }
}
