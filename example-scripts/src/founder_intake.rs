//! The founder intake wizard.
//!
//! Founders describe their idea; the answers become a [`FounderIntake`],
//! from which the respondent questionnaire is generated.

use questionnaire::{AnswerError, AnswerKey, AnswerValue, Answers, Script, Step};

pub const PRICING_MODELS: [&str; 5] = ["Subscription", "One-time", "Freemium", "Usage-based", "Other"];

/// The intake wizard's steps. Pricing questions only show for paid services.
pub fn founder_intake() -> Script {
    Script::new(vec![
        Step::free_text("email", "Your email (for session owner)"),
        Step::optional_text("founder_display_name", "How should respondents call you? (optional)"),
        Step::optional_text("problem_domain", "Industry / problem domain"),
        Step::free_text("problems", "List 1–3 problems (comma separated)"),
        Step::optional_text("value_prop", "Value proposition (what makes it compelling?)"),
        Step::optional_text(
            "target_segments",
            "Which groups of people are you targeting? (comma separated, optional)",
        ),
        Step::free_text("target_action", "What action do you want users to take?"),
        Step::optional_text("follow_up_action", "Next step after initial action (optional)"),
        Step::confirm("is_paid_service", "Is this a paid service?"),
        Step::single_choice("pricing_model", "Pricing model", PRICING_MODELS)
            .visible_when("is_paid_service"),
        Step::optional_text("price_points", "Price points (comma separated numbers)")
            .visible_when("is_paid_service"),
        Step::optional_text("pricing_questions", "Pricing questions (comma separated)")
            .visible_when("is_paid_service"),
    ])
}

/// What a founder told us about their idea.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FounderIntake {
    pub email: String,
    pub display_name: Option<String>,
    pub problem_domain: Option<String>,
    pub problems: Vec<String>,
    pub value_prop: Option<String>,
    pub target_segments: Vec<String>,
    pub target_action: String,
    pub follow_up_action: Option<String>,
    pub is_paid_service: bool,
    pub pricing_model: Option<String>,
    /// Only positive prices are kept.
    pub price_points: Vec<f64>,
    pub pricing_questions: Vec<String>,
}

impl FounderIntake {
    /// Read the intake from the wizard's submitted answers.
    pub fn from_answers(answers: &Answers) -> Result<Self, AnswerError> {
        let text = |key: &str| optional_text(answers, key);
        let list = |key: &str| split_list(text(key).as_deref().unwrap_or_default());

        let is_paid_service = answers.is_yes(&AnswerKey::new("is_paid_service"));
        let price_points = list("price_points")
            .iter()
            .filter_map(|price| price.trim_start_matches('$').parse::<f64>().ok())
            .filter(|price| *price > 0.0)
            .collect();

        Ok(Self {
            email: answers.get_text(&AnswerKey::new("email"))?.trim().to_string(),
            display_name: text("founder_display_name"),
            problem_domain: text("problem_domain"),
            problems: split_list(answers.get_text(&AnswerKey::new("problems"))?),
            value_prop: text("value_prop"),
            target_segments: list("target_segments"),
            target_action: answers
                .get_text(&AnswerKey::new("target_action"))?
                .trim()
                .to_string(),
            follow_up_action: text("follow_up_action"),
            pricing_model: text("pricing_model").filter(|_| is_paid_service),
            price_points,
            pricing_questions: list("pricing_questions"),
            is_paid_service,
        })
    }

    /// The name respondents see: the display name, else the email.
    pub fn founder_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

fn optional_text(answers: &Answers, key: &str) -> Option<String> {
    match answers.get(&AnswerKey::new(key)) {
        Some(AnswerValue::Text(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    }
}

/// Split a comma separated answer, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
