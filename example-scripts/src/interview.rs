//! The respondent interview generated from a founder's intake.

use questionnaire::{AccountLinkStep, PreambleScaleStep, Script, Step, StepKind};

use crate::FounderIntake;

/// Turn a well-known action id into words; other actions are shown as given.
pub fn action_label(action: &str) -> String {
    let action = action.trim();
    match action {
        "join_waitlist" => "join the waitlist".to_string(),
        "download_app" => "download the app".to_string(),
        "share_email" => "share your email for updates".to_string(),
        "follow_x" => "follow on X".to_string(),
        "" => "take the next step".to_string(),
        other => other
            .strip_prefix("other:")
            .map(str::trim)
            .unwrap_or(other)
            .replace('_', " "),
    }
}

/// Build the interview respondents go through.
///
/// Intro pages with an identity gate, one problem block per problem, the
/// pitch, willingness to pay (per price point for paid services), and a
/// closing call to action.
pub fn interview_script(intake: &FounderIntake) -> Script {
    let founder = intake.founder_name();
    let domain = intake.problem_domain.as_deref().unwrap_or("this topic");
    let value = intake
        .value_prop
        .as_deref()
        .unwrap_or("a product that solves this");

    let mut steps = vec![
        Step::identity_gate(
            "intro_a",
            format!("Hi! Thank you for taking the time to help {founder}."),
            "Sign in and connect your wallet for rewards (optional). Skip if you want to stay anonymous.",
        ),
        Step::info(format!(
            "This conversation is just between us. I'll analyse your insights alongside other \
             responses before I share anonymous headlines with {founder}."
        )),
        Step::info(
            "This will shape how they spend the next months or even years and they need you \
             to be completely honest, please.\nReady to go?",
        ),
        Step::info(format!(
            "{founder} is keen to talk to you about {domain}. Can you tell us a bit about your \
             experience with it?"
        )),
        Step::free_text("context", "Tell us a bit about your experience."),
    ];

    if !intake.target_segments.is_empty() {
        steps.push(Step::single_choice(
            "segment",
            "Which of these groups do you feel you most belong to?",
            intake.target_segments.iter().cloned(),
        ));
    }

    for (index, problem) in intake.problems.iter().enumerate() {
        steps.push(Step::problem(format!("pb_{}", index + 1), problem.clone(), 1, 5));
    }

    steps.push(Step::new(StepKind::ScaleWithPreamble(
        PreambleScaleStep::new(
            "use_likelihood",
            format!(
                "Here's what {founder} is thinking of spending the next few months building: {value}"
            ),
            1,
            5,
        )
        .with_prompt(
            "If delivered, how likely would you be to use it regularly (1–5, not a friend bias)?",
        ),
    )));

    steps.push(Step::scale(
        "willing_to_pay",
        "On a scale of 1–5 how willing would you be to pay for it?",
        1,
        5,
    ));

    if intake.is_paid_service {
        for (index, price) in intake.price_points.iter().enumerate() {
            steps.push(Step::scale(
                format!("willing_to_pay_price_{}", index + 1),
                format!("On a scale of 1–5 how willing would you be to pay ${price:.2}?"),
                1,
                5,
            ));
        }
    }

    steps.extend([
        Step::free_text("price_fair", "What would feel intuitively fair in terms of price?"),
        Step::free_text(
            "anything_else",
            format!(
                "Is there anything else you think {founder} should know but that you'd prefer \
                 they hear from me?"
            ),
        ),
        Step::single_choice(
            "cta_choice",
            format!("Would you like to {} now?", action_label(&intake.target_action)),
            ["Yes", "No", "Maybe later"],
        ),
        Step::new(StepKind::ExternalAccountLink(AccountLinkStep {
            key: "wallet".into(),
            prompt: "Connect a wallet to receive rewards".to_string(),
            copy: Some("Optional: connecting helps verify your responses later.".to_string()),
        })),
        Step::email("email", "If you want updates, drop your email (optional)"),
        Step::info("Thank you. We really appreciate your time and honesty. 🙏"),
    ]);

    Script::new(steps)
}
