//! Walk a founder through intake, then a respondent through the generated
//! interview, using in-memory collaborators.
//!
//! Run with `RUST_LOG=debug` to see every navigation step.

use anyhow::Context;
use example_scripts::{FounderIntake, founder_intake, interview_script};
use questionnaire::testing::{FixedIdentity, RecordingSink, StaticScriptProvider, StubLinker};
use questionnaire::{FlowState, IdentitySnapshot, LinkedAccount, Questionnaire};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let intake = run_founder_intake().await?;
    tracing::info!(
        founder = intake.founder_name(),
        problems = intake.problems.len(),
        "intake complete"
    );

    run_interview(&intake).await?;
    Ok(())
}

async fn run_founder_intake() -> anyhow::Result<FounderIntake> {
    let provider = StaticScriptProvider::new(founder_intake());
    let sink = RecordingSink::new();
    let mut flow = Questionnaire::new("founder-intake", IdentitySnapshot::signed_in("ada@x.com"));
    flow.load(&provider).await?;

    let answers: [(&str, questionnaire::AnswerValue); 9] = [
        ("email", "ada@x.com".into()),
        ("founder_display_name", "Ada".into()),
        ("problem_domain", "home cooking".into()),
        ("problems", "Planning meals, Wasting groceries".into()),
        ("value_prop", "a planner that cooks from what is already in your fridge".into()),
        ("target_segments", "Students, Parents".into()),
        ("target_action", "join_waitlist".into()),
        ("follow_up_action", "".into()),
        ("is_paid_service", true.into()),
    ];
    for (key, value) in answers {
        flow.set_answer(key, value)?;
        flow.next()?;
    }

    flow.set_answer("pricing_model", "Subscription")?;
    flow.next()?;
    flow.set_answer("price_points", "4.99, 9.99")?;
    flow.next()?;
    tracing::info!(progress = %flow.progress(), "last intake step");
    flow.submit(&sink).await?;

    let submission = sink.last().context("intake was not submitted")?;
    Ok(FounderIntake::from_answers(&submission.answers)?)
}

async fn run_interview(intake: &FounderIntake) -> anyhow::Result<()> {
    let provider = StaticScriptProvider::new(interview_script(intake));
    let sink = RecordingSink::new();
    let identity = FixedIdentity(IdentitySnapshot::anonymous());
    let linker = StubLinker::connecting(LinkedAccount::new("respondent.near", "near"));

    let mut flow = Questionnaire::for_respondent("sid-demo", &identity).await;
    flow.load(&provider).await?;

    // Identity gate and three intro pages.
    flow.skip()?;
    for _ in 0..3 {
        flow.next()?;
    }

    flow.set_answer("context", "I cook for a family of four")?;
    flow.next()?;
    flow.set_answer("segment", "Parents")?;
    flow.next()?;

    for index in 1..=intake.problems.len() {
        flow.set_answer(format!("pb_{index}_score"), 4)?;
        flow.set_answer(format!("pb_{index}_reason"), "It eats my evenings")?;
        flow.set_answer(format!("pb_{index}_attempts"), "Meal kits, too pricey")?;
        flow.next()?;
    }

    flow.set_answer("use_likelihood", 5)?;
    flow.next()?;
    flow.set_answer("willing_to_pay", 3)?;
    flow.next()?;
    for index in 1..=intake.price_points.len() {
        flow.set_answer(format!("willing_to_pay_price_{index}"), 4 - index as i64)?;
        flow.next()?;
    }

    flow.set_answer("price_fair", "About 5 a month")?;
    flow.next()?;
    flow.set_answer("anything_else", "Make it work offline")?;
    flow.next()?;
    flow.set_answer("cta_choice", "Yes")?;
    flow.next()?;

    flow.link_account(&linker).await?;
    flow.next()?;
    flow.set_answer("email", "respondent@x.com")?;
    flow.next()?;

    tracing::info!(
        completion = flow.completion_percentage(),
        progress = %flow.progress(),
        "ready to submit"
    );
    let receipt = flow.submit(&sink).await?;
    anyhow::ensure!(flow.state() == &FlowState::Done, "interview did not finish");

    let submission = sink.last().context("interview was not submitted")?;
    tracing::info!(
        accepted = receipt.accepted,
        email = submission.respondent_email.as_deref().unwrap_or("anonymous"),
        answers = submission.answers.len(),
        "interview submitted"
    );
    Ok(())
}
