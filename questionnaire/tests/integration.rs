//! Integration tests for questionnaire

use questionnaire::testing::{
    FixedIdentity, RecordingSink, SinkOutcome, StaticScriptProvider, StubLinker,
};
use questionnaire::{
    AnswerKey, Answers, FetchedScript, FlowError, FlowState, IdentitySnapshot, LinkedAccount,
    Questionnaire, RateItem, Script, Settled, Started, Step, SubmissionError,
    SubmissionReceipt,
};

fn short_script() -> Script {
    Script::new(vec![
        Step::free_text("p1", "Tell us about yourself"),
        Step::scale("s1", "How likely are you to pay?", 1, 5),
        Step::email("e1", "Your email (optional)"),
    ])
}

fn anonymous(instance: &str) -> Questionnaire {
    Questionnaire::new(instance, IdentitySnapshot::anonymous())
}

#[tokio::test]
async fn test_answer_and_submit_short_script() {
    let provider = StaticScriptProvider::new(short_script());
    let sink = RecordingSink::new();
    let mut flow = anonymous("sid-1");

    let started = flow.load(&provider).await.unwrap();
    assert!(matches!(started, Started::Ready { position: 0 }));

    flow.set_answer("p1", "hi").unwrap();
    flow.next().unwrap();
    flow.set_answer("s1", 5).unwrap();
    flow.next().unwrap();
    assert!(flow.is_last_step());

    let receipt = flow.submit(&sink).await.unwrap();
    assert!(receipt.accepted);
    assert_eq!(flow.state(), &FlowState::Done);
    assert!(flow.answers().is_empty());

    let submission = sink.last().unwrap();
    assert_eq!(submission.instance_id, "sid-1");
    assert_eq!(submission.respondent_email, None);
    let expected: Answers = [("p1", questionnaire::AnswerValue::from("hi")), ("s1", 5.into())]
        .into_iter()
        .collect();
    assert_eq!(submission.answers, expected);
}

#[tokio::test]
async fn test_fresh_respondent_sees_opening_pages() {
    let script = Script::new(vec![
        Step::identity_gate("intro_a", "Hi!", "Sign in or continue anonymously"),
        Step::info("This conversation is just between us"),
        Step::free_text("context", "Tell us more"),
        Step::info("Thanks"),
    ]);
    let mut flow = anonymous("sid-1");

    let started = flow.load(&StaticScriptProvider::new(script)).await.unwrap();
    assert!(matches!(started, Started::Ready { position: 0 }));
    assert!(flow.current_step().unwrap().is_identity_gate());
    assert_eq!(flow.skip().unwrap(), 1);
}

#[tokio::test]
async fn test_resume_starts_at_first_unanswered_step() {
    let script = Script::new(vec![
        Step::free_text("q1", "One"),
        Step::scale("q2", "Two", 1, 5),
        Step::free_text("q3", "Three"),
        Step::problem("q4", "Four", 1, 5),
    ]);
    let prior: Answers = [("q1", questionnaire::AnswerValue::from("a")), ("q2", 2.into())]
        .into_iter()
        .collect();
    let provider = StaticScriptProvider::resuming(script, prior.clone());
    let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::signed_in("t@x.com"));

    let started = flow.load(&provider).await.unwrap();
    assert!(matches!(started, Started::Ready { position: 2 }));
    assert_eq!(flow.answers(), &prior);
    assert_eq!(
        provider.requests(),
        vec![("sid-1".to_string(), Some("t@x.com".to_string()))]
    );
}

#[tokio::test]
async fn test_required_steps_block_until_answered() {
    let script = Script::new(vec![
        Step::free_text("p1", "One"),
        Step::single_choice("c1", "Pick", ["a", "b"]),
        Step::scale_with_preamble("use_likelihood", "The pitch", 1, 5),
        Step::problem("pb_1", "Slow builds", 1, 5),
        Step::info("Thanks"),
    ]);
    let provider = StaticScriptProvider::new(script);
    let mut flow = anonymous("sid-1");
    flow.load(&provider).await.unwrap();

    let steps: [&[(&str, questionnaire::AnswerValue)]; 4] = [
        &[("p1", "hi".into())],
        &[("c1", "b".into())],
        &[("use_likelihood", 3.into())],
        &[
            ("pb_1_score", 4.into()),
            ("pb_1_reason", "It wastes hours".into()),
            ("pb_1_attempts", "Faster laptop".into()),
        ],
    ];
    for (position, answers) in steps.iter().enumerate() {
        assert!(matches!(flow.next(), Err(FlowError::Validation(_))));
        assert_eq!(flow.position(), position);
        assert!(flow.message().is_some());

        for (key, value) in answers.iter() {
            flow.set_answer(*key, value.clone()).unwrap();
        }
        assert_eq!(flow.next().unwrap(), position + 1);
        assert_eq!(flow.message(), None);
    }
}

#[tokio::test]
async fn test_scale_rejects_out_of_range_and_accepts_bounds() {
    let script = Script::new(vec![Step::scale("s1", "Rate", 1, 5), Step::info("Bye")]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();

    for bad in [0, 6] {
        flow.set_answer("s1", bad).unwrap();
        assert!(flow.next().is_err());
    }
    for good in [1, 5] {
        flow.set_answer("s1", good).unwrap();
        assert_eq!(flow.next().unwrap(), 1);
        flow.back().unwrap();
    }
}

#[tokio::test]
async fn test_problem_score_alone_blocks() {
    let script = Script::new(vec![Step::problem("pb_1", "Slow builds", 1, 5), Step::info("Bye")]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();

    flow.set_answer("pb_1_score", 5).unwrap();
    assert!(flow.next().is_err());
    flow.set_answer("pb_1_reason", "Every day").unwrap();
    assert!(flow.next().is_err());
    flow.set_answer("pb_1_attempts", "Not yet").unwrap();
    assert_eq!(flow.next().unwrap(), 1);
}

#[tokio::test]
async fn test_skip_account_link_advances_by_one() {
    let script = Script::new(vec![
        Step::account_link("wallet", "Connect your wallet"),
        Step::free_text("p1", "One"),
        Step::info("Bye"),
    ]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();

    assert_eq!(flow.skip().unwrap(), 1);
    assert!(flow.answers().is_empty());
    assert!(matches!(flow.skip(), Err(FlowError::NotSkippable(_))));
}

#[tokio::test]
async fn test_link_and_unlink_account() {
    let script = Script::new(vec![
        Step::account_link("wallet", "Connect your wallet"),
        Step::info("Bye"),
    ]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();

    let cancelled = StubLinker::cancelled();
    assert_eq!(flow.link_account(&cancelled).await.unwrap(), None);
    assert!(flow.answers().is_empty());

    let failing = StubLinker::failing("wallet popup blocked");
    assert!(flow.link_account(&failing).await.is_err());
    assert_eq!(
        flow.message(),
        Some("Wallet connection failed: wallet popup blocked")
    );

    let linker = StubLinker::connecting(LinkedAccount::new("alice.near", "near"));
    flow.link_account(&linker).await.unwrap();
    assert_eq!(
        flow.answers().get_text(&AnswerKey::new("wallet")).unwrap(),
        "alice.near"
    );
    assert_eq!(
        flow.answers()
            .get_text(&AnswerKey::new("wallet_provider"))
            .unwrap(),
        "near"
    );
    assert_eq!(flow.message(), None);

    flow.unlink_account(&linker).await.unwrap();
    assert_eq!(linker.disconnects(), 1);
    assert!(flow.answers().is_empty());
}

#[tokio::test]
async fn test_typed_email_beats_signed_in_email() {
    let sink = RecordingSink::new();
    let mut flow = Questionnaire::for_respondent(
        "sid-1",
        &FixedIdentity(IdentitySnapshot::signed_in("b@x.com")),
    )
    .await;
    flow.load(&StaticScriptProvider::new(short_script()))
        .await
        .unwrap();

    flow.set_answer("p1", "hi").unwrap();
    flow.next().unwrap();
    flow.set_answer("s1", 3).unwrap();
    flow.next().unwrap();
    flow.set_answer("e1", "a@x.com").unwrap();
    flow.submit(&sink).await.unwrap();

    assert_eq!(
        sink.last().unwrap().respondent_email.as_deref(),
        Some("a@x.com")
    );
}

#[tokio::test]
async fn test_failed_submission_keeps_answers_and_position() {
    let sink = RecordingSink::new()
        .then(SinkOutcome::Fail("HTTP 500".into()))
        .then(SinkOutcome::Reject);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(Script::new(vec![
        Step::free_text("p1", "One"),
    ])))
    .await
    .unwrap();
    flow.set_answer("p1", "hi").unwrap();

    let err = flow.submit(&sink).await.unwrap_err();
    assert!(matches!(err, FlowError::Submission(SubmissionError::Failed(_))));
    assert_eq!(flow.state(), &FlowState::Active);
    assert_eq!(flow.message(), Some("HTTP 500"));
    assert_eq!(flow.position(), 0);
    assert_eq!(flow.answers().len(), 1);

    let err = flow.submit(&sink).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::Submission(SubmissionError::Rejected(_))
    ));
    assert_eq!(flow.state(), &FlowState::Active);

    flow.submit(&sink).await.unwrap();
    assert_eq!(flow.state(), &FlowState::Done);
    assert_eq!(sink.calls(), 3);
}

#[tokio::test]
async fn test_double_submit_refused() {
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(Script::new(vec![Step::info("Bye")])))
        .await
        .unwrap();

    let ticket = flow.begin_submit().unwrap();
    assert_eq!(flow.state(), &FlowState::Submitting);
    assert!(matches!(
        flow.begin_submit(),
        Err(FlowError::InvalidState {
            state: "submitting",
            ..
        })
    ));

    let applied = flow
        .finish_submit(ticket, Ok(SubmissionReceipt::accepted()))
        .unwrap();
    assert!(matches!(applied, Settled::Applied(_)));
    assert!(matches!(
        flow.submit(&RecordingSink::new()).await,
        Err(FlowError::InvalidState { state: "done", .. })
    ));
}

#[tokio::test]
async fn test_results_after_teardown_are_discarded() {
    let mut flow = anonymous("sid-1");
    let ticket = flow.begin_load().unwrap();
    flow.teardown();
    let late = flow
        .finish_load(ticket, Ok(FetchedScript::new(short_script())))
        .unwrap();
    assert!(matches!(late, Settled::Discarded));
    assert_eq!(flow.state(), &FlowState::Loading);
    assert!(flow.visible_steps().is_empty());

    let mut flow = anonymous("sid-2");
    flow.load(&StaticScriptProvider::new(Script::new(vec![Step::info("Bye")])))
        .await
        .unwrap();
    let ticket = flow.begin_submit().unwrap();
    flow.teardown();
    let late = flow
        .finish_submit(ticket, Ok(SubmissionReceipt::accepted()))
        .unwrap();
    assert!(matches!(late, Settled::Discarded));
    assert_eq!(flow.state(), &FlowState::Submitting);
}

#[tokio::test]
async fn test_empty_script_submits_immediately() {
    let sink = RecordingSink::new();
    let mut flow = anonymous("sid-1");
    let state = flow
        .start(&StaticScriptProvider::new(Script::default()), &sink)
        .await
        .unwrap();

    assert_eq!(state, FlowState::Done);
    let submission = sink.last().unwrap();
    assert!(submission.answers.is_empty());
}

#[tokio::test]
async fn test_load_failure_is_terminal() {
    let mut flow = anonymous("sid-1");
    let err = flow
        .load(&StaticScriptProvider::unreachable())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Load(_)));
    assert!(matches!(flow.state(), FlowState::Error(_)));
    assert!(matches!(
        flow.set_answer("p1", "hi"),
        Err(FlowError::InvalidState { state: "error", .. })
    ));
}

#[tokio::test]
async fn test_identity_gate_disappears_when_identity_arrives() {
    let script = Script::new(vec![
        Step::info("Welcome"),
        Step::identity_gate("intro_a", "Hi!", "Sign in or continue anonymously"),
        Step::free_text("context", "Tell us more"),
    ]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();
    flow.next().unwrap();
    assert!(flow.current_step().unwrap().is_identity_gate());
    assert_eq!(flow.progress().total, 3);

    flow.update_identity(IdentitySnapshot::signed_in("t@x.com"))
        .unwrap();

    assert_eq!(flow.progress().total, 2);
    assert_eq!(flow.position(), 1);
    assert_eq!(
        flow.current_step().and_then(|step| step.key()),
        Some(&AnswerKey::new("context"))
    );
}

#[tokio::test]
async fn test_conditional_steps_follow_boolean_answer() {
    let script = Script::new(vec![
        Step::confirm("is_paid_service", "Is this a paid service?"),
        Step::single_choice("pricing_model", "Pricing model", ["Subscription", "One-off"])
            .visible_when("is_paid_service"),
        Step::free_text("target_audience", "Who is it for?"),
    ]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();
    assert_eq!(flow.progress().total, 2);

    flow.set_answer("is_paid_service", true).unwrap();
    assert_eq!(flow.progress().total, 3);
    flow.next().unwrap();
    assert_eq!(
        flow.current_step().and_then(|step| step.key()),
        Some(&AnswerKey::new("pricing_model"))
    );

    flow.back().unwrap();
    flow.set_answer("is_paid_service", false).unwrap();
    assert_eq!(flow.progress().total, 2);
    assert_eq!(flow.position(), 0);
}

#[tokio::test]
async fn test_ratings_are_optional_and_clamped() {
    let script = Script::new(vec![
        Step::multi_rate(
            "Rate these",
            "",
            vec![RateItem::new("speed", "Speed"), RateItem::new("price", "Price")],
            1,
            5,
        ),
        Step::info("Bye"),
    ]);
    let mut flow = anonymous("sid-1");
    flow.load(&StaticScriptProvider::new(script)).await.unwrap();

    flow.set_answer("speed", 11).unwrap();
    flow.set_answer("price", "cheap").unwrap();
    assert_eq!(
        flow.answers().get_number(&AnswerKey::new("speed")).unwrap(),
        5
    );
    assert!(!flow.answers().contains(&AnswerKey::new("price")));
    assert_eq!(flow.next().unwrap(), 1);
}
