//! Integration tests for the experiment runner
//!
//! Drives a full participant run against a scripted gateway and an
//! in-memory session store.

mod common;

use common::{problems, MemorySessionStore, Scripted, ScriptedGateway};
use socratic_tutor::domain::errors::DomainError;
use socratic_tutor::domain::models::{Persona, Role};
use socratic_tutor::domain::ports::GatewayError;
use socratic_tutor::services::{ExperimentRunner, RunnerSettings, SubmissionOutcome};
use std::sync::Arc;

fn runner(
    gateway: &Arc<ScriptedGateway>,
    store: &Arc<MemorySessionStore>,
    problem_count: u32,
) -> ExperimentRunner {
    ExperimentRunner::new(
        gateway.clone(),
        problems(problem_count),
        store.clone(),
        RunnerSettings::new("P042", Persona::Warm),
    )
    .unwrap()
}

#[tokio::test]
async fn test_requires_at_least_one_problem() {
    let gateway = Arc::new(ScriptedGateway::default());
    let store = Arc::new(MemorySessionStore::default());

    let result = ExperimentRunner::new(gateway, vec![], store, RunnerSettings::new("P1", Persona::Formal));

    assert!(matches!(result, Err(DomainError::NoProblems)));
}

#[tokio::test]
async fn test_start_records_greeting_and_persists() {
    let gateway = Arc::new(ScriptedGateway::default());
    let store = Arc::new(MemorySessionStore::default());
    let mut runner = runner(&gateway, &store, 2);

    let greeting = runner.start().await.unwrap();

    assert_eq!(greeting, Persona::Warm.greeting());
    assert_eq!(runner.position(), 1);
    assert_eq!(runner.current_problem().unwrap().id, 1);
    let doc = store.latest().unwrap();
    assert_eq!(doc.participant_id, "P042");
    assert_eq!(doc.problem_attempts[0].conversation_history[0].role, Role::Assistant);
    assert_eq!(gateway.request_count(), 0);
}

#[tokio::test]
async fn test_full_run_through_two_problems() {
    let gateway = Arc::new(ScriptedGateway::new([
        Scripted::Reply("Where does the loop start?".to_string()),
        Scripted::Reply("CORRECT".to_string()),
        Scripted::Reply("CORRECT".to_string()),
        Scripted::Reply("INCORRECT".to_string()),
        Scripted::Fragments(vec!["Try ".to_string(), "printing xs.".to_string()]),
        Scripted::Reply("INCORRECT".to_string()),
        Scripted::Reply("INCORRECT".to_string()),
        Scripted::Reply("INCORRECT".to_string()),
    ]));
    let store = Arc::new(MemorySessionStore::default());
    let mut runner = runner(&gateway, &store, 2);

    runner.start().await.unwrap();
    let reply = runner.send("My sum is too small", None).await.unwrap();
    assert_eq!(reply, "Where does the loop start?");

    let outcome = runner.submit("def total(xs):\n    return sum(xs)").await.unwrap();
    match &outcome {
        SubmissionOutcome::Next { evaluation, problem_id, greeting } => {
            assert!(evaluation.verdict);
            assert_eq!(*problem_id, 2);
            assert_eq!(greeting, Persona::Warm.greeting());
        }
        other => panic!("expected to advance, got {other:?}"),
    }
    assert_eq!(runner.position(), 2);
    assert_eq!(runner.policy().transcript().len(), 1);

    let mut fragments = Vec::new();
    let streamed = runner
        .send_streaming("still stuck", Some("for x in xs[1:]:"), |f| fragments.push(f.to_string()))
        .await
        .unwrap();
    assert_eq!(streamed, "Try printing xs.");
    assert_eq!(fragments.len(), 2);

    let outcome = runner.submit("pass").await.unwrap();
    let SubmissionOutcome::Completed { evaluation, summary } = outcome else {
        panic!("expected completion");
    };
    assert!(!evaluation.verdict);
    assert_eq!(summary.solved, 1);
    assert_eq!(summary.total, 2);
    assert!((summary.success_rate - 0.5).abs() < f64::EPSILON);
    assert!((summary.average_turns - 1.0).abs() < f64::EPSILON);
    assert!(runner.is_complete());
    assert!(runner.current_problem().is_none());

    let doc = store.latest().unwrap();
    assert!(doc.end_time.is_some());
    assert_eq!(doc.current_problem_index, 1);
    assert_eq!(doc.problem_attempts.len(), 2);
    assert_eq!(doc.problem_attempts[0].is_correct, Some(true));
    assert_eq!(doc.problem_attempts[0].judge_scores, vec![1.0, 1.0, 0.0]);
    assert_eq!(doc.problem_attempts[1].is_correct, Some(false));
    // greeting, user, assistant
    assert_eq!(doc.problem_attempts[0].conversation_history.len(), 3);
    // the session log keeps the raw message, not the draft-wrapped one
    assert_eq!(
        doc.problem_attempts[1].conversation_history[1].content,
        "still stuck"
    );
}

#[tokio::test]
async fn test_calls_after_completion_are_rejected() {
    let gateway = Arc::new(ScriptedGateway::always("CORRECT"));
    let store = Arc::new(MemorySessionStore::default());
    let mut runner = runner(&gateway, &store, 1);

    runner.start().await.unwrap();
    runner.submit("fixed").await.unwrap();
    let requests_before = gateway.request_count();

    assert!(matches!(
        runner.send("hello?", None).await,
        Err(DomainError::ExperimentComplete)
    ));
    assert!(matches!(
        runner.submit("again").await,
        Err(DomainError::ExperimentComplete)
    ));
    assert_eq!(gateway.request_count(), requests_before);
}

#[tokio::test]
async fn test_failed_reply_still_persists_user_turn() {
    let gateway = Arc::new(ScriptedGateway::new([Scripted::Fail(GatewayError::Unavailable(
        "overloaded".to_string(),
    ))]));
    let store = Arc::new(MemorySessionStore::default());
    let mut runner = runner(&gateway, &store, 1);
    runner.start().await.unwrap();
    let saves_before = store.save_count();

    let err = runner.send("anyone there?", None).await.unwrap_err();

    assert!(matches!(err, DomainError::Gateway(GatewayError::Unavailable(_))));
    assert_eq!(store.save_count(), saves_before + 1);
    let history = &store.latest().unwrap().problem_attempts[0].conversation_history;
    assert_eq!(history.last().unwrap().role, Role::User);
    assert_eq!(history.last().unwrap().content, "anyone there?");
}

#[tokio::test]
async fn test_failed_judging_keeps_problem_open() {
    let gateway = Arc::new(ScriptedGateway::new([
        Scripted::Reply("CORRECT".to_string()),
        Scripted::Fail(GatewayError::Timeout),
    ]));
    let store = Arc::new(MemorySessionStore::default());
    let mut runner = runner(&gateway, &store, 2);
    runner.start().await.unwrap();

    let err = runner.submit("fixed").await.unwrap_err();

    assert!(matches!(err, DomainError::Gateway(GatewayError::Timeout)));
    assert_eq!(runner.position(), 1);
    assert!(!runner.session().is_judged(1));
}
