// tests/cancel_behaviour.rs

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use topotask::{CancelReason, Executor, NodeState, tasks};
use topotask_test_utils::recipe::{CallLog, Ingredient, Interrupted, Recipe, recording_cook};
use topotask_test_utils::{init_tracing, with_timeout};

const FOREVER: Duration = Duration::from_secs(60);

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    init_tracing();
    let token = CancellationToken::new();
    token.cancel();
    let log = CallLog::new();
    let recipes = vec![Recipe::new(1), Recipe::new(2).needs(&[1]), Recipe::new(3)];

    let report = with_timeout(Executor::new(token).execute(
        recipes,
        Recipe::identifier,
        Recipe::edges,
        recording_cook(log.clone()),
    ))
    .await
    .unwrap();

    assert!(log.called().is_empty());
    assert_eq!(report.states(), &[NodeState::Skipped; 3]);
    assert_eq!(report.errors().len(), 3);
    assert!(report.errors().iter().all(|e| e.is_cancelled()));
    assert_eq!(report.cancel_reason(), Some(CancelReason::Cancelled));

    let err = report.into_result().unwrap_err();
    assert!(err.is_cancelled());
    assert!(err.to_string().contains("node[0] (1) cancelled: run cancelled"), "{err}");
}

#[tokio::test]
async fn deadline_interrupts_running_task_and_skips_the_rest() {
    init_tracing();
    let token = CancellationToken::new();
    let log = CallLog::new();
    let recipes = vec![
        Recipe::new(1).cook_time(FOREVER),
        Recipe::new(2).needs(&[1]),
    ];

    let started = Instant::now();
    let report = with_timeout(
        Executor::new(token.clone())
            .with_timeout(Duration::from_millis(50))
            .execute(
                recipes,
                Recipe::identifier,
                Recipe::edges,
                recording_cook(log.clone()),
            ),
    )
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(report.cancel_reason(), Some(CancelReason::DeadlineExceeded));
    assert_eq!(report.states(), &[NodeState::Errored, NodeState::Skipped]);
    assert!(!log.was_called(2));

    // The deadline belongs to the run, not to the caller.
    assert!(!token.is_cancelled());

    let err = report.into_result().unwrap_err();
    assert_eq!(err.cancel_reason(), Some(CancelReason::DeadlineExceeded));
    assert_eq!(err.find::<Interrupted>(), Some(&Interrupted { id: 1 }));
    assert!(err.failures().iter().all(|f| f.is_cancelled()));
    assert!(err.to_string().contains("cancelled: deadline exceeded"), "{err}");
}

#[tokio::test]
async fn task_cancelling_the_run_skips_its_dependents() {
    init_tracing();
    let log = CallLog::new();
    let recipes = vec![Recipe::new(1), Recipe::new(2).needs(&[1])];
    let caller = CancellationToken::new();

    let inner = log.clone();
    let task = move |recipe: Recipe, token: CancellationToken, inputs: Vec<Ingredient>| {
        inner.record(recipe.id, &inputs);
        async move {
            if recipe.id == 1 {
                token.cancel();
            }
            Ok::<_, anyhow::Error>(Ingredient {
                recipe_id: recipe.id,
                done: true,
            })
        }
    };

    let report = with_timeout(Executor::new(caller.clone()).execute(
        recipes,
        Recipe::identifier,
        Recipe::edges,
        task,
    ))
    .await
    .unwrap();

    assert_eq!(report.states(), &[NodeState::Done, NodeState::Skipped]);
    assert!(report.value(0).is_some());
    assert!(report.error_for(1).is_some_and(|e| e.is_cancelled()));
    assert_eq!(report.cancel_reason(), Some(CancelReason::Cancelled));
    assert!(!log.was_called(2));
    assert!(!caller.is_cancelled());
}

#[tokio::test]
async fn caller_cancel_mid_run_stops_the_chain_promptly() {
    init_tracing();
    let token = CancellationToken::new();
    let log = CallLog::new();
    let recipes = vec![
        Recipe::new(1).cook_time(FOREVER),
        Recipe::new(2).needs(&[1]),
        Recipe::new(3).needs(&[2]),
        Recipe::new(4),
    ];

    {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });
    }

    let started = Instant::now();
    let report = with_timeout(Executor::new(token).execute(
        recipes,
        Recipe::identifier,
        Recipe::edges,
        recording_cook(log.clone()),
    ))
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(
        report.states(),
        &[
            NodeState::Errored,
            NodeState::Skipped,
            NodeState::Skipped,
            NodeState::Done
        ]
    );
    assert_eq!(report.cancel_reason(), Some(CancelReason::Cancelled));
    let interrupted = report.error_for(0).unwrap();
    assert!(interrupted.is_cancelled());
    assert_eq!(interrupted.find::<Interrupted>(), Some(&Interrupted { id: 1 }));
    assert!(!log.was_called(2));
    assert!(!log.was_called(3));
}

#[tokio::test]
async fn finished_run_ignores_later_cancel() {
    init_tracing();
    let token = CancellationToken::new();
    let recipes = vec![Recipe::new(1), Recipe::new(2).needs(&[1])];

    let results = with_timeout(tasks(
        token.clone(),
        recipes,
        Recipe::identifier,
        Recipe::edges,
        Recipe::cook,
    ))
    .await
    .unwrap();
    token.cancel();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|i| i.done));
}

#[tokio::test]
async fn dropping_the_run_stops_pending_tasks() {
    init_tracing();
    let token = CancellationToken::new();
    let log = CallLog::new();
    let recipes = vec![
        Recipe::new(1).cook_time(Duration::from_millis(50)),
        Recipe::new(2).needs(&[1]),
    ];

    let gave_up = tokio::time::timeout(
        Duration::from_millis(10),
        tasks(
            token.clone(),
            recipes,
            Recipe::identifier,
            Recipe::edges,
            recording_cook(log.clone()),
        ),
    )
    .await;
    assert!(gave_up.is_err(), "run should still be cooking recipe 1");

    // Long enough for recipe 1 to have finished had its unit survived.
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(log.called(), vec![1]);
    assert!(!log.was_called(2));
    assert!(!token.is_cancelled());
}
