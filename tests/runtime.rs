mod common;

use std::time::Duration;

use singularity_sim::market::FixedMarket;
use singularity_sim::model::{ActionEffectiveness, PlayerAction, PlayerActionType, SingularityPhase};
use singularity_sim::{BusMessage, RuntimeError, SingularityRuntime};
use tokio::sync::broadcast::error::RecvError;

fn start(seed: u64) -> SingularityRuntime {
    SingularityRuntime::start(common::config(seed), FixedMarket::flat())
}

async fn next_matching(
    rx: &mut tokio::sync::broadcast::Receiver<BusMessage>,
    pred: impl Fn(&BusMessage) -> bool,
) -> BusMessage {
    loop {
        match rx.recv().await {
            Ok(message) if pred(&message) => return message,
            Ok(_) | Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => panic!("bus closed"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn status_follows_ticks() {
    let runtime = start(31);
    let mut status = runtime.watch_status();
    assert_eq!(runtime.system_status().tick, 0);

    tokio::time::sleep(Duration::from_secs(26)).await;
    status.changed().await.expect("coordinator alive");
    assert_eq!(runtime.system_status().tick, 5);
    assert!(runtime.status().progress > 0.0);
    assert!(runtime.zoo_statistics().is_none());
}

#[tokio::test(start_paused = true)]
async fn player_action_and_forced_advance_reach_the_coordinator() {
    let runtime = start(32);
    runtime
        .record_player_action(PlayerAction::new(
            PlayerActionType::TechnologyInvestment,
            ActionEffectiveness::Good,
        ))
        .await
        .expect("running");

    let phase = runtime.force_advance_phase().await.expect("running");
    assert_eq!(phase, Some(SingularityPhase::PatternMastery));
    tokio::task::yield_now().await;
    assert_eq!(runtime.status().phase, SingularityPhase::PatternMastery);
}

#[tokio::test(start_paused = true)]
async fn singularity_opens_the_zoo() {
    let runtime = start(33);
    let mut bus = runtime.subscribe();
    while runtime.force_advance_phase().await.expect("running").is_some() {}

    let reached = tokio::time::timeout(
        Duration::from_secs(20_000),
        next_matching(&mut bus, |m| matches!(m, BusMessage::SingularityReached { .. })),
    )
    .await
    .expect("singularity within the deadline");
    assert!(matches!(reached, BusMessage::SingularityReached { .. }));

    let day = tokio::time::timeout(
        Duration::from_secs(60),
        next_matching(&mut bus, |m| matches!(m, BusMessage::ZooDay(_))),
    )
    .await
    .expect("zoo day within a minute");
    let BusMessage::ZooDay(report) = day else {
        unreachable!()
    };
    assert_eq!(report.day, 1);
    assert!(runtime.zoo_statistics().is_some());
    assert!(runtime.system_status().terminal.is_some());
}

#[tokio::test(start_paused = true)]
async fn news_reaches_subscribers() {
    let runtime = start(34);
    let mut bus = runtime.subscribe();
    let news = tokio::time::timeout(
        Duration::from_secs(300),
        next_matching(&mut bus, |m| matches!(m, BusMessage::News(_))),
    )
    .await
    .expect("news within five minutes");
    assert!(matches!(news, BusMessage::News(_)));
}

#[tokio::test(start_paused = true)]
async fn commands_fail_after_shutdown() {
    let mut runtime = start(35);
    assert!(runtime.is_running());
    runtime.shutdown();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(!runtime.is_running());
    assert!(matches!(
        runtime.force_advance_phase().await,
        Err(RuntimeError::Closed)
    ));
    assert!(matches!(
        runtime
            .record_player_action(PlayerAction::new(
                PlayerActionType::Diversification,
                ActionEffectiveness::Fair,
            ))
            .await,
        Err(RuntimeError::Closed)
    ));
}

#[tokio::test(start_paused = true)]
async fn unvalidated_tiny_intervals_keep_the_runtime_alive() {
    let mut config = common::config(36);
    config.tick_interval_secs = 0.0004;
    config.zoo.day_interval_secs = 0.0001;
    let runtime = SingularityRuntime::start(config, FixedMarket::flat());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(runtime.is_running());
    assert!(runtime.system_status().tick > 0);
    assert_eq!(
        runtime.force_advance_phase().await.expect("running"),
        Some(SingularityPhase::PatternMastery)
    );
}
