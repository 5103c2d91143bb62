use std::io::Write;

use singularity_sim::config::SingularityConfig;
use singularity_sim::market::FixedMarket;
use singularity_sim::model::GameTime;
use singularity_sim::sim::{SimEvent, Simulation};

#[test]
fn file_config_drives_the_simulation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fast.json");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        r#"{{ "seed": 99, "tick_interval_secs": 2.0, "narrative": {{ "news_interval_min_secs": 500, "news_interval_max_secs": 600 }} }}"#
    )
    .unwrap();

    let config = SingularityConfig::from_file(&path).unwrap();
    let mut sim = Simulation::new(config, FixedMarket::flat());
    let events = sim.advance_to(GameTime::from_secs(100));
    let ticks = events
        .iter()
        .filter(|e| matches!(e, SimEvent::Tick(_)))
        .count();
    assert_eq!(ticks, 50);
    assert!(events.iter().all(|e| !matches!(e, SimEvent::News(_))));
    assert_eq!(sim.system_status().now, GameTime::from_secs(100));
}

#[test]
fn rejected_config_never_reaches_a_host() {
    let err = SingularityConfig::from_json_str(
        r#"{ "competitors": { "initial_competitors": 9, "max_competitors": 4 } }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("initial_competitors"));

    let err = SingularityConfig::from_json_str(r#"{ "zoo": { "event_chance": 1.5 } }"#).unwrap_err();
    assert!(err.to_string().contains("zoo.event_chance"));
}

#[test]
fn config_round_trips_through_json() {
    let config = SingularityConfig {
        seed: 5,
        ..SingularityConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(SingularityConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn sub_millisecond_intervals_are_rejected() {
    for json in [
        r#"{ "tick_interval_secs": 0.0004 }"#,
        r#"{ "zoo": { "day_interval_secs": 0.0001 } }"#,
        r#"{ "narrative": { "news_interval_min_secs": 0.0002 } }"#,
    ] {
        let err = SingularityConfig::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("at least 1 ms"), "{json}: {err}");
    }
    let config = SingularityConfig::from_json_str(r#"{ "tick_interval_secs": 0.001 }"#).unwrap();
    assert_eq!(config.tick_interval(), GameTime::from_millis(1));
}
