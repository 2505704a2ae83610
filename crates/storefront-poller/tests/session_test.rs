#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Console session against the mock fetcher: single passes, failure
//! recovery, and watch mode with a hung instance.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use storefront_core::presenter::StatusBadge;
use storefront_core::seed::load_region_data;
use storefront_core::stats::{StatsPayload, STATS_PATH};
use storefront_poller::fetcher::stats_url;
use storefront_poller::logging::{LogLevel, Logger, LoggingConfig};
use storefront_poller::mock::MockStatFetcher;
use storefront_poller::session::{ConsoleSession, LatestViewSink};

const SEED: &str = r#"{
    "regions": [
        {"regionName": "us-east", "instances": [
            {"uuid": "east-1", "url": "http://east-1/storefront"},
            {"uuid": "east-2", "url": "http://east-2/storefront/"}
        ]},
        {"regionName": "eu-west", "instances": [
            {"uuid": "eu-1", "url": "http://eu-1/storefront"}
        ]}
    ],
    "productInfo": {"productCount": 4000},
    "stats": {"workloadStats": {
        "checkout": {"workload": {"name": "checkout", "maxWorkers": 100}}
    }}
}"#;

fn url(host: &str) -> String {
    stats_url(&format!("http://{host}/storefront"), STATS_PATH)
}

fn payload(value: serde_json::Value) -> StatsPayload {
    serde_json::from_value(value).unwrap()
}

fn session(fetcher: Arc<MockStatFetcher>, logger: Logger) -> ConsoleSession {
    let data = load_region_data(SEED).unwrap();
    ConsoleSession::new(data, fetcher, STATS_PATH, logger)
}

fn badge_of(session: &ConsoleSession, uuid: &str) -> StatusBadge {
    session
        .view()
        .regions
        .iter()
        .flat_map(|r| r.instances.iter())
        .find(|i| i.uuid == uuid)
        .map(|i| i.badge)
        .unwrap()
}

#[tokio::test]
async fn single_pass_applies_every_completion() {
    let fetcher = Arc::new(
        MockStatFetcher::new()
            .with_payload(
                &url("east-1"),
                payload(json!({
                    "appInstance": {"cpuUtilization": 40.0},
                    "storefrontStats": {"us-east": {"activeWebCustomerCount": 10}},
                    "workloadStats": {"checkout": {"activeWorkerLimit": 5}}
                })),
            )
            .with_status(&url("east-2"), 503),
    );
    let mut session = session(Arc::clone(&fetcher), Logger::quiet());
    let mut sink = LatestViewSink::default();

    let report = session.run_once(&mut sink).await;

    assert_eq!(report.requested, 3);
    assert_eq!(report.summary.instances.active, 1);
    assert_eq!(report.summary.instances.not_responding, 2);
    assert_eq!(report.summary.users.total_real_users, 10);
    assert_eq!(report.summary.users.total_simulated_users, 5);
    assert_eq!(session.data().outstanding_requests(), 0);

    // One view when the pass starts, then one per completion.
    assert_eq!(sink.published, 4);
    let view = sink.latest.unwrap();
    let east = &view.regions[0];
    assert_eq!(east.badge, StatusBadge::NotResponding);
    assert_eq!(east.user_count, 15);
    assert_eq!(view.simulated_users_label, "5 simulated users");
    assert_eq!(view.real_users_label, "10 real users");

    assert_eq!(badge_of(&session, "east-1"), StatusBadge::Success);
    assert_eq!(badge_of(&session, "east-2"), StatusBadge::NotResponding);
    assert_eq!(badge_of(&session, "eu-1"), StatusBadge::NotResponding);
    assert_eq!(fetcher.call_count(&url("east-2")), 1);
}

#[tokio::test]
async fn instance_recovers_on_the_next_pass() {
    let fetcher = Arc::new(MockStatFetcher::new());
    let mut session = session(Arc::clone(&fetcher), Logger::quiet());
    let mut sink = LatestViewSink::default();

    session.run_once(&mut sink).await;
    assert_eq!(badge_of(&session, "eu-1"), StatusBadge::NotResponding);

    fetcher.set_payload(
        &url("eu-1"),
        payload(json!({"appInstance": {"cpuUtilization": 95.0}})),
    );
    let report = session.run_once(&mut sink).await;

    assert_eq!(badge_of(&session, "eu-1"), StatusBadge::HeavyLoad);
    assert_eq!(report.summary.instances.heavy_load, 1);
    assert_eq!(report.summary.instances.not_responding, 2);

    fetcher.clear(&url("eu-1"));
    let report = session.run_once(&mut sink).await;

    assert_eq!(badge_of(&session, "eu-1"), StatusBadge::NotResponding);
    assert_eq!(report.summary.instances.heavy_load, 0);
    assert_eq!(report.summary.instances.not_responding, 3);
}

#[tokio::test]
async fn null_sections_in_a_200_response_still_count_as_responding() {
    let body = r#"{
        "appInstance": {"cpuUtilization": 12},
        "storefrontStats": null,
        "workloadStats": {"checkout": {"activeWorkerLimit": 5}}
    }"#;
    let fetcher = Arc::new(MockStatFetcher::new().with_payload(
        &url("eu-1"),
        serde_json::from_str(body).unwrap(),
    ));
    let mut session = session(Arc::clone(&fetcher), Logger::quiet());
    let mut sink = LatestViewSink::default();

    let report = session.run_once(&mut sink).await;

    assert_eq!(badge_of(&session, "eu-1"), StatusBadge::Success);
    assert_eq!(report.summary.instances.active, 1);
    assert_eq!(report.summary.users.total_simulated_users, 5);
    assert_eq!(report.summary.users.total_real_users, 0);
}

#[tokio::test]
async fn failures_are_logged_with_instance_context() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let logger = Logger::with_buffer(&LoggingConfig::default(), Arc::clone(&buffer));
    let fetcher = Arc::new(MockStatFetcher::new());
    let mut session = session(fetcher, logger);
    let mut sink = LatestViewSink::default();

    session.run_once(&mut sink).await;

    let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(out.contains("refresh pass started"));
    assert!(out.contains("region=eu-west instance=eu-1"));
    assert!(out.contains("instance not responding"));
    assert!(out.contains("not_responding=3"));
    assert!(!out.contains("stats requested"));
}

#[tokio::test]
async fn trace_level_logs_each_request() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let cfg = LoggingConfig {
        level: LogLevel::Trace,
        ..LoggingConfig::default()
    };
    let logger = Logger::with_buffer(&cfg, Arc::clone(&buffer));
    let mut session = session(Arc::new(MockStatFetcher::new()), logger);
    let mut sink = LatestViewSink::default();

    session.run_once(&mut sink).await;

    let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert_eq!(out.matches("stats requested").count(), 3);
    assert!(out.contains("region=us-east instance=east-2"));
}

#[tokio::test(start_paused = true)]
async fn watch_mode_never_re_requests_a_hung_instance() {
    let fetcher = Arc::new(
        MockStatFetcher::new()
            .with_payload(&url("east-1"), StatsPayload::default())
            .with_hang(&url("east-2")),
    );
    let mut session = session(Arc::clone(&fetcher), Logger::quiet());
    let mut sink = LatestViewSink::default();

    session
        .run_watch(
            Duration::from_secs(1),
            &mut sink,
            tokio::time::sleep(Duration::from_millis(3_500)),
        )
        .await;

    assert_eq!(fetcher.call_count(&url("east-2")), 1);
    // Ticks at 0s, 1s, 2s and 3s before shutdown at 3.5s.
    assert_eq!(fetcher.call_count(&url("east-1")), 4);
    assert_eq!(session.data().outstanding_requests(), 1);
    assert_eq!(badge_of(&session, "east-2"), StatusBadge::Refreshing);
    assert_eq!(badge_of(&session, "east-1"), StatusBadge::Success);
    assert_eq!(
        sink.latest.unwrap().regions[0].badge,
        StatusBadge::Refreshing
    );
}
