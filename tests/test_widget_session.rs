mod common;

use common::CarouselProcess;
use serde_json::Value;

const POOL: [&str; 3] = [
    "https://cdn.example.com/a.png",
    "https://cdn.example.com/b.png",
    "https://cdn.example.com/c.png",
];

fn kinds(frames: &[Value]) -> Vec<&str> {
    frames
        .iter()
        .filter_map(|f| f.get("type").and_then(Value::as_str))
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn startup_shows_an_item_then_reports_started() {
    let config = CarouselProcess::fixture_path("one_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);

    let first = proc.expect_frame("ItemDisplayed").await;
    assert!(POOL.contains(&first["item"].as_str().unwrap()));

    let started = proc.wait_started().await;
    assert_eq!(started["widget_name"], "one-phase-test");
    assert_eq!(started["pool_size"], 3);
    assert_eq!(started["mode"], "one_phase");

    let status = proc.shutdown().await;
    assert!(status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_index_reveals_that_item() {
    let config = CarouselProcess::fixture_path("one_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    proc.wait_started().await;

    proc.send_line("!IMG 2").await;
    let shown = proc.expect_frame("ItemDisplayed").await;
    assert_eq!(shown["item"], POOL[1]);

    proc.send_line(r#"{"type":"message","text":"!img 3"}"#).await;
    let shown = proc.expect_frame("ItemDisplayed").await;
    assert_eq!(shown["item"], POOL[2]);

    proc.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn frames_are_sequenced() {
    let config = CarouselProcess::fixture_path("one_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    proc.wait_started().await;
    proc.send_line("!img random").await;
    proc.expect_frame("ItemDisplayed").await;
    proc.shutdown().await;

    let sequences: Vec<u64> = proc
        .seen()
        .iter()
        .map(|f| f["sequence"].as_u64().unwrap())
        .collect();
    let expected: Vec<u64> = (0..sequences.len() as u64).collect();
    assert_eq!(sequences, expected);
}

#[tokio::test(flavor = "multi_thread")]
async fn eof_stops_widget_cleanly() {
    let config = CarouselProcess::fixture_path("one_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    proc.wait_started().await;

    let status = proc.shutdown().await;
    assert!(status.success());

    let stopped = proc.seen().last().expect("a WidgetStopped frame");
    assert_eq!(stopped["type"], "WidgetStopped");
    assert_eq!(stopped["reason"], "EOF");
}

#[tokio::test(flavor = "multi_thread")]
async fn unrelated_chat_and_bad_lines_are_ignored() {
    let config = CarouselProcess::fixture_path("one_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    proc.wait_started().await;

    for line in ["hello chat", "!img 42", "!img timer nope", "{broken", "!imgrandom"] {
        proc.send_line(line).await;
    }
    proc.shutdown().await;

    let after_start: Vec<&str> = kinds(proc.seen())
        .into_iter()
        .skip_while(|k| *k != "WidgetStarted")
        .collect();
    assert_eq!(after_start, ["WidgetStarted", "WidgetStopped"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn two_phase_alerts_then_reveals() {
    let config = CarouselProcess::fixture_path("two_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    let started = proc.wait_started().await;
    assert_eq!(started["mode"], "two_phase");

    proc.send_line("!img random").await;
    let alert = proc.expect_frame("AlertPlayed").await;
    assert_eq!(alert["url"], "https://cdn.example.com/ding.mp3");
    let overlay = proc.expect_frame("OverlayShown").await;
    assert_eq!(overlay["text"], "Guess!");

    proc.send_line(r#"{"type":"button","field":"randomImgButton"}"#)
        .await;
    proc.expect_frame("OverlayCleared").await;
    proc.expect_frame("ItemDisplayed").await;

    proc.shutdown().await;

    // Exactly one alert for the whole cycle.
    let alerts = kinds(proc.seen())
        .into_iter()
        .filter(|k| *k == "AlertPlayed")
        .count();
    assert_eq!(alerts, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn reset_discards_pending_reveal() {
    let config = CarouselProcess::fixture_path("two_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    proc.wait_started().await;

    proc.send_line("!img random").await;
    proc.expect_frame("OverlayShown").await;

    proc.send_line(r#"{"type":"button","field":"resetButton"}"#)
        .await;
    proc.expect_frame("OverlayCleared").await;

    // Back to idle: the next fire alerts again instead of revealing.
    proc.send_line("!img random").await;
    proc.expect_frame("AlertPlayed").await;
    proc.expect_frame("OverlayShown").await;

    proc.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn pause_button_toggles_overlay() {
    let config = CarouselProcess::fixture_path("two_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);
    proc.wait_started().await;

    proc.send_line(r#"{"type":"button","field":"pauseButton"}"#)
        .await;
    let overlay = proc.expect_frame("OverlayShown").await;
    assert_eq!(overlay["text"], "P A U S E D");

    proc.send_line("!img timer resume").await;
    proc.expect_frame("OverlayCleared").await;

    proc.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn start_paused_flag_overrides_file() {
    let config = CarouselProcess::fixture_path("two_phase.yaml");
    let mut proc = CarouselProcess::spawn(&config, &["--start-paused"]);

    let overlay = proc.expect_frame("OverlayShown").await;
    assert_eq!(overlay["text"], "P A U S E D");
    proc.wait_started().await;

    proc.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn countdown_expiry_reveals_new_item() {
    let config = CarouselProcess::fixture_path("fast_tick.yaml");
    let mut proc = CarouselProcess::spawn(&config, &[]);

    let first = proc.expect_frame("ItemDisplayed").await;
    proc.wait_started().await;

    let countdown = proc.expect_frame("CountdownUpdated").await;
    assert_eq!(countdown["display"], "0:59");

    // 60 ticks of 10ms, then the release.
    let next = proc.expect_frame("ItemDisplayed").await;
    assert_ne!(next["item"], first["item"], "distinct pool never repeats");

    // The countdown restarts from the full interval.
    let restarted = proc.expect_frame("CountdownUpdated").await;
    assert!(
        ["1:0", "0:59"].contains(&restarted["display"].as_str().unwrap()),
        "unexpected readout after reveal: {restarted}"
    );

    proc.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn timer_set_updates_readout() {
    let config = CarouselProcess::fixture_path("fast_tick.yaml");
    let mut proc = CarouselProcess::spawn(&config, &["--start-paused"]);
    proc.wait_started().await;

    proc.send_line("!img timer 1:02:03").await;
    loop {
        let frame = proc.expect_frame("CountdownUpdated").await;
        if frame["display"] == "1:2:3" {
            break;
        }
    }

    proc.shutdown().await;
}
