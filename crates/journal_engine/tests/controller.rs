use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use journal_core::{DispatchPolicy, TriggerConfig, UiMessages};
use journal_engine::{
    ControllerHandle, ControllerServices, FailureKind, KeyValueStore, RefreshError, Refresher,
    StoreError, UiSink, DRAFT_KEY,
};
use tokio::time::{sleep, Instant};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn text_of(len: usize) -> String {
    "a".repeat(len)
}

/// Answers every call with `label-{length}` after a per-call delay.
struct ScriptedRefresher {
    origin: Instant,
    delays: Vec<Duration>,
    failing_calls: Vec<usize>,
    calls: Mutex<Vec<Duration>>,
}

impl ScriptedRefresher {
    fn new(delays: Vec<Duration>) -> Self {
        Self {
            origin: Instant::now(),
            delays,
            failing_calls: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, calls: Vec<usize>) -> Self {
        self.failing_calls = calls;
        self
    }

    fn call_times(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Refresher for ScriptedRefresher {
    async fn refresh(&self, text: &str) -> Result<UiMessages, RefreshError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(self.origin.elapsed());
            calls.len() - 1
        };
        sleep(self.delays.get(index).copied().unwrap_or(ms(100))).await;
        if self.failing_calls.contains(&index) {
            return Err(RefreshError::new(FailureKind::HttpStatus(502), "bad gateway"));
        }
        Ok(UiMessages::from_pairs([(
            "LABEL",
            format!("label-{}", text.chars().count()),
        )]))
    }
}

#[derive(Default)]
struct RecordingSink {
    applied: Mutex<Vec<UiMessages>>,
}

impl RecordingSink {
    fn labels(&self) -> Vec<String> {
        self.applied
            .lock()
            .unwrap()
            .iter()
            .map(|ui| ui.text("LABEL").to_string())
            .collect()
    }
}

impl UiSink for RecordingSink {
    fn apply(&self, ui: &UiMessages) {
        self.applied.lock().unwrap().push(ui.clone());
    }
}

#[derive(Default)]
struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

struct Fixture {
    refresher: Arc<ScriptedRefresher>,
    sink: Arc<RecordingSink>,
    store: Arc<MemoryStore>,
    handle: ControllerHandle,
}

impl Fixture {
    fn start(config: TriggerConfig, refresher: ScriptedRefresher) -> Self {
        journal_logging::initialize_for_tests();
        let refresher = Arc::new(refresher);
        let sink = Arc::new(RecordingSink::default());
        let store = Arc::new(MemoryStore::default());
        let handle = ControllerHandle::spawn(
            config,
            ControllerServices {
                refresher: refresher.clone(),
                sink: sink.clone(),
                store: store.clone(),
            },
        );
        Self {
            refresher,
            sink,
            store,
            handle,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn checkpoint_then_deferred_quiet_period_dispatch() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(vec![ms(100), ms(100)]),
    );
    let input = fixture.handle.input();

    input.text_changed(text_of(50));
    sleep(ms(200)).await;
    input.text_changed(text_of(130));
    sleep(ms(3_000)).await;

    assert_eq!(fixture.refresher.call_times(), vec![ms(0), ms(1_500)]);
    assert_eq!(fixture.sink.labels(), vec!["label-50", "label-130"]);
    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn newest_request_wins_under_cancel_and_replace() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(vec![ms(3_000), ms(100)]),
    );
    let input = fixture.handle.input();

    input.text_changed(text_of(50));
    sleep(ms(1_600)).await;
    input.text_changed(text_of(130));
    sleep(ms(5_000)).await;

    assert_eq!(fixture.refresher.call_times(), vec![ms(0), ms(1_600)]);
    assert_eq!(fixture.sink.labels(), vec!["label-130"]);
    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn mutex_policy_waits_for_pending_request() {
    let config = TriggerConfig {
        policy: DispatchPolicy::Mutex,
        ..TriggerConfig::default()
    };
    let fixture = Fixture::start(config, ScriptedRefresher::new(vec![ms(2_000), ms(100)]));
    let input = fixture.handle.input();

    input.text_changed(text_of(50));
    sleep(ms(1_600)).await;
    input.text_changed(text_of(130));
    sleep(ms(5_000)).await;

    assert_eq!(fixture.refresher.call_times(), vec![ms(0), ms(2_800)]);
    assert_eq!(fixture.sink.labels(), vec!["label-50", "label-130"]);
    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_is_retried_after_quiet_period() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(vec![ms(100), ms(100)]).failing_on(vec![0]),
    );
    let input = fixture.handle.input();

    input.text_changed(text_of(60));
    sleep(ms(3_000)).await;

    assert_eq!(fixture.refresher.call_times(), vec![ms(0), ms(1_500)]);
    assert_eq!(fixture.sink.labels(), vec!["label-60"]);
    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_timers_and_discards_in_flight_result() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(vec![ms(1_000)]),
    );
    let input = fixture.handle.input();

    input.text_changed(text_of(60));
    sleep(ms(100)).await;
    fixture.handle.shutdown().await;
    sleep(ms(5_000)).await;

    assert_eq!(fixture.refresher.call_times(), vec![ms(0)]);
    assert!(fixture.sink.labels().is_empty());
    // The draft timer (t=500) never fired.
    assert_eq!(fixture.store.get(DRAFT_KEY).unwrap(), None);
    assert!(!input.text_changed(text_of(70)));
}

#[tokio::test(start_paused = true)]
async fn draft_is_saved_after_pause_and_removed_on_clear() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(Vec::new()),
    );
    let input = fixture.handle.input();

    input.text_changed("Querido diario");
    sleep(ms(600)).await;
    assert_eq!(
        fixture.store.get(DRAFT_KEY).unwrap().as_deref(),
        Some("Querido diario")
    );

    input.clear_draft();
    sleep(ms(10)).await;
    assert_eq!(fixture.store.get(DRAFT_KEY).unwrap(), None);
    assert!(fixture.refresher.call_times().is_empty());
    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restored_draft_waits_for_the_next_edit() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(vec![ms(100)]),
    );
    let input = fixture.handle.input();

    input.restore_draft(text_of(300));
    sleep(ms(5_000)).await;
    assert!(fixture.refresher.call_times().is_empty());

    input.text_changed(text_of(301));
    sleep(ms(500)).await;
    assert_eq!(fixture.refresher.call_times(), vec![ms(5_000)]);
    assert_eq!(fixture.sink.labels(), vec!["label-301"]);
    fixture.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn dropping_every_input_tears_down() {
    let fixture = Fixture::start(
        TriggerConfig::default(),
        ScriptedRefresher::new(vec![ms(1_000)]),
    );
    let input = fixture.handle.input();
    input.text_changed(text_of(60));
    sleep(ms(10)).await;
    drop(input);

    fixture.handle.join().await;
    sleep(ms(5_000)).await;
    assert!(fixture.sink.labels().is_empty());
}
