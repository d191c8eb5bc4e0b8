use journal_core::{
    update, ConfigError, DispatchPolicy, Effect, Millis, Msg, TimerKind, TriggerConfig,
    TriggerState, UiMessages,
};

#[test]
fn default_config_is_valid() {
    assert_eq!(TriggerConfig::default().validate(), Ok(()));
}

#[test]
fn zero_bucket_size_is_rejected() {
    let config = TriggerConfig {
        bucket_size: 0,
        ..TriggerConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroBucketSize));
}

#[test]
fn zero_min_chars_is_rejected() {
    let config = TriggerConfig {
        min_chars: 0,
        ..TriggerConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroMinChars));
}

#[test]
fn unsorted_checkpoints_are_rejected() {
    let config = TriggerConfig {
        checkpoints: vec![250, 50],
        ..TriggerConfig::default()
    };
    assert_eq!(
        config.validate(),
        Err(ConfigError::UnsortedCheckpoints {
            previous: 250,
            next: 50
        })
    );
}

#[test]
fn checkpoint_window_is_open_below_and_closed_above() {
    let config = TriggerConfig::default();
    assert!(config.crossed_checkpoint(48, 51));
    assert!(config.crossed_checkpoint(49, 50));
    assert!(!config.crossed_checkpoint(50, 60));
    assert!(!config.crossed_checkpoint(260, 40));
    assert!(config.crossed_checkpoint(0, 300));
}

#[test]
fn buckets_follow_bucket_size() {
    let config = TriggerConfig::default();
    assert_eq!(config.bucket_of(124), 0);
    assert_eq!(config.bucket_of(125), 1);
    assert_eq!(config.bucket_of(126), 1);
    assert_eq!(config.bucket_of(250), 2);
}

#[test]
fn ui_text_falls_back_to_defaults() {
    let translated = UiMessages::from_pairs([("TITLE", "Diario")]);
    assert_eq!(translated.text("TITLE"), "Diario");
    assert_eq!(translated.text("SUBMIT"), "Submit");
    assert_eq!(translated.text("UNKNOWN_KEY"), "UNKNOWN_KEY");
    assert_eq!(UiMessages::defaults().get("OR"), Some("Or"));
}

#[test]
fn huge_timing_values_saturate_instead_of_overflowing() {
    let config = TriggerConfig {
        debounce_ms: Millis::MAX,
        draft_save_ms: Millis::MAX,
        min_call_interval_ms: Millis::MAX,
        settle_ms: Millis::MAX,
        policy: DispatchPolicy::Mutex,
        ..TriggerConfig::default()
    };
    assert_eq!(config.validate(), Ok(()));
    let state = TriggerState::new(config);

    let (state, effects) = update(
        state,
        Msg::TextChanged {
            text: "a".repeat(60),
            at: 5,
        },
    );
    assert!(effects.contains(&Effect::ArmTimer {
        timer: TimerKind::Debounce,
        deadline: Millis::MAX,
    }));
    assert!(effects.contains(&Effect::ArmTimer {
        timer: TimerKind::DraftSave,
        deadline: Millis::MAX,
    }));

    let (state, _) = update(
        state,
        Msg::RefreshSucceeded {
            request_id: 1,
            ui: UiMessages::defaults(),
            at: 10,
        },
    );
    let (state, _) = update(
        state,
        Msg::TextChanged {
            text: "a".repeat(130),
            at: 20,
        },
    );
    let (state, effects) = update(
        state,
        Msg::TimerFired {
            timer: TimerKind::Debounce,
            at: Millis::MAX,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::ArmTimer {
            timer: TimerKind::FloorLift,
            deadline: Millis::MAX,
        }]
    );
    assert_eq!(state.view().dispatch_count, 1);
}
