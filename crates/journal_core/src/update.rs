use journal_logging::{journal_debug, journal_info, journal_trace, journal_warn};

use crate::{DispatchPolicy, Effect, Millis, Msg, TimerKind, TriggerState};

/// Result of asking for a refresh.
enum Attempt {
    Sent,
    /// Interval floor not satisfied yet.
    Throttled { until: Millis },
    /// Mutex policy: a request is still pending or settling.
    Busy,
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TriggerState, msg: Msg) -> (TriggerState, Vec<Effect>) {
    if state.is_torn_down() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::TextChanged { text, at } => {
            let mut effects = apply_text(&mut state, text, at);
            let deadline = at.saturating_add(state.config().draft_save_ms);
            state.arm_timer(TimerKind::DraftSave, deadline);
            effects.push(Effect::ArmTimer {
                timer: TimerKind::DraftSave,
                deadline,
            });
            effects
        }
        Msg::DraftRestored { text } => {
            state.restore_text(text);
            Vec::new()
        }
        Msg::DraftCleared { at } => {
            let mut effects = apply_text(&mut state, String::new(), at);
            cancel_timer(&mut state, TimerKind::DraftSave, &mut effects);
            effects.push(Effect::RemoveDraft);
            effects
        }
        Msg::TimerFired { timer, at } => on_timer_fired(&mut state, timer, at),
        Msg::RefreshSucceeded { request_id, ui, at } => {
            match state.finish_request(request_id, at) {
                Some(elapsed) => {
                    journal_info!(
                        "Refresh {} applied after {}ms ({} messages)",
                        request_id,
                        elapsed,
                        ui.len()
                    );
                    state.set_ui(ui.clone());
                    vec![Effect::ApplyUi(ui)]
                }
                None => {
                    journal_debug!("Discarding superseded refresh {}", request_id);
                    Vec::new()
                }
            }
        }
        Msg::RefreshFailed {
            request_id,
            reason,
            at,
        } => {
            if state.finish_request(request_id, at).is_some() {
                journal_warn!("Refresh {} failed: {}", request_id, reason);
                // Let the next quiet period retry the same text.
                state.forget_sent_text();
            } else {
                journal_debug!("Ignoring failure of superseded refresh {}", request_id);
            }
            Vec::new()
        }
        Msg::Teardown => teardown(&mut state),
    };

    (state, effects)
}

fn apply_text(state: &mut TriggerState, text: String, at: Millis) -> Vec<Effect> {
    state.set_text(text);
    let length = state.length();
    let mut effects = Vec::new();

    if length < state.config().min_chars {
        state.set_bucket_index(0);
        if let Some(request_id) = state.take_in_flight() {
            journal_debug!(
                "Length {} below threshold, cancelling refresh {}",
                length,
                request_id
            );
            state.forget_sent_text();
            effects.push(Effect::CancelRefresh { request_id });
        }
        cancel_timer(state, TimerKind::Debounce, &mut effects);
        cancel_timer(state, TimerKind::FloorLift, &mut effects);
        state.record_previous_length();
        return effects;
    }

    let config = state.config();
    let debounce_ms = config.debounce_ms;
    let crossed_checkpoint = config.crossed_checkpoint(state.previous_length(), length);
    let bucket = config.bucket_of(length);
    let crossed_bucket = bucket > state.last_bucket_index();
    let cooldown_elapsed = state
        .since_last_request(at)
        .map_or(true, |elapsed| elapsed > config.cooldown_ms);

    if (crossed_checkpoint || crossed_bucket || cooldown_elapsed) && state.floor_clear(at) {
        journal_debug!(
            "Immediate refresh at length {} (checkpoint={} bucket={} cooldown={})",
            length,
            crossed_checkpoint,
            crossed_bucket,
            cooldown_elapsed
        );
        state.set_bucket_index(bucket);
        // The floor was checked above; only the mutex policy can refuse here.
        let _ = try_dispatch(state, at, &mut effects);
    }

    let deadline = at.saturating_add(debounce_ms);
    state.arm_timer(TimerKind::Debounce, deadline);
    effects.push(Effect::ArmTimer {
        timer: TimerKind::Debounce,
        deadline,
    });
    // The re-armed debounce supersedes a deferred quiet-period dispatch.
    cancel_timer(state, TimerKind::FloorLift, &mut effects);
    state.record_previous_length();
    effects
}

fn on_timer_fired(state: &mut TriggerState, timer: TimerKind, at: Millis) -> Vec<Effect> {
    if !state.timer_due(timer, at) {
        journal_trace!("Ignoring stale {:?} timer at {}ms", timer, at);
        return Vec::new();
    }
    state.clear_timer(timer);

    match timer {
        TimerKind::DraftSave => vec![Effect::SaveDraft {
            text: state.text().to_owned(),
        }],
        TimerKind::Debounce | TimerKind::FloorLift => quiet_dispatch(state, at),
    }
}

/// Dispatch after a quiet period. Deferred (not dropped) while the interval
/// floor is still in force.
fn quiet_dispatch(state: &mut TriggerState, at: Millis) -> Vec<Effect> {
    if state.length() < state.config().min_chars {
        return Vec::new();
    }
    if state.already_sent_current_text() {
        journal_debug!("Quiet period: text unchanged since last refresh");
        return Vec::new();
    }

    let mut effects = Vec::new();
    match try_dispatch(state, at, &mut effects) {
        Attempt::Throttled { until } => {
            journal_debug!("Quiet-period refresh deferred until {}ms", until);
            state.arm_timer(TimerKind::FloorLift, until);
            effects.push(Effect::ArmTimer {
                timer: TimerKind::FloorLift,
                deadline: until,
            });
        }
        Attempt::Sent | Attempt::Busy => {}
    }
    effects
}

fn try_dispatch(state: &mut TriggerState, at: Millis, effects: &mut Vec<Effect>) -> Attempt {
    if !state.floor_clear(at) {
        let until = state.floor_lifts_at().unwrap_or(at);
        return Attempt::Throttled { until };
    }

    match state.config().policy {
        DispatchPolicy::Mutex => {
            if state.is_pending(at) {
                journal_debug!("Refresh skipped at {}ms: request pending", at);
                return Attempt::Busy;
            }
        }
        DispatchPolicy::CancelAndReplace => {
            if let Some(request_id) = state.take_in_flight() {
                journal_debug!("Superseding refresh {}", request_id);
                effects.push(Effect::CancelRefresh { request_id });
            }
        }
    }

    let request_id = state.begin_request(at);
    journal_debug!(
        "Dispatching refresh {} at {}ms (length {})",
        request_id,
        at,
        state.length()
    );
    effects.push(Effect::Refresh {
        request_id,
        text: state.text().to_owned(),
    });
    Attempt::Sent
}

fn teardown(state: &mut TriggerState) -> Vec<Effect> {
    let mut effects = Vec::new();
    if let Some(request_id) = state.take_in_flight() {
        effects.push(Effect::CancelRefresh { request_id });
    }
    for timer in TimerKind::ALL {
        cancel_timer(state, timer, &mut effects);
    }
    state.mark_torn_down();
    journal_debug!("Controller torn down");
    effects
}

fn cancel_timer(state: &mut TriggerState, timer: TimerKind, effects: &mut Vec<Effect>) {
    if state.clear_timer(timer) {
        effects.push(Effect::CancelTimer { timer });
    }
}
