use crate::view_model::TriggerView;
use crate::{TimerKind, TriggerConfig, UiMessages};

/// Milliseconds on the controller's own monotonic clock.
pub type Millis = u64;
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    request_id: RequestId,
    started_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Timers {
    debounce: Option<Millis>,
    floor_lift: Option<Millis>,
    draft_save: Option<Millis>,
}

impl Timers {
    fn slot_mut(&mut self, timer: TimerKind) -> &mut Option<Millis> {
        match timer {
            TimerKind::Debounce => &mut self.debounce,
            TimerKind::FloorLift => &mut self.floor_lift,
            TimerKind::DraftSave => &mut self.draft_save,
        }
    }

    fn get(&self, timer: TimerKind) -> Option<Millis> {
        match timer {
            TimerKind::Debounce => self.debounce,
            TimerKind::FloorLift => self.floor_lift,
            TimerKind::DraftSave => self.draft_save,
        }
    }
}

/// Mutable record held by one controller instance for the lifetime of its
/// host view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerState {
    config: TriggerConfig,
    text: String,
    length: usize,
    previous_length: usize,
    last_bucket_index: usize,
    last_request_at: Option<Millis>,
    in_flight: Option<InFlight>,
    settle_until: Option<Millis>,
    last_sent_text: Option<String>,
    timers: Timers,
    ui: UiMessages,
    next_request_id: RequestId,
    dispatch_count: u64,
    torn_down: bool,
}

impl Default for TriggerState {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}

impl TriggerState {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            text: String::new(),
            length: 0,
            previous_length: 0,
            last_bucket_index: 0,
            last_request_at: None,
            in_flight: None,
            settle_until: None,
            last_sent_text: None,
            timers: Timers::default(),
            ui: UiMessages::defaults(),
            next_request_id: 1,
            dispatch_count: 0,
            torn_down: false,
        }
    }

    pub fn view(&self) -> TriggerView {
        TriggerView {
            length: self.length,
            last_bucket_index: self.last_bucket_index,
            last_request_at: self.last_request_at,
            in_flight: self.in_flight.as_ref().map(|flight| flight.request_id),
            debounce_deadline: self.timers.debounce,
            floor_lift_deadline: self.timers.floor_lift,
            draft_save_deadline: self.timers.draft_save,
            dispatch_count: self.dispatch_count,
            ui: self.ui.clone(),
            torn_down: self.torn_down,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ui(&self) -> &UiMessages {
        &self.ui
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub(crate) fn length(&self) -> usize {
        self.length
    }

    pub(crate) fn previous_length(&self) -> usize {
        self.previous_length
    }

    pub(crate) fn last_bucket_index(&self) -> usize {
        self.last_bucket_index
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.length = text.chars().count();
        self.text = text;
    }

    pub(crate) fn record_previous_length(&mut self) {
        self.previous_length = self.length;
    }

    pub(crate) fn set_bucket_index(&mut self, bucket: usize) {
        self.last_bucket_index = bucket;
    }

    /// Loads restored text as if it had already been seen: no crossing is
    /// reported for anything at or below its length.
    pub(crate) fn restore_text(&mut self, text: String) {
        self.set_text(text);
        self.previous_length = self.length;
        self.last_bucket_index = if self.length >= self.config.min_chars {
            self.config.bucket_of(self.length)
        } else {
            0
        };
    }

    /// Time since the last dispatch, `None` if nothing was ever dispatched.
    pub(crate) fn since_last_request(&self, now: Millis) -> Option<Millis> {
        self.last_request_at
            .map(|last| now.saturating_sub(last))
    }

    pub(crate) fn floor_clear(&self, now: Millis) -> bool {
        self.since_last_request(now)
            .map_or(true, |elapsed| elapsed >= self.config.min_call_interval_ms)
    }

    pub(crate) fn floor_lifts_at(&self) -> Option<Millis> {
        self.last_request_at
            .map(|last| last.saturating_add(self.config.min_call_interval_ms))
    }

    /// Pending for the mutex policy: outstanding, or completed within the
    /// settle window.
    pub(crate) fn is_pending(&self, now: Millis) -> bool {
        self.in_flight.is_some() || self.settle_until.is_some_and(|until| now < until)
    }

    pub(crate) fn take_in_flight(&mut self) -> Option<RequestId> {
        self.in_flight.take().map(|flight| flight.request_id)
    }

    /// Marks a new request as outstanding for the current text.
    pub(crate) fn begin_request(&mut self, now: Millis) -> RequestId {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(InFlight {
            request_id,
            started_at: now,
        });
        self.last_request_at = Some(now);
        self.last_sent_text = Some(self.text.clone());
        self.last_bucket_index = self.config.bucket_of(self.length);
        self.dispatch_count += 1;
        request_id
    }

    /// Clears the outstanding marker if `request_id` is the current request and
    /// returns how long it was outstanding. `None` for superseded or unknown
    /// requests.
    pub(crate) fn finish_request(&mut self, request_id: RequestId, now: Millis) -> Option<Millis> {
        match &self.in_flight {
            Some(flight) if flight.request_id == request_id => {
                let started_at = flight.started_at;
                self.in_flight = None;
                self.settle_until = Some(now.saturating_add(self.config.settle_ms));
                Some(now.saturating_sub(started_at))
            }
            _ => None,
        }
    }

    pub(crate) fn already_sent_current_text(&self) -> bool {
        self.last_sent_text.as_deref() == Some(self.text.as_str())
    }

    pub(crate) fn forget_sent_text(&mut self) {
        self.last_sent_text = None;
    }

    pub(crate) fn set_ui(&mut self, ui: UiMessages) {
        self.ui = ui;
    }

    pub(crate) fn arm_timer(&mut self, timer: TimerKind, deadline: Millis) {
        *self.timers.slot_mut(timer) = Some(deadline);
    }

    /// Returns true if the timer was armed.
    pub(crate) fn clear_timer(&mut self, timer: TimerKind) -> bool {
        self.timers.slot_mut(timer).take().is_some()
    }

    /// A fire counts only for the currently armed deadline.
    pub(crate) fn timer_due(&self, timer: TimerKind, now: Millis) -> bool {
        self.timers.get(timer).is_some_and(|deadline| now >= deadline)
    }

    pub(crate) fn mark_torn_down(&mut self) {
        self.torn_down = true;
    }
}
