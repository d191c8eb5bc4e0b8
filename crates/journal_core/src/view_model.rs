use crate::{Millis, RequestId, UiMessages};

/// Read-only snapshot of a controller, for rendering and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerView {
    pub length: usize,
    pub last_bucket_index: usize,
    pub last_request_at: Option<Millis>,
    pub in_flight: Option<RequestId>,
    pub debounce_deadline: Option<Millis>,
    pub floor_lift_deadline: Option<Millis>,
    pub draft_save_deadline: Option<Millis>,
    pub dispatch_count: u64,
    pub ui: UiMessages,
    pub torn_down: bool,
}
