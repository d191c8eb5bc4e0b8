use crate::{Millis, RequestId, UiMessages};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue a refresh call for `text`.
    Refresh { request_id: RequestId, text: String },
    /// Abort an outstanding refresh call. Its result must never be delivered.
    CancelRefresh { request_id: RequestId },
    /// Arm (or re-arm) the timer; replaces any earlier deadline of that kind.
    ArmTimer { timer: TimerKind, deadline: Millis },
    CancelTimer { timer: TimerKind },
    /// Replace the UI text state with this mapping.
    ApplyUi(UiMessages),
    SaveDraft { text: String },
    RemoveDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Quiet period after the last edit.
    Debounce,
    /// Deferred debounce dispatch waiting for the interval floor to lift.
    FloorLift,
    DraftSave,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [TimerKind::Debounce, TimerKind::FloorLift, TimerKind::DraftSave];
}
