use crate::{Millis, RequestId, TimerKind, UiMessages};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the journal text.
    TextChanged { text: String, at: Millis },
    /// Saved draft loaded on mount. Never dispatches on its own.
    DraftRestored { text: String },
    /// User discarded the draft.
    DraftCleared { at: Millis },
    /// A timer previously armed through `Effect::ArmTimer` reached its deadline.
    TimerFired { timer: TimerKind, at: Millis },
    /// Refresh call returned a localized mapping.
    RefreshSucceeded {
        request_id: RequestId,
        ui: UiMessages,
        at: Millis,
    },
    /// Refresh call failed (network, status or malformed body).
    RefreshFailed {
        request_id: RequestId,
        reason: String,
        at: Millis,
    },
    /// Host view is going away. Every later message is ignored.
    Teardown,
}
