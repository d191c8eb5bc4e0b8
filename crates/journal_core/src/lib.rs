//! Journal core: pure trigger state machine and UI message helpers.
mod config;
mod effect;
mod msg;
mod state;
mod ui_messages;
mod update;
mod view_model;

pub use config::{ConfigError, DispatchPolicy, TriggerConfig};
pub use effect::{Effect, TimerKind};
pub use msg::Msg;
pub use state::{Millis, RequestId, TriggerState};
pub use ui_messages::{UiMessages, DEFAULT_UI_MESSAGES};
pub use update::update;
pub use view_model::TriggerView;
