//! Journal engine: IO collaborators and the async controller driver.
mod controller;
mod persist;
mod refresh;
mod store;
mod timers;
mod types;

pub use controller::{ControllerHandle, ControllerInput, ControllerServices, UiSink};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use refresh::{RefreshSettings, Refresher, ReqwestRefresher};
pub use store::{KeyValueStore, StoreError, DRAFT_KEY};
pub use types::{FailureKind, RefreshError};
