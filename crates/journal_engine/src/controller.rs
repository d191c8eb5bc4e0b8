use std::sync::Arc;

use journal_core::{update, Effect, Msg, RequestId, TriggerConfig, TriggerState, UiMessages};
use journal_logging::{journal_debug, journal_trace, journal_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::timers::{ControllerClock, TimerSlots};
use crate::{KeyValueStore, RefreshError, Refresher, DRAFT_KEY};

/// Receives the full replacement UI mapping after each applied refresh.
pub trait UiSink: Send + Sync {
    fn apply(&self, ui: &UiMessages);
}

/// Collaborators a controller drives.
#[derive(Clone)]
pub struct ControllerServices {
    pub refresher: Arc<dyn Refresher>,
    pub sink: Arc<dyn UiSink>,
    pub store: Arc<dyn KeyValueStore>,
}

#[derive(Debug)]
enum Command {
    TextChanged(String),
    RestoreDraft(String),
    ClearDraft,
    Teardown,
}

/// Cloneable sending side of a running controller.
///
/// Every method returns `false` once the controller has stopped.
#[derive(Debug, Clone)]
pub struct ControllerInput {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl ControllerInput {
    pub fn text_changed(&self, text: impl Into<String>) -> bool {
        self.cmd_tx.send(Command::TextChanged(text.into())).is_ok()
    }

    pub fn restore_draft(&self, text: impl Into<String>) -> bool {
        self.cmd_tx.send(Command::RestoreDraft(text.into())).is_ok()
    }

    pub fn clear_draft(&self) -> bool {
        self.cmd_tx.send(Command::ClearDraft).is_ok()
    }

    pub fn teardown(&self) -> bool {
        self.cmd_tx.send(Command::Teardown).is_ok()
    }
}

/// A localization trigger running as a task on the current tokio runtime.
///
/// All controller logic runs on that single task; refresh calls run on their
/// own tasks and report back through a channel, so a late response can only
/// reach the state machine as a message it is free to discard.
pub struct ControllerHandle {
    input: ControllerInput,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    /// Spawns the controller. Must be called from within a tokio runtime.
    pub fn spawn(config: TriggerConfig, services: ControllerServices) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_controller(TriggerState::new(config), services, cmd_rx));
        Self {
            input: ControllerInput { cmd_tx },
            task,
        }
    }

    pub fn input(&self) -> ControllerInput {
        self.input.clone()
    }

    /// Tears the controller down and waits for its loop to exit.
    pub async fn shutdown(self) {
        self.input.teardown();
        self.join().await;
    }

    /// Waits for the loop to exit, which happens after an explicit teardown or
    /// once every `ControllerInput` has been dropped.
    pub async fn join(self) {
        let Self { input, task } = self;
        drop(input);
        if let Err(err) = task.await {
            journal_warn!("Controller task ended abnormally: {}", err);
        }
    }
}

struct Completion {
    request_id: RequestId,
    result: Result<UiMessages, RefreshError>,
}

enum Wake {
    Command(Option<Command>),
    Completed(Completion),
    Timer(journal_core::TimerKind),
}

async fn run_controller(
    mut state: TriggerState,
    services: ControllerServices,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) {
    let clock = ControllerClock::start();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut runner = EffectRunner {
        clock,
        services,
        timers: TimerSlots::default(),
        in_flight: None,
        done_tx,
    };
    journal_debug!("Controller started");

    loop {
        let wake = tokio::select! {
            command = cmd_rx.recv() => Wake::Command(command),
            Some(done) = done_rx.recv() => Wake::Completed(done),
            timer = runner.timers.next_due() => Wake::Timer(timer),
        };

        let at = clock.now_ms();
        let msg = match wake {
            Wake::Command(Some(Command::TextChanged(text))) => Msg::TextChanged { text, at },
            Wake::Command(Some(Command::RestoreDraft(text))) => Msg::DraftRestored { text },
            Wake::Command(Some(Command::ClearDraft)) => Msg::DraftCleared { at },
            Wake::Command(Some(Command::Teardown)) | Wake::Command(None) => Msg::Teardown,
            Wake::Completed(Completion { request_id, result }) => {
                runner.forget_request(request_id);
                match result {
                    Ok(ui) => Msg::RefreshSucceeded { request_id, ui, at },
                    Err(err) => Msg::RefreshFailed {
                        request_id,
                        reason: err.to_string(),
                        at,
                    },
                }
            }
            Wake::Timer(timer) => {
                runner.timers.cancel(timer);
                Msg::TimerFired { timer, at }
            }
        };

        let stop = matches!(msg, Msg::Teardown);
        let (next, effects) = update(state, msg);
        state = next;
        runner.run(effects);
        if stop {
            break;
        }
    }

    journal_debug!("Controller stopped");
}

/// Executes core effects against the real collaborators.
struct EffectRunner {
    clock: ControllerClock,
    services: ControllerServices,
    timers: TimerSlots,
    in_flight: Option<(RequestId, CancellationToken)>,
    done_tx: mpsc::UnboundedSender<Completion>,
}

impl EffectRunner {
    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Refresh { request_id, text } => self.spawn_refresh(request_id, text),
                Effect::CancelRefresh { request_id } => self.cancel_refresh(request_id),
                Effect::ArmTimer { timer, deadline } => {
                    journal_trace!("Arming {:?} for {}ms", timer, deadline);
                    self.timers.arm(timer, self.clock.instant_at(deadline));
                }
                Effect::CancelTimer { timer } => self.timers.cancel(timer),
                Effect::ApplyUi(ui) => self.services.sink.apply(&ui),
                Effect::SaveDraft { text } => {
                    if let Err(err) = self.services.store.set(DRAFT_KEY, &text) {
                        journal_warn!("Failed to save draft: {}", err);
                    }
                }
                Effect::RemoveDraft => {
                    if let Err(err) = self.services.store.remove(DRAFT_KEY) {
                        journal_warn!("Failed to remove draft: {}", err);
                    }
                }
            }
        }
    }

    fn spawn_refresh(&mut self, request_id: RequestId, text: String) {
        if let Some((previous, token)) = self.in_flight.take() {
            journal_debug!("Aborting refresh {} before starting {}", previous, request_id);
            token.cancel();
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        let refresher = self.services.refresher.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    journal_debug!("Refresh {} cancelled", request_id);
                    return;
                }
                result = refresher.refresh(&text) => result,
            };
            // The controller may be gone already; nothing to deliver to then.
            let _ = done_tx.send(Completion { request_id, result });
        });
        self.in_flight = Some((request_id, token));
    }

    fn cancel_refresh(&mut self, request_id: RequestId) {
        match self.in_flight.take() {
            Some((current, token)) if current == request_id => token.cancel(),
            other => self.in_flight = other,
        }
    }

    fn forget_request(&mut self, request_id: RequestId) {
        if matches!(&self.in_flight, Some((current, _)) if *current == request_id) {
            self.in_flight = None;
        }
    }
}
