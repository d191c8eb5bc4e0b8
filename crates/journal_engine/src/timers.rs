use std::collections::BTreeMap;
use std::time::Duration;

use journal_core::{Millis, TimerKind};
use tokio::time::{sleep_until, Instant};

/// Stand-in for deadlines beyond what `Instant` can represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Maps between tokio instants and the controller's millisecond clock.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ControllerClock {
    origin: Instant,
}

impl ControllerClock {
    pub(crate) fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub(crate) fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }

    pub(crate) fn instant_at(&self, at: Millis) -> Instant {
        self.origin
            .checked_add(Duration::from_millis(at))
            .unwrap_or_else(|| Instant::now() + FAR_FUTURE)
    }
}

/// One deadline per timer kind; arming replaces the previous deadline.
#[derive(Debug, Default)]
pub(crate) struct TimerSlots {
    deadlines: BTreeMap<TimerKind, Instant>,
}

impl TimerSlots {
    pub(crate) fn arm(&mut self, timer: TimerKind, deadline: Instant) {
        self.deadlines.insert(timer, deadline);
    }

    pub(crate) fn cancel(&mut self, timer: TimerKind) {
        self.deadlines.remove(&timer);
    }

    /// Resolves when the earliest armed timer is due. Pending forever while
    /// nothing is armed.
    pub(crate) async fn next_due(&self) -> TimerKind {
        let earliest = self
            .deadlines
            .iter()
            .min_by_key(|(_, deadline)| **deadline)
            .map(|(timer, deadline)| (*timer, *deadline));
        match earliest {
            Some((timer, deadline)) => {
                sleep_until(deadline).await;
                timer
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_deadline_maps_to_far_future() {
        let clock = ControllerClock::start();
        assert_eq!(
            clock.instant_at(250),
            clock.origin + Duration::from_millis(250)
        );
        assert!(clock.instant_at(Millis::MAX) >= Instant::now() + FAR_FUTURE);
    }

    #[tokio::test(start_paused = true)]
    async fn next_due_picks_earliest_deadline() {
        let clock = ControllerClock::start();
        let mut slots = TimerSlots::default();
        slots.arm(TimerKind::Debounce, clock.instant_at(1_200));
        slots.arm(TimerKind::DraftSave, clock.instant_at(500));
        slots.arm(TimerKind::FloorLift, clock.instant_at(Millis::MAX));

        assert_eq!(slots.next_due().await, TimerKind::DraftSave);
        assert_eq!(clock.now_ms(), 500);
        slots.cancel(TimerKind::DraftSave);
        assert_eq!(slots.next_due().await, TimerKind::Debounce);
        assert_eq!(clock.now_ms(), 1_200);
    }
}
