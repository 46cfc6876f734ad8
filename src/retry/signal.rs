//! Edge-triggered stop signal for retry loops.

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

/// Wakes every retry loop that is waiting at the moment it fires.
///
/// Firing stores no permit, so a loop that starts waiting later is not
/// affected. Firing from several threads at once is harmless.
#[derive(Debug, Default)]
pub struct StopSignal {
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.notify.notify_waiters();
    }

    /// Future that resolves on the next `fire`, counting from the moment
    /// it is created.
    pub fn stopped(&self) -> Notified<'_> {
        self.notify.notified()
    }
}
