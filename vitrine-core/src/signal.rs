//! A "something changed, please refetch" signal
//!
//! Components which write through one path (e.g. an admin form)
//! use it to tell components reading through another path that their data is outdated.
//! The signal carries no payload: listeners are expected to refetch instead of trusting the writer.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// The sending side of the signal
///
/// Clones raise the same signal.
/// Pass a clone to every writer and listener which should be connected.
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    sender: broadcast::Sender<()>,
}

/// A listener created by [`RefreshSignal::listen`]
///
/// Dropping it stops listening.
#[derive(Debug)]
pub struct RefreshListener {
    receiver: broadcast::Receiver<()>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    /// Constructs a new signal without any listeners
    pub fn new() -> Self {
        // Listeners only care whether there was a raise, not how many
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    /// Notifies every listener
    pub fn raise(&self) {
        let listeners = self.sender.send(()).unwrap_or(0);
        debug!(listeners, "Raised refresh signal");
    }

    /// Starts listening for raises
    ///
    /// Raises which happened before this call are not observed.
    pub fn listen(&self) -> RefreshListener {
        RefreshListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Counts the listeners which haven't been dropped yet
    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl RefreshListener {
    /// Waits for the next raise
    ///
    /// Several raises which happen before this method is polled are observed as one.
    ///
    /// Returns `None` once every [`RefreshSignal`] clone has been dropped.
    pub async fn recv(&mut self) -> Option<()> {
        loop {
            match self.receiver.recv().await {
                Ok(()) => return Some(()),
                // The latest raise is still buffered and will be received next
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn raises_reach_every_listener() {
        let signal = RefreshSignal::new();
        let mut first = signal.listen();
        let mut second = signal.clone().listen();
        assert_eq!(signal.listeners(), 2);

        signal.raise();
        assert_eq!(first.recv().await, Some(()));
        assert_eq!(second.recv().await, Some(()));

        drop(first);
        assert_eq!(signal.listeners(), 1);
    }

    #[tokio::test]
    async fn missed_raises_coalesce() {
        let signal = RefreshSignal::new();
        let mut listener = signal.listen();

        signal.raise();
        signal.raise();
        signal.raise();

        assert_eq!(listener.recv().await, Some(()));
        assert!(
            timeout(Duration::from_millis(20), listener.recv())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn closes_without_signal() {
        let signal = RefreshSignal::new();
        let mut listener = signal.listen();
        drop(signal);

        assert_eq!(listener.recv().await, None);
    }
}
