use tokio::sync::broadcast;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Stored credentials were rejected and could not be refreshed.
    Invalidated,
}

/// Process-wide signal that the current session is no longer valid.
///
/// Publishing never blocks and does not require a subscriber. Subscribers
/// only see events sent after they subscribed.
#[derive(Debug, Clone)]
pub struct SessionBroadcast {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionBroadcast {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn invalidate(&self) {
        warn!("session invalidated");
        match self.sender.send(SessionEvent::Invalidated) {
            Ok(listeners) => debug!(listeners, "session broadcast delivered"),
            Err(_) => debug!("session broadcast has no listeners"),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl SessionSubscription {
    /// Waits for the next event. Returns `None` once every broadcaster is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            // Events carry no payload; a lagged receiver missed at least one invalidation.
            Err(broadcast::error::RecvError::Lagged(_)) => Some(SessionEvent::Invalidated),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }

    /// Non-blocking poll for an already delivered event.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => Some(SessionEvent::Invalidated),
            Err(_) => None,
        }
    }

    /// Drains pending events and reports how many invalidations were seen.
    pub fn drain(&mut self) -> usize {
        let mut seen = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(SessionEvent::Invalidated) => seen += 1,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    seen += usize::try_from(skipped).unwrap_or(usize::MAX);
                }
                Err(_) => return seen,
            }
        }
    }
}
