use askdocs_core::{DocumentId, Project, ProjectId};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Notifications shared between the panels of the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// Documents of a project were uploaded or deleted
    DocumentsChanged { project_id: ProjectId },
    /// A citation marker was activated in the transcript
    CitationActivated { document_id: DocumentId },
    /// A project was renamed or otherwise updated
    ProjectUpdated(Project),
}

/// Fan-out channel for [`Signal`]s
///
/// Cloning the hub shares the channel. Subscribers that fall behind skip the
/// oldest signals.
#[derive(Debug, Clone)]
pub struct SignalHub {
    tx: broadcast::Sender<Signal>,
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SignalHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// Publish to every subscriber; returns how many received it
    pub fn publish(&self, signal: Signal) -> usize {
        match self.tx.send(signal) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(signal)) => {
                tracing::debug!(?signal, "signal dropped, no subscribers");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let hub = SignalHub::default();
        let mut a = hub.subscribe();
        let mut b = hub.clone().subscribe();

        let signal = Signal::DocumentsChanged { project_id: ProjectId::new("p1") };
        assert_eq!(hub.publish(signal.clone()), 2);
        assert_eq!(a.recv().await.unwrap(), signal);
        assert_eq!(b.recv().await.unwrap(), signal);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = SignalHub::new(4);
        assert_eq!(hub.publish(Signal::CitationActivated { document_id: DocumentId::new("d1") }), 0);
    }
}
