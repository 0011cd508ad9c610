use tokio::sync::mpsc;
use tracing::debug;

/// Live feed of values with an explicit end.
///
/// The producing side holds the matching sender and notices the
/// unsubscribe as a failed send.
#[derive(Debug)]
pub struct Subscription<T> {
    topic: String,
    receiver: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Create a connected sender and subscription.
    pub fn channel(topic: impl Into<String>) -> (mpsc::UnboundedSender<T>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            sender,
            Self {
                topic: topic.into(),
                receiver,
            },
        )
    }

    /// What this subscription is listening to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next value. `None` once the producer has gone away.
    ///
    /// Cancel safe.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Stop listening. Values already queued are discarded.
    pub fn unsubscribe(mut self) {
        self.receiver.close();
        debug!(topic = %self.topic, "Unsubscribed");
    }
}
