use thiserror::Error;

/// Failure reported by a [`Processor`](crate::Processor) for one item.
///
/// Carries a message rather than a source chain because the one recorded
/// outcome per key is cloned out to every submitter waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProcessError {
    message: String,
}

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors delivered through the queue's completion channel.
///
/// Success and failure travel the same channel: every submitter's handler
/// receives a `Result<Output, QueueError>`, never an escalated panic or a
/// side channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue was stopped before this submission arrived. No entry was
    /// created and the processor was never consulted.
    #[error("queue '{name}' was stopped")]
    Stopped { name: String },

    /// The processor reported a failure for this item's key. The failure is
    /// cached like a success and is never retried.
    #[error("processor error: {0}")]
    Processor(#[from] ProcessError),
}
