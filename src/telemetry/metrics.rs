//! Process counters

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum Counter {
    /// Commands pulled off the update stream
    CommandsReceived,
    /// Replies that failed to send
    ReplyFailures,
    /// Broadcast ticks that produced a fan-out
    BroadcastsCompleted,
    /// Broadcast ticks skipped because a dependency failed
    BroadcastsSkipped,
    /// Individual notification sends that failed
    NotifyFailures,
}

impl Counter {
    fn name(self) -> &'static str {
        match self {
            Counter::CommandsReceived => "ratecast_commands_received_total",
            Counter::ReplyFailures => "ratecast_reply_failures_total",
            Counter::BroadcastsCompleted => "ratecast_broadcasts_completed_total",
            Counter::BroadcastsSkipped => "ratecast_broadcasts_skipped_total",
            Counter::NotifyFailures => "ratecast_notify_failures_total",
        }
    }
}

/// Increment a process counter
pub fn increment_counter(counter: Counter) {
    metrics::counter!(counter.name()).increment(1);
}
