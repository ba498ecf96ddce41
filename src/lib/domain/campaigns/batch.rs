//! Batch accounting and pacing

use std::{sync::Arc, time::Duration};

use crate::domain::comms::OutboundEmail;

/// Batches above this size run with the configured base delay as-is
const LARGE_BATCH_THRESHOLD: usize = 5000;

/// Smaller batches never pace faster than this
const SMALL_BATCH_FLOOR: Duration = Duration::from_millis(100);

/// Batches above this size take periodic cool-down pauses
const COOLDOWN_BATCH_THRESHOLD: usize = 1000;

/// How many messages between cool-down pauses
const COOLDOWN_INTERVAL: usize = 100;

/// Length of one cool-down pause
const COOLDOWN_PAUSE: Duration = Duration::from_secs(1);

/// Observer invoked after each message in a batch with
/// `(processed, total, current message)`. Observability only.
pub type ProgressHook = Arc<dyn Fn(usize, usize, &OutboundEmail) + Send + Sync>;

/// The result of attempting one send
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendOutcome {
    /// The recipient address
    pub email: String,

    /// Whether the send succeeded
    pub success: bool,

    /// Failure detail when the send failed
    pub error: Option<String>,
}

impl SendOutcome {
    /// Record a delivered message
    pub fn delivered(email: &str) -> Self {
        Self {
            email: email.to_string(),
            success: true,
            error: None,
        }
    }

    /// Record a failed message
    pub fn failed(email: &str, error: &str) -> Self {
        Self {
            email: email.to_string(),
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregated results of one batch send.
///
/// Counts and the outcome list stay in step because [`BatchReport::record`]
/// is the only way to add to the report.
#[derive(Debug, Default)]
pub struct BatchReport {
    total: usize,
    sent: usize,
    failed: usize,
    outcomes: Vec<SendOutcome>,
}

impl BatchReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outcome
    pub fn record(&mut self, outcome: SendOutcome) {
        self.total += 1;

        if outcome.success {
            self.sent += 1;
        } else {
            self.failed += 1;
        }

        self.outcomes.push(outcome);
    }

    /// Messages processed
    pub fn total(&self) -> usize {
        self.total
    }

    /// Messages delivered
    pub fn sent(&self) -> usize {
        self.sent
    }

    /// Messages that failed
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Per-message outcomes, in send order
    pub fn outcomes(&self) -> &[SendOutcome] {
        &self.outcomes
    }
}

/// Pause lengths between sequential sends.
///
/// Small batches are throttled conservatively; large batches run at the
/// configured base delay but take a fixed cool-down pause every hundred
/// messages so the relay never sees a sustained burst.
#[derive(Clone, Copy, Debug)]
pub struct PacingPolicy {
    base_delay: Duration,
}

impl PacingPolicy {
    /// Create a policy with the given base delay
    pub fn new(base_delay: Duration) -> Self {
        Self { base_delay }
    }

    /// The pause between two consecutive sends in a batch of `batch_size`
    pub fn delay_between_sends(&self, batch_size: usize) -> Duration {
        if batch_size > LARGE_BATCH_THRESHOLD {
            self.base_delay
        } else {
            self.base_delay.max(SMALL_BATCH_FLOOR)
        }
    }

    /// The extra pause due after the `processed`th message, if any
    pub fn cooldown_after(&self, batch_size: usize, processed: usize) -> Option<Duration> {
        (batch_size > COOLDOWN_BATCH_THRESHOLD && processed % COOLDOWN_INTERVAL == 0)
            .then_some(COOLDOWN_PAUSE)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
