use metrics::{Counter, Gauge, Histogram};
use metrics_derive::Metrics;
use settlement_primitives::L1RollupTxType;
use std::{collections::HashMap, time::Duration};
use strum::{EnumIter, IntoEnumIterator};

/// The metrics of the settlement pipeline.
#[derive(Metrics, Clone)]
#[metrics(scope = "settlement_sender")]
pub struct SenderMetrics {
    /// The height carried by the last broadcast commit transaction.
    pub last_committed_height: Gauge,
    /// The height of the last commit transaction confirmed on L1.
    pub last_confirmed_commit_height: Gauge,
    /// The height carried by the last broadcast verify and execute transaction.
    pub last_submitted_verify_height: Gauge,
    /// The height of the last verify and execute transaction confirmed on L1.
    pub last_verified_height: Gauge,
    /// The balance of the commit signer, in wei.
    pub commit_signer_balance: Gauge,
    /// The balance of the verify signer, in wei.
    pub verify_signer_balance: Gauge,
    /// The height of the last commit transaction that needed attention.
    pub commit_exception_height: Gauge,
    /// The height of the last verify and execute transaction that needed attention.
    pub verify_exception_height: Gauge,
    /// The number of commit transactions broadcast.
    pub commit_broadcasts: Counter,
    /// The number of verify and execute transactions broadcast.
    pub verify_broadcasts: Counter,
    /// The number of broadcasts rejected as underpriced.
    pub replacements: Counter,
    /// The number of cycles given up because of the gas price ceiling.
    pub ceiling_aborts: Counter,
    /// The number of transactions abandoned after the waiting time.
    pub timed_out_txs: Counter,
}

impl SenderMetrics {
    /// Records the height of a broadcast transaction.
    pub(crate) fn record_broadcast(&self, tx_type: L1RollupTxType, height: u64) {
        match tx_type {
            L1RollupTxType::Commit => {
                self.commit_broadcasts.increment(1);
                self.last_committed_height.set(height as f64);
            }
            L1RollupTxType::VerifyAndExecute => {
                self.verify_broadcasts.increment(1);
                self.last_submitted_verify_height.set(height as f64);
            }
        }
    }

    /// Records the height of a confirmed transaction.
    pub(crate) fn record_confirmation(&self, tx_type: L1RollupTxType, height: u64) {
        match tx_type {
            L1RollupTxType::Commit => self.last_confirmed_commit_height.set(height as f64),
            L1RollupTxType::VerifyAndExecute => self.last_verified_height.set(height as f64),
        }
    }

    /// Records the height of a transaction that needs attention.
    pub(crate) fn record_exception(&self, tx_type: L1RollupTxType, height: u64) {
        match tx_type {
            L1RollupTxType::Commit => self.commit_exception_height.set(height as f64),
            L1RollupTxType::VerifyAndExecute => self.verify_exception_height.set(height as f64),
        }
    }
}

/// The metric handler for the periodic tasks of the sender.
#[derive(Debug)]
pub(crate) struct MetricsHandler {
    tasks: HashMap<Task, TaskMetrics>,
}

impl MetricsHandler {
    /// Returns the [`TaskMetrics`] for the provided task.
    pub(crate) fn get(&self, task: Task) -> Option<&TaskMetrics> {
        self.tasks.get(&task)
    }
}

impl Default for MetricsHandler {
    fn default() -> Self {
        Self {
            tasks: Task::iter()
                .map(|task| (task, TaskMetrics::new_with_labels(&[("task", task.as_str())])))
                .collect(),
        }
    }
}

/// The periodic tasks of the sender.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter)]
pub enum Task {
    /// Submission of commit transactions.
    Commit,
    /// Submission of verify and execute transactions.
    Verify,
    /// Confirmation of pending transactions.
    Tracker,
    /// Signer balance monitoring.
    Balance,
}

impl Task {
    /// Returns the str representation of the [`Task`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Verify => "verify",
            Self::Tracker => "tracker",
            Self::Balance => "balance",
        }
    }
}

/// The metrics of a periodic task.
#[derive(Metrics, Clone)]
#[metrics(scope = "settlement_sender_task")]
pub(crate) struct TaskMetrics {
    /// The duration of a cycle.
    pub cycle_duration: Histogram,
    /// The number of failed cycles.
    pub failures: Counter,
}

impl TaskMetrics {
    /// Records a finished cycle.
    pub(crate) fn record(&self, duration: Duration, failed: bool) {
        self.cycle_duration.record(duration.as_secs_f64());
        if failed {
            self.failures.increment(1);
        }
    }
}
