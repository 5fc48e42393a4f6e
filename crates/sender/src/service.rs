use crate::{
    error::SenderResult,
    metrics::{MetricsHandler, Task, TaskMetrics},
    BalanceMonitor, CommitSubmitter, ConfirmationTracker, FatalIntegrityError, SenderContext,
    SenderError, ServiceConfig, VerifySubmitter,
};

use settlement_l1::ChainClient;
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
    time::MissedTickBehavior,
};

/// A task run on a fixed period.
#[async_trait::async_trait]
trait PeriodicTask: Send + Sync + 'static {
    /// The task label.
    const TASK: Task;

    /// Runs a single cycle.
    async fn tick(&self) -> SenderResult<()>;
}

#[async_trait::async_trait]
impl<C: ChainClient + 'static> PeriodicTask for CommitSubmitter<C> {
    const TASK: Task = Task::Commit;

    async fn tick(&self) -> SenderResult<()> {
        self.run_once().await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl<C: ChainClient + 'static> PeriodicTask for VerifySubmitter<C> {
    const TASK: Task = Task::Verify;

    async fn tick(&self) -> SenderResult<()> {
        self.run_once().await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl<C: ChainClient + 'static> PeriodicTask for ConfirmationTracker<C> {
    const TASK: Task = Task::Tracker;

    async fn tick(&self) -> SenderResult<()> {
        self.run_once().await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl<C: ChainClient + 'static> PeriodicTask for BalanceMonitor<C> {
    const TASK: Task = Task::Balance;

    async fn tick(&self) -> SenderResult<()> {
        self.run_once().await.map(|_| ())
    }
}

/// Runs the commit, verify, confirmation and balance tasks until shutdown or a fatal integrity
/// error.
#[derive(Debug)]
pub struct SenderService<C> {
    ctx: Arc<SenderContext<C>>,
    config: ServiceConfig,
}

impl<C: ChainClient + 'static> SenderService<C> {
    /// Returns a new [`SenderService`].
    pub const fn new(ctx: Arc<SenderContext<C>>, config: ServiceConfig) -> Self {
        Self { ctx, config }
    }

    /// Runs the service until `shutdown` resolves or a task hits a fatal integrity error, which
    /// is returned. On exit the tasks are signalled and in flight cycles are given the configured
    /// grace period to finish. Every task has released the context when this returns.
    pub async fn run<F>(self, shutdown: F) -> Result<(), SenderError>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (fatal_tx, mut fatal_rx) = mpsc::channel(1);
        let metrics = MetricsHandler::default();
        let mut tasks = JoinSet::new();

        let handle = |task: Task| TaskHandle {
            metrics: metrics.get(task).cloned(),
            shutdown: shutdown_rx.clone(),
            fatal: fatal_tx.clone(),
        };

        let sender_config = &self.ctx.config;
        if sender_config.disable_commit_block {
            tracing::info!(target: "settlement::sender", "commit submission disabled");
        } else {
            tasks.spawn(run_periodic(
                CommitSubmitter::new(self.ctx.clone()),
                self.config.commit_interval,
                handle(Task::Commit),
            ));
        }
        if sender_config.disable_verify_block {
            tracing::info!(target: "settlement::sender", "verify submission disabled");
        } else {
            tasks.spawn(run_periodic(
                VerifySubmitter::new(self.ctx.clone()),
                self.config.verify_interval,
                handle(Task::Verify),
            ));
        }
        tasks.spawn(run_periodic(
            ConfirmationTracker::new(self.ctx.clone()),
            self.config.tracker_interval,
            handle(Task::Tracker),
        ));
        tasks.spawn(run_periodic(
            BalanceMonitor::new(self.ctx.clone()),
            self.config.balance_interval,
            handle(Task::Balance),
        ));
        drop(fatal_tx);

        tracing::info!(target: "settlement::sender", tasks = tasks.len(), "sender service started");
        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!(target: "settlement::sender", "shutdown requested");
                Ok(())
            }
            Some(err) = fatal_rx.recv() => Err(SenderError::Fatal(err)),
        };

        let _ = shutdown_tx.send(true);
        let drain = async { while tasks.join_next().await.is_some() {} };
        if tokio::time::timeout(self.config.shutdown_grace_period, drain).await.is_err() {
            tracing::warn!(target: "settlement::sender", "grace period elapsed, aborting tasks");
            tasks.abort_all();
            // Reap the cancelled tasks so they release the context before returning.
            while tasks.join_next().await.is_some() {}
        }
        tracing::info!(target: "settlement::sender", "sender service stopped");

        result
    }
}

/// The channels and metrics of a spawned task.
#[derive(Debug)]
struct TaskHandle {
    metrics: Option<TaskMetrics>,
    shutdown: watch::Receiver<bool>,
    fatal: mpsc::Sender<FatalIntegrityError>,
}

/// Runs `task` every `period` until shutdown. A cycle still running when the next tick is due
/// delays it rather than overlapping, and shutdown is observed between cycles.
async fn run_periodic<T: PeriodicTask>(task: T, period: Duration, mut handle: TaskHandle) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = handle.shutdown.changed() => break,
            _ = interval.tick() => {}
        }

        let start = Instant::now();
        let result = task.tick().await;
        if let Some(metrics) = &handle.metrics {
            metrics.record(start.elapsed(), result.is_err());
        }

        match result {
            Ok(()) => {}
            Err(SenderError::Fatal(err)) => {
                tracing::error!(
                    target: "settlement::sender",
                    task = T::TASK.as_str(),
                    %err,
                    "fatal integrity error, stopping"
                );
                let _ = handle.fatal.send(err).await;
                break;
            }
            Err(err) => {
                tracing::warn!(
                    target: "settlement::sender",
                    task = T::TASK.as_str(),
                    %err,
                    "cycle failed"
                );
            }
        }
    }
    tracing::debug!(target: "settlement::sender", task = T::TASK.as_str(), "task stopped");
}
