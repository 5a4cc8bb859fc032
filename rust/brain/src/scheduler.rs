//! Cooperative FIFO scheduler for [`Operation`]s.
//!
//! One logical thread drains the queue: an operation is dequeued, stepped
//! once, and then either collected (completed), re-enqueued (pending), or
//! dropped (cancelled or failed). Siblings spawned during a step are
//! enqueued in spawn order ahead of the re-enqueued parent, which makes
//! branch exploration order reproducible. Siblings that do not fit under
//! the pending bound are counted as refused and never run. Between steps
//! the scheduler yields to the async executor so no operation monopolises
//! the loop.

use std::collections::VecDeque;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use web_time::Instant;

use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::operation::{Operation, OperationId, Step, StepContext};

/// How an operation left the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
    Failed,
}

/// Handle for cancelling a queued operation from the outside.
#[derive(Debug, Clone)]
pub struct OperationHandle {
    id: OperationId,
    token: CancellationToken,
}

impl OperationHandle {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Everything one [`Scheduler::run`] produced.
#[derive(Debug)]
pub struct RunReport<T> {
    /// Outputs of completed operations, in operation id (spawn) order.
    pub completed: Vec<(OperationId, T)>,
    pub cancelled: Vec<OperationId>,
    pub failed: Vec<(OperationId, BrainError)>,
    /// Siblings that were never enqueued because the queue was full.
    pub refused: usize,
    /// Steps executed.
    pub steps: usize,
    /// True when the step budget or the deadline cut the run short.
    pub exhausted: bool,
}

impl<T> Default for RunReport<T> {
    fn default() -> Self {
        RunReport {
            completed: Vec::new(),
            cancelled: Vec::new(),
            failed: Vec::new(),
            refused: 0,
            steps: 0,
            exhausted: false,
        }
    }
}

impl<T> RunReport<T> {
    pub fn outcome(&self, id: OperationId) -> Option<Outcome> {
        if self.completed.iter().any(|(done, _)| *done == id) {
            Some(Outcome::Completed)
        } else if self.cancelled.contains(&id) {
            Some(Outcome::Cancelled)
        } else if self.failed.iter().any(|(failed, _)| *failed == id) {
            Some(Outcome::Failed)
        } else {
            None
        }
    }

    /// Completed outputs without their ids.
    pub fn outputs(&self) -> impl Iterator<Item = &T> {
        self.completed.iter().map(|(_, output)| output)
    }
}

struct Task<O> {
    id: OperationId,
    operation: O,
    token: CancellationToken,
}

/// FIFO work queue drained one step at a time.
pub struct Scheduler<O: Operation> {
    queue: VecDeque<Task<O>>,
    next_id: u64,
    token: CancellationToken,
    max_steps: usize,
    max_pending: usize,
    timeout: Option<Duration>,
}

impl<O: Operation> Default for Scheduler<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Operation> Scheduler<O> {
    pub fn new() -> Self {
        Self::from_config(&BrainConfig::default())
    }

    pub fn from_config(config: &BrainConfig) -> Self {
        Scheduler {
            queue: VecDeque::new(),
            next_id: 0,
            token: CancellationToken::new(),
            max_steps: config.max_steps,
            max_pending: config.max_pending,
            timeout: config.turn_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Tie this scheduler's lifetime to an outer token: cancelling `parent`
    /// cancels every operation queued here.
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.token = parent.child_token();
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel every queued operation.
    pub fn cancel_all(&self) {
        self.token.cancel();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Enqueue an operation. Returns `None` when the queue is full.
    pub fn add_operation(&mut self, operation: O) -> Option<OperationHandle> {
        if self.queue.len() >= self.max_pending {
            tracing::warn!(
                pending = self.queue.len(),
                "Operation queue is full; refusing new operation"
            );
            return None;
        }

        let id = OperationId(self.next_id);
        self.next_id += 1;
        let token = self.token.child_token();

        tracing::trace!(operation = %id, "Enqueued operation");
        self.queue.push_back(Task {
            id,
            operation,
            token: token.clone(),
        });

        Some(OperationHandle { id, token })
    }

    /// Drain the queue.
    pub async fn run(&mut self, env: &mut O::Env) -> RunReport<O::Output> {
        let mut report = RunReport::default();
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        while let Some(mut task) = self.queue.pop_front() {
            if !report.exhausted && self.out_of_budget(report.steps, deadline) {
                tracing::warn!(
                    steps = report.steps,
                    pending = self.queue.len() + 1,
                    "Turn budget exhausted; cancelling remaining operations"
                );
                report.exhausted = true;
                self.token.cancel();
            }

            if task.token.is_cancelled() {
                tracing::debug!(operation = %task.id, "Discarding cancelled operation");
                report.cancelled.push(task.id);
                continue;
            }

            report.steps += 1;
            let mut spawned = Vec::new();
            let result = {
                let mut cx = StepContext {
                    id: task.id,
                    token: &task.token,
                    spawned: &mut spawned,
                };
                task.operation.step(env, &mut cx)
            };

            // A step that observed cancellation may have forked from partial
            // state; its siblings go with it.
            if task.token.is_cancelled() {
                tracing::debug!(operation = %task.id, "Operation cancelled mid-step");
                report.cancelled.push(task.id);
                continue;
            }

            for sibling in spawned {
                match self.add_operation(sibling) {
                    Some(handle) => {
                        tracing::debug!(parent = %task.id, operation = %handle.id(), "Spawned sibling")
                    }
                    None => report.refused += 1,
                }
            }

            match result {
                Ok(Step::Completed) => {
                    tracing::debug!(operation = %task.id, "Operation completed");
                    report.completed.push((task.id, task.operation.finish()));
                }
                Ok(Step::Pending) => self.queue.push_back(task),
                Err(error) => {
                    tracing::warn!(operation = %task.id, %error, "Operation failed");
                    report.failed.push((task.id, error));
                }
            }

            tokio::task::yield_now().await;
        }

        report.completed.sort_by_key(|(id, _)| *id);
        report
    }

    fn out_of_budget(&self, steps: usize, deadline: Option<Instant>) -> bool {
        steps >= self.max_steps || deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Counts down to zero; forks a sibling at `fork_at`.
    #[derive(Clone)]
    struct Countdown {
        name: &'static str,
        remaining: usize,
        fork_at: Option<usize>,
    }

    impl Operation for Countdown {
        type Env = Vec<String>;
        type Output = &'static str;

        fn step(&mut self, env: &mut Vec<String>, cx: &mut StepContext<'_, Self>) -> Result<Step> {
            if cx.is_cancelled() {
                return Ok(Step::Pending);
            }
            env.push(format!("{}:{}", self.name, self.remaining));

            if self.fork_at == Some(self.remaining) {
                let mut sibling = self.clone();
                sibling.name = "fork";
                sibling.fork_at = None;
                cx.spawn(sibling);
            }

            if self.remaining == 0 {
                return Ok(Step::Completed);
            }
            self.remaining -= 1;
            Ok(Step::Pending)
        }

        fn finish(self) -> &'static str {
            self.name
        }
    }

    #[derive(Clone)]
    struct Failing;

    impl Operation for Failing {
        type Env = Vec<String>;
        type Output = ();

        fn step(&mut self, _env: &mut Vec<String>, _cx: &mut StepContext<'_, Self>) -> Result<Step> {
            Err(BrainError::handler("failing", "boom"))
        }

        fn finish(self) {}
    }

    fn countdown(name: &'static str, remaining: usize) -> Countdown {
        Countdown {
            name,
            remaining,
            fork_at: None,
        }
    }

    #[tokio::test]
    async fn runs_operations_round_robin() {
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(countdown("a", 1));
        scheduler.add_operation(countdown("b", 1));

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;

        assert_eq!(log, vec!["a:1", "b:1", "a:0", "b:0"]);
        assert_eq!(report.outputs().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(report.steps, 4);
    }

    #[tokio::test]
    async fn spawned_siblings_run_before_parent_resumes() {
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(Countdown {
            name: "root",
            remaining: 1,
            fork_at: Some(1),
        });

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;

        assert_eq!(log, vec!["root:1", "fork:1", "root:0", "fork:0"]);
        assert_eq!(report.completed.len(), 2);
        assert_eq!(report.completed[0].1, "root");
        assert_eq!(report.completed[1].1, "fork");
    }

    #[tokio::test]
    async fn cancelled_operation_is_discarded_without_running() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.add_operation(countdown("a", 3)).unwrap();
        scheduler.add_operation(countdown("b", 0));
        handle.cancel();

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;

        assert_eq!(log, vec!["b:0"]);
        assert_eq!(report.outcome(handle.id()), Some(Outcome::Cancelled));
        assert_eq!(report.completed.len(), 1);
    }

    #[tokio::test]
    async fn failure_does_not_abort_siblings() {
        let mut scheduler: Scheduler<Failing> = Scheduler::new();
        let handle = scheduler.add_operation(Failing).unwrap();

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;
        assert_eq!(report.outcome(handle.id()), Some(Outcome::Failed));

        let mut scheduler = Scheduler::new();
        scheduler.add_operation(countdown("a", 0));
        let report = scheduler.run(&mut log).await;
        assert_eq!(report.completed.len(), 1);
    }

    #[tokio::test]
    async fn step_budget_cancels_the_rest() {
        let config = BrainConfig::default().with_max_steps(3);
        let mut scheduler = Scheduler::from_config(&config);
        let a = scheduler.add_operation(countdown("a", 5)).unwrap();
        let b = scheduler.add_operation(countdown("b", 0)).unwrap();

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;

        assert!(report.exhausted);
        assert_eq!(report.steps, 3);
        assert_eq!(report.outcome(a.id()), Some(Outcome::Cancelled));
        assert_eq!(report.outcome(b.id()), Some(Outcome::Completed));
    }

    #[tokio::test]
    async fn elapsed_deadline_cancels_everything() {
        let config = BrainConfig::default().with_turn_timeout_ms(0);
        let mut scheduler = Scheduler::from_config(&config);
        let handle = scheduler.add_operation(countdown("a", 2)).unwrap();

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;

        assert!(report.exhausted);
        assert!(log.is_empty());
        assert_eq!(report.outcome(handle.id()), Some(Outcome::Cancelled));
    }

    #[tokio::test]
    async fn full_queue_refuses_operations() {
        let config = BrainConfig::default().with_max_pending(1);
        let mut scheduler = Scheduler::from_config(&config);
        assert!(scheduler.add_operation(countdown("a", 0)).is_some());
        assert!(scheduler.add_operation(countdown("b", 0)).is_none());
        assert_eq!(scheduler.pending(), 1);
    }

    #[tokio::test]
    async fn parent_token_cancels_everything() {
        let turn = CancellationToken::new();
        let mut scheduler = Scheduler::new().with_parent(&turn);
        scheduler.add_operation(countdown("a", 2));
        scheduler.add_operation(countdown("b", 2));
        turn.cancel();

        let mut log = Vec::new();
        let report = scheduler.run(&mut log).await;

        assert!(log.is_empty());
        assert_eq!(report.cancelled.len(), 2);
        assert!(report.completed.is_empty());
    }
}
