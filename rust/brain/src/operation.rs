//! Operations: resumable units of scheduler work that fork by cloning.
//!
//! An operation is driven by repeated calls to [`Operation::step`]. Each
//! call does a bounded slice of work and reports whether the operation is
//! done. Work is forked by cloning the operation, adjusting the clone and
//! handing it to [`StepContext::spawn`]; the clone then runs as an
//! independent sibling. Because forking goes through `Clone` on owned
//! state, two live operations can never alias the same mutable state.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Identifier assigned by the scheduler in enqueue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub(crate) u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// What a step reports back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More work remains; re-enqueue and resume later.
    Pending,
    /// The operation is finished and its output can be collected.
    Completed,
}

/// A unit of cooperative work.
pub trait Operation: Clone {
    /// Shared state every step is allowed to touch.
    type Env: ?Sized;
    /// What a completed operation yields.
    type Output;

    /// Run one slice of work.
    ///
    /// Implementations check [`StepContext::is_cancelled`] at their loop
    /// boundaries and return promptly once it is set.
    fn step(&mut self, env: &mut Self::Env, cx: &mut StepContext<'_, Self>) -> Result<Step>;

    /// Consume a completed operation.
    fn finish(self) -> Self::Output;
}

/// Per-step view of the scheduler handed to [`Operation::step`].
pub struct StepContext<'a, O> {
    pub(crate) id: OperationId,
    pub(crate) token: &'a CancellationToken,
    pub(crate) spawned: &'a mut Vec<O>,
}

impl<'a, O> StepContext<'a, O> {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Enqueue a sibling. Siblings run after the current step returns,
    /// in the order they were spawned.
    pub fn spawn(&mut self, operation: O) {
        self.spawned.push(operation);
    }
}
