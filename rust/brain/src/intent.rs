//! Intents: deferred actions registered by concept handlers.
//!
//! A handler that recognizes something actionable does not act right away.
//! It registers an [`IntentHandler`] on its interpretation; once every
//! interpretation of the turn is complete, [`select_intent`] picks the single
//! best candidate and only that one runs.
//!
//! Intent callbacks are async and receive an [`IntentScope`] giving them the
//! session and the response channel:
//!
//! ```
//! use brain::intent::IntentHandler;
//!
//! let handler = IntentHandler::new(|mut scope| {
//!     Box::pin(async move {
//!         let name = scope.session().user_name.clone().unwrap_or_default();
//!         scope.respond(&format!("Bye {name}.")).await
//!     })
//! })
//! .with_min_confidence(0.5);
//! # let _ = handler;
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::Result;
use crate::session::Session;

/// A confidence in the range [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    pub const CERTAIN: Confidence = Confidence(1.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Confidence(0.0);
        }
        Confidence(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::CERTAIN
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Confidence::new(value)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Where responses go.
#[async_trait]
pub trait ResponseChannel: Send + Sync {
    async fn do_response(&self, text: &str) -> Result<()>;
}

/// A channel that keeps every response in memory.
#[derive(Debug, Default)]
pub struct ResponseLog {
    responses: Mutex<Vec<String>>,
}

impl ResponseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responses(&self) -> Vec<String> {
        self.responses.lock().clone()
    }

    /// Drain the collected responses.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.responses.lock())
    }
}

#[async_trait]
impl ResponseChannel for ResponseLog {
    async fn do_response(&self, text: &str) -> Result<()> {
        self.responses.lock().push(text.to_string());
        Ok(())
    }
}

/// What an executing intent may touch.
pub struct IntentScope<'a> {
    session: &'a mut Session,
    channel: &'a dyn ResponseChannel,
}

impl<'a> IntentScope<'a> {
    pub fn new(session: &'a mut Session, channel: &'a dyn ResponseChannel) -> Self {
        IntentScope { session, channel }
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    pub async fn respond(&self, text: &str) -> Result<()> {
        self.channel.do_response(text).await
    }
}

pub type IntentFuture<'a> = BoxFuture<'a, Result<()>>;

type IntentCallback = Arc<dyn for<'a> Fn(IntentScope<'a>) -> IntentFuture<'a> + Send + Sync>;

/// A deferred action plus the threshold it needs to clear.
#[derive(Clone)]
pub struct IntentHandler {
    callback: IntentCallback,
    min_confidence: Confidence,
    priority: i32,
}

impl IntentHandler {
    pub fn new<F>(callback: F) -> Self
    where
        F: for<'a> Fn(IntentScope<'a>) -> IntentFuture<'a> + Send + Sync + 'static,
    {
        IntentHandler {
            callback: Arc::new(callback),
            min_confidence: Confidence::new(0.0),
            priority: 0,
        }
    }

    /// An intent that answers with fixed text.
    pub fn reply(text: impl Into<String>) -> Self {
        let text = text.into();
        IntentHandler::new(move |scope| {
            let text = text.clone();
            Box::pin(async move { scope.respond(&text).await })
        })
    }

    pub fn with_min_confidence(mut self, min_confidence: impl Into<Confidence>) -> Self {
        self.min_confidence = min_confidence.into();
        self
    }

    /// Breaks confidence ties; higher wins.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn min_confidence(&self) -> Confidence {
        self.min_confidence
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub async fn execute(&self, scope: IntentScope<'_>) -> Result<()> {
        (self.callback)(scope).await
    }
}

impl fmt::Debug for IntentHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntentHandler")
            .field("min_confidence", &self.min_confidence)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// An intent registered during a turn, tagged with the confidence of the
/// handler invocation that registered it.
#[derive(Debug, Clone)]
pub struct IntentCandidate {
    pub concept: String,
    pub handler: IntentHandler,
    pub confidence: Confidence,
}

impl IntentCandidate {
    pub fn is_eligible(&self) -> bool {
        self.confidence >= self.handler.min_confidence
    }
}

/// Pick the eligible candidate with the highest confidence, then the
/// highest priority. On a full tie the earliest registered candidate wins.
pub fn select_intent(candidates: &[IntentCandidate]) -> Option<&IntentCandidate> {
    let mut best: Option<&IntentCandidate> = None;
    for candidate in candidates.iter().filter(|c| c.is_eligible()) {
        let better = match best {
            None => true,
            Some(current) => {
                candidate.confidence > current.confidence
                    || (candidate.confidence == current.confidence
                        && candidate.handler.priority > current.handler.priority)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}
