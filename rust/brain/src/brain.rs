//! The engine context tying everything together.
//!
//! A [`Brain`] owns the dictionary, the concept registry, the session and
//! the collaborators (tokenizer and response channel). One call to
//! [`Brain::respond`] is one turn:
//!
//! 1. tokenize the utterance,
//! 2. run segmentation on a fresh scheduler until every branch is done,
//! 3. pick the winning intent across all completed interpretations,
//! 4. execute it (or emit the configured fallback).
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! use brain::brain::Brain;
//!
//! let mut brain = Brain::builder().with_default_concepts().build().unwrap();
//! let outcome = brain.respond("Hello").await.unwrap();
//! assert_eq!(outcome.response(), Some("Hi there."));
//! # });
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::concept::{Concept, ConceptRegistry, ConceptRegistryBuilder};
use crate::concepts::default_concepts;
use crate::config::BrainConfig;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::intent::{IntentScope, ResponseChannel, ResponseLog, select_intent};
use crate::scheduler::{RunReport, Scheduler};
use crate::session::Session;
use crate::split::{Interpretation, SplitTextOperation};
use crate::token::{Tokenizer, WhitespaceTokenizer};

/// Shared state every segmentation step works against.
#[derive(Debug)]
pub struct Knowledge {
    pub dictionary: Dictionary,
    pub concepts: ConceptRegistry,
}

/// What one turn produced.
#[derive(Debug, Default)]
pub struct TurnOutcome {
    /// The tokenized utterance.
    pub parts: Vec<String>,
    /// Completed interpretations in spawn order.
    pub interpretations: Vec<Interpretation>,
    /// Operations that were cancelled or failed along the way.
    pub cancelled: usize,
    pub failed: usize,
    /// Forked readings dropped because the operation queue was full.
    pub refused: usize,
    /// The step budget or deadline ran out before every branch finished.
    pub exhausted: bool,
    /// Concept whose intent was executed.
    pub intent: Option<String>,
    /// Everything emitted on the response channel during this turn.
    pub responses: Vec<String>,
}

impl TurnOutcome {
    /// The first response of the turn, if any.
    pub fn response(&self) -> Option<&str> {
        self.responses.first().map(String::as_str)
    }
}

/// Assembles a [`Brain`].
pub struct BrainBuilder {
    config: BrainConfig,
    concepts: ConceptRegistryBuilder,
    tokenizer: Box<dyn Tokenizer>,
    channel: Arc<dyn ResponseChannel>,
}

impl Default for BrainBuilder {
    fn default() -> Self {
        BrainBuilder {
            config: BrainConfig::default(),
            concepts: ConceptRegistryBuilder::new(),
            tokenizer: Box::new(WhitespaceTokenizer),
            channel: Arc::new(ResponseLog::new()),
        }
    }
}

impl BrainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BrainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_concept(mut self, concept: impl Concept + 'static) -> Self {
        self.concepts = self.concepts.add(concept);
        self
    }

    /// Register the built-in conversational concepts.
    pub fn with_default_concepts(mut self) -> Self {
        for concept in default_concepts() {
            self.concepts = self.concepts.add_shared(concept);
        }
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn with_channel(mut self, channel: Arc<dyn ResponseChannel>) -> Self {
        self.channel = channel;
        self
    }

    pub fn build(self) -> Result<Brain> {
        let mut dictionary = Dictionary::from_config(&self.config);
        let concepts = self.concepts.build(&mut dictionary)?;

        tracing::info!(
            concepts = concepts.concepts().len(),
            triggers = concepts.trigger_count(),
            words = dictionary.len(),
            "Brain ready"
        );

        Ok(Brain {
            config: self.config,
            knowledge: Knowledge {
                dictionary,
                concepts,
            },
            session: Session::new(),
            tokenizer: self.tokenizer,
            channel: self.channel,
        })
    }
}

/// A conversational engine: dictionary, concepts, session and collaborators.
pub struct Brain {
    config: BrainConfig,
    knowledge: Knowledge,
    session: Session,
    tokenizer: Box<dyn Tokenizer>,
    channel: Arc<dyn ResponseChannel>,
}

impl Brain {
    pub fn builder() -> BrainBuilder {
        BrainBuilder::new()
    }

    pub fn config(&self) -> &BrainConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.knowledge.dictionary
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Segment `text` and run concept dispatch without resolving intents.
    pub async fn interpret(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> (Vec<String>, RunReport<Interpretation>) {
        let parts = self.tokenizer.tokenize(text);

        let mut scheduler = Scheduler::from_config(&self.config).with_parent(cancel);
        scheduler.add_operation(SplitTextOperation::new(parts.clone()));
        let report = scheduler.run(&mut self.knowledge).await;

        (parts, report)
    }

    /// Run one turn.
    pub async fn respond(&mut self, text: &str) -> Result<TurnOutcome> {
        self.respond_with_cancellation(text, &CancellationToken::new())
            .await
    }

    /// Run one turn that can be abandoned through `cancel`.
    ///
    /// A cancelled turn emits nothing and leaves the session untouched,
    /// apart from the turn counter.
    #[instrument(skip(self, cancel))]
    pub async fn respond_with_cancellation(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let turn = self.session.begin_turn();
        tracing::debug!(turn, "Turn started");

        let (parts, report) = self.interpret(text, cancel).await;
        let mut outcome = TurnOutcome {
            parts,
            cancelled: report.cancelled.len(),
            failed: report.failed.len(),
            refused: report.refused,
            exhausted: report.exhausted,
            interpretations: report.completed.into_iter().map(|(_, i)| i).collect(),
            ..TurnOutcome::default()
        };

        if cancel.is_cancelled() {
            tracing::info!("Turn cancelled; no response");
            return Ok(outcome);
        }

        tracing::debug!(
            interpretations = outcome.interpretations.len(),
            cancelled = outcome.cancelled,
            failed = outcome.failed,
            refused = outcome.refused,
            "Segmentation finished"
        );

        let candidates: Vec<_> = outcome
            .interpretations
            .iter()
            .flat_map(|interpretation| interpretation.intents.iter().cloned())
            .collect();

        let recorder = Recorder::new(self.channel.as_ref());
        match select_intent(&candidates) {
            Some(winner) => {
                tracing::info!(
                    concept = %winner.concept,
                    confidence = %winner.confidence,
                    candidates = candidates.len(),
                    "Executing intent"
                );
                outcome.intent = Some(winner.concept.clone());
                let scope = IntentScope::new(&mut self.session, &recorder);
                if let Err(error) = winner.handler.execute(scope).await {
                    tracing::warn!(concept = %winner.concept, %error, "Intent failed");
                }
            }
            None => match &self.config.fallback_response {
                Some(fallback) => {
                    tracing::info!(
                        candidates = candidates.len(),
                        "No intent selected; using fallback"
                    );
                    recorder.do_response(fallback).await?;
                }
                None => tracing::info!(candidates = candidates.len(), "No intent selected"),
            },
        }

        outcome.responses = recorder.into_responses();
        Ok(outcome)
    }
}

/// Forwards to the real channel and remembers what went through.
struct Recorder<'a> {
    inner: &'a dyn ResponseChannel,
    sent: Mutex<Vec<String>>,
}

impl<'a> Recorder<'a> {
    fn new(inner: &'a dyn ResponseChannel) -> Self {
        Recorder {
            inner,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn into_responses(self) -> Vec<String> {
        self.sent.into_inner()
    }
}

#[async_trait]
impl<'a> ResponseChannel for Recorder<'a> {
    async fn do_response(&self, text: &str) -> Result<()> {
        self.inner.do_response(text).await?;
        self.sent.lock().push(text.to_string());
        Ok(())
    }
}
