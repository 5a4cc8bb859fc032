use std::sync::Arc;

use crate::context::Context;
use crate::dictionary::DictionaryItem;
use crate::error::{BrainError, Result};
use crate::graph::GraphNode;
use crate::intent::{Confidence, IntentHandler};
use crate::pattern::Pattern;

/// Callback fired when a trigger pattern matches.
pub type ConceptHandlerFn = Arc<dyn Fn(&mut ConceptHandlerContext<'_>) -> Result<()> + Send + Sync>;

/// Everything a concept handler sees while it runs.
///
/// The handler reads the matched item and its neighbours, edits the
/// interpretation's context, sets how confident it is, and registers
/// intents. Intents and confidence are only kept if the handler returns
/// `Ok`.
pub struct ConceptHandlerContext<'a> {
    concept: &'static str,
    pattern: &'a Pattern,
    node: &'a GraphNode,
    prior: &'a [GraphNode],
    upcoming: &'a [String],
    context: &'a mut Context,
    confidence: Confidence,
    intents: Vec<IntentHandler>,
}

impl<'a> ConceptHandlerContext<'a> {
    pub(crate) fn new(
        concept: &'static str,
        pattern: &'a Pattern,
        node: &'a GraphNode,
        prior: &'a [GraphNode],
        upcoming: &'a [String],
        context: &'a mut Context,
    ) -> Self {
        ConceptHandlerContext {
            concept,
            pattern,
            node,
            prior,
            upcoming,
            context,
            confidence: Confidence::CERTAIN,
            intents: Vec::new(),
        }
    }

    pub fn concept(&self) -> &'static str {
        self.concept
    }

    /// The pattern alternative that matched.
    pub fn pattern(&self) -> &Pattern {
        self.pattern
    }

    /// The item that was just recognized.
    pub fn item(&self) -> &Arc<DictionaryItem> {
        &self.node.item
    }

    pub fn node(&self) -> &GraphNode {
        self.node
    }

    /// Nodes recognized before this one, oldest first.
    pub fn prior(&self) -> &[GraphNode] {
        self.prior
    }

    pub fn previous(&self) -> Option<&GraphNode> {
        self.prior.last()
    }

    /// Normalized tokens not yet segmented.
    pub fn upcoming(&self) -> &[String] {
        self.upcoming
    }

    pub fn next_token(&self) -> Option<&str> {
        self.upcoming.first().map(String::as_str)
    }

    /// True when the item is the whole utterance.
    pub fn is_alone(&self) -> bool {
        self.prior.is_empty() && self.upcoming.is_empty()
    }

    pub fn context(&self) -> &Context {
        self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        self.context
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Confidence attached to every intent this invocation registers.
    pub fn set_confidence(&mut self, confidence: impl Into<Confidence>) {
        self.confidence = confidence.into();
    }

    pub fn register_intent(&mut self, handler: IntentHandler) {
        self.intents.push(handler);
    }

    /// A handler error attributed to this concept.
    pub fn fail(&self, message: impl Into<String>) -> BrainError {
        BrainError::handler(self.concept, message)
    }

    pub(crate) fn finish(self) -> (Confidence, Vec<IntentHandler>) {
        (self.confidence, self.intents)
    }
}
