use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Concept, ConceptHandlerContext, ConceptHandlerFn, ConceptSet};
use crate::context::Context;
use crate::dictionary::{Dictionary, DictionaryItem, PartOfSpeech};
use crate::error::Result;
use crate::graph::GraphNode;
use crate::intent::IntentCandidate;
use crate::pattern::{Pattern, TriggerKey};

/// One trigger alternative and the handler it fires.
struct Registration {
    concept: &'static str,
    pattern: Pattern,
    handler: ConceptHandlerFn,
}

/// Handed to [`Concept::register`] to declare vocabulary and triggers.
pub struct Registrar<'a> {
    concept: &'static str,
    dictionary: &'a mut Dictionary,
    registrations: &'a mut Vec<Registration>,
}

impl Registrar<'_> {
    /// Add a word to the dictionary.
    pub fn word(&mut self, text: &str, pos: PartOfSpeech) -> Result<Arc<DictionaryItem>> {
        self.dictionary.add_text_part(text, Some(pos))
    }

    /// Declare a handler for every alternative of a trigger spec.
    pub fn on<F>(&mut self, spec: &str, handler: F) -> Result<()>
    where
        F: Fn(&mut ConceptHandlerContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let patterns = Pattern::parse_spec(spec, |text| self.dictionary.normalize(text))?;
        let handler: ConceptHandlerFn = Arc::new(handler);

        for pattern in patterns {
            tracing::trace!(concept = self.concept, pattern = %pattern, "Registered trigger");
            self.registrations.push(Registration {
                concept: self.concept,
                pattern,
                handler: handler.clone(),
            });
        }
        Ok(())
    }

    pub fn dictionary(&mut self) -> &mut Dictionary {
        self.dictionary
    }
}

/// Collects concepts before they are registered together.
#[derive(Default)]
pub struct ConceptRegistryBuilder {
    concepts: Vec<Arc<dyn Concept>>,
}

impl ConceptRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(self, concept: impl Concept + 'static) -> Self {
        self.add_shared(Arc::new(concept))
    }

    pub fn add_shared(mut self, concept: Arc<dyn Concept>) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Register every concept against `dictionary`, then run the wiring
    /// pass in registration order.
    pub fn build(self, dictionary: &mut Dictionary) -> Result<ConceptRegistry> {
        let mut concepts = ConceptSet::default();
        for concept in &self.concepts {
            concepts.insert(concept.clone())?;
        }

        let mut registrations = Vec::new();
        for concept in self.concepts {
            let before = registrations.len();
            let mut registrar = Registrar {
                concept: concept.name(),
                dictionary: &mut *dictionary,
                registrations: &mut registrations,
            };
            concept.clone().register(&mut registrar)?;
            tracing::info!(
                concept = concept.name(),
                triggers = registrations.len() - before,
                "Registered concept"
            );
        }

        for concept in concepts.iter() {
            concept.on_after_all_registered(&concepts)?;
        }

        let mut by_text: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut by_pos: IndexMap<PartOfSpeech, Vec<usize>> = IndexMap::new();
        for (index, registration) in registrations.iter().enumerate() {
            for key in registration.pattern.trigger_keys() {
                let slot = match key {
                    TriggerKey::Text(text) => by_text.entry(text).or_default(),
                    TriggerKey::Pos(pos) => by_pos.entry(pos).or_default(),
                };
                if slot.last() != Some(&index) {
                    slot.push(index);
                }
            }
        }

        Ok(ConceptRegistry {
            concepts,
            registrations,
            by_text,
            by_pos,
        })
    }
}

/// Every registered trigger, indexed by the anchor it fires on.
pub struct ConceptRegistry {
    concepts: ConceptSet,
    registrations: Vec<Registration>,
    by_text: IndexMap<String, Vec<usize>>,
    by_pos: IndexMap<PartOfSpeech, Vec<usize>>,
}

impl ConceptRegistry {
    pub fn builder() -> ConceptRegistryBuilder {
        ConceptRegistryBuilder::new()
    }

    pub fn concepts(&self) -> &ConceptSet {
        &self.concepts
    }

    pub fn concept_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.concepts.names()
    }

    /// Trigger alternatives registered in total.
    pub fn trigger_count(&self) -> usize {
        self.registrations.len()
    }

    /// Registrations whose anchor could fire on `item`, in registration order.
    fn candidates(&self, item: &DictionaryItem) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .by_text
            .get(item.text())
            .into_iter()
            .chain(self.by_pos.get(&item.pos()))
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// Fire every handler whose pattern matches around `node`.
    ///
    /// Handlers run in registration order. A failing handler is logged and
    /// skipped: its context edits are rolled back and its intents dropped.
    /// Returns how many handlers completed.
    pub fn dispatch(
        &self,
        prior: &[GraphNode],
        node: &GraphNode,
        upcoming: &[String],
        dictionary: &Dictionary,
        context: &mut Context,
        intents: &mut Vec<IntentCandidate>,
    ) -> usize {
        let mut fired = 0;

        for index in self.candidates(&node.item) {
            let registration = &self.registrations[index];
            if !registration
                .pattern
                .matches(prior, &node.item, upcoming, dictionary)
            {
                continue;
            }

            let snapshot = context.clone();
            let mut cx = ConceptHandlerContext::new(
                registration.concept,
                &registration.pattern,
                node,
                prior,
                upcoming,
                context,
            );
            let result = (registration.handler)(&mut cx);
            let (confidence, registered) = cx.finish();

            match result {
                Ok(()) => {
                    tracing::debug!(
                        concept = registration.concept,
                        pattern = %registration.pattern,
                        item = %node.item,
                        intents = registered.len(),
                        "Concept handler fired"
                    );
                    fired += 1;
                    intents.extend(registered.into_iter().map(|handler| IntentCandidate {
                        concept: registration.concept.to_string(),
                        handler,
                        confidence,
                    }));
                }
                Err(error) => {
                    tracing::warn!(
                        concept = registration.concept,
                        pattern = %registration.pattern,
                        %error,
                        "Concept handler failed"
                    );
                    *context = snapshot;
                }
            }
        }

        fired
    }
}

impl fmt::Debug for ConceptRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptRegistry")
            .field("concepts", &self.concepts.names().collect::<Vec<_>>())
            .field(
                "triggers",
                &self
                    .registrations
                    .iter()
                    .map(|r| r.pattern.source())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
