use std::sync::{Arc, OnceLock};

use super::SalutationConcept;
use crate::concept::{Concept, ConceptSet, Registrar};
use crate::context::{ContextKind, ContextNode};
use crate::dictionary::PartOfSpeech;
use crate::error::Result;
use crate::intent::IntentHandler;

/// "say <greeting>": greet the user by name.
///
/// A bare "say" only earns a weak fallback; "say" followed by a greeting
/// registers a high-priority intent built on [`SalutationConcept::greet`].
#[derive(Debug, Default)]
pub struct SayConcept {
    salutation: OnceLock<Arc<SalutationConcept>>,
}

impl SayConcept {
    pub const NAME: &'static str = "say";
}

impl Concept for SayConcept {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> Result<()> {
        registrar.word("say", PartOfSpeech::Verb)?;

        registrar.on("say", |cx| {
            cx.set_confidence(0.3);
            cx.register_intent(IntentHandler::reply("Say what."));
            Ok(())
        })?;

        let this = self.clone();
        registrar.on("say ^U", move |cx| {
            let salutation = this
                .salutation
                .get()
                .cloned()
                .ok_or_else(|| cx.fail("salutation concept is not wired"))?;

            let command = cx.previous().map(|node| node.item.clone());
            let greeting = cx.item().clone();
            cx.context_mut()
                .attach(ContextNode::new(ContextKind::Command, command))
                .attach(ContextNode::new(ContextKind::Salutation, Some(greeting)));

            cx.set_confidence(1.0);
            cx.register_intent(
                IntentHandler::new(move |mut scope| {
                    let salutation = salutation.clone();
                    Box::pin(async move {
                        let greeting = salutation.greet(scope.session().user_name.as_deref());
                        scope.respond(&greeting).await
                    })
                })
                .with_priority(10),
            );
            Ok(())
        })
    }

    fn on_after_all_registered(&self, concepts: &ConceptSet) -> Result<()> {
        let salutation =
            concepts.require::<SalutationConcept>(SalutationConcept::NAME, Self::NAME)?;
        if self.salutation.set(salutation).is_err() {
            tracing::debug!(concept = Self::NAME, "Salutation already wired; keeping the first");
        }
        Ok(())
    }
}
