use std::sync::Arc;

use crate::concept::{Concept, Registrar};
use crate::context::{ContextKind, ContextNode};
use crate::dictionary::PartOfSpeech;
use crate::error::Result;

/// Demonstrative references. "that" or "them" opens a subject; when a
/// "what" came earlier in the utterance, the subject sits under a question.
#[derive(Debug, Default)]
pub struct PronounConcept;

impl PronounConcept {
    pub const NAME: &'static str = "pronoun";
}

impl Concept for PronounConcept {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> Result<()> {
        registrar.word("them", PartOfSpeech::Determiner)?;
        registrar.word("that", PartOfSpeech::Determiner)?;
        registrar.word("what", PartOfSpeech::Pronoun)?;

        registrar.on("them^D|that^D", |cx| {
            let item = cx.item().clone();
            cx.context_mut()
                .attach(ContextNode::new(ContextKind::Subject, Some(item)));
            Ok(())
        })?;

        registrar.on("what * that^D|them^D", |cx| {
            let question = cx
                .prior()
                .iter()
                .rev()
                .find(|node| node.item.text() == "what")
                .map(|node| node.item.clone());
            let item = cx.item().clone();
            cx.context_mut()
                .attach(ContextNode::new(ContextKind::Question, question))
                .attach(ContextNode::new(ContextKind::Subject, Some(item)));
            Ok(())
        })
    }
}
