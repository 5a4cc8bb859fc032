use std::sync::Arc;

use crate::concept::{Concept, Registrar};
use crate::context::{ContextKind, ContextNode};
use crate::dictionary::PartOfSpeech;
use crate::error::Result;
use crate::intent::IntentHandler;

const GREETINGS: [(&str, &str); 3] = [("hi", "Hello."), ("hello", "Hi there."), ("hey", "Hey.")];

/// Greetings. A greeting on its own is answered with certainty; one buried
/// in a longer utterance only tentatively.
#[derive(Debug, Default)]
pub struct SalutationConcept;

impl SalutationConcept {
    pub const NAME: &'static str = "salutation";

    /// The answer to a bare greeting word.
    pub fn reply_to(&self, word: &str) -> Option<&'static str> {
        GREETINGS
            .iter()
            .find(|(greeting, _)| *greeting == word)
            .map(|(_, reply)| *reply)
    }

    /// A greeting addressed to `name`, if known.
    pub fn greet(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => format!("Hi {name}."),
            None => "Hi.".to_string(),
        }
    }
}

impl Concept for SalutationConcept {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> Result<()> {
        for (word, _) in GREETINGS {
            registrar.word(word, PartOfSpeech::Interjection)?;
        }

        let this = self.clone();
        registrar.on("hi,hello,hey", move |cx| {
            let item = cx.item().clone();
            let reply = this
                .reply_to(item.text())
                .ok_or_else(|| cx.fail(format!("no reply for greeting '{}'", item.text())))?;

            let confidence = if cx.is_alone() { 1.0 } else { 0.5 };
            cx.context_mut()
                .attach(ContextNode::new(ContextKind::Salutation, Some(item)));
            cx.set_confidence(confidence);
            cx.register_intent(IntentHandler::reply(reply));
            Ok(())
        })
    }
}
