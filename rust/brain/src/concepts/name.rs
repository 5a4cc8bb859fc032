use std::sync::Arc;

use crate::concept::{Concept, Registrar};
use crate::context::{ContextKind, ContextNode};
use crate::dictionary::PartOfSpeech;
use crate::error::Result;
use crate::intent::IntentHandler;

/// "my name is <name>": remember what to call the user.
#[derive(Debug, Default)]
pub struct NameConcept;

impl NameConcept {
    pub const NAME: &'static str = "name";
}

impl Concept for NameConcept {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> Result<()> {
        registrar.word("my", PartOfSpeech::Determiner)?;
        registrar.word("name", PartOfSpeech::Noun)?;
        registrar.word("is", PartOfSpeech::Verb)?;

        registrar.on("my name is ^?", |cx| {
            let item = cx.item().clone();
            let name = capitalize(item.text());

            cx.context_mut()
                .attach(ContextNode::new(ContextKind::Subject, Some(item)).with_value(name.clone()));
            cx.set_confidence(1.0);
            cx.register_intent(
                IntentHandler::new(move |mut scope| {
                    let name = name.clone();
                    Box::pin(async move {
                        let session = scope.session();
                        session.user_name = Some(name.clone());
                        session.remember("name", name.as_str());
                        scope.respond(&format!("Nice to meet you, {name}.")).await
                    })
                })
                .with_priority(5),
            );
            Ok(())
        })
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_capitalized() {
        assert_eq!(capitalize("bob"), "Bob");
        assert_eq!(capitalize("élodie"), "Élodie");
        assert_eq!(capitalize(""), "");
    }
}
