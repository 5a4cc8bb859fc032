//! Built-in conversational concepts.
//!
//! These cover small talk: greetings, "say ...", introductions and
//! pronoun references. They double as worked examples of the concept API.

mod name;
mod pronoun;
mod salutation;
mod say;

pub use name::NameConcept;
pub use pronoun::PronounConcept;
pub use salutation::SalutationConcept;
pub use say::SayConcept;

use std::sync::Arc;

use crate::concept::Concept;

/// Every built-in concept, in registration order.
pub fn default_concepts() -> Vec<Arc<dyn Concept>> {
    vec![
        Arc::new(SalutationConcept),
        Arc::new(SayConcept::default()),
        Arc::new(NameConcept),
        Arc::new(PronounConcept),
    ]
}
