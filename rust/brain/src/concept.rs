//! Concepts: pluggable bundles of vocabulary and trigger handlers.
//!
//! A concept teaches the brain about one topic. At registration time it
//! adds words to the dictionary and declares trigger patterns with the
//! handlers they fire. Once every concept is registered, each one gets a
//! chance to look up the concepts it depends on.
//!
//! ```
//! use std::sync::Arc;
//!
//! use brain::concept::{Concept, ConceptRegistryBuilder, Registrar};
//! use brain::context::{ContextKind, ContextNode};
//! use brain::dictionary::{Dictionary, PartOfSpeech};
//! use brain::error::Result;
//!
//! struct Colors;
//!
//! impl Concept for Colors {
//!     fn name(&self) -> &'static str {
//!         "colors"
//!     }
//!
//!     fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> Result<()> {
//!         registrar.word("red", PartOfSpeech::Adjective)?;
//!         registrar.on("red", |cx| {
//!             let item = cx.item().clone();
//!             cx.context_mut()
//!                 .attach(ContextNode::new(ContextKind::Color, Some(item)));
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let mut dictionary = Dictionary::new();
//! let registry = ConceptRegistryBuilder::new()
//!     .add(Colors)
//!     .build(&mut dictionary)
//!     .unwrap();
//! assert!(dictionary.contains("red"));
//! assert_eq!(registry.concept_names().collect::<Vec<_>>(), vec!["colors"]);
//! ```

mod handler;
mod registry;

pub use handler::*;
pub use registry::*;

use std::any::Any;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{BrainError, Result};

/// Upcast helper so registered concepts can be recovered by type.
pub trait AsAny {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A registrable unit of domain knowledge.
pub trait Concept: AsAny + Send + Sync {
    /// Unique name; registering two concepts with the same name fails.
    fn name(&self) -> &'static str;

    /// Add vocabulary and trigger handlers.
    fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> Result<()>;

    /// Called once after every concept has registered.
    fn on_after_all_registered(&self, _concepts: &ConceptSet) -> Result<()> {
        Ok(())
    }
}

/// Registered concepts by name, in registration order.
#[derive(Default, Clone)]
pub struct ConceptSet {
    concepts: IndexMap<&'static str, Arc<dyn Concept>>,
}

impl ConceptSet {
    pub(crate) fn insert(&mut self, concept: Arc<dyn Concept>) -> Result<()> {
        let name = concept.name();
        if self.concepts.contains_key(name) {
            return Err(BrainError::DuplicateConcept {
                name: name.to_string(),
            });
        }
        self.concepts.insert(name, concept);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Concept>> {
        self.concepts.get(name)
    }

    /// Look up a concept by name and type on behalf of `requested_by`.
    pub fn require<T: Concept + 'static>(&self, name: &str, requested_by: &str) -> Result<Arc<T>> {
        self.get(name)
            .and_then(|concept| concept.clone().into_any().downcast::<T>().ok())
            .ok_or_else(|| BrainError::MissingConcept {
                name: name.to_string(),
                requested_by: requested_by.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.concepts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Concept>> {
        self.concepts.values()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    struct Beta;

    impl Concept for Alpha {
        fn name(&self) -> &'static str {
            "alpha"
        }

        fn register(self: Arc<Self>, _registrar: &mut Registrar<'_>) -> Result<()> {
            Ok(())
        }
    }

    impl Concept for Beta {
        fn name(&self) -> &'static str {
            "beta"
        }

        fn register(self: Arc<Self>, _registrar: &mut Registrar<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn require_recovers_the_concrete_type() {
        let mut set = ConceptSet::default();
        set.insert(Arc::new(Alpha)).unwrap();
        set.insert(Arc::new(Beta)).unwrap();

        assert!(set.require::<Alpha>("alpha", "test").is_ok());
        assert!(matches!(
            set.require::<Alpha>("beta", "test"),
            Err(BrainError::MissingConcept { .. })
        ));
        assert!(matches!(
            set.require::<Beta>("gamma", "test"),
            Err(BrainError::MissingConcept { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut set = ConceptSet::default();
        set.insert(Arc::new(Alpha)).unwrap();
        assert!(matches!(
            set.insert(Arc::new(Alpha)),
            Err(BrainError::DuplicateConcept { name }) if name == "alpha"
        ));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["alpha"]);
    }
}
