//! The lexicon: normalized text mapped to dictionary items.
//!
//! A text may map to several items that differ only in their part of
//! speech (homographs). Lookups go exact first; when nothing matches
//! exactly, a pluggable [`SimilarityStrategy`] proposes ranked neighbours.
//!
//! ```
//! use brain::dictionary::{Dictionary, PartOfSpeech};
//!
//! let mut dictionary = Dictionary::new();
//! let hello = dictionary.add_text_part("Hello", Some(PartOfSpeech::Interjection)).unwrap();
//!
//! assert_eq!(hello.text(), "hello");
//! assert_eq!(dictionary.find_similar_entries("HELLO")[0].id(), hello.id());
//! ```

mod item;
mod similarity;

pub use item::*;
pub use similarity::*;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::BrainConfig;
use crate::error::{BrainError, Result};

/// Lexicon store owning every [`DictionaryItem`].
#[derive(Debug)]
pub struct Dictionary {
    entries: IndexMap<String, Vec<Arc<DictionaryItem>>>,
    next_id: u32,
    case_fold: bool,
    strategy: Box<dyn SimilarityStrategy>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// A case-folding dictionary with the default edit-distance strategy.
    pub fn new() -> Self {
        Self::from_config(&BrainConfig::default())
    }

    pub fn from_config(config: &BrainConfig) -> Self {
        let strategy: Box<dyn SimilarityStrategy> = if config.fuzzy.enabled {
            Box::new(EditDistance::from(&config.fuzzy))
        } else {
            Box::new(ExactOnly)
        };

        Dictionary {
            entries: IndexMap::new(),
            next_id: 0,
            case_fold: config.case_fold,
            strategy,
        }
    }

    /// Replace the fuzzy lookup strategy.
    pub fn with_strategy(mut self, strategy: impl SimilarityStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Trim, collapse interior whitespace and (optionally) case-fold.
    pub fn normalize(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.case_fold {
            collapsed.to_lowercase()
        } else {
            collapsed
        }
    }

    /// Add an entry, or return the one already stored for `(text, pos)`.
    ///
    /// Without a part of speech, any existing entry for the text is
    /// returned; a new entry is tagged [`PartOfSpeech::Unknown`].
    pub fn add_text_part(
        &mut self,
        text: &str,
        pos: Option<PartOfSpeech>,
    ) -> Result<Arc<DictionaryItem>> {
        let key = self.normalize(text);
        if key.is_empty() {
            return Err(BrainError::EmptyEntry);
        }

        if let Some(existing) = self.lookup(&key, pos) {
            return Ok(existing);
        }

        Ok(self.insert(key, pos.unwrap_or(PartOfSpeech::Unknown), false))
    }

    /// Register text the lexicon does not know.
    ///
    /// Returns the existing entry when the text is in fact known.
    pub fn add_provisional(&mut self, text: &str) -> Result<Arc<DictionaryItem>> {
        let key = self.normalize(text);
        if key.is_empty() {
            return Err(BrainError::EmptyEntry);
        }

        if let Some(existing) = self.lookup(&key, None) {
            return Ok(existing);
        }

        tracing::debug!(text = %key, "Registering provisional dictionary item");
        Ok(self.insert(key, PartOfSpeech::Unknown, true))
    }

    /// Entries for `text`, best first; empty when nothing is similar.
    ///
    /// Exact matches (all homographs, in insertion order) win outright.
    /// Otherwise the similarity strategy ranks non-provisional entries by
    /// distance, ties broken by insertion order.
    pub fn find_similar_entries(&self, text: &str) -> Vec<Arc<DictionaryItem>> {
        let key = self.normalize(text);
        if key.is_empty() {
            return Vec::new();
        }

        if let Some(items) = self.entries.get(&key) {
            return items.clone();
        }

        let mut ranked: Vec<(usize, &Arc<DictionaryItem>)> = Vec::new();
        for (candidate, items) in &self.entries {
            let Some(distance) = self.strategy.distance(&key, candidate) else {
                continue;
            };
            ranked.extend(
                items
                    .iter()
                    .filter(|item| !item.is_provisional())
                    .map(|item| (distance, item)),
            );
        }
        // Stable sort keeps insertion order among equal distances.
        ranked.sort_by_key(|(distance, _)| *distance);

        ranked.into_iter().map(|(_, item)| item.clone()).collect()
    }

    /// Exact lookup without fuzzy fallback.
    pub fn get(&self, text: &str) -> &[Arc<DictionaryItem>] {
        let key = self.normalize(text);
        self.entries.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, text: &str) -> bool {
        !self.get(text).is_empty()
    }

    /// Number of items (not distinct texts).
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<DictionaryItem>> {
        self.entries.values().flatten()
    }

    fn lookup(&self, key: &str, pos: Option<PartOfSpeech>) -> Option<Arc<DictionaryItem>> {
        let items = self.entries.get(key)?;
        match pos {
            Some(pos) => items.iter().find(|item| item.pos() == pos).cloned(),
            None => items.first().cloned(),
        }
    }

    fn insert(&mut self, key: String, pos: PartOfSpeech, provisional: bool) -> Arc<DictionaryItem> {
        let id = ItemId(self.next_id);
        self.next_id += 1;

        let item = Arc::new(DictionaryItem::new(id, key.clone(), pos, provisional));
        self.entries.entry(key).or_default().push(item.clone());
        item
    }
}
