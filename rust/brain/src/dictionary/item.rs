use std::fmt;

/// Stable identifier of a [`DictionaryItem`] within its dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Part-of-speech tag of a lexicon entry.
///
/// Each tag has a short code used by trigger patterns (`^D`, `^U`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Pronoun,
    Preposition,
    Conjunction,
    Interjection,
    Number,
    /// Entries created without a tag, including provisional ones.
    Unknown,
}

impl PartOfSpeech {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Noun => "N",
            Self::Verb => "V",
            Self::Adjective => "A",
            Self::Adverb => "R",
            Self::Determiner => "D",
            Self::Pronoun => "P",
            Self::Preposition => "I",
            Self::Conjunction => "C",
            Self::Interjection => "U",
            Self::Number => "M",
            Self::Unknown => "?",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let pos = match code {
            "N" => Self::Noun,
            "V" => Self::Verb,
            "A" => Self::Adjective,
            "R" => Self::Adverb,
            "D" => Self::Determiner,
            "P" => Self::Pronoun,
            "I" => Self::Preposition,
            "C" => Self::Conjunction,
            "U" => Self::Interjection,
            "M" => Self::Number,
            "?" => Self::Unknown,
            _ => return None,
        };
        Some(pos)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One lexicon entry: a word or phrase with its part of speech.
///
/// Items are created by the [`Dictionary`](super::Dictionary) only and are
/// immutable afterwards; everything else holds them through `Arc`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DictionaryItem {
    id: ItemId,
    text: String,
    pos: PartOfSpeech,
    provisional: bool,
}

impl DictionaryItem {
    pub(crate) fn new(id: ItemId, text: String, pos: PartOfSpeech, provisional: bool) -> Self {
        DictionaryItem {
            id,
            text,
            pos,
            provisional,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The normalized canonical text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pos(&self) -> PartOfSpeech {
        self.pos
    }

    /// True for entries invented for text the lexicon did not know.
    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    /// Number of words in the entry's text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

impl fmt::Display for DictionaryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}^{}", self.text, self.pos)
    }
}
