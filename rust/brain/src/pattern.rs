//! Trigger patterns for concept handlers.
//!
//! A trigger spec is a comma-separated list of alternatives, each a
//! whitespace-separated sequence of elements:
//!
//! - `*` matches any run of zero or more tokens,
//! - `text` matches a token with that text,
//! - `^XX` matches a token tagged with part of speech `XX`,
//! - `text^XX` requires both,
//! - `a|b` matches either atom.
//!
//! One element is the *anchor*: it has to match the item that was just
//! appended to a thought graph. The anchor is the element prefixed with
//! `@`, or the last non-wildcard element when none is marked. Elements
//! before the anchor are matched against the end of what was recognized
//! so far, elements after it against the start of the tokens not yet
//! segmented. So `say ^U` fires on an interjection directly preceded by
//! "say", `what * that^D|them^D` on "that" or "them" somewhere after
//! "what", and `@turn off` on "turn" when the next token is "off".

use std::fmt;
use std::sync::Arc;

use crate::dictionary::{Dictionary, DictionaryItem, PartOfSpeech};
use crate::error::{BrainError, Result};
use crate::graph::GraphNode;

/// One alternative inside an element: literal text, a POS tag, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub text: Option<String>,
    pub pos: Option<PartOfSpeech>,
}

impl Atom {
    pub fn matches_item(&self, item: &DictionaryItem) -> bool {
        self.text.as_deref().is_none_or(|text| text == item.text())
            && self.pos.is_none_or(|pos| pos == item.pos())
    }

    /// Match an unsegmented token; tags are checked by exact lookup.
    fn matches_token(&self, token: &str, dictionary: &Dictionary) -> bool {
        if self.text.as_deref().is_some_and(|text| text != token) {
            return false;
        }
        match self.pos {
            Some(pos) => dictionary.get(token).iter().any(|item| item.pos() == pos),
            None => true,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.text {
            write!(f, "{text}")?;
        }
        if let Some(pos) = &self.pos {
            write!(f, "^{pos}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Wildcard,
    Any(Vec<Atom>),
}

/// Key under which a pattern is filed in the dispatch index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerKey {
    Text(String),
    Pos(PartOfSpeech),
}

/// A parsed trigger pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    left: Vec<Element>,
    anchor: Vec<Atom>,
    right: Vec<Element>,
}

impl Pattern {
    /// Parse a full trigger spec into one pattern per comma-separated
    /// alternative. Literal text goes through `normalize` so it compares
    /// equal to dictionary text.
    pub fn parse_spec(spec: &str, normalize: impl Fn(&str) -> String) -> Result<Vec<Pattern>> {
        let patterns = spec
            .split(',')
            .map(|alternative| Pattern::parse(alternative, &normalize))
            .collect::<Result<Vec<_>>>()?;

        if patterns.is_empty() {
            return Err(invalid(spec, "empty trigger"));
        }
        Ok(patterns)
    }

    pub fn parse(source: &str, normalize: impl Fn(&str) -> String) -> Result<Pattern> {
        let mut marked = Vec::new();
        let mut elements = Vec::new();
        for (index, element) in source.split_whitespace().enumerate() {
            let element = match element.strip_prefix('@') {
                Some(anchor) => {
                    marked.push(index);
                    anchor
                }
                None => element,
            };
            elements.push(parse_element(source, element, &normalize)?);
        }

        let anchor_at = match marked.as_slice() {
            [] => elements
                .iter()
                .rposition(|element| matches!(element, Element::Any(_)))
                .ok_or_else(|| {
                    invalid(source, "pattern needs at least one non-wildcard element")
                })?,
            [index] => *index,
            _ => return Err(invalid(source, "only one element may be marked with '@'")),
        };

        let right = elements.split_off(anchor_at + 1);
        let anchor = match elements.pop() {
            Some(Element::Any(atoms)) => atoms,
            _ => return Err(invalid(source, "the anchor cannot be a wildcard")),
        };

        Ok(Pattern {
            source: source.trim().to_string(),
            left: elements,
            anchor,
            right,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Index keys of the anchor: its literal texts, or tags for text-less atoms.
    pub fn trigger_keys(&self) -> Vec<TriggerKey> {
        self.anchor
            .iter()
            .filter_map(|atom| match (&atom.text, atom.pos) {
                (Some(text), _) => Some(TriggerKey::Text(text.clone())),
                (None, Some(pos)) => Some(TriggerKey::Pos(pos)),
                (None, None) => None,
            })
            .collect()
    }

    /// Check the pattern around `current`.
    ///
    /// `prior` holds the nodes recognized before `current`; `upcoming` the
    /// normalized, non-blank tokens that follow it.
    pub fn matches(
        &self,
        prior: &[GraphNode],
        current: &Arc<DictionaryItem>,
        upcoming: &[String],
        dictionary: &Dictionary,
    ) -> bool {
        if !self.anchor.iter().any(|atom| atom.matches_item(current)) {
            return false;
        }

        let item_matches =
            |atoms: &[Atom], node: &GraphNode| atoms.iter().any(|atom| atom.matches_item(&node.item));
        let left_ok =
            (0..=prior.len()).any(|start| glob(&self.left, &prior[start..], &item_matches));
        if !left_ok {
            return false;
        }

        let token_matches = |atoms: &[Atom], token: &String| {
            atoms.iter().any(|atom| atom.matches_token(token, dictionary))
        };
        (0..=upcoming.len()).any(|end| glob(&self.right, &upcoming[..end], &token_matches))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Full match of `pattern` against `input`, `*` absorbing any run.
fn glob<T>(pattern: &[Element], input: &[T], matches: &impl Fn(&[Atom], &T) -> bool) -> bool {
    match pattern.split_first() {
        None => input.is_empty(),
        Some((Element::Wildcard, rest)) => {
            (0..=input.len()).any(|skip| glob(rest, &input[skip..], matches))
        }
        Some((Element::Any(atoms), rest)) => match input.split_first() {
            Some((head, tail)) => matches(atoms, head) && glob(rest, tail, matches),
            None => false,
        },
    }
}

fn parse_element(source: &str, element: &str, normalize: &impl Fn(&str) -> String) -> Result<Element> {
    if element == "*" {
        return Ok(Element::Wildcard);
    }

    element
        .split('|')
        .map(|atom| parse_atom(source, atom, normalize))
        .collect::<Result<Vec<_>>>()
        .map(Element::Any)
}

fn parse_atom(source: &str, atom: &str, normalize: &impl Fn(&str) -> String) -> Result<Atom> {
    let (text, tag) = match atom.split_once('^') {
        Some((text, tag)) => (text, Some(tag)),
        None => (atom, None),
    };

    let pos = match tag {
        Some(code) => Some(
            PartOfSpeech::from_code(code)
                .ok_or_else(|| invalid(source, &format!("unknown part of speech '^{code}'")))?,
        ),
        None => None,
    };

    let text = normalize(text);
    if text.contains('*') {
        return Err(invalid(source, "'*' must stand alone"));
    }
    let text = (!text.is_empty()).then_some(text);

    if text.is_none() && pos.is_none() {
        return Err(invalid(source, "empty alternative"));
    }

    Ok(Atom { text, pos })
}

fn invalid(spec: &str, reason: &str) -> BrainError {
    BrainError::InvalidPattern {
        spec: spec.to_string(),
        reason: reason.to_string(),
    }
}
