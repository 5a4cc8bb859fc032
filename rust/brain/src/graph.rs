//! Thought graphs: one candidate parse of an utterance.
//!
//! A thought graph is the ordered list of dictionary items a segmentation
//! branch committed to, each remembering which token span it covers. The
//! graph is append-only and forking it is a plain `Clone`: nodes are
//! copied, the items themselves are shared.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::dictionary::DictionaryItem;
use crate::token::is_blank;

/// A recognized item and the token span it was matched against.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub item: Arc<DictionaryItem>,
    pub span: Range<usize>,
}

/// Ordered sequence of recognized entries.
#[derive(Debug, Clone, Default)]
pub struct ThoughtGraph {
    nodes: Vec<GraphNode>,
}

impl ThoughtGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item covering `span`. Returns the new node's index.
    pub fn append(&mut self, item: Arc<DictionaryItem>, span: Range<usize>) -> usize {
        self.nodes.push(GraphNode { item, span });
        self.nodes.len() - 1
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn items(&self) -> impl Iterator<Item = &Arc<DictionaryItem>> {
        self.nodes.iter().map(|node| &node.item)
    }

    pub fn get(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn last(&self) -> Option<&GraphNode> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Item texts in order, handy for assertions and logs.
    pub fn texts(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.item.text()).collect()
    }

    /// Check that the committed spans tile `parts`.
    ///
    /// Spans must be ordered and disjoint, start and end on non-blank
    /// parts, and every non-blank part must fall inside exactly one span.
    /// Only blank parts may sit between or around spans.
    pub fn tiles<S: AsRef<str>>(&self, parts: &[S]) -> bool {
        let mut cursor = 0;

        for node in &self.nodes {
            let span = &node.span;
            if span.start < cursor || span.end > parts.len() || span.is_empty() {
                return false;
            }
            if parts[cursor..span.start].iter().any(|p| !is_blank(p.as_ref())) {
                return false;
            }
            if is_blank(parts[span.start].as_ref()) || is_blank(parts[span.end - 1].as_ref()) {
                return false;
            }
            cursor = span.end;
        }

        parts[cursor..].iter().all(|p| is_blank(p.as_ref()))
    }
}

impl fmt::Display for ThoughtGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", node.item)?;
        }
        write!(f, "]")
    }
}
