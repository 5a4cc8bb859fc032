//! Conversational context built up by concept handlers during one turn.
//!
//! The context is a small tree: handlers attach semantic sub-contexts
//! (the subject being talked about, a question, a color, ...) and may
//! nest further detail beneath them. Every interpretation owns its own
//! context; it is created empty at the start of a turn and dropped at
//! the end.

use std::fmt;
use std::sync::Arc;

use crate::dictionary::DictionaryItem;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Subject,
    Question,
    Color,
    Frequency,
    Salutation,
    Command,
    Other(String),
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject => write!(f, "subject"),
            Self::Question => write!(f, "question"),
            Self::Color => write!(f, "color"),
            Self::Frequency => write!(f, "frequency"),
            Self::Salutation => write!(f, "salutation"),
            Self::Command => write!(f, "command"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// One sub-context and its children.
#[derive(Debug, Clone)]
pub struct ContextNode {
    pub kind: ContextKind,
    /// The recognized item this sub-context is about, if any.
    pub item: Option<Arc<DictionaryItem>>,
    pub value: Option<String>,
    pub children: Vec<ContextNode>,
}

impl ContextNode {
    pub fn new(kind: ContextKind, item: Option<Arc<DictionaryItem>>) -> Self {
        ContextNode {
            kind,
            item,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Nest a sub-context below this one.
    pub fn attach(&mut self, node: ContextNode) -> &mut ContextNode {
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }
}

/// The root of an interpretation's context tree.
#[derive(Debug, Clone, Default)]
pub struct Context {
    nodes: Vec<ContextNode>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a top-level sub-context and return it for further nesting.
    pub fn attach(&mut self, node: ContextNode) -> &mut ContextNode {
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    pub fn nodes(&self) -> &[ContextNode] {
        &self.nodes
    }

    /// Depth-first search for the most recently attached node of `kind`.
    pub fn find(&self, kind: &ContextKind) -> Option<&ContextNode> {
        self.iter().filter(|node| &node.kind == kind).last()
    }

    /// Every node, depth-first in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &ContextNode> {
        let mut stack: Vec<&ContextNode> = self.nodes.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
