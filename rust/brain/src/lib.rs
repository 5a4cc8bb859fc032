//! # Brain: rule-based natural language understanding
//!
//! A conversational front end that turns an utterance into a response by
//! way of a lexicon, pattern-triggered rules and a small cooperative task
//! scheduler.
//!
//! ## Core Ideas
//!
//! - **Segmentation explores, it does not guess**: an utterance is split into
//!   dictionary items longest-span-first, and every point of lexical
//!   ambiguity forks a sibling operation that follows the other reading.
//! - **Concepts are rule bundles**: each concept adds vocabulary and trigger
//!   patterns; a trigger fires as soon as its anchor item is recognized and
//!   its surrounding pattern holds.
//! - **Intents are deferred**: handlers only register confidence-weighted
//!   candidate actions; once every reading is complete, exactly one runs.
//!
//! ## Architecture
//!
//! ```text
//! Utterance → Tokenizer → SplitTextOperation (Scheduler, forks on ambiguity)
//!   → Dictionary lookup → ThoughtGraph append
//!     → Concept dispatch (Context edits, intent registration)
//!       → Intent selection → Response channel
//! ```
//!
//! ## Example
//!
//! ```
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! use brain::Brain;
//!
//! let mut brain = Brain::builder().with_default_concepts().build().unwrap();
//!
//! brain.respond("my name is Bob").await.unwrap();
//! let outcome = brain.respond("say hi").await.unwrap();
//! assert_eq!(outcome.response(), Some("Hi Bob."));
//! # });
//! ```

pub mod brain;
pub mod concept;
pub mod concepts;
pub mod config;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod graph;
pub mod intent;
pub mod operation;
pub mod pattern;
pub mod scheduler;
pub mod session;
pub mod split;
pub mod token;

pub use brain::{Brain, BrainBuilder, Knowledge, TurnOutcome};
pub use config::BrainConfig;
pub use error::{BrainError, Result};
