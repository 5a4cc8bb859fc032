//! Segmentation of an utterance into dictionary items.
//!
//! [`SplitTextOperation`] walks the token list left to right. At each
//! position it tries the longest span first and shrinks it one token at a
//! time until the dictionary recognizes it. Whenever a choice is made that
//! could have gone another way, the operation forks:
//!
//! - on a multi-token match, a sibling keeps exploring the shorter spans;
//! - on an ambiguous match, a sibling commits each alternative item.
//!
//! Tokens nothing matches become provisional dictionary items, so every
//! completed operation covers the whole utterance.
//!
//! Every commit immediately runs concept dispatch, which lets handlers see
//! the utterance grow one item at a time.

use std::sync::Arc;

use crate::brain::Knowledge;
use crate::context::Context;
use crate::dictionary::DictionaryItem;
use crate::error::Result;
use crate::graph::ThoughtGraph;
use crate::intent::IntentCandidate;
use crate::operation::{Operation, Step, StepContext};
use crate::token::is_blank;

/// One candidate reading of an utterance.
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    pub graph: ThoughtGraph,
    pub context: Context,
    pub intents: Vec<IntentCandidate>,
}

/// Resumable segmentation of a token list.
#[derive(Debug, Clone)]
pub struct SplitTextOperation {
    parts: Arc<[String]>,
    parts_index: usize,
    span_end: usize,
    interpretation: Interpretation,
}

impl SplitTextOperation {
    pub fn new(parts: impl Into<Arc<[String]>>) -> Self {
        let parts = parts.into();
        let span_end = parts.len();
        SplitTextOperation {
            parts,
            parts_index: 0,
            span_end,
            interpretation: Interpretation::default(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Position of the first token not yet covered.
    pub fn cursor(&self) -> usize {
        self.parts_index
    }

    pub fn interpretation(&self) -> &Interpretation {
        &self.interpretation
    }

    fn skip_blanks(&mut self) {
        while self.parts_index < self.parts.len() && is_blank(&self.parts[self.parts_index]) {
            self.parts_index += 1;
        }
    }

    fn trim_span(&mut self) {
        while self.span_end > self.parts_index && is_blank(&self.parts[self.span_end - 1]) {
            self.span_end -= 1;
        }
    }

    fn span_len(&self) -> usize {
        self.span_end - self.parts_index
    }

    /// Word tokens of the current span joined by single spaces.
    fn span_text(&self) -> String {
        self.parts[self.parts_index..self.span_end]
            .iter()
            .filter(|part| !is_blank(part))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalized non-blank tokens after `end`.
    fn upcoming(&self, end: usize, knowledge: &Knowledge) -> Vec<String> {
        self.parts[end..]
            .iter()
            .filter(|part| !is_blank(part))
            .map(|part| knowledge.dictionary.normalize(part))
            .collect()
    }

    /// Append `item` over the current span, run dispatch, advance past it.
    fn commit(&mut self, item: Arc<DictionaryItem>, knowledge: &Knowledge) {
        let span = self.parts_index..self.span_end;
        let upcoming = self.upcoming(span.end, knowledge);

        tracing::trace!(item = %item, span = ?span, "Committing span");
        self.interpretation.graph.append(item, span.clone());

        if let Some((node, prior)) = self.interpretation.graph.nodes().split_last() {
            knowledge.concepts.dispatch(
                prior,
                node,
                &upcoming,
                &knowledge.dictionary,
                &mut self.interpretation.context,
                &mut self.interpretation.intents,
            );
        }

        self.parts_index = span.end;
        self.span_end = self.parts.len();
    }
}

impl Operation for SplitTextOperation {
    type Env = Knowledge;
    type Output = Interpretation;

    fn step(&mut self, knowledge: &mut Knowledge, cx: &mut StepContext<'_, Self>) -> Result<Step> {
        if cx.is_cancelled() {
            return Ok(Step::Pending);
        }

        self.skip_blanks();
        if self.parts_index >= self.parts.len() {
            return Ok(Step::Completed);
        }
        self.trim_span();

        loop {
            if cx.is_cancelled() {
                return Ok(Step::Pending);
            }

            let text = self.span_text();
            let found = knowledge.dictionary.find_similar_entries(&text);

            if let Some((first, alternatives)) = found.split_first() {
                if self.span_len() > 1 {
                    let mut shorter = self.clone();
                    shorter.span_end -= 1;
                    shorter.trim_span();
                    cx.spawn(shorter);
                }
                for alternative in alternatives {
                    let mut sibling = self.clone();
                    sibling.commit(alternative.clone(), knowledge);
                    cx.spawn(sibling);
                }
                // A fuzzy-only match may be a word the lexicon has never seen.
                if self.span_len() == 1 && !knowledge.dictionary.contains(&text) {
                    let literal = knowledge.dictionary.add_provisional(&text)?;
                    let mut sibling = self.clone();
                    sibling.commit(literal, knowledge);
                    cx.spawn(sibling);
                }
                self.commit(first.clone(), knowledge);
                break;
            }

            if self.span_len() > 1 {
                self.span_end -= 1;
                self.trim_span();
                continue;
            }

            let token = &self.parts[self.parts_index];
            tracing::debug!(operation = %cx.id(), token = %token, "Unmatched token");
            let item = knowledge.dictionary.add_provisional(token)?;
            self.commit(item, knowledge);
            break;
        }

        self.skip_blanks();
        if self.parts_index >= self.parts.len() {
            Ok(Step::Completed)
        } else {
            Ok(Step::Pending)
        }
    }

    fn finish(self) -> Interpretation {
        self.interpretation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::ConceptRegistry;
    use crate::dictionary::{Dictionary, PartOfSpeech};
    use crate::scheduler::Scheduler;
    use crate::token::{Tokenizer, WhitespaceTokenizer};

    fn knowledge(words: &[(&str, PartOfSpeech)]) -> Knowledge {
        let mut dictionary = Dictionary::new();
        for (text, pos) in words {
            dictionary.add_text_part(text, Some(*pos)).unwrap();
        }
        let concepts = ConceptRegistry::builder().build(&mut dictionary).unwrap();
        Knowledge {
            dictionary,
            concepts,
        }
    }

    async fn segment(knowledge: &mut Knowledge, text: &str) -> Vec<Vec<String>> {
        let parts = WhitespaceTokenizer.tokenize(text);
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(SplitTextOperation::new(parts));
        let report = scheduler.run(knowledge).await;
        report
            .outputs()
            .map(|interpretation| {
                interpretation
                    .graph
                    .texts()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn longest_span_wins_and_shorter_spans_are_kept() {
        let mut knowledge = knowledge(&[
            ("hot dog", PartOfSpeech::Noun),
            ("hot", PartOfSpeech::Adjective),
            ("dog", PartOfSpeech::Noun),
        ]);

        let graphs = segment(&mut knowledge, "hot dog").await;
        assert_eq!(graphs, vec![vec!["hot dog"], vec!["hot", "dog"]]);
    }

    #[tokio::test]
    async fn homographs_fork_one_branch_per_item() {
        let mut knowledge = knowledge(&[
            ("run", PartOfSpeech::Noun),
            ("run", PartOfSpeech::Verb),
        ]);

        let parts = WhitespaceTokenizer.tokenize("run");
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(SplitTextOperation::new(parts));
        let report = scheduler.run(&mut knowledge).await;

        let tags: Vec<PartOfSpeech> = report
            .outputs()
            .map(|interpretation| interpretation.graph.nodes()[0].item.pos())
            .collect();
        assert_eq!(tags, vec![PartOfSpeech::Noun, PartOfSpeech::Verb]);
    }

    #[tokio::test]
    async fn unknown_tokens_become_provisional_items() {
        let mut knowledge = knowledge(&[("hello", PartOfSpeech::Interjection)]);

        let graphs = segment(&mut knowledge, "hello xyzzy").await;
        assert_eq!(graphs, vec![vec!["hello", "xyzzy"]]);
        assert!(knowledge.dictionary.get("xyzzy")[0].is_provisional());
        assert_eq!(knowledge.dictionary.len(), 2);
    }

    #[tokio::test]
    async fn blank_input_completes_with_an_empty_graph() {
        let mut knowledge = knowledge(&[]);
        let graphs = segment(&mut knowledge, "   ").await;
        assert_eq!(graphs, vec![Vec::<String>::new()]);
    }

    #[tokio::test]
    async fn phrases_match_without_blank_parts() {
        let mut dictionary = Dictionary::from_config(
            &crate::config::BrainConfig::default().with_fuzzy(crate::config::FuzzyConfig::disabled()),
        );
        for (text, pos) in [
            ("hot dog", PartOfSpeech::Noun),
            ("hot", PartOfSpeech::Adjective),
            ("dog", PartOfSpeech::Noun),
            ("new york city", PartOfSpeech::Noun),
        ] {
            dictionary.add_text_part(text, Some(pos)).unwrap();
        }
        let concepts = ConceptRegistry::builder().build(&mut dictionary).unwrap();
        let mut knowledge = Knowledge {
            dictionary,
            concepts,
        };

        let parts: Vec<String> = vec!["hot".into(), "dog".into()];
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(SplitTextOperation::new(parts));
        let report = scheduler.run(&mut knowledge).await;
        let graphs: Vec<Vec<&str>> = report
            .outputs()
            .map(|interpretation| interpretation.graph.texts())
            .collect();
        assert_eq!(graphs, vec![vec!["hot dog"], vec!["hot", "dog"]]);

        let parts: Vec<String> = vec!["New".into(), "York".into(), "City".into()];
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(SplitTextOperation::new(parts));
        let report = scheduler.run(&mut knowledge).await;
        let first = report.outputs().next().unwrap();
        assert_eq!(first.graph.texts(), vec!["new york city"]);
    }

    #[tokio::test]
    async fn fuzzy_match_keeps_a_literal_reading() {
        let mut knowledge = knowledge(&[("name", PartOfSpeech::Noun)]);

        let graphs = segment(&mut knowledge, "Nate").await;
        assert_eq!(graphs, vec![vec!["name"], vec!["nate"]]);
        assert!(knowledge.dictionary.get("nate")[0].is_provisional());
    }

    #[tokio::test]
    async fn each_step_commits_one_item() {
        let mut knowledge = knowledge(&[
            ("a", PartOfSpeech::Determiner),
            ("b", PartOfSpeech::Noun),
        ]);
        let parts = WhitespaceTokenizer.tokenize("a b");
        let mut scheduler = Scheduler::new();
        scheduler.add_operation(SplitTextOperation::new(parts));
        let report = scheduler.run(&mut knowledge).await;

        assert_eq!(report.steps, 2);
        assert_eq!(report.completed.len(), 1);
    }
}
