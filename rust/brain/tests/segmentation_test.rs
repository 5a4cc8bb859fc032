use std::sync::Arc;

use brain::concept::{Concept, ConceptRegistry, Registrar};
use brain::config::FuzzyConfig;
use brain::context::{ContextKind, ContextNode};
use brain::dictionary::{Dictionary, PartOfSpeech};
use brain::{BrainConfig, Knowledge};
use brain::scheduler::{Outcome, RunReport, Scheduler};
use brain::split::{Interpretation, SplitTextOperation};
use brain::token::{Tokenizer, WhitespaceTokenizer};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn knowledge(words: &[(&str, PartOfSpeech)]) -> anyhow::Result<Knowledge> {
    let mut dictionary = Dictionary::new();
    for (text, pos) in words {
        dictionary.add_text_part(text, Some(*pos))?;
    }
    let concepts = ConceptRegistry::builder().build(&mut dictionary)?;
    Ok(Knowledge {
        dictionary,
        concepts,
    })
}

async fn run(knowledge: &mut Knowledge, parts: &[String]) -> RunReport<Interpretation> {
    let mut scheduler = Scheduler::new();
    scheduler.add_operation(SplitTextOperation::new(parts.to_vec()));
    scheduler.run(knowledge).await
}

fn texts(report: &RunReport<Interpretation>) -> Vec<Vec<String>> {
    report
        .outputs()
        .map(|interpretation| {
            interpretation
                .graph
                .texts()
                .into_iter()
                .map(String::from)
                .collect()
        })
        .collect()
}

fn hot_dog_knowledge() -> anyhow::Result<Knowledge> {
    knowledge(&[
        ("hot dog", PartOfSpeech::Noun),
        ("hot", PartOfSpeech::Adjective),
        ("dog", PartOfSpeech::Noun),
        ("stand", PartOfSpeech::Noun),
    ])
}

#[tokio::test]
async fn test_phrase_and_word_readings_both_complete() -> anyhow::Result<()> {
    let mut knowledge = hot_dog_knowledge()?;
    let parts = WhitespaceTokenizer.tokenize("hot dog");

    let report = run(&mut knowledge, &parts).await;
    let graphs = texts(&report);

    assert!(graphs.len() >= 2);
    assert!(graphs.contains(&vec!["hot dog".to_string()]));
    assert!(graphs.contains(&vec!["hot".to_string(), "dog".to_string()]));
    Ok(())
}

#[tokio::test]
async fn test_segmentation_is_deterministic() -> anyhow::Result<()> {
    let parts = WhitespaceTokenizer.tokenize("hot dog stand");

    let mut first = hot_dog_knowledge()?;
    let mut second = hot_dog_knowledge()?;
    let a = texts(&run(&mut first, &parts).await);
    let b = texts(&run(&mut second, &parts).await);

    assert_eq!(a, b);
    assert_eq!(
        a,
        vec![
            vec!["hot dog".to_string(), "stand".to_string()],
            vec!["hot".to_string(), "dog".to_string(), "stand".to_string()],
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_every_reading_tiles_the_input() -> anyhow::Result<()> {
    let mut knowledge = hot_dog_knowledge()?;
    let parts = WhitespaceTokenizer.tokenize("the hot  dog stand, please");

    let report = run(&mut knowledge, &parts).await;

    assert!(!report.completed.is_empty());
    for interpretation in report.outputs() {
        assert!(
            interpretation.graph.tiles(&parts),
            "{} does not tile {parts:?}",
            interpretation.graph
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_unknown_token_is_added_once() -> anyhow::Result<()> {
    let mut knowledge = knowledge(&[])?;
    let parts = WhitespaceTokenizer.tokenize("xyzzy");

    let report = run(&mut knowledge, &parts).await;

    assert_eq!(texts(&report), vec![vec!["xyzzy".to_string()]]);
    assert_eq!(knowledge.dictionary.len(), 1);
    let item = &knowledge.dictionary.get("xyzzy")[0];
    assert!(item.is_provisional());
    assert_eq!(item.pos(), PartOfSpeech::Unknown);
    Ok(())
}

#[tokio::test]
async fn test_fuzzy_match_stands_in_for_a_typo() -> anyhow::Result<()> {
    let mut knowledge = knowledge(&[("hello", PartOfSpeech::Interjection)])?;
    let parts = WhitespaceTokenizer.tokenize("helo");

    let report = run(&mut knowledge, &parts).await;

    assert_eq!(
        texts(&report),
        vec![vec!["hello".to_string()], vec!["helo".to_string()]]
    );
    assert!(knowledge.dictionary.get("helo")[0].is_provisional());
    Ok(())
}

#[tokio::test]
async fn test_phrases_match_without_blank_parts() -> anyhow::Result<()> {
    let config = BrainConfig::default().with_fuzzy(FuzzyConfig::disabled());
    let mut dictionary = Dictionary::from_config(&config);
    for (text, pos) in [
        ("hot dog", PartOfSpeech::Noun),
        ("hot", PartOfSpeech::Adjective),
        ("dog", PartOfSpeech::Noun),
    ] {
        dictionary.add_text_part(text, Some(pos))?;
    }
    let concepts = ConceptRegistry::builder().build(&mut dictionary)?;
    let mut knowledge = Knowledge {
        dictionary,
        concepts,
    };

    let parts = vec!["hot".to_string(), "dog".to_string()];
    let report = run(&mut knowledge, &parts).await;

    assert_eq!(
        texts(&report),
        vec![
            vec!["hot dog".to_string()],
            vec!["hot".to_string(), "dog".to_string()],
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_refused_siblings_are_reported() -> anyhow::Result<()> {
    let parts = WhitespaceTokenizer.tokenize("hot dog hot dog");

    let mut knowledge = hot_dog_knowledge()?;
    let report = run(&mut knowledge, &parts).await;
    assert_eq!(report.completed.len(), 4);
    assert_eq!(report.refused, 0);

    let mut knowledge = hot_dog_knowledge()?;
    let config = BrainConfig::default().with_max_pending(1);
    let mut scheduler = Scheduler::from_config(&config);
    scheduler.add_operation(SplitTextOperation::new(parts));
    let report = scheduler.run(&mut knowledge).await;

    assert!(report.refused > 0);
    assert!(report.completed.len() < 4);
    assert!(!report.exhausted);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_segmentation_publishes_nothing() -> anyhow::Result<()> {
    let mut knowledge = hot_dog_knowledge()?;
    let parts = WhitespaceTokenizer.tokenize("hot dog stand");

    let turn = CancellationToken::new();
    let mut scheduler = Scheduler::new().with_parent(&turn);
    let handle = scheduler
        .add_operation(SplitTextOperation::new(parts))
        .expect("queue has room");
    turn.cancel();

    let report = scheduler.run(&mut knowledge).await;

    assert!(report.completed.is_empty());
    assert_eq!(report.outcome(handle.id()), Some(Outcome::Cancelled));
    assert_eq!(knowledge.dictionary.len(), 4);
    Ok(())
}

/// Cancels the turn as soon as "stand" is recognized.
struct Interrupting {
    turn: CancellationToken,
}

impl Concept for Interrupting {
    fn name(&self) -> &'static str {
        "interrupting"
    }

    fn register(self: Arc<Self>, registrar: &mut Registrar<'_>) -> brain::Result<()> {
        let turn = self.turn.clone();
        registrar.on("stand", move |cx| {
            cx.context_mut()
                .attach(ContextNode::new(ContextKind::Other("stop".into()), None));
            turn.cancel();
            Ok(())
        })
    }
}

#[tokio::test]
async fn test_cancellation_in_flight_drops_the_operation_and_its_siblings() -> anyhow::Result<()> {
    let turn = CancellationToken::new();
    let mut dictionary = Dictionary::new();
    for (text, pos) in [
        ("hot dog", PartOfSpeech::Noun),
        ("hot", PartOfSpeech::Adjective),
        ("dog", PartOfSpeech::Noun),
        ("stand", PartOfSpeech::Noun),
    ] {
        dictionary.add_text_part(text, Some(pos))?;
    }
    let concepts = ConceptRegistry::builder()
        .add(Interrupting { turn: turn.clone() })
        .build(&mut dictionary)?;
    let mut knowledge = Knowledge {
        dictionary,
        concepts,
    };

    let parts = WhitespaceTokenizer.tokenize("hot dog stand");
    let mut scheduler = Scheduler::new().with_parent(&turn);
    let root = scheduler
        .add_operation(SplitTextOperation::new(parts))
        .expect("queue has room");
    let report = scheduler.run(&mut knowledge).await;

    // "hot dog" and the forked "hot" reading commit before "stand" cancels.
    assert_eq!(report.steps, 3);
    assert!(report.completed.is_empty());
    assert_eq!(report.outcome(root.id()), Some(Outcome::Cancelled));
    assert_eq!(report.cancelled.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_step_budget_cuts_exploration_short() -> anyhow::Result<()> {
    let mut knowledge = hot_dog_knowledge()?;
    let parts = WhitespaceTokenizer.tokenize("hot dog stand");

    let config = BrainConfig::default().with_max_steps(1);
    let mut scheduler = Scheduler::from_config(&config);
    scheduler.add_operation(SplitTextOperation::new(parts));
    let report = scheduler.run(&mut knowledge).await;

    assert!(report.exhausted);
    assert!(report.completed.is_empty());
    assert!(!report.cancelled.is_empty());
    Ok(())
}
