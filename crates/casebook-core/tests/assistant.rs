use casebook_config::RetrievalConfig;
use casebook_core::{
    AskOutcome, Assistant, AssistantError, GroundingMetadata, PromptTemplate, retrieval_options,
};
use casebook_protocol::{ConversationTurn, RetrievalPath};
use casebook_retrieval::{Embedder, RetrievalMode, RetrievalOptions, RetrievalStrategy, Retriever};
use casebook_test_utils::{
    FailingGenerator, FixedEmbedder, FixedGenerator, RecordBuilder, RecordingGenerator, Scripted,
    StubStore, scored,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn archive() -> StubStore {
    StubStore::with_records(vec![
        RecordBuilder::new("refund-1", 10)
            .started_at(1_704_164_645_000)
            .message("user", "I still have not received my refund")
            .quick_reply("bot", "Was this helpful?", &["Yes", "No"])
            .message("agent", "The refund was issued on Monday")
            .embedding(vec![1.0, 0.0])
            .build(),
        RecordBuilder::new("login-1", 10)
            .message("user", "I cannot log in")
            .embedding(vec![0.0, 1.0])
            .build(),
        RecordBuilder::new("other-customer", 11)
            .message("user", "refund question")
            .embedding(vec![1.0, 0.0])
            .build(),
    ])
}

fn assistant(
    embedder: impl Embedder + 'static,
    store: StubStore,
    generator: Arc<dyn casebook_core::Generator>,
) -> Assistant {
    Assistant::new(
        Retriever::new(Arc::new(embedder), Arc::new(store)),
        generator,
        PromptTemplate::new("Archive:", "Say so if the archive does not help."),
        RetrievalOptions::default(),
    )
}

#[tokio::test]
async fn answers_from_customer_context() {
    let generator = RecordingGenerator::new("Your refund was issued on Monday.");
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0, 0.0]),
        archive(),
        Arc::new(generator.clone()),
    );

    let outcome = assistant
        .ask(10, "  where is my refund?  ", &[])
        .await
        .expect("outcome");
    let AskOutcome::Answered(answer) = outcome else {
        panic!("expected an answer");
    };
    assert_eq!(answer.text, "Your refund was issued on Monday.");
    assert_eq!(answer.retrieval.strategy, RetrievalStrategy::Hybrid);
    assert_eq!(answer.citations[0].conversation_id.as_str(), "refund-1");
    assert!(
        answer
            .retrieval
            .results
            .iter()
            .all(|result| result.record.customer_id == 10)
    );
    // Quick replies never reach the model.
    assert_eq!(answer.context[0].conversation.len(), 2);

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].starts_with("Archive:\n["));
    assert!(prompts[0].contains("\"conversation_id\": \"refund-1\""));
    assert!(prompts[0].contains("Current question: where is my refund?"));
    assert!(!prompts[0].contains("Was this helpful?"));
    assert!(!prompts[0].contains("Previous conversation:"));
}

#[tokio::test]
async fn customer_without_conversations_skips_generation() {
    let generator = RecordingGenerator::default();
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0, 0.0]),
        archive(),
        Arc::new(generator.clone()),
    );

    let outcome = assistant.ask(99, "anything?", &[]).await.expect("outcome");
    assert_eq!(outcome, AskOutcome::NoConversations { customer: 99 });
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn matches_below_min_score_are_not_reported_as_missing() {
    let generator = RecordingGenerator::default();
    let store = StubStore::new()
        .script_vector(Scripted::Results(vec![scored("weak", 10, 0.3, RetrievalPath::Vector)]))
        .script_text(Scripted::Results(Vec::new()));
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0, 0.0]),
        store,
        Arc::new(generator.clone()),
    )
    .with_options(RetrievalOptions {
        min_score: Some(0.5),
        ..RetrievalOptions::default()
    });

    let outcome = assistant.ask(10, "refund?", &[]).await.expect("outcome");
    assert_eq!(
        outcome,
        AskOutcome::BelowMinScore {
            customer: 10,
            filtered: 1
        }
    );
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn replays_history_into_prompt() {
    let generator = RecordingGenerator::default();
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0, 0.0]),
        archive(),
        Arc::new(generator.clone()),
    );
    let history = vec![
        ConversationTurn::user("Did they contact us?"),
        ConversationTurn::assistant("Yes, twice.", Vec::new()),
    ];

    assistant
        .ask(10, "About what?", &history)
        .await
        .expect("outcome");
    let prompt = &generator.prompts()[0];
    assert!(prompt.contains(
        "Previous conversation:\nUser: Did they contact us?\nAssistant: Yes, twice.\n\nCurrent question: About what?"
    ));
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let generator = RecordingGenerator::default();
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0]),
        archive(),
        Arc::new(generator.clone()),
    );
    let err = assistant.ask(10, "   ", &[]).await.unwrap_err();
    assert!(matches!(err, AssistantError::EmptyQuestion));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn generation_failure_is_typed() {
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0, 0.0]),
        archive(),
        Arc::new(FailingGenerator),
    );
    let err = assistant.ask(10, "refund?", &[]).await.unwrap_err();
    assert!(matches!(err, AssistantError::Generation(_)));
    assert!(err.to_string().contains("generation failed"));
}

#[tokio::test]
async fn exhausted_retrieval_is_typed() {
    let store = StubStore::new()
        .script_vector(Scripted::Fail("down".to_string()))
        .script_text(Scripted::Fail("down".to_string()))
        .script_scan(Scripted::Fail("down".to_string()));
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0]),
        store,
        Arc::new(FixedGenerator::new("unused")),
    );
    let err = assistant.ask(10, "refund?", &[]).await.unwrap_err();
    assert!(matches!(err, AssistantError::Retrieval(_)));
}

#[tokio::test]
async fn degraded_retrieval_still_answers() {
    let store = archive().script_text(Scripted::Fail("text index missing".to_string()));
    let grounding = GroundingMetadata {
        search_entry_point: Some("<div/>".to_string()),
        ..GroundingMetadata::default()
    };
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0, 0.0]),
        store,
        Arc::new(FixedGenerator::new("answer").with_grounding(grounding.clone())),
    );

    let AskOutcome::Answered(answer) = assistant.ask(10, "refund?", &[]).await.expect("outcome")
    else {
        panic!("expected an answer");
    };
    assert!(answer.retrieval.is_degraded());
    assert_eq!(answer.retrieval.strategy, RetrievalStrategy::VectorOnly);
    assert_eq!(answer.retrieval.degradations[0].path, RetrievalPath::Text);
    assert_eq!(answer.grounding, Some(grounding));
}

#[tokio::test]
async fn lists_customers_from_store() {
    let assistant = assistant(
        FixedEmbedder::new(vec![1.0]),
        archive(),
        Arc::new(FixedGenerator::new("unused")),
    );
    assert_eq!(assistant.list_customers().await.expect("customers"), vec![10, 11]);
}

#[test]
fn maps_configured_retrieval_settings() {
    let config = RetrievalConfig {
        mode: RetrievalMode::Text,
        limit: 3,
        min_score: Some(0.4),
    };
    assert_eq!(
        retrieval_options(&config),
        RetrievalOptions {
            mode: RetrievalMode::Text,
            limit: 3,
            min_score: Some(0.4),
        }
    );
}
