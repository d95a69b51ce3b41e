use casebook_core::{AskOutcome, Assistant, AssistantError, PromptTemplate, Session};
use casebook_protocol::TurnRole;
use casebook_retrieval::{RetrievalOptions, Retriever};
use casebook_test_utils::{FailingGenerator, FixedEmbedder, RecordBuilder, RecordingGenerator, StubStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn assistant(generator: Arc<dyn casebook_core::Generator>) -> Assistant {
    let store = StubStore::with_records(vec![
        RecordBuilder::new("a", 1)
            .message("user", "billing question")
            .embedding(vec![1.0])
            .build(),
        RecordBuilder::new("b", 2)
            .message("user", "shipping question")
            .embedding(vec![1.0])
            .build(),
    ]);
    Assistant::new(
        Retriever::new(Arc::new(FixedEmbedder::new(vec![1.0])), Arc::new(store)),
        generator,
        PromptTemplate::default(),
        RetrievalOptions::default(),
    )
}

#[tokio::test]
async fn asking_without_customer_fails() {
    let assistant = assistant(Arc::new(RecordingGenerator::default()));
    let mut session = Session::new();
    let err = session.ask(&assistant, "hello").await.unwrap_err();
    assert!(matches!(err, AssistantError::NoCustomerSelected));
    assert!(session.turns().is_empty());
}

#[tokio::test]
async fn answered_questions_are_recorded_with_context() {
    let generator = RecordingGenerator::new("noted");
    let assistant = assistant(Arc::new(generator.clone()));
    let mut session = Session::for_customer(1);

    session.ask(&assistant, "first?").await.expect("first");
    session.ask(&assistant, "second?").await.expect("second");

    let roles: Vec<TurnRole> = session.turns().iter().map(|turn| turn.role).collect();
    assert_eq!(
        roles,
        vec![
            TurnRole::User,
            TurnRole::Assistant,
            TurnRole::User,
            TurnRole::Assistant
        ]
    );
    let context = session.turns()[1].context.as_ref().expect("context");
    assert_eq!(context[0].conversation_id.as_str(), "a");

    let prompts = generator.prompts();
    assert!(!prompts[0].contains("Previous conversation:"));
    assert!(prompts[1].contains("User: first?\nAssistant: noted\n"));
}

#[tokio::test]
async fn switching_customer_keeps_transcript() {
    let assistant = assistant(Arc::new(RecordingGenerator::default()));
    let mut session = Session::for_customer(1);
    session.ask(&assistant, "first?").await.expect("first");

    session.select_customer(2);
    assert_eq!(session.customer(), Some(2));
    assert_eq!(session.turns().len(), 2);

    let AskOutcome::Answered(answer) = session.ask(&assistant, "second?").await.expect("second")
    else {
        panic!("expected an answer");
    };
    assert_eq!(answer.citations[0].conversation_id.as_str(), "b");
    assert_eq!(session.turns().len(), 4);
}

#[tokio::test]
async fn unanswered_questions_leave_transcript_unchanged() {
    let mut session = Session::for_customer(3);
    let outcome = session
        .ask(&assistant(Arc::new(RecordingGenerator::default())), "anyone?")
        .await
        .expect("outcome");
    assert_eq!(outcome, AskOutcome::NoConversations { customer: 3 });
    assert!(session.turns().is_empty());

    session.select_customer(1);
    let err = session
        .ask(&assistant(Arc::new(FailingGenerator)), "fails?")
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::Generation(_)));
    assert!(session.turns().is_empty());
}
