use casebook::core::{Assistant, PromptTemplate};
use casebook::retrieval::{RetrievalOptions, Retriever};
use casebook::run_chat;
use casebook_test_utils::{FailingGenerator, FixedEmbedder, FixedGenerator, RecordBuilder, StubStore};
use std::sync::Arc;

fn assistant(generator: Arc<dyn casebook::core::Generator>) -> Assistant {
    let store = StubStore::with_records(vec![
        RecordBuilder::new("refund-1", 10)
            .message("user", "Where is my refund?")
            .embedding(vec![1.0, 0.0])
            .build(),
    ]);
    Assistant::new(
        Retriever::new(Arc::new(FixedEmbedder::new(vec![1.0, 0.0])), Arc::new(store)),
        generator,
        PromptTemplate::default(),
        RetrievalOptions::default(),
    )
}

async fn transcript(assistant: &Assistant, input: &str) -> String {
    let mut out = Vec::new();
    run_chat(assistant, None, input.as_bytes(), &mut out)
        .await
        .expect("chat");
    String::from_utf8(out).expect("utf8")
}

#[tokio::test]
async fn chat_reads_commands_until_quit() {
    let assistant = assistant(Arc::new(FixedGenerator::new("Issued on Monday.")));
    let output = transcript(
        &assistant,
        "where is it?\n/customer 10\nwhere is my refund?\n/history\n/quit\nnever read\n",
    )
    .await;

    assert!(output.contains("Select a customer first with /customer <id>."));
    assert!(output.contains("Selected customer 10."));
    assert!(output.contains("[customer 10] > Issued on Monday.\n"));
    assert!(output.contains("User: where is my refund?\nAssistant: Issued on Monday.\n"));
    assert!(!output.contains("never read"));
}

#[tokio::test]
async fn chat_stops_at_end_of_input() {
    let assistant = assistant(Arc::new(FixedGenerator::new("unused")));
    let output = transcript(&assistant, "/history").await;
    assert!(output.contains("No history yet."));
}

#[tokio::test]
async fn chat_reports_generation_failures_and_continues() {
    let assistant = assistant(Arc::new(FailingGenerator));
    let output = transcript(&assistant, "/customer 10\nrefund?\n/customer x\n").await;
    assert!(output.contains("Error generating response: "));
    assert!(output.ends_with("[customer 10] > "));
}
