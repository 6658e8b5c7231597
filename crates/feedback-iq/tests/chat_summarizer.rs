mod common;

use axum::http::StatusCode;
use common::{closed_endpoint, spawn_endpoint, SAMPLE_CSV};
use feedback_iq::workflows::feedback::{FeedbackLoader, PrioritySelection};
use feedback_iq::workflows::summarizer::{
    summarize_feedback, ChatCompletionSummarizer, Summarizer, SummaryStatus,
};
use serde_json::json;
use std::time::Duration;

fn summarizer(url: &str) -> ChatCompletionSummarizer {
    ChatCompletionSummarizer::new(url, "test-model", "test-key", Duration::from_secs(5))
        .expect("client builds")
}

#[test]
fn sends_single_user_turn_and_reads_first_choice() {
    let (url, captured) = spawn_endpoint(
        StatusCode::OK,
        json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Billing issues dominate." } }
            ]
        }),
        Duration::ZERO,
    );
    let dataset = FeedbackLoader::from_reader(SAMPLE_CSV.as_bytes()).expect("dataset loads");
    let filtered = dataset.filter(&PrioritySelection::default());
    let client = summarizer(&url);

    let status = summarize_feedback(Some(&client as &dyn Summarizer), &filtered);
    assert_eq!(
        status,
        SummaryStatus::Available {
            summary: "Billing issues dominate.".to_string()
        }
    );

    let bodies = captured.lock().expect("capture mutex").clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "test-model");
    let messages = bodies[0]["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    let content = messages[0]["content"].as_str().expect("content string");
    assert!(content.starts_with("Summarize insights from this feedback:\n"));
    assert!(content.contains("Dashboard takes 20 seconds to load"));
    assert!(!content.contains("Would love a dark mode"));
}

#[test]
fn auth_failure_is_reported_as_unavailable() {
    let (url, _) = spawn_endpoint(
        StatusCode::UNAUTHORIZED,
        json!({ "error": { "message": "Invalid API Key" } }),
        Duration::ZERO,
    );
    let dataset = FeedbackLoader::from_reader(SAMPLE_CSV.as_bytes()).expect("dataset loads");
    let filtered = dataset.filter(&PrioritySelection::default());
    let client = summarizer(&url);

    match summarize_feedback(Some(&client as &dyn Summarizer), &filtered) {
        SummaryStatus::Unavailable { reason } => assert!(reason.contains("401"), "{reason}"),
        other => panic!("expected unavailable summary, got {other:?}"),
    }
}

#[test]
fn empty_choices_are_an_invalid_response() {
    let (url, _) = spawn_endpoint(StatusCode::OK, json!({ "choices": [] }), Duration::ZERO);
    let client = summarizer(&url);

    assert!(client.summarize("Summarize insights from this feedback:\nx").is_err());
}

#[test]
fn network_failure_is_non_fatal() {
    let dataset = FeedbackLoader::from_reader(SAMPLE_CSV.as_bytes()).expect("dataset loads");
    let filtered = dataset.filter(&PrioritySelection::default());
    let client = summarizer(&closed_endpoint());

    assert!(matches!(
        summarize_feedback(Some(&client as &dyn Summarizer), &filtered),
        SummaryStatus::Unavailable { .. }
    ));
}
