use super::*;

#[test]
fn chat_request_wire_format() {
    let request = ChatRequest {
        model: "llama-3.3-70b-versatile".to_string(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: "What is Rust?".to_string(),
        }],
    };

    let json = serde_json::to_value(&request).expect("serialization should succeed");
    assert_eq!(json["model"], "llama-3.3-70b-versatile");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "What is Rust?");
}

#[test]
fn extracts_first_choice_content() {
    let body = r#"{
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "The answer."}},
            {"index": 1, "message": {"role": "assistant", "content": "Ignored."}}
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 3}
    }"#;

    let answer = extract_answer(body).expect("extraction should succeed");
    assert_eq!(answer, "The answer.");
}

#[test]
fn empty_choices_is_an_error() {
    let body = r#"{"choices": []}"#;

    assert!(extract_answer(body).is_err());
}

#[test]
fn malformed_response_is_an_error() {
    assert!(extract_answer("not json").is_err());
}

#[test]
fn chat_completions_url_preserves_path_prefix() {
    let base = Url::parse("https://api.groq.com/openai/v1").expect("valid URL");

    let url = chat_completions_url(&base).expect("join should succeed");
    assert_eq!(
        url.as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );

    let base = Url::parse("https://api.groq.com/openai/v1/").expect("valid URL");
    let url = chat_completions_url(&base).expect("join should succeed");
    assert_eq!(
        url.as_str(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
}

#[test]
fn client_requires_nonempty_api_key() {
    let config = LlmConfig::default();

    let client = LlmClient::with_api_key(&config, "gsk_test".to_string())
        .expect("client should be created");
    assert_eq!(client.model(), "llama-3.3-70b-versatile");
}
