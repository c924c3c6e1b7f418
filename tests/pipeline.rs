//! End-to-end tests for the fetch → extract → summarise flow using wiremock

use serde_json::{json, Value};
use summarize_url::config::ConfigError;
use summarize_url::scraper::{extract_text, fetch_page, FetchError, USER_AGENT};
use summarize_url::summarizer::SYSTEM_PROMPT;
use summarize_url::{run, Config, Error, RunOptions, SummarizeError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Release notes</title></head>
<body>
    <nav><a href="/">Home</a></nav>
    <article>
        <h1>Version 2.0</h1>
        <p>Adds a faster parser.</p>
    </article>
    <script>trackVisitor();</script>
    <footer>Copyright 2025</footer>
</body>
</html>"#;

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
    })
}

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.summarizer.base_url = format!("{}/v1", server.uri());
    config.api.openai_key = Some("test-key".to_string());
    config
}

async fn mount_page(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

async fn run_to_string(url: &str, config: &Config) -> (Result<(), Error>, String) {
    let mut out = Vec::new();
    let result = run(url, config, &RunOptions::default(), &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_summary_is_printed() {
    let server = MockServer::start().await;
    mount_page(&server, 200, PAGE).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-4o-mini", "max_tokens": 1000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("- Faster parser")))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let (result, out) = run_to_string(&url, &config_for(&server)).await;
    result.unwrap();

    let chars = extract_text(PAGE).chars().count();
    assert_eq!(
        out,
        format!(
            "Fetching: {url}\nExtracted {chars} characters. Summarizing...\n\n- Faster parser\n"
        )
    );
}

#[tokio::test]
async fn test_request_carries_prompt_and_page_text() {
    let server = MockServer::start().await;
    mount_page(&server, 200, PAGE).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let (result, _) = run_to_string(&url, &config_for(&server)).await;
    result.unwrap();

    let requests = server.received_requests().await.unwrap();
    let page_request = requests
        .iter()
        .find(|r| r.url.path() == "/page")
        .expect("page was fetched");
    assert_eq!(
        page_request.headers.get("user-agent").unwrap().to_str().unwrap(),
        USER_AGENT
    );

    let api_request = requests
        .iter()
        .find(|r| r.url.path() == "/v1/chat/completions")
        .expect("api was called");
    let body: Value = api_request.body_json().unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
    assert_eq!(messages[1]["role"], "user");

    let user = messages[1]["content"].as_str().unwrap();
    assert!(user.starts_with(&format!("Summarize this page ({url}):\n\n")));
    assert!(user.contains("Adds a faster parser."));
    assert!(!user.contains("trackVisitor"));
    assert!(!user.contains("Copyright"));
}

#[tokio::test]
async fn test_not_found_skips_summarizer() {
    let server = MockServer::start().await;
    mount_page(&server, 404, "<html><body>Not here</body></html>").await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("never")))
        .expect(0)
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let (result, out) = run_to_string(&url, &config_for(&server)).await;

    match result.unwrap_err() {
        Error::Fetch(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(out, format!("Fetching: {url}\n"));
}

#[tokio::test]
async fn test_server_error_is_a_fetch_error() {
    let server = MockServer::start().await;
    mount_page(&server, 503, "unavailable").await;

    let err = fetch_page(&format!("{}/page", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}

#[tokio::test]
async fn test_connection_failure_is_a_fetch_error() {
    // Nothing listens on the discard port
    let err = fetch_page("http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::Connect(_) | FetchError::Request(_) | FetchError::Timeout(_)
    ));
    assert!(err.status().is_none());
}

#[tokio::test]
async fn test_missing_key_fails_after_extraction() {
    let server = MockServer::start().await;
    mount_page(&server, 200, PAGE).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("never")))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.api.openai_key = None;

    let url = format!("{}/page", server.uri());
    let (result, out) = run_to_string(&url, &config).await;

    match result.unwrap_err() {
        Error::Generic(e) => assert!(matches!(
            e.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingApiKey)
        )),
        other => panic!("unexpected error: {other:?}"),
    }
    let chars = extract_text(PAGE).chars().count();
    assert_eq!(
        out,
        format!("Fetching: {url}\nExtracted {chars} characters. Summarizing...\n\n")
    );
}

async fn summarize_error(response: ResponseTemplate) -> SummarizeError {
    let server = MockServer::start().await;
    mount_page(&server, 200, PAGE).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(response)
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let (result, _) = run_to_string(&url, &config_for(&server)).await;
    match result.unwrap_err() {
        Error::Generic(e) => e
            .downcast::<SummarizeError>()
            .expect("summarizer error"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthorized() {
    let err = summarize_error(ResponseTemplate::new(401).set_body_json(json!({
        "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
    })))
    .await;
    match err {
        SummarizeError::Unauthorized { message, .. } => {
            assert_eq!(message, "Incorrect API key provided")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_quota_exceeded() {
    let err = summarize_error(ResponseTemplate::new(429).set_body_json(json!({
        "error": { "message": "You exceeded your current quota", "type": "insufficient_quota" }
    })))
    .await;
    assert!(matches!(err, SummarizeError::QuotaExceeded(m) if m.contains("quota")));
}

#[tokio::test]
async fn test_empty_choices() {
    let err = summarize_error(
        ResponseTemplate::new(200).set_body_json(json!({ "id": "x", "choices": [] })),
    )
    .await;
    assert!(matches!(err, SummarizeError::EmptyResponse));
}

#[tokio::test]
async fn test_null_content() {
    let err = summarize_error(ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": null } }]
    })))
    .await;
    assert!(matches!(err, SummarizeError::EmptyResponse));
}

#[tokio::test]
async fn test_null_usage_still_returns_summary() {
    let server = MockServer::start().await;
    mount_page(&server, 200, PAGE).await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "- summary" } }],
            "usage": { "prompt_tokens": null, "completion_tokens": null, "total_tokens": null }
        })))
        .mount(&server)
        .await;

    let url = format!("{}/page", server.uri());
    let (result, out) = run_to_string(&url, &config_for(&server)).await;
    result.unwrap();
    assert!(out.ends_with("\n- summary\n"));
}

#[tokio::test]
async fn test_malformed_body() {
    let err = summarize_error(ResponseTemplate::new(200).set_body_string("not json")).await;
    assert!(matches!(err, SummarizeError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_raw_mode_never_calls_api() {
    let server = MockServer::start().await;
    mount_page(&server, 200, PAGE).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("never")))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.api.openai_key = None;

    let url = format!("{}/page", server.uri());
    let mut out = Vec::new();
    run(&url, &config, &RunOptions { raw: true }, &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("=== Release notes ==="));
    assert!(out.contains("Version 2.0\nAdds a faster parser."));
    assert!(!out.contains("Home"));
}
