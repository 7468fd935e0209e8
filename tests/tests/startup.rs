use presentation::cli::CliApp;
use serde_json::json;
use tests::lookup;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = CliApp::from_lookup(lookup(&[
        ("PINECONE_CONTROL_URL", uri.as_str()),
        ("PINECONE_INDEX_HOST", uri.as_str()),
    ]))
    .await;

    let err = result.err().expect("startup must fail");
    assert!(err.to_string().contains("PINECONE_API"));
}

#[tokio::test]
async fn connect_resolves_host_from_control_plane() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/indexes/quora-simple-semantic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "quora-simple-semantic",
            "dimension": 1024,
            "metric": "cosine",
            "host": &uri,
            "status": {"ready": true, "state": "Ready"},
            "embed": {"model": "llama-text-embed-v2", "dimension": 1024}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/records/namespaces/__default__/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"hits": [
                {"_id": "3", "_score": 0.42, "fields": {"question_text": "What is Rust?"}},
                {"_id": "9", "_score": 0.87, "fields": {"question_text": "What is the Rust language?"}}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = CliApp::from_lookup(lookup(&[
        ("PINECONE_API", "pk"),
        ("PINECONE_CONTROL_URL", uri.as_str()),
    ]))
    .await
    .unwrap();

    let hits = app.service().ask("what is rust").await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["9", "3"]);
}

#[tokio::test]
async fn missing_index_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes/quora-simple-semantic"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = CliApp::from_lookup(lookup(&[
        ("PINECONE_API", "pk"),
        ("PINECONE_CONTROL_URL", uri.as_str()),
    ]))
    .await;

    let err = result.err().expect("connect must fail");
    assert!(err.to_string().contains("does not exist"));
}
