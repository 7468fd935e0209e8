use application::index_service::{IndexOrigin, IndexService};
use application::ingest_service::{IngestError, IngestOptions, IngestService};
use infrastructure::config::Config;
use infrastructure::dataset::{DatasetReader, DatasetSource};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tests::lookup;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSERT: &str = "/records/namespaces/__default__/upsert";

fn config(server: &MockServer, batch_size: &str) -> Config {
    let uri = server.uri();
    Config::from_lookup(lookup(&[
        ("PINECONE_API", "pk"),
        ("PINECONE_CONTROL_URL", uri.as_str()),
        ("QA_INDEX_NAME", "quora-test"),
        ("QA_BATCH_SIZE", batch_size),
    ]))
    .unwrap()
}

fn dataset(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

fn fast(batch_size: usize) -> IngestOptions {
    IngestOptions {
        batch_size,
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
    }
}

async fn mount_ready_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/indexes/quora-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "quora-test",
            "dimension": 1024,
            "host": server.uri(),
            "status": {"ready": true, "state": "Ready"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn creates_index_then_loads_dataset_in_batches() {
    let server = MockServer::start().await;
    // absent on the first lookup, ready afterwards
    Mock::given(method("GET"))
        .and(path("/indexes/quora-test"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_ready_index(&server).await;
    Mock::given(method("POST"))
        .and(path("/indexes/create-for-model"))
        .and(body_json(json!({
            "name": "quora-test",
            "cloud": "aws",
            "region": "us-east-1",
            "embed": {"model": "llama-text-embed-v2", "field_map": {"text": "question_text"}}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "quora-test",
            "host": "",
            "status": {"ready": false, "state": "Initializing"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPSERT))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let service = IndexService::new(config(&server, "2"))
        .unwrap()
        .with_polling(Duration::from_millis(1), 5);
    let (index, origin) = service.ensure_index().await.unwrap();
    assert_eq!(origin, IndexOrigin::Created);

    let file = dataset(&[
        r#"{"id": "1", "blob": {"text": "How do I learn Rust?"}}"#,
        r#"{"id": "2", "blob": {"text": ""}}"#,
        r#"{"id": "3", "blob": {"text": "Is Rust memory safe?"}}"#,
        r#"{"id": "4", "blob": {"text": "What is cargo?"}}"#,
        r#"{"id": "5", "blob": {"text": "Why is Rust popular?"}}"#,
    ]);
    let source = DatasetSource::File(file.path().to_path_buf());
    let mut reader = DatasetReader::new(source.open().await.unwrap());

    let batch_size = service.config().batch_size;
    let ingest = IngestService::new(index, fast(batch_size)).unwrap();
    let report = ingest.ingest(reader.by_ref(), |_| {}).await.unwrap();

    assert_eq!(report.batches, 2);
    assert_eq!(report.records, 4);
    assert_eq!(reader.skipped(), 1);
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;
    mount_ready_index(&server).await;
    Mock::given(method("POST"))
        .and(path(UPSERT))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPSERT))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = IndexService::new(config(&server, "96")).unwrap();
    let (index, origin) = service.ensure_index().await.unwrap();
    assert_eq!(origin, IndexOrigin::Existing);

    let records = vec![Ok(domain::models::QuestionRecord::new("1", "What is Rust?"))];
    let report = IngestService::new(index, fast(96))
        .unwrap()
        .ingest(records, |_| {})
        .await
        .unwrap();
    assert_eq!(report.records, 1);
}

#[tokio::test]
async fn rejected_batch_aborts_with_its_index() {
    let server = MockServer::start().await;
    mount_ready_index(&server).await;
    Mock::given(method("POST"))
        .and(path(UPSERT))
        .and(body_string_contains(r#""_id":"3""#))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad record"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(UPSERT))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = IndexService::new(config(&server, "2")).unwrap();
    let (index, _) = service.ensure_index().await.unwrap();

    let records = (1..=6)
        .map(|i| Ok(domain::models::QuestionRecord::new(i.to_string(), format!("question {i}"))));
    let err = IngestService::new(index, fast(2))
        .unwrap()
        .ingest(records, |_| {})
        .await
        .unwrap_err();

    assert_eq!(err.batch_index(), Some(1));
    assert!(matches!(err, IngestError::Batch { attempts: 1, .. }));
    assert!(err.to_string().contains("bad record"));
}
